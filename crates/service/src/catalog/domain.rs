use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// One bookable line under a catalog service. `rating` and `num_reviews`
/// are a cache derived from the reviews of this sub-service.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubService {
    pub id: Uuid,
    pub name: String,
    pub description: String,
    pub price: f64,
    pub actual_price: Option<f64>,
    pub image_url: String,
    pub issues_resolved: Vec<String>,
    pub rating: f64,
    pub num_reviews: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CatalogEntry {
    pub id: Uuid,
    pub category: String,
    pub title: String,
    pub description: String,
    pub image_url: String,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub sub_services: Vec<SubService>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct NewSubService {
    pub name: String,
    pub description: String,
    pub price: f64,
    pub actual_price: Option<f64>,
    pub image_url: String,
    pub issues_resolved: Vec<String>,
}

/// Admin input for a new catalog service
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct NewCatalogEntry {
    pub category: String,
    pub title: String,
    pub description: String,
    pub image_url: String,
    pub sub_services: Vec<NewSubService>,
}
