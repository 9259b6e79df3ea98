use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Review submission as it arrives from a client. Fields are kept loose
/// here so that missing values surface as validation errors rather than
/// deserialization failures.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct NewReview {
    pub service_id: String,
    pub sub_service_id: String,
    pub sub_service_name: String,
    pub enquiry_id: String,
    pub rating: Option<f64>,
    pub comment: Option<String>,
}

/// Row handed to the repository once a submission passed every check.
#[derive(Debug, Clone)]
pub struct ReviewRecord {
    pub user_id: Uuid,
    pub service_id: Uuid,
    pub sub_service_id: String,
    pub sub_service_name: String,
    pub rating: u8,
    pub comment: Option<String>,
    pub enquiry_id: Uuid,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Review {
    pub id: Uuid,
    pub user_id: Uuid,
    pub service_id: Uuid,
    pub sub_service_id: String,
    pub sub_service_name: String,
    pub rating: u8,
    pub comment: Option<String>,
    pub enquiry_id: Uuid,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserSummary {
    pub name: String,
    pub phone: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ServiceSummary {
    pub title: String,
    pub category: String,
}

/// Public listing entry: the review plus the reviewer's display name.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReviewWithReviewer {
    #[serde(flatten)]
    pub review: Review,
    pub reviewer_name: Option<String>,
}

/// Admin listing entry
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AdminReview {
    #[serde(flatten)]
    pub review: Review,
    pub user: Option<UserSummary>,
    pub service: Option<ServiceSummary>,
}

/// Whether every purchased item of an enquiry carries a review.
/// Stored as the `is_reviewed` boolean.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ReviewCompletion {
    Pending,
    Complete,
}

/// What a recompute did to the cached aggregate.
#[derive(Debug, Clone, PartialEq)]
pub enum AggregateOutcome {
    Updated { index: usize, rating: f64, num_reviews: u32 },
    /// The catalog service no longer exists.
    ServiceMissing,
    /// No sub-service matched the identifier.
    Unresolved,
}
