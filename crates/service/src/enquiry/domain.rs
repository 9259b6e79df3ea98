use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum EnquiryStatus {
    Pending,
    InProgress,
    Completed,
    Cancelled,
}

impl EnquiryStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            EnquiryStatus::Pending => "pending",
            EnquiryStatus::InProgress => "in-progress",
            EnquiryStatus::Completed => "completed",
            EnquiryStatus::Cancelled => "cancelled",
        }
    }
}

impl fmt::Display for EnquiryStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result { f.write_str(self.as_str()) }
}

impl FromStr for EnquiryStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending" => Ok(EnquiryStatus::Pending),
            "in-progress" => Ok(EnquiryStatus::InProgress),
            "completed" => Ok(EnquiryStatus::Completed),
            "cancelled" => Ok(EnquiryStatus::Cancelled),
            other => Err(format!("invalid status `{other}`")),
        }
    }
}

/// Snapshot of one purchased sub-service, frozen at order time.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EnquiryItem {
    pub service_id: Uuid,
    pub sub_service_id: String,
    pub name: String,
    pub price: f64,
    pub quantity: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Enquiry {
    pub id: Uuid,
    pub user_id: Uuid,
    pub service_type: String,
    pub appliance_type: String,
    pub message: String,
    pub address: String,
    pub landmark: String,
    pub city: String,
    pub state: String,
    pub pincode: String,
    pub brand: String,
    pub status: EnquiryStatus,
    pub is_reviewed: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub items: Vec<EnquiryItem>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewEnquiryItem {
    pub service_id: Uuid,
    #[serde(default)]
    pub sub_service_id: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub price: f64,
    #[serde(default = "default_quantity")]
    pub quantity: u32,
}

fn default_quantity() -> u32 { 1 }

/// Customer input for a new enquiry
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct NewEnquiry {
    pub service_type: String,
    pub appliance_type: String,
    pub message: String,
    pub address: String,
    pub landmark: String,
    pub city: String,
    pub state: String,
    pub pincode: String,
    pub brand: String,
    pub items: Vec<NewEnquiryItem>,
}
