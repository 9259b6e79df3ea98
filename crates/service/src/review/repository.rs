use std::collections::HashMap;

use async_trait::async_trait;
use uuid::Uuid;

use super::domain::{Review, ReviewRecord, ServiceSummary, UserSummary};
use super::errors::ReviewError;
use crate::catalog::domain::CatalogEntry;
use crate::enquiry::domain::Enquiry;

/// Persistence the review workflow needs. Implementations must reject a
/// second review for the same (user, enquiry, sub-service identifier) with
/// `ReviewError::Conflict`, atomically with the insert.
#[async_trait]
pub trait ReviewRepository: Send + Sync {
    async fn find_enquiry(&self, enquiry_id: Uuid) -> Result<Option<Enquiry>, ReviewError>;
    async fn find_enquiry_for_user(&self, enquiry_id: Uuid, user_id: Uuid) -> Result<Option<Enquiry>, ReviewError>;
    async fn mark_enquiry_reviewed(&self, enquiry_id: Uuid) -> Result<(), ReviewError>;

    async fn find_review(&self, user_id: Uuid, enquiry_id: Uuid, sub_service_id: &str) -> Result<Option<Review>, ReviewError>;
    async fn insert_review(&self, record: ReviewRecord) -> Result<Review, ReviewError>;
    /// Ratings of every review whose identifier equals `sub_service_id` exactly.
    async fn ratings_for(&self, sub_service_id: &str) -> Result<Vec<u8>, ReviewError>;
    /// Distinct sub-service identifiers reviewed within the enquiry.
    async fn count_reviewed_items(&self, enquiry_id: Uuid) -> Result<usize, ReviewError>;
    async fn list_by_sub_service(&self, sub_service_id: &str) -> Result<Vec<Review>, ReviewError>;
    async fn list_reviews(&self) -> Result<Vec<Review>, ReviewError>;

    async fn find_catalog_entry(&self, service_id: Uuid) -> Result<Option<CatalogEntry>, ReviewError>;
    async fn set_sub_service_aggregate(&self, sub_service_id: Uuid, rating: f64, num_reviews: u32) -> Result<(), ReviewError>;

    async fn user_summaries(&self, user_ids: Vec<Uuid>) -> Result<HashMap<Uuid, UserSummary>, ReviewError>;
    async fn service_summaries(&self, service_ids: Vec<Uuid>) -> Result<HashMap<Uuid, ServiceSummary>, ReviewError>;
}
