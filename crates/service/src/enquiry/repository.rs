use async_trait::async_trait;
use uuid::Uuid;

use super::domain::{Enquiry, EnquiryStatus, NewEnquiry};
use crate::errors::ServiceError;

/// Repository abstraction for enquiries. Listings are newest first.
#[async_trait]
pub trait EnquiryRepository: Send + Sync {
    async fn create(&self, user_id: Uuid, input: NewEnquiry) -> Result<Enquiry, ServiceError>;
    async fn list_for_user(&self, user_id: Uuid) -> Result<Vec<Enquiry>, ServiceError>;
    async fn list_all(&self) -> Result<Vec<Enquiry>, ServiceError>;
    /// `None` when no enquiry has this id.
    async fn set_status(&self, id: Uuid, status: EnquiryStatus) -> Result<Option<Enquiry>, ServiceError>;
}
