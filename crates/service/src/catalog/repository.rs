use async_trait::async_trait;
use uuid::Uuid;

use super::domain::{CatalogEntry, NewCatalogEntry};
use crate::errors::ServiceError;

/// Repository abstraction for the service catalog.
#[async_trait]
pub trait CatalogRepository: Send + Sync {
    async fn create(&self, input: NewCatalogEntry) -> Result<CatalogEntry, ServiceError>;
    async fn get(&self, id: Uuid) -> Result<Option<CatalogEntry>, ServiceError>;
    /// Active entries, newest first.
    async fn list_active(&self) -> Result<Vec<CatalogEntry>, ServiceError>;
}
