use std::sync::Arc;

use tracing::{info, instrument};
use uuid::Uuid;

use super::domain::{CatalogEntry, NewCatalogEntry};
use super::repository::CatalogRepository;
use crate::errors::ServiceError;

fn validate(input: &NewCatalogEntry) -> Result<(), ServiceError> {
    if input.category.trim().is_empty() {
        return Err(ServiceError::Validation("category required".into()));
    }
    if !models::catalog_service::CATEGORIES.contains(&input.category.as_str()) {
        return Err(ServiceError::Validation(format!("unknown category `{}`", input.category)));
    }
    if input.title.trim().is_empty() {
        return Err(ServiceError::Validation("title required".into()));
    }
    for (i, s) in input.sub_services.iter().enumerate() {
        if s.name.trim().is_empty() {
            return Err(ServiceError::Validation(format!("subServices[{i}].name required")));
        }
        if !s.price.is_finite() || s.price < 0.0 {
            return Err(ServiceError::Validation(format!("subServices[{i}].price must be non-negative")));
        }
    }
    Ok(())
}

pub struct CatalogService<R: CatalogRepository + ?Sized> {
    repo: Arc<R>,
}

impl<R: CatalogRepository + ?Sized> CatalogService<R> {
    pub fn new(repo: Arc<R>) -> Self { Self { repo } }

    /// Create a catalog service; sub-services start unrated.
    ///
    /// # Examples
    /// ```
    /// use std::sync::Arc;
    /// use service::catalog::{CatalogService, domain::{NewCatalogEntry, NewSubService}};
    /// use service::storage::MemoryStore;
    /// let svc = CatalogService::new(Arc::new(MemoryStore::new()));
    /// let input = NewCatalogEntry {
    ///     category: "Geysers".into(),
    ///     title: "Geyser repair".into(),
    ///     sub_services: vec![NewSubService { name: "Thermostat swap".into(), price: 350.0, ..Default::default() }],
    ///     ..Default::default()
    /// };
    /// let entry = tokio_test::block_on(svc.create_service(input)).unwrap();
    /// assert_eq!(entry.sub_services[0].num_reviews, 0);
    /// ```
    #[instrument(skip(self, input), fields(category = %input.category, title = %input.title))]
    pub async fn create_service(&self, input: NewCatalogEntry) -> Result<CatalogEntry, ServiceError> {
        validate(&input)?;
        let entry = self.repo.create(input).await?;
        info!(service_id = %entry.id, sub_services = entry.sub_services.len(), "catalog_service_created");
        Ok(entry)
    }

    #[instrument(skip(self))]
    pub async fn get_service(&self, id: Uuid) -> Result<CatalogEntry, ServiceError> {
        self.repo.get(id).await?.ok_or_else(|| ServiceError::not_found("service"))
    }

    pub async fn list_active(&self) -> Result<Vec<CatalogEntry>, ServiceError> {
        self.repo.list_active().await
    }
}
