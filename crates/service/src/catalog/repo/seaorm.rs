use std::collections::HashMap;

use chrono::Utc;
use sea_orm::DatabaseConnection;
use uuid::Uuid;

use crate::catalog::domain::{CatalogEntry, NewCatalogEntry, SubService};
use crate::catalog::repository::CatalogRepository;
use crate::errors::ServiceError;
use models::{catalog_service, sub_service};

pub struct SeaOrmCatalogRepository {
    pub db: DatabaseConnection,
}

pub(crate) fn to_sub_service(m: sub_service::Model) -> SubService {
    let issues_resolved = sub_service::issues_resolved(&m);
    SubService {
        id: m.id,
        name: m.name,
        description: m.description,
        price: m.price,
        actual_price: m.actual_price,
        image_url: m.image_url,
        issues_resolved,
        rating: m.rating,
        num_reviews: u32::try_from(m.num_reviews).unwrap_or(0),
    }
}

pub(crate) fn to_entry(m: catalog_service::Model, subs: Vec<sub_service::Model>) -> CatalogEntry {
    CatalogEntry {
        id: m.id,
        category: m.category,
        title: m.title,
        description: m.description,
        image_url: m.image_url,
        is_active: m.is_active,
        created_at: m.created_at.with_timezone(&Utc),
        updated_at: m.updated_at.with_timezone(&Utc),
        sub_services: subs.into_iter().map(to_sub_service).collect(),
    }
}

#[async_trait::async_trait]
impl CatalogRepository for SeaOrmCatalogRepository {
    async fn create(&self, input: NewCatalogEntry) -> Result<CatalogEntry, ServiceError> {
        let drafts = input
            .sub_services
            .into_iter()
            .map(|s| sub_service::SubServiceDraft {
                name: s.name,
                description: s.description,
                price: s.price,
                actual_price: s.actual_price,
                image_url: s.image_url,
                issues_resolved: s.issues_resolved,
            })
            .collect();
        let (created, subs) = catalog_service::create(
            &self.db,
            &input.category,
            &input.title,
            &input.description,
            &input.image_url,
            drafts,
        )
        .await?;
        Ok(to_entry(created, subs))
    }

    async fn get(&self, id: Uuid) -> Result<Option<CatalogEntry>, ServiceError> {
        let found = catalog_service::find_with_sub_services(&self.db, id).await?;
        Ok(found.map(|(svc, subs)| to_entry(svc, subs)))
    }

    async fn list_active(&self) -> Result<Vec<CatalogEntry>, ServiceError> {
        let services = catalog_service::list_active(&self.db).await?;
        let subs = sub_service::list_for_services(&self.db, services.iter().map(|s| s.id).collect()).await?;
        let mut by_service: HashMap<Uuid, Vec<sub_service::Model>> = HashMap::new();
        for s in subs {
            by_service.entry(s.service_id).or_default().push(s);
        }
        Ok(services
            .into_iter()
            .map(|svc| {
                let subs = by_service.remove(&svc.id).unwrap_or_default();
                to_entry(svc, subs)
            })
            .collect())
    }
}
