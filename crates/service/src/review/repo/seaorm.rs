use std::collections::HashMap;

use chrono::Utc;
use sea_orm::DatabaseConnection;
use uuid::Uuid;

use crate::catalog::domain::CatalogEntry;
use crate::catalog::repo::seaorm::to_entry;
use crate::enquiry::domain::Enquiry;
use crate::enquiry::repo::seaorm::to_enquiry;
use crate::review::domain::{Review, ReviewRecord, ServiceSummary, UserSummary};
use crate::review::errors::ReviewError;
use crate::review::repository::ReviewRepository;
use models::{catalog_service, enquiry, enquiry_item, review, sub_service, user};

pub struct SeaOrmReviewRepository {
    pub db: DatabaseConnection,
}

fn to_review(m: review::Model) -> Result<Review, ReviewError> {
    let rating = u8::try_from(m.rating).map_err(|_| ReviewError::Repository(format!("stored rating {} out of range", m.rating)))?;
    Ok(Review {
        id: m.id,
        user_id: m.user_id,
        service_id: m.service_id,
        sub_service_id: m.sub_service_id,
        sub_service_name: m.sub_service_name,
        rating,
        comment: m.comment,
        enquiry_id: m.enquiry_id,
        created_at: m.created_at.with_timezone(&Utc),
        updated_at: m.updated_at.with_timezone(&Utc),
    })
}

impl SeaOrmReviewRepository {
    async fn load_items(&self, found: Option<enquiry::Model>) -> Result<Option<Enquiry>, ReviewError> {
        let Some(found) = found else { return Ok(None) };
        let items = enquiry_item::list_for_enquiry(&self.db, found.id).await?;
        to_enquiry(found, items).map(Some).map_err(ReviewError::Repository)
    }
}

#[async_trait::async_trait]
impl ReviewRepository for SeaOrmReviewRepository {
    async fn find_enquiry(&self, enquiry_id: Uuid) -> Result<Option<Enquiry>, ReviewError> {
        let found = enquiry::find(&self.db, enquiry_id).await?;
        self.load_items(found).await
    }

    async fn find_enquiry_for_user(&self, enquiry_id: Uuid, user_id: Uuid) -> Result<Option<Enquiry>, ReviewError> {
        let found = enquiry::find_for_user(&self.db, enquiry_id, user_id).await?;
        self.load_items(found).await
    }

    async fn mark_enquiry_reviewed(&self, enquiry_id: Uuid) -> Result<(), ReviewError> {
        enquiry::mark_reviewed(&self.db, enquiry_id).await?;
        Ok(())
    }

    async fn find_review(&self, user_id: Uuid, enquiry_id: Uuid, sub_service_id: &str) -> Result<Option<Review>, ReviewError> {
        review::find_by_key(&self.db, user_id, enquiry_id, sub_service_id)
            .await?
            .map(to_review)
            .transpose()
    }

    async fn insert_review(&self, record: ReviewRecord) -> Result<Review, ReviewError> {
        let draft = review::ReviewDraft {
            user_id: record.user_id,
            service_id: record.service_id,
            sub_service_id: record.sub_service_id,
            sub_service_name: record.sub_service_name,
            rating: i32::from(record.rating),
            comment: record.comment,
            enquiry_id: record.enquiry_id,
        };
        // unique index violation arrives as ModelError::Conflict
        let created = review::create(&self.db, draft).await?;
        to_review(created)
    }

    async fn ratings_for(&self, sub_service_id: &str) -> Result<Vec<u8>, ReviewError> {
        let ratings = review::ratings_for_sub_service(&self.db, sub_service_id).await?;
        Ok(ratings.into_iter().filter_map(|r| u8::try_from(r).ok()).collect())
    }

    async fn count_reviewed_items(&self, enquiry_id: Uuid) -> Result<usize, ReviewError> {
        let n = review::count_reviewed_items(&self.db, enquiry_id).await?;
        Ok(usize::try_from(n).unwrap_or(usize::MAX))
    }

    async fn list_by_sub_service(&self, sub_service_id: &str) -> Result<Vec<Review>, ReviewError> {
        review::list_by_sub_service(&self.db, sub_service_id)
            .await?
            .into_iter()
            .map(to_review)
            .collect()
    }

    async fn list_reviews(&self) -> Result<Vec<Review>, ReviewError> {
        review::list_all(&self.db).await?.into_iter().map(to_review).collect()
    }

    async fn find_catalog_entry(&self, service_id: Uuid) -> Result<Option<CatalogEntry>, ReviewError> {
        let found = catalog_service::find_with_sub_services(&self.db, service_id).await?;
        Ok(found.map(|(svc, subs)| to_entry(svc, subs)))
    }

    async fn set_sub_service_aggregate(&self, sub_service_id: Uuid, rating: f64, num_reviews: u32) -> Result<(), ReviewError> {
        let num_reviews = i32::try_from(num_reviews).unwrap_or(i32::MAX);
        sub_service::set_aggregate(&self.db, sub_service_id, rating, num_reviews).await?;
        Ok(())
    }

    async fn user_summaries(&self, user_ids: Vec<Uuid>) -> Result<HashMap<Uuid, UserSummary>, ReviewError> {
        let mut ids = user_ids;
        ids.sort();
        ids.dedup();
        let users = user::find_many(&self.db, ids).await?;
        Ok(users.into_iter().map(|u| (u.id, UserSummary { name: u.name, phone: u.phone })).collect())
    }

    async fn service_summaries(&self, service_ids: Vec<Uuid>) -> Result<HashMap<Uuid, ServiceSummary>, ReviewError> {
        let mut ids = service_ids;
        ids.sort();
        ids.dedup();
        let services = catalog_service::find_many(&self.db, ids).await?;
        Ok(services
            .into_iter()
            .map(|s| (s.id, ServiceSummary { title: s.title, category: s.category }))
            .collect())
    }
}
