use std::collections::{HashMap, HashSet};

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::catalog::domain::{CatalogEntry, NewCatalogEntry, SubService};
use crate::catalog::repository::CatalogRepository;
use crate::enquiry::domain::{Enquiry, EnquiryItem, EnquiryStatus, NewEnquiry};
use crate::enquiry::repository::EnquiryRepository;
use crate::errors::ServiceError;
use crate::review::domain::{Review, ReviewRecord, ServiceSummary, UserSummary};
use crate::review::errors::ReviewError;
use crate::review::repository::ReviewRepository;

#[derive(Debug, Clone)]
struct StoredUser {
    name: String,
    phone: String,
}

#[derive(Default)]
struct Inner {
    users: HashMap<Uuid, StoredUser>,
    // insertion order; listings walk these backwards for newest first
    catalog: Vec<CatalogEntry>,
    enquiries: Vec<Enquiry>,
    reviews: Vec<Review>,
}

/// In-process store backing all repositories.
#[derive(Default)]
pub struct MemoryStore {
    inner: RwLock<Inner>,
}

impl MemoryStore {
    pub fn new() -> Self { Self::default() }

    /// Register a user so listings can attach name and phone.
    pub async fn insert_user(&self, id: Uuid, name: &str, phone: &str) {
        let mut inner = self.inner.write().await;
        inner.users.insert(id, StoredUser { name: name.to_string(), phone: phone.to_string() });
    }

    /// Insert or replace a catalog entry as-is, keeping the given ids.
    pub async fn put_catalog_entry(&self, entry: CatalogEntry) {
        let mut inner = self.inner.write().await;
        inner.catalog.retain(|e| e.id != entry.id);
        inner.catalog.push(entry);
    }

    /// Insert or replace an enquiry as-is.
    pub async fn put_enquiry(&self, enquiry: Enquiry) {
        let mut inner = self.inner.write().await;
        inner.enquiries.retain(|e| e.id != enquiry.id);
        inner.enquiries.push(enquiry);
    }

    pub async fn catalog_entry(&self, id: Uuid) -> Option<CatalogEntry> {
        self.inner.read().await.catalog.iter().find(|e| e.id == id).cloned()
    }

    pub async fn enquiry(&self, id: Uuid) -> Option<Enquiry> {
        self.inner.read().await.enquiries.iter().find(|e| e.id == id).cloned()
    }
}

#[async_trait]
impl ReviewRepository for MemoryStore {
    async fn find_enquiry(&self, enquiry_id: Uuid) -> Result<Option<Enquiry>, ReviewError> {
        Ok(self.enquiry(enquiry_id).await)
    }

    async fn find_enquiry_for_user(&self, enquiry_id: Uuid, user_id: Uuid) -> Result<Option<Enquiry>, ReviewError> {
        Ok(self.enquiry(enquiry_id).await.filter(|e| e.user_id == user_id))
    }

    async fn mark_enquiry_reviewed(&self, enquiry_id: Uuid) -> Result<(), ReviewError> {
        let mut inner = self.inner.write().await;
        let enquiry = inner
            .enquiries
            .iter_mut()
            .find(|e| e.id == enquiry_id)
            .ok_or_else(|| ReviewError::NotFound("enquiry not found".into()))?;
        enquiry.is_reviewed = true;
        enquiry.updated_at = Utc::now();
        Ok(())
    }

    async fn find_review(&self, user_id: Uuid, enquiry_id: Uuid, sub_service_id: &str) -> Result<Option<Review>, ReviewError> {
        let inner = self.inner.read().await;
        Ok(inner
            .reviews
            .iter()
            .find(|r| r.user_id == user_id && r.enquiry_id == enquiry_id && r.sub_service_id == sub_service_id)
            .cloned())
    }

    async fn insert_review(&self, record: ReviewRecord) -> Result<Review, ReviewError> {
        let mut inner = self.inner.write().await;
        let duplicate = inner.reviews.iter().any(|r| {
            r.user_id == record.user_id && r.enquiry_id == record.enquiry_id && r.sub_service_id == record.sub_service_id
        });
        if duplicate {
            return Err(ReviewError::already_reviewed());
        }
        let now = Utc::now();
        let review = Review {
            id: Uuid::new_v4(),
            user_id: record.user_id,
            service_id: record.service_id,
            sub_service_id: record.sub_service_id,
            sub_service_name: record.sub_service_name,
            rating: record.rating,
            comment: record.comment,
            enquiry_id: record.enquiry_id,
            created_at: now,
            updated_at: now,
        };
        inner.reviews.push(review.clone());
        Ok(review)
    }

    async fn ratings_for(&self, sub_service_id: &str) -> Result<Vec<u8>, ReviewError> {
        let inner = self.inner.read().await;
        Ok(inner.reviews.iter().filter(|r| r.sub_service_id == sub_service_id).map(|r| r.rating).collect())
    }

    async fn count_reviewed_items(&self, enquiry_id: Uuid) -> Result<usize, ReviewError> {
        let inner = self.inner.read().await;
        let distinct: HashSet<&str> = inner
            .reviews
            .iter()
            .filter(|r| r.enquiry_id == enquiry_id)
            .map(|r| r.sub_service_id.as_str())
            .collect();
        Ok(distinct.len())
    }

    async fn list_by_sub_service(&self, sub_service_id: &str) -> Result<Vec<Review>, ReviewError> {
        let inner = self.inner.read().await;
        Ok(inner.reviews.iter().rev().filter(|r| r.sub_service_id == sub_service_id).cloned().collect())
    }

    async fn list_reviews(&self) -> Result<Vec<Review>, ReviewError> {
        let inner = self.inner.read().await;
        Ok(inner.reviews.iter().rev().cloned().collect())
    }

    async fn find_catalog_entry(&self, service_id: Uuid) -> Result<Option<CatalogEntry>, ReviewError> {
        Ok(self.catalog_entry(service_id).await)
    }

    async fn set_sub_service_aggregate(&self, sub_service_id: Uuid, rating: f64, num_reviews: u32) -> Result<(), ReviewError> {
        let mut inner = self.inner.write().await;
        let sub = inner
            .catalog
            .iter_mut()
            .flat_map(|e| e.sub_services.iter_mut())
            .find(|s| s.id == sub_service_id)
            .ok_or_else(|| ReviewError::NotFound("sub-service not found".into()))?;
        sub.rating = rating;
        sub.num_reviews = num_reviews;
        Ok(())
    }

    async fn user_summaries(&self, user_ids: Vec<Uuid>) -> Result<HashMap<Uuid, UserSummary>, ReviewError> {
        let inner = self.inner.read().await;
        Ok(user_ids
            .into_iter()
            .filter_map(|id| {
                inner.users.get(&id).map(|u| (id, UserSummary { name: u.name.clone(), phone: u.phone.clone() }))
            })
            .collect())
    }

    async fn service_summaries(&self, service_ids: Vec<Uuid>) -> Result<HashMap<Uuid, ServiceSummary>, ReviewError> {
        let inner = self.inner.read().await;
        Ok(inner
            .catalog
            .iter()
            .filter(|e| service_ids.contains(&e.id))
            .map(|e| (e.id, ServiceSummary { title: e.title.clone(), category: e.category.clone() }))
            .collect())
    }
}

#[async_trait]
impl CatalogRepository for MemoryStore {
    async fn create(&self, input: NewCatalogEntry) -> Result<CatalogEntry, ServiceError> {
        let now = Utc::now();
        let entry = CatalogEntry {
            id: Uuid::new_v4(),
            category: input.category,
            title: input.title,
            description: input.description,
            image_url: input.image_url,
            is_active: true,
            created_at: now,
            updated_at: now,
            sub_services: input
                .sub_services
                .into_iter()
                .map(|s| SubService {
                    id: Uuid::new_v4(),
                    name: s.name,
                    description: s.description,
                    price: s.price,
                    actual_price: s.actual_price,
                    image_url: s.image_url,
                    issues_resolved: s.issues_resolved,
                    rating: 0.0,
                    num_reviews: 0,
                })
                .collect(),
        };
        self.inner.write().await.catalog.push(entry.clone());
        Ok(entry)
    }

    async fn get(&self, id: Uuid) -> Result<Option<CatalogEntry>, ServiceError> {
        Ok(self.catalog_entry(id).await)
    }

    async fn list_active(&self) -> Result<Vec<CatalogEntry>, ServiceError> {
        let inner = self.inner.read().await;
        Ok(inner.catalog.iter().rev().filter(|e| e.is_active).cloned().collect())
    }
}

#[async_trait]
impl EnquiryRepository for MemoryStore {
    async fn create(&self, user_id: Uuid, input: NewEnquiry) -> Result<Enquiry, ServiceError> {
        let now = Utc::now();
        let enquiry = Enquiry {
            id: Uuid::new_v4(),
            user_id,
            service_type: input.service_type,
            appliance_type: input.appliance_type,
            message: input.message,
            address: input.address,
            landmark: input.landmark,
            city: input.city,
            state: input.state,
            pincode: input.pincode,
            brand: input.brand,
            status: EnquiryStatus::Pending,
            is_reviewed: false,
            created_at: now,
            updated_at: now,
            items: input
                .items
                .into_iter()
                .map(|i| EnquiryItem {
                    service_id: i.service_id,
                    sub_service_id: i.sub_service_id,
                    name: i.name,
                    price: i.price,
                    quantity: i.quantity,
                })
                .collect(),
        };
        self.inner.write().await.enquiries.push(enquiry.clone());
        Ok(enquiry)
    }

    async fn list_for_user(&self, user_id: Uuid) -> Result<Vec<Enquiry>, ServiceError> {
        let inner = self.inner.read().await;
        Ok(inner.enquiries.iter().rev().filter(|e| e.user_id == user_id).cloned().collect())
    }

    async fn list_all(&self) -> Result<Vec<Enquiry>, ServiceError> {
        let inner = self.inner.read().await;
        Ok(inner.enquiries.iter().rev().cloned().collect())
    }

    async fn set_status(&self, id: Uuid, status: EnquiryStatus) -> Result<Option<Enquiry>, ServiceError> {
        let mut inner = self.inner.write().await;
        let Some(enquiry) = inner.enquiries.iter_mut().find(|e| e.id == id) else {
            return Ok(None);
        };
        enquiry.status = status;
        enquiry.updated_at = Utc::now();
        Ok(Some(enquiry.clone()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(user_id: Uuid, enquiry_id: Uuid, sub: &str, rating: u8) -> ReviewRecord {
        ReviewRecord {
            user_id,
            service_id: Uuid::new_v4(),
            sub_service_id: sub.into(),
            sub_service_name: "Repair".into(),
            rating,
            comment: None,
            enquiry_id,
        }
    }

    #[tokio::test]
    async fn duplicate_insert_is_rejected_under_lock() {
        let store = MemoryStore::new();
        let (u, e) = (Uuid::new_v4(), Uuid::new_v4());
        store.insert_review(record(u, e, "s-0", 4)).await.unwrap();
        let err = store.insert_review(record(u, e, "s-0", 5)).await.unwrap_err();
        assert!(matches!(err, ReviewError::Conflict(_)));
        // another user, same enquiry and sub-service
        store.insert_review(record(Uuid::new_v4(), e, "s-0", 5)).await.unwrap();
        assert_eq!(store.ratings_for("s-0").await.unwrap(), vec![4, 5]);
    }

    #[tokio::test]
    async fn reviewed_items_counts_distinct_identifiers() {
        let store = MemoryStore::new();
        let e = Uuid::new_v4();
        store.insert_review(record(Uuid::new_v4(), e, "s-0", 4)).await.unwrap();
        store.insert_review(record(Uuid::new_v4(), e, "s-0", 2)).await.unwrap();
        store.insert_review(record(Uuid::new_v4(), e, "s-1", 2)).await.unwrap();
        assert_eq!(store.count_reviewed_items(e).await.unwrap(), 2);
    }

    #[tokio::test]
    async fn listings_are_newest_first() {
        let store = MemoryStore::new();
        let u = Uuid::new_v4();
        let first = EnquiryRepository::create(&store, u, NewEnquiry::default()).await.unwrap();
        let second = EnquiryRepository::create(&store, u, NewEnquiry::default()).await.unwrap();
        let listed = store.list_for_user(u).await.unwrap();
        assert_eq!(listed.iter().map(|e| e.id).collect::<Vec<_>>(), vec![second.id, first.id]);
    }
}
