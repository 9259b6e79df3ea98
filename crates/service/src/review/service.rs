use std::sync::Arc;

use tracing::{debug, info, instrument, warn};
use uuid::Uuid;

use super::domain::{
    AdminReview, AggregateOutcome, NewReview, Review, ReviewCompletion, ReviewRecord, ReviewWithReviewer,
};
use super::errors::ReviewError;
use super::identifier::SubServiceRef;
use super::metrics::{DUPLICATE_REVIEWS_TOTAL, REVIEWS_CREATED_TOTAL, UNRESOLVED_SUB_SERVICE_TOTAL};
use super::repository::ReviewRepository;
use crate::enquiry::domain::EnquiryStatus;

/// A submission that passed field validation.
struct CheckedReview {
    service_id: Uuid,
    sub_service: SubServiceRef,
    sub_service_name: String,
    enquiry_id: Uuid,
    rating: u8,
    comment: Option<String>,
}

fn required<'a>(value: &'a str, field: &str) -> Result<&'a str, ReviewError> {
    let v = value.trim();
    if v.is_empty() {
        return Err(ReviewError::Validation(format!("{field} is required")));
    }
    Ok(v)
}

/// Column widths of `review.sub_service_id` and `review.sub_service_name`.
const SUB_SERVICE_ID_MAX: usize = 128;
const SUB_SERVICE_NAME_MAX: usize = 256;

fn bounded<'a>(value: &'a str, field: &str, max: usize) -> Result<&'a str, ReviewError> {
    if value.chars().count() > max {
        return Err(ReviewError::Validation(format!("{field} must be at most {max} characters")));
    }
    Ok(value)
}

fn parse_uuid(value: &str, field: &str) -> Result<Uuid, ReviewError> {
    Uuid::parse_str(value).map_err(|_| ReviewError::Validation(format!("{field} is not a valid id")))
}

fn check(input: NewReview) -> Result<CheckedReview, ReviewError> {
    let service_id = required(&input.service_id, "serviceId")?;
    let sub_service_id = bounded(required(&input.sub_service_id, "subServiceId")?, "subServiceId", SUB_SERVICE_ID_MAX)?;
    let sub_service_name =
        bounded(required(&input.sub_service_name, "subServiceName")?, "subServiceName", SUB_SERVICE_NAME_MAX)?;
    let enquiry_id = required(&input.enquiry_id, "enquiryId")?;
    let rating = input.rating.ok_or_else(|| ReviewError::Validation("rating is required".into()))?;

    if rating.fract() != 0.0 || !(1.0..=5.0).contains(&rating) {
        return Err(ReviewError::Validation("rating must be an integer between 1 and 5".into()));
    }

    Ok(CheckedReview {
        service_id: parse_uuid(service_id, "serviceId")?,
        sub_service: SubServiceRef::parse(sub_service_id),
        sub_service_name: sub_service_name.to_string(),
        enquiry_id: parse_uuid(enquiry_id, "enquiryId")?,
        rating: rating as u8,
        comment: input.comment.map(|c| c.trim().to_string()).filter(|c| !c.is_empty()),
    })
}

fn mean(ratings: &[u8]) -> f64 {
    if ratings.is_empty() {
        return 0.0;
    }
    ratings.iter().map(|r| f64::from(*r)).sum::<f64>() / ratings.len() as f64
}

/// Review workflow independent of web framework
pub struct ReviewService<R: ReviewRepository + ?Sized> {
    repo: Arc<R>,
}

impl<R: ReviewRepository + ?Sized> ReviewService<R> {
    pub fn new(repo: Arc<R>) -> Self { Self { repo } }

    /// Record a review for a purchased sub-service, then refresh the
    /// sub-service aggregate and the enquiry's completion flag.
    ///
    /// The identifier is not checked against the enquiry's items; any
    /// identifier is accepted once the enquiry is owned and completed.
    ///
    /// # Examples
    /// ```
    /// use std::sync::Arc;
    /// use chrono::Utc;
    /// use uuid::Uuid;
    /// use service::enquiry::domain::{Enquiry, EnquiryStatus};
    /// use service::review::{ReviewService, domain::NewReview};
    /// use service::storage::MemoryStore;
    ///
    /// let store = Arc::new(MemoryStore::new());
    /// let user_id = Uuid::new_v4();
    /// let enquiry = Enquiry {
    ///     id: Uuid::new_v4(), user_id, service_type: "repair".into(), appliance_type: "TV".into(),
    ///     message: "no picture".into(), address: "1 Main St".into(), landmark: String::new(),
    ///     city: "Pune".into(), state: "MH".into(), pincode: "411001".into(), brand: String::new(),
    ///     status: EnquiryStatus::Completed, is_reviewed: false,
    ///     created_at: Utc::now(), updated_at: Utc::now(), items: vec![],
    /// };
    /// tokio_test::block_on(store.put_enquiry(enquiry.clone()));
    /// let svc = ReviewService::new(store.clone());
    /// let input = NewReview {
    ///     service_id: Uuid::new_v4().to_string(), sub_service_id: "svc1-0".into(),
    ///     sub_service_name: "Panel repair".into(), enquiry_id: enquiry.id.to_string(),
    ///     rating: Some(5.0), comment: None,
    /// };
    /// let review = tokio_test::block_on(svc.submit(user_id, input)).unwrap();
    /// assert_eq!(review.rating, 5);
    /// assert!(tokio_test::block_on(store.enquiry(enquiry.id)).unwrap().is_reviewed);
    /// ```
    #[instrument(skip(self, input), fields(user_id = %user_id, enquiry_id = %input.enquiry_id, sub_service_id = %input.sub_service_id))]
    pub async fn submit(&self, user_id: Uuid, input: NewReview) -> Result<Review, ReviewError> {
        let checked = check(input)?;

        let enquiry = self
            .repo
            .find_enquiry_for_user(checked.enquiry_id, user_id)
            .await?
            .ok_or_else(|| ReviewError::NotFound("enquiry not found or unauthorized".into()))?;
        if enquiry.status != EnquiryStatus::Completed {
            return Err(ReviewError::InvalidState("only completed enquiries can be reviewed".into()));
        }

        let raw = checked.sub_service.raw().to_string();
        if self.repo.find_review(user_id, enquiry.id, &raw).await?.is_some() {
            return Err(self.reject_duplicate(enquiry.id).await);
        }

        let record = ReviewRecord {
            user_id,
            service_id: checked.service_id,
            sub_service_id: raw,
            sub_service_name: checked.sub_service_name,
            rating: checked.rating,
            comment: checked.comment,
            enquiry_id: enquiry.id,
        };
        let review = match self.repo.insert_review(record).await {
            Ok(review) => review,
            // lost a race against a concurrent identical submission
            Err(ReviewError::Conflict(_)) => return Err(self.reject_duplicate(enquiry.id).await),
            Err(e) => return Err(e),
        };
        REVIEWS_CREATED_TOTAL.inc();
        info!(review_id = %review.id, rating = review.rating, "review_created");

        self.recompute(review.service_id, &checked.sub_service).await?;
        self.reconcile(enquiry.id).await?;
        Ok(review)
    }

    /// Rebuild the cached rating of the sub-service `sub_service` points at
    /// from every review carrying that exact identifier.
    #[instrument(skip(self), fields(service_id = %service_id, sub_service_id = %sub_service))]
    pub async fn recompute(&self, service_id: Uuid, sub_service: &SubServiceRef) -> Result<AggregateOutcome, ReviewError> {
        let ratings = self.repo.ratings_for(sub_service.raw()).await?;
        let rating = mean(&ratings);
        let num_reviews = u32::try_from(ratings.len()).unwrap_or(u32::MAX);

        let Some(entry) = self.repo.find_catalog_entry(service_id).await? else {
            debug!("catalog service missing, aggregate not written");
            return Ok(AggregateOutcome::ServiceMissing);
        };
        let Some(index) = sub_service.resolve(&entry.sub_services) else {
            UNRESOLVED_SUB_SERVICE_TOTAL.inc();
            warn!(sub_services = entry.sub_services.len(), "sub-service identifier did not resolve, aggregate not written");
            return Ok(AggregateOutcome::Unresolved);
        };

        self.repo
            .set_sub_service_aggregate(entry.sub_services[index].id, rating, num_reviews)
            .await?;
        debug!(index, rating, num_reviews, "aggregate_updated");
        Ok(AggregateOutcome::Updated { index, rating, num_reviews })
    }

    /// Flip `is_reviewed` once every item of the enquiry has a review.
    /// Never clears the flag; safe to call any number of times.
    #[instrument(skip(self), fields(enquiry_id = %enquiry_id))]
    pub async fn reconcile(&self, enquiry_id: Uuid) -> Result<ReviewCompletion, ReviewError> {
        let enquiry = self
            .repo
            .find_enquiry(enquiry_id)
            .await?
            .ok_or_else(|| ReviewError::NotFound("enquiry not found".into()))?;
        if enquiry.is_reviewed {
            return Ok(ReviewCompletion::Complete);
        }

        // 老订单没有 items 时按 1 件计
        let total_items = enquiry.items.len().max(1);
        let reviewed = self.repo.count_reviewed_items(enquiry_id).await?;
        if reviewed < total_items {
            debug!(reviewed, total_items, "enquiry_review_pending");
            return Ok(ReviewCompletion::Pending);
        }

        self.repo.mark_enquiry_reviewed(enquiry_id).await?;
        info!(reviewed, total_items, "enquiry_fully_reviewed");
        Ok(ReviewCompletion::Complete)
    }

    /// Reviews carrying exactly this identifier, newest first.
    #[instrument(skip(self))]
    pub async fn list_for_sub_service(&self, sub_service_id: &str) -> Result<Vec<ReviewWithReviewer>, ReviewError> {
        let sub_service_id = required(sub_service_id, "subServiceId")?;
        let reviews = self.repo.list_by_sub_service(sub_service_id).await?;
        let users = self.repo.user_summaries(reviews.iter().map(|r| r.user_id).collect()).await?;
        Ok(reviews
            .into_iter()
            .map(|review| {
                let reviewer_name = users.get(&review.user_id).map(|u| u.name.clone());
                ReviewWithReviewer { review, reviewer_name }
            })
            .collect())
    }

    /// Every review, newest first, with user and service summaries.
    #[instrument(skip(self))]
    pub async fn list_all(&self) -> Result<Vec<AdminReview>, ReviewError> {
        let reviews = self.repo.list_reviews().await?;
        let users = self.repo.user_summaries(reviews.iter().map(|r| r.user_id).collect()).await?;
        let services = self.repo.service_summaries(reviews.iter().map(|r| r.service_id).collect()).await?;
        Ok(reviews
            .into_iter()
            .map(|review| AdminReview {
                user: users.get(&review.user_id).cloned(),
                service: services.get(&review.service_id).cloned(),
                review,
            })
            .collect())
    }

    /// Conflict path: repair a stale completion flag, then report the duplicate.
    async fn reject_duplicate(&self, enquiry_id: Uuid) -> ReviewError {
        DUPLICATE_REVIEWS_TOTAL.inc();
        if let Err(e) = self.reconcile(enquiry_id).await {
            warn!(error = %e, enquiry_id = %enquiry_id, "completion reconcile failed on duplicate review");
        }
        ReviewError::already_reviewed()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    use chrono::Utc;

    use crate::review::domain::{ServiceSummary, UserSummary};

    use crate::catalog::domain::{CatalogEntry, SubService};
    use crate::enquiry::domain::{Enquiry, EnquiryItem};
    use crate::storage::MemoryStore;

    struct Fixture {
        store: Arc<MemoryStore>,
        svc: ReviewService<MemoryStore>,
        user_id: Uuid,
        service_id: Uuid,
    }

    fn sub_service(name: &str) -> SubService {
        SubService {
            id: Uuid::new_v4(),
            name: name.into(),
            description: String::new(),
            price: 500.0,
            actual_price: None,
            image_url: String::new(),
            issues_resolved: vec![],
            rating: 0.0,
            num_reviews: 0,
        }
    }

    async fn fixture() -> Fixture {
        let store = Arc::new(MemoryStore::new());
        let user_id = Uuid::new_v4();
        store.insert_user(user_id, "Kiran", "9876543210").await;
        let service_id = Uuid::new_v4();
        store
            .put_catalog_entry(CatalogEntry {
                id: service_id,
                category: "Air Conditioner".into(),
                title: "AC service".into(),
                description: String::new(),
                image_url: String::new(),
                is_active: true,
                created_at: Utc::now(),
                updated_at: Utc::now(),
                sub_services: vec![sub_service("Gas refill"), sub_service("Deep clean")],
            })
            .await;
        let svc = ReviewService::new(store.clone());
        Fixture { store, svc, user_id, service_id }
    }

    impl Fixture {
        async fn enquiry(&self, status: EnquiryStatus, items: &[&str]) -> Uuid {
            self.enquiry_for(self.user_id, status, items).await
        }

        async fn enquiry_for(&self, user_id: Uuid, status: EnquiryStatus, items: &[&str]) -> Uuid {
            let id = Uuid::new_v4();
            self.store
                .put_enquiry(Enquiry {
                    id,
                    user_id,
                    service_type: "repair".into(),
                    appliance_type: "AC".into(),
                    message: "not cooling".into(),
                    address: "1 Main St".into(),
                    landmark: String::new(),
                    city: "Pune".into(),
                    state: "MH".into(),
                    pincode: "411001".into(),
                    brand: String::new(),
                    status,
                    is_reviewed: false,
                    created_at: Utc::now(),
                    updated_at: Utc::now(),
                    items: items
                        .iter()
                        .map(|s| EnquiryItem {
                            service_id: self.service_id,
                            sub_service_id: s.to_string(),
                            name: "item".into(),
                            price: 500.0,
                            quantity: 1,
                        })
                        .collect(),
                })
                .await;
            id
        }

        fn input(&self, enquiry_id: Uuid, sub: &str, rating: f64) -> NewReview {
            NewReview {
                service_id: self.service_id.to_string(),
                sub_service_id: sub.into(),
                sub_service_name: "Gas refill".into(),
                enquiry_id: enquiry_id.to_string(),
                rating: Some(rating),
                comment: Some("  great work ".into()),
            }
        }

        async fn sub(&self, index: usize) -> SubService {
            self.store.catalog_entry(self.service_id).await.unwrap().sub_services[index].clone()
        }

        async fn is_reviewed(&self, enquiry_id: Uuid) -> bool {
            self.store.enquiry(enquiry_id).await.unwrap().is_reviewed
        }
    }

    #[tokio::test]
    async fn worked_example_two_items() {
        let f = fixture().await;
        let enq = f.enquiry(EnquiryStatus::Completed, &["svc1-0", "svc1-1"]).await;

        let first = f.svc.submit(f.user_id, f.input(enq, "svc1-0", 5.0)).await.unwrap();
        assert_eq!(first.comment.as_deref(), Some("great work"));
        let s0 = f.sub(0).await;
        assert_eq!((s0.rating, s0.num_reviews), (5.0, 1));
        assert!(!f.is_reviewed(enq).await);

        f.svc.submit(f.user_id, f.input(enq, "svc1-1", 3.0)).await.unwrap();
        let s1 = f.sub(1).await;
        assert_eq!((s1.rating, s1.num_reviews), (3.0, 1));
        assert_eq!(f.sub(0).await.num_reviews, 1);
        assert!(f.is_reviewed(enq).await);
    }

    #[tokio::test]
    async fn submitted_review_is_listed_by_identifier() {
        let f = fixture().await;
        let enq = f.enquiry(EnquiryStatus::Completed, &["svc1-0"]).await;
        let created = f.svc.submit(f.user_id, f.input(enq, "svc1-0", 4.0)).await.unwrap();

        let listed = f.svc.list_for_sub_service("svc1-0").await.unwrap();
        assert_eq!(listed.len(), 1);
        assert_eq!(listed[0].review, created);
        assert_eq!(listed[0].reviewer_name.as_deref(), Some("Kiran"));
        assert!(f.svc.list_for_sub_service("svc1-1").await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn second_submit_is_conflict() {
        let f = fixture().await;
        let enq = f.enquiry(EnquiryStatus::Completed, &["svc1-0", "svc1-1"]).await;
        f.svc.submit(f.user_id, f.input(enq, "svc1-0", 4.0)).await.unwrap();
        for _ in 0..2 {
            let err = f.svc.submit(f.user_id, f.input(enq, "svc1-0", 2.0)).await.unwrap_err();
            assert!(matches!(err, ReviewError::Conflict(ref m) if m == "already reviewed"));
        }
        let s0 = f.sub(0).await;
        assert_eq!((s0.rating, s0.num_reviews), (4.0, 1));
    }

    #[tokio::test]
    async fn aggregate_is_mean_over_exact_identifier() {
        let f = fixture().await;
        let other = Uuid::new_v4();
        let mine = f.enquiry(EnquiryStatus::Completed, &["svc1-1"]).await;
        let theirs = f.enquiry_for(other, EnquiryStatus::Completed, &["svc1-1"]).await;

        f.svc.submit(f.user_id, f.input(mine, "svc1-1", 5.0)).await.unwrap();
        f.svc.submit(other, f.input(theirs, "svc1-1", 2.0)).await.unwrap();

        let s1 = f.sub(1).await;
        assert_eq!(s1.num_reviews, 2);
        assert!((s1.rating - 3.5).abs() < f64::EPSILON);
        assert_eq!(f.sub(0).await.num_reviews, 0);
    }

    #[tokio::test]
    async fn reconcile_is_idempotent() {
        let f = fixture().await;
        let enq = f.enquiry(EnquiryStatus::Completed, &["svc1-0"]).await;
        assert_eq!(f.svc.reconcile(enq).await.unwrap(), ReviewCompletion::Pending);
        assert_eq!(f.svc.reconcile(enq).await.unwrap(), ReviewCompletion::Pending);
        f.svc.submit(f.user_id, f.input(enq, "svc1-0", 5.0)).await.unwrap();
        assert_eq!(f.svc.reconcile(enq).await.unwrap(), ReviewCompletion::Complete);
        assert_eq!(f.svc.reconcile(enq).await.unwrap(), ReviewCompletion::Complete);
        assert!(f.is_reviewed(enq).await);
    }

    #[tokio::test]
    async fn enquiry_without_items_completes_after_one_review() {
        let f = fixture().await;
        let enq = f.enquiry(EnquiryStatus::Completed, &[]).await;
        f.svc.submit(f.user_id, f.input(enq, "svc1-0", 3.0)).await.unwrap();
        assert!(f.is_reviewed(enq).await);
    }

    #[tokio::test]
    async fn conflict_repairs_stale_flag() {
        let f = fixture().await;
        let enq = f.enquiry(EnquiryStatus::Completed, &["svc1-0"]).await;
        f.svc.submit(f.user_id, f.input(enq, "svc1-0", 5.0)).await.unwrap();

        // simulate a flag lost after the review was written
        let mut stale = f.store.enquiry(enq).await.unwrap();
        stale.is_reviewed = false;
        f.store.put_enquiry(stale).await;

        let err = f.svc.submit(f.user_id, f.input(enq, "svc1-0", 5.0)).await.unwrap_err();
        assert!(matches!(err, ReviewError::Conflict(_)));
        assert!(f.is_reviewed(enq).await);
    }

    #[tokio::test]
    async fn rating_must_be_integer_in_range() {
        let f = fixture().await;
        let enq = f.enquiry(EnquiryStatus::Completed, &["svc1-0"]).await;
        for bad in [0.0, 6.0, 4.5, -1.0, f64::NAN] {
            let err = f.svc.submit(f.user_id, f.input(enq, "svc1-0", bad)).await.unwrap_err();
            assert!(matches!(err, ReviewError::Validation(_)), "rating {bad} accepted");
        }
        let mut missing = f.input(enq, "svc1-0", 1.0);
        missing.rating = None;
        assert!(matches!(f.svc.submit(f.user_id, missing).await, Err(ReviewError::Validation(_))));
    }

    #[tokio::test]
    async fn required_fields_checked_before_lookup() {
        let f = fixture().await;
        // unknown enquiry, but the empty identifier is reported first
        let mut input = f.input(Uuid::new_v4(), "", 4.0);
        assert!(matches!(f.svc.submit(f.user_id, input.clone()).await, Err(ReviewError::Validation(_))));
        input.sub_service_id = "svc1-0".into();
        input.sub_service_name = "   ".into();
        assert!(matches!(f.svc.submit(f.user_id, input).await, Err(ReviewError::Validation(_))));
    }

    #[tokio::test]
    async fn oversized_identifier_fields_rejected() {
        let f = fixture().await;
        let enq = f.enquiry(EnquiryStatus::Completed, &["svc1-0"]).await;

        let long_id = format!("{}-0", "s".repeat(SUB_SERVICE_ID_MAX));
        let err = f.svc.submit(f.user_id, f.input(enq, &long_id, 4.0)).await.unwrap_err();
        assert!(matches!(err, ReviewError::Validation(ref m) if m.contains("subServiceId")));

        let mut input = f.input(enq, "svc1-0", 4.0);
        input.sub_service_name = "n".repeat(SUB_SERVICE_NAME_MAX + 1);
        let err = f.svc.submit(f.user_id, input).await.unwrap_err();
        assert!(matches!(err, ReviewError::Validation(ref m) if m.contains("subServiceName")));

        // exactly at the limit is fine
        let mut input = f.input(enq, "svc1-0", 4.0);
        input.sub_service_name = "n".repeat(SUB_SERVICE_NAME_MAX);
        f.svc.submit(f.user_id, input).await.unwrap();
    }

    #[tokio::test]
    async fn identifier_outside_enquiry_items_is_accepted() {
        let f = fixture().await;
        let enq = f.enquiry(EnquiryStatus::Completed, &["svc1-0"]).await;
        f.svc.submit(f.user_id, f.input(enq, "svc1-1", 4.0)).await.unwrap();
        assert_eq!(f.sub(1).await.num_reviews, 1);
        assert!(f.is_reviewed(enq).await);
    }

    #[tokio::test]
    async fn foreign_enquiry_is_not_found() {
        let f = fixture().await;
        let enq = f.enquiry(EnquiryStatus::Completed, &["svc1-0"]).await;
        let err = f.svc.submit(Uuid::new_v4(), f.input(enq, "svc1-0", 4.0)).await.unwrap_err();
        assert!(matches!(err, ReviewError::NotFound(ref m) if m == "enquiry not found or unauthorized"));
    }

    #[tokio::test]
    async fn non_completed_enquiry_is_invalid_state() {
        let f = fixture().await;
        for status in [EnquiryStatus::Pending, EnquiryStatus::InProgress, EnquiryStatus::Cancelled] {
            let enq = f.enquiry(status, &["svc1-0"]).await;
            let err = f.svc.submit(f.user_id, f.input(enq, "svc1-0", 4.0)).await.unwrap_err();
            assert!(matches!(err, ReviewError::InvalidState(_)));
        }
    }

    #[tokio::test]
    async fn unresolved_identifier_keeps_review_and_aggregates() {
        let f = fixture().await;
        let enq = f.enquiry(EnquiryStatus::Completed, &["svc1-9"]).await;
        let before = UNRESOLVED_SUB_SERVICE_TOTAL.get();
        f.svc.submit(f.user_id, f.input(enq, "svc1-9", 2.0)).await.unwrap();
        assert!(UNRESOLVED_SUB_SERVICE_TOTAL.get() > before);
        assert_eq!(f.svc.list_for_sub_service("svc1-9").await.unwrap().len(), 1);
        assert_eq!(f.sub(0).await.num_reviews, 0);
        assert_eq!(f.sub(1).await.num_reviews, 0);
        assert!(f.is_reviewed(enq).await);
    }

    #[tokio::test]
    async fn persistent_id_identifier_updates_that_entry() {
        let f = fixture().await;
        let target = f.sub(1).await.id.to_string();
        let enq = f.enquiry(EnquiryStatus::Completed, &[target.as_str()]).await;
        f.svc.submit(f.user_id, f.input(enq, &target, 4.0)).await.unwrap();
        let s1 = f.sub(1).await;
        assert_eq!((s1.rating, s1.num_reviews), (4.0, 1));
    }

    #[tokio::test]
    async fn missing_service_skips_aggregate() {
        let f = fixture().await;
        let outcome = f.svc.recompute(Uuid::new_v4(), &SubServiceRef::parse("svc1-0")).await.unwrap();
        assert_eq!(outcome, AggregateOutcome::ServiceMissing);
    }

    #[tokio::test]
    async fn admin_listing_attaches_summaries() {
        let f = fixture().await;
        let enq = f.enquiry(EnquiryStatus::Completed, &["svc1-0"]).await;
        f.svc.submit(f.user_id, f.input(enq, "svc1-0", 5.0)).await.unwrap();
        let all = f.svc.list_all().await.unwrap();
        assert_eq!(all.len(), 1);
        assert_eq!(all[0].user.as_ref().map(|u| u.phone.as_str()), Some("9876543210"));
        assert_eq!(all[0].service.as_ref().map(|s| s.title.as_str()), Some("AC service"));
    }

    /// Store whose duplicate pre-check never sees the existing row, so only
    /// the insert's uniqueness check can catch a second submission.
    struct RacingStore(Arc<MemoryStore>);

    #[async_trait::async_trait]
    impl ReviewRepository for RacingStore {
        async fn find_enquiry(&self, enquiry_id: Uuid) -> Result<Option<Enquiry>, ReviewError> {
            self.0.find_enquiry(enquiry_id).await
        }
        async fn find_enquiry_for_user(&self, enquiry_id: Uuid, user_id: Uuid) -> Result<Option<Enquiry>, ReviewError> {
            self.0.find_enquiry_for_user(enquiry_id, user_id).await
        }
        async fn mark_enquiry_reviewed(&self, enquiry_id: Uuid) -> Result<(), ReviewError> {
            self.0.mark_enquiry_reviewed(enquiry_id).await
        }
        async fn find_review(&self, _: Uuid, _: Uuid, _: &str) -> Result<Option<Review>, ReviewError> {
            Ok(None)
        }
        async fn insert_review(&self, record: ReviewRecord) -> Result<Review, ReviewError> {
            self.0.insert_review(record).await
        }
        async fn ratings_for(&self, sub_service_id: &str) -> Result<Vec<u8>, ReviewError> {
            self.0.ratings_for(sub_service_id).await
        }
        async fn count_reviewed_items(&self, enquiry_id: Uuid) -> Result<usize, ReviewError> {
            self.0.count_reviewed_items(enquiry_id).await
        }
        async fn list_by_sub_service(&self, sub_service_id: &str) -> Result<Vec<Review>, ReviewError> {
            self.0.list_by_sub_service(sub_service_id).await
        }
        async fn list_reviews(&self) -> Result<Vec<Review>, ReviewError> {
            self.0.list_reviews().await
        }
        async fn find_catalog_entry(&self, service_id: Uuid) -> Result<Option<CatalogEntry>, ReviewError> {
            self.0.find_catalog_entry(service_id).await
        }
        async fn set_sub_service_aggregate(&self, sub_service_id: Uuid, rating: f64, num_reviews: u32) -> Result<(), ReviewError> {
            self.0.set_sub_service_aggregate(sub_service_id, rating, num_reviews).await
        }
        async fn user_summaries(&self, user_ids: Vec<Uuid>) -> Result<HashMap<Uuid, UserSummary>, ReviewError> {
            self.0.user_summaries(user_ids).await
        }
        async fn service_summaries(&self, service_ids: Vec<Uuid>) -> Result<HashMap<Uuid, ServiceSummary>, ReviewError> {
            self.0.service_summaries(service_ids).await
        }
    }

    #[tokio::test]
    async fn insert_conflict_after_clean_precheck_repairs_flag() {
        let f = fixture().await;
        let enq = f.enquiry(EnquiryStatus::Completed, &["svc1-0"]).await;
        f.svc.submit(f.user_id, f.input(enq, "svc1-0", 5.0)).await.unwrap();

        let mut stale = f.store.enquiry(enq).await.unwrap();
        stale.is_reviewed = false;
        f.store.put_enquiry(stale).await;

        let racing = ReviewService::new(Arc::new(RacingStore(f.store.clone())));
        let before = DUPLICATE_REVIEWS_TOTAL.get();
        let err = racing.submit(f.user_id, f.input(enq, "svc1-0", 1.0)).await.unwrap_err();
        assert!(matches!(err, ReviewError::Conflict(ref m) if m == "already reviewed"));
        assert!(DUPLICATE_REVIEWS_TOTAL.get() > before);
        assert!(f.is_reviewed(enq).await);
        let s0 = f.sub(0).await;
        assert_eq!((s0.rating, s0.num_reviews), (5.0, 1));
    }
}
