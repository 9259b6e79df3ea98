use std::sync::Arc;

use tracing::{info, instrument};
use uuid::Uuid;

use super::domain::{Enquiry, EnquiryStatus, NewEnquiry};
use super::repository::EnquiryRepository;
use crate::errors::ServiceError;

fn max_len(field: &str, value: &str, max: usize) -> Result<(), ServiceError> {
    if value.chars().count() > max {
        return Err(ServiceError::Validation(format!("{field} must be at most {max} characters")));
    }
    Ok(())
}

fn validate(input: &NewEnquiry) -> Result<(), ServiceError> {
    let required = [
        ("serviceType", &input.service_type),
        ("applianceType", &input.appliance_type),
        ("message", &input.message),
        ("address", &input.address),
        ("city", &input.city),
        ("state", &input.state),
        ("pincode", &input.pincode),
    ];
    for (field, value) in required {
        if value.trim().is_empty() {
            return Err(ServiceError::Validation(format!("{field} required")));
        }
    }
    // varchar widths from the enquiry and enquiry_item tables
    let bounded = [
        ("serviceType", &input.service_type, 128),
        ("applianceType", &input.appliance_type, 128),
        ("landmark", &input.landmark, 256),
        ("city", &input.city, 128),
        ("state", &input.state, 128),
        ("pincode", &input.pincode, 16),
        ("brand", &input.brand, 128),
    ];
    for (field, value, max) in bounded {
        max_len(field, value, max)?;
    }
    for (i, item) in input.items.iter().enumerate() {
        if item.sub_service_id.trim().is_empty() {
            return Err(ServiceError::Validation(format!("items[{i}].subServiceId required")));
        }
        if item.name.trim().is_empty() {
            return Err(ServiceError::Validation(format!("items[{i}].name required")));
        }
        max_len(&format!("items[{i}].subServiceId"), &item.sub_service_id, 128)?;
        max_len(&format!("items[{i}].name"), &item.name, 256)?;
        if item.quantity < 1 {
            return Err(ServiceError::Validation(format!("items[{i}].quantity must be at least 1")));
        }
    }
    Ok(())
}

pub struct EnquiryService<R: EnquiryRepository + ?Sized> {
    repo: Arc<R>,
}

impl<R: EnquiryRepository + ?Sized> EnquiryService<R> {
    pub fn new(repo: Arc<R>) -> Self { Self { repo } }

    #[instrument(skip(self, input), fields(user_id = %user_id, items = input.items.len()))]
    pub async fn create_enquiry(&self, user_id: Uuid, input: NewEnquiry) -> Result<Enquiry, ServiceError> {
        validate(&input)?;
        let created = self.repo.create(user_id, input).await?;
        info!(enquiry_id = %created.id, "enquiry_created");
        Ok(created)
    }

    pub async fn list_for_user(&self, user_id: Uuid) -> Result<Vec<Enquiry>, ServiceError> {
        self.repo.list_for_user(user_id).await
    }

    pub async fn list_all(&self) -> Result<Vec<Enquiry>, ServiceError> {
        self.repo.list_all().await
    }

    /// Move an enquiry to another workflow status. `is_reviewed` is left alone.
    #[instrument(skip(self))]
    pub async fn update_status(&self, id: Uuid, status: &str) -> Result<Enquiry, ServiceError> {
        let status: EnquiryStatus = status.trim().parse().map_err(ServiceError::Validation)?;
        let updated = self
            .repo
            .set_status(id, status)
            .await?
            .ok_or_else(|| ServiceError::not_found("enquiry"))?;
        info!(enquiry_id = %id, status = %status, "enquiry_status_updated");
        Ok(updated)
    }
}
