use std::collections::HashMap;

use chrono::Utc;
use sea_orm::DatabaseConnection;
use uuid::Uuid;

use crate::enquiry::domain::{Enquiry, EnquiryItem, EnquiryStatus, NewEnquiry};
use crate::enquiry::repository::EnquiryRepository;
use crate::errors::ServiceError;
use models::errors::ModelError;
use models::{enquiry, enquiry_item};

pub struct SeaOrmEnquiryRepository {
    pub db: DatabaseConnection,
}

/// Map stored rows to the domain view. Fails only on a status string
/// outside the known set.
pub(crate) fn to_enquiry(m: enquiry::Model, items: Vec<enquiry_item::Model>) -> Result<Enquiry, String> {
    let status: EnquiryStatus = m.status.parse()?;
    Ok(Enquiry {
        id: m.id,
        user_id: m.user_id,
        service_type: m.service_type,
        appliance_type: m.appliance_type,
        message: m.message,
        address: m.address,
        landmark: m.landmark,
        city: m.city,
        state: m.state,
        pincode: m.pincode,
        brand: m.brand,
        status,
        is_reviewed: m.is_reviewed,
        created_at: m.created_at.with_timezone(&Utc),
        updated_at: m.updated_at.with_timezone(&Utc),
        items: items
            .into_iter()
            .map(|i| EnquiryItem {
                service_id: i.service_id,
                sub_service_id: i.sub_service_id,
                name: i.name,
                price: i.price,
                quantity: u32::try_from(i.quantity).unwrap_or(1),
            })
            .collect(),
    })
}

impl SeaOrmEnquiryRepository {
    async fn with_items(&self, rows: Vec<enquiry::Model>) -> Result<Vec<Enquiry>, ServiceError> {
        let items = enquiry_item::list_for_enquiries(&self.db, rows.iter().map(|e| e.id).collect()).await?;
        let mut by_enquiry: HashMap<Uuid, Vec<enquiry_item::Model>> = HashMap::new();
        for item in items {
            by_enquiry.entry(item.enquiry_id).or_default().push(item);
        }
        rows.into_iter()
            .map(|e| {
                let items = by_enquiry.remove(&e.id).unwrap_or_default();
                to_enquiry(e, items).map_err(ServiceError::Db)
            })
            .collect()
    }
}

#[async_trait::async_trait]
impl EnquiryRepository for SeaOrmEnquiryRepository {
    async fn create(&self, user_id: Uuid, input: NewEnquiry) -> Result<Enquiry, ServiceError> {
        let mut items = Vec::with_capacity(input.items.len());
        for i in input.items {
            let quantity = i32::try_from(i.quantity).map_err(|_| ServiceError::Validation("item quantity too large".into()))?;
            items.push(enquiry_item::EnquiryItemDraft {
                service_id: i.service_id,
                sub_service_id: i.sub_service_id,
                name: i.name,
                price: i.price,
                quantity,
            });
        }
        let draft = enquiry::EnquiryDraft {
            service_type: input.service_type,
            appliance_type: input.appliance_type,
            message: input.message,
            address: input.address,
            landmark: input.landmark,
            city: input.city,
            state: input.state,
            pincode: input.pincode,
            brand: input.brand,
        };
        let (created, rows) = enquiry::create(&self.db, user_id, draft, items).await?;
        to_enquiry(created, rows).map_err(ServiceError::Db)
    }

    async fn list_for_user(&self, user_id: Uuid) -> Result<Vec<Enquiry>, ServiceError> {
        let rows = enquiry::list_for_user(&self.db, user_id).await?;
        self.with_items(rows).await
    }

    async fn list_all(&self) -> Result<Vec<Enquiry>, ServiceError> {
        let rows = enquiry::list_all(&self.db).await?;
        self.with_items(rows).await
    }

    async fn set_status(&self, id: Uuid, status: EnquiryStatus) -> Result<Option<Enquiry>, ServiceError> {
        let updated = match enquiry::set_status(&self.db, id, status.as_str()).await {
            Ok(m) => m,
            Err(ModelError::NotFound(_)) => return Ok(None),
            Err(e) => return Err(e.into()),
        };
        let items = enquiry_item::list_for_enquiry(&self.db, id).await?;
        to_enquiry(updated, items).map(Some).map_err(ServiceError::Db)
    }
}
