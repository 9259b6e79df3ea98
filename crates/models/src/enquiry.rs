use sea_orm::{entity::prelude::*, Set, DatabaseConnection, QueryOrder, TransactionTrait};
use uuid::Uuid;
use chrono::Utc;
use serde::{Deserialize, Serialize};

use crate::{enquiry_item, errors, user};

pub const STATUS_PENDING: &str = "pending";
pub const STATUS_IN_PROGRESS: &str = "in-progress";
pub const STATUS_COMPLETED: &str = "completed";
pub const STATUS_CANCELLED: &str = "cancelled";

pub const STATUSES: &[&str] = &[STATUS_PENDING, STATUS_IN_PROGRESS, STATUS_COMPLETED, STATUS_CANCELLED];

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "enquiry")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub user_id: Uuid,
    pub service_type: String,
    pub appliance_type: String,
    pub message: String,
    pub address: String,
    pub landmark: String,
    pub city: String,
    pub state: String,
    pub pincode: String,
    pub brand: String,
    pub status: String,
    pub is_reviewed: bool,
    pub created_at: DateTimeWithTimeZone,
    pub updated_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter)]
pub enum Relation { User, Item }

impl RelationTrait for Relation {
    fn def(&self) -> RelationDef {
        match self {
            Relation::User => Entity::belongs_to(user::Entity)
                .from(Column::UserId)
                .to(user::Column::Id)
                .into(),
            Relation::Item => Entity::has_many(enquiry_item::Entity).into(),
        }
    }
}

impl Related<enquiry_item::Entity> for Entity {
    fn to() -> RelationDef { Relation::Item.def() }
}

impl ActiveModelBehavior for ActiveModel {}

/// Customer supplied fields of a new enquiry.
#[derive(Clone, Debug, Default)]
pub struct EnquiryDraft {
    pub service_type: String,
    pub appliance_type: String,
    pub message: String,
    pub address: String,
    pub landmark: String,
    pub city: String,
    pub state: String,
    pub pincode: String,
    pub brand: String,
}

pub fn validate_status(status: &str) -> Result<(), errors::ModelError> {
    if !STATUSES.contains(&status) {
        return Err(errors::ModelError::Validation(format!("invalid status `{status}`")));
    }
    Ok(())
}

fn validate_draft(d: &EnquiryDraft) -> Result<(), errors::ModelError> {
    let required = [
        ("serviceType", &d.service_type),
        ("applianceType", &d.appliance_type),
        ("message", &d.message),
        ("address", &d.address),
        ("city", &d.city),
        ("state", &d.state),
        ("pincode", &d.pincode),
    ];
    for (field, value) in required {
        if value.trim().is_empty() {
            return Err(errors::ModelError::Validation(format!("{field} required")));
        }
    }
    Ok(())
}

/// Insert an enquiry in `pending` state together with its items.
pub async fn create(
    db: &DatabaseConnection,
    user_id: Uuid,
    draft: EnquiryDraft,
    items: Vec<enquiry_item::EnquiryItemDraft>,
) -> Result<(Model, Vec<enquiry_item::Model>), errors::ModelError> {
    validate_draft(&draft)?;
    for item in &items { enquiry_item::validate(item)?; }

    let now = Utc::now().into();
    let txn = db.begin().await.map_err(|e| errors::ModelError::Db(e.to_string()))?;
    let am = ActiveModel {
        id: Set(Uuid::new_v4()),
        user_id: Set(user_id),
        service_type: Set(draft.service_type),
        appliance_type: Set(draft.appliance_type),
        message: Set(draft.message),
        address: Set(draft.address),
        landmark: Set(draft.landmark),
        city: Set(draft.city),
        state: Set(draft.state),
        pincode: Set(draft.pincode),
        brand: Set(draft.brand),
        status: Set(STATUS_PENDING.to_string()),
        is_reviewed: Set(false),
        created_at: Set(now),
        updated_at: Set(now),
    };
    let created = am.insert(&txn).await.map_err(errors::ModelError::from)?;

    let mut rows = Vec::with_capacity(items.len());
    for (position, item) in items.into_iter().enumerate() {
        let position = i32::try_from(position).map_err(|_| errors::ModelError::Validation("too many items".into()))?;
        rows.push(enquiry_item::insert(&txn, created.id, position, item).await?);
    }
    txn.commit().await.map_err(|e| errors::ModelError::Db(e.to_string()))?;
    Ok((created, rows))
}

pub async fn find(db: &DatabaseConnection, id: Uuid) -> Result<Option<Model>, errors::ModelError> {
    Entity::find_by_id(id).one(db).await.map_err(|e| errors::ModelError::Db(e.to_string()))
}

/// Enquiry only if it is owned by `user_id`.
pub async fn find_for_user(db: &DatabaseConnection, id: Uuid, user_id: Uuid) -> Result<Option<Model>, errors::ModelError> {
    Entity::find_by_id(id)
        .filter(Column::UserId.eq(user_id))
        .one(db)
        .await
        .map_err(|e| errors::ModelError::Db(e.to_string()))
}

pub async fn list_for_user(db: &DatabaseConnection, user_id: Uuid) -> Result<Vec<Model>, errors::ModelError> {
    Entity::find()
        .filter(Column::UserId.eq(user_id))
        .order_by_desc(Column::CreatedAt)
        .all(db)
        .await
        .map_err(|e| errors::ModelError::Db(e.to_string()))
}

pub async fn list_all(db: &DatabaseConnection) -> Result<Vec<Model>, errors::ModelError> {
    Entity::find()
        .order_by_desc(Column::CreatedAt)
        .all(db)
        .await
        .map_err(|e| errors::ModelError::Db(e.to_string()))
}

pub async fn set_status(db: &DatabaseConnection, id: Uuid, status: &str) -> Result<Model, errors::ModelError> {
    validate_status(status)?;
    let mut found: ActiveModel = Entity::find_by_id(id)
        .one(db)
        .await
        .map_err(|e| errors::ModelError::Db(e.to_string()))?
        .ok_or_else(|| errors::ModelError::NotFound("enquiry not found".into()))?
        .into();
    found.status = Set(status.to_string());
    found.updated_at = Set(Utc::now().into());
    found.update(db).await.map_err(|e| errors::ModelError::Db(e.to_string()))
}

/// Set `is_reviewed`. The flag is never cleared, so this only ever writes `true`.
pub async fn mark_reviewed(db: &DatabaseConnection, id: Uuid) -> Result<(), errors::ModelError> {
    let mut found: ActiveModel = Entity::find_by_id(id)
        .one(db)
        .await
        .map_err(|e| errors::ModelError::Db(e.to_string()))?
        .ok_or_else(|| errors::ModelError::NotFound("enquiry not found".into()))?
        .into();
    found.is_reviewed = Set(true);
    found.updated_at = Set(Utc::now().into());
    found.update(db).await.map_err(|e| errors::ModelError::Db(e.to_string()))?;
    Ok(())
}
