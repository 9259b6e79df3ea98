use sea_orm::{entity::prelude::*, Set, DatabaseConnection, ConnectionTrait, QueryOrder};
use uuid::Uuid;
use serde::{Deserialize, Serialize};

use crate::{enquiry, errors};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "enquiry_item")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub enquiry_id: Uuid,
    pub position: i32,
    pub service_id: Uuid,
    pub sub_service_id: String,
    pub name: String,
    pub price: f64,
    pub quantity: i32,
}

#[derive(Copy, Clone, Debug, EnumIter)]
pub enum Relation { Enquiry }

impl RelationTrait for Relation {
    fn def(&self) -> RelationDef {
        match self {
            Relation::Enquiry => Entity::belongs_to(enquiry::Entity)
                .from(Column::EnquiryId)
                .to(enquiry::Column::Id)
                .into(),
        }
    }
}

impl Related<enquiry::Entity> for Entity {
    fn to() -> RelationDef { Relation::Enquiry.def() }
}

impl ActiveModelBehavior for ActiveModel {}

#[derive(Clone, Debug)]
pub struct EnquiryItemDraft {
    pub service_id: Uuid,
    pub sub_service_id: String,
    pub name: String,
    pub price: f64,
    pub quantity: i32,
}

pub fn validate(draft: &EnquiryItemDraft) -> Result<(), errors::ModelError> {
    if draft.sub_service_id.trim().is_empty() {
        return Err(errors::ModelError::Validation("item sub-service id required".into()));
    }
    if draft.name.trim().is_empty() {
        return Err(errors::ModelError::Validation("item name required".into()));
    }
    if draft.quantity < 1 {
        return Err(errors::ModelError::Validation("item quantity must be at least 1".into()));
    }
    if !draft.price.is_finite() || draft.price < 0.0 {
        return Err(errors::ModelError::Validation("item price must be a non-negative number".into()));
    }
    Ok(())
}

pub(crate) async fn insert<C: ConnectionTrait>(
    conn: &C,
    enquiry_id: Uuid,
    position: i32,
    draft: EnquiryItemDraft,
) -> Result<Model, errors::ModelError> {
    let am = ActiveModel {
        id: Set(Uuid::new_v4()),
        enquiry_id: Set(enquiry_id),
        position: Set(position),
        service_id: Set(draft.service_id),
        sub_service_id: Set(draft.sub_service_id),
        name: Set(draft.name),
        price: Set(draft.price),
        quantity: Set(draft.quantity),
    };
    am.insert(conn).await.map_err(errors::ModelError::from)
}

pub async fn list_for_enquiry(db: &DatabaseConnection, enquiry_id: Uuid) -> Result<Vec<Model>, errors::ModelError> {
    Entity::find()
        .filter(Column::EnquiryId.eq(enquiry_id))
        .order_by_asc(Column::Position)
        .all(db)
        .await
        .map_err(|e| errors::ModelError::Db(e.to_string()))
}

pub async fn list_for_enquiries(db: &DatabaseConnection, enquiry_ids: Vec<Uuid>) -> Result<Vec<Model>, errors::ModelError> {
    if enquiry_ids.is_empty() { return Ok(Vec::new()); }
    Entity::find()
        .filter(Column::EnquiryId.is_in(enquiry_ids))
        .order_by_asc(Column::EnquiryId)
        .order_by_asc(Column::Position)
        .all(db)
        .await
        .map_err(|e| errors::ModelError::Db(e.to_string()))
}
