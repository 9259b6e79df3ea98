use sea_orm::{entity::prelude::*, Set, DatabaseConnection, QueryOrder, QuerySelect};
use uuid::Uuid;
use chrono::Utc;
use serde::{Deserialize, Serialize};

use crate::{enquiry, errors};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "review")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub user_id: Uuid,
    pub service_id: Uuid,
    pub sub_service_id: String,
    pub sub_service_name: String,
    pub rating: i32,
    pub comment: Option<String>,
    pub enquiry_id: Uuid,
    pub created_at: DateTimeWithTimeZone,
    pub updated_at: DateTimeWithTimeZone,
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

impl ActiveModelBehavior for ActiveModel {}

#[derive(Clone, Debug)]
pub struct ReviewDraft {
    pub user_id: Uuid,
    pub service_id: Uuid,
    pub sub_service_id: String,
    pub sub_service_name: String,
    pub rating: i32,
    pub comment: Option<String>,
    pub enquiry_id: Uuid,
}

/// Insert a review. A second row for the same (user, enquiry, sub-service)
/// hits `uniq_review_user_enquiry_sub_service` and comes back as `Conflict`.
pub async fn create(db: &DatabaseConnection, draft: ReviewDraft) -> Result<Model, errors::ModelError> {
    if !(1..=5).contains(&draft.rating) {
        return Err(errors::ModelError::Validation("rating must be between 1 and 5".into()));
    }
    let now = Utc::now().into();
    let am = ActiveModel {
        id: Set(Uuid::new_v4()),
        user_id: Set(draft.user_id),
        service_id: Set(draft.service_id),
        sub_service_id: Set(draft.sub_service_id),
        sub_service_name: Set(draft.sub_service_name),
        rating: Set(draft.rating),
        comment: Set(draft.comment),
        enquiry_id: Set(draft.enquiry_id),
        created_at: Set(now),
        updated_at: Set(now),
    };
    am.insert(db).await.map_err(errors::ModelError::from)
}

pub async fn find_by_key(
    db: &DatabaseConnection,
    user_id: Uuid,
    enquiry_id: Uuid,
    sub_service_id: &str,
) -> Result<Option<Model>, errors::ModelError> {
    Entity::find()
        .filter(Column::UserId.eq(user_id))
        .filter(Column::EnquiryId.eq(enquiry_id))
        .filter(Column::SubServiceId.eq(sub_service_id))
        .one(db)
        .await
        .map_err(|e| errors::ModelError::Db(e.to_string()))
}

/// Reviews carrying exactly this identifier string, newest first.
pub async fn list_by_sub_service(db: &DatabaseConnection, sub_service_id: &str) -> Result<Vec<Model>, errors::ModelError> {
    Entity::find()
        .filter(Column::SubServiceId.eq(sub_service_id))
        .order_by_desc(Column::CreatedAt)
        .order_by_desc(Column::Id)
        .all(db)
        .await
        .map_err(|e| errors::ModelError::Db(e.to_string()))
}

pub async fn ratings_for_sub_service(db: &DatabaseConnection, sub_service_id: &str) -> Result<Vec<i32>, errors::ModelError> {
    Entity::find()
        .select_only()
        .column(Column::Rating)
        .filter(Column::SubServiceId.eq(sub_service_id))
        .into_tuple::<i32>()
        .all(db)
        .await
        .map_err(|e| errors::ModelError::Db(e.to_string()))
}

/// Number of distinct sub-services reviewed within one enquiry.
pub async fn count_reviewed_items(db: &DatabaseConnection, enquiry_id: Uuid) -> Result<u64, errors::ModelError> {
    Entity::find()
        .select_only()
        .column(Column::SubServiceId)
        .filter(Column::EnquiryId.eq(enquiry_id))
        .distinct()
        .count(db)
        .await
        .map_err(|e| errors::ModelError::Db(e.to_string()))
}

pub async fn list_all(db: &DatabaseConnection) -> Result<Vec<Model>, errors::ModelError> {
    Entity::find()
        .order_by_desc(Column::CreatedAt)
        .order_by_desc(Column::Id)
        .all(db)
        .await
        .map_err(|e| errors::ModelError::Db(e.to_string()))
}
