use sea_orm::{entity::prelude::*, Set, DatabaseConnection, ConnectionTrait, QueryOrder};
use uuid::Uuid;
use serde::{Deserialize, Serialize};

use crate::{catalog_service, errors};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "sub_service")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub service_id: Uuid,
    pub position: i32,
    pub name: String,
    pub description: String,
    pub price: f64,
    pub actual_price: Option<f64>,
    pub image_url: String,
    #[sea_orm(column_type = "JsonBinary")]
    pub issues_resolved: Json,
    pub rating: f64,
    pub num_reviews: i32,
}

#[derive(Copy, Clone, Debug, EnumIter)]
pub enum Relation { CatalogService }

impl RelationTrait for Relation {
    fn def(&self) -> RelationDef {
        match self {
            Relation::CatalogService => Entity::belongs_to(catalog_service::Entity)
                .from(Column::ServiceId)
                .to(catalog_service::Column::Id)
                .into(),
        }
    }
}

impl Related<catalog_service::Entity> for Entity {
    fn to() -> RelationDef { Relation::CatalogService.def() }
}

impl ActiveModelBehavior for ActiveModel {}

/// Input for one sub-service row; position is assigned by the caller.
#[derive(Clone, Debug)]
pub struct SubServiceDraft {
    pub name: String,
    pub description: String,
    pub price: f64,
    pub actual_price: Option<f64>,
    pub image_url: String,
    pub issues_resolved: Vec<String>,
}

pub fn validate(draft: &SubServiceDraft) -> Result<(), errors::ModelError> {
    if draft.name.trim().is_empty() {
        return Err(errors::ModelError::Validation("sub-service name required".into()));
    }
    if !draft.price.is_finite() || draft.price < 0.0 {
        return Err(errors::ModelError::Validation("sub-service price must be a non-negative number".into()));
    }
    if let Some(actual) = draft.actual_price {
        if !actual.is_finite() || actual < 0.0 {
            return Err(errors::ModelError::Validation("sub-service actual price must be a non-negative number".into()));
        }
    }
    Ok(())
}

pub(crate) async fn insert<C: ConnectionTrait>(
    conn: &C,
    service_id: Uuid,
    position: i32,
    draft: SubServiceDraft,
) -> Result<Model, errors::ModelError> {
    let am = ActiveModel {
        id: Set(Uuid::new_v4()),
        service_id: Set(service_id),
        position: Set(position),
        name: Set(draft.name),
        description: Set(draft.description),
        price: Set(draft.price),
        actual_price: Set(draft.actual_price),
        image_url: Set(draft.image_url),
        issues_resolved: Set(serde_json::json!(draft.issues_resolved)),
        rating: Set(0.0),
        num_reviews: Set(0),
    };
    am.insert(conn).await.map_err(errors::ModelError::from)
}

/// Sub-services of one catalog service in catalog order.
pub async fn list_for_service(db: &DatabaseConnection, service_id: Uuid) -> Result<Vec<Model>, errors::ModelError> {
    Entity::find()
        .filter(Column::ServiceId.eq(service_id))
        .order_by_asc(Column::Position)
        .all(db)
        .await
        .map_err(|e| errors::ModelError::Db(e.to_string()))
}

pub async fn list_for_services(db: &DatabaseConnection, service_ids: Vec<Uuid>) -> Result<Vec<Model>, errors::ModelError> {
    if service_ids.is_empty() { return Ok(Vec::new()); }
    Entity::find()
        .filter(Column::ServiceId.is_in(service_ids))
        .order_by_asc(Column::ServiceId)
        .order_by_asc(Column::Position)
        .all(db)
        .await
        .map_err(|e| errors::ModelError::Db(e.to_string()))
}

/// Overwrite the cached rating aggregate of one sub-service.
pub async fn set_aggregate(db: &DatabaseConnection, id: Uuid, rating: f64, num_reviews: i32) -> Result<(), errors::ModelError> {
    let mut found: ActiveModel = Entity::find_by_id(id)
        .one(db)
        .await
        .map_err(|e| errors::ModelError::Db(e.to_string()))?
        .ok_or_else(|| errors::ModelError::NotFound("sub_service not found".into()))?
        .into();
    found.rating = Set(rating);
    found.num_reviews = Set(num_reviews);
    found.update(db).await.map_err(|e| errors::ModelError::Db(e.to_string()))?;
    Ok(())
}

/// Decode the `issues_resolved` JSON column, ignoring non-string entries.
pub fn issues_resolved(model: &Model) -> Vec<String> {
    model
        .issues_resolved
        .as_array()
        .map(|items| items.iter().filter_map(|v| v.as_str().map(str::to_string)).collect())
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn draft(price: f64) -> SubServiceDraft {
        SubServiceDraft {
            name: "Gas refill".into(),
            description: "R32 top-up".into(),
            price,
            actual_price: None,
            image_url: String::new(),
            issues_resolved: vec!["no cooling".into()],
        }
    }

    #[test]
    fn negative_price_rejected() {
        assert!(validate(&draft(-1.0)).is_err());
        assert!(validate(&draft(f64::NAN)).is_err());
        assert!(validate(&draft(499.0)).is_ok());
    }

    #[test]
    fn issues_resolved_skips_non_strings() {
        let model = Model {
            id: Uuid::new_v4(),
            service_id: Uuid::new_v4(),
            position: 0,
            name: "x".into(),
            description: String::new(),
            price: 1.0,
            actual_price: None,
            image_url: String::new(),
            issues_resolved: serde_json::json!(["leak", 3, "noise"]),
            rating: 0.0,
            num_reviews: 0,
        };
        assert_eq!(issues_resolved(&model), vec!["leak".to_string(), "noise".to_string()]);
    }
}
