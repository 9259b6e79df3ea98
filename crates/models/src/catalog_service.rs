use sea_orm::{entity::prelude::*, Set, DatabaseConnection, QueryOrder, TransactionTrait};
use uuid::Uuid;
use chrono::Utc;
use serde::{Deserialize, Serialize};

use crate::{errors, sub_service};

/// Appliance/trade categories a catalog entry may belong to.
pub const CATEGORIES: &[&str] = &[
    "Air Conditioner",
    "Electrician",
    "Plumbing",
    "Washing Machine",
    "TV",
    "Refrigerator",
    "Deep Freezer",
    "Ceiling & Table Fan",
    "Water Purifier",
    "Dishwasher",
    "Dispenser",
    "Visi Cooler",
    "Water Cooler",
    "Air Cooler",
    "CCTV Camera",
    "Computer & Laptop",
    "Printer",
    "Stabilizer",
    "Chimneys",
    "Microwave oven",
    "Electric Induction",
    "Geysers",
    "Home theatre/ Sound box",
    "Inverter Batteries",
    "Vacuum cleaner",
];

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "catalog_service")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub category: String,
    pub title: String,
    pub description: String,
    pub image_url: String,
    pub is_active: bool,
    pub created_at: DateTimeWithTimeZone,
    pub updated_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter)]
pub enum Relation { SubService }

impl RelationTrait for Relation {
    fn def(&self) -> RelationDef {
        match self {
            Relation::SubService => Entity::has_many(sub_service::Entity).into(),
        }
    }
}

impl Related<sub_service::Entity> for Entity {
    fn to() -> RelationDef { Relation::SubService.def() }
}

impl ActiveModelBehavior for ActiveModel {}

pub fn validate_category(category: &str) -> Result<(), errors::ModelError> {
    if !CATEGORIES.contains(&category) {
        return Err(errors::ModelError::Validation(format!("unknown category `{category}`")));
    }
    Ok(())
}

/// Insert a catalog entry and its sub-services (positions 0..n) atomically.
pub async fn create(
    db: &DatabaseConnection,
    category: &str,
    title: &str,
    description: &str,
    image_url: &str,
    subs: Vec<sub_service::SubServiceDraft>,
) -> Result<(Model, Vec<sub_service::Model>), errors::ModelError> {
    validate_category(category)?;
    if title.trim().is_empty() { return Err(errors::ModelError::Validation("title required".into())); }
    for s in &subs { sub_service::validate(s)?; }

    let now = Utc::now().into();
    let txn = db.begin().await.map_err(|e| errors::ModelError::Db(e.to_string()))?;
    let am = ActiveModel {
        id: Set(Uuid::new_v4()),
        category: Set(category.to_string()),
        title: Set(title.trim().to_string()),
        description: Set(description.to_string()),
        image_url: Set(image_url.to_string()),
        is_active: Set(true),
        created_at: Set(now),
        updated_at: Set(now),
    };
    let created = am.insert(&txn).await.map_err(errors::ModelError::from)?;

    let mut rows = Vec::with_capacity(subs.len());
    for (position, draft) in subs.into_iter().enumerate() {
        let position = i32::try_from(position).map_err(|_| errors::ModelError::Validation("too many sub-services".into()))?;
        rows.push(sub_service::insert(&txn, created.id, position, draft).await?);
    }
    txn.commit().await.map_err(|e| errors::ModelError::Db(e.to_string()))?;
    Ok((created, rows))
}

pub async fn find_with_sub_services(
    db: &DatabaseConnection,
    id: Uuid,
) -> Result<Option<(Model, Vec<sub_service::Model>)>, errors::ModelError> {
    let Some(found) = Entity::find_by_id(id).one(db).await.map_err(|e| errors::ModelError::Db(e.to_string()))? else {
        return Ok(None);
    };
    let subs = sub_service::list_for_service(db, found.id).await?;
    Ok(Some((found, subs)))
}

/// Active entries, newest first.
pub async fn list_active(db: &DatabaseConnection) -> Result<Vec<Model>, errors::ModelError> {
    Entity::find()
        .filter(Column::IsActive.eq(true))
        .order_by_desc(Column::CreatedAt)
        .all(db)
        .await
        .map_err(|e| errors::ModelError::Db(e.to_string()))
}

pub async fn find_many(db: &DatabaseConnection, ids: Vec<Uuid>) -> Result<Vec<Model>, errors::ModelError> {
    if ids.is_empty() { return Ok(Vec::new()); }
    Entity::find()
        .filter(Column::Id.is_in(ids))
        .all(db)
        .await
        .map_err(|e| errors::ModelError::Db(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use sea_orm::{DbBackend, QueryTrait};

    #[test]
    fn sub_services_join_on_service_id() {
        let sql = Entity::find()
            .find_with_related(sub_service::Entity)
            .build(DbBackend::Postgres)
            .to_string();
        assert!(sql.contains(r#"LEFT JOIN "sub_service""#), "{sql}");
        assert!(sql.contains(r#""sub_service"."service_id""#), "{sql}");
    }

    #[test]
    fn known_category_accepted() {
        assert!(validate_category("Air Conditioner").is_ok());
        assert!(validate_category("Spaceship").is_err());
    }
}
