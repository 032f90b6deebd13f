//! Category operations exposed to the web layer.

use crate::error::Error;
use entity::{categories, Id};
use sea_orm::DatabaseConnection;

pub async fn create(
    db: &DatabaseConnection,
    model: categories::Model,
) -> Result<categories::Model, Error> {
    Ok(entity_api::category::create(db, model).await?)
}

pub async fn update(
    db: &DatabaseConnection,
    id: Id,
    model: categories::Model,
) -> Result<categories::Model, Error> {
    Ok(entity_api::category::update(db, id, model).await?)
}

pub async fn find_all(db: &DatabaseConnection) -> Result<Vec<categories::Model>, Error> {
    Ok(entity_api::category::find_all(db).await?)
}

pub async fn find_by_id(db: &DatabaseConnection, id: Id) -> Result<categories::Model, Error> {
    Ok(entity_api::category::find_by_id(db, id).await?)
}

/// Deletes a category; fixed catalog members are refused at the entity
/// layer.
pub async fn delete_by_id(db: &DatabaseConnection, id: Id) -> Result<(), Error> {
    Ok(entity_api::category::delete_by_id(db, id).await?)
}
