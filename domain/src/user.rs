//! User operations exposed to the web layer.

use crate::error::Error;
use entity::{users, Id};
use sea_orm::DatabaseConnection;

pub async fn create(
    db: &DatabaseConnection,
    model: users::Model,
) -> Result<users::Model, Error> {
    Ok(entity_api::user::create(db, model).await?)
}

pub async fn update(
    db: &DatabaseConnection,
    id: Id,
    model: users::Model,
) -> Result<users::Model, Error> {
    Ok(entity_api::user::update(db, id, model).await?)
}

pub async fn find_all(db: &DatabaseConnection) -> Result<Vec<users::Model>, Error> {
    Ok(entity_api::user::find_all(db).await?)
}

pub async fn find_by_id(db: &DatabaseConnection, id: Id) -> Result<users::Model, Error> {
    Ok(entity_api::user::find_by_id(db, id).await?)
}

pub async fn find_by_email(
    db: &DatabaseConnection,
    email: &str,
) -> Result<Option<users::Model>, Error> {
    Ok(entity_api::user::find_by_email(db, email).await?)
}
