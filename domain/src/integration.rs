//! Google integration operations exposed to the web layer.
//!
//! The OAuth exchange happens outside this service; its callback stores the
//! resulting token material here, and the sync/import paths read it back to
//! construct API clients.

use crate::error::Error;
use entity::{google_integrations, Id};
use sea_orm::DatabaseConnection;

/// Stores or refreshes a user's Google token material.
pub async fn connect(
    db: &DatabaseConnection,
    model: google_integrations::Model,
) -> Result<google_integrations::Model, Error> {
    Ok(entity_api::google_integration::upsert_for_user(db, model).await?)
}

pub async fn find_by_user_id(
    db: &DatabaseConnection,
    user_id: Id,
) -> Result<Option<google_integrations::Model>, Error> {
    Ok(entity_api::google_integration::find_by_user_id(db, user_id).await?)
}

pub async fn find_auto_sync_enabled(
    db: &DatabaseConnection,
) -> Result<Vec<google_integrations::Model>, Error> {
    Ok(entity_api::google_integration::find_auto_sync_enabled(db).await?)
}

pub async fn set_auto_sync(
    db: &DatabaseConnection,
    user_id: Id,
    enabled: bool,
) -> Result<google_integrations::Model, Error> {
    Ok(entity_api::google_integration::set_auto_sync(db, user_id, enabled).await?)
}

/// The user's current Google access token, or a config error when the
/// account is not connected or the token is missing.
pub async fn access_token_for(db: &DatabaseConnection, user_id: Id) -> Result<String, Error> {
    let integration = find_by_user_id(db, user_id)
        .await?
        .ok_or_else(|| Error::config("Google account not connected"))?;

    integration
        .access_token
        .ok_or_else(|| Error::config("Google access token missing"))
}
