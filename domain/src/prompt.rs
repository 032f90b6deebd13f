//! Prompt configuration operations exposed to the web layer.

use crate::call_analysis::AnalysisConfig;
use crate::error::Error;
use entity::{prompts, Id};
use sea_orm::DatabaseConnection;

pub async fn create(
    db: &DatabaseConnection,
    model: prompts::Model,
) -> Result<prompts::Model, Error> {
    Ok(entity_api::prompt::create(db, model).await?)
}

pub async fn update(
    db: &DatabaseConnection,
    id: Id,
    model: prompts::Model,
) -> Result<prompts::Model, Error> {
    Ok(entity_api::prompt::update(db, id, model).await?)
}

pub async fn find_all(db: &DatabaseConnection) -> Result<Vec<prompts::Model>, Error> {
    Ok(entity_api::prompt::find_all(db).await?)
}

pub async fn activate(db: &DatabaseConnection, id: Id) -> Result<prompts::Model, Error> {
    Ok(entity_api::prompt::activate(db, id).await?)
}

/// Fetches the active prompt as an explicit analysis configuration. Import
/// entry points call this once and pass the value down; there is no global
/// "current prompt" state inside the pipeline.
pub async fn active_analysis_config(db: &DatabaseConnection) -> Result<Option<AnalysisConfig>, Error> {
    Ok(entity_api::prompt::find_active(db)
        .await?
        .map(AnalysisConfig::from))
}
