//! CRUD operations for google_integrations table.

use super::error::{EntityApiErrorKind, Error};
use entity::google_integrations::{ActiveModel, Column, Entity, Model};
use entity::Id;
use log::*;
use sea_orm::{
    entity::prelude::*,
    ActiveValue::{Set, Unchanged},
    DatabaseConnection, TryIntoModel,
};

pub async fn find_by_user_id(
    db: &DatabaseConnection,
    user_id: Id,
) -> Result<Option<Model>, Error> {
    Ok(Entity::find()
        .filter(Column::UserId.eq(user_id))
        .one(db)
        .await?)
}

/// Users whose integrations should be picked up by the background sync.
pub async fn find_auto_sync_enabled(db: &DatabaseConnection) -> Result<Vec<Model>, Error> {
    Ok(Entity::find()
        .filter(Column::AutoSyncEnabled.eq(true))
        .all(db)
        .await?)
}

/// Creates or refreshes the single integration row for a user. Token
/// material always moves; sync bookkeeping survives.
pub async fn upsert_for_user(db: &DatabaseConnection, model: Model) -> Result<Model, Error> {
    let now = chrono::Utc::now();

    let existing = find_by_user_id(db, model.user_id).await?;

    match existing {
        Some(existing) => {
            debug!("Refreshing google integration for user: {}", model.user_id);

            let active_model = ActiveModel {
                id: Unchanged(existing.id),
                google_email: Set(model.google_email),
                google_name: Set(model.google_name),
                refresh_token: Set(model.refresh_token),
                access_token: Set(model.access_token),
                token_expiry: Set(model.token_expiry),
                updated_at: Set(now.into()),
                ..Default::default()
            };

            Ok(active_model.update(db).await?.try_into_model()?)
        }
        None => {
            debug!("Creating google integration for user: {}", model.user_id);

            let active_model = ActiveModel {
                user_id: Set(model.user_id),
                google_email: Set(model.google_email),
                google_name: Set(model.google_name),
                refresh_token: Set(model.refresh_token),
                access_token: Set(model.access_token),
                token_expiry: Set(model.token_expiry),
                auto_sync_enabled: Set(model.auto_sync_enabled),
                last_synced_at: Set(None),
                last_sync_status: Set(None),
                last_sync_error: Set(None),
                created_at: Set(now.into()),
                updated_at: Set(now.into()),
                ..Default::default()
            };

            Ok(active_model.save(db).await?.try_into_model()?)
        }
    }
}

pub async fn set_auto_sync(
    db: &DatabaseConnection,
    user_id: Id,
    enabled: bool,
) -> Result<Model, Error> {
    let existing = find_by_user_id(db, user_id).await?.ok_or(Error {
        source: None,
        error_kind: EntityApiErrorKind::RecordNotFound,
    })?;

    let active_model = ActiveModel {
        id: Unchanged(existing.id),
        auto_sync_enabled: Set(enabled),
        updated_at: Set(chrono::Utc::now().into()),
        ..Default::default()
    };

    Ok(active_model.update(db).await?.try_into_model()?)
}

/// Records the outcome of a sync run: "success", "partial" or "failed" plus
/// an optional error summary.
pub async fn update_sync_status(
    db: &DatabaseConnection,
    user_id: Id,
    status: &str,
    error: Option<String>,
) -> Result<Model, Error> {
    let existing = find_by_user_id(db, user_id).await?.ok_or(Error {
        source: None,
        error_kind: EntityApiErrorKind::RecordNotFound,
    })?;

    if let Some(ref message) = error {
        warn!("Sync for user {user_id} finished {status}: {message}");
    }

    let active_model = ActiveModel {
        id: Unchanged(existing.id),
        last_synced_at: Set(Some(chrono::Utc::now().into())),
        last_sync_status: Set(Some(status.to_string())),
        last_sync_error: Set(error),
        updated_at: Set(chrono::Utc::now().into()),
        ..Default::default()
    };

    Ok(active_model.update(db).await?.try_into_model()?)
}
