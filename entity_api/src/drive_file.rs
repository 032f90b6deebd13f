//! CRUD operations for drive_files table.

use super::error::{EntityApiErrorKind, Error};
use entity::drive_file_status::DriveFileStatus;
use entity::drive_files::{ActiveModel, Column, Entity, Model, Relation};
use entity::Id;
use log::*;
use sea_orm::{
    entity::prelude::*,
    ActiveValue::{Set, Unchanged},
    DatabaseConnection, JoinType, QueryOrder, QuerySelect, TryIntoModel,
};

/// Creates or refreshes the row for a remote file id.
///
/// Syncs re-list the same folder repeatedly; metadata (name, modified time)
/// moves with the remote, while local state (status, cached text) survives.
pub async fn upsert(db: &DatabaseConnection, model: Model) -> Result<Model, Error> {
    let now = chrono::Utc::now();

    let existing = Entity::find()
        .filter(Column::RemoteFileId.eq(model.remote_file_id.clone()))
        .one(db)
        .await?;

    match existing {
        Some(existing) => {
            debug!("Refreshing drive file: {}", existing.remote_file_id);

            let active_model = ActiveModel {
                id: Unchanged(existing.id),
                name: Set(model.name),
                mime_type: Set(model.mime_type),
                modified_time: Set(model.modified_time),
                updated_at: Set(now.into()),
                ..Default::default()
            };

            Ok(active_model.update(db).await?.try_into_model()?)
        }
        None => {
            debug!("Creating drive file: {}", model.remote_file_id);

            let active_model = ActiveModel {
                user_id: Set(model.user_id),
                remote_file_id: Set(model.remote_file_id),
                name: Set(model.name),
                mime_type: Set(model.mime_type),
                modified_time: Set(model.modified_time),
                raw_text: Set(model.raw_text),
                status: Set(DriveFileStatus::Pending),
                error_message: Set(None),
                imported_at: Set(None),
                created_at: Set(now.into()),
                updated_at: Set(now.into()),
                ..Default::default()
            };

            Ok(active_model.save(db).await?.try_into_model()?)
        }
    }
}

pub async fn find_by_id(db: &DatabaseConnection, id: Id) -> Result<Model, Error> {
    Entity::find_by_id(id).one(db).await?.ok_or_else(|| Error {
        source: None,
        error_kind: EntityApiErrorKind::RecordNotFound,
    })
}

pub async fn find_by_remote_file_id(
    db: &DatabaseConnection,
    remote_file_id: &str,
) -> Result<Option<Model>, Error> {
    Ok(Entity::find()
        .filter(Column::RemoteFileId.eq(remote_file_id))
        .one(db)
        .await?)
}

pub async fn find_by_user_id(db: &DatabaseConnection, user_id: Id) -> Result<Vec<Model>, Error> {
    Ok(Entity::find()
        .filter(Column::UserId.eq(user_id))
        .order_by_desc(Column::ModifiedTime)
        .all(db)
        .await?)
}

/// Imported files in [start, end] that no call references yet. This is the
/// transcript matcher's local candidate pool: text already extracted, not
/// yet attached to a call.
pub async fn find_unlinked_imported_in_window(
    db: &DatabaseConnection,
    user_id: Id,
    start: DateTimeWithTimeZone,
    end: DateTimeWithTimeZone,
) -> Result<Vec<Model>, Error> {
    Ok(Entity::find()
        .filter(Column::UserId.eq(user_id))
        .filter(Column::Status.eq(DriveFileStatus::Imported))
        .filter(Column::ModifiedTime.gte(start))
        .filter(Column::ModifiedTime.lte(end))
        .join(JoinType::LeftJoin, Relation::Calls.def())
        .filter(entity::calls::Column::Id.is_null())
        .order_by_desc(Column::ModifiedTime)
        .all(db)
        .await?)
}

/// Imported files that no call references yet, newest import first.
pub async fn find_unlinked_imported(
    db: &DatabaseConnection,
    user_id: Id,
) -> Result<Vec<Model>, Error> {
    Ok(Entity::find()
        .filter(Column::UserId.eq(user_id))
        .filter(Column::Status.eq(DriveFileStatus::Imported))
        .join(JoinType::LeftJoin, Relation::Calls.def())
        .filter(entity::calls::Column::Id.is_null())
        .order_by_desc(Column::ImportedAt)
        .all(db)
        .await?)
}

/// Caches the fetched document text on the row without changing its status.
pub async fn store_content(
    db: &DatabaseConnection,
    id: Id,
    raw_text: String,
) -> Result<Model, Error> {
    let existing = find_by_id(db, id).await?;

    let active_model = ActiveModel {
        id: Unchanged(existing.id),
        raw_text: Set(Some(raw_text)),
        updated_at: Set(chrono::Utc::now().into()),
        ..Default::default()
    };

    Ok(active_model.update(db).await?.try_into_model()?)
}

pub async fn mark_imported(db: &DatabaseConnection, id: Id) -> Result<Model, Error> {
    update_status(db, id, DriveFileStatus::Imported, None).await
}

pub async fn mark_error(
    db: &DatabaseConnection,
    id: Id,
    message: String,
) -> Result<Model, Error> {
    warn!("Marking drive file {id} as errored: {message}");
    update_status(db, id, DriveFileStatus::Error, Some(message)).await
}

/// Marks a file skipped, e.g. when its meeting was already imported through
/// another path.
pub async fn mark_skipped(
    db: &DatabaseConnection,
    id: Id,
    reason: String,
) -> Result<Model, Error> {
    update_status(db, id, DriveFileStatus::Skipped, Some(reason)).await
}

async fn update_status(
    db: &DatabaseConnection,
    id: Id,
    status: DriveFileStatus,
    error_message: Option<String>,
) -> Result<Model, Error> {
    let existing = find_by_id(db, id).await?;

    let imported_at = match status {
        DriveFileStatus::Imported => Set(Some(chrono::Utc::now().into())),
        _ => Unchanged(existing.imported_at),
    };

    let active_model = ActiveModel {
        id: Unchanged(existing.id),
        status: Set(status),
        error_message: Set(error_message),
        imported_at,
        updated_at: Set(chrono::Utc::now().into()),
        ..Default::default()
    };

    Ok(active_model.update(db).await?.try_into_model()?)
}

#[cfg(test)]
// We need to gate seaORM's mock feature behind conditional compilation because
// the feature removes the Clone trait implementation from seaORM's DatabaseConnection.
// see https://github.com/SeaQL/sea-orm/issues/830
#[cfg(feature = "mock")]
mod tests {
    use super::*;
    use sea_orm::{DatabaseBackend, MockDatabase};

    fn test_model() -> Model {
        let now = chrono::Utc::now();
        Model {
            id: Id::new_v4(),
            user_id: Id::new_v4(),
            remote_file_id: "file_abc".to_string(),
            name: "Weekly check-in - Transcript".to_string(),
            mime_type: "application/vnd.google-apps.document".to_string(),
            modified_time: now.into(),
            raw_text: None,
            status: DriveFileStatus::Pending,
            error_message: None,
            imported_at: None,
            created_at: now.into(),
            updated_at: now.into(),
        }
    }

    #[tokio::test]
    async fn upsert_creates_pending_row_for_new_file() -> Result<(), Error> {
        let model = test_model();

        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results::<Model, Vec<Model>, _>(vec![vec![], vec![model.clone()]])
            .into_connection();

        let file = upsert(&db, model.clone()).await?;

        assert_eq!(file.remote_file_id, model.remote_file_id);
        assert_eq!(file.status, DriveFileStatus::Pending);

        Ok(())
    }

    #[tokio::test]
    async fn mark_imported_transitions_status() -> Result<(), Error> {
        let model = test_model();

        let mut imported = model.clone();
        imported.status = DriveFileStatus::Imported;
        imported.imported_at = Some(chrono::Utc::now().into());

        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results(vec![vec![model.clone()], vec![imported.clone()]])
            .into_connection();

        let file = mark_imported(&db, model.id).await?;

        assert_eq!(file.status, DriveFileStatus::Imported);
        assert!(file.imported_at.is_some());

        Ok(())
    }

    #[tokio::test]
    async fn mark_skipped_records_the_reason() -> Result<(), Error> {
        let model = test_model();

        let mut skipped = model.clone();
        skipped.status = DriveFileStatus::Skipped;
        skipped.error_message = Some("call already imported".to_string());

        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results(vec![vec![model.clone()], vec![skipped.clone()]])
            .into_connection();

        let file = mark_skipped(&db, model.id, "call already imported".to_string()).await?;

        assert_eq!(file.status, DriveFileStatus::Skipped);
        assert_eq!(file.error_message.as_deref(), Some("call already imported"));

        Ok(())
    }
}
