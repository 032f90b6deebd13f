//! Drive folder sync: lists transcript documents in a folder, downloads
//! their text and caches it locally as `drive_files` rows.
//!
//! Unchanged files that were already imported are never re-downloaded.

use crate::error::Error;
use crate::transcript_match::{GOOGLE_DOC_MIME, PLAIN_TEXT_MIME};
use call_ai::traits::file_store::Provider as FileStoreProvider;
use call_ai::{FileQuery, RemoteFile};
use entity::drive_file_status::DriveFileStatus;
use entity::{drive_files, Id};
use log::*;
use sea_orm::DatabaseConnection;

/// Outcome of one folder sync run.
#[derive(Debug, Clone, Default, PartialEq, serde::Serialize)]
pub struct DriveSyncSummary {
    pub total: usize,
    pub imported: usize,
    pub updated: usize,
    pub skipped: usize,
    pub errors: Vec<String>,
}

fn is_unchanged(existing: &drive_files::Model, remote: &RemoteFile) -> bool {
    let local_modified: chrono::DateTime<chrono::Utc> = existing.modified_time.into();
    existing.status == DriveFileStatus::Imported && local_modified == remote.modified_time
}

async fn ingest_file(
    db: &DatabaseConnection,
    store: &dyn FileStoreProvider,
    user_id: Id,
    remote: &RemoteFile,
) -> Result<(), Error> {
    let now = chrono::Utc::now();
    let stored = entity_api::drive_file::upsert(
        db,
        drive_files::Model {
            id: Id::new_v4(),
            user_id,
            remote_file_id: remote.id.clone(),
            name: remote.name.clone(),
            mime_type: remote.mime_type.clone(),
            modified_time: remote.modified_time.into(),
            raw_text: None,
            status: DriveFileStatus::Pending,
            error_message: None,
            imported_at: None,
            created_at: now.into(),
            updated_at: now.into(),
        },
    )
    .await?;

    match store.get_content(&remote.id, &remote.mime_type).await {
        Ok(text) => {
            entity_api::drive_file::store_content(db, stored.id, text).await?;
            entity_api::drive_file::mark_imported(db, stored.id).await?;
            Ok(())
        }
        Err(e) => {
            let message = e.to_string();
            entity_api::drive_file::mark_error(db, stored.id, message).await?;
            Err(e.into())
        }
    }
}

/// Syncs one Drive folder's transcript documents for a user.
///
/// A listing failure propagates; a per-file failure marks the row errored,
/// is recorded in the summary and the run continues.
pub async fn sync_folder(
    db: &DatabaseConnection,
    store: &dyn FileStoreProvider,
    user_id: Id,
    folder_id: &str,
) -> Result<DriveSyncSummary, Error> {
    let query = FileQuery {
        name_contains: vec![],
        mime_types: vec![GOOGLE_DOC_MIME.to_string(), PLAIN_TEXT_MIME.to_string()],
        modified_after: None,
        modified_before: None,
        folder_id: Some(folder_id.to_string()),
        page_size: None,
    };

    let remote_files = store.list_files(&query).await?;

    let mut summary = DriveSyncSummary {
        total: remote_files.len(),
        ..Default::default()
    };

    info!(
        "Syncing Drive folder {folder_id} for user {user_id}: {} files",
        summary.total
    );

    for remote in &remote_files {
        let existing = entity_api::drive_file::find_by_remote_file_id(db, &remote.id).await?;

        if let Some(existing) = &existing {
            if is_unchanged(existing, remote) {
                summary.skipped += 1;
                continue;
            }
        }
        let is_new = existing.is_none();

        match ingest_file(db, store, user_id, remote).await {
            Ok(()) => {
                if is_new {
                    summary.imported += 1;
                } else {
                    summary.updated += 1;
                }
            }
            Err(e) => {
                error!("Error syncing drive file {}: {e}", remote.name);
                summary.errors.push(format!("{}: {e}", remote.name));
            }
        }
    }

    info!(
        "Drive sync finished for user {user_id}: {} imported, {} updated, {} skipped, {} errors",
        summary.imported,
        summary.updated,
        summary.skipped,
        summary.errors.len()
    );

    Ok(summary)
}

/// All synced Drive files for a user, newest modification first.
pub async fn files_for_user(
    db: &DatabaseConnection,
    user_id: Id,
) -> Result<Vec<drive_files::Model>, Error> {
    Ok(entity_api::drive_file::find_by_user_id(db, user_id).await?)
}

/// Syncs several folders, folding the per-folder results into one summary.
///
/// A listing failure in one folder does not stop the others; it is
/// recorded against the folder id.
pub async fn sync_all_folders(
    db: &DatabaseConnection,
    store: &dyn FileStoreProvider,
    user_id: Id,
    folder_ids: &[String],
) -> Result<DriveSyncSummary, Error> {
    let mut combined = DriveSyncSummary::default();

    for folder_id in folder_ids {
        match sync_folder(db, store, user_id, folder_id).await {
            Ok(summary) => {
                combined.total += summary.total;
                combined.imported += summary.imported;
                combined.updated += summary.updated;
                combined.skipped += summary.skipped;
                combined.errors.extend(summary.errors);
            }
            Err(e) => {
                error!("Error listing drive folder {folder_id}: {e}");
                combined.errors.push(format!("Folder {folder_id}: {e}"));
            }
        }
    }

    Ok(combined)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn remote(id: &str, modified: chrono::DateTime<Utc>) -> RemoteFile {
        RemoteFile {
            id: id.to_string(),
            name: "Weekly check-in - Transcript".to_string(),
            mime_type: GOOGLE_DOC_MIME.to_string(),
            modified_time: modified,
        }
    }

    fn local(remote_file_id: &str, modified: chrono::DateTime<Utc>) -> drive_files::Model {
        let now = Utc::now();
        drive_files::Model {
            id: Id::new_v4(),
            user_id: Id::new_v4(),
            remote_file_id: remote_file_id.to_string(),
            name: "Weekly check-in - Transcript".to_string(),
            mime_type: GOOGLE_DOC_MIME.to_string(),
            modified_time: modified.into(),
            raw_text: Some("hello".to_string()),
            status: DriveFileStatus::Imported,
            error_message: None,
            imported_at: Some(now.into()),
            created_at: now.into(),
            updated_at: now.into(),
        }
    }

    #[test]
    fn unchanged_imported_files_are_detected() {
        let modified = Utc::now();
        assert!(is_unchanged(&local("f1", modified), &remote("f1", modified)));
    }

    #[test]
    fn touched_files_are_not_unchanged() {
        let modified = Utc::now();
        let touched = modified + chrono::Duration::minutes(5);
        assert!(!is_unchanged(&local("f1", modified), &remote("f1", touched)));
    }

    #[test]
    fn non_imported_files_are_not_unchanged() {
        let modified = Utc::now();
        let mut pending = local("f1", modified);
        pending.status = DriveFileStatus::Pending;
        assert!(!is_unchanged(&pending, &remote("f1", modified)));
    }
}
