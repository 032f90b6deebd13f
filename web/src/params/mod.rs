//! Request body types shared by the controllers.
//!
//! Session auth is handled upstream of this service, so every request that
//! acts on Google data carries an explicit `user_id`.

use chrono::{DateTime, Utc};
use domain::{Id, IntoQueryFilterMap, QueryFilterMap};
use sea_orm::Value;
use serde::Deserialize;
use utoipa::{IntoParams, ToSchema};

/// Query filters for `GET /calls`.
#[derive(Debug, Deserialize, IntoParams)]
pub struct CallIndexParams {
    /// Only calls whose confirmed category matches
    #[param(value_type = Option<Uuid>)]
    pub category_id: Option<Id>,
    /// Only calls flagged (or not flagged) for human review
    pub needs_review: Option<bool>,
}

impl IntoQueryFilterMap for CallIndexParams {
    fn into_query_filter_map(self) -> QueryFilterMap {
        let mut query_filter_map = QueryFilterMap::new();
        if let Some(category_id) = self.category_id {
            query_filter_map.insert(
                "category_final_id".to_string(),
                Some(Value::Uuid(Some(Box::new(category_id)))),
            );
        }
        if let Some(needs_review) = self.needs_review {
            query_filter_map.insert(
                "needs_review".to_string(),
                Some(Value::Bool(Some(needs_review))),
            );
        }

        query_filter_map
    }
}

/// Query filters for `GET /drive/files`.
#[derive(Debug, Deserialize, IntoParams)]
pub struct DriveFilesParams {
    /// User whose synced files to list
    #[param(value_type = Uuid)]
    pub user_id: Id,
}

/// Body for `PUT /integrations/{user_id}/auto-sync`.
#[derive(Debug, Deserialize, ToSchema)]
pub struct AutoSyncRequest {
    pub enabled: bool,
}

/// Body for `PUT /calls/{id}/category`.
#[derive(Debug, Deserialize, ToSchema)]
pub struct OverrideCategoryRequest {
    /// Target category; must belong to the fixed catalog
    #[schema(value_type = Uuid)]
    pub category_id: Id,
    /// User applying the override
    #[schema(value_type = Uuid)]
    pub overridden_by: Id,
}

/// Body for `POST /calendar/sync`.
#[derive(Debug, Deserialize, ToSchema)]
pub struct CalendarSyncRequest {
    #[schema(value_type = Uuid)]
    pub user_id: Id,
    /// Start of the sync window; defaults to `sync_window_days` ago
    #[schema(value_type = Option<String>, format = DateTime)]
    pub start: Option<DateTime<Utc>>,
    /// End of the sync window; defaults to one day from now
    #[schema(value_type = Option<String>, format = DateTime)]
    pub end: Option<DateTime<Utc>>,
}

/// Body for `POST /calendar/import`.
#[derive(Debug, Deserialize, ToSchema)]
pub struct CalendarImportRequest {
    #[schema(value_type = Uuid)]
    pub user_id: Id,
    /// Calendar events to import; events already imported are skipped
    #[schema(value_type = Vec<Uuid>)]
    pub event_ids: Vec<Id>,
}

/// Body for `POST /drive/sync`.
#[derive(Debug, Deserialize, ToSchema)]
pub struct DriveSyncRequest {
    #[schema(value_type = Uuid)]
    pub user_id: Id,
    /// Drive folder ids to scan for transcript documents
    pub folder_ids: Vec<String>,
}

/// Body for `POST /drive/import-to-calls`.
#[derive(Debug, Deserialize, ToSchema)]
pub struct DriveImportRequest {
    #[schema(value_type = Uuid)]
    pub user_id: Id,
    /// Restrict the import to these ingested files; `None` imports every
    /// ingested file not yet attached to a call
    #[schema(value_type = Option<Vec<Uuid>>)]
    pub file_ids: Option<Vec<Id>>,
}
