use axum::extract::{Query, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;

use crate::controller::{import_settings, openai_client, ApiResponse};
use crate::params::{DriveFilesParams, DriveImportRequest, DriveSyncRequest};
use crate::{AppState, Error};
use domain::gateway::google_drive::GoogleDriveClient;
use domain::{call_import, drive_sync, integration as IntegrationApi, prompt as PromptApi};
use log::*;

/// GET the synced Drive files for a user, newest first.
#[utoipa::path(
    get,
    path = "/drive/files",
    params(DriveFilesParams),
    responses(
        (status = 200, description = "Successfully retrieved the user's synced Drive files", body = [domain::drive_files::Model]),
        (status = 405, description = "Method not allowed"),
        (status = 503, description = "Service temporarily unavailable")
    )
)]
pub async fn index(
    State(app_state): State<AppState>,
    Query(params): Query<DriveFilesParams>,
) -> Result<impl IntoResponse, Error> {
    debug!("GET Drive files for user: {}", params.user_id);

    let files = drive_sync::files_for_user(app_state.db_conn_ref(), params.user_id).await?;

    Ok(Json(ApiResponse::new(StatusCode::OK.into(), files)))
}

/// POST sync transcript documents from the given Drive folders.
///
/// Document text is downloaded and cached locally; unchanged files that
/// were already ingested are skipped.
#[utoipa::path(
    post,
    path = "/drive/sync",
    request_body = DriveSyncRequest,
    responses(
        (status = 200, description = "Successfully synced the Drive folders", body = String),
        (status = 400, description = "Google account not connected"),
        (status = 405, description = "Method not allowed"),
        (status = 502, description = "Google Drive could not be reached"),
        (status = 503, description = "Service temporarily unavailable")
    )
)]
pub async fn sync(
    State(app_state): State<AppState>,
    Json(request): Json<DriveSyncRequest>,
) -> Result<impl IntoResponse, Error> {
    info!(
        "POST Drive sync for user {}: {} folders",
        request.user_id,
        request.folder_ids.len()
    );

    let access_token =
        IntegrationApi::access_token_for(app_state.db_conn_ref(), request.user_id).await?;
    let store = GoogleDriveClient::new(&access_token, app_state.config.drive_base_url())
        .map_err(domain::error::Error::from)?;

    let summary = drive_sync::sync_all_folders(
        app_state.db_conn_ref(),
        &store,
        request.user_id,
        &request.folder_ids,
    )
    .await?;

    Ok(Json(ApiResponse::new(StatusCode::OK.into(), summary)))
}

/// POST convert ingested Drive files into analyzed, classified calls.
///
/// Used for transcripts that never matched a calendar event; metadata is
/// recovered from the document text where possible.
#[utoipa::path(
    post,
    path = "/drive/import-to-calls",
    request_body = DriveImportRequest,
    responses(
        (status = 200, description = "Import finished; see per-item results in the body", body = String),
        (status = 400, description = "No active analysis prompt, no files available, or Google account not connected"),
        (status = 405, description = "Method not allowed"),
        (status = 503, description = "Service temporarily unavailable")
    )
)]
pub async fn import_to_calls(
    State(app_state): State<AppState>,
    Json(request): Json<DriveImportRequest>,
) -> Result<impl IntoResponse, Error> {
    info!("POST Drive import-to-calls for user {}", request.user_id);

    let config = &app_state.config;

    let analysis_config = PromptApi::active_analysis_config(app_state.db_conn_ref())
        .await?
        .ok_or_else(|| domain::error::Error::config("No active analysis prompt configured"))?;

    let llm = openai_client(config)?;
    let settings = import_settings(config);

    let outcome = call_import::import_drive_files(
        app_state.db_conn_ref(),
        &llm,
        &settings,
        &analysis_config,
        request.user_id,
        request.file_ids,
    )
    .await?;

    Ok(Json(ApiResponse::new(StatusCode::OK.into(), outcome)))
}
