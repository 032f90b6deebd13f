use axum::extract::State;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use chrono::{Duration, Utc};

use crate::controller::{import_settings, openai_client, ApiResponse};
use crate::params::{CalendarImportRequest, CalendarSyncRequest};
use crate::{AppState, Error};
use domain::domain_classifier::DomainClassifier;
use domain::gateway::{google_calendar::GoogleCalendarClient, google_drive::GoogleDriveClient};
use domain::{calendar_sync, call_import, integration as IntegrationApi, prompt as PromptApi};
use log::*;

/// POST sync a user's calendar events into the local store.
///
/// Events are classified internal/external, checked for cross-user
/// duplicates and probed for transcripts; nothing is imported as a call.
#[utoipa::path(
    post,
    path = "/calendar/sync",
    request_body = CalendarSyncRequest,
    responses(
        (status = 200, description = "Successfully synced the user's Calendar", body = String),
        (status = 400, description = "Google account not connected"),
        (status = 405, description = "Method not allowed"),
        (status = 502, description = "Google Calendar could not be reached"),
        (status = 503, description = "Service temporarily unavailable")
    )
)]
pub async fn sync(
    State(app_state): State<AppState>,
    Json(request): Json<CalendarSyncRequest>,
) -> Result<impl IntoResponse, Error> {
    info!("POST Calendar sync for user: {}", request.user_id);

    let config = &app_state.config;
    let start = request
        .start
        .unwrap_or_else(|| Utc::now() - Duration::days(config.sync_window_days));
    let end = request.end.unwrap_or_else(|| Utc::now() + Duration::days(1));

    let access_token =
        IntegrationApi::access_token_for(app_state.db_conn_ref(), request.user_id).await?;
    let calendar = GoogleCalendarClient::new(&access_token, config.calendar_base_url())
        .map_err(domain::error::Error::from)?;
    let store = GoogleDriveClient::new(&access_token, config.drive_base_url())
        .map_err(domain::error::Error::from)?;

    let classifier = DomainClassifier::new(config.internal_domains.clone())?;
    let settings = import_settings(config);

    let summary = calendar_sync::sync_user_calendar(
        app_state.db_conn_ref(),
        &calendar,
        &store,
        &classifier,
        &settings.matching,
        request.user_id,
        start,
        end,
    )
    .await?;

    Ok(Json(ApiResponse::new(StatusCode::OK.into(), summary)))
}

/// POST sync every user whose integration has auto-sync enabled.
///
/// The scheduler's entry point; one user's failure never stops the
/// others.
#[utoipa::path(
    post,
    path = "/calendar/sync-all",
    responses(
        (status = 200, description = "Auto-sync run finished; see per-user results in the body", body = String),
        (status = 405, description = "Method not allowed"),
        (status = 503, description = "Service temporarily unavailable")
    )
)]
pub async fn sync_all(State(app_state): State<AppState>) -> Result<impl IntoResponse, Error> {
    info!("POST Calendar sync for all auto-sync users");

    let config = &app_state.config;
    let start = Utc::now() - Duration::days(config.sync_window_days);
    let end = Utc::now() + Duration::days(1);

    let classifier = DomainClassifier::new(config.internal_domains.clone())?;
    let settings = import_settings(config);

    let summary = calendar_sync::sync_all_users(
        app_state.db_conn_ref(),
        &classifier,
        &settings.matching,
        config.calendar_base_url(),
        config.drive_base_url(),
        start,
        end,
    )
    .await?;

    Ok(Json(ApiResponse::new(StatusCode::OK.into(), summary)))
}

/// POST import the given calendar events as analyzed, classified calls.
#[utoipa::path(
    post,
    path = "/calendar/import",
    request_body = CalendarImportRequest,
    responses(
        (status = 200, description = "Import finished; see per-item results in the body", body = String),
        (status = 400, description = "No active analysis prompt, or Google account not connected"),
        (status = 405, description = "Method not allowed"),
        (status = 503, description = "Service temporarily unavailable")
    )
)]
pub async fn import(
    State(app_state): State<AppState>,
    Json(request): Json<CalendarImportRequest>,
) -> Result<impl IntoResponse, Error> {
    info!(
        "POST Calendar import for user {}: {} events",
        request.user_id,
        request.event_ids.len()
    );

    let config = &app_state.config;

    let analysis_config = PromptApi::active_analysis_config(app_state.db_conn_ref())
        .await?
        .ok_or_else(|| domain::error::Error::config("No active analysis prompt configured"))?;

    let llm = openai_client(config)?;
    let access_token =
        IntegrationApi::access_token_for(app_state.db_conn_ref(), request.user_id).await?;
    let store = GoogleDriveClient::new(&access_token, config.drive_base_url())
        .map_err(domain::error::Error::from)?;

    let settings = import_settings(config);

    let outcome = call_import::import_calendar_events(
        app_state.db_conn_ref(),
        &llm,
        &store,
        &settings,
        &analysis_config,
        request.user_id,
        request.event_ids,
    )
    .await?;

    Ok(Json(ApiResponse::new(StatusCode::OK.into(), outcome)))
}
