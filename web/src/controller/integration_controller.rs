use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;

use crate::controller::ApiResponse;
use crate::params::AutoSyncRequest;
use crate::{AppState, Error};
use domain::{google_integrations::Model, integration as IntegrationApi, Id};
use log::*;

/// GET a user's Google integration status.
#[utoipa::path(
    get,
    path = "/integrations/{user_id}",
    params(
        ("user_id" = Uuid, Path, description = "User whose integration to retrieve"),
    ),
    responses(
        (status = 200, description = "Successfully retrieved the user's Google integration", body = [domain::google_integrations::Model]),
        (status = 404, description = "No Google integration for this user"),
        (status = 405, description = "Method not allowed"),
        (status = 503, description = "Service temporarily unavailable")
    )
)]
pub async fn read(
    State(app_state): State<AppState>,
    Path(user_id): Path<Id>,
) -> Result<impl IntoResponse, Error> {
    debug!("GET Google integration for user: {user_id}");

    let integration = IntegrationApi::find_by_user_id(app_state.db_conn_ref(), user_id)
        .await?
        .ok_or_else(|| domain::error::Error::config("Google account not connected"))?;

    Ok(Json(ApiResponse::new(StatusCode::OK.into(), integration)))
}

/// PUT store or refresh a user's Google token material. Called by the
/// deployment's OAuth callback after the token exchange.
#[utoipa::path(
    put,
    path = "/integrations/{user_id}",
    params(
        ("user_id" = Uuid, Path, description = "User to connect"),
    ),
    request_body = domain::google_integrations::Model,
    responses(
        (status = 200, description = "Successfully stored the Google integration", body = [domain::google_integrations::Model]),
        (status = 405, description = "Method not allowed"),
        (status = 503, description = "Service temporarily unavailable")
    )
)]
pub async fn connect(
    State(app_state): State<AppState>,
    Path(user_id): Path<Id>,
    Json(mut integration_model): Json<Model>,
) -> Result<impl IntoResponse, Error> {
    info!("PUT Google integration for user: {user_id}");

    integration_model.user_id = user_id;
    let integration =
        IntegrationApi::connect(app_state.db_conn_ref(), integration_model).await?;

    Ok(Json(ApiResponse::new(StatusCode::OK.into(), integration)))
}

/// PUT toggle background calendar auto-sync for a user.
#[utoipa::path(
    put,
    path = "/integrations/{user_id}/auto-sync",
    params(
        ("user_id" = Uuid, Path, description = "User whose auto-sync to toggle"),
    ),
    request_body = AutoSyncRequest,
    responses(
        (status = 200, description = "Successfully updated auto-sync", body = [domain::google_integrations::Model]),
        (status = 404, description = "No Google integration for this user"),
        (status = 405, description = "Method not allowed"),
        (status = 503, description = "Service temporarily unavailable")
    )
)]
pub async fn set_auto_sync(
    State(app_state): State<AppState>,
    Path(user_id): Path<Id>,
    Json(request): Json<AutoSyncRequest>,
) -> Result<impl IntoResponse, Error> {
    info!(
        "PUT auto-sync {} for user: {user_id}",
        if request.enabled { "on" } else { "off" }
    );

    let integration =
        IntegrationApi::set_auto_sync(app_state.db_conn_ref(), user_id, request.enabled).await?;

    Ok(Json(ApiResponse::new(StatusCode::OK.into(), integration)))
}
