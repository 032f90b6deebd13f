use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;

use crate::controller::ApiResponse;
use crate::{AppState, Error};
use domain::{prompt as PromptApi, prompts::Model, Id};
use log::*;

/// GET all Prompts
#[utoipa::path(
    get,
    path = "/prompts",
    responses(
        (status = 200, description = "Successfully retrieved all Prompts", body = [domain::prompts::Model]),
        (status = 405, description = "Method not allowed"),
        (status = 503, description = "Service temporarily unavailable")
    )
)]
pub async fn index(State(app_state): State<AppState>) -> Result<impl IntoResponse, Error> {
    debug!("GET all Prompts");

    let prompts = PromptApi::find_all(app_state.db_conn_ref()).await?;

    Ok(Json(ApiResponse::new(StatusCode::OK.into(), prompts)))
}

/// POST create a new Prompt. New prompts start inactive; activation is a
/// separate, explicit step.
#[utoipa::path(
    post,
    path = "/prompts",
    request_body = domain::prompts::Model,
    responses(
        (status = 201, description = "Successfully Created a New Prompt", body = [domain::prompts::Model]),
        (status = 422, description = "Unprocessable Entity"),
        (status = 405, description = "Method not allowed"),
        (status = 503, description = "Service temporarily unavailable")
    )
)]
pub async fn create(
    State(app_state): State<AppState>,
    Json(prompt_model): Json<Model>,
) -> Result<impl IntoResponse, Error> {
    debug!("POST Create a New Prompt: {}", prompt_model.name);

    let prompt = PromptApi::create(app_state.db_conn_ref(), prompt_model).await?;

    Ok(Json(ApiResponse::new(StatusCode::CREATED.into(), prompt)))
}

/// PUT update a Prompt's content. Updating never changes which prompt is
/// active.
#[utoipa::path(
    put,
    path = "/prompts/{id}",
    params(
        ("id" = Uuid, Path, description = "Id of prompt to update"),
    ),
    request_body = domain::prompts::Model,
    responses(
        (status = 200, description = "Successfully Updated Prompt", body = [domain::prompts::Model]),
        (status = 404, description = "Prompt not found"),
        (status = 405, description = "Method not allowed"),
        (status = 503, description = "Service temporarily unavailable")
    )
)]
pub async fn update(
    State(app_state): State<AppState>,
    Path(id): Path<Id>,
    Json(prompt_model): Json<Model>,
) -> Result<impl IntoResponse, Error> {
    debug!("PUT Update Prompt with id: {id}");

    let prompt = PromptApi::update(app_state.db_conn_ref(), id, prompt_model).await?;

    Ok(Json(ApiResponse::new(StatusCode::OK.into(), prompt)))
}

/// PUT activate a Prompt; any previously active prompt is deactivated.
#[utoipa::path(
    put,
    path = "/prompts/{id}/activate",
    params(
        ("id" = Uuid, Path, description = "Id of prompt to activate"),
    ),
    responses(
        (status = 200, description = "Successfully Activated Prompt", body = [domain::prompts::Model]),
        (status = 404, description = "Prompt not found"),
        (status = 405, description = "Method not allowed"),
        (status = 503, description = "Service temporarily unavailable")
    )
)]
pub async fn activate(
    State(app_state): State<AppState>,
    Path(id): Path<Id>,
) -> Result<impl IntoResponse, Error> {
    info!("PUT Activate Prompt with id: {id}");

    let prompt = PromptApi::activate(app_state.db_conn_ref(), id).await?;

    Ok(Json(ApiResponse::new(StatusCode::OK.into(), prompt)))
}
