use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use serde_json::json;

use crate::controller::{import_settings, openai_client, ApiResponse};
use crate::{AppState, Error};
use domain::{call_import, categories::Model, category as CategoryApi, Id};
use log::*;

/// GET all Categories
#[utoipa::path(
    get,
    path = "/categories",
    responses(
        (status = 200, description = "Successfully retrieved all Categories", body = [domain::categories::Model]),
        (status = 405, description = "Method not allowed"),
        (status = 503, description = "Service temporarily unavailable")
    )
)]
pub async fn index(State(app_state): State<AppState>) -> Result<impl IntoResponse, Error> {
    debug!("GET all Categories");

    let categories = CategoryApi::find_all(app_state.db_conn_ref()).await?;

    Ok(Json(ApiResponse::new(StatusCode::OK.into(), categories)))
}

/// POST create a new Category
#[utoipa::path(
    post,
    path = "/categories",
    request_body = domain::categories::Model,
    responses(
        (status = 201, description = "Successfully Created a New Category", body = [domain::categories::Model]),
        (status = 422, description = "Unprocessable Entity"),
        (status = 405, description = "Method not allowed"),
        (status = 503, description = "Service temporarily unavailable")
    )
)]
pub async fn create(
    State(app_state): State<AppState>,
    Json(category_model): Json<Model>,
) -> Result<impl IntoResponse, Error> {
    debug!("POST Create a New Category from: {category_model:?}");

    let category = CategoryApi::create(app_state.db_conn_ref(), category_model).await?;

    Ok(Json(ApiResponse::new(
        StatusCode::CREATED.into(),
        category,
    )))
}

/// PUT update a Category. Fixed catalog members keep their name.
#[utoipa::path(
    put,
    path = "/categories/{id}",
    params(
        ("id" = Uuid, Path, description = "Id of category to update"),
    ),
    request_body = domain::categories::Model,
    responses(
        (status = 200, description = "Successfully Updated Category", body = [domain::categories::Model]),
        (status = 404, description = "Category not found"),
        (status = 405, description = "Method not allowed"),
        (status = 503, description = "Service temporarily unavailable")
    )
)]
pub async fn update(
    State(app_state): State<AppState>,
    Path(id): Path<Id>,
    Json(category_model): Json<Model>,
) -> Result<impl IntoResponse, Error> {
    debug!("PUT Update Category with id: {id}");

    let category = CategoryApi::update(app_state.db_conn_ref(), id, category_model).await?;

    Ok(Json(ApiResponse::new(StatusCode::OK.into(), category)))
}

/// DELETE a Category specified by its primary key. Fixed catalog members
/// cannot be deleted.
#[utoipa::path(
    delete,
    path = "/categories/{id}",
    params(
        ("id" = String, Path, description = "Category id to delete")
    ),
    responses(
        (status = 200, description = "Successfully deleted a certain Category by its id", body = [String]),
        (status = 404, description = "Category not found"),
        (status = 405, description = "Method not allowed"),
        (status = 422, description = "Category is part of the fixed catalog"),
        (status = 503, description = "Service temporarily unavailable")
    )
)]
pub async fn delete(
    State(app_state): State<AppState>,
    Path(id): Path<Id>,
) -> Result<impl IntoResponse, Error> {
    debug!("DELETE Category by id: {id}");

    CategoryApi::delete_by_id(app_state.db_conn_ref(), id).await?;
    Ok(Json(json!({"id": id})))
}

/// POST re-run the category classifier over every call with a transcript.
///
/// Prediction fields are refreshed on all calls; human overrides are
/// never moved.
#[utoipa::path(
    post,
    path = "/categories/recategorize",
    responses(
        (status = 200, description = "Successfully recategorized all Calls", body = String),
        (status = 400, description = "OpenAI is not configured"),
        (status = 405, description = "Method not allowed"),
        (status = 503, description = "Service temporarily unavailable")
    )
)]
pub async fn recategorize(
    State(app_state): State<AppState>,
) -> Result<impl IntoResponse, Error> {
    info!("POST Recategorize all Calls");

    let llm = openai_client(&app_state.config)?;
    let settings = import_settings(&app_state.config);

    let outcome =
        call_import::recategorize_all(app_state.db_conn_ref(), &llm, &settings).await?;

    Ok(Json(ApiResponse::new(StatusCode::OK.into(), outcome)))
}
