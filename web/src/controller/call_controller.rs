use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use serde_json::json;

use crate::controller::ApiResponse;
use crate::params::{CallIndexParams, OverrideCategoryRequest};
use crate::{AppState, Error};
use axum::extract::Query;
use domain::{call as CallApi, Id};
use log::*;

/// GET all Calls, optionally filtered by confirmed category or review flag.
#[utoipa::path(
    get,
    path = "/calls",
    params(CallIndexParams),
    responses(
        (status = 200, description = "Successfully retrieved all Calls", body = [domain::calls::Model]),
        (status = 405, description = "Method not allowed"),
        (status = 503, description = "Service temporarily unavailable")
    )
)]
pub async fn index(
    State(app_state): State<AppState>,
    Query(params): Query<CallIndexParams>,
) -> Result<impl IntoResponse, Error> {
    debug!("GET all Calls");
    debug!("Filter Params: {params:?}");

    let calls = CallApi::find_by(app_state.db_conn_ref(), params).await?;

    Ok(Json(ApiResponse::new(StatusCode::OK.into(), calls)))
}

/// GET a particular Call specified by its id.
#[utoipa::path(
    get,
    path = "/calls/{id}",
    params(
        ("id" = String, Path, description = "Call id to retrieve")
    ),
    responses(
        (status = 200, description = "Successfully retrieved a specific Call by its id", body = [domain::calls::Model]),
        (status = 404, description = "Call not found"),
        (status = 405, description = "Method not allowed"),
        (status = 503, description = "Service temporarily unavailable")
    )
)]
pub async fn read(
    State(app_state): State<AppState>,
    Path(id): Path<Id>,
) -> Result<impl IntoResponse, Error> {
    debug!("GET Call by id: {id}");

    let call = CallApi::find_by_id(app_state.db_conn_ref(), id).await?;

    Ok(Json(ApiResponse::new(StatusCode::OK.into(), call)))
}

/// PUT a human category override on a Call.
///
/// The chosen category becomes the final assignment; automatic
/// reclassification will never move this call again.
#[utoipa::path(
    put,
    path = "/calls/{id}/category",
    params(
        ("id" = Uuid, Path, description = "Id of call to override"),
    ),
    request_body = OverrideCategoryRequest,
    responses(
        (status = 200, description = "Successfully Overrode the Call's Category", body = [domain::calls::Model]),
        (status = 404, description = "Call or Category not found"),
        (status = 405, description = "Method not allowed"),
        (status = 500, description = "Category is not overridable"),
        (status = 503, description = "Service temporarily unavailable")
    )
)]
pub async fn override_category(
    State(app_state): State<AppState>,
    Path(id): Path<Id>,
    Json(request): Json<OverrideCategoryRequest>,
) -> Result<impl IntoResponse, Error> {
    debug!(
        "PUT Override Call {id} category to {}",
        request.category_id
    );

    let call = CallApi::override_category(
        app_state.db_conn_ref(),
        id,
        request.category_id,
        request.overridden_by,
    )
    .await?;

    Ok(Json(ApiResponse::new(StatusCode::OK.into(), call)))
}

/// DELETE a Call specified by its primary key.
#[utoipa::path(
    delete,
    path = "/calls/{id}",
    params(
        ("id" = String, Path, description = "Call id to delete")
    ),
    responses(
        (status = 200, description = "Successfully deleted a certain Call by its id", body = [String]),
        (status = 404, description = "Call not found"),
        (status = 405, description = "Method not allowed"),
        (status = 503, description = "Service temporarily unavailable")
    )
)]
pub async fn delete(
    State(app_state): State<AppState>,
    Path(id): Path<Id>,
) -> Result<impl IntoResponse, Error> {
    debug!("DELETE Call by id: {id}");

    CallApi::delete_by_id(app_state.db_conn_ref(), id).await?;
    Ok(Json(json!({"id": id})))
}
