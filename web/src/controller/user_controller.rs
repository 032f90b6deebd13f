use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;

use crate::controller::ApiResponse;
use crate::{AppState, Error};
use domain::{user as UserApi, users::Model, Id};
use log::*;

/// GET all Users
#[utoipa::path(
    get,
    path = "/users",
    responses(
        (status = 200, description = "Successfully retrieved all Users", body = [domain::users::Model]),
        (status = 405, description = "Method not allowed"),
        (status = 503, description = "Service temporarily unavailable")
    )
)]
pub async fn index(State(app_state): State<AppState>) -> Result<impl IntoResponse, Error> {
    debug!("GET all Users");

    let users = UserApi::find_all(app_state.db_conn_ref()).await?;

    Ok(Json(ApiResponse::new(StatusCode::OK.into(), users)))
}

/// GET a particular User specified by its id.
#[utoipa::path(
    get,
    path = "/users/{id}",
    params(
        ("id" = String, Path, description = "User id to retrieve")
    ),
    responses(
        (status = 200, description = "Successfully retrieved a specific User by its id", body = [domain::users::Model]),
        (status = 404, description = "User not found"),
        (status = 405, description = "Method not allowed"),
        (status = 503, description = "Service temporarily unavailable")
    )
)]
pub async fn read(
    State(app_state): State<AppState>,
    Path(id): Path<Id>,
) -> Result<impl IntoResponse, Error> {
    debug!("GET User by id: {id}");

    let user = UserApi::find_by_id(app_state.db_conn_ref(), id).await?;

    Ok(Json(ApiResponse::new(StatusCode::OK.into(), user)))
}

/// POST create a new User record. Authentication happens upstream; this
/// only registers the identity the sync and import endpoints scope by.
#[utoipa::path(
    post,
    path = "/users",
    request_body = domain::users::Model,
    responses(
        (status = 201, description = "Successfully Created a New User", body = [domain::users::Model]),
        (status = 409, description = "A User with this email already exists"),
        (status = 422, description = "Unprocessable Entity"),
        (status = 405, description = "Method not allowed"),
        (status = 503, description = "Service temporarily unavailable")
    )
)]
pub async fn create(
    State(app_state): State<AppState>,
    Json(user_model): Json<Model>,
) -> Result<impl IntoResponse, Error> {
    debug!("POST Create a New User: {}", user_model.email);

    let user = UserApi::create(app_state.db_conn_ref(), user_model).await?;

    Ok(Json(ApiResponse::new(StatusCode::CREATED.into(), user)))
}

/// PUT update a User's email or display name.
#[utoipa::path(
    put,
    path = "/users/{id}",
    params(
        ("id" = Uuid, Path, description = "Id of user to update"),
    ),
    request_body = domain::users::Model,
    responses(
        (status = 200, description = "Successfully Updated User", body = [domain::users::Model]),
        (status = 404, description = "User not found"),
        (status = 405, description = "Method not allowed"),
        (status = 503, description = "Service temporarily unavailable")
    )
)]
pub async fn update(
    State(app_state): State<AppState>,
    Path(id): Path<Id>,
    Json(user_model): Json<Model>,
) -> Result<impl IntoResponse, Error> {
    debug!("PUT Update User with id: {id}");

    let user = UserApi::update(app_state.db_conn_ref(), id, user_model).await?;

    Ok(Json(ApiResponse::new(StatusCode::OK.into(), user)))
}
