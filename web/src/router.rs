use crate::{controller::health_check_controller, params, AppState};
use axum::{
    routing::{delete, get, post, put},
    Router,
};
use tower_http::services::ServeDir;

use crate::controller::{
    calendar_controller, call_controller, category_controller, drive_controller,
    integration_controller, prompt_controller, user_controller,
};

use utoipa::OpenApi;
use utoipa_rapidoc::RapiDoc;

// This is the global definition of our OpenAPI spec. To be a part
// of the rendered spec, a path and schema must be listed here.
#[derive(OpenApi)]
#[openapi(
        info(
            title = "Call Intelligence API"
        ),
        paths(
            call_controller::index,
            call_controller::read,
            call_controller::override_category,
            call_controller::delete,
            category_controller::index,
            category_controller::create,
            category_controller::update,
            category_controller::delete,
            category_controller::recategorize,
            prompt_controller::index,
            prompt_controller::create,
            prompt_controller::update,
            prompt_controller::activate,
            user_controller::index,
            user_controller::read,
            user_controller::create,
            user_controller::update,
            integration_controller::read,
            integration_controller::connect,
            integration_controller::set_auto_sync,
            calendar_controller::sync,
            calendar_controller::sync_all,
            calendar_controller::import,
            drive_controller::index,
            drive_controller::sync,
            drive_controller::import_to_calls,
            health_check_controller::health_check,
        ),
        components(
            schemas(
                domain::calls::Model,
                domain::categories::Model,
                domain::prompts::Model,
                domain::calendar_events::Model,
                domain::drive_files::Model,
                domain::google_integrations::Model,
                domain::users::Model,
                params::AutoSyncRequest,
                params::OverrideCategoryRequest,
                params::CalendarSyncRequest,
                params::CalendarImportRequest,
                params::DriveSyncRequest,
                params::DriveImportRequest,
            )
        ),
        tags(
            (name = "call_intelligence", description = "Call ingestion, analysis & categorization API")
        )
    )]
struct ApiDoc;

pub fn define_routes(app_state: AppState) -> Router {
    Router::new()
        .merge(call_routes(app_state.clone()))
        .merge(category_routes(app_state.clone()))
        .merge(prompt_routes(app_state.clone()))
        .merge(user_routes(app_state.clone()))
        .merge(integration_routes(app_state.clone()))
        .merge(calendar_routes(app_state.clone()))
        .merge(drive_routes(app_state))
        .merge(health_routes())
        .merge(RapiDoc::with_openapi("/api-docs/openapi2.json", ApiDoc::openapi()).path("/rapidoc"))
        .fallback_service(static_routes())
}

fn call_routes(app_state: AppState) -> Router {
    Router::new()
        .route("/calls", get(call_controller::index))
        .route("/calls/{id}", get(call_controller::read))
        .route(
            "/calls/{id}/category",
            put(call_controller::override_category),
        )
        .route("/calls/{id}", delete(call_controller::delete))
        .with_state(app_state)
}

fn category_routes(app_state: AppState) -> Router {
    Router::new()
        .route("/categories", get(category_controller::index))
        .route("/categories", post(category_controller::create))
        .route("/categories/{id}", put(category_controller::update))
        .route("/categories/{id}", delete(category_controller::delete))
        .route(
            "/categories/recategorize",
            post(category_controller::recategorize),
        )
        .with_state(app_state)
}

fn prompt_routes(app_state: AppState) -> Router {
    Router::new()
        .route("/prompts", get(prompt_controller::index))
        .route("/prompts", post(prompt_controller::create))
        .route("/prompts/{id}", put(prompt_controller::update))
        .route("/prompts/{id}/activate", put(prompt_controller::activate))
        .with_state(app_state)
}

fn user_routes(app_state: AppState) -> Router {
    Router::new()
        .route("/users", get(user_controller::index))
        .route("/users", post(user_controller::create))
        .route("/users/{id}", get(user_controller::read))
        .route("/users/{id}", put(user_controller::update))
        .with_state(app_state)
}

fn integration_routes(app_state: AppState) -> Router {
    Router::new()
        .route(
            "/integrations/{user_id}",
            get(integration_controller::read),
        )
        .route(
            "/integrations/{user_id}",
            put(integration_controller::connect),
        )
        .route(
            "/integrations/{user_id}/auto-sync",
            put(integration_controller::set_auto_sync),
        )
        .with_state(app_state)
}

fn calendar_routes(app_state: AppState) -> Router {
    Router::new()
        .route("/calendar/sync", post(calendar_controller::sync))
        .route("/calendar/sync-all", post(calendar_controller::sync_all))
        .route("/calendar/import", post(calendar_controller::import))
        .with_state(app_state)
}

fn drive_routes(app_state: AppState) -> Router {
    Router::new()
        .route("/drive/files", get(drive_controller::index))
        .route("/drive/sync", post(drive_controller::sync))
        .route(
            "/drive/import-to-calls",
            post(drive_controller::import_to_calls),
        )
        .with_state(app_state)
}

fn health_routes() -> Router {
    Router::new().route("/health", get(health_check_controller::health_check))
}

// This will serve static files that we can use as a "fallback" for when the server panics
pub fn static_routes() -> Router {
    Router::new().nest_service("/", ServeDir::new("./"))
}
