//! Router configuration for the Web API.

use std::sync::Arc;

use axum::{
    extract::{DefaultBodyLimit, State},
    routing::{get, put},
    Json, Router,
};
use tower::ServiceBuilder;
use tower_http::trace::TraceLayer;
use utoipa::openapi::security::{ApiKey, ApiKeyValue, SecurityScheme};
use utoipa::{Modify, OpenApi};

use crate::entry::{EntryType, EntryView, UploadOutcome};

use super::dto::{HealthResponse, UploadBody};
use super::error::{ErrorBody, ErrorCode, ErrorDetail};
use super::handlers::{
    self, get_entry, get_entry_data, list_entries, publish_entry, unpublish_entry, upload_entry,
    AppState,
};
use super::middleware::create_cors_layer;

/// Default request body limit when none is configured.
pub const DEFAULT_BODY_LIMIT: usize = 16 * 1024 * 1024;

#[derive(OpenApi)]
#[openapi(
    info(
        title = "filevault API",
        description = "Files and folders with owner/public access control"
    ),
    paths(
        handlers::entry::upload_entry,
        handlers::entry::list_entries,
        handlers::entry::get_entry,
        handlers::entry::publish_entry,
        handlers::entry::unpublish_entry,
        handlers::entry::get_entry_data,
        health_check,
    ),
    components(schemas(
        EntryType,
        EntryView,
        UploadOutcome,
        UploadBody,
        HealthResponse,
        ErrorBody,
        ErrorDetail,
        ErrorCode,
    )),
    tags(
        (name = "files", description = "Entry storage and retrieval"),
        (name = "health", description = "Service health"),
    ),
    modifiers(&SecurityAddon)
)]
pub struct ApiDoc;

struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "session_token",
                SecurityScheme::ApiKey(ApiKey::Header(ApiKeyValue::new("X-Token"))),
            );
        }
    }
}

/// Create the main API router.
pub fn create_router(app_state: Arc<AppState>, cors_origins: &[String]) -> Router {
    create_router_with_limit(app_state, cors_origins, DEFAULT_BODY_LIMIT)
}

/// Create the main API router with an explicit request body limit in bytes.
pub fn create_router_with_limit(
    app_state: Arc<AppState>,
    cors_origins: &[String],
    body_limit: usize,
) -> Router {
    let file_routes = Router::new()
        .route("/files", get(list_entries).post(upload_entry))
        .route("/files/:id", get(get_entry))
        .route("/files/:id/publish", put(publish_entry))
        .route("/files/:id/unpublish", put(unpublish_entry))
        .route("/files/:id/data", get(get_entry_data));

    Router::new()
        .merge(file_routes)
        .route("/health", get(health_check))
        .route("/api-docs/openapi.json", get(openapi_json))
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(create_cors_layer(cors_origins))
                .layer(DefaultBodyLimit::max(body_limit)),
        )
        .with_state(app_state)
}

/// GET /health - Liveness and database reachability.
#[utoipa::path(
    get,
    path = "/health",
    tag = "health",
    responses(
        (status = 200, description = "Service is up", body = HealthResponse)
    )
)]
async fn health_check(State(state): State<Arc<AppState>>) -> Json<HealthResponse> {
    Json(HealthResponse {
        db: state.db.ping().await,
    })
}

/// GET /api-docs/openapi.json - OpenAPI document.
async fn openapi_json() -> Json<utoipa::openapi::OpenApi> {
    Json(ApiDoc::openapi())
}
