//! Entry handlers.

use std::sync::Arc;

use axum::{
    body::Body,
    extract::{Path, Query, State},
    http::{header, StatusCode},
    response::Response,
    Json,
};

use crate::entry::{EntryView, UploadOutcome, UploadRequest};
use crate::web::dto::{ApiJson, ContentParams, ListParams, UploadBody};
use crate::web::error::{ApiError, ErrorBody};
use crate::web::handlers::AppState;
use crate::web::middleware::{AuthUser, OptionalAuthUser};

/// Parse an entry ID path segment. Anything that is not an ID cannot name
/// an entry.
fn parse_entry_id(raw: &str) -> Result<i64, ApiError> {
    raw.parse::<i64>()
        .ok()
        .filter(|id| *id > 0)
        .ok_or_else(ApiError::not_found)
}

/// POST /files - Create a folder, file or image.
#[utoipa::path(
    post,
    path = "/files",
    tag = "files",
    request_body = UploadBody,
    responses(
        (status = 201, description = "Entry created", body = UploadOutcome),
        (status = 400, description = "Invalid input", body = ErrorBody),
        (status = 401, description = "Unauthorized", body = ErrorBody),
        (status = 500, description = "Content could not be stored", body = ErrorBody)
    ),
    security(
        ("session_token" = [])
    )
)]
pub async fn upload_entry(
    State(state): State<Arc<AppState>>,
    AuthUser(owner_id): AuthUser,
    ApiJson(body): ApiJson<UploadBody>,
) -> Result<(StatusCode, Json<UploadOutcome>), ApiError> {
    let request = UploadRequest::from(body);
    let outcome = state.entries().upload(owner_id, &request).await?;
    Ok((StatusCode::CREATED, Json(outcome)))
}

/// GET /files - List the caller's entries, 20 per page.
#[utoipa::path(
    get,
    path = "/files",
    tag = "files",
    params(
        ("parentId" = Option<String>, Query, description = "Parent folder ID; 0 for top level"),
        ("page" = Option<String>, Query, description = "Zero-indexed page")
    ),
    responses(
        (status = 200, description = "Entries in insertion order", body = Vec<EntryView>),
        (status = 401, description = "Unauthorized", body = ErrorBody)
    ),
    security(
        ("session_token" = [])
    )
)]
pub async fn list_entries(
    State(state): State<Arc<AppState>>,
    AuthUser(owner_id): AuthUser,
    Query(params): Query<ListParams>,
) -> Result<Json<Vec<EntryView>>, ApiError> {
    let entries = state.entries().list(owner_id, &params.to_query()).await?;
    Ok(Json(entries))
}

/// GET /files/:id - Get one of the caller's entries.
#[utoipa::path(
    get,
    path = "/files/{id}",
    tag = "files",
    params(
        ("id" = i64, Path, description = "Entry ID")
    ),
    responses(
        (status = 200, description = "Entry", body = EntryView),
        (status = 401, description = "Unauthorized", body = ErrorBody),
        (status = 404, description = "Entry not found", body = ErrorBody)
    ),
    security(
        ("session_token" = [])
    )
)]
pub async fn get_entry(
    State(state): State<Arc<AppState>>,
    AuthUser(owner_id): AuthUser,
    Path(id): Path<String>,
) -> Result<Json<EntryView>, ApiError> {
    let entry_id = parse_entry_id(&id)?;
    Ok(Json(state.entries().get(owner_id, entry_id).await?))
}

/// PUT /files/:id/publish - Make an entry public.
#[utoipa::path(
    put,
    path = "/files/{id}/publish",
    tag = "files",
    params(
        ("id" = i64, Path, description = "Entry ID")
    ),
    responses(
        (status = 200, description = "Updated entry", body = EntryView),
        (status = 401, description = "Unauthorized", body = ErrorBody),
        (status = 404, description = "Entry not found", body = ErrorBody)
    ),
    security(
        ("session_token" = [])
    )
)]
pub async fn publish_entry(
    State(state): State<Arc<AppState>>,
    AuthUser(owner_id): AuthUser,
    Path(id): Path<String>,
) -> Result<Json<EntryView>, ApiError> {
    let entry_id = parse_entry_id(&id)?;
    Ok(Json(state.entries().publish(owner_id, entry_id).await?))
}

/// PUT /files/:id/unpublish - Make an entry private.
#[utoipa::path(
    put,
    path = "/files/{id}/unpublish",
    tag = "files",
    params(
        ("id" = i64, Path, description = "Entry ID")
    ),
    responses(
        (status = 200, description = "Updated entry", body = EntryView),
        (status = 401, description = "Unauthorized", body = ErrorBody),
        (status = 404, description = "Entry not found", body = ErrorBody)
    ),
    security(
        ("session_token" = [])
    )
)]
pub async fn unpublish_entry(
    State(state): State<Arc<AppState>>,
    AuthUser(owner_id): AuthUser,
    Path(id): Path<String>,
) -> Result<Json<EntryView>, ApiError> {
    let entry_id = parse_entry_id(&id)?;
    Ok(Json(state.entries().unpublish(owner_id, entry_id).await?))
}

/// GET /files/:id/data - Fetch entry content.
///
/// Public entries are readable without a token.
#[utoipa::path(
    get,
    path = "/files/{id}/data",
    tag = "files",
    params(
        ("id" = i64, Path, description = "Entry ID"),
        ("size" = Option<u32>, Query, description = "Size variant, e.g. 500, 250 or 100")
    ),
    responses(
        (status = 200, description = "Entry content", content_type = "application/octet-stream"),
        (status = 400, description = "Entry is a folder", body = ErrorBody),
        (status = 404, description = "Entry or variant not found", body = ErrorBody)
    )
)]
pub async fn get_entry_data(
    State(state): State<Arc<AppState>>,
    OptionalAuthUser(caller): OptionalAuthUser,
    Path(id): Path<String>,
    Query(params): Query<ContentParams>,
) -> Result<Response<Body>, ApiError> {
    let entry_id = parse_entry_id(&id)?;
    let content = state
        .entries()
        .read_content(caller, entry_id, params.size.as_deref())
        .await?;

    Response::builder()
        .header(header::CONTENT_TYPE, content.content_type)
        .header(header::CONTENT_LENGTH, content.bytes.len())
        .body(Body::from(content.bytes))
        .map_err(|e| {
            tracing::error!("Failed to build response: {}", e);
            ApiError::internal("Failed to build response")
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::web::error::ErrorCode;

    #[test]
    fn test_parse_entry_id() {
        assert_eq!(parse_entry_id("12").unwrap(), 12);
        assert_eq!(parse_entry_id("0").unwrap_err().code(), ErrorCode::NotFound);
        assert_eq!(parse_entry_id("-3").unwrap_err().code(), ErrorCode::NotFound);
        assert_eq!(parse_entry_id("abc").unwrap_err().code(), ErrorCode::NotFound);
    }
}
