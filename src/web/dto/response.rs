//! Response DTOs for the Web API.

use serde::Serialize;
use utoipa::ToSchema;

/// Health check response.
#[derive(Debug, Serialize, ToSchema)]
pub struct HealthResponse {
    /// Whether the metadata database answers.
    pub db: bool,
}
