//! Web API module for filevault.
//!
//! A thin HTTP shell over the entry service: request parsing, session
//! token extraction, error mapping and the OpenAPI document.

pub mod dto;
pub mod error;
pub mod handlers;
pub mod middleware;
pub mod router;
pub mod server;

pub use error::ApiError;
pub use handlers::AppState;
pub use router::{create_router, ApiDoc};
pub use server::WebServer;
