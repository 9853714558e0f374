//! Data Transfer Objects for the Web API.

pub mod json;
pub mod request;
pub mod response;

pub use json::ApiJson;
pub use request::*;
pub use response::*;
