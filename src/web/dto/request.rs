//! Request DTOs for the Web API.

use serde::Deserialize;
use serde_json::Value;
use utoipa::ToSchema;

use crate::entry::{ListQuery, ParentRef, UploadRequest};

/// Entry creation request.
///
/// Every field is optional at the wire level so that missing fields are
/// reported with the upload validation messages.
#[derive(Debug, Default, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UploadBody {
    /// Entry name.
    #[serde(default)]
    pub name: Option<String>,
    /// One of `folder`, `file` or `image`.
    #[serde(default, rename = "type")]
    pub entry_type: Option<String>,
    /// Base64-encoded content; required unless the type is `folder`.
    #[serde(default)]
    pub data: Option<String>,
    /// Containing folder ID; `0` or absent for top level.
    #[serde(default)]
    #[schema(value_type = Option<i64>)]
    pub parent_id: Option<Value>,
    /// Public visibility (default false).
    #[serde(default)]
    pub is_public: Option<bool>,
}

/// Translate the wire `parentId` value, which may be a number or a string.
fn parent_ref(value: Option<&Value>) -> ParentRef {
    match value {
        None | Some(Value::Null) => ParentRef::Root,
        Some(Value::String(s)) => ParentRef::parse(Some(s.as_str())),
        Some(Value::Number(n)) => match n.as_i64() {
            Some(id) => ParentRef::parse(Some(id.to_string().as_str())),
            None => ParentRef::Invalid,
        },
        Some(_) => ParentRef::Invalid,
    }
}

impl From<UploadBody> for UploadRequest {
    fn from(body: UploadBody) -> Self {
        Self {
            parent: parent_ref(body.parent_id.as_ref()),
            name: body.name,
            entry_type: body.entry_type,
            data: body.data,
            is_public: body.is_public,
        }
    }
}

/// Listing query parameters.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListParams {
    #[serde(default)]
    pub parent_id: Option<String>,
    #[serde(default)]
    pub page: Option<String>,
}

impl ListParams {
    /// Build the listing query.
    pub fn to_query(&self) -> ListQuery {
        ListQuery::from_params(self.parent_id.as_deref(), self.page.as_deref())
    }
}

/// Content query parameters.
#[derive(Debug, Default, Deserialize)]
pub struct ContentParams {
    /// Size variant, e.g. `250`.
    #[serde(default)]
    pub size: Option<String>,
}
