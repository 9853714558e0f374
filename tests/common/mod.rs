//! Test helpers for Web API integration tests.

#![allow(dead_code)]

use std::sync::Arc;

use axum_test::{TestResponse, TestServer};
use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;
use serde_json::{json, Value};
use tempfile::TempDir;

use filevault::entry::BlobStore;
use filevault::session::{MemorySessionStore, SessionResolver};
use filevault::thumbnail::{ThumbnailQueue, ThumbnailReceiver};
use filevault::web::{create_router, AppState};
use filevault::Database;

/// Header carrying the session token.
pub const TOKEN: &str = "X-Token";

/// A router over an in-memory database and a temporary blob directory.
pub struct TestApp {
    pub server: TestServer,
    pub db: Database,
    pub blobs: BlobStore,
    pub sessions: Arc<MemorySessionStore>,
    pub receiver: ThumbnailReceiver,
    _temp_dir: TempDir,
}

impl TestApp {
    /// Create a test app with a roomy thumbnail queue.
    pub async fn new() -> Self {
        Self::with_queue_capacity(64).await
    }

    /// Create a test app whose thumbnail queue holds `capacity` jobs.
    pub async fn with_queue_capacity(capacity: usize) -> Self {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");
        let db = Database::open_in_memory()
            .await
            .expect("Failed to create test database");
        let blobs = BlobStore::new(temp_dir.path().join("files_manager"));
        let sessions = Arc::new(MemorySessionStore::new());
        let (queue, receiver) = ThumbnailQueue::bounded(capacity, 3);

        let resolver: Arc<dyn SessionResolver> = sessions.clone();
        let app_state = Arc::new(AppState::new(db.clone(), blobs.clone(), resolver, queue));
        let router = create_router(app_state, &[]);
        let server = TestServer::new(router).expect("Failed to create test server");

        Self {
            server,
            db,
            blobs,
            sessions,
            receiver,
            _temp_dir: temp_dir,
        }
    }

    /// Issue a session token for `user_id`.
    pub async fn login(&self, user_id: i64) -> String {
        self.sessions.issue(user_id).await
    }

    /// POST /files with `body`.
    pub async fn upload(&self, token: &str, body: Value) -> TestResponse {
        self.server
            .post("/files")
            .add_header(TOKEN, token)
            .json(&body)
            .await
    }

    /// Create a folder and return its projection.
    pub async fn create_folder(&self, token: &str, name: &str, parent_id: Option<i64>) -> Value {
        let mut body = json!({ "name": name, "type": "folder" });
        if let Some(parent_id) = parent_id {
            body["parentId"] = json!(parent_id);
        }
        let response = self.upload(token, body).await;
        response.assert_status(axum::http::StatusCode::CREATED);
        response.json::<Value>()
    }

    /// Create a file or image with `content` and return its projection.
    pub async fn create_file(
        &self,
        token: &str,
        name: &str,
        entry_type: &str,
        content: &[u8],
    ) -> Value {
        let response = self
            .upload(
                token,
                json!({ "name": name, "type": entry_type, "data": encode(content) }),
            )
            .await;
        response.assert_status(axum::http::StatusCode::CREATED);
        response.json::<Value>()
    }
}

/// Base64-encode content the way clients send it.
pub fn encode(content: &[u8]) -> String {
    BASE64.encode(content)
}

/// Entry ID from a projection.
pub fn id_of(entry: &Value) -> i64 {
    entry["id"].as_i64().expect("projection has an id")
}
