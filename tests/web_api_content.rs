//! Web API Content Tests
//!
//! Integration tests for content retrieval and visibility rules.

mod common;

use axum::http::StatusCode;
use common::{id_of, TestApp, TOKEN};
use filevault::entry::EntryRepository;
use serde_json::Value;

#[tokio::test]
async fn test_content_round_trip() {
    let app = TestApp::new().await;
    let token = app.login(1).await;
    let payload: Vec<u8> = (0u8..=255).cycle().take(4096).collect();

    let entry = app.create_file(&token, "blob.bin", "file", &payload).await;

    let response = app
        .server
        .get(&format!("/files/{}/data", id_of(&entry)))
        .add_header(TOKEN, token.as_str())
        .await;
    response.assert_status_ok();
    assert_eq!(response.as_bytes().as_ref(), payload.as_slice());
    assert_eq!(response.header("content-type"), "application/octet-stream");
}

#[tokio::test]
async fn test_text_content_type_has_charset() {
    let app = TestApp::new().await;
    let token = app.login(1).await;
    let entry = app
        .create_file(&token, "hello.txt", "file", b"Hello Webstack!\n")
        .await;

    let response = app
        .server
        .get(&format!("/files/{}/data", id_of(&entry)))
        .add_header(TOKEN, token.as_str())
        .await;
    response.assert_status_ok();
    assert_eq!(response.text(), "Hello Webstack!\n");
    assert_eq!(
        response.header("content-type"),
        "text/plain; charset=utf-8"
    );
}

#[tokio::test]
async fn test_folder_has_no_content() {
    let app = TestApp::new().await;
    let token = app.login(1).await;
    let folder = app.create_folder(&token, "Docs", None).await;

    let response = app
        .server
        .get(&format!("/files/{}/data", id_of(&folder)))
        .add_header(TOKEN, token.as_str())
        .await;
    response.assert_status(StatusCode::BAD_REQUEST);
    assert_eq!(
        response.json::<Value>()["error"]["message"],
        "A folder doesn't have a content"
    );

    let stored = EntryRepository::new(app.db.pool())
        .get_by_id(id_of(&folder))
        .await
        .unwrap()
        .unwrap();
    assert!(stored.content_id.is_none());
}

#[tokio::test]
async fn test_private_content_visibility() {
    let app = TestApp::new().await;
    let alice = app.login(1).await;
    let bob = app.login(2).await;
    let entry = app.create_file(&alice, "secret.txt", "file", b"s3cret").await;
    let path = format!("/files/{}/data", id_of(&entry));

    let response = app.server.get(&path).add_header(TOKEN, bob.as_str()).await;
    response.assert_status(StatusCode::NOT_FOUND);

    let response = app.server.get(&path).await;
    response.assert_status(StatusCode::NOT_FOUND);

    // An unknown token is an anonymous caller, not a 401.
    let response = app.server.get(&path).add_header(TOKEN, "stale-token").await;
    response.assert_status(StatusCode::NOT_FOUND);

    // Indistinguishable from an entry that does not exist.
    let missing = app.server.get("/files/9999/data").await;
    missing.assert_status(StatusCode::NOT_FOUND);
    assert_eq!(
        app.server.get(&path).await.json::<Value>(),
        missing.json::<Value>()
    );

    let response = app.server.get(&path).add_header(TOKEN, alice.as_str()).await;
    response.assert_status_ok();
    assert_eq!(response.text(), "s3cret");
}

#[tokio::test]
async fn test_public_content_readable_by_anyone() {
    let app = TestApp::new().await;
    let alice = app.login(1).await;
    let bob = app.login(2).await;
    let entry = app.create_file(&alice, "open.txt", "file", b"open").await;
    let id = id_of(&entry);

    app.server
        .put(&format!("/files/{id}/publish"))
        .add_header(TOKEN, alice.as_str())
        .await
        .assert_status_ok();

    let path = format!("/files/{id}/data");
    for response in [
        app.server.get(&path).await,
        app.server.get(&path).add_header(TOKEN, bob.as_str()).await,
        app.server.get(&path).add_header(TOKEN, "stale-token").await,
    ] {
        response.assert_status_ok();
        assert_eq!(response.text(), "open");
    }

    // Bob can read it but it is still not his entry.
    app.server
        .get(&format!("/files/{id}"))
        .add_header(TOKEN, bob.as_str())
        .await
        .assert_status(StatusCode::NOT_FOUND);

    app.server
        .put(&format!("/files/{id}/unpublish"))
        .add_header(TOKEN, alice.as_str())
        .await
        .assert_status_ok();
    app.server
        .get(&path)
        .await
        .assert_status(StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_size_variant() {
    let app = TestApp::new().await;
    let token = app.login(1).await;
    let image = app.create_file(&token, "photo.jpg", "image", b"full size").await;
    let id = id_of(&image);
    let path = format!("/files/{id}/data");

    app.server
        .get(&path)
        .add_header(TOKEN, token.as_str())
        .add_query_param("size", "250")
        .await
        .assert_status(StatusCode::NOT_FOUND);

    // Simulate the external worker writing a variant.
    let stored = EntryRepository::new(app.db.pool())
        .get_by_id(id)
        .await
        .unwrap()
        .unwrap();
    let content_id = stored.content_id.unwrap();
    std::fs::write(app.blobs.variant_path(&content_id, 250), b"small").unwrap();

    let response = app
        .server
        .get(&path)
        .add_header(TOKEN, token.as_str())
        .add_query_param("size", "250")
        .await;
    response.assert_status_ok();
    assert_eq!(response.text(), "small");
    assert_eq!(response.header("content-type"), "image/jpeg");

    // An empty size selects the primary content.
    let response = app
        .server
        .get(&path)
        .add_header(TOKEN, token.as_str())
        .add_query_param("size", "")
        .await;
    response.assert_status_ok();
    assert_eq!(response.text(), "full size");
}

#[tokio::test]
async fn test_size_cannot_escape_storage_root() {
    let app = TestApp::new().await;
    let token = app.login(1).await;
    let image = app.create_file(&token, "photo.png", "image", b"img").await;

    for size in ["../../etc/passwd", "abc", "-1", "1.5"] {
        app.server
            .get(&format!("/files/{}/data", id_of(&image)))
            .add_header(TOKEN, token.as_str())
            .add_query_param("size", size)
            .await
            .assert_status(StatusCode::NOT_FOUND);
    }
}
