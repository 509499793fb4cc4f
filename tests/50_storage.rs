mod common;

use axum::http::StatusCode;
use common::{Part, TestApp, BUCKET};

#[tokio::test]
async fn upload_stores_object_and_returns_public_url() {
    let app = TestApp::new();
    let res = app
        .post_multipart(
            "/api/storage/upload",
            Some(&app.owner_token.clone()),
            &[
                Part::file("file", "my photo.png", "image/png", b"\x89PNG data"),
                Part::text("folder", "avatars"),
            ],
        )
        .await;

    assert_eq!(res.status, StatusCode::OK, "{}", res.text());
    let body = res.json();
    assert_eq!(body["success"], true);

    let path = body["path"].as_str().unwrap();
    assert!(path.starts_with("avatars/"), "{}", path);
    assert!(path.ends_with("-my_photo.png"), "{}", path);
    assert_eq!(body["url"], format!("http://storage.test/{}/{}", BUCKET, path));

    let stored = app.storage.object(BUCKET, path).await.expect("object stored");
    assert_eq!(stored.bytes, b"\x89PNG data");
    assert_eq!(stored.content_type, "image/png");

    let options = app.storage.bucket_options(BUCKET).await.expect("bucket created");
    assert!(options.public);
    assert_eq!(options.file_size_limit, common::FILE_SIZE_LIMIT);
}

#[tokio::test]
async fn default_folder_is_uploads() {
    let app = TestApp::new();
    let token = app.owner_token.clone();
    let res = app
        .post_multipart(
            "/api/storage/upload",
            Some(&token),
            &[Part::file("file", "a.txt", "text/plain", b"hi")],
        )
        .await;
    assert!(res.json()["path"].as_str().unwrap().starts_with("uploads/"));
}

#[tokio::test]
async fn same_name_twice_gets_distinct_keys() {
    let app = TestApp::new();
    let token = app.owner_token.clone();
    for _ in 0..2 {
        let res = app
            .post_multipart(
                "/api/storage/upload",
                Some(&token),
                &[Part::file("file", "a.txt", "text/plain", b"hi")],
            )
            .await;
        assert_eq!(res.status, StatusCode::OK);
    }
    assert_eq!(app.storage.object_keys(BUCKET).await.len(), 2);
}

#[tokio::test]
async fn missing_file_is_a_400() {
    let app = TestApp::new();
    let token = app.owner_token.clone();

    let res = app
        .post_multipart("/api/storage/upload", Some(&token), &[Part::text("folder", "x")])
        .await;
    assert_eq!(res.status, StatusCode::BAD_REQUEST);
    assert_eq!(res.json()["error"], "No file provided");

    // What a browser sends when the picker was left empty.
    let res = app
        .post_multipart(
            "/api/storage/upload",
            Some(&token),
            &[Part::file("file", "", "application/octet-stream", b"")],
        )
        .await;
    assert_eq!(res.json()["error"], "No file provided");
}

#[tokio::test]
async fn oversized_file_is_refused_before_storage() {
    let app = TestApp::new();
    let token = app.owner_token.clone();
    let big = vec![0u8; common::FILE_SIZE_LIMIT as usize + 1];
    let res = app
        .post_multipart(
            "/api/storage/upload",
            Some(&token),
            &[Part::file("file", "big.bin", "application/octet-stream", &big)],
        )
        .await;

    assert_eq!(res.status, StatusCode::PAYLOAD_TOO_LARGE);
    assert!(app.storage.bucket_options(BUCKET).await.is_none());
}

#[tokio::test]
async fn traversal_folders_are_rejected() {
    let app = TestApp::new();
    let token = app.owner_token.clone();
    let res = app
        .post_multipart(
            "/api/storage/upload",
            Some(&token),
            &[
                Part::file("file", "a.txt", "text/plain", b"hi"),
                Part::text("folder", "../secrets"),
            ],
        )
        .await;
    assert_eq!(res.status, StatusCode::BAD_REQUEST);
    assert!(app.storage.object_keys(BUCKET).await.is_empty());
}

#[tokio::test]
async fn non_multipart_body_is_a_400() {
    let app = TestApp::new();
    let res = app
        .owner_post("/api/storage/upload", &serde_json::json!({ "file": "x" }))
        .await;
    assert_eq!(res.status, StatusCode::BAD_REQUEST);
}
