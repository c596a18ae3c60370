use std::sync::Arc;

use axum::{
    Router,
    body::Body,
    http::{Request, StatusCode, header},
};
use http_body_util::BodyExt;
use kbase::config::Config;
use kbase::state::SharedState;
use tower::ServiceExt;

const BOUNDARY: &str = "kbase-test-boundary";

async fn spawn_app() -> Router {
    let mut config = Config::default();
    config.general.database_path = "sqlite::memory:".to_string();
    config.uploads.root = std::env::temp_dir()
        .join(format!("kbase-test-{}", uuid::Uuid::new_v4()))
        .to_string_lossy()
        .into_owned();

    let state = Arc::new(
        SharedState::new(config)
            .await
            .expect("Failed to create app state"),
    );
    kbase::api::router(state)
}

async fn body_json(response: axum::response::Response) -> serde_json::Value {
    let body = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&body).unwrap()
}

async fn login_admin(app: &Router) -> String {
    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/api/auth/login")
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(
                    serde_json::json!({ "username": "admin", "password": "admin123" })
                        .to_string(),
                ))
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let cookie = response
        .headers()
        .get(header::SET_COOKIE)
        .expect("login should set a session cookie")
        .to_str()
        .unwrap();
    cookie.split(';').next().unwrap().to_string()
}

fn multipart_body(file_name: &str, bytes: &[u8]) -> Vec<u8> {
    let mut body = Vec::new();
    body.extend_from_slice(format!("--{BOUNDARY}\r\n").as_bytes());
    body.extend_from_slice(
        format!(
            "Content-Disposition: form-data; name=\"file\"; filename=\"{file_name}\"\r\n"
        )
        .as_bytes(),
    );
    body.extend_from_slice(b"Content-Type: application/octet-stream\r\n\r\n");
    body.extend_from_slice(bytes);
    body.extend_from_slice(format!("\r\n--{BOUNDARY}--\r\n").as_bytes());
    body
}

async fn upload(
    app: &Router,
    cookie: &str,
    category: &str,
    file_name: &str,
    bytes: &[u8],
) -> axum::response::Response {
    app.clone()
        .oneshot(
            Request::builder()
                .method("POST")
                .uri(format!("/api/uploads/{category}"))
                .header(header::COOKIE, cookie)
                .header(
                    header::CONTENT_TYPE,
                    format!("multipart/form-data; boundary={BOUNDARY}"),
                )
                .body(Body::from(multipart_body(file_name, bytes)))
                .unwrap(),
        )
        .await
        .unwrap()
}

#[tokio::test]
async fn upload_returns_a_usable_locator() {
    let app = spawn_app().await;
    let admin = login_admin(&app).await;

    let response = upload(&app, &admin, "avatars", "me.png", b"png-bytes").await;
    assert_eq!(response.status(), StatusCode::CREATED);

    let json = body_json(response).await;
    let locator = json["data"]["locator"].as_str().unwrap().to_string();
    assert!(locator.starts_with("avatars/"));
    assert!(locator.ends_with("_me.png"));

    // The locator is accepted as an avatar
    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .method("PUT")
                .uri("/api/profile")
                .header(header::COOKIE, &admin)
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(
                    serde_json::json!({ "avatar": locator }).to_string(),
                ))
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert_eq!(json["data"]["avatar"].as_str().unwrap(), locator);
}

#[tokio::test]
async fn unknown_categories_are_rejected() {
    let app = spawn_app().await;
    let admin = login_admin(&app).await;

    let response = upload(&app, &admin, "videos", "clip.mp4", b"data").await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn file_names_are_sanitized() {
    let app = spawn_app().await;
    let admin = login_admin(&app).await;

    let response = upload(&app, &admin, "images", "my report (final).pdf", b"data").await;
    assert_eq!(response.status(), StatusCode::CREATED);

    let json = body_json(response).await;
    let locator = json["data"]["locator"].as_str().unwrap();
    assert!(!locator.contains(' '));
    assert!(!locator.contains('('));
}

#[tokio::test]
async fn empty_uploads_are_rejected() {
    let app = spawn_app().await;
    let admin = login_admin(&app).await;

    let response = upload(&app, &admin, "images", "empty.bin", b"").await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}
