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

/// Log in and return the session cookie to attach to later requests.
async fn login(app: &Router, username: &str, password: &str) -> String {
    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/api/auth/login")
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(
                    serde_json::json!({ "username": username, "password": password })
                        .to_string(),
                ))
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK, "login should succeed");

    let cookie = response
        .headers()
        .get(header::SET_COOKIE)
        .expect("login should set a session cookie")
        .to_str()
        .unwrap();
    cookie.split(';').next().unwrap().to_string()
}

async fn get(app: &Router, cookie: &str, uri: &str) -> axum::response::Response {
    app.clone()
        .oneshot(
            Request::builder()
                .uri(uri)
                .header(header::COOKIE, cookie)
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap()
}

async fn send_json(
    app: &Router,
    cookie: &str,
    method: &str,
    uri: &str,
    json: serde_json::Value,
) -> axum::response::Response {
    app.clone()
        .oneshot(
            Request::builder()
                .method(method)
                .uri(uri)
                .header(header::COOKIE, cookie)
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(json.to_string()))
                .unwrap(),
        )
        .await
        .unwrap()
}

async fn create_user(app: &Router, admin_cookie: &str, username: &str, role: &str) {
    let response = send_json(
        app,
        admin_cookie,
        "POST",
        "/api/users",
        serde_json::json!({
            "username": username,
            "password": "secret123",
            "role": role,
        }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::CREATED);
}

#[tokio::test]
async fn protected_routes_require_a_session() {
    let app = spawn_app().await;

    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .uri("/api/articles")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn login_rejects_bad_credentials() {
    let app = spawn_app().await;

    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/api/auth/login")
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(
                    serde_json::json!({ "username": "admin", "password": "wrong" }).to_string(),
                ))
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

    // Unknown users get the same response as wrong passwords
    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/api/auth/login")
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(
                    serde_json::json!({ "username": "ghost", "password": "wrong" }).to_string(),
                ))
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn seeded_admin_must_change_password() {
    let app = spawn_app().await;
    let cookie = login(&app, "admin", "admin123").await;

    let response = get(&app, &cookie, "/api/auth/me").await;
    assert_eq!(response.status(), StatusCode::OK);

    let json = body_json(response).await;
    assert_eq!(json["data"]["username"], "admin");
    assert_eq!(json["data"]["role"], "admin");
    assert_eq!(json["data"]["must_change_password"], true);
}

#[tokio::test]
async fn only_admins_can_manage_users() {
    let app = spawn_app().await;
    let admin = login(&app, "admin", "admin123").await;
    create_user(&app, &admin, "alice", "user").await;

    let alice = login(&app, "alice", "secret123").await;

    let response = send_json(
        &app,
        &alice,
        "POST",
        "/api/users",
        serde_json::json!({ "username": "eve", "password": "x", "role": "user" }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);

    let response = get(&app, &alice, "/api/users").await;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);

    let response = get(&app, &admin, "/api/users").await;
    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn duplicate_usernames_conflict() {
    let app = spawn_app().await;
    let admin = login(&app, "admin", "admin123").await;
    create_user(&app, &admin, "alice", "user").await;

    let response = send_json(
        &app,
        &admin,
        "POST",
        "/api/users",
        serde_json::json!({ "username": "alice", "password": "other", "role": "user" }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::CONFLICT);
}

#[tokio::test]
async fn change_password_verifies_current_and_confirmation() {
    let app = spawn_app().await;
    let admin = login(&app, "admin", "admin123").await;
    create_user(&app, &admin, "alice", "user").await;
    let alice = login(&app, "alice", "secret123").await;

    // Blank current password is a missing field, not a failed verification
    let response = send_json(
        &app,
        &alice,
        "PUT",
        "/api/auth/password",
        serde_json::json!({
            "current_password": "",
            "new_password": "newpass456",
            "confirm_password": "newpass456",
        }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let json = body_json(response).await;
    assert_eq!(json["error"], "All password fields are required");

    // Wrong current password
    let response = send_json(
        &app,
        &alice,
        "PUT",
        "/api/auth/password",
        serde_json::json!({
            "current_password": "nope",
            "new_password": "newpass456",
            "confirm_password": "newpass456",
        }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    // Mismatched confirmation
    let response = send_json(
        &app,
        &alice,
        "PUT",
        "/api/auth/password",
        serde_json::json!({
            "current_password": "secret123",
            "new_password": "newpass456",
            "confirm_password": "different",
        }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    // Correct flow, then the new password logs in
    let response = send_json(
        &app,
        &alice,
        "PUT",
        "/api/auth/password",
        serde_json::json!({
            "current_password": "secret123",
            "new_password": "newpass456",
            "confirm_password": "newpass456",
        }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);

    login(&app, "alice", "newpass456").await;
}

#[tokio::test]
async fn article_lifecycle() {
    let app = spawn_app().await;
    let admin = login(&app, "admin", "admin123").await;

    let response = send_json(
        &app,
        &admin,
        "POST",
        "/api/articles",
        serde_json::json!({ "title": "Rust tips", "content": "Prefer iterators over index loops." }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::CREATED);
    let json = body_json(response).await;
    let id = json["data"]["id"].as_i64().unwrap();
    assert_eq!(json["data"]["author"], "admin");

    let response = get(&app, &admin, &format!("/api/articles/{id}")).await;
    assert_eq!(response.status(), StatusCode::OK);

    let response = send_json(
        &app,
        &admin,
        "PUT",
        &format!("/api/articles/{id}"),
        serde_json::json!({ "title": "Rust tips, revised", "content": "Prefer iterators." }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert_eq!(json["data"]["title"], "Rust tips, revised");
    assert!(json["data"]["updated_at"].is_string());

    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .method("DELETE")
                .uri(format!("/api/articles/{id}"))
                .header(header::COOKIE, &admin)
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NO_CONTENT);

    let response = get(&app, &admin, &format!("/api/articles/{id}")).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn articles_require_title_and_content() {
    let app = spawn_app().await;
    let admin = login(&app, "admin", "admin123").await;

    let response = send_json(
        &app,
        &admin,
        "POST",
        "/api/articles",
        serde_json::json!({ "title": "  ", "content": "body" }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn liking_twice_counts_once() {
    let app = spawn_app().await;
    let admin = login(&app, "admin", "admin123").await;

    let response = send_json(
        &app,
        &admin,
        "POST",
        "/api/articles",
        serde_json::json!({ "title": "Likeable", "content": "Something worth liking." }),
    )
    .await;
    let id = body_json(response).await["data"]["id"].as_i64().unwrap();

    let response = send_json(
        &app,
        &admin,
        "POST",
        &format!("/api/articles/{id}/like"),
        serde_json::json!({}),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert_eq!(json["data"]["likes"], 1);
    assert_eq!(json["data"]["liked"], true);

    let response = send_json(
        &app,
        &admin,
        "POST",
        &format!("/api/articles/{id}/like"),
        serde_json::json!({}),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert_eq!(json["data"]["likes"], 1);
    assert_eq!(json["data"]["liked"], false);
}

#[tokio::test]
async fn regular_users_only_manage_their_own_articles() {
    let app = spawn_app().await;
    let admin = login(&app, "admin", "admin123").await;
    create_user(&app, &admin, "alice", "user").await;
    create_user(&app, &admin, "bob", "user").await;
    create_user(&app, &admin, "erin", "editor").await;

    let alice = login(&app, "alice", "secret123").await;
    let bob = login(&app, "bob", "secret123").await;
    let erin = login(&app, "erin", "secret123").await;

    let response = send_json(
        &app,
        &alice,
        "POST",
        "/api/articles",
        serde_json::json!({ "title": "Alice's notes", "content": "Alpha." }),
    )
    .await;
    let id = body_json(response).await["data"]["id"].as_i64().unwrap();

    send_json(
        &app,
        &bob,
        "POST",
        "/api/articles",
        serde_json::json!({ "title": "Bob's notes", "content": "Beta." }),
    )
    .await;

    // Bob cannot edit Alice's article
    let response = send_json(
        &app,
        &bob,
        "PUT",
        &format!("/api/articles/{id}"),
        serde_json::json!({ "title": "Hijacked", "content": "Nope." }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);

    // The management view is scoped for regular users
    let response = get(&app, &alice, "/api/articles/mine").await;
    let json = body_json(response).await;
    assert_eq!(json["data"].as_array().unwrap().len(), 1);

    // Editors see everything and can edit anything
    let response = get(&app, &erin, "/api/articles/mine").await;
    let json = body_json(response).await;
    assert_eq!(json["data"].as_array().unwrap().len(), 2);

    let response = send_json(
        &app,
        &erin,
        "PUT",
        &format!("/api/articles/{id}"),
        serde_json::json!({ "title": "Alice's notes, edited", "content": "Alpha." }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn comments_append_in_order() {
    let app = spawn_app().await;
    let admin = login(&app, "admin", "admin123").await;

    let response = send_json(
        &app,
        &admin,
        "POST",
        "/api/articles",
        serde_json::json!({ "title": "Discussion", "content": "Comment below." }),
    )
    .await;
    let id = body_json(response).await["data"]["id"].as_i64().unwrap();

    for text in ["first", "second"] {
        let response = send_json(
            &app,
            &admin,
            "POST",
            &format!("/api/articles/{id}/comments"),
            serde_json::json!({ "comment": text }),
        )
        .await;
        assert_eq!(response.status(), StatusCode::CREATED);
    }

    let response = send_json(
        &app,
        &admin,
        "POST",
        &format!("/api/articles/{id}/comments"),
        serde_json::json!({ "comment": "   " }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let response = get(&app, &admin, &format!("/api/articles/{id}/comments")).await;
    let json = body_json(response).await;
    let comments = json["data"].as_array().unwrap();
    assert_eq!(comments.len(), 2);
    assert_eq!(comments[0]["comment"], "first");
    assert_eq!(comments[1]["comment"], "second");
}

#[tokio::test]
async fn search_ranks_matches_and_summarizes() {
    let app = spawn_app().await;
    let admin = login(&app, "admin", "admin123").await;

    for (title, content) in [
        (
            "Gardening basics",
            "Tomatoes need consistent watering and plenty of sunlight to thrive in summer.",
        ),
        (
            "Rust ownership",
            "Ownership and borrowing are the foundation of memory safety in the Rust language.",
        ),
        (
            "Sourdough starter",
            "Feed the starter twice a day and keep it warm until it doubles reliably.",
        ),
    ] {
        send_json(
            &app,
            &admin,
            "POST",
            "/api/articles",
            serde_json::json!({ "title": title, "content": content }),
        )
        .await;
    }

    let response = get(&app, &admin, "/api/articles?q=rust%20ownership").await;
    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;

    let articles = json["data"]["articles"].as_array().unwrap();
    assert_eq!(articles.len(), 3);
    assert_eq!(articles[0]["title"], "Rust ownership");
    assert!(articles[0]["score"].as_f64().unwrap() > articles[1]["score"].as_f64().unwrap());
    assert!(json["data"]["summary"].is_string());

    // Without a query the listing is in insertion order with no summary
    let response = get(&app, &admin, "/api/articles").await;
    let json = body_json(response).await;
    let articles = json["data"]["articles"].as_array().unwrap();
    assert_eq!(articles[0]["title"], "Gardening basics");
    assert!(json["data"]["summary"].is_null());
}

#[tokio::test]
async fn admin_can_reset_passwords() {
    let app = spawn_app().await;
    let admin = login(&app, "admin", "admin123").await;
    create_user(&app, &admin, "alice", "user").await;

    let response = send_json(
        &app,
        &admin,
        "PUT",
        "/api/users/alice/password",
        serde_json::json!({ "new_password": "reset789", "confirm_password": "reset789" }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);

    login(&app, "alice", "reset789").await;

    let response = send_json(
        &app,
        &admin,
        "PUT",
        "/api/users/ghost/password",
        serde_json::json!({ "new_password": "x12345", "confirm_password": "x12345" }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn profile_roundtrip() {
    let app = spawn_app().await;
    let admin = login(&app, "admin", "admin123").await;

    let response = send_json(
        &app,
        &admin,
        "PUT",
        "/api/profile",
        serde_json::json!({ "display_name": "Site Admin", "bio": "Keeper of the base" }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);

    let response = get(&app, &admin, "/api/profile").await;
    let json = body_json(response).await;
    assert_eq!(json["data"]["display_name"], "Site Admin");
    assert_eq!(json["data"]["bio"], "Keeper of the base");

    // A locator that was never uploaded is rejected
    let response = send_json(
        &app,
        &admin,
        "PUT",
        "/api/profile",
        serde_json::json!({ "avatar": "avatars/123_missing.png" }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn logout_ends_the_session() {
    let app = spawn_app().await;
    let admin = login(&app, "admin", "admin123").await;

    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/api/auth/logout")
                .header(header::COOKIE, &admin)
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let response = get(&app, &admin, "/api/auth/me").await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}
