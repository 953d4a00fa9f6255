mod common;

use axum::{
    body::Body,
    http::{Request, StatusCode},
};
use common::TestApp;
use radio_portal::{AppConfig, MockIdentityProvider, repository::Repository};
use serde_json::json;

fn registration(username: &str, email: &str) -> serde_json::Value {
    json!({ "username": username, "email": email, "password": "correct-horse" })
}

#[tokio::test]
async fn test_health_check() {
    let app = TestApp::new();
    let (status, _) = app.get("/health", None).await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn test_register_then_login() {
    let app = TestApp::new();

    let (status, body) = app
        .post("/auth/register", None, registration("night_owl", "Night.Owl@Station.FM"))
        .await;
    assert_eq!(status, StatusCode::CREATED, "{body}");
    assert_eq!(body["user"]["email"], "night.owl@station.fm");
    assert_eq!(body["user"]["account_type"], "reader");
    assert!(body["user"].get("password_hash").is_none());
    assert!(body["token"].as_str().is_some_and(|t| !t.is_empty()));

    let (status, body) = app
        .post(
            "/auth/login",
            None,
            json!({ "email": "NIGHT.OWL@station.fm", "password": "correct-horse" }),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    let token = body["token"].as_str().unwrap().to_string();

    let (status, me) = app.get("/me", Some(&token)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(me["username"], "night_owl");
}

#[tokio::test]
async fn test_register_duplicate_email_conflicts() {
    let app = TestApp::new();
    app.post("/auth/register", None, registration("first_dj", "dj@station.fm"))
        .await;
    let (status, body) = app
        .post("/auth/register", None, registration("second_dj", "DJ@station.fm"))
        .await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["error"]["code"], "conflict");
}

#[tokio::test]
async fn test_register_validation() {
    let app = TestApp::new();
    let (status, body) = app
        .post(
            "/auth/register",
            None,
            json!({ "username": "ok_name", "email": "dj@station.fm", "password": "short" }),
        )
        .await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(body["error"]["code"], "invalid_input");

    let (status, _) = app
        .post("/auth/register", None, registration("x", "dj@station.fm"))
        .await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
}

#[tokio::test]
async fn test_login_failures_are_uniform() {
    let app = TestApp::new();
    app.post("/auth/register", None, registration("host_1", "host@station.fm"))
        .await;
    // Seeded accounts have no password (external sign-in).
    app.reader("google_only").await;

    for (email, password) in [
        ("host@station.fm", "wrong-password"),
        ("nobody@station.fm", "correct-horse"),
        ("google_only@station.fm", "correct-horse"),
    ] {
        let (status, body) = app
            .post("/auth/login", None, json!({ "email": email, "password": password }))
            .await;
        assert_eq!(status, StatusCode::UNAUTHORIZED, "{email}");
        assert_eq!(body["error"]["code"], "unauthorized");
    }
}

#[tokio::test]
async fn test_google_login_creates_then_reuses_account() {
    let identity = MockIdentityProvider::new().with_google("google-token", "jazz.fan@gmail.com");
    let app = TestApp::with_identity(identity);

    let (status, first) = app
        .post("/auth/google", None, json!({ "id_token": "google-token" }))
        .await;
    assert_eq!(status, StatusCode::OK, "{first}");
    assert_eq!(first["user"]["auth_provider"], "google");
    assert_eq!(first["user"]["username"], "jazz_fan");

    let (_, second) = app
        .post("/auth/google", None, json!({ "id_token": "google-token" }))
        .await;
    assert_eq!(first["user"]["id"], second["user"]["id"]);

    let (status, _) = app
        .post("/auth/google", None, json!({ "id_token": "forged" }))
        .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_external_username_is_made_unique() {
    let identity = MockIdentityProvider::new().with_supabase("sb-token", "jazz_fan@example.org");
    let app = TestApp::with_identity(identity);
    app.reader("jazz_fan").await;

    let (status, body) = app
        .post("/auth/supabase", None, json!({ "access_token": "sb-token" }))
        .await;
    assert_eq!(status, StatusCode::OK, "{body}");
    assert_eq!(body["user"]["username"], "jazz_fan_1");
    assert_eq!(body["user"]["auth_provider"], "supabase");
}

#[tokio::test]
async fn test_supabase_unconfigured_is_unavailable() {
    let app = TestApp::new();
    let (status, body) = app
        .post("/auth/supabase", None, json!({ "access_token": "anything" }))
        .await;
    assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
    assert_eq!(body["error"]["code"], "unavailable");
}

#[tokio::test]
async fn test_protected_routes_require_session() {
    let app = TestApp::new();
    let (status, body) = app.get("/me", None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["error"]["code"], "unauthorized");

    let (status, _) = app.get("/me", Some("not-a-jwt")).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_deleted_account_loses_access() {
    let app = TestApp::new();
    let reader = app.reader("short_lived").await;
    assert!(app.repo.delete_user(reader.user.id).await.unwrap());

    let (status, _) = app.get("/me", Some(&reader.token)).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_local_header_bypass() {
    let app = TestApp::new();
    let reader = app.reader("local_dev").await;

    let request = Request::builder()
        .uri("/me")
        .header("x-user-id", reader.user.id.to_string())
        .body(Body::empty())
        .unwrap();
    let (status, body) = app.call(request).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["username"], "local_dev");
}

#[tokio::test]
async fn test_header_bypass_disabled_in_production() {
    let config = AppConfig {
        env: radio_portal::config::Env::Production,
        ..AppConfig::default()
    };
    let app = TestApp::with_config(config);
    let reader = app.reader("prod_user").await;

    let request = Request::builder()
        .uri("/me")
        .header("x-user-id", reader.user.id.to_string())
        .body(Body::empty())
        .unwrap();
    let (status, _) = app.call(request).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_update_profile_username_conflict() {
    let app = TestApp::new();
    app.reader("taken_name").await;
    let reader = app.reader("free_name").await;

    let (status, body) = app
        .put("/me", Some(&reader.token), json!({ "bio": "Late-night listener" }))
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["bio"], "Late-night listener");

    let (status, _) = app
        .put("/me", Some(&reader.token), json!({ "username": "taken_name" }))
        .await;
    assert_eq!(status, StatusCode::CONFLICT);
}

#[tokio::test]
async fn test_auth_routes_are_rate_limited() {
    let config = AppConfig {
        auth_rate_limit_max: 2,
        ..AppConfig::default()
    };
    let app = TestApp::with_config(config);
    let attempt = json!({ "email": "nobody@station.fm", "password": "whatever1" });

    for _ in 0..2 {
        let (status, _) = app.post("/auth/login", None, attempt.clone()).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
    }

    let request = Request::builder()
        .method("POST")
        .uri("/auth/login")
        .header("content-type", "application/json")
        .body(Body::from(attempt.to_string()))
        .unwrap();
    let response = tower::ServiceExt::oneshot(app.router.clone(), request)
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::TOO_MANY_REQUESTS);
    assert!(response.headers().contains_key("retry-after"));

    // Other routes are not throttled.
    let (status, _) = app.get("/health", None).await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn test_responses_carry_request_id() {
    let app = TestApp::new();
    let request = Request::builder().uri("/health").body(Body::empty()).unwrap();
    let response = tower::ServiceExt::oneshot(app.router.clone(), request)
        .await
        .unwrap();
    assert!(response.headers().contains_key("x-request-id"));
}
