mod common;

use anyhow::Result;
use axum::http::{Method, StatusCode};
use chrono::Duration;
use serde_json::json;

use common::{TestApp, PASSWORD, ROLE, SECRET, USERNAME};
use mdm_backend::auth::TokenIssuer;

#[tokio::test]
async fn protected_routes_require_a_token() -> Result<()> {
    let app = TestApp::new().await?;
    app.register("dev-1").await?;

    for (method, uri) in [
        (Method::GET, "/devices"),
        (Method::GET, "/devices/dev-1/status"),
        (Method::POST, "/devices/dev-1/heartbeat"),
        (Method::POST, "/devices/dev-1/camera"),
    ] {
        let (status, body) = app.send(method, uri, None, None).await?;
        assert_eq!(status, StatusCode::UNAUTHORIZED, "{}", uri);
        assert_eq!(body["code"], "UNAUTHORIZED");
    }
    Ok(())
}

#[tokio::test]
async fn malformed_header_is_rejected() -> Result<()> {
    let app = TestApp::new().await?;
    let request_with = |value: &'static str| {
        axum::http::Request::builder()
            .uri("/devices")
            .header(axum::http::header::AUTHORIZATION, value)
            .body(axum::body::Body::empty())
    };

    for value in ["Basic abc", "Bearer", "Bearer    "] {
        let (status, _) = app.raw(request_with(value)?).await?;
        assert_eq!(status, StatusCode::UNAUTHORIZED, "{}", value);
    }
    Ok(())
}

#[tokio::test]
async fn token_signed_with_another_secret_is_rejected() -> Result<()> {
    let app = TestApp::new().await?;
    let forged = TokenIssuer::new("some-other-secret", Duration::hours(1))?.issue(USERNAME, ROLE)?;

    let (status, body) = app.get("/devices", &forged.token).await?;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["error"], "Invalid token");
    Ok(())
}

#[tokio::test]
async fn expired_token_is_rejected() -> Result<()> {
    let app = TestApp::new().await?;
    let expired = TokenIssuer::new(SECRET, Duration::hours(-1))?.issue(USERNAME, ROLE)?;

    let (status, _) = app.get("/devices", &expired.token).await?;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    Ok(())
}

#[tokio::test]
async fn login_returns_token_that_opens_protected_routes() -> Result<()> {
    let app = TestApp::new().await?;
    let body = json!({ "username": USERNAME, "password": PASSWORD }).to_string();

    let (status, login) = app.send(Method::POST, "/login", None, Some(&body)).await?;
    assert_eq!(status, StatusCode::OK);
    assert!(login["expires_at"].is_string());

    let token = login["token"].as_str().expect("token");
    let claims = app.ctx.tokens().verify(token)?;
    assert_eq!(claims.username, USERNAME);
    assert_eq!(claims.role, ROLE);

    let (status, devices) = app.get("/devices", token).await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(devices, json!([]));
    Ok(())
}

#[tokio::test]
async fn bad_credentials_share_one_answer() -> Result<()> {
    let app = TestApp::new().await?;

    let wrong_password = json!({ "username": USERNAME, "password": "nope" }).to_string();
    let unknown_user = json!({ "username": "mallory", "password": "nope" }).to_string();

    let (status_a, body_a) = app.send(Method::POST, "/login", None, Some(&wrong_password)).await?;
    let (status_b, body_b) = app.send(Method::POST, "/login", None, Some(&unknown_user)).await?;

    assert_eq!(status_a, StatusCode::UNAUTHORIZED);
    assert_eq!(status_b, StatusCode::UNAUTHORIZED);
    assert_eq!(body_a, body_b);
    assert_eq!(body_a["error"], "invalid credentials");
    Ok(())
}

#[tokio::test]
async fn login_requires_both_fields() -> Result<()> {
    let app = TestApp::new().await?;

    let (status, body) = app
        .send(Method::POST, "/login", None, Some(r#"{"username": "alice"}"#))
        .await?;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], "VALIDATION_ERROR");
    Ok(())
}

#[tokio::test]
async fn oversized_body_is_rejected() -> Result<()> {
    let app = TestApp::with_config(|key| match key {
        "DATABASE_URL" => Some("postgres://unused@localhost/unused".to_string()),
        "JWT_SECRET" => Some(SECRET.to_string()),
        "API_MAX_REQUEST_SIZE_BYTES" => Some("64".to_string()),
        _ => None,
    })
    .await?;

    let padding = "x".repeat(256);
    let body = json!({ "device_id": "dev-1", "padding": padding }).to_string();
    let (status, error) = app.send(Method::POST, "/devices/register", None, Some(&body)).await?;
    assert_eq!(status, StatusCode::PAYLOAD_TOO_LARGE);
    assert_eq!(error["code"], "PAYLOAD_TOO_LARGE");
    Ok(())
}
