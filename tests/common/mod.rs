#![allow(dead_code)]

use std::sync::Arc;

use anyhow::Result;
use axum::{
    body::{to_bytes, Body},
    http::{header, Method, Request, StatusCode},
    Router,
};
use chrono::Duration;
use serde_json::Value;
use tower::ServiceExt;

use mdm_backend::auth::{PasswordService, TokenIssuer};
use mdm_backend::config::AppConfig;
use mdm_backend::context::AppContext;
use mdm_backend::database::{MemoryDeviceRepository, MemoryUserRepository};

pub const SECRET: &str = "integration-secret";
pub const USERNAME: &str = "alice";
pub const PASSWORD: &str = "correct-password";
pub const ROLE: &str = "admin";

/// In-process server backed by the in-memory repositories
pub struct TestApp {
    router: Router,
    pub ctx: AppContext,
}

impl TestApp {
    pub async fn new() -> Result<Self> {
        Self::with_config(|key| match key {
            "DATABASE_URL" => Some("postgres://unused@localhost/unused".to_string()),
            "JWT_SECRET" => Some(SECRET.to_string()),
            _ => None,
        })
        .await
    }

    pub async fn with_config<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let config = AppConfig::from_source(lookup)?;

        let users = MemoryUserRepository::new();
        let hash = PasswordService::new().hash(PASSWORD)?;
        users.insert(USERNAME, &hash, ROLE).await;

        let tokens = TokenIssuer::from_config(&config.security)?;
        let ctx = AppContext::new(Arc::new(MemoryDeviceRepository::new()), Arc::new(users), tokens);
        let router = mdm_backend::app(ctx.clone(), &config);

        Ok(Self { router, ctx })
    }

    /// Fire one request and decode the JSON body (Null when empty)
    pub async fn send(&self, method: Method, uri: &str, token: Option<&str>, body: Option<&str>) -> Result<(StatusCode, Value)> {
        let mut builder = Request::builder().method(method).uri(uri);
        if let Some(token) = token {
            builder = builder.header(header::AUTHORIZATION, format!("Bearer {}", token));
        }
        if body.is_some() {
            builder = builder.header(header::CONTENT_TYPE, "application/json");
        }
        let request = builder.body(Body::from(body.unwrap_or_default().to_string()))?;
        self.raw(request).await
    }

    /// Fire a prebuilt request
    pub async fn raw(&self, request: Request<Body>) -> Result<(StatusCode, Value)> {
        let response = self.router.clone().oneshot(request).await?;
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await?;
        let value = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes)?
        };
        Ok((status, value))
    }

    pub async fn get(&self, uri: &str, token: &str) -> Result<(StatusCode, Value)> {
        self.send(Method::GET, uri, Some(token), None).await
    }

    pub async fn post(&self, uri: &str, token: &str, body: &str) -> Result<(StatusCode, Value)> {
        self.send(Method::POST, uri, Some(token), Some(body)).await
    }

    pub async fn register(&self, device_id: &str) -> Result<(StatusCode, Value)> {
        let body = serde_json::json!({ "device_id": device_id }).to_string();
        self.send(Method::POST, "/devices/register", None, Some(&body)).await
    }

    /// Log in as the seeded user and return the bearer token
    pub async fn login(&self) -> Result<String> {
        let body = serde_json::json!({ "username": USERNAME, "password": PASSWORD }).to_string();
        let (status, value) = self.send(Method::POST, "/login", None, Some(&body)).await?;
        anyhow::ensure!(status == StatusCode::OK, "login failed with {}: {}", status, value);
        value["token"]
            .as_str()
            .map(str::to_string)
            .ok_or_else(|| anyhow::anyhow!("login response has no token: {}", value))
    }
}
