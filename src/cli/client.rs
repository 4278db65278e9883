//! Thin HTTP client for the MDM backend, shared by the agent and login commands.

use std::time::Duration;

use reqwest::StatusCode;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::{json, Value};
use thiserror::Error;

use crate::database::models::Device;

#[derive(Debug, Error)]
pub enum ClientError {
    #[error("unauthorized: {0}")]
    Unauthorized(String),

    #[error("conflict: {0}")]
    Conflict(String),

    #[error("server returned {status}: {message}")]
    Api { status: StatusCode, message: String },

    #[error("transport error: {0}")]
    Transport(#[from] reqwest::Error),
}

/// Token as returned by `POST /login`
#[derive(Debug, Clone, Deserialize)]
pub struct LoginResponse {
    pub token: String,
    pub expires_at: String,
}

pub struct ApiClient {
    http: reqwest::Client,
    base_url: String,
    token: Option<String>,
}

impl ApiClient {
    pub fn new(base_url: &str) -> Result<Self, ClientError> {
        let http = reqwest::Client::builder().timeout(Duration::from_secs(10)).build()?;
        Ok(Self {
            http,
            base_url: base_url.trim_end_matches('/').to_string(),
            token: None,
        })
    }

    pub fn token(&self) -> Option<&str> {
        self.token.as_deref()
    }

    pub fn set_token(&mut self, token: impl Into<String>) {
        self.token = Some(token.into());
    }

    /// Exchange credentials for a token and keep it for later calls
    pub async fn login(&mut self, username: &str, password: &str) -> Result<LoginResponse, ClientError> {
        let response = self
            .http
            .post(self.url("/login"))
            .json(&json!({ "username": username, "password": password }))
            .send()
            .await?;
        let login: LoginResponse = decode(response).await?;
        self.token = Some(login.token.clone());
        Ok(login)
    }

    pub async fn register(&self, device_id: &str) -> Result<Device, ClientError> {
        let response = self
            .http
            .post(self.url("/devices/register"))
            .json(&json!({ "device_id": device_id }))
            .send()
            .await?;
        decode(response).await
    }

    pub async fn status(&self, device_id: &str) -> Result<Device, ClientError> {
        let request = self.http.get(self.url(&format!("/devices/{}/status", device_id)));
        decode(self.authorize(request).send().await?).await
    }

    pub async fn heartbeat(&self, device_id: &str) -> Result<Device, ClientError> {
        let request = self.http.post(self.url(&format!("/devices/{}/heartbeat", device_id)));
        decode(self.authorize(request).send().await?).await
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    fn authorize(&self, request: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        match &self.token {
            Some(token) => request.bearer_auth(token),
            None => request,
        }
    }
}

async fn decode<T: DeserializeOwned>(response: reqwest::Response) -> Result<T, ClientError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response.json::<T>().await?);
    }

    let body: Value = response.json().await.unwrap_or(Value::Null);
    let message = body
        .get("error")
        .and_then(Value::as_str)
        .unwrap_or_else(|| status.canonical_reason().unwrap_or("request failed"))
        .to_string();

    Err(match status {
        StatusCode::UNAUTHORIZED => ClientError::Unauthorized(message),
        StatusCode::CONFLICT => ClientError::Conflict(message),
        _ => ClientError::Api { status, message },
    })
}
