// handlers/public/login.rs - POST /login

use async_trait::async_trait;

use crate::auth::IssuedToken;
use crate::context::RequestContext;
use crate::database::DatabaseError;
use crate::dispatch::{FromPayload, Handler, Payload};
use crate::error::ApiError;

#[derive(Debug)]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
}

impl FromPayload for LoginRequest {
    fn from_payload(payload: &Payload) -> Result<Self, ApiError> {
        match (payload.require_str("username"), payload.require_str("password")) {
            (Ok(username), Ok(password)) => Ok(Self {
                username: username.to_string(),
                password: password.to_string(),
            }),
            _ => Err(ApiError::validation("username and password are required")),
        }
    }
}

/// POST /login - verify credentials and mint a bearer token
///
/// Input: `{"username": "...", "password": "..."}`
/// Output: `{"token": "<jwt>", "expires_at": "<rfc3339>"}`
///
/// Unknown user and wrong password fail identically with 401
/// "invalid credentials"; both paths run one Argon2 verification.
#[derive(Debug, Default)]
pub struct Login;

#[async_trait]
impl Handler for Login {
    const NAME: &'static str = "login";
    type Request = LoginRequest;
    type Output = IssuedToken;

    async fn handle(&self, ctx: &RequestContext, request: LoginRequest) -> Result<IssuedToken, ApiError> {
        let user = match ctx.users().get_by_username(&request.username).await {
            Ok(user) => Some(user),
            Err(DatabaseError::NotFound(_)) => None,
            Err(other) => return Err(other.into()),
        };

        let passwords = *ctx.app.passwords();
        let stored_hash = user.as_ref().map(|u| u.password.clone());
        let password = request.password;

        // Argon2 verification blocks; run it off the async workers
        let verified = tokio::task::spawn_blocking(move || match stored_hash {
            Some(hash) => passwords.verify(&password, &hash).unwrap_or_else(|e| {
                tracing::error!("Unusable password hash on record: {}", e);
                false
            }),
            None => passwords.verify_dummy(&password),
        })
        .await
        .map_err(|e| {
            tracing::error!("Password verification task failed: {}", e);
            ApiError::internal("An error occurred while processing your request")
        })?;

        let user = match (user, verified) {
            (Some(user), true) => user,
            _ => {
                tracing::warn!(username = %request.username, "login rejected");
                return Err(ApiError::invalid_credentials());
            }
        };

        let issued = ctx.app.tokens().issue(&user.username, &user.role)?;
        tracing::info!(username = %user.username, role = %user.role, "token issued");
        Ok(issued)
    }
}
