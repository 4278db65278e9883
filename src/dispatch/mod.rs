//! Transport-to-handler adapter.
//!
//! Decodes the raw body into a `Payload`, merges the `{id}` path segment,
//! lets the handler's request type validate it, runs exactly one domain
//! handler, and turns the outcome into a response. This is the only place
//! where an `ApiError` kind becomes a status code.

use async_trait::async_trait;
use axum::{
    body::Bytes,
    extract::{rejection::BytesRejection, Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    Extension,
};
use serde::Serialize;
use tracing::Instrument;

use crate::context::{AppContext, RequestContext};
use crate::error::ApiError;
use crate::middleware::AuthUser;

pub mod payload;
pub mod reply;

pub use payload::{FromPayload, Payload, PATH_ID_KEY};
pub use reply::Reply;

/// One domain capability: a typed request in, a serializable result out
#[async_trait]
pub trait Handler: Default + Send + Sync + 'static {
    const NAME: &'static str;

    type Request: FromPayload + Send;
    type Output: Serialize + Send;

    async fn handle(&self, ctx: &RequestContext, request: Self::Request) -> Result<Self::Output, ApiError>;
}

/// Run `handler` against a raw body and optional path id
pub async fn dispatch<H: Handler>(
    handler: &H,
    ctx: &RequestContext,
    path_id: Option<String>,
    body: &[u8],
) -> Result<Reply<H::Output>, ApiError> {
    let mut payload = Payload::parse(body)?;
    if let Some(id) = path_id {
        payload = payload.with_path_param(PATH_ID_KEY, id);
    }

    let request = H::Request::from_payload(&payload)?;
    handler.handle(ctx, request).await.map(Reply)
}

/// Axum entry point shared by every route: `post(serve::<RegisterDevice>)`
pub async fn serve<H: Handler>(
    State(app): State<AppContext>,
    caller: Option<Extension<AuthUser>>,
    path: Option<Path<String>>,
    body: Result<Bytes, BytesRejection>,
) -> Response {
    let caller = caller.map(|Extension(user)| user);
    let ctx = RequestContext::new(app, caller);
    let span = tracing::info_span!(
        "dispatch",
        handler = H::NAME,
        request_id = %ctx.request_id,
        caller = ctx.caller.as_ref().map(|c| c.username.as_str()).unwrap_or("-"),
    );

    async move {
        let body = match body {
            Ok(body) => body,
            Err(rejection) => return error_response(body_rejection(rejection)),
        };

        let handler = H::default();
        match dispatch(&handler, &ctx, path.map(|Path(id)| id), &body).await {
            Ok(reply) => reply.into_response(),
            Err(err) => error_response(err),
        }
    }
    .instrument(span)
    .await
}

fn body_rejection(rejection: BytesRejection) -> ApiError {
    if rejection.status() == StatusCode::PAYLOAD_TOO_LARGE {
        ApiError::payload_too_large("request body too large")
    } else {
        ApiError::invalid_json(rejection.body_text())
    }
}

fn error_response(err: ApiError) -> Response {
    if err.status_code().is_server_error() {
        tracing::error!(code = err.error_code(), "Handler error: {}", err);
    } else {
        tracing::warn!(code = err.error_code(), "Handler error: {}", err);
    }
    err.into_response()
}
