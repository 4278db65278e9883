use axum::{
    http::StatusCode,
    response::{IntoResponse, Json, Response},
};
use serde::Serialize;
use serde_json::Value;

use crate::error::ApiError;

/// Successful handler outcome on its way back to the transport
#[derive(Debug)]
pub struct Reply<T: Serialize>(pub T);

impl<T: Serialize> IntoResponse for Reply<T> {
    fn into_response(self) -> Response {
        let value = match serde_json::to_value(&self.0) {
            Ok(value) => value,
            Err(e) => {
                tracing::error!("Failed to serialize response data: {}", e);
                return ApiError::internal("Failed to serialize response data").into_response();
            }
        };

        // A null result is success without a body
        if value == Value::Null {
            return StatusCode::NO_CONTENT.into_response();
        }

        (StatusCode::OK, Json(value)).into_response()
    }
}
