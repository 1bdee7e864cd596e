//! Success response envelope.
//!
//! Every successful JSON response is wrapped as
//! `{"success": true, "data": ...}`; failures are produced by
//! [`crate::error::ApiError`] as `{"success": false, "message": "..."}`.

use axum::{
    Json,
    response::{IntoResponse, Response},
};
use serde::Serialize;

/// Standard success envelope around a response payload.
#[derive(Debug, Serialize)]
pub struct Envelope<T> {
    success: bool,
    data: T,
}

impl<T: Serialize> Envelope<T> {
    /// Wrap a payload in the success envelope.
    pub const fn new(data: T) -> Self {
        Self {
            success: true,
            data,
        }
    }
}

impl<T: Serialize> IntoResponse for Envelope<T> {
    fn into_response(self) -> Response {
        Json(self).into_response()
    }
}
