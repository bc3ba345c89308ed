//! Success envelopes shared by every module.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;

/// A one-line confirmation for the user plus the affected record, the JSON
/// counterpart of redirect-with-flash.
#[derive(Debug, Serialize)]
pub struct Flash<T> {
    #[serde(skip)]
    status: StatusCode,
    pub flash: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
}

impl<T> Flash<T> {
    pub fn created(message: impl Into<String>, data: T) -> Self {
        Self {
            status: StatusCode::CREATED,
            flash: message.into(),
            data: Some(data),
        }
    }

    pub fn updated(message: impl Into<String>, data: T) -> Self {
        Self {
            status: StatusCode::OK,
            flash: message.into(),
            data: Some(data),
        }
    }
}

impl Flash<()> {
    /// Flash with no record, e.g. after a delete.
    pub fn message(message: impl Into<String>) -> Self {
        Self {
            status: StatusCode::OK,
            flash: message.into(),
            data: None,
        }
    }
}

impl<T: Serialize> IntoResponse for Flash<T> {
    fn into_response(self) -> Response {
        (self.status, Json(self)).into_response()
    }
}
