//! Response bodies shared across handlers.

use axum::http::header::{CONTENT_DISPOSITION, CONTENT_TYPE};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use mutuelle_core::types::DbId;
use serde::Serialize;

use crate::documents::RenderedDocument;

/// `{ "message": ..., "id": ... }`, returned by claim writes.
#[derive(Debug, Serialize)]
pub struct MessageResponse {
    pub message: &'static str,
    pub id: DbId,
}

impl IntoResponse for RenderedDocument {
    fn into_response(self) -> Response {
        let disposition = format!("attachment; filename=\"{}\"", self.filename);
        (
            StatusCode::OK,
            [
                (CONTENT_TYPE, self.content_type.to_string()),
                (CONTENT_DISPOSITION, disposition),
            ],
            self.bytes,
        )
            .into_response()
    }
}
