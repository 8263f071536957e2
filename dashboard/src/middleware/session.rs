// ==============================================================================
// middleware/session.rs - Dashboard Session Extractor
// ==============================================================================
// Description: Extract the session id from the X-Dashboard-Session header
// Created: 2026-10-19
// Modified: 2026-10-19
// Version: 1.0.0
// ==============================================================================
//
// Every dashboard event (slider, plot click, disclosure button) carries the
// session id issued by POST /api/dashboard/sessions. A missing or malformed
// header is rejected with 400 Bad Request before the handler runs.
//
// ==============================================================================

use axum::{
    extract::FromRequestParts,
    http::{request::Parts, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use uuid::Uuid;

use crate::models::ErrorResponse;

pub const SESSION_HEADER: &str = "X-Dashboard-Session";

/// Session id taken from the request headers
///
/// # Example
/// ```rust,ignore
/// async fn my_handler(DashboardSession(id): DashboardSession) -> impl IntoResponse {
///     format!("session {}", id)
/// }
/// ```
#[derive(Debug, Clone, Copy)]
pub struct DashboardSession(pub Uuid);

impl<S> FromRequestParts<S> for DashboardSession
where
    S: Send + Sync,
{
    type Rejection = Response;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let session_id = parts
            .headers
            .get(SESSION_HEADER)
            .and_then(|value| value.to_str().ok())
            .and_then(|value| Uuid::parse_str(value.trim()).ok());

        match session_id {
            Some(id) => Ok(DashboardSession(id)),
            None => Err((
                StatusCode::BAD_REQUEST,
                Json(ErrorResponse::new(format!(
                    "Missing or invalid {} header",
                    SESSION_HEADER
                ))),
            )
                .into_response()),
        }
    }
}
