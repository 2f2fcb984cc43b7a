//! Error types for the board API.
//!
//! [`ApiError`] unifies all failure modes into a single enum that is
//! rendered as an `application/problem+json` body. The request path is
//! filled into `instance` by the [`attach_instance`] middleware, which
//! picks the [`ProblemDetails`] back out of the response extensions.

use axum::extract::Request;
use axum::extract::rejection::{JsonRejection, QueryRejection};
use axum::http::{StatusCode, header};
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};
use life_core::LifeError;
use life_types::GridError;
use serde::Serialize;

/// Media type of every error body.
pub const PROBLEM_JSON: &str = "application/problem+json";

/// Errors that can occur in the board API layer.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    /// The simulation core rejected or failed the operation.
    #[error(transparent)]
    Life(#[from] LifeError),

    /// The request body is not valid JSON for the endpoint.
    #[error("malformed request body: {0}")]
    MalformedBody(#[from] JsonRejection),

    /// A query parameter is missing, malformed, or out of range.
    #[error("{0}")]
    InvalidQuery(String),

    /// The path segment does not name any board.
    #[error("board with id '{0}' was not found")]
    UnknownBoard(String),
}

impl From<GridError> for ApiError {
    fn from(err: GridError) -> Self {
        Self::Life(LifeError::from(err))
    }
}

impl From<QueryRejection> for ApiError {
    fn from(err: QueryRejection) -> Self {
        Self::InvalidQuery(err.body_text())
    }
}

impl ApiError {
    /// HTTP status and problem title for this error.
    pub const fn status_and_title(&self) -> (StatusCode, &'static str) {
        match self {
            Self::MalformedBody(_)
            | Self::InvalidQuery(_)
            | Self::Life(LifeError::InvalidShape(_) | LifeError::InvalidArgument(_)) => {
                (StatusCode::BAD_REQUEST, "Invalid board state.")
            }
            Self::UnknownBoard(_) | Self::Life(LifeError::BoardNotFound(_)) => {
                (StatusCode::NOT_FOUND, "Board not found.")
            }
            Self::Life(LifeError::NoConvergence { .. }) => {
                (StatusCode::UNPROCESSABLE_ENTITY, "Final state not reached.")
            }
            Self::Life(LifeError::Conflict { .. }) => {
                (StatusCode::CONFLICT, "Board history conflict.")
            }
            Self::Life(LifeError::Cancelled { .. }) => {
                (StatusCode::SERVICE_UNAVAILABLE, "Service shutting down.")
            }
            Self::Life(LifeError::Storage(_) | LifeError::Internal(_)) => {
                (StatusCode::INTERNAL_SERVER_ERROR, "Unexpected error")
            }
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, title) = self.status_and_title();

        if status.is_server_error() {
            tracing::error!(error = %self, status = status.as_u16(), "Unexpected error");
        } else if status == StatusCode::CONFLICT {
            tracing::warn!(error = %self, "Rejected concurrent advancement");
        } else {
            tracing::debug!(error = %self, status = status.as_u16(), "Request rejected");
        }

        ProblemDetails {
            problem_type: "about:blank",
            title,
            status: status.as_u16(),
            detail: self.to_string(),
            instance: None,
        }
        .into_response()
    }
}

/// RFC 9457 problem body.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ProblemDetails {
    /// Problem type URI.
    #[serde(rename = "type")]
    pub problem_type: &'static str,
    /// Short, status-level summary.
    pub title: &'static str,
    /// HTTP status code.
    pub status: u16,
    /// Occurrence-specific explanation.
    pub detail: String,
    /// Request path that produced the problem.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub instance: Option<String>,
}

impl IntoResponse for ProblemDetails {
    fn into_response(self) -> Response {
        let status =
            StatusCode::from_u16(self.status).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
        let mut response = (
            status,
            [(header::CONTENT_TYPE, PROBLEM_JSON)],
            axum::Json(&self),
        )
            .into_response();
        response.extensions_mut().insert(self);
        response
    }
}

/// Fill `instance` of problem responses with the request path.
pub async fn attach_instance(request: Request, next: Next) -> Response {
    let path = request.uri().path().to_owned();
    let mut response = next.run(request).await;
    let Some(problem) = response.extensions_mut().remove::<ProblemDetails>() else {
        return response;
    };
    ProblemDetails {
        instance: Some(path),
        ..problem
    }
    .into_response()
}
