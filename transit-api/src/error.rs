use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use transit_booking::{FlowError, SubmissionError};
use transit_catalog::CatalogError;
use transit_core::CoreError;

#[derive(Debug)]
pub enum AppError {
    ValidationError(String),
    NotFoundError(String),
    ConflictError(String),
    /// The booking service failed; the request may be repeated.
    UpstreamError(String),
    UpstreamTimeout(String),
    ServiceUnavailable(String),
}

impl AppError {
    pub fn status(&self) -> StatusCode {
        match self {
            AppError::ValidationError(_) => StatusCode::BAD_REQUEST,
            AppError::NotFoundError(_) => StatusCode::NOT_FOUND,
            AppError::ConflictError(_) => StatusCode::CONFLICT,
            AppError::UpstreamError(_) => StatusCode::BAD_GATEWAY,
            AppError::UpstreamTimeout(_) => StatusCode::GATEWAY_TIMEOUT,
            AppError::ServiceUnavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
        }
    }

    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            AppError::UpstreamError(_) | AppError::UpstreamTimeout(_) | AppError::ServiceUnavailable(_)
        )
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();
        let retryable = self.is_retryable();
        if status.is_server_error() {
            tracing::warn!(%status, retryable, "Request failed: {:?}", self);
        }
        let error_message = match self {
            AppError::ValidationError(msg)
            | AppError::NotFoundError(msg)
            | AppError::ConflictError(msg)
            | AppError::UpstreamError(msg)
            | AppError::UpstreamTimeout(msg)
            | AppError::ServiceUnavailable(msg) => msg,
        };

        let body = Json(json!({
            "error": error_message,
            "retryable": retryable,
        }));

        (status, body).into_response()
    }
}

impl From<FlowError> for AppError {
    fn from(err: FlowError) -> Self {
        let msg = err.to_string();
        match err {
            FlowError::Validation(_) => AppError::ValidationError(msg),
            FlowError::UnknownVehicle(_) | FlowError::UnknownStop(_) => AppError::NotFoundError(msg),
            FlowError::WrongStep { .. } | FlowError::NotSubmitting => AppError::ConflictError(msg),
            FlowError::Submission(SubmissionError::InFlight) => AppError::ConflictError(msg),
            FlowError::Submission(SubmissionError::TimedOut(_)) => AppError::UpstreamTimeout(msg),
            FlowError::Submission(SubmissionError::Interrupted) => AppError::UpstreamError(msg),
            FlowError::Submission(SubmissionError::Backend(core)) => core.into(),
            FlowError::Catalog(catalog) => catalog.into(),
        }
    }
}

impl From<CoreError> for AppError {
    fn from(err: CoreError) -> Self {
        let msg = err.to_string();
        match err {
            CoreError::BackendUnavailable(_) => AppError::UpstreamError(msg),
            CoreError::ValidationError(_) | CoreError::Rejected(_) => AppError::ValidationError(msg),
            CoreError::UnknownStop(_) => AppError::NotFoundError(msg),
            CoreError::Catalog(catalog) => catalog.into(),
        }
    }
}

impl From<CatalogError> for AppError {
    fn from(err: CatalogError) -> Self {
        AppError::ServiceUnavailable(err.to_string())
    }
}
