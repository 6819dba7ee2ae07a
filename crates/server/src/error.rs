use agentkpi_pipeline::PipelineError;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// JSON body returned for every failed request
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorBody {
    pub kind: String,
    pub error: String,
    pub hint: String,
}

/// Errors surfaced by the HTTP handlers
#[derive(Error, Debug)]
pub enum ApiError {
    #[error("Request body is empty")]
    EmptyBody,

    #[error(transparent)]
    Pipeline(#[from] PipelineError),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl ApiError {
    fn status(&self) -> StatusCode {
        match self {
            ApiError::EmptyBody => StatusCode::BAD_REQUEST,
            ApiError::Pipeline(_) => StatusCode::UNPROCESSABLE_ENTITY,
            ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn body(&self) -> ErrorBody {
        let (kind, hint) = match self {
            ApiError::EmptyBody => (
                "request".to_string(),
                "Send the xlsx workbook as the raw request body.".to_string(),
            ),
            ApiError::Pipeline(err) => (err.kind().as_str().to_string(), err.hint()),
            ApiError::Internal(_) => ("internal".to_string(), "Retry the request.".to_string()),
        };
        ErrorBody {
            kind,
            error: self.to_string(),
            hint,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        if let ApiError::Internal(msg) = &self {
            tracing::error!(error = %msg, "request failed");
        } else {
            tracing::warn!(error = %self, "rejected workbook");
        }
        (self.status(), Json(self.body())).into_response()
    }
}
