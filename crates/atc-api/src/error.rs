use atc_core::{AtcError, ErrorBody};
use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use thiserror::Error;

/// Every variant renders as `{"error": <message>}`.
#[derive(Error, Debug)]
pub enum ApiError {
    #[error("Invalid JSON format in request body: {0}")]
    InvalidBody(String),

    #[error("{0}")]
    BadRequest(String),

    #[error("Method Not Allowed. This function only accepts POST requests.")]
    MethodNotAllowed,

    #[error("{0}")]
    Configuration(String),

    #[error("Failed to get explanation from AI: {0}")]
    Upstream(String),
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::MethodNotAllowed => StatusCode::METHOD_NOT_ALLOWED,
            // Undecodable bodies count as a failed invocation, like any other.
            ApiError::InvalidBody(_)
            | ApiError::Configuration(_)
            | ApiError::Upstream(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl From<anyhow::Error> for ApiError {
    fn from(err: anyhow::Error) -> Self {
        match err.downcast_ref::<AtcError>() {
            Some(AtcError::MissingCredential) => {
                ApiError::Configuration(AtcError::MissingCredential.to_string())
            }
            Some(AtcError::Config(msg)) => ApiError::Configuration(msg.clone()),
            _ => ApiError::Upstream(format!("{:#}", err)),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        let body = Json(ErrorBody {
            error: self.to_string(),
        });

        (status, body).into_response()
    }
}

pub type ApiResult<T> = Result<T, ApiError>;
