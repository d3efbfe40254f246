use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use bft_core::api::ParseError;
use thiserror::Error;

use super::models::{VerdictErrorBody, RUN_NOT_FOUND, SUITE_INPUT_INVALID};

#[derive(Debug, Error)]
pub enum HttpServerError {
    #[error("Could not get test data from request: {0}")]
    TestInput(#[source] ParseError),

    #[error("Could not get tests data from request: {0}")]
    SuiteInput(#[source] ParseError),

    #[error("RunId does not exist.")]
    RunNotFound,

    #[error("unauthorized")]
    Unauthorized,
}

impl IntoResponse for HttpServerError {
    fn into_response(self) -> Response {
        match self {
            HttpServerError::TestInput(ref err) => (
                StatusCode::BAD_REQUEST,
                Json(VerdictErrorBody::new(format!(
                    "Could not get test data from request: {err}"
                ))),
            )
                .into_response(),
            HttpServerError::SuiteInput(_) => (
                StatusCode::BAD_REQUEST,
                Json(VerdictErrorBody::new(SUITE_INPUT_INVALID)),
            )
                .into_response(),
            HttpServerError::RunNotFound => (
                StatusCode::NOT_FOUND,
                Json(VerdictErrorBody::new(RUN_NOT_FOUND)),
            )
                .into_response(),
            HttpServerError::Unauthorized => (
                StatusCode::UNAUTHORIZED,
                Json(serde_json::json!({ "error": "unauthorized" })),
            )
                .into_response(),
        }
    }
}
