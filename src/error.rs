use axum::{
    extract::multipart::{MultipartError, MultipartRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use ndarray::ShapeError;
use serde_json::json;
use thiserror::Error;

/// Errors raised while serving a single prediction request.
#[derive(Error, Debug)]
pub enum InferenceError {
    #[error("Model not found at path: {0}")]
    ModelNotFound(String),

    #[error("Unsupported model: {0}")]
    InvalidModel(String),

    #[error("ONNX Runtime error: {0}")]
    OrtError(#[from] ort::Error),

    #[error("Invalid image file")]
    InvalidImage(#[from] image::ImageError),

    #[error("Missing form field: {0}")]
    MissingField(&'static str),

    #[error("Malformed multipart body: {0}")]
    Multipart(#[from] MultipartError),

    #[error("Rejected multipart request: {0}")]
    MultipartRejected(#[from] MultipartRejection),

    #[error("Shape error: {0}")]
    ShapeError(#[from] ShapeError),

    #[error("Model returned an empty output")]
    EmptyOutput,

    #[error("No label for class index {0}")]
    UnknownClass(usize),

    #[error("Inference session lock poisoned")]
    SessionPoisoned,

    #[error("Inference task failed: {0}")]
    TaskFailed(#[from] tokio::task::JoinError),
}

impl IntoResponse for InferenceError {
    fn into_response(self) -> Response {
        let (status, detail) = match &self {
            InferenceError::InvalidImage(_) => (StatusCode::BAD_REQUEST, self.to_string()),
            InferenceError::Multipart(err) => (client_status(err.status()), err.body_text()),
            InferenceError::MultipartRejected(rejection) => {
                (client_status(rejection.status()), rejection.body_text())
            }
            InferenceError::MissingField(_) => {
                (StatusCode::UNPROCESSABLE_ENTITY, self.to_string())
            }
            _ => {
                tracing::error!(error = %self, "prediction failed");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Internal server error".to_string(),
                )
            }
        };

        let body = Json(json!({
            "detail": detail
        }));

        (status, body).into_response()
    }
}

impl InferenceError {
    /// Whether the request itself was at fault.
    pub fn is_client_error(&self) -> bool {
        matches!(
            self,
            InferenceError::InvalidImage(_)
                | InferenceError::MissingField(_)
                | InferenceError::Multipart(_)
                | InferenceError::MultipartRejected(_)
        )
    }
}

// Body-parsing failures are always the client's; keep axum's 4xx when it has one
fn client_status(status: StatusCode) -> StatusCode {
    if status.is_client_error() {
        status
    } else {
        StatusCode::BAD_REQUEST
    }
}

/// Errors that abort process initialization.
#[derive(Error, Debug)]
pub enum StartupError {
    #[error("Failed to read config: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid config: {0}")]
    Config(#[from] serde_yaml::Error),

    #[error("Failed to load model: {0}")]
    Model(#[from] InferenceError),

    #[error("Failed to fetch labels: {0}")]
    LabelFetch(#[from] reqwest::Error),

    #[error("Failed to read label file {path}: {source}")]
    LabelFile {
        path: String,
        source: std::io::Error,
    },

    #[error("Expected {expected} names, got {got}")]
    LabelCountMismatch { expected: usize, got: usize },

    #[error("Model produces {outputs} scores but the label table has {labels} entries")]
    OutputMismatch { outputs: usize, labels: usize },

    #[error("Failed to install metrics recorder: {0}")]
    Metrics(#[from] metrics_exporter_prometheus::BuildError),
}
