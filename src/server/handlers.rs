use axum::{
    body::Bytes,
    extract::{multipart::MultipartRejection, Multipart, State},
    Json,
};
use metrics::{counter, histogram};
use std::sync::Arc;
use std::time::Instant;

use crate::error::InferenceError;
use crate::model::prediction::{argmax, round_confidence};
use crate::server::types::*;

/// Multipart field carrying the uploaded image.
pub const FILE_FIELD: &str = "file";

pub async fn health_check() -> &'static str {
    "OK"
}

pub async fn predict(
    State(state): State<Arc<AppState>>,
    multipart: Result<Multipart, MultipartRejection>,
) -> Result<Json<PredictResponse>, InferenceError> {
    let result = run_prediction(&state, multipart).await;

    let outcome = match &result {
        Ok(_) => "ok",
        Err(err) if err.is_client_error() => "client_error",
        Err(_) => "server_error",
    };
    counter!("predict_requests_total", "outcome" => outcome).increment(1);

    result.map(Json)
}

async fn run_prediction(
    state: &AppState,
    multipart: Result<Multipart, MultipartRejection>,
) -> Result<PredictResponse, InferenceError> {
    // 1. Read the whole upload
    let image_bytes = read_file_field(multipart?).await?;

    // 2. Decode, preprocess and classify off the async workers
    let start = Instant::now();
    let classifier = state.classifier.clone();
    let preprocess = state.preprocess;
    let scores = tokio::task::spawn_blocking(move || {
        let input_tensor = preprocess.process_bytes(&image_bytes)?;
        classifier.classify(input_tensor)
    })
    .await??;
    let duration = start.elapsed();
    histogram!("inference_duration_seconds").record(duration.as_secs_f64());

    // 3. Post-process
    let (index, confidence) = argmax(&scores).ok_or(InferenceError::EmptyOutput)?;
    let flower_name = state
        .labels
        .get(index)
        .ok_or(InferenceError::UnknownClass(index))?
        .to_string();

    tracing::debug!(
        index,
        flower = %flower_name,
        confidence,
        elapsed_ms = duration.as_secs_f64() * 1000.0,
        "prediction"
    );

    Ok(PredictResponse {
        predicted_class_index: index,
        flower_name,
        confidence: round_confidence(confidence),
    })
}

async fn read_file_field(mut multipart: Multipart) -> Result<Bytes, InferenceError> {
    while let Some(field) = multipart.next_field().await? {
        if field.name() == Some(FILE_FIELD) {
            return Ok(field.bytes().await?);
        }
    }
    Err(InferenceError::MissingField(FILE_FIELD))
}
