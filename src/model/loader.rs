use crate::error::InferenceError;
use ort::session::{builder::GraphOptimizationLevel, Session};
use std::path::Path;

/// Registers the process-wide ONNX Runtime environment. Call before the
/// first session is built.
pub fn init_ort() -> Result<(), InferenceError> {
    ort::init().with_name("flowernx").commit()?;
    Ok(())
}

/// Builds a session for the classifier file at `model_path`.
///
/// A missing file is reported as `ModelNotFound` before the runtime is
/// involved; anything the runtime cannot parse surfaces as `OrtError`.
pub fn load_model(
    model_path: impl AsRef<Path>,
    intra_threads: usize,
) -> Result<Session, InferenceError> {
    let path = model_path.as_ref();
    if !path.is_file() {
        return Err(InferenceError::ModelNotFound(path.display().to_string()));
    }

    let session = Session::builder()?
        .with_optimization_level(GraphOptimizationLevel::Level3)?
        .with_intra_threads(intra_threads)?
        .commit_from_file(path)?;

    let inputs: Vec<&str> = session.inputs.iter().map(|i| i.name.as_str()).collect();
    let outputs: Vec<&str> = session.outputs.iter().map(|o| o.name.as_str()).collect();
    tracing::info!(
        path = %path.display(),
        ?inputs,
        ?outputs,
        intra_threads,
        "loaded model"
    );

    Ok(session)
}
