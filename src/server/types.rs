use crate::error::{InferenceError, StartupError};
use crate::labels::{LabelProvider, LabelTable};
use crate::model::Classifier;
use crate::preprocessing::PreprocessConfig;
use ndarray::Array4;
use serde::Serialize;
use std::sync::Arc;

/// Shared Application State
///
/// Built once by [`AppState::initialize`] before the listener is bound and
/// never mutated afterwards. Reloading either part requires a restart.
#[derive(Clone)]
pub struct AppState {
    pub classifier: Arc<dyn Classifier>,
    pub labels: Arc<LabelTable>,
    pub preprocess: PreprocessConfig,
}

impl AppState {
    /// Loads the label table and checks that the classifier emits exactly one
    /// score per label, using a probe inference on a zero tensor.
    pub async fn initialize(
        classifier: Arc<dyn Classifier>,
        provider: &dyn LabelProvider,
        expected_labels: usize,
        preprocess: PreprocessConfig,
    ) -> Result<Self, StartupError> {
        let labels = LabelTable::load(provider, expected_labels).await?;
        tracing::info!(count = labels.len(), "label table ready");

        let probe = Array4::<f32>::zeros(preprocess.input_shape());
        let probe_classifier = classifier.clone();
        let outputs = tokio::task::spawn_blocking(move || probe_classifier.classify(probe))
            .await
            .map_err(InferenceError::from)??
            .len();
        if outputs != labels.len() {
            return Err(StartupError::OutputMismatch {
                outputs,
                labels: labels.len(),
            });
        }

        Ok(Self {
            classifier,
            labels: Arc::new(labels),
            preprocess,
        })
    }
}

// --- DTOs (Data Transfer Objects) ---

#[derive(Serialize, Debug, Clone, PartialEq)]
pub struct PredictResponse {
    pub predicted_class_index: usize,
    pub flower_name: String,
    pub confidence: f64,
}
