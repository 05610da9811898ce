use crate::error::InferenceError;
use crate::model::loader;
use ndarray::Array4;
use ort::session::Session;
use ort::value::Tensor;
use std::path::Path;
use std::sync::Mutex;

/// Maps a batched image tensor to one score per class.
///
/// Implementations are shared across requests for the life of the process,
/// and are called from the blocking thread pool.
pub trait Classifier: Send + Sync {
    fn classify(&self, input: Array4<f32>) -> Result<Vec<f32>, InferenceError>;
}

/// Classifier backed by an ONNX Runtime session.
pub struct OnnxClassifier {
    // `Session::run` takes `&mut self`
    session: Mutex<Session>,
    input_name: String,
}

impl OnnxClassifier {
    pub fn new(session: Session) -> Result<Self, InferenceError> {
        let input_name = session
            .inputs
            .first()
            .map(|input| input.name.clone())
            .ok_or_else(|| InferenceError::InvalidModel("model declares no inputs".into()))?;

        Ok(Self {
            session: Mutex::new(session),
            input_name,
        })
    }

    pub fn from_file(path: impl AsRef<Path>, intra_threads: usize) -> Result<Self, InferenceError> {
        Self::new(loader::load_model(path, intra_threads)?)
    }

    pub fn input_name(&self) -> &str {
        &self.input_name
    }
}

impl Classifier for OnnxClassifier {
    fn classify(&self, input: Array4<f32>) -> Result<Vec<f32>, InferenceError> {
        let shape = input.shape().to_vec();
        let (data, _) = input.into_raw_vec_and_offset();
        let input_value = Tensor::from_array((shape, data.into_boxed_slice()))?;

        let mut session = self
            .session
            .lock()
            .map_err(|_| InferenceError::SessionPoisoned)?;
        let outputs = session.run(ort::inputs![self.input_name.as_str() => input_value])?;

        // Batch of one: the flat buffer is the score vector
        let (_, scores) = outputs[0].try_extract_tensor::<f32>()?;
        Ok(scores.to_vec())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::prediction::argmax;
    use std::path::PathBuf;

    // Flatten + Softmax over a [1, 1, 1, 102] input named "pixels"
    fn fixture(name: &str) -> PathBuf {
        Path::new(env!("CARGO_MANIFEST_DIR"))
            .join("tests/fixtures")
            .join(name)
    }

    fn softmax_classifier() -> OnnxClassifier {
        OnnxClassifier::from_file(fixture("softmax_102.onnx"), 1).unwrap()
    }

    #[test]
    fn test_binds_first_input_name() {
        assert_eq!(softmax_classifier().input_name(), "pixels");
    }

    #[test]
    fn test_classify_returns_probabilities() {
        let classifier = softmax_classifier();
        let mut input = Array4::<f32>::zeros((1, 1, 1, 102));
        input[[0, 0, 0, 41]] = 6.0;
        input[[0, 0, 0, 7]] = 2.0;

        let scores = classifier.classify(input).unwrap();
        assert_eq!(scores.len(), 102);
        let total: f32 = scores.iter().sum();
        assert!((total - 1.0).abs() < 1e-4);
        assert_eq!(argmax(&scores).map(|(i, _)| i), Some(41));
    }

    #[test]
    fn test_classify_is_repeatable() {
        let classifier = softmax_classifier();
        let input = Array4::from_shape_fn((1, 1, 1, 102), |(_, _, _, i)| (i % 13) as f32);

        let first = classifier.classify(input.clone()).unwrap();
        let second = classifier.classify(input).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn test_classify_rejects_wrong_shape() {
        let classifier = softmax_classifier();
        let result = classifier.classify(Array4::zeros((1, 224, 224, 3)));
        assert!(matches!(result, Err(InferenceError::OrtError(_))));
    }

    #[test]
    fn test_model_without_inputs_is_rejected() {
        // A single Constant node: loads fine, but offers nothing to feed
        let session = loader::load_model(fixture("no_inputs.onnx"), 1).unwrap();
        let result = OnnxClassifier::new(session);
        assert!(matches!(result, Err(InferenceError::InvalidModel(_))));
    }
}
