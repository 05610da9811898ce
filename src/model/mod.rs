pub mod classifier;
pub mod loader;
pub mod prediction;

pub use classifier::{Classifier, OnnxClassifier};
