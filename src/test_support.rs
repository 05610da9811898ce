//! Deterministic stand-ins for the ONNX model, plus request builders.

use crate::error::InferenceError;
use crate::labels::StaticLabelProvider;
use crate::model::Classifier;
use ndarray::Array4;
use std::io::Cursor;
use std::sync::atomic::{AtomicUsize, Ordering};

pub const BOUNDARY: &str = "flowernx-test-boundary";
pub const ROSE_INDEX: usize = 73;

pub fn flower_names(count: usize) -> Vec<String> {
    (0..count)
        .map(|i| {
            if i == ROSE_INDEX {
                "rose".to_string()
            } else {
                format!("flower {i}")
            }
        })
        .collect()
}

pub fn label_provider(count: usize) -> StaticLabelProvider {
    StaticLabelProvider::new(flower_names(count))
}

/// Returns the same scores whatever the input.
pub struct FixedClassifier {
    pub scores: Vec<f32>,
    pub calls: AtomicUsize,
}

impl FixedClassifier {
    pub fn new(scores: Vec<f32>) -> Self {
        Self {
            scores,
            calls: AtomicUsize::new(0),
        }
    }

    /// A softmax-like vector over `classes` peaking at `index`.
    pub fn peaked(classes: usize, index: usize, peak: f32) -> Self {
        let rest = (1.0 - peak) / (classes - 1) as f32;
        let scores = (0..classes)
            .map(|i| if i == index { peak } else { rest })
            .collect();
        Self::new(scores)
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl Classifier for FixedClassifier {
    fn classify(&self, _input: Array4<f32>) -> Result<Vec<f32>, InferenceError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(self.scores.clone())
    }
}

/// Softmax over logits derived from the per-channel means of the input, so
/// different images give different (but repeatable) answers.
pub struct ChannelMeanClassifier {
    pub classes: usize,
    pub expected_shape: [usize; 4],
}

impl Classifier for ChannelMeanClassifier {
    fn classify(&self, input: Array4<f32>) -> Result<Vec<f32>, InferenceError> {
        if input.shape() != self.expected_shape {
            return Err(InferenceError::InvalidModel(format!(
                "unexpected input shape {:?}",
                input.shape()
            )));
        }

        let mean = input.mean().unwrap_or(0.0);
        let logits: Vec<f32> = (0..self.classes)
            .map(|i| -((i as f32 - mean.abs()).powi(2)) / 50.0)
            .collect();
        let max = logits.iter().cloned().fold(f32::NEG_INFINITY, f32::max);
        let exps: Vec<f32> = logits.iter().map(|l| (l - max).exp()).collect();
        let sum: f32 = exps.iter().sum();
        Ok(exps.into_iter().map(|e| e / sum).collect())
    }
}

/// Always fails, as a broken runtime would.
pub struct FailingClassifier;

impl Classifier for FailingClassifier {
    fn classify(&self, _input: Array4<f32>) -> Result<Vec<f32>, InferenceError> {
        Err(InferenceError::EmptyOutput)
    }
}

pub fn encode(img: &image::RgbImage, format: image::ImageFormat) -> Vec<u8> {
    let mut buffer = Vec::new();
    img.write_to(&mut Cursor::new(&mut buffer), format).unwrap();
    buffer
}

pub fn png_bytes(width: u32, height: u32) -> Vec<u8> {
    let img = image::RgbImage::from_fn(width, height, |x, y| {
        image::Rgb([(x % 256) as u8, (y % 256) as u8, 128])
    });
    encode(&img, image::ImageFormat::Png)
}

/// Single-part multipart body with the given field name.
pub fn multipart_body(field: &str, filename: &str, content: &[u8]) -> Vec<u8> {
    let mut body = Vec::new();
    body.extend_from_slice(format!("--{BOUNDARY}\r\n").as_bytes());
    body.extend_from_slice(
        format!(
            "Content-Disposition: form-data; name=\"{field}\"; filename=\"{filename}\"\r\n"
        )
        .as_bytes(),
    );
    body.extend_from_slice(b"Content-Type: application/octet-stream\r\n\r\n");
    body.extend_from_slice(content);
    body.extend_from_slice(format!("\r\n--{BOUNDARY}--\r\n").as_bytes());
    body
}

pub fn multipart_content_type() -> String {
    format!("multipart/form-data; boundary={BOUNDARY}")
}
