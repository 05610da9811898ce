use crate::error::InferenceError;
use image::imageops::FilterType;
use image::RgbImage;
use ndarray::{Array, Array4, Axis};
use serde::Deserialize;

// ImageNet Standards
const MEAN: [f32; 3] = [0.485, 0.456, 0.406];
const STD: [f32; 3] = [0.229, 0.224, 0.225];

// Caffe-style per-channel means, in BGR order
const CAFFE_MEAN_BGR: [f32; 3] = [103.939, 116.779, 123.68];

/// Pixel transform matching the distribution the network was trained on.
#[derive(Deserialize, Clone, Copy, Debug, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Normalization {
    /// Keras ResNet50 `preprocess_input`: BGR order, mean subtraction, 0..255 scale.
    Caffe,
    /// RGB order, scaled to [0, 1], then ImageNet mean/std.
    Torch,
}

#[derive(Deserialize, Clone, Copy, Debug, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum TensorLayout {
    /// [1, H, W, C]
    Nhwc,
    /// [1, C, H, W]
    Nchw,
}

#[derive(Deserialize, Clone, Copy, Debug)]
#[serde(default)]
pub struct PreprocessConfig {
    pub size: u32,
    pub normalization: Normalization,
    pub layout: TensorLayout,
}

impl Default for PreprocessConfig {
    fn default() -> Self {
        Self {
            size: 224,
            normalization: Normalization::Caffe,
            layout: TensorLayout::Nhwc,
        }
    }
}

impl Normalization {
    fn apply(self, r: u8, g: u8, b: u8) -> [f32; 3] {
        match self {
            Normalization::Caffe => [
                b as f32 - CAFFE_MEAN_BGR[0],
                g as f32 - CAFFE_MEAN_BGR[1],
                r as f32 - CAFFE_MEAN_BGR[2],
            ],
            Normalization::Torch => [
                ((r as f32 / 255.0) - MEAN[0]) / STD[0],
                ((g as f32 / 255.0) - MEAN[1]) / STD[1],
                ((b as f32 / 255.0) - MEAN[2]) / STD[2],
            ],
        }
    }
}

impl PreprocessConfig {
    /// Shape of the batched tensor handed to the classifier.
    pub fn input_shape(&self) -> [usize; 4] {
        let side = self.size as usize;
        match self.layout {
            TensorLayout::Nhwc => [1, side, side, 3],
            TensorLayout::Nchw => [1, 3, side, side],
        }
    }

    /// Decodes raw upload bytes and turns them into a batched model input.
    pub fn process_bytes(&self, buffer: &[u8]) -> Result<Array4<f32>, InferenceError> {
        // Format is guessed from the content, not from the filename
        let img = image::load_from_memory(buffer)?;
        self.process_image(&img.to_rgb8())
    }

    pub fn process_image(&self, img: &RgbImage) -> Result<Array4<f32>, InferenceError> {
        let side = self.size as usize;
        let resized = image::imageops::resize(img, self.size, self.size, FilterType::Triangle);

        let mut normalized_data = Vec::with_capacity(3 * side * side);
        for pixel in resized.pixels() {
            normalized_data.extend(self.normalization.apply(pixel[0], pixel[1], pixel[2]));
        }

        // Shape: [H, W, C]
        let array = Array::from_shape_vec((side, side, 3), normalized_data)?;

        let array = match self.layout {
            TensorLayout::Nhwc => array,
            TensorLayout::Nchw => array.permuted_axes([2, 0, 1]),
        };

        let array = array.insert_axis(Axis(0));
        Ok(array.as_standard_layout().to_owned())
    }
}
