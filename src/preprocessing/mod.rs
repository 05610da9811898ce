pub mod image;

pub use self::image::{Normalization, PreprocessConfig, TensorLayout};
