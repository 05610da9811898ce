use serde::Deserialize;
use std::fs;
use std::path::Path;

use crate::error::StartupError;
use crate::preprocessing::PreprocessConfig;

pub const DEFAULT_HOST: &str = "0.0.0.0";
pub const DEFAULT_PORT: u16 = 8000;
pub const DEFAULT_MODEL_PATH: &str = "models/flowers102.onnx";
pub const DEFAULT_LABELS_URL: &str = "https://gist.githubusercontent.com/\
JosephKJ/94c7728ed1a8e0cd87fe6a029769cde1/raw/Oxford-102_Flower_dataset_labels.txt";
pub const DEFAULT_LABEL_COUNT: usize = 102;

#[derive(Deserialize, Clone, Debug, Default)]
#[serde(default)]
pub struct AppConfig {
    pub server: ServerConfig,
    pub model: ModelConfig,
    pub labels: LabelsConfig,
    pub preprocessing: PreprocessConfig,
}

#[derive(Deserialize, Clone, Debug)]
#[serde(default)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    /// Upper bound on a request body, multipart framing included.
    pub max_upload_bytes: usize,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: DEFAULT_HOST.to_string(),
            port: DEFAULT_PORT,
            max_upload_bytes: 20 * 1024 * 1024,
        }
    }
}

#[derive(Deserialize, Clone, Debug)]
#[serde(default)]
pub struct ModelConfig {
    pub path: String,
    /// Threads ONNX Runtime may use inside a single operator.
    pub intra_threads: usize,
}

impl Default for ModelConfig {
    fn default() -> Self {
        Self {
            path: DEFAULT_MODEL_PATH.to_string(),
            intra_threads: 4,
        }
    }
}

#[derive(Deserialize, Clone, Debug)]
#[serde(default)]
pub struct LabelsConfig {
    pub url: String,
    /// Local label file; takes precedence over `url` when set.
    pub path: Option<String>,
    pub expected_count: usize,
    pub timeout_secs: u64,
}

impl Default for LabelsConfig {
    fn default() -> Self {
        Self {
            url: DEFAULT_LABELS_URL.to_string(),
            path: None,
            expected_count: DEFAULT_LABEL_COUNT,
            timeout_secs: 30,
        }
    }
}

impl AppConfig {
    pub fn from_yaml(content: &str) -> Result<Self, StartupError> {
        Ok(serde_yaml::from_str(content)?)
    }

    /// Reads the config file, falling back to defaults when it does not exist.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, StartupError> {
        let path = path.as_ref();
        if !path.exists() {
            tracing::info!(path = %path.display(), "config file not found, using defaults");
            return Ok(Self::default());
        }
        let content = fs::read_to_string(path)?;
        Self::from_yaml(&content)
    }

    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.server.host, self.server.port)
    }
}
