use async_trait::async_trait;
use reqwest::Client;
use std::path::PathBuf;
use std::time::Duration;

use crate::config::LabelsConfig;
use crate::error::StartupError;

/// Source of the raw, newline-delimited label text.
#[async_trait]
pub trait LabelProvider: Send + Sync {
    async fn fetch(&self) -> Result<String, StartupError>;
}

/// Fetches labels over HTTP. No retries: a failure aborts startup.
pub struct RemoteLabelProvider {
    client: Client,
    url: String,
}

impl RemoteLabelProvider {
    pub fn new(url: impl Into<String>, timeout: Duration) -> Result<Self, StartupError> {
        let client = Client::builder().timeout(timeout).build()?;
        Ok(Self {
            client,
            url: url.into(),
        })
    }

    pub fn url(&self) -> &str {
        &self.url
    }
}

#[async_trait]
impl LabelProvider for RemoteLabelProvider {
    async fn fetch(&self) -> Result<String, StartupError> {
        tracing::info!(url = %self.url, "fetching labels");
        let text = self
            .client
            .get(&self.url)
            .send()
            .await?
            .error_for_status()?
            .text()
            .await?;
        Ok(text)
    }
}

pub struct FileLabelProvider {
    path: PathBuf,
}

impl FileLabelProvider {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

#[async_trait]
impl LabelProvider for FileLabelProvider {
    async fn fetch(&self) -> Result<String, StartupError> {
        tracing::info!(path = %self.path.display(), "reading labels");
        tokio::fs::read_to_string(&self.path)
            .await
            .map_err(|source| StartupError::LabelFile {
                path: self.path.display().to_string(),
                source,
            })
    }
}

/// In-memory labels, mostly for tests.
pub struct StaticLabelProvider {
    names: Vec<String>,
}

impl StaticLabelProvider {
    pub fn new<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            names: names.into_iter().map(Into::into).collect(),
        }
    }
}

#[async_trait]
impl LabelProvider for StaticLabelProvider {
    async fn fetch(&self) -> Result<String, StartupError> {
        Ok(self.names.join("\n"))
    }
}

/// Picks the provider the config asks for: a local file when `path` is set,
/// the remote URL otherwise.
pub fn from_config(config: &LabelsConfig) -> Result<Box<dyn LabelProvider>, StartupError> {
    match &config.path {
        Some(path) => Ok(Box::new(FileLabelProvider::new(path))),
        None => Ok(Box::new(RemoteLabelProvider::new(
            config.url.clone(),
            Duration::from_secs(config.timeout_secs),
        )?)),
    }
}
