//! Category names, index-aligned with the classifier output.

pub mod provider;

pub use provider::{FileLabelProvider, LabelProvider, RemoteLabelProvider, StaticLabelProvider};

use crate::error::StartupError;

/// Splits a newline-delimited label file into clean names.
///
/// Blank lines are skipped; surrounding whitespace and any run of `'` or `"`
/// at either end are stripped.
pub fn parse_labels(text: &str) -> Vec<String> {
    text.lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(|line| line.trim_matches(|c| c == '\'' || c == '"').to_string())
        .collect()
}

/// Immutable table of category names.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LabelTable {
    names: Vec<String>,
}

impl LabelTable {
    pub fn new(names: Vec<String>, expected: usize) -> Result<Self, StartupError> {
        if names.len() != expected {
            return Err(StartupError::LabelCountMismatch {
                expected,
                got: names.len(),
            });
        }
        Ok(Self { names })
    }

    /// Fetches, parses and validates the table in one step.
    pub async fn load(provider: &dyn LabelProvider, expected: usize) -> Result<Self, StartupError> {
        let text = provider.fetch().await?;
        Self::new(parse_labels(&text), expected)
    }

    pub fn get(&self, index: usize) -> Option<&str> {
        self.names.get(index).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }
}
