//! Error types for the altrules engine

use thiserror::Error;

/// Failures surfaced to callers.
///
/// Only data-integrity problems are errors. A node that matches no rule, a
/// selector naming an absent style key, or an empty rule set all produce
/// empty results instead.
#[derive(Error, Debug)]
pub enum EngineError {
    #[error("Invalid source node '{node}': {message}")]
    InvalidSource { node: String, message: String },

    #[error("Invalid mapping rule '{rule}': {message}")]
    InvalidRule { rule: String, message: String },

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("File not found: {path}")]
    FileNotFound { path: String },

    #[error("Invalid format: {message}")]
    InvalidFormat { message: String },
}

pub type Result<T> = std::result::Result<T, EngineError>;

impl EngineError {
    pub fn invalid_source(node: impl Into<String>, message: impl Into<String>) -> Self {
        Self::InvalidSource {
            node: node.into(),
            message: message.into(),
        }
    }

    pub fn invalid_rule(rule: impl Into<String>, message: impl Into<String>) -> Self {
        Self::InvalidRule {
            rule: rule.into(),
            message: message.into(),
        }
    }

    /// True for the data-integrity kinds (bad source node or bad rule).
    pub fn is_data_error(&self) -> bool {
        matches!(self, Self::InvalidSource { .. } | Self::InvalidRule { .. })
    }
}
