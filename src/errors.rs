//! Error types for notebook generation

use thiserror::Error;

/// Errors that can occur while generating a notebook document
///
/// All variants are raised during generation, before any document exists.
/// Generation is deterministic, so none of them is retriable: the caller
/// must supply corrected input.
#[derive(Debug, Error)]
pub enum GenerateError {
    // ─────────────────────────────────────────────────────────────────────────
    // Payload Errors
    // ─────────────────────────────────────────────────────────────────────────
    /// Failed to parse a JSON payload
    #[error("Failed to parse request: {0}")]
    Parse(#[from] serde_json::Error),

    // ─────────────────────────────────────────────────────────────────────────
    // Resolution Errors
    // ─────────────────────────────────────────────────────────────────────────
    /// Connection type is not one of the supported variants
    #[error("Unsupported connection type '{0}'. Supported types: local, tcp")]
    UnsupportedConnectionType(String),

    /// Dataset loader tag is not registered
    #[error("Unknown loader type '{0}'")]
    UnknownLoaderType(String),

    /// Analysis tag is not registered
    #[error("Unknown analysis type '{0}'")]
    UnknownAnalysisType(String),

    // ─────────────────────────────────────────────────────────────────────────
    // Parameter Errors
    // ─────────────────────────────────────────────────────────────────────────
    /// A required parameter is missing or a supplied value has the wrong
    /// semantic type
    #[error("Invalid parameter '{name}' for {context}: {message}")]
    InvalidParameter {
        name: String,
        context: String,
        message: String,
    },

    /// A supplied parameter key is neither consumed nor on the analysis
    /// type's explicit ignore list
    #[error("Unrecognized parameter '{name}' for analysis '{analysis}'")]
    UnrecognizedParameter { name: String, analysis: String },
}

impl GenerateError {
    /// Create a missing-parameter error
    pub fn missing(name: impl Into<String>, context: impl Into<String>) -> Self {
        Self::InvalidParameter {
            name: name.into(),
            context: context.into(),
            message: "required parameter is missing".to_string(),
        }
    }

    /// Create a wrong-type error
    pub fn wrong_type(
        name: impl Into<String>,
        context: impl Into<String>,
        expected: &str,
    ) -> Self {
        Self::InvalidParameter {
            name: name.into(),
            context: context.into(),
            message: format!("expected {}", expected),
        }
    }

    /// Create an unrecognized-parameter error
    pub fn unrecognized(name: impl Into<String>, analysis: impl Into<String>) -> Self {
        Self::UnrecognizedParameter {
            name: name.into(),
            analysis: analysis.into(),
        }
    }
}
