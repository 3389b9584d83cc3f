use crate::schema::FieldViolation;
use std::time::Duration;
use thiserror::Error;

/// Custom error types for the metadata generation pipeline.
#[derive(Error, Debug)]
pub enum MetadataError {
    #[error("Invalid generation request: {0}")]
    Validation(String),
    #[error("AI provider is not configured: {0}")]
    MissingAiProvider(String),
    #[error("Failed to build Reqwest client: {0}")]
    ReqwestClientBuild(reqwest::Error),
    #[error("Failed to send request to AI provider: {0}")]
    AiRequest(reqwest::Error),
    #[error("Failed to deserialize AI provider response: {0}")]
    AiDeserialization(reqwest::Error),
    #[error("AI provider returned an error ({status}): {body}")]
    AiApi { status: u16, body: String },
    #[error("AI provider returned no content")]
    EmptyResponse,
    #[error("AI provider returned output that is not valid metadata JSON: {0}")]
    MalformedOutput(String),
    #[error("AI provider did not respond within {0:?}")]
    Timeout(Duration),
    #[error("Generated metadata violates the output schema: {}", format_violations(.0))]
    SchemaViolation(Vec<FieldViolation>),
    #[error("JSON serialization/deserialization error: {0}")]
    JsonSerialization(#[from] serde_json::Error),
}

/// The coarse classification of a [`MetadataError`].
///
/// Transport layers map on this rather than on individual variants, so that a new
/// provider failure mode does not need a new HTTP mapping.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    Validation,
    GenerationUnavailable,
    SchemaViolation,
    Configuration,
}

impl ErrorKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorKind::Validation => "validation",
            ErrorKind::GenerationUnavailable => "generation_unavailable",
            ErrorKind::SchemaViolation => "schema_violation",
            ErrorKind::Configuration => "configuration",
        }
    }
}

impl MetadataError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            MetadataError::Validation(_) => ErrorKind::Validation,
            MetadataError::AiRequest(_)
            | MetadataError::AiDeserialization(_)
            | MetadataError::AiApi { .. }
            | MetadataError::EmptyResponse
            | MetadataError::MalformedOutput(_)
            | MetadataError::Timeout(_) => ErrorKind::GenerationUnavailable,
            MetadataError::SchemaViolation(_) => ErrorKind::SchemaViolation,
            MetadataError::MissingAiProvider(_)
            | MetadataError::ReqwestClientBuild(_)
            | MetadataError::JsonSerialization(_) => ErrorKind::Configuration,
        }
    }

    /// A short, client-safe sentence describing the failure without provider internals.
    pub fn public_message(&self) -> &'static str {
        match self.kind() {
            ErrorKind::Validation => "The generation request was invalid.",
            ErrorKind::GenerationUnavailable => {
                "The metadata generation service is currently unavailable."
            }
            ErrorKind::SchemaViolation => {
                "The generated metadata did not meet the listing requirements."
            }
            ErrorKind::Configuration => "Server is not configured correctly.",
        }
    }
}

fn format_violations(violations: &[FieldViolation]) -> String {
    violations
        .iter()
        .map(|v| v.to_string())
        .collect::<Vec<_>>()
        .join("; ")
}
