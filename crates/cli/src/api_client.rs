//! # API Client
//!
//! This module provides a client for the `artmeta-server` generation endpoint and
//! maps its response envelopes onto the outcomes the metadata form understands.

use artmeta::form::GenerationOutcome;
use artmeta::schema::RawGenerationResult;
use reqwest::Client;
use serde::Deserialize;
use serde_json::json;
use tracing::{info, warn};

/// `200 { "status": "success", "data": ... }`
#[derive(Debug, Deserialize)]
struct SuccessEnvelope {
    status: String,
    data: RawGenerationResult,
}

/// `400 { "error": ... }`
#[derive(Debug, Deserialize)]
struct ClientErrorEnvelope {
    error: String,
}

/// `500 { "status": "error", "message": ... }`
#[derive(Debug, Deserialize)]
struct ServerErrorEnvelope {
    message: String,
}

/// The client for making API calls to the `artmeta-server`.
pub struct ApiClient {
    client: Client,
    base_url: String,
}

impl ApiClient {
    /// Creates a new `ApiClient`.
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            client: Client::new(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
        }
    }

    /// Requests metadata for an artwork data URI.
    ///
    /// Transport failures are reported as a failed outcome, like error envelopes.
    pub async fn generate_metadata(&self, data_uri: &str) -> GenerationOutcome {
        let url = format!("{}/api/generate-metadata", self.base_url);
        info!("Requesting metadata from: {}", url);

        let response = match self
            .client
            .post(&url)
            .json(&json!({ "artworkDataUri": data_uri }))
            .send()
            .await
        {
            Ok(response) => response,
            Err(e) => {
                warn!("Request to {} failed: {}", url, e);
                return GenerationOutcome::Failed(format!("Could not reach the server: {e}"));
            }
        };

        let status = response.status().as_u16();
        let body = response.text().await.unwrap_or_default();
        outcome_from_response(status, &body)
    }
}

/// Interprets a raw HTTP response from the generation endpoint.
pub fn outcome_from_response(status: u16, body: &str) -> GenerationOutcome {
    match status {
        200 => match serde_json::from_str::<SuccessEnvelope>(body) {
            Ok(envelope) if envelope.status == "success" => {
                GenerationOutcome::Generated(envelope.data)
            }
            _ => GenerationOutcome::Failed("Malformed response from server".to_string()),
        },
        400..=499 => match serde_json::from_str::<ClientErrorEnvelope>(body) {
            Ok(envelope) => GenerationOutcome::Failed(envelope.error),
            Err(_) => GenerationOutcome::Failed(format!("Server responded with {status}: {body}")),
        },
        _ => match serde_json::from_str::<ServerErrorEnvelope>(body) {
            Ok(envelope) if !envelope.message.is_empty() => {
                GenerationOutcome::Failed(envelope.message)
            }
            _ => GenerationOutcome::Failed(format!("Server responded with {status}: {body}")),
        },
    }
}
