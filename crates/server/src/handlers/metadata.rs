//! # Metadata Generation Handler
//!
//! `POST /api/generate-metadata`: accepts `{ "artworkDataUri": "data:..." }` and
//! answers with the conformed listing metadata.

use super::{AppError, AppState};
use crate::types::GenerateMetadataResponse;
use artmeta::schema::{GenerationInput, MISSING_DATA_URI_MESSAGE};
use artmeta::GenerationRequest;
use axum::{extract::rejection::JsonRejection, extract::State, Json};
use serde_json::Value;
use tracing::info;

// --- Request Parsing ---

/// Reads the input field leniently: a missing, `null` or non-string value all count
/// as absent.
fn parse_input(payload: &Value) -> GenerationInput {
    GenerationInput {
        artwork_data_uri: payload
            .get("artworkDataUri")
            .and_then(Value::as_str)
            .map(str::to_string),
    }
}

// --- Handlers ---

/// Generates listing metadata for one artwork image.
pub async fn generate_metadata_handler(
    State(app_state): State<AppState>,
    payload: Result<Json<Value>, JsonRejection>,
) -> Result<Json<GenerateMetadataResponse>, AppError> {
    let Json(payload) = payload?;
    let input = parse_input(&payload);

    let data_uri = input
        .require_data_uri()
        .map_err(|_| AppError::BadRequest(MISSING_DATA_URI_MESSAGE.to_string()))?;
    info!(
        "[generate_metadata_handler] Received artwork data URI ({} bytes).",
        data_uri.len()
    );

    let result = app_state
        .metadata_client
        .generate_metadata(GenerationRequest::new(data_uri))
        .await
        .map_err(|e| AppError::metadata(e, app_state.config.expose_error_details))?;

    info!(
        "[generate_metadata_handler] Generated metadata titled '{}'.",
        result.title
    );
    Ok(Json(GenerateMetadataResponse::success(result)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_parse_input_treats_non_strings_as_absent() {
        assert!(parse_input(&json!({})).artwork_data_uri.is_none());
        assert!(parse_input(&json!({ "artworkDataUri": null }))
            .artwork_data_uri
            .is_none());
        assert!(parse_input(&json!({ "artworkDataUri": 42 }))
            .artwork_data_uri
            .is_none());
        assert!(parse_input(&json!([1, 2])).artwork_data_uri.is_none());
        assert_eq!(
            parse_input(&json!({ "artworkDataUri": "data:x" }))
                .artwork_data_uri
                .as_deref(),
            Some("data:x")
        );
    }
}
