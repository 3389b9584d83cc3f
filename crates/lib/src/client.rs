//! # Generation Invoker
//!
//! `MetadataClient::generate_metadata` is the single path from an artwork image to a
//! conformed [`GenerationResult`]: validate the input, call the provider once under a
//! deadline, parse its structured output and run it through the output schema.

use crate::{
    data_uri::ArtworkImage,
    errors::MetadataError,
    schema::{Field, FieldViolation, GenerationResult, OutputSchema, RawGenerationResult},
    types::{GenerationRequest, MetadataClient},
};
use serde_json::{Map, Value};
use tracing::{debug, error, info, warn};
use uuid::Uuid;

impl MetadataClient {
    /// Generates listing metadata for the artwork carried by `request`.
    ///
    /// The provider is invoked at most once. Input validation failures return before
    /// any external call.
    pub async fn generate_metadata(
        &self,
        request: GenerationRequest,
    ) -> Result<GenerationResult, MetadataError> {
        let generation_id = Uuid::new_v4();
        let image = ArtworkImage::from_data_uri(&request.artwork_data_uri)?;
        info!(
            %generation_id,
            mime = image.mime_type(),
            bytes = image.len(),
            "[generate_metadata] Starting generation."
        );

        let result = self.run_generation(&image).await;
        match &result {
            Ok(_) => info!(%generation_id, "[generate_metadata] Generation succeeded."),
            Err(e) => error!(
                %generation_id,
                kind = e.kind().as_str(),
                "[generate_metadata] Generation failed: {e}"
            ),
        }
        result
    }

    /// Convenience wrapper around [`MetadataClient::generate_metadata`].
    pub async fn generate_from_data_uri(
        &self,
        artwork_data_uri: &str,
    ) -> Result<GenerationResult, MetadataError> {
        self.generate_metadata(GenerationRequest::new(artwork_data_uri))
            .await
    }

    async fn run_generation(&self, image: &ArtworkImage) -> Result<GenerationResult, MetadataError> {
        let output_schema = OutputSchema::json_schema();
        let raw_text = tokio::time::timeout(
            self.timeout,
            self.ai_provider
                .generate_structured(image, &self.instructions, &output_schema),
        )
        .await
        .map_err(|_| MetadataError::Timeout(self.timeout))??;

        debug!("[run_generation] Raw provider output: {}", raw_text);
        let raw = parse_raw_result(&raw_text)?;

        let conformed = OutputSchema::conform(raw).map_err(MetadataError::SchemaViolation)?;
        if !conformed.discarded_categories.is_empty() {
            warn!(
                discarded = ?conformed.discarded_categories,
                "[run_generation] Discarded categories outside the enumeration."
            );
        }
        Ok(conformed.result)
    }
}

/// Parses a provider's structured text, tolerating a Markdown code fence around it.
///
/// Text that is not a JSON object is `MalformedOutput`. A JSON object whose known
/// fields carry the wrong types is a `SchemaViolation`, one violation per field.
/// Absent fields default to empty and are left to conformance.
pub fn parse_raw_result(text: &str) -> Result<RawGenerationResult, MetadataError> {
    let trimmed = text.trim();
    let unfenced = trimmed
        .strip_prefix("```json")
        .or_else(|| trimmed.strip_prefix("```"))
        .and_then(|s| s.strip_suffix("```"))
        .unwrap_or(trimmed)
        .trim();

    if unfenced.is_empty() {
        return Err(MetadataError::EmptyResponse);
    }

    let value: Value = serde_json::from_str(unfenced)
        .map_err(|e| MetadataError::MalformedOutput(e.to_string()))?;
    let fields = match value {
        Value::Object(fields) => fields,
        other => {
            return Err(MetadataError::MalformedOutput(format!(
                "expected a JSON object, got {}",
                json_type(&other)
            )))
        }
    };

    let mut violations = Vec::new();
    let title = text_field(&fields, Field::Title, &mut violations);
    let tags = text_field(&fields, Field::Tags, &mut violations);
    let description = text_field(&fields, Field::Description, &mut violations);
    let categories = categories_field(&fields, &mut violations);

    if !violations.is_empty() {
        return Err(MetadataError::SchemaViolation(violations));
    }
    Ok(RawGenerationResult {
        title,
        tags,
        description,
        categories,
    })
}

fn json_type(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

fn text_field(
    fields: &Map<String, Value>,
    field: Field,
    violations: &mut Vec<FieldViolation>,
) -> String {
    match fields.get(field.as_str()) {
        None => String::new(),
        Some(Value::String(text)) => text.clone(),
        Some(other) => {
            violations.push(FieldViolation::new(
                field,
                format!("Expected a string, got {}.", json_type(other)),
            ));
            String::new()
        }
    }
}

fn categories_field(fields: &Map<String, Value>, violations: &mut Vec<FieldViolation>) -> Vec<String> {
    let items = match fields.get(Field::Categories.as_str()) {
        None => return Vec::new(),
        Some(Value::Array(items)) => items,
        Some(other) => {
            violations.push(FieldViolation::new(
                Field::Categories,
                format!("Expected a list of strings, got {}.", json_type(other)),
            ));
            return Vec::new();
        }
    };

    let mut categories = Vec::with_capacity(items.len());
    for item in items {
        match item {
            Value::String(name) => categories.push(name.clone()),
            other => {
                violations.push(FieldViolation::new(
                    Field::Categories,
                    format!("Expected category names as strings, got {}.", json_type(other)),
                ));
                return Vec::new();
            }
        }
    }
    categories
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_plain_json() {
        let raw = parse_raw_result(
            r#"{"title":"Sunset","tags":"sun, sea","description":"Warm.","categories":["Photography"]}"#,
        )
        .unwrap();
        assert_eq!(raw.title, "Sunset");
        assert_eq!(raw.categories, vec!["Photography".to_string()]);
    }

    #[test]
    fn test_parse_fenced_json() {
        let text = "```json\n{\"title\":\"Fox\",\"tags\":\"fox\",\"description\":\"A fox.\",\"categories\":[]}\n```";
        assert_eq!(parse_raw_result(text).unwrap().title, "Fox");

        let text = "```\n{\"title\":\"Owl\"}\n```";
        assert_eq!(parse_raw_result(text).unwrap().title, "Owl");
    }

    #[test]
    fn test_parse_rejects_prose_and_non_objects() {
        assert!(matches!(
            parse_raw_result("Here is your metadata!"),
            Err(MetadataError::MalformedOutput(_))
        ));
        assert!(matches!(
            parse_raw_result(r#"["Fox", "fox"]"#),
            Err(MetadataError::MalformedOutput(_))
        ));
        assert!(matches!(
            parse_raw_result("```json\n```"),
            Err(MetadataError::EmptyResponse)
        ));
    }

    fn violated_fields(text: &str) -> Vec<Field> {
        match parse_raw_result(text) {
            Err(MetadataError::SchemaViolation(violations)) => {
                violations.iter().map(|v| v.field).collect()
            }
            other => panic!("expected a schema violation, got {other:?}"),
        }
    }

    #[test]
    fn test_parse_wrong_types_are_schema_violations() {
        assert_eq!(
            violated_fields(r#"{"title": 42, "tags": "a", "description": "d", "categories": []}"#),
            vec![Field::Title]
        );
        assert_eq!(
            violated_fields(r#"{"title": "t", "tags": "a", "description": "d", "categories": "Drawing"}"#),
            vec![Field::Categories]
        );
        assert_eq!(
            violated_fields(r#"{"title": "t", "tags": ["a"], "description": null, "categories": null}"#),
            vec![Field::Tags, Field::Description, Field::Categories]
        );
        assert_eq!(
            violated_fields(r#"{"title": "t", "tags": "a", "description": "d", "categories": ["Drawing", 7, 8]}"#),
            vec![Field::Categories]
        );
    }

    #[test]
    fn test_parse_ignores_unknown_fields() {
        let raw = parse_raw_result(r#"{"title": "Fox", "mood": 3}"#).unwrap();
        assert_eq!(raw.title, "Fox");
        assert!(raw.categories.is_empty());
    }
}
