//! # Generate Flow
//!
//! Drives a [`MetadataForm`] from the command line: select the image, generate, apply
//! the user's edits and render the result.

use crate::api_client::ApiClient;
use crate::image::EncodedImage;
use anyhow::{anyhow, bail, Result};
use artmeta::form::{Clipboard, MetadataForm, Notification, NotificationLevel};
use artmeta::schema::{Category, Field, SelectOutcome};
use std::fmt::Write as _;
use tracing::{info, warn};

/// Field values supplied on the command line. `None` keeps the generated value.
#[derive(Debug, Default, Clone)]
pub struct Edits {
    pub title: Option<String>,
    pub tags: Option<String>,
    pub description: Option<String>,
    /// Replaces the generated categories when non-empty.
    pub categories: Vec<String>,
}

/// Selects `image`, runs one generation against the server and returns the
/// populated form.
pub async fn generate(api: &ApiClient, image: &EncodedImage) -> Result<MetadataForm> {
    let mut form = MetadataForm::new();
    form.select_image(image.name.as_str(), image.data_uri.as_str())
        .map_err(|e| anyhow!("{e}"))?;

    let ticket = form.begin_generation().map_err(|e| anyhow!("{e}"))?;
    info!("Generating metadata for '{}'.", image.name);
    let outcome = api.generate_metadata(ticket.data_uri()).await;

    if let Err(e) = form.complete_generation(ticket, outcome) {
        bail!("{e}");
    }
    Ok(form)
}

/// Applies `edits` to the form. Returns warnings for selections that were refused.
pub fn apply_edits(form: &mut MetadataForm, edits: &Edits) -> Result<Vec<String>> {
    if let Some(title) = &edits.title {
        form.set_title(title.as_str());
    }
    if let Some(tags) = &edits.tags {
        form.set_tags(tags.as_str());
    }
    if let Some(description) = &edits.description {
        form.set_description(description.as_str());
    }

    let mut warnings = Vec::new();
    if edits.categories.is_empty() {
        return Ok(warnings);
    }

    let requested = edits
        .categories
        .iter()
        .map(|name| {
            Category::from_name(name.trim()).ok_or_else(|| {
                let known: Vec<&str> = Category::ALL.iter().map(|c| c.name()).collect();
                anyhow!(
                    "Unknown category '{}'. Expected one of: {}",
                    name,
                    known.join(", ")
                )
            })
        })
        .collect::<Result<Vec<_>>>()?;

    for category in Category::ALL {
        form.deselect_category(category);
    }
    for category in requested {
        if form.select_category(category) == SelectOutcome::AtCapacity {
            warn!("Category '{}' refused, selection is full.", category);
            warnings.push(format!(
                "Category '{category}' was not selected: at most two categories are allowed."
            ));
        }
    }
    Ok(warnings)
}

/// Field errors, one line each, in form order.
pub fn render_field_errors(form: &MetadataForm) -> String {
    let mut out = String::new();
    for field in [Field::Title, Field::Tags, Field::Description, Field::Categories] {
        for message in form.field_errors(field) {
            let _ = writeln!(out, "{}: {}", field.as_str(), message);
        }
    }
    out
}

pub fn render_notification(notification: &Notification) -> String {
    let marker = match notification.level {
        NotificationLevel::Info => "✅",
        NotificationLevel::Error => "❌",
    };
    format!("{marker} {}: {}", notification.title, notification.message)
}

/// Exports the form to `clipboard` if the export control would be enabled.
pub fn copy_to_clipboard(form: &mut MetadataForm, clipboard: &mut dyn Clipboard) -> Result<()> {
    if !form.can_export() {
        bail!("Metadata has validation errors and was not copied.");
    }
    form.export_to(clipboard)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use artmeta::form::ClipboardError;
    use artmeta_test_utils::{sample_png_data_uri, sample_raw_result};
    use serde_json::json;
    use wiremock::{
        matchers::{method, path},
        Mock, MockServer, ResponseTemplate,
    };

    fn sample_image() -> EncodedImage {
        EncodedImage {
            name: "fox.png".to_string(),
            data_uri: sample_png_data_uri(),
        }
    }

    async fn server_returning(status: u16, body: serde_json::Value) -> MockServer {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/generate-metadata"))
            .respond_with(ResponseTemplate::new(status).set_body_json(body))
            .mount(&server)
            .await;
        server
    }

    async fn generated_form() -> (MockServer, MetadataForm) {
        let server =
            server_returning(200, json!({ "status": "success", "data": sample_raw_result() }))
                .await;
        let form = generate(&ApiClient::new(server.uri()), &sample_image())
            .await
            .unwrap();
        (server, form)
    }

    #[derive(Default)]
    struct RecordingClipboard {
        written: Vec<String>,
    }

    impl Clipboard for RecordingClipboard {
        fn write_text(&mut self, text: &str) -> Result<(), ClipboardError> {
            self.written.push(text.to_string());
            Ok(())
        }
    }

    #[tokio::test]
    async fn test_generate_populates_form() {
        let (_server, form) = generated_form().await;
        let raw = sample_raw_result();
        assert_eq!(form.values().title, raw.title);
        assert_eq!(form.values().categories.len(), 2);
        assert!(form.is_valid());
        assert!(!form.is_dirty());
    }

    #[tokio::test]
    async fn test_generate_failure_surfaces_server_message() {
        let server = server_returning(
            500,
            json!({ "status": "error", "message": "The metadata generation service is currently unavailable." }),
        )
        .await;
        let err = generate(&ApiClient::new(server.uri()), &sample_image())
            .await
            .unwrap_err();
        assert_eq!(
            err.to_string(),
            "Failed to generate metadata: The metadata generation service is currently unavailable."
        );
    }

    #[tokio::test]
    async fn test_category_edits_replace_generated_selection() {
        let (_server, mut form) = generated_form().await;
        let edits = Edits {
            categories: vec!["Photography".to_string()],
            ..Default::default()
        };
        let warnings = apply_edits(&mut form, &edits).unwrap();
        assert!(warnings.is_empty());
        assert_eq!(form.values().categories.to_joined_string(), "Photography");
        assert!(form.is_dirty());
    }

    #[tokio::test]
    async fn test_third_category_is_refused_with_warning() {
        let (_server, mut form) = generated_form().await;
        let edits = Edits {
            categories: vec![
                "Drawing".to_string(),
                "Digital Art".to_string(),
                "Photography".to_string(),
            ],
            ..Default::default()
        };
        let warnings = apply_edits(&mut form, &edits).unwrap();
        assert_eq!(warnings.len(), 1);
        assert!(warnings[0].contains("Photography"));
        assert_eq!(form.values().categories.len(), 2);
    }

    #[tokio::test]
    async fn test_unknown_category_is_an_error() {
        let (_server, mut form) = generated_form().await;
        let edits = Edits {
            categories: vec!["Sculpture".to_string()],
            ..Default::default()
        };
        let err = apply_edits(&mut form, &edits).unwrap_err();
        assert!(err.to_string().starts_with("Unknown category 'Sculpture'"));
    }

    #[tokio::test]
    async fn test_invalid_edit_is_reported_but_still_exportable() {
        let (_server, mut form) = generated_form().await;
        apply_edits(
            &mut form,
            &Edits {
                title: Some(String::new()),
                ..Default::default()
            },
        )
        .unwrap();

        let errors = render_field_errors(&form);
        assert_eq!(errors, "title: Title is required.\n");

        // Dirty forms may be exported even while invalid.
        let mut clipboard = RecordingClipboard::default();
        copy_to_clipboard(&mut form, &mut clipboard).unwrap();
        assert_eq!(clipboard.written, vec![form.export_text()]);
        let notes = form.take_notifications();
        let last = notes.last().unwrap();
        assert_eq!(
            render_notification(last),
            "✅ Copied to Clipboard!: Metadata is ready to be pasted into your listing."
        );
    }
}
