//! # Metadata Submission Form
//!
//! Platform-neutral state for the client side of the generation flow: the selected
//! image, the four editable listing fields, single-flight generation tracking, inline
//! errors, notifications and clipboard export. Any front end (the CLI included) drives
//! it; it performs no I/O of its own.

use crate::{
    data_uri::ArtworkImage,
    schema::{
        validate_description, validate_tags, validate_title, Category, CategorySet, Field,
        FieldViolation, OutputSchema, RawGenerationResult, SelectOutcome,
    },
};
use std::collections::VecDeque;
use thiserror::Error;
use tracing::{info, warn};

const NO_IMAGE_MESSAGE: &str = "Please upload an artwork image first.";
const IMAGE_LOAD_FAILED_MESSAGE: &str = "Failed to load image preview.";

/// Errors reported by form operations.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum FormError {
    #[error("Please upload an artwork image first.")]
    NoImage,
    #[error("Failed to load image preview: {0}")]
    InvalidImage(String),
    #[error("A metadata generation is already in progress.")]
    GenerationInFlight,
    #[error("The generation ticket no longer matches the form.")]
    StaleTicket,
    #[error("Failed to generate metadata: {0}")]
    GenerationFailed(String),
}

/// A clipboard write failure. Kept apart from generation errors.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("Could not copy metadata to clipboard: {0}")]
pub struct ClipboardError(pub String);

/// A system clipboard, or anything that can stand in for one.
pub trait Clipboard {
    fn write_text(&mut self, text: &str) -> Result<(), ClipboardError>;
}

/// What came back from a generation attempt, as seen by the client.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GenerationOutcome {
    /// The service answered with metadata. It is still untrusted.
    Generated(RawGenerationResult),
    /// Transport failure or an error envelope; carries the cause for display.
    Failed(String),
}

/// Proof that a generation was started. Consumed by [`MetadataForm::complete_generation`].
#[derive(Debug, PartialEq, Eq)]
pub struct GenerationTicket {
    id: u64,
    data_uri: String,
}

impl GenerationTicket {
    /// The data URI to send with the request.
    pub fn data_uri(&self) -> &str {
        &self.data_uri
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NotificationLevel {
    Info,
    Error,
}

/// A transient, dismissible message for the user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notification {
    pub id: u64,
    pub level: NotificationLevel,
    pub title: String,
    pub message: String,
}

/// The editable listing values.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FormValues {
    pub title: String,
    pub tags: String,
    pub description: String,
    pub categories: CategorySet,
}

impl FormValues {
    /// The plain-text block placed on the clipboard.
    pub fn export_text(&self) -> String {
        format!(
            "Title: {}\n\nTags: {}\n\nDescription: {}\n\nCategories: {}",
            self.title,
            self.tags,
            self.description,
            self.categories.to_joined_string()
        )
    }
}

#[derive(Debug, Clone)]
struct SelectedImage {
    name: String,
    image: ArtworkImage,
    data_uri: String,
}

/// Client-side form state for generating and refining listing metadata.
#[derive(Debug, Default)]
pub struct MetadataForm {
    image: Option<SelectedImage>,
    values: FormValues,
    baseline: FormValues,
    in_flight: Option<u64>,
    next_ticket: u64,
    error: Option<String>,
    notifications: VecDeque<Notification>,
    next_notification: u64,
}

impl MetadataForm {
    pub fn new() -> Self {
        Self::default()
    }

    // --- Image selection ---

    /// Selects the source image. On failure no image remains selected.
    pub fn select_image(
        &mut self,
        name: impl Into<String>,
        data_uri: impl Into<String>,
    ) -> Result<(), FormError> {
        self.error = None;
        let data_uri = data_uri.into();
        match ArtworkImage::from_data_uri(&data_uri) {
            Ok(image) => {
                self.image = Some(SelectedImage {
                    name: name.into(),
                    image,
                    data_uri,
                });
                Ok(())
            }
            Err(e) => {
                warn!("[select_image] Rejected image: {e}");
                self.clear_image();
                self.error = Some(IMAGE_LOAD_FAILED_MESSAGE.to_string());
                Err(FormError::InvalidImage(e.to_string()))
            }
        }
    }

    /// Removes the image and resets every field. An outstanding ticket becomes stale.
    pub fn clear_image(&mut self) {
        self.image = None;
        self.in_flight = None;
        self.reset_values(FormValues::default());
    }

    pub fn image(&self) -> Option<&ArtworkImage> {
        self.image.as_ref().map(|s| &s.image)
    }

    pub fn image_name(&self) -> Option<&str> {
        self.image.as_ref().map(|s| s.name.as_str())
    }

    // --- Generation ---

    /// Whether the generate control is enabled.
    pub fn can_generate(&self) -> bool {
        self.image.is_some() && self.in_flight.is_none()
    }

    pub fn is_generating(&self) -> bool {
        self.in_flight.is_some()
    }

    /// Starts a generation. Only one may be outstanding at a time.
    pub fn begin_generation(&mut self) -> Result<GenerationTicket, FormError> {
        let data_uri = match &self.image {
            Some(selected) => selected.data_uri.clone(),
            None => {
                self.error = Some(NO_IMAGE_MESSAGE.to_string());
                return Err(FormError::NoImage);
            }
        };
        if self.in_flight.is_some() {
            return Err(FormError::GenerationInFlight);
        }

        self.error = None;
        self.next_ticket += 1;
        self.in_flight = Some(self.next_ticket);
        Ok(GenerationTicket {
            id: self.next_ticket,
            data_uri,
        })
    }

    /// Applies the outcome of a generation started with `ticket`.
    ///
    /// On success all four fields are overwritten with the conformed result. On any
    /// failure the fields are left as they were.
    pub fn complete_generation(
        &mut self,
        ticket: GenerationTicket,
        outcome: GenerationOutcome,
    ) -> Result<&FormValues, FormError> {
        if self.in_flight != Some(ticket.id) {
            return Err(FormError::StaleTicket);
        }
        self.in_flight = None;

        let cause = match outcome {
            GenerationOutcome::Generated(raw) => match OutputSchema::conform(raw) {
                Ok(conformed) => {
                    if !conformed.discarded_categories.is_empty() {
                        warn!(
                            discarded = ?conformed.discarded_categories,
                            "[complete_generation] Dropped unknown categories."
                        );
                    }
                    let result = conformed.result;
                    self.reset_values(FormValues {
                        title: result.title,
                        tags: result.tags,
                        description: result.description,
                        categories: result.categories,
                    });
                    self.notify(
                        NotificationLevel::Info,
                        "Metadata Generated",
                        "Review and refine the generated metadata.",
                    );
                    info!("[complete_generation] Form populated.");
                    return Ok(&self.values);
                }
                Err(violations) => violations
                    .iter()
                    .map(|v| v.to_string())
                    .collect::<Vec<_>>()
                    .join("; "),
            },
            GenerationOutcome::Failed(cause) if cause.trim().is_empty() => {
                "Unknown error".to_string()
            }
            GenerationOutcome::Failed(cause) => cause,
        };

        let err = FormError::GenerationFailed(cause);
        self.error = Some(err.to_string());
        self.notify(
            NotificationLevel::Error,
            "Error",
            "Could not generate metadata. Please try again.",
        );
        Err(err)
    }

    // --- Editing ---

    pub fn values(&self) -> &FormValues {
        &self.values
    }

    pub fn set_title(&mut self, title: impl Into<String>) {
        self.values.title = title.into();
    }

    pub fn set_tags(&mut self, tags: impl Into<String>) {
        self.values.tags = tags.into();
    }

    pub fn set_description(&mut self, description: impl Into<String>) {
        self.values.description = description.into();
    }

    /// Selects a category. A third selection is refused and changes nothing.
    pub fn select_category(&mut self, category: Category) -> SelectOutcome {
        self.values.categories.insert(category)
    }

    pub fn deselect_category(&mut self, category: Category) -> bool {
        self.values.categories.remove(category)
    }

    /// Flips a category and returns whether it is selected afterwards.
    pub fn toggle_category(&mut self, category: Category) -> bool {
        if self.values.categories.contains(category) {
            self.values.categories.remove(category);
            false
        } else {
            self.values.categories.insert(category) == SelectOutcome::Added
        }
    }

    /// Whether the control for `category` is enabled.
    pub fn category_selectable(&self, category: Category) -> bool {
        self.values.categories.contains(category) || !self.values.categories.is_full()
    }

    // --- Validation ---

    /// Every violation in the current values.
    pub fn violations(&self) -> Vec<FieldViolation> {
        let mut violations = validate_title(&self.values.title);
        violations.extend(validate_tags(&self.values.tags));
        violations.extend(validate_description(&self.values.description));
        violations
    }

    pub fn field_errors(&self, field: Field) -> Vec<String> {
        self.violations()
            .into_iter()
            .filter(|v| v.field == field)
            .map(|v| v.message)
            .collect()
    }

    pub fn is_valid(&self) -> bool {
        self.violations().is_empty()
    }

    /// Whether the values differ from what was last generated or reset.
    pub fn is_dirty(&self) -> bool {
        self.values != self.baseline
    }

    /// Whether the export control is enabled.
    pub fn can_export(&self) -> bool {
        self.is_valid() || self.is_dirty()
    }

    /// The inline error shown above the form.
    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    // --- Export ---

    pub fn export_text(&self) -> String {
        self.values.export_text()
    }

    /// Writes the export block to `clipboard` once. Form values are never touched.
    pub fn export_to(&mut self, clipboard: &mut dyn Clipboard) -> Result<(), ClipboardError> {
        match clipboard.write_text(&self.export_text()) {
            Ok(()) => {
                self.notify(
                    NotificationLevel::Info,
                    "Copied to Clipboard!",
                    "Metadata is ready to be pasted into your listing.",
                );
                Ok(())
            }
            Err(e) => {
                warn!("[export_to] {e}");
                self.notify(
                    NotificationLevel::Error,
                    "Copy Failed",
                    "Could not copy metadata to clipboard.",
                );
                Err(e)
            }
        }
    }

    // --- Notifications ---

    pub fn notifications(&self) -> impl Iterator<Item = &Notification> {
        self.notifications.iter()
    }

    pub fn dismiss_notification(&mut self, id: u64) -> bool {
        let before = self.notifications.len();
        self.notifications.retain(|n| n.id != id);
        self.notifications.len() != before
    }

    pub fn take_notifications(&mut self) -> Vec<Notification> {
        self.notifications.drain(..).collect()
    }

    fn notify(&mut self, level: NotificationLevel, title: &str, message: &str) {
        self.next_notification += 1;
        self.notifications.push_back(Notification {
            id: self.next_notification,
            level,
            title: title.to_string(),
            message: message.to_string(),
        });
    }

    fn reset_values(&mut self, values: FormValues) {
        self.baseline = values.clone();
        self.values = values;
    }
}
