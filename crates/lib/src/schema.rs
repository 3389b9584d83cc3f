//! # Listing Metadata Schema
//!
//! This module is the single declarative definition of what a generation result may
//! look like. The same limits are used in three places:
//!
//! 1. The response shape declared to the AI provider (`OutputSchema::json_schema`).
//! 2. The conformance check the `MetadataClient` applies before returning a result.
//! 3. The `MetadataForm`, which re-conforms received results and validates every edit.

use crate::errors::MetadataError;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use std::fmt;

// --- Limits ---

/// Hard cap on the title length, in characters.
pub const TITLE_MAX_CHARS: usize = 100;
/// Hard cap on the description length, in characters.
pub const DESCRIPTION_MAX_CHARS: usize = 5000;
/// Hard cap on a single tag, in characters, after trimming.
pub const TAG_MAX_CHARS: usize = 50;
/// Maximum number of non-empty tags.
pub const MAX_TAGS: usize = 15;
/// Maximum number of selected media categories.
pub const MAX_CATEGORIES: usize = 2;

/// The message used when a request arrives without an image.
pub const MISSING_DATA_URI_MESSAGE: &str = "Artwork data URI is required";

// --- Categories ---

/// The fixed enumeration of marketplace media categories.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Category {
    #[serde(rename = "Photography")]
    Photography,
    #[serde(rename = "Design & Illustration")]
    DesignIllustration,
    #[serde(rename = "Painting & Mixed Media")]
    PaintingMixedMedia,
    #[serde(rename = "Drawing")]
    Drawing,
    #[serde(rename = "Digital Art")]
    DigitalArt,
}

impl Category {
    /// Every category, in display order.
    pub const ALL: [Category; 5] = [
        Category::Photography,
        Category::DesignIllustration,
        Category::PaintingMixedMedia,
        Category::Drawing,
        Category::DigitalArt,
    ];

    /// The display name, which is also the wire value.
    pub fn name(&self) -> &'static str {
        match self {
            Category::Photography => "Photography",
            Category::DesignIllustration => "Design & Illustration",
            Category::PaintingMixedMedia => "Painting & Mixed Media",
            Category::Drawing => "Drawing",
            Category::DigitalArt => "Digital Art",
        }
    }

    /// Looks up a category by its exact display name, ignoring surrounding whitespace.
    ///
    /// Near misses ("digital art", "Illustration") are not coerced.
    pub fn from_name(name: &str) -> Option<Self> {
        let name = name.trim();
        Self::ALL.into_iter().find(|c| c.name() == name)
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// The result of trying to add a category to a [`CategorySet`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SelectOutcome {
    Added,
    AlreadySelected,
    /// The set already holds `MAX_CATEGORIES` entries; nothing was changed.
    AtCapacity,
}

/// A selection set of at most `MAX_CATEGORIES` categories.
///
/// Insertion order is kept for display, but equality ignores it.
#[derive(Debug, Clone, Default, Eq, Serialize, Deserialize)]
#[serde(try_from = "Vec<Category>", into = "Vec<Category>")]
pub struct CategorySet {
    selected: Vec<Category>,
}

impl CategorySet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, category: Category) -> SelectOutcome {
        if self.contains(category) {
            SelectOutcome::AlreadySelected
        } else if self.is_full() {
            SelectOutcome::AtCapacity
        } else {
            self.selected.push(category);
            SelectOutcome::Added
        }
    }

    /// Removes a category, returning whether it was selected.
    pub fn remove(&mut self, category: Category) -> bool {
        let before = self.selected.len();
        self.selected.retain(|c| *c != category);
        before != self.selected.len()
    }

    pub fn contains(&self, category: Category) -> bool {
        self.selected.contains(&category)
    }

    pub fn len(&self) -> usize {
        self.selected.len()
    }

    pub fn is_empty(&self) -> bool {
        self.selected.is_empty()
    }

    pub fn is_full(&self) -> bool {
        self.selected.len() >= MAX_CATEGORIES
    }

    pub fn clear(&mut self) {
        self.selected.clear();
    }

    pub fn iter(&self) -> impl Iterator<Item = Category> + '_ {
        self.selected.iter().copied()
    }

    /// Joins the selected names with `", "`, as used in the exported text block.
    pub fn to_joined_string(&self) -> String {
        self.selected
            .iter()
            .map(|c| c.name())
            .collect::<Vec<_>>()
            .join(", ")
    }

    /// Parses the output of [`CategorySet::to_joined_string`].
    ///
    /// Unknown names and more than `MAX_CATEGORIES` distinct names are errors.
    pub fn parse_joined(joined: &str) -> Result<Self, FieldViolation> {
        let mut set = CategorySet::new();
        for piece in joined.split(',').map(str::trim).filter(|p| !p.is_empty()) {
            let category = Category::from_name(piece).ok_or_else(|| {
                FieldViolation::new(
                    Field::Categories,
                    format!("Unknown category '{piece}'."),
                )
            })?;
            if set.insert(category) == SelectOutcome::AtCapacity {
                return Err(FieldViolation::new(
                    Field::Categories,
                    CATEGORIES_TOO_MANY,
                ));
            }
        }
        Ok(set)
    }
}

impl PartialEq for CategorySet {
    fn eq(&self, other: &Self) -> bool {
        self.len() == other.len() && self.iter().all(|c| other.contains(c))
    }
}

impl TryFrom<Vec<Category>> for CategorySet {
    type Error = FieldViolation;

    fn try_from(categories: Vec<Category>) -> Result<Self, Self::Error> {
        let mut set = CategorySet::new();
        for category in categories {
            if set.insert(category) == SelectOutcome::AtCapacity {
                return Err(FieldViolation::new(
                    Field::Categories,
                    CATEGORIES_TOO_MANY,
                ));
            }
        }
        Ok(set)
    }
}

impl From<CategorySet> for Vec<Category> {
    fn from(set: CategorySet) -> Self {
        set.selected
    }
}

// --- Field violations ---

/// The four output fields.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Field {
    Title,
    Tags,
    Description,
    Categories,
}

impl Field {
    pub fn as_str(&self) -> &'static str {
        match self {
            Field::Title => "title",
            Field::Tags => "tags",
            Field::Description => "description",
            Field::Categories => "categories",
        }
    }
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A single broken rule on a single field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldViolation {
    pub field: Field,
    pub message: String,
}

impl FieldViolation {
    pub fn new(field: Field, message: impl Into<String>) -> Self {
        Self {
            field,
            message: message.into(),
        }
    }
}

impl fmt::Display for FieldViolation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.field, self.message)
    }
}

impl std::error::Error for FieldViolation {}

const TITLE_REQUIRED: &str = "Title is required.";
const TITLE_TOO_LONG: &str = "Title should be concise (max 100 characters).";
const TAGS_REQUIRED: &str = "Tags are required.";
const TAG_TOO_LONG: &str = "Each tag must be 50 characters or less.";
const TAGS_TOO_MANY: &str = "Up to 15 tags allowed.";
const DESCRIPTION_REQUIRED: &str = "Description is required.";
const DESCRIPTION_TOO_LONG: &str = "Description too long (max 5000 characters).";
const CATEGORIES_TOO_MANY: &str = "Select up to 2 categories.";

// --- Field validators ---

/// Splits a linearized tag string on commas, trims each piece, and drops empty pieces.
pub fn split_tags(tags: &str) -> Vec<&str> {
    tags.split(',')
        .map(str::trim)
        .filter(|tag| !tag.is_empty())
        .collect()
}

pub fn validate_title(title: &str) -> Vec<FieldViolation> {
    let mut violations = Vec::new();
    if title.trim().is_empty() {
        violations.push(FieldViolation::new(Field::Title, TITLE_REQUIRED));
    }
    if title.chars().count() > TITLE_MAX_CHARS {
        violations.push(FieldViolation::new(Field::Title, TITLE_TOO_LONG));
    }
    violations
}

pub fn validate_tags(tags: &str) -> Vec<FieldViolation> {
    let pieces = split_tags(tags);
    let mut violations = Vec::new();
    if pieces.is_empty() {
        violations.push(FieldViolation::new(Field::Tags, TAGS_REQUIRED));
    }
    if pieces.iter().any(|tag| tag.chars().count() > TAG_MAX_CHARS) {
        violations.push(FieldViolation::new(Field::Tags, TAG_TOO_LONG));
    }
    if pieces.len() > MAX_TAGS {
        violations.push(FieldViolation::new(Field::Tags, TAGS_TOO_MANY));
    }
    violations
}

pub fn validate_description(description: &str) -> Vec<FieldViolation> {
    let mut violations = Vec::new();
    if description.trim().is_empty() {
        violations.push(FieldViolation::new(
            Field::Description,
            DESCRIPTION_REQUIRED,
        ));
    }
    if description.chars().count() > DESCRIPTION_MAX_CHARS {
        violations.push(FieldViolation::new(
            Field::Description,
            DESCRIPTION_TOO_LONG,
        ));
    }
    violations
}

// --- Result types ---

/// A generation result that satisfies the output schema.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GenerationResult {
    pub title: String,
    pub tags: String,
    pub description: String,
    pub categories: CategorySet,
}

/// The untrusted wire shape of a generation result, as produced by an AI provider
/// or received over HTTP. It becomes a [`GenerationResult`] only through
/// [`OutputSchema::conform`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawGenerationResult {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub tags: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub categories: Vec<String>,
}

impl From<GenerationResult> for RawGenerationResult {
    fn from(result: GenerationResult) -> Self {
        Self {
            title: result.title,
            tags: result.tags,
            description: result.description,
            categories: result
                .categories
                .iter()
                .map(|c| c.name().to_string())
                .collect(),
        }
    }
}

/// A successfully conformed result, plus the category strings that were dropped
/// because they are not part of the enumeration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Conformed {
    pub result: GenerationResult,
    pub discarded_categories: Vec<String>,
}

// --- Schemas ---

/// The input schema: a single required data URI.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerationInput {
    #[serde(default)]
    pub artwork_data_uri: Option<String>,
}

impl GenerationInput {
    /// Returns the data URI, or a validation error if it is absent or blank.
    pub fn require_data_uri(&self) -> Result<&str, MetadataError> {
        match self.artwork_data_uri.as_deref().map(str::trim) {
            Some(uri) if !uri.is_empty() => Ok(uri),
            _ => Err(MetadataError::Validation(
                MISSING_DATA_URI_MESSAGE.to_string(),
            )),
        }
    }

    pub fn json_schema() -> Value {
        json!({
            "type": "object",
            "properties": {
                "artworkDataUri": {
                    "type": "string",
                    "description": "A photo of the artwork, as a data URI that must include a MIME type and use Base64 encoding. Expected format: 'data:<mimetype>;base64,<encoded_data>'."
                }
            },
            "required": ["artworkDataUri"]
        })
    }
}

/// The output schema and its conformance policy.
pub struct OutputSchema;

impl OutputSchema {
    /// The JSON Schema declared to the AI provider as the required response shape.
    pub fn json_schema() -> Value {
        let category_names: Vec<&str> = Category::ALL.iter().map(|c| c.name()).collect();
        json!({
            "type": "object",
            "properties": {
                "title": {
                    "type": "string",
                    "description": "A descriptive title (4-8 words) that clearly explains the artwork",
                    "maxLength": TITLE_MAX_CHARS
                },
                "tags": {
                    "type": "string",
                    "description": format!(
                        "Up to {MAX_TAGS} relevant tags (maximum {TAG_MAX_CHARS} characters per tag), separated by commas"
                    )
                },
                "description": {
                    "type": "string",
                    "description": "An engaging description that tells the story or meaning behind the artwork",
                    "maxLength": DESCRIPTION_MAX_CHARS
                },
                "categories": {
                    "type": "array",
                    "description": format!(
                        "Up to {MAX_CATEGORIES} media categories that best match the artwork"
                    ),
                    "items": { "type": "string", "enum": category_names },
                    "maxItems": MAX_CATEGORIES
                }
            },
            "required": ["title", "tags", "description", "categories"],
            "additionalProperties": false
        })
    }

    /// Checks an already typed result against the text limits.
    pub fn validate(result: &GenerationResult) -> Result<(), Vec<FieldViolation>> {
        let mut violations = validate_title(&result.title);
        violations.extend(validate_tags(&result.tags));
        violations.extend(validate_description(&result.description));
        if violations.is_empty() {
            Ok(())
        } else {
            Err(violations)
        }
    }

    /// Turns an untrusted result into a [`GenerationResult`].
    ///
    /// Text fields are trimmed. Category strings outside the enumeration are
    /// discarded and duplicates collapse. Every other out-of-bounds value is a
    /// violation; nothing is truncated.
    pub fn conform(raw: RawGenerationResult) -> Result<Conformed, Vec<FieldViolation>> {
        let mut known = Vec::new();
        let mut discarded_categories = Vec::new();
        for name in raw.categories {
            match Category::from_name(&name) {
                Some(category) if !known.contains(&category) => known.push(category),
                Some(_) => {}
                None => discarded_categories.push(name),
            }
        }

        let result_categories = CategorySet::try_from(known);

        let result = GenerationResult {
            title: raw.title.trim().to_string(),
            tags: raw.tags.trim().to_string(),
            description: raw.description.trim().to_string(),
            categories: result_categories.clone().unwrap_or_default(),
        };

        let mut violations = Self::validate(&result).err().unwrap_or_default();
        if let Err(violation) = result_categories {
            violations.push(violation);
        }

        if violations.is_empty() {
            Ok(Conformed {
                result,
                discarded_categories,
            })
        } else {
            Err(violations)
        }
    }
}
