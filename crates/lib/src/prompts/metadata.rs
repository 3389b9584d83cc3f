//! # Listing Metadata Prompts
//!
//! The default instruction set sent alongside the artwork image. The user prompt
//! carries `{placeholders}` that are rendered from the schema limits, so the
//! guidance given to the model never drifts from what the schema enforces.

use crate::schema::{
    Category, DESCRIPTION_MAX_CHARS, MAX_CATEGORIES, MAX_TAGS, TAG_MAX_CHARS, TITLE_MAX_CHARS,
};

/// The system prompt: the persona and marketplace context.
pub const METADATA_SYSTEM_PROMPT: &str = r#"You are an AI assistant specialized in analyzing visual artwork and generating marketplace-ready metadata for a print-on-demand marketplace. You only describe what is visible in the attached image, and you always answer with a single JSON object."#;

/// The user prompt template.
///
/// Placeholders: `{max_tags}`, `{tag_max_chars}`, `{title_max_chars}`,
/// `{description_max_chars}`, `{max_categories}`, `{categories}`
pub const METADATA_USER_PROMPT: &str = r#"Analyze the attached artwork image and generate the following metadata elements:
1. A descriptive title (4-8 words, at most {title_max_chars} characters) that clearly explains the artwork
2. Up to {max_tags} relevant tags (maximum {tag_max_chars} characters per tag), separated by commas
3. An engaging description (at most {description_max_chars} characters) that tells the story or meaning behind the artwork
4. Identify which of the following media categories best match the artwork (select up to {max_categories}): {categories}

Consider these guidelines:
- The marketplace is a print-on-demand store where artists upload designs that can be printed on various products
- Effective metadata significantly impacts discoverability through search algorithms
- Titles should be descriptive yet concise (4-8 words)
- Tags should include relevant keywords that potential buyers might search for
- Descriptions should engage potential buyers by telling a story or explaining the meaning
- Media categories help the marketplace properly categorize the artwork; use the category names exactly as written
- Metadata should be unique and avoid generic terms that could apply to any artwork
- Your analysis must be based solely on visual elements present in the image
- Avoid making assumptions about the artist's intent unless visually evident

Output the title, tags, description, and categories as a JSON object.

{
  "title": "",
  "tags": "",
  "description": "",
  "categories": []
}"#;

/// Renders a user prompt template with the current schema limits.
pub fn render_user_prompt(template: &str) -> String {
    let categories = Category::ALL
        .iter()
        .map(|c| c.name())
        .collect::<Vec<_>>()
        .join(", ");
    template
        .replace("{max_tags}", &MAX_TAGS.to_string())
        .replace("{tag_max_chars}", &TAG_MAX_CHARS.to_string())
        .replace("{title_max_chars}", &TITLE_MAX_CHARS.to_string())
        .replace("{description_max_chars}", &DESCRIPTION_MAX_CHARS.to_string())
        .replace("{max_categories}", &MAX_CATEGORIES.to_string())
        .replace("{categories}", &categories)
}
