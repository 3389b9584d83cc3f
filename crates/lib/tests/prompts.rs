//! # Prompt Rendering Tests
//!
//! Validates that the metadata instruction template is rendered from the schema limits
//! and that overrides supplied through the builder are rendered the same way.

use artmeta::prompts::metadata::{render_user_prompt, METADATA_SYSTEM_PROMPT, METADATA_USER_PROMPT};
use artmeta::schema::{Category, MAX_CATEGORIES, MAX_TAGS, TAG_MAX_CHARS, TITLE_MAX_CHARS};
use artmeta::MetadataClientBuilder;
use artmeta_test_utils::MockAiProvider;

/// Verifies that every placeholder in the default template is replaced.
#[test]
fn test_default_template_has_no_placeholders_left() {
    let rendered = render_user_prompt(METADATA_USER_PROMPT);
    for placeholder in [
        "{max_tags}",
        "{tag_max_chars}",
        "{title_max_chars}",
        "{description_max_chars}",
        "{max_categories}",
        "{categories}",
    ] {
        assert!(
            !rendered.contains(placeholder),
            "placeholder {placeholder} was not rendered"
        );
    }
}

/// Verifies that the rendered prompt states the same limits the schema enforces.
#[test]
fn test_rendered_prompt_states_schema_limits() {
    let rendered = render_user_prompt(METADATA_USER_PROMPT);
    assert!(rendered.contains(&format!("Up to {MAX_TAGS} relevant tags")));
    assert!(rendered.contains(&format!("maximum {TAG_MAX_CHARS} characters per tag")));
    assert!(rendered.contains(&format!("at most {TITLE_MAX_CHARS} characters")));
    assert!(rendered.contains(&format!("select up to {MAX_CATEGORIES}")));
    assert!(rendered.contains("4-8 words"));
}

/// Verifies that every category name appears verbatim, in order.
#[test]
fn test_rendered_prompt_lists_all_categories() {
    let rendered = render_user_prompt(METADATA_USER_PROMPT);
    assert!(rendered.contains(
        "Photography, Design & Illustration, Painting & Mixed Media, Drawing, Digital Art"
    ));
    for category in Category::ALL {
        assert!(rendered.contains(category.name()));
    }
}

/// Verifies that the prompt echoes the expected output shape.
#[test]
fn test_prompt_echoes_output_shape() {
    assert!(METADATA_USER_PROMPT.contains("\"categories\": []"));
    assert!(METADATA_SYSTEM_PROMPT.contains("print-on-demand"));
}

/// Verifies that the client builder renders the default template and applies overrides.
#[test]
fn test_builder_renders_instruction_overrides() {
    let client = MetadataClientBuilder::new()
        .ai_provider(Box::new(MockAiProvider::new()))
        .build()
        .unwrap();
    assert_eq!(
        client.instructions().user_prompt,
        render_user_prompt(METADATA_USER_PROMPT)
    );
    assert_eq!(client.instructions().system_prompt, METADATA_SYSTEM_PROMPT);

    let client = MetadataClientBuilder::new()
        .ai_provider(Box::new(MockAiProvider::new()))
        .system_prompt("You are terse.")
        .user_prompt_template("Pick at most {max_categories} of: {categories}")
        .build()
        .unwrap();
    assert_eq!(client.instructions().system_prompt, "You are terse.");
    assert_eq!(
        client.instructions().user_prompt,
        "Pick at most 2 of: Photography, Design & Illustration, Painting & Mixed Media, Drawing, Digital Art"
    );
}
