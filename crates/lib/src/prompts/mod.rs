//! # Prompt Template Modules
//!
//! This module organizes the prompt templates used by the `artmeta` library.

pub mod metadata;

/// The fully rendered instruction pair handed to an AI provider.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Instructions {
    pub system_prompt: String,
    pub user_prompt: String,
}
