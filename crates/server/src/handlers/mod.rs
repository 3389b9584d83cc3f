//! # API Route Handlers
//!
//! This module organizes all the Axum route handlers for the `artmeta-server`.

pub mod general;
pub mod metadata;

// Re-export all handlers from the sub-modules to make them easily accessible
// to the router under a single `handlers::` path.
pub use general::*;
pub use metadata::*;

// Shared items used by multiple handler modules.
use super::{errors::AppError, state::AppState};
