//! # Artwork Listing Metadata
//!
//! This crate turns an artwork image into marketplace-ready listing metadata (title,
//! tags, description and up to two media categories) using a configurable AI provider,
//! and keeps that metadata inside the marketplace's limits on both sides of the wire.
//!
//! - [`schema`]: the output contract and its conformance policy.
//! - [`MetadataClient`]: the generation invoker.
//! - [`form`]: client-side form state, validation and export.

pub mod client;
pub mod data_uri;
pub mod errors;
pub mod form;
pub mod prompts;
pub mod providers;
pub mod schema;
pub mod types;

pub use client::parse_raw_result;
pub use data_uri::{ArtworkImage, ImageFormat};
pub use errors::{ErrorKind, MetadataError};
pub use schema::{Category, CategorySet, GenerationResult, OutputSchema, RawGenerationResult};
pub use types::{GenerationRequest, MetadataClient, MetadataClientBuilder, ProviderConfig};
