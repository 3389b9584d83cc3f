pub mod gemini;
pub mod local;

use crate::{data_uri::ArtworkImage, errors::MetadataError, prompts::Instructions};
use async_trait::async_trait;
use dyn_clone::DynClone;
use serde_json::Value;
use std::fmt::Debug;
use std::time::Duration;

/// Upper bound on a single provider HTTP exchange. The invoker applies its own,
/// usually shorter, deadline on top of this.
pub const PROVIDER_HTTP_TIMEOUT: Duration = Duration::from_secs(120);

/// A trait for interacting with a generative AI provider.
///
/// This is the whole capability boundary: given an image, an instruction set and the
/// required output shape, return the provider's structured text or fail. Providers do
/// not interpret the returned text; conformance is the caller's job.
#[async_trait]
pub trait AiProvider: Send + Sync + Debug + DynClone {
    /// Generates a structured (JSON) response describing `image`.
    async fn generate_structured(
        &self,
        image: &ArtworkImage,
        instructions: &Instructions,
        output_schema: &Value,
    ) -> Result<String, MetadataError>;
}

dyn_clone::clone_trait_object!(AiProvider);
