use crate::{
    errors::MetadataError,
    prompts::{
        metadata::{render_user_prompt, METADATA_SYSTEM_PROMPT, METADATA_USER_PROMPT},
        Instructions,
    },
    providers::ai::AiProvider,
};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::Duration;

/// The default model used when a provider configuration names none.
pub const DEFAULT_MODEL_NAME: &str = "gemini-2.0-flash";

/// How long a single generation may take before it is abandoned.
pub const DEFAULT_GENERATION_TIMEOUT: Duration = Duration::from_secs(60);

fn default_provider() -> String {
    "gemini".to_string()
}

/// Configuration for a single AI provider.
#[derive(Deserialize, Serialize, Debug, Clone, PartialEq, Eq)]
pub struct ProviderConfig {
    /// `gemini` or `local`.
    #[serde(default = "default_provider")]
    pub provider: String,
    #[serde(default)]
    pub api_url: Option<String>,
    #[serde(default)]
    pub api_key: Option<String>,
    #[serde(default)]
    pub model_name: Option<String>,
}

impl Default for ProviderConfig {
    fn default() -> Self {
        Self {
            provider: default_provider(),
            api_url: None,
            api_key: None,
            model_name: None,
        }
    }
}

impl ProviderConfig {
    pub fn model_name(&self) -> &str {
        self.model_name.as_deref().unwrap_or(DEFAULT_MODEL_NAME)
    }
}

/// A request to generate listing metadata for one artwork image.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerationRequest {
    pub artwork_data_uri: String,
}

impl GenerationRequest {
    pub fn new(artwork_data_uri: impl Into<String>) -> Self {
        Self {
            artwork_data_uri: artwork_data_uri.into(),
        }
    }
}

/// The generation invoker: turns an artwork image into conformed listing metadata.
///
/// Holds no per-request state and can be shared across concurrent requests.
#[derive(Clone)]
pub struct MetadataClient {
    pub(crate) ai_provider: Box<dyn AiProvider>,
    pub(crate) instructions: Instructions,
    pub(crate) timeout: Duration,
}

impl fmt::Debug for MetadataClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MetadataClient")
            .field("ai_provider", &self.ai_provider)
            .field("timeout", &self.timeout)
            .finish_non_exhaustive()
    }
}

impl MetadataClient {
    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    pub fn instructions(&self) -> &Instructions {
        &self.instructions
    }
}

/// A builder for creating `MetadataClient` instances.
#[derive(Default)]
pub struct MetadataClientBuilder {
    ai_provider: Option<Box<dyn AiProvider>>,
    timeout: Option<Duration>,
    system_prompt: Option<String>,
    user_prompt_template: Option<String>,
}

impl MetadataClientBuilder {
    /// Creates a new `MetadataClientBuilder`.
    ///
    /// # Examples
    ///
    /// ```
    /// use artmeta::MetadataClientBuilder;
    ///
    /// let builder = MetadataClientBuilder::new();
    /// ```
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the AI provider.
    pub fn ai_provider(mut self, ai_provider: Box<dyn AiProvider>) -> Self {
        self.ai_provider = Some(ai_provider);
        self
    }

    /// Sets the per-generation timeout.
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Overrides the system prompt.
    pub fn system_prompt(mut self, system_prompt: impl Into<String>) -> Self {
        self.system_prompt = Some(system_prompt.into());
        self
    }

    /// Overrides the user prompt template. Placeholders are rendered at build time.
    pub fn user_prompt_template(mut self, template: impl Into<String>) -> Self {
        self.user_prompt_template = Some(template.into());
        self
    }

    /// Builds the `MetadataClient`.
    ///
    /// Fails with [`MetadataError::MissingAiProvider`] if no provider was set.
    pub fn build(self) -> Result<MetadataClient, MetadataError> {
        let ai_provider = self.ai_provider.ok_or_else(|| {
            MetadataError::MissingAiProvider("AI provider must be set".to_string())
        })?;

        let template = self
            .user_prompt_template
            .as_deref()
            .unwrap_or(METADATA_USER_PROMPT);

        Ok(MetadataClient {
            ai_provider,
            instructions: Instructions {
                system_prompt: self
                    .system_prompt
                    .unwrap_or_else(|| METADATA_SYSTEM_PROMPT.to_string()),
                user_prompt: render_user_prompt(template),
            },
            timeout: self.timeout.unwrap_or(DEFAULT_GENERATION_TIMEOUT),
        })
    }
}
