//! # AI Provider Factory
//!
//! Builds a boxed [`AiProvider`] from a [`ProviderConfig`]. Living in the `lib` crate
//! lets the server, the CLI and tests share one construction path.

use crate::{
    errors::MetadataError,
    providers::ai::{gemini::GeminiProvider, local::LocalAiProvider, AiProvider},
    types::ProviderConfig,
};
use tracing::info;

/// Creates an AI provider instance from configuration.
///
/// - `gemini` requires an API key; the URL is derived from the model name when absent.
/// - `local` requires an API URL; the key and model are optional.
pub fn create_provider(config: &ProviderConfig) -> Result<Box<dyn AiProvider>, MetadataError> {
    let provider: Box<dyn AiProvider> = match config.provider.trim().to_ascii_lowercase().as_str()
    {
        "gemini" => {
            let api_key = config
                .api_key
                .clone()
                .filter(|k| !k.trim().is_empty())
                .ok_or_else(|| {
                    MetadataError::MissingAiProvider(
                        "api_key is required for the gemini provider. Set AI_API_KEY in your .env file."
                            .to_string(),
                    )
                })?;
            let api_url = config
                .api_url
                .clone()
                .unwrap_or_else(|| GeminiProvider::default_api_url(config.model_name()));
            info!("Configuring Gemini provider with URL: {}", api_url);
            Box::new(GeminiProvider::new(api_url, api_key)?)
        }
        "local" => {
            let api_url = config.api_url.clone().ok_or_else(|| {
                MetadataError::MissingAiProvider(
                    "api_url is required for the local provider. Set AI_API_URL in your .env file."
                        .to_string(),
                )
            })?;
            info!("Configuring Local AI provider with URL: {}", api_url);
            Box::new(LocalAiProvider::new(
                api_url,
                config.api_key.clone(),
                config.model_name.clone(),
            )?)
        }
        other => {
            return Err(MetadataError::MissingAiProvider(format!(
                "Unsupported AI provider: '{other}'. Expected 'gemini' or 'local'."
            )))
        }
    };

    Ok(provider)
}
