//! # Application State
//!
//! This module defines the shared application state (`AppState`) and the logic
//! for building it at startup. The state is immutable after startup: the
//! generation invoker and the configuration it was built from.

use crate::config::AppConfig;
use artmeta::{providers::factory::create_provider, MetadataClient, MetadataClientBuilder};
use std::sync::Arc;
use tracing::info;

/// The shared application state, accessible from all request handlers.
#[derive(Clone, Debug)]
pub struct AppState {
    /// The application's configuration.
    pub config: Arc<AppConfig>,
    /// The generation invoker shared by all requests.
    pub metadata_client: Arc<MetadataClient>,
}

impl AppState {
    /// Builds a state around an already constructed client.
    pub fn new(config: AppConfig, metadata_client: MetadataClient) -> Self {
        Self {
            config: Arc::new(config),
            metadata_client: Arc::new(metadata_client),
        }
    }
}

/// Builds the shared application state from the configuration.
///
/// This instantiates the configured AI provider and wraps it in a `MetadataClient`
/// with the configured deadline and prompt overrides.
pub async fn build_app_state(config: AppConfig) -> anyhow::Result<AppState> {
    let ai_provider = create_provider(&config.provider)?;
    info!(
        provider = %config.provider.provider,
        model = config.provider.model_name(),
        "AI provider configured."
    );

    let mut builder = MetadataClientBuilder::new()
        .ai_provider(ai_provider)
        .timeout(config.request_timeout());
    if let Some(system_prompt) = &config.system_prompt_override {
        builder = builder.system_prompt(system_prompt.clone());
    }
    if let Some(template) = &config.prompt_override {
        builder = builder.user_prompt_template(template.clone());
    }

    Ok(AppState::new(config, builder.build()?))
}
