//! # Common Test Utilities
//!
//! This module centralizes the test harness used across the `artmeta-server`
//! integration tests.
//!
//! - `TestApp`: spawns a real server on a random port, either around a programmable
//!   `MockAiProvider` or from a config file whose local provider points at an
//!   `httpmock::MockServer`.

// Allow unused code because this is a test utility module, and not all
// functions might be used by every test file that includes it.
#![allow(unused)]

use anyhow::Result;
use artmeta::MetadataClientBuilder;
use artmeta_server::{
    config::{self, AppConfig},
    router,
    state::{build_app_state, AppState},
};
use artmeta_test_utils::MockAiProvider;
use axum::serve;
use httpmock::MockServer;
use reqwest::Client;
use std::{fs::File, io::Write, net::SocketAddr, time::Duration};
use tempfile::{tempdir, TempDir};
use tokio::{net::TcpListener, task::JoinHandle};

/// A base configuration for harnesses that inject their own provider.
pub fn test_config() -> AppConfig {
    AppConfig {
        port: 0,
        max_body_bytes: 20 * 1024 * 1024,
        expose_error_details: false,
        request_timeout_secs: 5,
        provider: Default::default(),
        prompt_override: None,
        system_prompt_override: None,
    }
}

// --- Full Application Test Harness ---

/// A harness for end-to-end testing of the Axum server.
pub struct TestApp {
    pub address: String,
    pub client: Client,
    pub mock_server: Option<MockServer>,
    pub app_state: AppState,
    _config_dir: Option<TempDir>,
    _server_handle: JoinHandle<()>,
    shutdown_tx: Option<tokio::sync::oneshot::Sender<()>>,
}

impl TestApp {
    /// Spawns the server from a config file whose local provider points at a mock
    /// OpenAI-compatible endpoint.
    pub async fn spawn() -> Result<Self> {
        let mock_server = MockServer::start();

        let config_dir = tempdir()?;
        let config_path = config_dir.path().join("config.yml");
        let config_content = format!(
            r#"
port: 0
request_timeout_secs: 5
provider:
  provider: "local"
  api_url: "{}"
  api_key: null
  model_name: "mock-vision-model"
"#,
            mock_server.url("/v1/chat/completions")
        );
        let mut file = File::create(&config_path)?;
        file.write_all(config_content.as_bytes())?;

        let config = config::get_config(Some(config_path.to_str().unwrap()))?;
        let app_state = build_app_state(config).await?;

        let mut app = TestApp::spawn_with_state(app_state).await?;
        app.mock_server = Some(mock_server);
        app._config_dir = Some(config_dir);
        Ok(app)
    }

    /// Spawns the server around a `MockAiProvider`.
    pub async fn spawn_with_provider(mock: MockAiProvider, config: AppConfig) -> Result<Self> {
        let client = MetadataClientBuilder::new()
            .ai_provider(Box::new(mock))
            .timeout(config.request_timeout())
            .build()?;
        TestApp::spawn_with_state(AppState::new(config, client)).await
    }

    pub async fn spawn_with_state(app_state: AppState) -> Result<Self> {
        let _ = tracing_subscriber::fmt()
            .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
            .compact()
            .try_init();

        let app_state_for_harness = app_state.clone();

        let listener = TcpListener::bind("127.0.0.1:0").await?;
        let addr: SocketAddr = listener.local_addr()?;
        let address = format!("http://{addr}");

        let (shutdown_tx, shutdown_rx) = tokio::sync::oneshot::channel();
        let server_handle = tokio::spawn(async move {
            let app = router::create_router(app_state);
            let server = serve(listener, app).with_graceful_shutdown(async {
                shutdown_rx.await.ok();
            });
            if let Err(e) = server.await {
                tracing::error!("[TestApp] Server error: {}", e);
            }
        });

        tokio::time::sleep(Duration::from_millis(100)).await;

        Ok(Self {
            address,
            client: Client::new(),
            mock_server: None,
            app_state: app_state_for_harness,
            _config_dir: None,
            _server_handle: server_handle,
            shutdown_tx: Some(shutdown_tx),
        })
    }

    pub fn url(&self, path: &str) -> String {
        format!("{}{path}", self.address)
    }
}

impl Drop for TestApp {
    fn drop(&mut self) {
        if let Some(tx) = self.shutdown_tx.take() {
            let _ = tx.send(());
        }
    }
}
