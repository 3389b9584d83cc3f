use artmeta::data_uri::ArtworkImage;
use artmeta::errors::MetadataError;
use artmeta::prompts::Instructions;
use artmeta::providers::ai::AiProvider;
use artmeta::schema::RawGenerationResult;
use async_trait::async_trait;
use base64::{engine::general_purpose::STANDARD, Engine};
use serde_json::Value;
use std::collections::VecDeque;
use std::fmt::Debug;
use std::sync::{Arc, Mutex};
use std::time::Duration;

// --- Fixtures ---

/// A complete 1x1 transparent PNG.
pub const SAMPLE_PNG: &[u8] = &[
    0x89, 0x50, 0x4E, 0x47, 0x0D, 0x0A, 0x1A, 0x0A, 0x00, 0x00, 0x00, 0x0D, 0x49, 0x48, 0x44,
    0x52, 0x00, 0x00, 0x00, 0x01, 0x00, 0x00, 0x00, 0x01, 0x08, 0x06, 0x00, 0x00, 0x00, 0x1F,
    0x15, 0xC4, 0x89, 0x00, 0x00, 0x00, 0x0A, 0x49, 0x44, 0x41, 0x54, 0x78, 0x9C, 0x63, 0x00,
    0x01, 0x00, 0x00, 0x05, 0x00, 0x01, 0x0D, 0x0A, 0x2D, 0xB4, 0x00, 0x00, 0x00, 0x00, 0x49,
    0x45, 0x4E, 0x44, 0xAE, 0x42, 0x60, 0x82,
];

/// The sample PNG as a data URI.
pub fn sample_png_data_uri() -> String {
    format!("data:image/png;base64,{}", STANDARD.encode(SAMPLE_PNG))
}

/// A raw result that conforms to the output schema.
pub fn sample_raw_result() -> RawGenerationResult {
    RawGenerationResult {
        title: "Moonlit Fox Wandering Through Birch Forest".to_string(),
        tags: "fox, moonlight, birch forest, night, woodland animal, nature art".to_string(),
        description: "A lone red fox pauses beneath a silver moon, surrounded by the pale trunks of a quiet birch forest.".to_string(),
        categories: vec!["Painting & Mixed Media".to_string(), "Drawing".to_string()],
    }
}

/// `sample_raw_result` serialized the way a provider would return it.
pub fn sample_result_json() -> String {
    serde_json::to_string(&sample_raw_result()).unwrap_or_default()
}

// --- Mock AI Provider ---

#[derive(Clone, Debug)]
enum MockReply {
    Text(String),
    Failure { status: u16, body: String },
    Delayed(Duration, String),
}

/// One recorded `generate_structured` call.
#[derive(Clone, Debug)]
pub struct RecordedCall {
    pub mime_type: String,
    pub image_len: usize,
    pub instructions: Instructions,
    pub output_schema: Value,
}

/// A programmable `AiProvider`.
///
/// Queued replies are served first, in order; after that the fallback reply (if any)
/// is returned for every call. Calls are recorded for assertions.
#[derive(Clone, Debug)]
pub struct MockAiProvider {
    replies: Arc<Mutex<VecDeque<MockReply>>>,
    fallback: Arc<Mutex<Option<MockReply>>>,
    calls: Arc<Mutex<Vec<RecordedCall>>>,
}

impl MockAiProvider {
    pub fn new() -> Self {
        Self {
            replies: Arc::new(Mutex::new(VecDeque::new())),
            fallback: Arc::new(Mutex::new(None)),
            calls: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// A provider that always answers with `response`.
    pub fn with_response(response: &str) -> Self {
        let mock = Self::new();
        *mock.fallback.lock().unwrap() = Some(MockReply::Text(response.to_string()));
        mock
    }

    /// A provider that always fails as an unavailable upstream.
    pub fn unavailable() -> Self {
        let mock = Self::new();
        *mock.fallback.lock().unwrap() = Some(MockReply::Failure {
            status: 503,
            body: "upstream model is overloaded".to_string(),
        });
        mock
    }

    /// Queues a single response.
    pub fn add_response(&self, response: &str) {
        self.push(MockReply::Text(response.to_string()));
    }

    /// Queues a single API failure.
    pub fn add_failure(&self, status: u16, body: &str) {
        self.push(MockReply::Failure {
            status,
            body: body.to_string(),
        });
    }

    /// Queues a response that is only returned after `delay`.
    pub fn add_delayed_response(&self, delay: Duration, response: &str) {
        self.push(MockReply::Delayed(delay, response.to_string()));
    }

    /// Retrieves the recorded calls for assertion.
    pub fn get_calls(&self) -> Vec<RecordedCall> {
        self.calls.lock().unwrap().clone()
    }

    pub fn call_count(&self) -> usize {
        self.calls.lock().unwrap().len()
    }

    fn push(&self, reply: MockReply) {
        self.replies.lock().unwrap().push_back(reply);
    }
}

impl Default for MockAiProvider {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl AiProvider for MockAiProvider {
    async fn generate_structured(
        &self,
        image: &ArtworkImage,
        instructions: &Instructions,
        output_schema: &Value,
    ) -> Result<String, MetadataError> {
        self.calls.lock().unwrap().push(RecordedCall {
            mime_type: image.mime_type().to_string(),
            image_len: image.len(),
            instructions: instructions.clone(),
            output_schema: output_schema.clone(),
        });

        let reply = {
            let queued = self.replies.lock().unwrap().pop_front();
            queued.or_else(|| self.fallback.lock().unwrap().clone())
        };

        match reply {
            Some(MockReply::Text(text)) => Ok(text),
            Some(MockReply::Failure { status, body }) => Err(MetadataError::AiApi { status, body }),
            Some(MockReply::Delayed(delay, text)) => {
                tokio::time::sleep(delay).await;
                Ok(text)
            }
            None => Err(MetadataError::AiApi {
                status: 500,
                body: "MockAiProvider: no response programmed".to_string(),
            }),
        }
    }
}
