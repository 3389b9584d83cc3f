use artmeta::GenerationResult;
use serde::{Deserialize, Serialize};

/// The body of `GET /`.
#[derive(Debug, Serialize, Deserialize)]
pub struct StatusResponse {
    pub status: String,
    pub message: String,
    pub timestamp: String,
}

/// The success envelope of `POST /api/generate-metadata`.
#[derive(Debug, Serialize, Deserialize)]
pub struct GenerateMetadataResponse {
    pub status: String,
    pub data: GenerationResult,
}

impl GenerateMetadataResponse {
    pub fn success(data: GenerationResult) -> Self {
        Self {
            status: "success".to_string(),
            data,
        }
    }
}
