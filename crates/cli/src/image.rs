//! Reads artwork files from disk and encodes them for the generation endpoint.

use anyhow::{Context, Result};
use artmeta::ArtworkImage;
use std::path::Path;

/// An image file ready to be selected in the form.
#[derive(Debug, Clone)]
pub struct EncodedImage {
    pub name: String,
    pub data_uri: String,
}

/// Reads `path` and encodes it as a data URI. The MIME type comes from the file
/// signature, not the extension.
pub fn encode_image_file(path: &Path) -> Result<EncodedImage> {
    let bytes = std::fs::read(path)
        .with_context(|| format!("Failed to read image file '{}'", path.display()))?;
    let image = ArtworkImage::from_bytes(bytes)
        .with_context(|| format!("'{}' is not a supported image", path.display()))?;

    let name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string());

    Ok(EncodedImage {
        name,
        data_uri: image.to_data_uri(),
    })
}
