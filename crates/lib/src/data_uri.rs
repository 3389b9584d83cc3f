//! # Artwork Image Decoding
//!
//! Parses `data:<mime>;base64,<payload>` strings into an [`ArtworkImage`] and checks
//! that the payload really is one of the supported raster formats.

use crate::errors::MetadataError;
use base64::{engine::general_purpose::STANDARD, Engine};
use std::fmt;

/// BITMAPCOREHEADER through BITMAPV5HEADER.
const BMP_DIB_HEADER_SIZES: [u32; 6] = [12, 40, 52, 56, 108, 124];

/// Supported raster image formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImageFormat {
    Png,
    Jpeg,
    Gif,
    Webp,
    Bmp,
}

impl ImageFormat {
    pub const ALL: [ImageFormat; 5] = [
        ImageFormat::Png,
        ImageFormat::Jpeg,
        ImageFormat::Gif,
        ImageFormat::Webp,
        ImageFormat::Bmp,
    ];

    pub fn mime_type(&self) -> &'static str {
        match self {
            ImageFormat::Png => "image/png",
            ImageFormat::Jpeg => "image/jpeg",
            ImageFormat::Gif => "image/gif",
            ImageFormat::Webp => "image/webp",
            ImageFormat::Bmp => "image/bmp",
        }
    }

    /// Resolves a MIME type, case-insensitively. `image/jpg` is accepted as an alias.
    pub fn from_mime_type(mime: &str) -> Option<Self> {
        let mime = mime.trim().to_ascii_lowercase();
        if mime == "image/jpg" {
            return Some(ImageFormat::Jpeg);
        }
        Self::ALL.into_iter().find(|f| f.mime_type() == mime)
    }

    /// Detects the format from the leading file signature.
    pub fn sniff(bytes: &[u8]) -> Option<Self> {
        Self::ALL.into_iter().find(|f| f.matches(bytes))
    }

    /// Returns whether `bytes` starts with this format's signature.
    pub fn matches(&self, bytes: &[u8]) -> bool {
        match self {
            ImageFormat::Png => bytes.starts_with(&[0x89, b'P', b'N', b'G', 0x0D, 0x0A, 0x1A, 0x0A]),
            ImageFormat::Jpeg => bytes.starts_with(&[0xFF, 0xD8, 0xFF]),
            ImageFormat::Gif => bytes.starts_with(b"GIF87a") || bytes.starts_with(b"GIF89a"),
            ImageFormat::Webp => {
                bytes.len() >= 12 && &bytes[0..4] == b"RIFF" && &bytes[8..12] == b"WEBP"
            }
            ImageFormat::Bmp => {
                // "BM", zeroed reserved words, then a known DIB header size.
                bytes.len() >= 18
                    && bytes.starts_with(b"BM")
                    && bytes[6..10] == [0, 0, 0, 0]
                    && BMP_DIB_HEADER_SIZES
                        .contains(&u32::from_le_bytes([bytes[14], bytes[15], bytes[16], bytes[17]]))
            }
        }
    }

    fn supported_list() -> String {
        Self::ALL
            .iter()
            .map(|f| f.mime_type())
            .collect::<Vec<_>>()
            .join(", ")
    }
}

impl fmt::Display for ImageFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.mime_type())
    }
}

/// A decoded artwork image.
#[derive(Clone, PartialEq, Eq)]
pub struct ArtworkImage {
    format: ImageFormat,
    bytes: Vec<u8>,
}

impl fmt::Debug for ArtworkImage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ArtworkImage")
            .field("format", &self.format)
            .field("len", &self.bytes.len())
            .finish()
    }
}

impl ArtworkImage {
    /// Parses and validates a base64 data URI.
    pub fn from_data_uri(data_uri: &str) -> Result<Self, MetadataError> {
        let data_uri = data_uri.trim();
        let rest = strip_prefix_ignore_case(data_uri, "data:").ok_or_else(|| {
            MetadataError::Validation(
                "Artwork must be a data URI of the form 'data:<mimetype>;base64,<encoded_data>'"
                    .to_string(),
            )
        })?;

        let (header, payload) = rest.split_once(',').ok_or_else(|| {
            MetadataError::Validation("Artwork data URI has no payload".to_string())
        })?;

        let mut params = header.split(';');
        let mime = params.next().unwrap_or_default();
        let is_base64 = params.any(|p| p.trim().eq_ignore_ascii_case("base64"));
        if !is_base64 {
            return Err(MetadataError::Validation(
                "Artwork data URI must use base64 encoding".to_string(),
            ));
        }

        let format = ImageFormat::from_mime_type(mime).ok_or_else(|| {
            MetadataError::Validation(format!(
                "Unsupported artwork image type '{}'. Supported types: {}",
                mime.trim(),
                ImageFormat::supported_list()
            ))
        })?;

        let compact: String = payload.chars().filter(|c| !c.is_whitespace()).collect();
        let bytes = STANDARD.decode(compact.as_bytes()).map_err(|e| {
            MetadataError::Validation(format!("Artwork data URI is not valid base64: {e}"))
        })?;

        if bytes.is_empty() {
            return Err(MetadataError::Validation(
                "Artwork data URI contains no image data".to_string(),
            ));
        }
        if !format.matches(&bytes) {
            return Err(MetadataError::Validation(format!(
                "Artwork image data does not match its declared type {format}"
            )));
        }

        Ok(Self { format, bytes })
    }

    /// Builds an image from raw file bytes, detecting the format from its signature.
    pub fn from_bytes(bytes: Vec<u8>) -> Result<Self, MetadataError> {
        let format = ImageFormat::sniff(&bytes).ok_or_else(|| {
            MetadataError::Validation(format!(
                "Unrecognized image format. Supported types: {}",
                ImageFormat::supported_list()
            ))
        })?;
        Ok(Self { format, bytes })
    }

    pub fn format(&self) -> ImageFormat {
        self.format
    }

    pub fn mime_type(&self) -> &'static str {
        self.format.mime_type()
    }

    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }

    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    pub fn to_base64(&self) -> String {
        STANDARD.encode(&self.bytes)
    }

    pub fn to_data_uri(&self) -> String {
        format!("data:{};base64,{}", self.mime_type(), self.to_base64())
    }
}

fn strip_prefix_ignore_case<'a>(s: &'a str, prefix: &str) -> Option<&'a str> {
    let head = s.get(..prefix.len())?;
    head.eq_ignore_ascii_case(prefix).then(|| &s[prefix.len()..])
}

#[cfg(test)]
mod tests {
    use super::*;

    const PNG_HEADER: [u8; 8] = [0x89, b'P', b'N', b'G', 0x0D, 0x0A, 0x1A, 0x0A];

    fn png_uri() -> String {
        format!("data:image/png;base64,{}", STANDARD.encode(PNG_HEADER))
    }

    #[test]
    fn test_parses_png_data_uri() {
        let image = ArtworkImage::from_data_uri(&png_uri()).unwrap();
        assert_eq!(image.format(), ImageFormat::Png);
        assert_eq!(image.bytes(), &PNG_HEADER);
        assert_eq!(image.to_data_uri(), png_uri());
    }

    #[test]
    fn test_accepts_uppercase_scheme_and_jpg_alias() {
        let uri = format!(
            "DATA:image/JPG;base64,{}",
            STANDARD.encode([0xFF, 0xD8, 0xFF, 0xE0])
        );
        let image = ArtworkImage::from_data_uri(&uri).unwrap();
        assert_eq!(image.mime_type(), "image/jpeg");
    }

    #[test]
    fn test_ignores_extra_parameters_and_whitespace() {
        let encoded = STANDARD.encode(b"GIF89a....");
        let (a, b) = encoded.split_at(4);
        let uri = format!("data:image/gif;name=art.gif;base64,{a}\n{b}");
        assert_eq!(
            ArtworkImage::from_data_uri(&uri).unwrap().format(),
            ImageFormat::Gif
        );
    }

    #[test]
    fn test_rejects_non_data_uri() {
        let err = ArtworkImage::from_data_uri("https://example.com/art.png").unwrap_err();
        assert!(matches!(err, MetadataError::Validation(_)));
    }

    #[test]
    fn test_rejects_unsupported_mime() {
        let uri = format!("data:image/svg+xml;base64,{}", STANDARD.encode("<svg/>"));
        let err = ArtworkImage::from_data_uri(&uri).unwrap_err();
        assert!(err.to_string().contains("Unsupported artwork image type 'image/svg+xml'"));
    }

    #[test]
    fn test_rejects_non_base64_encoding() {
        let err = ArtworkImage::from_data_uri("data:image/png,plain").unwrap_err();
        assert!(err.to_string().contains("base64"));
    }

    #[test]
    fn test_rejects_empty_and_invalid_payloads() {
        assert!(ArtworkImage::from_data_uri("data:image/png;base64,").is_err());
        assert!(ArtworkImage::from_data_uri("data:image/png;base64,@@@").is_err());
    }

    #[test]
    fn test_rejects_mismatched_signature() {
        let uri = format!("data:image/png;base64,{}", STANDARD.encode("not a png"));
        let err = ArtworkImage::from_data_uri(&uri).unwrap_err();
        assert!(err.to_string().contains("does not match its declared type image/png"));
    }

    #[test]
    fn test_webp_signature() {
        let mut bytes = b"RIFF".to_vec();
        bytes.extend_from_slice(&[0, 0, 0, 0]);
        bytes.extend_from_slice(b"WEBPVP8 ");
        assert_eq!(ImageFormat::sniff(&bytes), Some(ImageFormat::Webp));
        assert_eq!(ImageFormat::sniff(b"RIFF"), None);
    }

    fn bmp_header() -> Vec<u8> {
        let mut bytes = b"BM".to_vec();
        bytes.extend_from_slice(&70u32.to_le_bytes());
        bytes.extend_from_slice(&[0, 0, 0, 0]);
        bytes.extend_from_slice(&54u32.to_le_bytes());
        bytes.extend_from_slice(&40u32.to_le_bytes());
        bytes
    }

    #[test]
    fn test_from_bytes_sniffs_format() {
        let image = ArtworkImage::from_bytes(bmp_header()).unwrap();
        assert_eq!(image.format(), ImageFormat::Bmp);
        assert!(ArtworkImage::from_bytes(b"plain text".to_vec()).is_err());
    }

    #[test]
    fn test_bmp_needs_full_file_header() {
        assert_eq!(ImageFormat::sniff(b"BM\0\0"), None);
        assert_eq!(ImageFormat::sniff(b"BMW is a car brand, not a bitmap"), None);

        let mut bad_dib = bmp_header();
        bad_dib[14..18].copy_from_slice(&7u32.to_le_bytes());
        assert_eq!(ImageFormat::sniff(&bad_dib), None);

        let uri = format!("data:image/bmp;base64,{}", STANDARD.encode(bmp_header()));
        assert_eq!(
            ArtworkImage::from_data_uri(&uri).unwrap().format(),
            ImageFormat::Bmp
        );
    }
}
