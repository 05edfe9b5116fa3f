//! Image generator port for AI image generation APIs.

use std::future::Future;
use std::pin::Pin;

use serde::{Deserialize, Serialize};

use crate::error::ImageError;
use crate::params::AspectRatio;

/// A single provider call: one styled prompt, one image.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImageRequest {
    /// The resolved model identifier (e.g., `"gemini-3.1-flash-image-preview"`).
    pub model: String,
    /// The prompt sent to the provider, style modifier included.
    pub prompt: String,
    /// Requested image shape.
    pub aspect_ratio: AspectRatio,
}

/// Raw image bytes as returned by a provider.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RenderedImage {
    /// Raw image bytes (decoded from base64).
    #[serde(with = "base64_bytes")]
    pub data: Vec<u8>,
    /// MIME type of the image (e.g., `"image/jpeg"`).
    pub mime_type: String,
}

/// Response containing rendered images.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImageResponse {
    /// The rendered images.
    pub images: Vec<RenderedImage>,
}

/// Boxed future type returned by [`ImageGenerator::generate`].
pub type GenerateFuture<'a> =
    Pin<Box<dyn Future<Output = Result<ImageResponse, ImageError>> + Send + 'a>>;

/// Generates images from text prompts via an external API.
pub trait ImageGenerator: Send + Sync {
    /// Generate images for the given request.
    fn generate(&self, request: &ImageRequest) -> GenerateFuture<'_>;
}

/// Serde helper for storing `Vec<u8>` as base64 strings in cassettes.
mod base64_bytes {
    use base64::Engine;
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(data: &[u8], serializer: S) -> Result<S::Ok, S::Error> {
        let encoded = base64::engine::general_purpose::STANDARD.encode(data);
        serializer.serialize_str(&encoded)
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Vec<u8>, D::Error> {
        let s = String::deserialize(deserializer)?;
        base64::engine::general_purpose::STANDARD.decode(&s).map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn request_serializes_ratio_label() {
        let request = ImageRequest {
            model: "gemini-3.1-flash-image-preview".into(),
            prompt: "a cat, vivid colors".into(),
            aspect_ratio: AspectRatio::Landscape,
        };
        let json = serde_json::to_value(&request).unwrap();
        assert_eq!(json["aspect_ratio"], "16:9");
    }

    #[test]
    fn rendered_image_is_base64_in_json() {
        let image = RenderedImage {
            data: vec![0xFF, 0xD8, 0xFF, 0xE0], // JPEG magic bytes
            mime_type: "image/jpeg".into(),
        };
        let json = serde_json::to_value(&image).unwrap();
        assert_eq!(json["data"], "/9j/4A==");
        let back: RenderedImage = serde_json::from_value(json).unwrap();
        assert_eq!(back, image);
    }
}
