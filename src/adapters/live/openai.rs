//! Live adapter for the `OpenAI` image generation API.

use base64::Engine;
use reqwest::Client;
use serde::Deserialize;

use crate::error::ImageError;
use crate::ports::image_generator::{
    GenerateFuture, ImageGenerator, ImageRequest, ImageResponse, RenderedImage,
};

const OPENAI_API_URL: &str = "https://api.openai.com/v1/images/generations";

/// Live `OpenAI` image generator that calls the `OpenAI` Images API.
pub struct OpenAiGenerator {
    client: Client,
    api_key: String,
}

impl OpenAiGenerator {
    /// Create a new `OpenAI` generator with the given API key.
    #[must_use]
    pub fn new(api_key: String) -> Self {
        Self { client: Client::new(), api_key }
    }
}

impl ImageGenerator for OpenAiGenerator {
    fn generate(&self, request: &ImageRequest) -> GenerateFuture<'_> {
        let request = request.clone();
        Box::pin(async move {
            let body = serde_json::json!({
                "model": request.model,
                "prompt": request.prompt,
                "n": 1,
                "size": request.aspect_ratio.openai_size(),
                "output_format": "jpeg",
            });

            tracing::debug!(model = %request.model, ratio = %request.aspect_ratio, "calling OpenAI");
            let response = self
                .client
                .post(OPENAI_API_URL)
                .header("Authorization", format!("Bearer {}", self.api_key))
                .json(&body)
                .send()
                .await?;

            let status = response.status();
            let response_text = response.text().await?;

            if !status.is_success() {
                let message = serde_json::from_str::<OpenAiErrorBody>(&response_text)
                    .ok()
                    .and_then(|b| b.error.message)
                    .unwrap_or(response_text);
                return Err(ImageError::Api { status: status.as_u16(), message });
            }

            parse_images(&response_text)
        })
    }
}

fn parse_images(response_text: &str) -> Result<ImageResponse, ImageError> {
    let parsed: OpenAiResponse = serde_json::from_str(response_text).map_err(|e| {
        ImageError::Api { status: 200, message: format!("Failed to parse response: {e}") }
    })?;

    let images = parsed
        .data
        .into_iter()
        .map(|item| {
            base64::engine::general_purpose::STANDARD
                .decode(&item.b64_json)
                .map(|data| RenderedImage { data, mime_type: "image/jpeg".to_string() })
                .map_err(|e| ImageError::Api {
                    status: 200,
                    message: format!("Failed to decode base64: {e}"),
                })
        })
        .collect::<Result<Vec<_>, _>>()?;

    if images.is_empty() {
        return Err(ImageError::Rejected { message: None });
    }

    Ok(ImageResponse { images })
}

// --- OpenAI API response types ---

#[derive(Deserialize)]
struct OpenAiResponse {
    #[serde(default)]
    data: Vec<OpenAiImageData>,
}

#[derive(Deserialize)]
struct OpenAiImageData {
    b64_json: String,
}

#[derive(Deserialize)]
struct OpenAiErrorBody {
    error: OpenAiErrorDetail,
}

#[derive(Deserialize)]
struct OpenAiErrorDetail {
    message: Option<String>,
}
