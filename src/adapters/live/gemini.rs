//! Live adapter for the Gemini image generation API.

use base64::Engine;
use reqwest::Client;
use serde::Deserialize;

use crate::error::ImageError;
use crate::ports::image_generator::{
    GenerateFuture, ImageGenerator, ImageRequest, ImageResponse, RenderedImage,
};

const GEMINI_API_BASE: &str = "https://generativelanguage.googleapis.com/v1beta/models";

/// Live Gemini image generator that calls the Google AI API.
pub struct GeminiGenerator {
    client: Client,
    api_key: String,
}

impl GeminiGenerator {
    /// Create a new Gemini generator with the given API key.
    #[must_use]
    pub fn new(api_key: String) -> Self {
        Self { client: Client::new(), api_key }
    }
}

impl ImageGenerator for GeminiGenerator {
    fn generate(&self, request: &ImageRequest) -> GenerateFuture<'_> {
        let request = request.clone();
        Box::pin(async move {
            let url = format!("{GEMINI_API_BASE}/{}:generateContent", request.model);
            let body = request_body(&request);

            tracing::debug!(model = %request.model, ratio = %request.aspect_ratio, "calling Gemini");
            let response = self
                .client
                .post(&url)
                .header("x-goog-api-key", &self.api_key)
                .json(&body)
                .send()
                .await?;

            let status = response.status();
            let response_text = response.text().await?;

            if !status.is_success() {
                return Err(ImageError::Api {
                    status: status.as_u16(),
                    message: api_error_message(&response_text),
                });
            }

            parse_images(&response_text)
        })
    }
}

fn request_body(request: &ImageRequest) -> serde_json::Value {
    serde_json::json!({
        "contents": [{
            "parts": [{"text": request.prompt}]
        }],
        "generationConfig": {
            "responseModalities": ["IMAGE"],
            "imageConfig": {
                "aspectRatio": request.aspect_ratio.as_str(),
            }
        }
    })
}

/// Pull `error.message` out of a Gemini error body, or return the body as-is.
fn api_error_message(body: &str) -> String {
    serde_json::from_str::<GeminiErrorBody>(body)
        .ok()
        .and_then(|b| b.error.message)
        .unwrap_or_else(|| body.to_string())
}

fn parse_images(response_text: &str) -> Result<ImageResponse, ImageError> {
    let parsed: GeminiResponse = serde_json::from_str(response_text).map_err(|e| {
        ImageError::Api { status: 200, message: format!("Failed to parse response: {e}") }
    })?;

    let mut images = Vec::new();
    for candidate in parsed.candidates {
        for part in candidate.content.parts {
            if let Some(inline) = part.inline_data {
                let data = base64::engine::general_purpose::STANDARD
                    .decode(&inline.data)
                    .map_err(|e| ImageError::Api {
                        status: 200,
                        message: format!("Failed to decode base64: {e}"),
                    })?;
                images.push(RenderedImage { data, mime_type: inline.mime_type });
            }
        }
    }

    if images.is_empty() {
        // Blocked prompts come back as 200 with no image parts.
        return Err(ImageError::Rejected { message: None });
    }

    Ok(ImageResponse { images })
}

// --- Gemini API response types ---

#[derive(Deserialize)]
struct GeminiResponse {
    #[serde(default)]
    candidates: Vec<GeminiCandidate>,
}

#[derive(Deserialize)]
struct GeminiCandidate {
    content: GeminiContent,
}

#[derive(Deserialize)]
struct GeminiContent {
    #[serde(default)]
    parts: Vec<GeminiPart>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct GeminiPart {
    inline_data: Option<GeminiInlineData>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct GeminiInlineData {
    mime_type: String,
    data: String,
}

#[derive(Deserialize)]
struct GeminiErrorBody {
    error: GeminiErrorDetail,
}

#[derive(Deserialize)]
struct GeminiErrorDetail {
    message: Option<String>,
}
