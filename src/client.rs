//! Generation client: turns one user request into one styled image per preset.

use futures::future::try_join_all;
use serde::{Deserialize, Serialize};

use crate::error::ImageError;
use crate::params::AspectRatio;
use crate::ports::{ImageGenerator, ImageRequest, RenderedImage};
use crate::styles::StylePreset;

/// Immutable snapshot of what the user submitted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GenerationRequest {
    /// Prompt text as typed.
    pub prompt: String,
    /// Selected aspect ratio.
    pub aspect_ratio: AspectRatio,
}

/// One image of a finished request, tagged with the style that produced it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GeneratedImage {
    /// The image bytes and MIME type.
    pub image: RenderedImage,
    /// Style label, e.g. `"Vivid"`.
    pub style: String,
}

/// Calls the provider once per style preset and collects the results in
/// preset order. Any failed call fails the whole request.
pub struct GenerationClient {
    generator: Box<dyn ImageGenerator>,
    model: String,
    styles: &'static [StylePreset],
}

impl GenerationClient {
    /// Create a client for `model` producing one image per entry in `styles`.
    #[must_use]
    pub fn new(
        generator: Box<dyn ImageGenerator>,
        model: impl Into<String>,
        styles: &'static [StylePreset],
    ) -> Self {
        Self { generator, model: model.into(), styles }
    }

    /// Number of images each successful request yields.
    #[must_use]
    pub fn images_per_request(&self) -> usize {
        self.styles.len()
    }

    /// Generate every styled image for `request`.
    ///
    /// # Errors
    ///
    /// Returns the first provider error, or a rejection if a provider call
    /// comes back without an image.
    pub async fn generate(
        &self,
        request: &GenerationRequest,
    ) -> Result<Vec<GeneratedImage>, ImageError> {
        let calls = self.styles.iter().map(|style| {
            let call = ImageRequest {
                model: self.model.clone(),
                prompt: style.apply(&request.prompt),
                aspect_ratio: request.aspect_ratio,
            };
            async move {
                let response = self.generator.generate(&call).await?;
                let image = response.images.into_iter().next().ok_or_else(|| {
                    ImageError::Rejected {
                        message: Some(format!("No image returned for the {} style", style.label)),
                    }
                })?;
                tracing::debug!(style = style.label, bytes = image.data.len(), "style rendered");
                Ok::<_, ImageError>(GeneratedImage { image, style: style.label.to_string() })
            }
        });
        try_join_all(calls).await
    }
}
