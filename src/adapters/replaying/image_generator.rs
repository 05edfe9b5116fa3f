//! Replaying adapter for the `ImageGenerator` port.

use std::sync::{Arc, Mutex};

use crate::cassette::{CassetteReplayer, Outcome};
use crate::error::ImageError;
use crate::ports::image_generator::{GenerateFuture, ImageGenerator, ImageRequest};

/// Serves recorded outcomes from a cassette instead of calling a provider.
pub struct ReplayingImageGenerator {
    replayer: Arc<Mutex<CassetteReplayer>>,
}

impl ReplayingImageGenerator {
    /// Create a replaying generator backed by the given replayer.
    #[must_use]
    pub fn new(replayer: CassetteReplayer) -> Self {
        Self { replayer: Arc::new(Mutex::new(replayer)) }
    }
}

impl ImageGenerator for ReplayingImageGenerator {
    fn generate(&self, request: &ImageRequest) -> GenerateFuture<'_> {
        let outcome = match self.replayer.lock() {
            Ok(mut guard) => guard.next_outcome(request),
            Err(e) => Err(ImageError::Config(format!("Replayer lock poisoned: {e}"))),
        };
        match outcome {
            Ok(Outcome::Ok(response)) => Box::pin(async move { Ok(response) }),
            Ok(Outcome::Err(message)) => Box::pin(async move { Err(ImageError::Rejected { message }) }),
            // Never answered while recording, so never answers now.
            Ok(Outcome::Pending) => Box::pin(std::future::pending()),
            Err(e) => Box::pin(async move { Err(e) }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cassette::{Cassette, Outcome, Take};
    use crate::params::AspectRatio;
    use crate::ports::{ImageResponse, RenderedImage};

    fn request(prompt: &str) -> ImageRequest {
        ImageRequest {
            model: "gpt-image-1".into(),
            prompt: prompt.into(),
            aspect_ratio: AspectRatio::Landscape,
        }
    }

    #[tokio::test]
    async fn serves_takes_in_call_order() {
        let cassette = Cassette {
            name: "order".into(),
            recorded_at: chrono::Utc::now(),
            takes: vec![
                Take {
                    seq: 0,
                    request: request("first"),
                    outcome: Outcome::Ok(ImageResponse {
                        images: vec![RenderedImage { data: vec![1], mime_type: "image/jpeg".into() }],
                    }),
                },
                Take { seq: 1, request: request("second"), outcome: Outcome::Err(Some("nope".into())) },
            ],
        };
        let generator = ReplayingImageGenerator::new(CassetteReplayer::new(cassette));

        let first = generator.generate(&request("first"));
        let second = generator.generate(&request("second"));
        assert_eq!(first.await.unwrap().images[0].data, vec![1]);
        assert_eq!(second.await.unwrap_err().to_string(), "nope");
        assert!(generator.generate(&request("third")).await.is_err());
    }
}
