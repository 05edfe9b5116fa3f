//! Recording adapter for the `ImageGenerator` port.

use std::sync::{Arc, Mutex};

use crate::cassette::CassetteRecorder;
use crate::ports::image_generator::{GenerateFuture, ImageGenerator, ImageRequest};

/// Records every call while delegating to an inner generator.
pub struct RecordingImageGenerator {
    inner: Box<dyn ImageGenerator>,
    recorder: Arc<Mutex<CassetteRecorder>>,
}

impl RecordingImageGenerator {
    /// Wrap `inner`, appending each call to `recorder`.
    pub fn new(inner: Box<dyn ImageGenerator>, recorder: Arc<Mutex<CassetteRecorder>>) -> Self {
        Self { inner, recorder }
    }
}

impl ImageGenerator for RecordingImageGenerator {
    fn generate(&self, request: &ImageRequest) -> GenerateFuture<'_> {
        // The slot is taken at call time so takes follow call order, and a
        // call dropped before it finishes stays recorded as pending.
        let seq = match self.recorder.lock() {
            Ok(mut guard) => Some(guard.reserve(request)),
            Err(e) => {
                tracing::warn!("cassette recorder lock poisoned: {e}");
                None
            }
        };
        let request = request.clone();
        let recorder = Arc::clone(&self.recorder);

        Box::pin(async move {
            let result = self.inner.generate(&request).await;
            if let Some(seq) = seq {
                match recorder.lock() {
                    Ok(mut guard) => guard.fill(seq, &result),
                    Err(e) => tracing::warn!("cassette recorder lock poisoned: {e}"),
                }
            }
            result
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::params::AspectRatio;
    use crate::ports::{ImageResponse, RenderedImage};

    struct Echo;

    impl ImageGenerator for Echo {
        fn generate(&self, request: &ImageRequest) -> GenerateFuture<'_> {
            let data = request.prompt.clone().into_bytes();
            Box::pin(async move {
                Ok(ImageResponse {
                    images: vec![RenderedImage { data, mime_type: "image/jpeg".into() }],
                })
            })
        }
    }

    #[tokio::test]
    async fn records_and_passes_through() {
        let dir = std::env::temp_dir().join("imagen_studio_recording_test");
        let path = dir.join("rec.cassette.yaml");
        let _ = std::fs::remove_dir_all(&dir);

        let recorder = Arc::new(Mutex::new(CassetteRecorder::new(&path, "rec")));
        let generator = RecordingImageGenerator::new(Box::new(Echo), Arc::clone(&recorder));
        let request = ImageRequest {
            model: "gemini-3.1-flash-image-preview".into(),
            prompt: "a cat".into(),
            aspect_ratio: AspectRatio::Square,
        };

        let response = generator.generate(&request).await.unwrap();
        assert_eq!(response.images[0].data, b"a cat");
        drop(generator);

        let recorder = Arc::try_unwrap(recorder).unwrap().into_inner().unwrap();
        let written = recorder.finish().unwrap();
        let content = std::fs::read_to_string(written).unwrap();
        assert!(content.contains("a cat"));
        assert!(content.contains("Ok:"));

        let _ = std::fs::remove_dir_all(&dir);
    }
}
