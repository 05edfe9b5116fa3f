//! Picks the image generator: live, recording, or replaying a cassette.

use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use crate::adapters::live::gemini::GeminiGenerator;
use crate::adapters::live::openai::OpenAiGenerator;
use crate::adapters::recording::RecordingImageGenerator;
use crate::adapters::replaying::ReplayingImageGenerator;
use crate::cassette::{CassetteRecorder, CassetteReplayer};
use crate::config::Config;
use crate::error::ImageError;
use crate::model::Provider;
use crate::ports::ImageGenerator;

/// Environment variable naming a cassette to replay.
pub const REPLAY_ENV: &str = "IMAGEN_STUDIO_REPLAY";
/// Environment variable that turns on recording.
pub const RECORD_ENV: &str = "IMAGEN_STUDIO_REC";

/// Bundles the port trait objects the application runs against.
pub struct ServiceContext {
    /// Image generator port.
    pub generator: Box<dyn ImageGenerator>,
}

/// Handle to a recording session that must be finished after use.
pub struct RecordingSession {
    recorder: Arc<Mutex<CassetteRecorder>>,
}

impl RecordingSession {
    /// Write the recorded cassette to disk.
    ///
    /// # Errors
    ///
    /// Returns an error if the generator still holds the recorder or the file
    /// cannot be written.
    pub fn finish(self) -> Result<PathBuf, ImageError> {
        let recorder = Arc::try_unwrap(self.recorder)
            .map_err(|_| ImageError::Config("Recording adapter still has references".into()))?
            .into_inner()
            .map_err(|e| ImageError::Config(format!("Recorder lock poisoned: {e}")))?;
        recorder.finish()
    }
}

impl ServiceContext {
    /// Choose a context from the environment: replay if
    /// `IMAGEN_STUDIO_REPLAY` is set, record if `IMAGEN_STUDIO_REC` is `1` or
    /// `true`, live otherwise.
    ///
    /// # Errors
    ///
    /// Returns an error if the cassette cannot be loaded or the API key is
    /// missing.
    pub fn from_env(
        provider: Provider,
        config: &Config,
    ) -> Result<(Self, Option<RecordingSession>), ImageError> {
        if let Ok(cassette) = std::env::var(REPLAY_ENV) {
            tracing::debug!(%cassette, "replaying");
            return Ok((Self::replaying(Path::new(&cassette))?, None));
        }
        if std::env::var(RECORD_ENV).is_ok_and(|v| v == "true" || v == "1") {
            tracing::debug!("recording enabled");
            let (ctx, session) = Self::recording(provider, config)?;
            return Ok((ctx, Some(session)));
        }
        Ok((Self::live(provider, config)?, None))
    }

    /// Create a live context for the given provider.
    ///
    /// # Errors
    ///
    /// Returns an error if the API key is not configured.
    pub fn live(provider: Provider, config: &Config) -> Result<Self, ImageError> {
        let key = config.api_key(provider).ok_or_else(|| ImageError::MissingApiKey {
            provider: provider.name().into(),
            env_var: provider.key_env_var().into(),
        })?;
        let generator: Box<dyn ImageGenerator> = match provider {
            Provider::Gemini => Box::new(GeminiGenerator::new(key)),
            Provider::OpenAi => Box::new(OpenAiGenerator::new(key)),
        };
        Ok(Self { generator })
    }

    /// Wrap a live context so every call is written to a cassette under
    /// `.imagen-studio/cassettes/<timestamp>/`.
    ///
    /// # Errors
    ///
    /// Returns an error if the live context cannot be created.
    pub fn recording(
        provider: Provider,
        config: &Config,
    ) -> Result<(Self, RecordingSession), ImageError> {
        let live = Self::live(provider, config)?;

        let timestamp = chrono::Utc::now().format("%Y-%m-%dT%H-%M-%S").to_string();
        let path = PathBuf::from(".imagen-studio/cassettes")
            .join(&timestamp)
            .join("image_generator.cassette.yaml");
        let recorder = Arc::new(Mutex::new(CassetteRecorder::new(path, timestamp)));

        let generator = RecordingImageGenerator::new(live.generator, Arc::clone(&recorder));
        Ok((Self { generator: Box::new(generator) }, RecordingSession { recorder }))
    }

    /// Create a replaying context from a cassette file.
    ///
    /// # Errors
    ///
    /// Returns an error if the cassette file cannot be loaded.
    pub fn replaying(path: &Path) -> Result<Self, ImageError> {
        let replayer = CassetteReplayer::load(path)?;
        Ok(Self { generator: Box::new(ReplayingImageGenerator::new(replayer)) })
    }
}
