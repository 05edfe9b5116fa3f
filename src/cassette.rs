//! Record/replay of provider calls as YAML cassettes.
//!
//! A cassette is an ordered list of takes, each pairing the [`ImageRequest`]
//! sent to a provider with the outcome it produced. Takes are kept in call
//! order even when calls finish out of order. Replaying serves each request
//! the take recorded for it without touching the network.

use std::collections::VecDeque;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::ImageError;
use crate::ports::{ImageRequest, ImageResponse};

/// On-disk cassette layout.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Cassette {
    /// Free-form name, usually the recording timestamp.
    pub name: String,
    /// When the cassette was written.
    pub recorded_at: DateTime<Utc>,
    /// Recorded calls in the order they were made.
    #[serde(default)]
    pub takes: Vec<Take>,
}

/// One recorded provider call.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Take {
    /// Position in the recording, starting at 0.
    pub seq: u64,
    /// Request the provider received.
    pub request: ImageRequest,
    /// What the provider answered.
    #[serde(with = "serde_yaml::with::singleton_map")]
    pub outcome: Outcome,
}

/// Recorded result of a provider call.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Outcome {
    /// The provider returned images.
    Ok(ImageResponse),
    /// The provider failed; `None` when it gave no reason.
    Err(Option<String>),
    /// The call was abandoned before the provider answered.
    Pending,
}

impl Outcome {
    fn from_result(result: &Result<ImageResponse, ImageError>) -> Self {
        match result {
            Ok(response) => Self::Ok(response.clone()),
            Err(e) => Self::Err(e.message()),
        }
    }
}

/// Collects takes and writes them out as a cassette file.
#[derive(Debug)]
pub struct CassetteRecorder {
    path: PathBuf,
    name: String,
    takes: Vec<Take>,
}

impl CassetteRecorder {
    /// Create a recorder that will write to `path`.
    pub fn new(path: impl Into<PathBuf>, name: impl Into<String>) -> Self {
        Self { path: path.into(), name: name.into(), takes: Vec::new() }
    }

    /// Claim the next slot for `request` before it is sent. The take stays
    /// [`Outcome::Pending`] until [`fill`](Self::fill) is called for it.
    pub fn reserve(&mut self, request: &ImageRequest) -> u64 {
        let seq = self.takes.last().map_or(0, |take| take.seq + 1);
        self.takes.push(Take { seq, request: request.clone(), outcome: Outcome::Pending });
        seq
    }

    /// Store the result of the call that reserved `seq`.
    pub fn fill(&mut self, seq: u64, result: &Result<ImageResponse, ImageError>) {
        match self.takes.iter_mut().find(|take| take.seq == seq) {
            Some(take) => take.outcome = Outcome::from_result(result),
            None => tracing::warn!(seq, "no reserved take to fill"),
        }
    }

    /// Write the cassette YAML to disk and return its path.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be serialized or written.
    pub fn finish(self) -> Result<PathBuf, ImageError> {
        let cassette = Cassette { name: self.name, recorded_at: Utc::now(), takes: self.takes };
        let yaml = serde_yaml::to_string(&cassette)
            .map_err(|e| ImageError::Config(format!("Failed to serialize cassette: {e}")))?;
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(&self.path, yaml)?;
        Ok(self.path)
    }
}

/// Serves recorded outcomes back, matching each request to its take.
#[derive(Debug)]
pub struct CassetteReplayer {
    takes: VecDeque<Take>,
}

impl CassetteReplayer {
    /// Build a replayer over the takes of a loaded cassette.
    #[must_use]
    pub fn new(cassette: Cassette) -> Self {
        Self { takes: cassette.takes.into() }
    }

    /// Load a cassette file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed.
    pub fn load(path: &Path) -> Result<Self, ImageError> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            ImageError::Config(format!("Failed to read cassette {}: {e}", path.display()))
        })?;
        let cassette: Cassette = serde_yaml::from_str(&content).map_err(|e| {
            ImageError::Config(format!("Failed to parse cassette {}: {e}", path.display()))
        })?;
        Ok(Self::new(cassette))
    }

    /// Claim the outcome for `request`: the earliest unserved take recorded
    /// for an identical request, else the earliest unserved take.
    ///
    /// # Errors
    ///
    /// Returns a config error once the cassette is exhausted.
    pub fn next_outcome(&mut self, request: &ImageRequest) -> Result<Outcome, ImageError> {
        let index = self.takes.iter().position(|take| take.request == *request).unwrap_or(0);
        let take = self.takes.remove(index).ok_or_else(|| {
            ImageError::Config(format!("Cassette exhausted before request for '{}'", request.prompt))
        })?;
        if take.request != *request {
            tracing::warn!(
                seq = take.seq,
                recorded = %take.request.prompt,
                requested = %request.prompt,
                "replaying take recorded for a different request"
            );
        }
        Ok(take.outcome)
    }
}
