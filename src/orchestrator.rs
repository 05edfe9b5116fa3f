//! Request lifecycle: idle → loading → success or failure.
//!
//! [`Orchestrator::submit`] is the only way the published [`RequestState`]
//! changes. At most one request is in flight; a submission made while one is
//! loading is refused without touching the provider.

use std::sync::atomic::{AtomicBool, Ordering};

use tokio::sync::watch;

use crate::client::{GeneratedImage, GenerationClient, GenerationRequest};
use crate::error::GenerationFailure;
use crate::loading::LoadingIndicator;
use crate::params::AspectRatio;

/// Lifecycle stage of the current generation attempt.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum RequestState {
    /// Nothing submitted yet.
    #[default]
    Idle,
    /// Waiting on the provider; `message` is the current status phrase.
    Loading {
        /// Status phrase from the loading indicator.
        message: String,
    },
    /// The provider returned every requested image.
    Success {
        /// The submission these images answer.
        request: GenerationRequest,
        /// Images in provider order.
        images: Vec<GeneratedImage>,
    },
    /// The provider failed.
    Failure {
        /// User-facing explanation.
        message: String,
    },
}

impl RequestState {
    /// Whether a request is in flight.
    #[must_use]
    pub fn is_loading(&self) -> bool {
        matches!(self, Self::Loading { .. })
    }
}

/// Why a submission was refused.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Rejection {
    /// The prompt was empty or whitespace.
    EmptyPrompt,
    /// Another request is still loading.
    Busy,
}

/// Result of calling [`Orchestrator::submit`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Submission {
    /// Nothing was sent.
    Rejected(Rejection),
    /// The request ran to completion; holds the terminal state.
    Completed(RequestState),
}

/// Owns the generation client, the loading indicator and the published state.
pub struct Orchestrator {
    client: GenerationClient,
    indicator: LoadingIndicator,
    state: watch::Sender<RequestState>,
    in_flight: AtomicBool,
}

impl Orchestrator {
    /// Create an idle orchestrator.
    #[must_use]
    pub fn new(client: GenerationClient, indicator: LoadingIndicator) -> Self {
        let (state, _) = watch::channel(RequestState::Idle);
        Self { client, indicator, state, in_flight: AtomicBool::new(false) }
    }

    /// Watch every state transition.
    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<RequestState> {
        self.state.subscribe()
    }

    /// Snapshot of the current state.
    #[must_use]
    pub fn state(&self) -> RequestState {
        self.state.borrow().clone()
    }

    /// Whether a request is in flight.
    #[must_use]
    pub fn is_loading(&self) -> bool {
        self.in_flight.load(Ordering::Acquire)
    }

    /// Number of images a successful request yields.
    #[must_use]
    pub fn images_per_request(&self) -> usize {
        self.client.images_per_request()
    }

    /// Run one generation for `prompt` at `aspect_ratio`.
    ///
    /// The prompt is captured as given; later edits to the caller's prompt do
    /// not affect this request. If the returned future is dropped before it
    /// completes, the indicator stops and the state falls back to idle.
    pub async fn submit(&self, prompt: &str, aspect_ratio: AspectRatio) -> Submission {
        if prompt.trim().is_empty() {
            return Submission::Rejected(Rejection::EmptyPrompt);
        }
        let Some(_flight) = InFlight::acquire(&self.in_flight, &self.state) else {
            tracing::debug!("submission ignored, a request is already in flight");
            return Submission::Rejected(Rejection::Busy);
        };

        let request = GenerationRequest { prompt: prompt.to_string(), aspect_ratio };
        let ticker = self.indicator.start();
        let mut phrases = self.indicator.subscribe();
        self.state.send_replace(RequestState::Loading {
            message: self.indicator.phrase().unwrap_or_default(),
        });
        tracing::info!(prompt = %request.prompt, ratio = %request.aspect_ratio, "generating");

        let result = {
            let call = self.client.generate(&request);
            tokio::pin!(call);
            loop {
                tokio::select! {
                    result = &mut call => break result,
                    Ok(()) = phrases.changed() => {
                        let phrase = phrases.borrow_and_update().clone();
                        if let Some(message) = phrase {
                            self.state.send_replace(RequestState::Loading { message });
                        }
                    }
                }
            }
        };
        ticker.stop();

        let next = match result {
            Ok(images) => {
                tracing::info!(count = images.len(), "generation finished");
                RequestState::Success { request, images }
            }
            Err(e) => {
                let failure = GenerationFailure::from(e);
                tracing::error!(error = %failure, "generation failed");
                RequestState::Failure { message: failure.user_message() }
            }
        };
        self.state.send_replace(next.clone());
        Submission::Completed(next)
    }
}

/// Held for the duration of one request. Releasing it clears the in-flight
/// flag and, if the request never finished, drops the state back to idle.
struct InFlight<'a> {
    flag: &'a AtomicBool,
    state: &'a watch::Sender<RequestState>,
}

impl<'a> InFlight<'a> {
    fn acquire(flag: &'a AtomicBool, state: &'a watch::Sender<RequestState>) -> Option<Self> {
        flag.compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .ok()
            .map(|_| Self { flag, state })
    }
}

impl Drop for InFlight<'_> {
    fn drop(&mut self) {
        self.state.send_if_modified(|state| {
            if state.is_loading() {
                *state = RequestState::Idle;
                true
            } else {
                false
            }
        });
        self.flag.store(false, Ordering::Release);
    }
}
