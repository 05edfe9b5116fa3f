//! The live prompt text and aspect ratio being edited by the user.

use crate::params::AspectRatio;

/// Holds what the user has typed and selected so far.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PromptStore {
    text: String,
    aspect_ratio: AspectRatio,
}

impl PromptStore {
    /// Create a store with an empty prompt and the given ratio.
    #[must_use]
    pub fn new(aspect_ratio: AspectRatio) -> Self {
        Self { text: String::new(), aspect_ratio }
    }

    /// Current prompt text.
    #[must_use]
    pub fn text(&self) -> &str {
        &self.text
    }

    /// Replace the prompt text.
    pub fn set_text(&mut self, text: impl Into<String>) {
        self.text = text.into();
    }

    /// Selected aspect ratio.
    #[must_use]
    pub fn aspect_ratio(&self) -> AspectRatio {
        self.aspect_ratio
    }

    /// Select an aspect ratio.
    pub fn set_aspect_ratio(&mut self, ratio: AspectRatio) {
        self.aspect_ratio = ratio;
    }

    /// Whether the prompt has any non-whitespace content.
    #[must_use]
    pub fn is_submittable(&self) -> bool {
        !self.text.trim().is_empty()
    }
}
