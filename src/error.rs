//! Error types for imagen-studio.

use thiserror::Error;

/// Detail used when a failed generation carries no message of its own.
pub const UNKNOWN_ERROR: &str = "An unknown error occurred.";

/// Errors raised by adapters, configuration and file output.
#[derive(Debug, Error)]
pub enum ImageError {
    /// An API returned an error response.
    #[error("API error ({status}): {message}")]
    Api {
        /// HTTP status code.
        status: u16,
        /// Error message from the API.
        message: String,
    },

    /// A network error occurred.
    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    /// An I/O error occurred.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Configuration error.
    #[error("Config error: {0}")]
    Config(String),

    /// Invalid argument.
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    /// Image format conversion error.
    #[error("Image conversion error: {0}")]
    ImageConversion(String),

    /// No API key configured for the provider.
    #[error("No API key for {provider}. Set {env_var} or add it to config file.")]
    MissingApiKey {
        /// The provider name.
        provider: String,
        /// The environment variable name.
        env_var: String,
    },

    /// The provider refused the request, possibly without saying why.
    #[error("{}", .message.as_deref().unwrap_or(UNKNOWN_ERROR))]
    Rejected {
        /// Provider-supplied reason, if any.
        message: Option<String>,
    },
}

impl ImageError {
    /// Human-readable detail carried by this error, if any.
    #[must_use]
    pub fn message(&self) -> Option<String> {
        match self {
            Self::Rejected { message } => message.clone(),
            other => Some(other.to_string()),
        }
    }
}

/// The only failure a generation request surfaces to the user.
#[derive(Debug, Clone, Default, PartialEq, Eq, Error)]
#[error("{}", self.detail())]
pub struct GenerationFailure {
    message: Option<String>,
}

impl GenerationFailure {
    /// Create a failure with an optional message. Blank messages count as absent.
    #[must_use]
    pub fn new(message: Option<String>) -> Self {
        Self { message: message.filter(|m| !m.trim().is_empty()) }
    }

    /// The message carried by the underlying error, if any.
    #[must_use]
    pub fn message(&self) -> Option<&str> {
        self.message.as_deref()
    }

    /// The message, or the fixed fallback.
    #[must_use]
    pub fn detail(&self) -> &str {
        self.message().unwrap_or(UNKNOWN_ERROR)
    }

    /// Text shown on the error panel.
    #[must_use]
    pub fn user_message(&self) -> String {
        format!("Failed to generate image. Please try again. Error: {}", self.detail())
    }
}

impl From<ImageError> for GenerationFailure {
    fn from(err: ImageError) -> Self {
        Self::new(err.message())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn api_error_keeps_message() {
        let failure = GenerationFailure::from(ImageError::Api {
            status: 429,
            message: "quota exceeded".into(),
        });
        assert!(failure.user_message().contains("quota exceeded"));
        assert!(failure.user_message().contains("429"));
    }

    #[test]
    fn rejection_without_message_uses_fallback() {
        let failure = GenerationFailure::from(ImageError::Rejected { message: None });
        assert!(failure.message().is_none());
        assert_eq!(
            failure.user_message(),
            "Failed to generate image. Please try again. Error: An unknown error occurred."
        );
    }

    #[test]
    fn blank_message_counts_as_absent() {
        let failure = GenerationFailure::new(Some("   ".into()));
        assert_eq!(failure.detail(), UNKNOWN_ERROR);
    }

    #[test]
    fn rejected_display_falls_back() {
        let err = ImageError::Rejected { message: None };
        assert_eq!(err.to_string(), UNKNOWN_ERROR);
    }
}
