//! Model aliases and provider detection.

use crate::error::ImageError;

/// Supported API providers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Provider {
    /// Google Gemini API.
    Gemini,
    /// `OpenAI` API.
    OpenAi,
}

impl Provider {
    /// Display name used in messages.
    #[must_use]
    pub fn name(self) -> &'static str {
        match self {
            Self::Gemini => "Gemini",
            Self::OpenAi => "OpenAI",
        }
    }

    /// Environment variable holding this provider's API key.
    #[must_use]
    pub fn key_env_var(self) -> &'static str {
        match self {
            Self::Gemini => "GEMINI_API_KEY",
            Self::OpenAi => "OPENAI_API_KEY",
        }
    }
}

/// A model identifier resolved to its provider.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedModel {
    /// Full model identifier sent to the API.
    pub id: String,
    /// Provider serving the model.
    pub provider: Provider,
}

const ALIASES: &[(&str, &str)] = &[
    ("nano-banana", "gemini-3.1-flash-image-preview"),
    ("nano-banana-pro", "gemini-3-pro-image-preview"),
    ("gpt-1.5", "gpt-image-1.5"),
    ("gpt-1", "gpt-image-1"),
    ("gpt-1-mini", "gpt-image-1-mini"),
];

/// Resolve an alias or exact model name and detect its provider.
///
/// # Errors
///
/// Returns an error if the model name doesn't match a known provider prefix.
pub fn resolve_model(name: &str) -> Result<ResolvedModel, ImageError> {
    let id = ALIASES
        .iter()
        .find(|(alias, _)| *alias == name)
        .map_or(name, |(_, full)| *full)
        .to_string();

    let provider = if id.starts_with("gemini") {
        Provider::Gemini
    } else if id.starts_with("gpt-image") {
        Provider::OpenAi
    } else {
        return Err(ImageError::InvalidArgument(format!(
            "Unknown provider for model '{id}'. Expected 'gemini-*' or 'gpt-image-*'."
        )));
    };

    Ok(ResolvedModel { id, provider })
}
