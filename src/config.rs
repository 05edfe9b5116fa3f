//! Configuration file loading with environment variable overrides.

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::Deserialize;

use crate::error::ImageError;
use crate::loading::DEFAULT_PHRASES;
use crate::model::Provider;
use crate::params::AspectRatio;
use crate::styles::Variant;

/// Top-level configuration.
#[derive(Debug, Default, Deserialize)]
pub struct Config {
    /// API key configuration.
    #[serde(default)]
    pub keys: KeysConfig,

    /// Values used when the matching CLI flag is not given.
    #[serde(default)]
    pub defaults: DefaultsConfig,

    /// Loading indicator settings.
    #[serde(default)]
    pub loading: LoadingConfig,
}

/// API key configuration.
#[derive(Debug, Default, Deserialize)]
pub struct KeysConfig {
    /// Gemini API key.
    pub gemini: Option<String>,
    /// `OpenAI` API key.
    pub openai: Option<String>,
}

/// Default parameter values from config file.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct DefaultsConfig {
    /// Default model name or alias.
    pub model: String,
    /// Default aspect ratio.
    pub aspect_ratio: AspectRatio,
    /// Default number of styled images per request.
    pub variant: Variant,
    /// Directory downloads are written to.
    pub output_dir: PathBuf,
}

impl Default for DefaultsConfig {
    fn default() -> Self {
        Self {
            model: "nano-banana".to_string(),
            aspect_ratio: AspectRatio::Square,
            variant: Variant::Single,
            output_dir: PathBuf::from("."),
        }
    }
}

/// Loading indicator settings.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct LoadingConfig {
    /// Milliseconds between status phrases.
    pub period_ms: u64,
    /// Status phrases, shown in order.
    pub phrases: Vec<String>,
}

impl Default for LoadingConfig {
    fn default() -> Self {
        Self {
            period_ms: 2500,
            phrases: DEFAULT_PHRASES.iter().map(ToString::to_string).collect(),
        }
    }
}

impl LoadingConfig {
    /// Interval between phrase changes.
    #[must_use]
    pub fn period(&self) -> Duration {
        Duration::from_millis(self.period_ms.max(1))
    }
}

impl Config {
    /// Load configuration from the given path, or return defaults.
    ///
    /// # Errors
    ///
    /// Returns an error if the file exists but cannot be parsed.
    pub fn load(path: &Path) -> Result<Self, ImageError> {
        if !path.exists() {
            tracing::debug!(path = %path.display(), "no config file, using defaults");
            return Ok(Self::default());
        }
        let contents = std::fs::read_to_string(path).map_err(|e| {
            ImageError::Config(format!("Failed to read config {}: {e}", path.display()))
        })?;
        toml::from_str(&contents).map_err(|e| {
            ImageError::Config(format!("Failed to parse config {}: {e}", path.display()))
        })
    }

    /// API key for `provider`, preferring the environment variable.
    #[must_use]
    pub fn api_key(&self, provider: Provider) -> Option<String> {
        let from_file = match provider {
            Provider::Gemini => &self.keys.gemini,
            Provider::OpenAi => &self.keys.openai,
        };
        std::env::var(provider.key_env_var()).ok().or_else(|| from_file.clone())
    }
}

/// Discover the config file path using the resolution order:
/// 1. Explicit path (from `--config` flag)
/// 2. `IMAGEN_STUDIO_CONFIG` environment variable
/// 3. `~/.config/imagen-studio/config.toml`
#[must_use]
pub fn discover_config_path(explicit: Option<&str>) -> PathBuf {
    if let Some(p) = explicit {
        return PathBuf::from(p);
    }

    if let Ok(p) = std::env::var("IMAGEN_STUDIO_CONFIG") {
        return PathBuf::from(p);
    }

    match std::env::var("HOME") {
        Ok(home) => PathBuf::from(home).join(".config/imagen-studio/config.toml"),
        Err(_) => PathBuf::from("imagen-studio.toml"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config() {
        let config = Config::default();
        assert!(config.keys.gemini.is_none());
        assert_eq!(config.defaults.model, "nano-banana");
        assert_eq!(config.defaults.aspect_ratio, AspectRatio::Square);
        assert_eq!(config.defaults.variant, Variant::Single);
        assert_eq!(config.loading.period(), Duration::from_millis(2500));
        assert_eq!(config.loading.phrases.len(), DEFAULT_PHRASES.len());
    }

    #[test]
    fn load_nonexistent_returns_defaults() {
        let config = Config::load(Path::new("/nonexistent/path/config.toml")).unwrap();
        assert_eq!(config.defaults.model, "nano-banana");
    }

    #[test]
    fn load_valid_toml() {
        let dir = std::env::temp_dir().join("imagen_studio_config_test");
        std::fs::create_dir_all(&dir).unwrap();
        let path = dir.join("config.toml");
        std::fs::write(
            &path,
            r#"
[keys]
openai = "test-openai-key"

[defaults]
model = "gpt-1"
aspect_ratio = "16:9"
variant = "quad"

[loading]
period_ms = 500
phrases = ["one", "two"]
"#,
        )
        .unwrap();

        let config = Config::load(&path).unwrap();
        assert_eq!(config.keys.openai.as_deref(), Some("test-openai-key"));
        assert_eq!(config.defaults.model, "gpt-1");
        assert_eq!(config.defaults.aspect_ratio, AspectRatio::Landscape);
        assert_eq!(config.defaults.variant, Variant::Quad);
        assert_eq!(config.defaults.output_dir, PathBuf::from("."));
        assert_eq!(config.loading.period(), Duration::from_millis(500));
        assert_eq!(config.loading.phrases, ["one", "two"]);

        let _ = std::fs::remove_dir_all(&dir);
    }

    #[test]
    fn load_rejects_unknown_ratio() {
        let dir = std::env::temp_dir().join("imagen_studio_config_bad_ratio");
        std::fs::create_dir_all(&dir).unwrap();
        let path = dir.join("config.toml");
        std::fs::write(&path, "[defaults]\naspect_ratio = \"21:9\"\n").unwrap();

        assert!(Config::load(&path).is_err());

        let _ = std::fs::remove_dir_all(&dir);
    }

    #[test]
    fn load_invalid_toml() {
        let dir = std::env::temp_dir().join("imagen_studio_config_bad_test");
        std::fs::create_dir_all(&dir).unwrap();
        let path = dir.join("bad.toml");
        std::fs::write(&path, "this is not valid toml {{{").unwrap();

        let err = Config::load(&path).unwrap_err();
        assert!(err.to_string().contains("Failed to parse config"));

        let _ = std::fs::remove_dir_all(&dir);
    }

    #[test]
    fn discover_explicit_path() {
        let path = discover_config_path(Some("/tmp/my-config.toml"));
        assert_eq!(path, PathBuf::from("/tmp/my-config.toml"));
    }
}
