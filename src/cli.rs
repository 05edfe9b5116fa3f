//! CLI argument parsing with clap.

use clap::Parser;

use crate::params::AspectRatio;
use crate::styles::Variant;

/// AI image generator: type a prompt, pick an aspect ratio, get styled images.
///
/// With a prompt, generates once and saves the images. Without one, starts an
/// interactive session.
#[derive(Parser, Debug)]
#[command(name = "imagen-studio", version, about)]
pub struct Cli {
    /// Text prompt describing the desired image.
    #[arg(conflicts_with_all = ["prompt_file", "surprise"])]
    pub prompt: Option<String>,

    /// Path to a file containing the prompt text.
    #[arg(short = 'p', long, conflicts_with = "surprise")]
    pub prompt_file: Option<String>,

    /// Generate a random example prompt.
    #[arg(long)]
    pub surprise: bool,

    /// Model name or short alias.
    #[arg(short, long)]
    pub model: Option<String>,

    /// Aspect ratio.
    #[arg(short, long, value_enum)]
    pub aspect_ratio: Option<AspectRatio>,

    /// One vivid image, or four images in different styles.
    #[arg(long, value_enum)]
    pub variant: Option<Variant>,

    /// Directory downloads are written to.
    #[arg(short, long)]
    pub output_dir: Option<String>,

    /// Config file path override.
    #[arg(long)]
    pub config: Option<String>,

    /// Verbose output.
    #[arg(short, long)]
    pub verbose: bool,
}

impl Cli {
    /// The prompt given on the command line or in `--prompt-file`, if any.
    ///
    /// # Errors
    ///
    /// Returns an error if the prompt file cannot be read.
    pub fn resolve_prompt(&self) -> Result<Option<String>, std::io::Error> {
        if let Some(ref text) = self.prompt {
            Ok(Some(text.clone()))
        } else if let Some(ref path) = self.prompt_file {
            std::fs::read_to_string(path).map(Some)
        } else {
            Ok(None)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn positional_prompt() {
        let cli = Cli::parse_from(["imagen-studio", "a cat"]);
        assert_eq!(cli.resolve_prompt().unwrap().as_deref(), Some("a cat"));
    }

    #[test]
    fn prompt_file_flag() {
        let dir = std::env::temp_dir().join("imagen_studio_cli_pf_test");
        std::fs::create_dir_all(&dir).unwrap();
        let path = dir.join("prompt.txt");
        std::fs::write(&path, "prompt from file").unwrap();

        let cli = Cli::parse_from(["imagen-studio", "-p", path.to_str().unwrap()]);
        assert!(cli.prompt.is_none());
        assert_eq!(cli.resolve_prompt().unwrap().as_deref(), Some("prompt from file"));

        let _ = std::fs::remove_dir_all(&dir);
    }

    #[test]
    fn no_prompt_means_interactive() {
        let cli = Cli::parse_from(["imagen-studio"]);
        assert!(cli.resolve_prompt().unwrap().is_none());
        assert!(cli.model.is_none());
        assert!(cli.aspect_ratio.is_none());
        assert!(cli.variant.is_none());
        assert!(!cli.surprise);
        assert!(!cli.verbose);
    }

    #[test]
    fn all_options() {
        let cli = Cli::parse_from([
            "imagen-studio",
            "-m",
            "gpt-1",
            "-a",
            "16:9",
            "--variant",
            "quad",
            "-o",
            "out",
            "-v",
            "a landscape",
        ]);
        assert_eq!(cli.model.as_deref(), Some("gpt-1"));
        assert_eq!(cli.aspect_ratio, Some(AspectRatio::Landscape));
        assert_eq!(cli.variant, Some(Variant::Quad));
        assert_eq!(cli.output_dir.as_deref(), Some("out"));
        assert!(cli.verbose);
        assert_eq!(cli.prompt.as_deref(), Some("a landscape"));
    }

    #[test]
    fn unknown_ratio_is_a_parse_error() {
        assert!(Cli::try_parse_from(["imagen-studio", "-a", "21:9", "a cat"]).is_err());
    }

    #[test]
    fn surprise_conflicts_with_prompt() {
        assert!(Cli::try_parse_from(["imagen-studio", "--surprise", "a cat"]).is_err());
    }
}
