//! Aspect ratios and their translation to provider-specific formats.

use std::fmt;
use std::str::FromStr;

use clap::ValueEnum;
use serde::{Deserialize, Serialize};

/// Width:height label constraining the shape of generated images.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, ValueEnum)]
pub enum AspectRatio {
    /// Square.
    #[default]
    #[serde(rename = "1:1")]
    #[value(name = "1:1")]
    Square,
    /// Widescreen landscape.
    #[serde(rename = "16:9")]
    #[value(name = "16:9")]
    Landscape,
    /// Widescreen portrait.
    #[serde(rename = "9:16")]
    #[value(name = "9:16")]
    Portrait,
    /// Classic landscape.
    #[serde(rename = "4:3")]
    #[value(name = "4:3")]
    Classic,
    /// Classic portrait.
    #[serde(rename = "3:4")]
    #[value(name = "3:4")]
    ClassicPortrait,
}

impl AspectRatio {
    /// Every selectable ratio, in display order.
    pub const ALL: [Self; 5] =
        [Self::Square, Self::Landscape, Self::Portrait, Self::Classic, Self::ClassicPortrait];

    /// The `w:h` label.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Square => "1:1",
            Self::Landscape => "16:9",
            Self::Portrait => "9:16",
            Self::Classic => "4:3",
            Self::ClassicPortrait => "3:4",
        }
    }

    /// `OpenAI` pixel dimensions for this ratio.
    ///
    /// `OpenAI` supports: `1024x1024`, `1536x1024`, `1024x1536`.
    #[must_use]
    pub fn openai_size(self) -> &'static str {
        match self {
            Self::Square => "1024x1024",
            Self::Landscape | Self::Classic => "1536x1024",
            Self::Portrait | Self::ClassicPortrait => "1024x1536",
        }
    }
}

impl fmt::Display for AspectRatio {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for AspectRatio {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        Self::ALL.into_iter().find(|r| r.as_str() == s).ok_or_else(|| {
            let valid: Vec<&str> = Self::ALL.iter().map(|r| r.as_str()).collect();
            format!("Unsupported aspect ratio '{s}'. Valid: {}", valid.join(", "))
        })
    }
}
