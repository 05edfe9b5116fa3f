//! Style presets applied to each generated image.

use clap::ValueEnum;
use serde::{Deserialize, Serialize};

/// A named rendering style and the prompt modifier that produces it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StylePreset {
    /// Label shown next to the image and used in download filenames.
    pub label: &'static str,
    /// Text appended to the user prompt.
    pub modifier: &'static str,
}

impl StylePreset {
    /// Prompt sent to the provider for this style.
    #[must_use]
    pub fn apply(&self, prompt: &str) -> String {
        format!("{}, {}", prompt.trim(), self.modifier)
    }
}

const VIVID: StylePreset =
    StylePreset { label: "Vivid", modifier: "vivid colors, high contrast, rich detail" };
const PHOTOREALISTIC: StylePreset = StylePreset {
    label: "Photorealistic",
    modifier: "photorealistic, natural lighting, shot on a DSLR",
};
const ANIME: StylePreset =
    StylePreset { label: "Anime", modifier: "anime style, clean line art, cel shading" };
const WATERCOLOR: StylePreset =
    StylePreset { label: "Watercolor", modifier: "watercolor painting, soft washes, paper texture" };

/// How many images a single request produces.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum Variant {
    /// One image in the vivid style.
    #[default]
    Single,
    /// Four images, one per style.
    Quad,
}

impl Variant {
    /// Presets in the order their images are returned.
    #[must_use]
    pub fn presets(self) -> &'static [StylePreset] {
        match self {
            Self::Single => &[VIVID],
            Self::Quad => &[VIVID, PHOTOREALISTIC, ANIME, WATERCOLOR],
        }
    }
}
