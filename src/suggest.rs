//! Canned example prompts.

use rand::seq::SliceRandom;

/// Built-in example prompts.
pub const EXAMPLE_PROMPTS: &[&str] = &[
    "A majestic lion wearing a crown, cinematic style",
    "A cute corgi working on a laptop, pixel art",
    "Synthwave sunset over a retro-futuristic city",
    "An enchanted forest library with glowing books",
];

/// Hands out example prompts, either a specific one or one at random.
#[derive(Debug, Clone)]
pub struct ExampleSuggester {
    prompts: &'static [&'static str],
}

impl ExampleSuggester {
    /// Suggester over a fixed prompt list.
    #[must_use]
    pub fn new(prompts: &'static [&'static str]) -> Self {
        Self { prompts }
    }

    /// All prompts, in display order.
    #[must_use]
    pub fn prompts(&self) -> &'static [&'static str] {
        self.prompts
    }

    /// A uniformly random prompt, or `None` if the list is empty.
    #[must_use]
    pub fn pick_random(&self) -> Option<&'static str> {
        self.prompts.choose(&mut rand::thread_rng()).copied()
    }

    /// The prompt at `index`.
    #[must_use]
    pub fn pick(&self, index: usize) -> Option<&'static str> {
        self.prompts.get(index).copied()
    }
}

impl Default for ExampleSuggester {
    fn default() -> Self {
        Self::new(EXAMPLE_PROMPTS)
    }
}
