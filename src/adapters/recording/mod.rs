//! Recording adapters that capture provider calls to cassettes.

pub mod image_generator;

pub use image_generator::RecordingImageGenerator;
