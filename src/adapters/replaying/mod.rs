//! Replaying adapters that serve recorded outcomes from cassettes.

pub mod image_generator;

pub use image_generator::ReplayingImageGenerator;
