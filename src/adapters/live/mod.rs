//! Live adapters that call provider HTTP APIs.

pub mod gemini;
pub mod openai;
