//! Adapter implementations for port traits.
//!
//! - `live/` - Real API implementations
//! - `recording/` - Wrap a live adapter and write a cassette
//! - `replaying/` - Serve outcomes from a cassette

pub mod live;
pub mod recording;
pub mod replaying;
