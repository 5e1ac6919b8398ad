// src/codec/mod.rs
//! Audio container codecs over in-memory bytes

pub mod wav;

pub use wav::WavCodec;

use crate::buffer::SampleBuffer;
use crate::error::BandlimitResult;

/// Decode and encode a container format
///
/// Codecs never touch the filesystem; callers hand in and receive bytes.
pub trait AudioCodec: Send + Sync {
    /// Short format name for logs, e.g. `"wav"`
    fn name(&self) -> &'static str;

    /// Parse a container into a sample buffer carrying its sample rate
    fn decode(&self, bytes: &[u8]) -> BandlimitResult<SampleBuffer>;

    /// Serialize a buffer at its own sample rate
    fn encode(&self, buffer: &SampleBuffer) -> BandlimitResult<Vec<u8>>;
}
