//! Bandlimit-Core: zero-phase band-limiting filters and spectral previews for audio
//!
//! The crate takes decoded recordings, applies 4th-order Butterworth highpass and
//! lowpass filters forward and backward (no phase distortion), and reduces the
//! signal before and after filtering to display-sized time series and magnitude
//! spectra. It features:
//!
//! - Stable IIR design with steady-state edge handling
//! - Bounded-size preview data for arbitrarily long recordings
//! - WAV decoding and encoding over in-memory bytes
//! - A parallel directory batch driver
//! - Layered TOML/environment configuration
//!
//! # Quick Start
//!
//! ```rust,no_run
//! use bandlimit_core::codec::{AudioCodec, WavCodec};
//! use bandlimit_core::processing::{FilterSpec, SignalPipeline};
//!
//! fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let bytes = std::fs::read("recording.wav")?;
//!     let codec = WavCodec::default();
//!     let buffer = codec.decode(&bytes)?;
//!
//!     let pipeline = SignalPipeline::default();
//!     let result = pipeline.process(&buffer, &FilterSpec::bandpass(50.0, 460.0))?;
//!     println!("{} spectrum points", result.spectrum.len());
//!
//!     std::fs::write("recording_filted.wav", codec.encode(&result.filtered)?)?;
//!     Ok(())
//! }
//! ```

#![warn(clippy::all)]

pub mod batch;
pub mod buffer;
pub mod codec;
pub mod config;
pub mod error;
pub mod processing;

// Types most callers need
pub use buffer::{AudioInfo, SampleBuffer};
pub use config::BandlimitConfig;
pub use error::{BandlimitError, BandlimitResult, ErrorKind};
pub use processing::{
    ComparisonSeries, ComparisonSpectrum, FilterReport, FilterSpec, ProcessingResult, SignalPipeline,
    SignalSummary, SpectrumPoint, TimeSeriesPoint,
};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Library name
pub const NAME: &str = env!("CARGO_PKG_NAME");

/// Name, version and compiled-in capabilities
pub fn version_info() -> VersionInfo {
    VersionInfo {
        name: NAME.to_string(),
        version: VERSION.to_string(),
        description: "Zero-phase band-limiting filters and spectral previews".to_string(),
        filter_order: config::constants::filter::FILTER_ORDER,
        features: vec![
            "Butterworth highpass/lowpass".to_string(),
            "Forward-backward filtering".to_string(),
            "Display-bounded spectra".to_string(),
            "WAV codec".to_string(),
            "Parallel batch processing".to_string(),
        ],
    }
}

/// Library version information
#[derive(Debug, Clone, serde::Serialize)]
pub struct VersionInfo {
    pub name: String,
    pub version: String,
    pub description: String,
    pub filter_order: usize,
    pub features: Vec<String>,
}
