// src/buffer.rs
//! Owned multi-channel sample buffers

use crate::error::{BandlimitErrorBuilder, BandlimitResult};
use ndarray::{Array1, Array2, ArrayView1, Axis};
use serde::Serialize;

/// Audio samples laid out as `frames x channels`, with their sample rate
///
/// Every sample is finite and the sample rate is positive; constructors reject
/// anything else. Transformations never mutate a buffer in place: they return a
/// new one.
#[derive(Debug, Clone, PartialEq)]
pub struct SampleBuffer {
    samples: Array2<f64>,
    sample_rate: u32,
}

/// Metadata reported for a decoded recording
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct AudioInfo {
    pub sample_rate: u32,
    pub channels: usize,
    pub frames: usize,
    pub duration_secs: f64,
}

impl SampleBuffer {
    /// Wrap a `frames x channels` array
    pub fn new(samples: Array2<f64>, sample_rate: u32) -> BandlimitResult<Self> {
        let errors = BandlimitErrorBuilder::new("sample_buffer", "new");

        if sample_rate == 0 {
            return Err(errors.invalid_input("sample_rate", "sample rate must be positive"));
        }
        if samples.ncols() == 0 {
            return Err(errors.invalid_input("channels", "buffer must have at least one channel"));
        }
        if let Some(((frame, channel), value)) = samples.indexed_iter().find(|(_, v)| !v.is_finite()) {
            return Err(errors.invalid_input(
                "samples",
                format!("non-finite sample {} at frame {}, channel {}", value, frame, channel),
            ));
        }

        Ok(Self { samples, sample_rate })
    }

    /// Single-channel buffer
    pub fn from_mono(samples: Vec<f64>, sample_rate: u32) -> BandlimitResult<Self> {
        let frames = samples.len();
        let array = Array2::from_shape_vec((frames, 1), samples).map_err(|e| {
            BandlimitErrorBuilder::new("sample_buffer", "from_mono").invalid_input("samples", e.to_string())
        })?;
        Self::new(array, sample_rate)
    }

    /// Buffer from frame-interleaved samples (`[l0, r0, l1, r1, ...]`)
    pub fn from_interleaved(samples: Vec<f64>, channels: usize, sample_rate: u32) -> BandlimitResult<Self> {
        let errors = BandlimitErrorBuilder::new("sample_buffer", "from_interleaved");
        if channels == 0 {
            return Err(errors.invalid_input("channels", "buffer must have at least one channel"));
        }
        if samples.len() % channels != 0 {
            return Err(errors.invalid_input(
                "samples",
                format!("{} samples do not divide into {} channels", samples.len(), channels),
            ));
        }

        let frames = samples.len() / channels;
        let array = Array2::from_shape_vec((frames, channels), samples)
            .map_err(|e| errors.invalid_input("samples", e.to_string()))?;
        Self::new(array, sample_rate)
    }

    /// Buffer from one vector per channel; all channels must be the same length
    pub fn from_channels(channels: Vec<Vec<f64>>, sample_rate: u32) -> BandlimitResult<Self> {
        let errors = BandlimitErrorBuilder::new("sample_buffer", "from_channels");
        let channel_count = channels.len();
        if channel_count == 0 {
            return Err(errors.invalid_input("channels", "buffer must have at least one channel"));
        }

        let frames = channels[0].len();
        if let Some(bad) = channels.iter().position(|ch| ch.len() != frames) {
            return Err(errors.invalid_input(
                "channels",
                format!("channel {} has {} frames, expected {}", bad, channels[bad].len(), frames),
            ));
        }

        let array = Array2::from_shape_fn((frames, channel_count), |(frame, ch)| channels[ch][frame]);
        Self::new(array, sample_rate)
    }

    pub fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    /// Number of frames (samples per channel)
    pub fn frames(&self) -> usize {
        self.samples.nrows()
    }

    pub fn channels(&self) -> usize {
        self.samples.ncols()
    }

    pub fn is_empty(&self) -> bool {
        self.frames() == 0
    }

    pub fn nyquist_hz(&self) -> f64 {
        self.sample_rate as f64 / 2.0
    }

    pub fn duration_secs(&self) -> f64 {
        self.frames() as f64 / self.sample_rate as f64
    }

    pub fn samples(&self) -> &Array2<f64> {
        &self.samples
    }

    /// One channel along the time axis
    pub fn channel(&self, index: usize) -> ArrayView1<'_, f64> {
        self.samples.column(index)
    }

    /// Per-frame average across channels; a mono buffer is returned as-is
    pub fn to_mono(&self) -> Array1<f64> {
        if self.channels() == 1 {
            return self.samples.column(0).to_owned();
        }
        self.samples
            .mean_axis(Axis(1))
            .unwrap_or_else(|| Array1::zeros(self.frames()))
    }

    /// Frame-interleaved copy of the samples
    pub fn to_interleaved(&self) -> Vec<f64> {
        self.samples.iter().copied().collect()
    }

    pub fn info(&self) -> AudioInfo {
        AudioInfo {
            sample_rate: self.sample_rate,
            channels: self.channels(),
            frames: self.frames(),
            duration_secs: self.duration_secs(),
        }
    }

    /// Consume the buffer, returning the underlying array
    pub fn into_samples(self) -> Array2<f64> {
        self.samples
    }
}
