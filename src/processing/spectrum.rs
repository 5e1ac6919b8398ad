// src/processing/spectrum.rs
//! Spectral summarizer: bounded time series and magnitude spectra for display
//!
//! Multi-channel buffers are averaged to mono first. The spectrum is taken over
//! the full-resolution signal; only the resulting series are decimated.

use crate::buffer::SampleBuffer;
use crate::config::DisplayConfig;
use crate::error::{BandlimitErrorBuilder, BandlimitResult, ProcessingStage};
use crate::processing::decimation::{decimate, decimated_len, stride_for};
use rustfft::{num_complex::Complex, FftPlanner};
use serde::Serialize;
use tracing::debug;

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct TimeSeriesPoint {
    pub time: f64,
    pub amplitude: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct SpectrumPoint {
    pub frequency: f64,
    pub magnitude: f64,
}

/// Display data for one buffer
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SignalSummary {
    pub time_series: Vec<TimeSeriesPoint>,
    pub spectrum: Vec<SpectrumPoint>,
    pub sample_rate: u32,
}

impl SignalSummary {
    /// Frequency of the largest magnitude, ignoring DC
    pub fn peak_frequency_hz(&self) -> Option<f64> {
        self.spectrum
            .iter()
            .filter(|p| p.frequency > 0.0)
            .max_by(|a, b| a.magnitude.total_cmp(&b.magnitude))
            .map(|p| p.frequency)
    }
}

/// Original and filtered amplitudes on one time axis
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ComparisonSeries {
    pub time: Vec<f64>,
    pub original: Vec<f64>,
    pub filtered: Vec<f64>,
}

impl ComparisonSeries {
    pub fn len(&self) -> usize {
        self.time.len()
    }

    pub fn is_empty(&self) -> bool {
        self.time.is_empty()
    }
}

/// Original and filtered magnitudes on one frequency axis
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ComparisonSpectrum {
    pub frequency: Vec<f64>,
    pub original: Vec<f64>,
    pub filtered: Vec<f64>,
}

impl ComparisonSpectrum {
    pub fn len(&self) -> usize {
        self.frequency.len()
    }

    pub fn is_empty(&self) -> bool {
        self.frequency.is_empty()
    }

    /// Frequency of the largest original magnitude, ignoring DC
    pub fn original_peak_hz(&self) -> Option<f64> {
        peak_frequency(&self.frequency, &self.original)
    }

    /// Frequency of the largest filtered magnitude, ignoring DC
    pub fn filtered_peak_hz(&self) -> Option<f64> {
        peak_frequency(&self.frequency, &self.filtered)
    }

    /// Filtered magnitude at the original peak over the original peak magnitude
    pub fn peak_retention(&self) -> Option<f64> {
        let peak_hz = self.original_peak_hz()?;
        let index = self.frequency.iter().position(|&f| f == peak_hz)?;
        let original = self.original[index];
        (original > 0.0).then(|| self.filtered[index] / original)
    }
}

fn peak_frequency(frequency: &[f64], magnitude: &[f64]) -> Option<f64> {
    frequency
        .iter()
        .zip(magnitude)
        .filter(|(f, _)| **f > 0.0)
        .max_by(|a, b| a.1.total_cmp(b.1))
        .map(|(f, _)| *f)
}

/// One-sided magnitude spectrum: bins `0..=N/2`, `f_k = k * sr / N`
pub fn magnitude_spectrum(signal: &[f64], sample_rate: u32) -> (Vec<f64>, Vec<f64>) {
    let n = signal.len();
    if n == 0 {
        return (Vec::new(), Vec::new());
    }

    let mut planner = FftPlanner::<f64>::new();
    let fft = planner.plan_fft_forward(n);
    let mut buffer: Vec<Complex<f64>> = signal.iter().map(|&x| Complex::new(x, 0.0)).collect();
    fft.process(&mut buffer);

    let bins = n / 2 + 1;
    let bin_width = sample_rate as f64 / n as f64;
    let frequency = (0..bins).map(|k| k as f64 * bin_width).collect();
    let magnitude = buffer[..bins].iter().map(|c| c.norm()).collect();

    (frequency, magnitude)
}

/// Reduces buffers to display-safe series
#[derive(Debug, Clone, Default)]
pub struct SpectralSummarizer {
    config: DisplayConfig,
}

impl SpectralSummarizer {
    pub fn new(config: DisplayConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &DisplayConfig {
        &self.config
    }

    /// Time series and spectrum of one buffer
    pub fn analyze(&self, buffer: &SampleBuffer) -> BandlimitResult<SignalSummary> {
        let mono = buffer.to_mono().to_vec();
        let sample_rate = buffer.sample_rate();

        let stride = stride_for(mono.len(), self.config.time_series_cap);
        debug!(frames = mono.len(), stride, points = decimated_len(mono.len(), stride), "decimating time series");
        let time_series = time_axis(mono.len(), stride, sample_rate)
            .into_iter()
            .zip(decimate(&mono, stride))
            .map(|(time, amplitude)| TimeSeriesPoint { time, amplitude })
            .collect();

        let (frequency, magnitude) = magnitude_spectrum(&mono, sample_rate);
        let kept = self.bins_within_display(&frequency);
        let stride = stride_for(kept, self.config.spectrum_cap);
        debug!(bins = frequency.len(), kept, stride, points = decimated_len(kept, stride), "decimating spectrum");

        let magnitude = decimate(&magnitude[..kept], stride);
        check_finite(&magnitude)?;
        let spectrum = decimate(&frequency[..kept], stride)
            .into_iter()
            .zip(magnitude)
            .map(|(frequency, magnitude)| SpectrumPoint { frequency, magnitude })
            .collect();

        Ok(SignalSummary { time_series, spectrum, sample_rate })
    }

    /// Time series of `original` and `filtered` on a shared time axis
    pub fn compare_series(&self, original: &SampleBuffer, filtered: &SampleBuffer) -> BandlimitResult<ComparisonSeries> {
        check_comparable(original, filtered)?;
        let original_mono = original.to_mono().to_vec();
        let filtered_mono = filtered.to_mono().to_vec();

        let stride = stride_for(original_mono.len(), self.config.time_series_cap);
        debug!(frames = original_mono.len(), stride, "decimating comparison series");

        Ok(ComparisonSeries {
            time: time_axis(original_mono.len(), stride, original.sample_rate()),
            original: decimate(&original_mono, stride),
            filtered: decimate(&filtered_mono, stride),
        })
    }

    /// Spectra of `original` and `filtered` on a shared frequency axis
    pub fn compare_spectra(&self, original: &SampleBuffer, filtered: &SampleBuffer) -> BandlimitResult<ComparisonSpectrum> {
        check_comparable(original, filtered)?;
        let sample_rate = original.sample_rate();

        let (frequency, original_mag) = magnitude_spectrum(&original.to_mono().to_vec(), sample_rate);
        let (_, filtered_mag) = magnitude_spectrum(&filtered.to_mono().to_vec(), sample_rate);

        let kept = self.bins_within_display(&frequency);
        let stride = stride_for(kept, self.config.spectrum_cap);
        debug!(bins = frequency.len(), kept, stride, "decimating comparison spectra");

        let spectrum = ComparisonSpectrum {
            frequency: decimate(&frequency[..kept], stride),
            original: decimate(&original_mag[..kept], stride),
            filtered: decimate(&filtered_mag[..kept], stride),
        };
        check_finite(&spectrum.original)?;
        check_finite(&spectrum.filtered)?;

        Ok(spectrum)
    }

    /// Number of leading bins at or below the display ceiling
    fn bins_within_display(&self, frequency: &[f64]) -> usize {
        frequency.partition_point(|&f| f <= self.config.max_frequency_hz)
    }
}

/// `index * stride / sample_rate` for every kept sample
fn time_axis(len: usize, stride: usize, sample_rate: u32) -> Vec<f64> {
    (0..len)
        .step_by(stride.max(1))
        .map(|index| index as f64 / sample_rate as f64)
        .collect()
}

fn check_comparable(original: &SampleBuffer, filtered: &SampleBuffer) -> BandlimitResult<()> {
    if original.frames() != filtered.frames() || original.sample_rate() != filtered.sample_rate() {
        return Err(BandlimitErrorBuilder::new("spectrum", "compare").invalid_input(
            "filtered",
            format!(
                "cannot compare {} frames at {} Hz with {} frames at {} Hz",
                original.frames(),
                original.sample_rate(),
                filtered.frames(),
                filtered.sample_rate()
            ),
        ));
    }
    Ok(())
}

fn check_finite(magnitude: &[f64]) -> BandlimitResult<()> {
    if magnitude.iter().any(|m| !m.is_finite()) {
        return Err(BandlimitErrorBuilder::new("spectrum", "fft")
            .numerical(ProcessingStage::Spectrum, "spectrum contains non-finite magnitudes"));
    }
    Ok(())
}
