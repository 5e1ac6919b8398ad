// src/processing/pipeline.rs
//! Service-facing entry points: analyze, process, batch process

use crate::buffer::{AudioInfo, SampleBuffer};
use crate::config::{BandlimitConfig, DisplayConfig};
use crate::error::{BandlimitErrorBuilder, BandlimitResult};
use crate::processing::filter_bank::{apply_filter_spec, FilterReport};
use crate::processing::filters::FilterSpec;
use crate::processing::spectrum::{ComparisonSeries, ComparisonSpectrum, SignalSummary, SpectralSummarizer};
use serde::Serialize;
use std::time::Instant;
use tracing::{debug, info};

/// Filtered buffer plus before/after display data
#[derive(Debug, Clone)]
pub struct ProcessingResult {
    pub filtered: SampleBuffer,
    pub time_series: ComparisonSeries,
    pub spectrum: ComparisonSpectrum,
    pub sample_rate: u32,
    pub report: FilterReport,
    pub processing_time_us: u64,
}

/// The parts of a [`ProcessingResult`] a client renders
#[derive(Debug, Clone, Serialize)]
pub struct ProcessingPreview<'a> {
    pub sample_rate: u32,
    pub time_series: &'a ComparisonSeries,
    pub spectrum: &'a ComparisonSpectrum,
    pub report: &'a FilterReport,
}

impl ProcessingResult {
    pub fn preview(&self) -> ProcessingPreview<'_> {
        ProcessingPreview {
            sample_rate: self.sample_rate,
            time_series: &self.time_series,
            spectrum: &self.spectrum,
            report: &self.report,
        }
    }
}

/// Stateless signal pipeline; every call is an independent transformation
#[derive(Debug, Clone, Default)]
pub struct SignalPipeline {
    summarizer: SpectralSummarizer,
}

impl SignalPipeline {
    pub fn new(display: DisplayConfig) -> Self {
        Self {
            summarizer: SpectralSummarizer::new(display),
        }
    }

    pub fn from_config(config: &BandlimitConfig) -> Self {
        Self::new(config.display.clone())
    }

    /// Metadata of a decoded buffer
    pub fn describe(buffer: &SampleBuffer) -> AudioInfo {
        buffer.info()
    }

    /// Display data for an unfiltered buffer
    pub fn analyze(&self, buffer: &SampleBuffer) -> BandlimitResult<SignalSummary> {
        ensure_not_empty(buffer, "analyze")?;
        let summary = self.summarizer.analyze(buffer)?;

        info!(
            sample_rate = buffer.sample_rate(),
            channels = buffer.channels(),
            frames = buffer.frames(),
            time_points = summary.time_series.len(),
            spectrum_points = summary.spectrum.len(),
            "analyzed buffer"
        );
        Ok(summary)
    }

    /// Filter `buffer` and summarize it before and after
    pub fn process(&self, buffer: &SampleBuffer, spec: &FilterSpec) -> BandlimitResult<ProcessingResult> {
        ensure_not_empty(buffer, "process")?;
        let start = Instant::now();

        let (filtered, report) = apply_filter_spec(buffer, spec)?;
        debug!(?report, "filter stage finished");

        let time_series = self.summarizer.compare_series(buffer, &filtered)?;
        let spectrum = self.summarizer.compare_spectra(buffer, &filtered)?;
        let processing_time_us = start.elapsed().as_micros() as u64;

        info!(
            sample_rate = buffer.sample_rate(),
            channels = buffer.channels(),
            highpass_hz = ?spec.highpass_hz,
            lowpass_hz = ?spec.lowpass_hz,
            processing_time_us,
            "processed buffer"
        );

        Ok(ProcessingResult {
            filtered,
            time_series,
            spectrum,
            sample_rate: buffer.sample_rate(),
            report,
            processing_time_us,
        })
    }

    /// Filter only; no display data
    pub fn batch_process(&self, buffer: &SampleBuffer, spec: &FilterSpec) -> BandlimitResult<SampleBuffer> {
        ensure_not_empty(buffer, "batch_process")?;
        let (filtered, report) = apply_filter_spec(buffer, spec)?;
        debug!(?report, frames = buffer.frames(), "batch buffer filtered");
        Ok(filtered)
    }
}

fn ensure_not_empty(buffer: &SampleBuffer, operation: &str) -> BandlimitResult<()> {
    if buffer.is_empty() {
        return Err(BandlimitErrorBuilder::new("pipeline", operation).invalid_input("buffer", "buffer has no samples"));
    }
    Ok(())
}
