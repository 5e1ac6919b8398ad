// src/processing/filter_bank.rs
//! Filter engine: highpass then lowpass, zero-phase, per channel

use crate::buffer::SampleBuffer;
use crate::error::{BandlimitErrorBuilder, BandlimitResult, ProcessingStage};
use crate::processing::filters::{filtfilt, BandType, ButterworthCoefficients, FilterError, FilterSpec, SecondOrderSections};
use ndarray::Array1;
use serde::Serialize;
use tracing::{debug, warn};

/// What happened to one stage of a [`FilterSpec`]
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum StageOutcome {
    /// No cutoff requested
    Disabled,
    Applied { cutoff_hz: f64, normalized_cutoff: f64 },
    /// Cutoff at or above Nyquist; the stage left the signal untouched
    Skipped { cutoff_hz: f64, nyquist_hz: f64 },
}

impl StageOutcome {
    pub fn is_applied(&self) -> bool {
        matches!(self, StageOutcome::Applied { .. })
    }

    pub fn is_skipped(&self) -> bool {
        matches!(self, StageOutcome::Skipped { .. })
    }
}

/// Per-stage outcome of a filter run
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct FilterReport {
    pub highpass: StageOutcome,
    pub lowpass: StageOutcome,
}

impl FilterReport {
    /// Whether any stage changed the signal
    pub fn any_applied(&self) -> bool {
        self.highpass.is_applied() || self.lowpass.is_applied()
    }

    fn stage_mut(&mut self, band: BandType) -> &mut StageOutcome {
        match band {
            BandType::Highpass => &mut self.highpass,
            BandType::Lowpass => &mut self.lowpass,
        }
    }
}

impl Default for FilterReport {
    fn default() -> Self {
        Self {
            highpass: StageOutcome::Disabled,
            lowpass: StageOutcome::Disabled,
        }
    }
}

struct DesignedStage {
    band: BandType,
    sections: SecondOrderSections,
}

/// Filters designed for one sample rate, applied in order
pub struct FilterBank {
    stages: Vec<DesignedStage>,
    report: FilterReport,
    sample_rate: u32,
}

impl FilterBank {
    /// Design every active stage of `spec` for `sample_rate`
    pub fn design(spec: &FilterSpec, sample_rate: u32) -> BandlimitResult<Self> {
        if sample_rate == 0 {
            return Err(BandlimitErrorBuilder::new("filter_bank", "design")
                .invalid_input("sample_rate", "sample rate must be positive"));
        }
        spec.validate().map_err(|e| {
            BandlimitErrorBuilder::new("filter_bank", "design").invalid_input("filter_spec", e.to_string())
        })?;

        let nyquist_hz = sample_rate as f64 / 2.0;
        let mut stages = Vec::new();
        let mut report = FilterReport::default();

        for (band, cutoff_hz) in spec.stages() {
            let normalized_cutoff = cutoff_hz / nyquist_hz;

            if normalized_cutoff >= 1.0 {
                warn!(
                    band = band.name(),
                    cutoff_hz,
                    nyquist_hz,
                    "cutoff at or above Nyquist, skipping stage"
                );
                *report.stage_mut(band) = StageOutcome::Skipped { cutoff_hz, nyquist_hz };
                continue;
            }

            let sections = ButterworthCoefficients::calculate(band, normalized_cutoff)?;
            debug!(band = band.name(), cutoff_hz, normalized_cutoff, "designed butterworth stage");

            *report.stage_mut(band) = StageOutcome::Applied { cutoff_hz, normalized_cutoff };
            stages.push(DesignedStage { band, sections });
        }

        Ok(Self { stages, report, sample_rate })
    }

    /// Filter every channel of `buffer`, returning a new buffer
    pub fn apply(&self, buffer: &SampleBuffer) -> BandlimitResult<SampleBuffer> {
        if buffer.sample_rate() != self.sample_rate {
            return Err(BandlimitErrorBuilder::new("filter_bank", "apply").invalid_input(
                "sample_rate",
                format!(
                    "filters designed for {} Hz, buffer is {} Hz",
                    self.sample_rate,
                    buffer.sample_rate()
                ),
            ));
        }

        if self.stages.is_empty() {
            return Ok(buffer.clone());
        }

        let mut samples = buffer.samples().to_owned();
        for stage in &self.stages {
            for mut column in samples.columns_mut() {
                let input = column.to_vec();
                let output = filtfilt(&stage.sections, &input).map_err(|e| stage_error(stage.band, e))?;
                column.assign(&Array1::from(output));
            }
        }

        SampleBuffer::new(samples, self.sample_rate)
    }

    pub fn report(&self) -> &FilterReport {
        &self.report
    }

    /// Number of stages that will touch the signal
    pub fn active_stages(&self) -> usize {
        self.stages.len()
    }
}

fn stage_error(band: BandType, err: FilterError) -> crate::error::BandlimitError {
    let stage = match band {
        BandType::Highpass => ProcessingStage::Highpass,
        BandType::Lowpass => ProcessingStage::Lowpass,
    };
    BandlimitErrorBuilder::new("filter_bank", "apply").numerical(stage, err.to_string())
}

/// Design and apply `spec` to `buffer` in one call
pub fn apply_filter_spec(buffer: &SampleBuffer, spec: &FilterSpec) -> BandlimitResult<(SampleBuffer, FilterReport)> {
    let bank = FilterBank::design(spec, buffer.sample_rate())?;
    debug!(
        channels = buffer.channels(),
        frames = buffer.frames(),
        stages = bank.active_stages(),
        "applying filter bank"
    );
    let filtered = bank.apply(buffer)?;
    Ok((filtered, bank.report))
}
