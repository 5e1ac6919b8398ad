// src/processing/filters/mod.rs
//! Butterworth band-limiting filters and zero-phase application

pub mod iir;
pub mod zero_phase;

pub use iir::*;
pub use zero_phase::*;

use crate::config::constants::filter as filter_consts;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BandType {
    Highpass,
    Lowpass,
}

impl BandType {
    pub fn name(self) -> &'static str {
        match self {
            BandType::Highpass => "highpass",
            BandType::Lowpass => "lowpass",
        }
    }
}

/// Requested cutoffs in Hz; `None` disables that stage
///
/// A present cutoff must be strictly positive. A cutoff at or above the Nyquist
/// frequency of the buffer it is applied to is not an error: the stage is skipped.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct FilterSpec {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub highpass_hz: Option<f64>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub lowpass_hz: Option<f64>,
}

impl FilterSpec {
    /// No filtering at all
    pub fn none() -> Self {
        Self::default()
    }

    pub fn highpass(cutoff_hz: f64) -> Self {
        Self { highpass_hz: Some(cutoff_hz), lowpass_hz: None }
    }

    pub fn lowpass(cutoff_hz: f64) -> Self {
        Self { highpass_hz: None, lowpass_hz: Some(cutoff_hz) }
    }

    pub fn bandpass(highpass_hz: f64, lowpass_hz: f64) -> Self {
        Self { highpass_hz: Some(highpass_hz), lowpass_hz: Some(lowpass_hz) }
    }

    pub fn is_empty(&self) -> bool {
        self.highpass_hz.is_none() && self.lowpass_hz.is_none()
    }

    /// Stages in application order: highpass first, then lowpass
    pub fn stages(&self) -> impl Iterator<Item = (BandType, f64)> {
        [
            self.highpass_hz.map(|hz| (BandType::Highpass, hz)),
            self.lowpass_hz.map(|hz| (BandType::Lowpass, hz)),
        ]
        .into_iter()
        .flatten()
    }

    /// Reject non-positive or non-finite cutoffs
    pub fn validate(&self) -> Result<(), FilterError> {
        for (band, cutoff) in self.stages() {
            if !cutoff.is_finite() || cutoff <= 0.0 {
                return Err(FilterError::InvalidParameters(format!(
                    "{} cutoff must be a positive frequency, got {}",
                    band.name(),
                    cutoff
                )));
            }
        }
        Ok(())
    }
}

/// Transfer function coefficients, `a[0] == 1`
#[derive(Debug, Clone, PartialEq)]
pub struct IirCoefficients {
    pub b: Vec<f64>,
    pub a: Vec<f64>,
}

impl IirCoefficients {
    /// Filter order (denominator degree)
    pub fn order(&self) -> usize {
        self.a.len().saturating_sub(1)
    }

    /// Whether every pole lies strictly inside the unit circle
    pub fn is_stable(&self) -> bool {
        iir::check_stability(&self.a).is_ok()
    }

    /// DC gain `sum(b) / sum(a)`
    pub fn dc_gain(&self) -> f64 {
        self.b.iter().sum::<f64>() / self.a.iter().sum::<f64>()
    }
}

/// Cascade of second-order sections, applied in order
///
/// Filtering runs section by section. Multiplying the sections out into a
/// single transfer function is exact on paper but loses the pole positions in
/// f64 for cutoffs close to 0 or to Nyquist.
#[derive(Debug, Clone, PartialEq)]
pub struct SecondOrderSections {
    sections: Vec<IirCoefficients>,
}

impl SecondOrderSections {
    pub fn new(sections: Vec<IirCoefficients>) -> Result<Self, FilterError> {
        if sections.is_empty() {
            return Err(FilterError::InvalidCoefficients("no sections".to_string()));
        }
        if let Some(bad) = sections.iter().find(|s| s.a.len() != 3 || s.b.len() != 3) {
            return Err(FilterError::InvalidCoefficients(format!(
                "section must have 3 taps, got b: {} a: {}",
                bad.b.len(),
                bad.a.len()
            )));
        }
        Ok(Self { sections })
    }

    pub fn sections(&self) -> &[IirCoefficients] {
        &self.sections
    }

    /// Overall filter order
    pub fn order(&self) -> usize {
        2 * self.sections.len()
    }

    /// Edge padding used by forward-backward application
    pub fn pad_len(&self) -> usize {
        filter_consts::PAD_FACTOR * (self.order() + 1)
    }

    pub fn is_stable(&self) -> bool {
        self.sections.iter().all(IirCoefficients::is_stable)
    }

    /// The sections multiplied out into one `b`/`a` pair
    pub fn transfer_function(&self) -> IirCoefficients {
        let mut sections = self.sections.iter();
        let mut acc = sections.next().cloned().unwrap_or(IirCoefficients { b: vec![1.0], a: vec![1.0] });
        for section in sections {
            acc = IirCoefficients {
                b: iir::convolve(&acc.b, &section.b),
                a: iir::convolve(&acc.a, &section.a),
            };
        }
        acc
    }
}

/// Filter design and application errors
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum FilterError {
    #[error("Invalid parameters: {0}")]
    InvalidParameters(String),
    #[error("Invalid coefficients: {0}")]
    InvalidCoefficients(String),
    #[error("Unstable filter: {0}")]
    Unstable(String),
    #[error("Signal of {len} samples is too short for padding of {pad_len}")]
    SignalTooShort { len: usize, pad_len: usize },
    #[error("Filter output is not finite")]
    NonFiniteOutput,
}
