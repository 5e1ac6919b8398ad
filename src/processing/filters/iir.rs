// src/processing/filters/iir.rs
//! IIR Butterworth design and direct-form filtering

use super::{BandType, FilterError, IirCoefficients, SecondOrderSections};
use crate::config::constants::filter::{FILTER_ORDER, SECTION_COUNT};
use std::f64::consts::PI;

/// Damping of the two second-order sections of a 4th-order Butterworth prototype
const SECTION_DAMPING: [f64; SECTION_COUNT] = [0.765_366_864_730_179_9, 1.847_759_065_022_573_5];

/// Butterworth coefficient calculator
pub struct ButterworthCoefficients;

impl ButterworthCoefficients {
    /// Design a 4th-order filter for `normalized_cutoff = cutoff / nyquist` in (0, 1)
    pub fn calculate(band_type: BandType, normalized_cutoff: f64) -> Result<SecondOrderSections, FilterError> {
        if !normalized_cutoff.is_finite() || normalized_cutoff <= 0.0 || normalized_cutoff >= 1.0 {
            return Err(FilterError::InvalidParameters(format!(
                "normalized cutoff must lie in (0, 1), got {}",
                normalized_cutoff
            )));
        }

        // Pre-warp for the bilinear transform
        let k = (PI * normalized_cutoff / 2.0).tan();

        let sections: Vec<IirCoefficients> = SECTION_DAMPING
            .iter()
            .map(|&damping| Self::second_order_section(band_type, k, damping))
            .collect();
        for section in &sections {
            check_stability(&section.a)?;
        }

        let sos = SecondOrderSections::new(sections)?;
        debug_assert_eq!(sos.order(), FILTER_ORDER);
        Ok(sos)
    }

    pub fn calculate_highpass(normalized_cutoff: f64) -> Result<SecondOrderSections, FilterError> {
        Self::calculate(BandType::Highpass, normalized_cutoff)
    }

    pub fn calculate_lowpass(normalized_cutoff: f64) -> Result<SecondOrderSections, FilterError> {
        Self::calculate(BandType::Lowpass, normalized_cutoff)
    }

    fn second_order_section(band_type: BandType, k: f64, damping: f64) -> IirCoefficients {
        let k2 = k * k;
        let norm = 1.0 + damping * k + k2;

        let b = match band_type {
            BandType::Lowpass => vec![k2 / norm, 2.0 * k2 / norm, k2 / norm],
            BandType::Highpass => vec![1.0 / norm, -2.0 / norm, 1.0 / norm],
        };

        IirCoefficients {
            b,
            a: vec![1.0, 2.0 * (k2 - 1.0) / norm, (1.0 - damping * k + k2) / norm],
        }
    }
}

/// Polynomial product
pub(crate) fn convolve(lhs: &[f64], rhs: &[f64]) -> Vec<f64> {
    let mut out = vec![0.0; lhs.len() + rhs.len() - 1];
    for (i, &l) in lhs.iter().enumerate() {
        for (j, &r) in rhs.iter().enumerate() {
            out[i + j] += l * r;
        }
    }
    out
}

/// Schur-Cohn step-down test: every root of `a` strictly inside the unit circle
pub fn check_stability(a: &[f64]) -> Result<(), FilterError> {
    let Some(&a0) = a.first() else {
        return Err(FilterError::InvalidCoefficients("empty denominator".to_string()));
    };
    if a0 == 0.0 || !a0.is_finite() {
        return Err(FilterError::InvalidCoefficients(format!("leading denominator coefficient is {}", a0)));
    }

    let mut poly: Vec<f64> = a.iter().map(|&c| c / a0).collect();
    if poly.iter().any(|c| !c.is_finite()) {
        return Err(FilterError::InvalidCoefficients("non-finite denominator".to_string()));
    }

    while poly.len() > 1 {
        let n = poly.len() - 1;
        let reflection = poly[n];
        if reflection.abs() >= 1.0 {
            return Err(FilterError::Unstable(format!(
                "reflection coefficient {} at degree {} is outside the unit circle",
                reflection, n
            )));
        }

        let scale = 1.0 - reflection * reflection;
        poly = (0..n)
            .map(|i| (poly[i] - reflection * poly[n - i]) / scale)
            .collect();
    }

    Ok(())
}

/// Stateful IIR filter in transposed direct form II
pub struct IirFilter {
    b: Vec<f64>,
    a: Vec<f64>,
    state: Vec<f64>,
}

impl IirFilter {
    /// Create filter from coefficients, normalizing so `a[0] == 1`
    pub fn new(coefficients: &IirCoefficients) -> Result<Self, FilterError> {
        let a0 = coefficients.a.first().copied().unwrap_or(0.0);
        if a0 == 0.0 || coefficients.b.is_empty() {
            return Err(FilterError::InvalidCoefficients(
                "denominator must start with a non-zero coefficient".to_string(),
            ));
        }

        let taps = coefficients.a.len().max(coefficients.b.len());
        let mut b = vec![0.0; taps];
        let mut a = vec![0.0; taps];
        for (dst, &src) in b.iter_mut().zip(&coefficients.b) {
            *dst = src / a0;
        }
        for (dst, &src) in a.iter_mut().zip(&coefficients.a) {
            *dst = src / a0;
        }

        Ok(Self {
            state: vec![0.0; taps - 1],
            b,
            a,
        })
    }

    /// Start from a given internal state (length `taps - 1`)
    pub fn with_state(mut self, state: Vec<f64>) -> Result<Self, FilterError> {
        if state.len() != self.state.len() {
            return Err(FilterError::InvalidParameters(format!(
                "initial state has {} entries, expected {}",
                state.len(),
                self.state.len()
            )));
        }
        self.state = state;
        Ok(self)
    }

    /// Process single sample
    pub fn process_sample(&mut self, input: f64) -> f64 {
        let output = self.b[0] * input + self.state.first().copied().unwrap_or(0.0);

        let last = self.state.len();
        for i in 0..last {
            let carry = if i + 1 < last { self.state[i + 1] } else { 0.0 };
            self.state[i] = self.b[i + 1] * input + carry - self.a[i + 1] * output;
        }

        output
    }

    /// Filter a whole signal in order
    pub fn process<I: IntoIterator<Item = f64>>(&mut self, input: I) -> Vec<f64> {
        input.into_iter().map(|x| self.process_sample(x)).collect()
    }

    /// Reset filter state
    pub fn reset(&mut self) {
        self.state.fill(0.0);
    }

    pub fn state(&self) -> &[f64] {
        &self.state
    }

    /// Get filter order
    pub fn order(&self) -> usize {
        self.state.len()
    }
}

/// Initial state for a unit step at steady state
///
/// Scaling the result by the first input sample starts the filter as if that
/// value had been applied forever, which removes the start-up transient.
pub fn lfilter_zi(coefficients: &IirCoefficients) -> Result<Vec<f64>, FilterError> {
    let filter = IirFilter::new(coefficients)?;
    let (b, a) = (&filter.b, &filter.a);
    let n = a.len();
    if n < 2 {
        return Ok(Vec::new());
    }

    let a_sum: f64 = a.iter().sum();
    if a_sum == 0.0 || !a_sum.is_finite() {
        return Err(FilterError::InvalidCoefficients(
            "denominator has a pole at z = 1, no steady state".to_string(),
        ));
    }

    let b_sum: f64 = (1..n).map(|i| b[i] - a[i] * b[0]).sum();

    let mut zi = vec![0.0; n - 1];
    zi[0] = b_sum / a_sum;

    let mut a_acc = 1.0;
    let mut c_acc = 0.0;
    for k in 1..n - 1 {
        a_acc += a[k];
        c_acc += b[k] - a[k] * b[0];
        zi[k] = a_acc * zi[0] - c_acc;
    }

    Ok(zi)
}

/// Steady-state initial conditions for every section of a cascade
///
/// Each section's state is scaled by the DC gain of the sections before it.
pub fn sosfilt_zi(sos: &SecondOrderSections) -> Result<Vec<Vec<f64>>, FilterError> {
    let mut scale = 1.0;
    let mut states = Vec::with_capacity(sos.sections().len());
    for section in sos.sections() {
        let zi = lfilter_zi(section)?;
        states.push(zi.into_iter().map(|z| z * scale).collect());
        scale *= section.dc_gain();
    }
    Ok(states)
}
