// src/processing/filters/zero_phase.rs
//! Forward-backward filtering with odd-reflection edge padding

use super::{iir::sosfilt_zi, FilterError, IirFilter, SecondOrderSections};

/// Apply `sos` forward then backward so the phase response cancels
///
/// The signal is extended at both ends by an odd reflection of
/// [`SecondOrderSections::pad_len`] samples, and each pass starts every section
/// from its steady state scaled by the first sample of that pass. The signal
/// must be longer than the padding.
pub fn filtfilt(sos: &SecondOrderSections, signal: &[f64]) -> Result<Vec<f64>, FilterError> {
    let pad_len = sos.pad_len();
    if signal.len() <= pad_len {
        return Err(FilterError::SignalTooShort { len: signal.len(), pad_len });
    }

    let zi = sosfilt_zi(sos)?;
    let extended = odd_extension(signal, pad_len);

    let mut forward = run_pass(sos, &zi, extended)?;
    forward.reverse();
    let mut backward = run_pass(sos, &zi, forward)?;
    backward.reverse();

    let output: Vec<f64> = backward[pad_len..pad_len + signal.len()].to_vec();
    if output.iter().any(|y| !y.is_finite()) {
        return Err(FilterError::NonFiniteOutput);
    }

    Ok(output)
}

fn run_pass(sos: &SecondOrderSections, zi: &[Vec<f64>], mut signal: Vec<f64>) -> Result<Vec<f64>, FilterError> {
    let first = signal.first().copied().unwrap_or(0.0);
    for (section, section_zi) in sos.sections().iter().zip(zi) {
        let state = section_zi.iter().map(|z| z * first).collect();
        let mut filter = IirFilter::new(section)?.with_state(state)?;
        for sample in signal.iter_mut() {
            *sample = filter.process_sample(*sample);
        }
    }
    Ok(signal)
}

/// `2*x[0] - x[pad..0]` on the left, `2*x[last] - x[last-1..]` on the right
pub fn odd_extension(signal: &[f64], pad_len: usize) -> Vec<f64> {
    let len = signal.len();
    let mut extended = Vec::with_capacity(len + 2 * pad_len);
    if len == 0 {
        return extended;
    }
    let pad_len = pad_len.min(len - 1);
    let (first, last) = (signal[0], signal[len - 1]);

    extended.extend((1..=pad_len).rev().map(|i| 2.0 * first - signal[i]));
    extended.extend_from_slice(signal);
    extended.extend((1..=pad_len).map(|i| 2.0 * last - signal[len - 1 - i]));

    extended
}
