// tests/pipeline_scenarios.rs
//! End-to-end pipeline runs on synthetic recordings

use bandlimit_core::codec::{AudioCodec, WavCodec};
use bandlimit_core::config::{BandlimitConfig, OutputFormat};
use bandlimit_core::processing::{FilterSpec, SignalPipeline, StageOutcome};
use bandlimit_core::{ErrorKind, SampleBuffer};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::f64::consts::PI;

fn sine(freq: f64, sample_rate: u32, frames: usize, amplitude: f64) -> Vec<f64> {
    (0..frames)
        .map(|n| amplitude * (2.0 * PI * freq * n as f64 / sample_rate as f64).sin())
        .collect()
}

fn rms(samples: &[f64]) -> f64 {
    (samples.iter().map(|x| x * x).sum::<f64>() / samples.len() as f64).sqrt()
}

#[test]
fn test_passband_tone_through_batch_corpus_filter() {
    let sample_rate = 8000;
    let signal = sine(100.0, sample_rate, 16_000, 0.8);
    let buffer = SampleBuffer::from_mono(signal.clone(), sample_rate).unwrap();

    let result = SignalPipeline::default()
        .process(&buffer, &FilterSpec::bandpass(50.0, 460.0))
        .unwrap();

    assert_eq!(result.sample_rate, 8000);
    assert_eq!(result.filtered.frames(), buffer.frames());
    assert_eq!(result.filtered.channels(), 1);
    assert!(result.report.highpass.is_applied());
    assert!(result.report.lowpass.is_applied());

    assert!(result.spectrum.frequency.iter().all(|&f| f <= 4000.0));
    assert_eq!(result.spectrum.original_peak_hz(), Some(100.0));
    assert_eq!(result.spectrum.filtered_peak_hz(), Some(100.0));
    assert!(result.spectrum.peak_retention().unwrap() >= 0.95);

    let filtered = result.filtered.channel(0).to_vec();
    let retained = rms(&filtered[1000..15_000]) / rms(&signal[1000..15_000]);
    assert!(retained > 0.95 && retained < 1.01, "rms ratio {}", retained);
}

#[test]
fn test_long_recording_reduced_for_display() {
    let sample_rate = 44_100;
    let mut rng = StdRng::seed_from_u64(11);
    let samples: Vec<f64> = (0..200_000).map(|_| rng.gen_range(-0.5..0.5)).collect();
    let buffer = SampleBuffer::from_mono(samples, sample_rate).unwrap();

    let result = SignalPipeline::default()
        .process(&buffer, &FilterSpec::lowpass(5000.0))
        .unwrap();

    // stride 4 lands exactly on the time cap
    assert_eq!(result.time_series.len(), 50_000);
    assert_eq!(result.time_series.time[0], 0.0);
    assert_eq!(result.time_series.time[1], 4.0 / 44_100.0);

    // 90703 bins up to 20 kHz, stride 10
    assert_eq!(result.spectrum.len(), 9071);
    assert!(result.spectrum.frequency.iter().all(|&f| f <= 20_000.0));
    assert_eq!(result.filtered.frames(), 200_000);
}

#[test]
fn test_long_recording_analyzed_without_filtering() {
    let mut rng = StdRng::seed_from_u64(12);
    let samples: Vec<f64> = (0..200_000).map(|_| rng.gen_range(-0.5..0.5)).collect();
    let buffer = SampleBuffer::from_mono(samples, 44_100).unwrap();

    let summary = SignalPipeline::default().analyze(&buffer).unwrap();

    assert_eq!(summary.time_series.len(), 50_000);
    assert_eq!(summary.time_series[1].time, 4.0 / 44_100.0);
    assert_eq!(summary.time_series[49_999].time, 199_996.0 / 44_100.0);

    assert!(summary.spectrum.len() <= 10_000);
    assert_eq!(summary.spectrum.len(), 9071);
    assert!(summary.spectrum.iter().all(|p| p.frequency <= 20_000.0));
    assert_eq!(summary.sample_rate, 44_100);
}

#[test]
fn test_empty_spec_reproduces_input() {
    let buffer = SampleBuffer::from_channels(vec![sine(220.0, 16_000, 4000, 0.5), sine(330.0, 16_000, 4000, 0.25)], 16_000)
        .unwrap();
    let result = SignalPipeline::default().process(&buffer, &FilterSpec::none()).unwrap();

    assert_eq!(result.filtered, buffer);
    assert_eq!(result.time_series.original, result.time_series.filtered);
    assert_eq!(result.spectrum.original, result.spectrum.filtered);
    assert_eq!(result.report.highpass, StageOutcome::Disabled);
    assert_eq!(result.report.lowpass, StageOutcome::Disabled);
}

#[test]
fn test_lowpass_above_nyquist_reported_as_skipped() {
    let buffer = SampleBuffer::from_mono(sine(100.0, 8000, 2000, 0.5), 8000).unwrap();
    let result = SignalPipeline::default()
        .process(&buffer, &FilterSpec::lowpass(10_000.0))
        .unwrap();

    assert_eq!(
        result.report.lowpass,
        StageOutcome::Skipped { cutoff_hz: 10_000.0, nyquist_hz: 4000.0 }
    );
    assert_eq!(result.filtered, buffer);
}

#[test]
fn test_decode_process_encode_round_trip() {
    let config = BandlimitConfig::default();
    let codec = WavCodec::from_config(&config.codec);
    assert_eq!(codec.output_format(), OutputFormat::Pcm16);

    let buffer = SampleBuffer::from_mono(sine(300.0, 8000, 8000, 0.5), 8000).unwrap();
    let bytes = codec.encode(&buffer).unwrap();

    let decoded = codec.decode(&bytes).unwrap();
    let pipeline = SignalPipeline::from_config(&config);
    let filtered = pipeline.batch_process(&decoded, &config.filter.to_spec()).unwrap();
    let reencoded = codec.decode(&codec.encode(&filtered).unwrap()).unwrap();

    assert_eq!(reencoded.sample_rate(), 8000);
    assert_eq!(reencoded.frames(), 8000);
    // 300 Hz sits inside the 50..460 Hz band
    let retained = rms(&reencoded.channel(0).to_vec()[1000..7000]) / rms(&decoded.channel(0).to_vec()[1000..7000]);
    assert!(retained > 0.8, "rms ratio {}", retained);
}

#[test]
fn test_short_buffer_reports_numerical_error() {
    let buffer = SampleBuffer::from_mono(vec![0.1; 10], 8000).unwrap();
    let err = SignalPipeline::default()
        .process(&buffer, &FilterSpec::highpass(100.0))
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Numerical);

    // Without active stages the same buffer is fine
    assert!(SignalPipeline::default().process(&buffer, &FilterSpec::none()).is_ok());
}
