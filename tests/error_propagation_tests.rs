// tests/error_propagation_tests.rs
//! Error propagation across the processing boundary
//!
//! Each failure class must surface as the matching [`ErrorKind`] with the
//! context of the component that raised it, whichever entry point the caller used.

use bandlimit_core::codec::{AudioCodec, WavCodec};
use bandlimit_core::config::ConfigLoader;
use bandlimit_core::error::{BandlimitError, BandlimitResult, ErrorKind, ProcessingStage};
use bandlimit_core::processing::{FilterSpec, SignalPipeline};
use bandlimit_core::SampleBuffer;
use serial_test::serial;
use std::path::PathBuf;
use tempfile::TempDir;

#[test]
fn test_zero_sample_rate_is_invalid_input() {
    let err = SampleBuffer::from_mono(vec![0.0; 32], 0).unwrap_err();

    match &err {
        BandlimitError::InvalidInput { field, context, .. } => {
            assert_eq!(field, "sample_rate");
            assert_eq!(context.component, "sample_buffer");
        }
        other => panic!("Expected invalid input error, got: {:?}", other),
    }
    assert!(err.to_string().contains("INPUT"));
}

#[test]
fn test_non_finite_sample_reports_position() {
    let err = SampleBuffer::from_channels(vec![vec![0.0, 0.1, 0.2], vec![0.0, f64::INFINITY, 0.0]], 8000).unwrap_err();

    match err {
        BandlimitError::InvalidInput { field, reason, .. } => {
            assert_eq!(field, "samples");
            assert!(reason.contains("frame 1"));
            assert!(reason.contains("channel 1"));
        }
        other => panic!("Expected invalid input error, got: {:?}", other),
    }
}

#[test]
fn test_bad_cutoff_is_invalid_input_not_numerical() {
    let buffer = SampleBuffer::from_mono(vec![0.0; 256], 8000).unwrap();
    let pipeline = SignalPipeline::default();

    for spec in [FilterSpec::highpass(0.0), FilterSpec::lowpass(-5.0), FilterSpec::bandpass(50.0, f64::NAN)] {
        let err = pipeline.process(&buffer, &spec).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidInput, "{:?}", spec);
        assert_eq!(err.context().component, "filter_bank");
    }
}

#[test]
fn test_decode_error_carries_codec_context() {
    let err = WavCodec::default().decode(&[0u8; 44]).unwrap_err();

    assert_eq!(err.kind(), ErrorKind::Decode);
    assert_eq!(err.context().component, "wav_codec");
    assert_eq!(err.context().operation, "decode");
    assert!(err.to_string().starts_with("[DECODE]"));
}

#[test]
fn test_short_buffer_names_failing_stage() {
    let buffer = SampleBuffer::from_mono(vec![0.5; 12], 16_000).unwrap();

    let highpass_err = SignalPipeline::default()
        .batch_process(&buffer, &FilterSpec::bandpass(100.0, 1000.0))
        .unwrap_err();
    match highpass_err {
        BandlimitError::Numerical { stage, reason, context } => {
            // Highpass runs first, so it is the stage that fails
            assert_eq!(stage, ProcessingStage::Highpass);
            assert!(reason.contains("12"));
            assert_eq!(context.operation, "apply");
        }
        other => panic!("Expected numerical error, got: {:?}", other),
    }
}

#[test]
fn test_error_propagates_through_question_mark() {
    fn decode_and_filter(bytes: &[u8]) -> BandlimitResult<SampleBuffer> {
        let buffer = WavCodec::default().decode(bytes)?;
        SignalPipeline::default().batch_process(&buffer, &FilterSpec::lowpass(100.0))
    }

    let err = decode_and_filter(b"RIFF").unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Decode);
}

#[test]
fn test_error_context_serializes() {
    let err = WavCodec::default().decode(b"junk").unwrap_err();
    let json = serde_json::to_value(err.context()).unwrap();

    assert_eq!(json["component"], "wav_codec");
    assert_eq!(json["operation"], "decode");
    assert!(json.get("timestamp").is_some());
    assert_eq!(serde_json::to_value(err.kind()).unwrap(), "decode");
}

#[test]
fn test_malformed_config_file_is_configuration_error() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("broken.toml");
    std::fs::write(&path, "[filter\nhighpass_hz = ").unwrap();

    let load = |paths: Vec<PathBuf>| -> BandlimitResult<_> { Ok(ConfigLoader::with_paths(paths).load()?) };
    let err = load(vec![path]).unwrap_err();

    assert_eq!(err.kind(), ErrorKind::Configuration);
    assert_eq!(err.context().component, "config_loader");
}

#[test]
#[serial]
fn test_unparseable_environment_override() {
    std::env::set_var("BLERR_FILTER_LOWPASS_HZ", "not-a-frequency");

    let result = ConfigLoader::with_paths(Vec::new()).with_env_prefix("BLERR_").load();
    std::env::remove_var("BLERR_FILTER_LOWPASS_HZ");

    let err: BandlimitError = result.unwrap_err().into();
    assert_eq!(err.kind(), ErrorKind::Configuration);
}

#[test]
fn test_errors_cross_threads() {
    let handle = std::thread::spawn(|| WavCodec::default().decode(b"not wav"));
    let err = handle.join().unwrap().unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Decode);
}
