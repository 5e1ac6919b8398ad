// src/config/processing_config.rs
//! Configuration sections for filtering, display reduction, codec and batch runs

use crate::config::constants::{batch, display, filter};
use crate::processing::filters::FilterSpec;
use serde::{Deserialize, Serialize};

/// Default cutoffs applied when a caller does not supply its own [`FilterSpec`]
///
/// Interactive requests carry their own cutoffs; the batch driver and the CLI
/// fall back to these.
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
pub struct FilterConfig {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub highpass_hz: Option<f64>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub lowpass_hz: Option<f64>,
}

/// Point caps for preview data
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
pub struct DisplayConfig {
    #[serde(default = "defaults::time_series_cap")]
    pub time_series_cap: usize,

    #[serde(default = "defaults::spectrum_cap")]
    pub spectrum_cap: usize,

    #[serde(default = "defaults::max_frequency_hz")]
    pub max_frequency_hz: f64,
}

/// Codec output settings
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
pub struct CodecConfig {
    #[serde(default = "defaults::output_format")]
    pub output_format: OutputFormat,
}

/// Sample encoding for written WAV files
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    /// 16-bit signed integer PCM
    #[default]
    Pcm16,
    /// 32-bit IEEE float
    Float32,
}

/// Batch driver settings
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
pub struct BatchConfig {
    #[serde(default = "defaults::extensions")]
    pub extensions: Vec<String>,

    #[serde(default = "defaults::output_suffix")]
    pub output_suffix: String,

    #[serde(default = "defaults::worker_threads")]
    pub worker_threads: usize,

    #[serde(default = "defaults::continue_on_error")]
    pub continue_on_error: bool,
}

mod defaults {
    use super::*;

    pub fn time_series_cap() -> usize { display::DEFAULT_TIME_SERIES_CAP }
    pub fn spectrum_cap() -> usize { display::DEFAULT_SPECTRUM_CAP }
    pub fn max_frequency_hz() -> f64 { display::DEFAULT_MAX_DISPLAY_FREQUENCY_HZ }
    pub fn output_format() -> OutputFormat { OutputFormat::default() }
    pub fn extensions() -> Vec<String> {
        batch::DEFAULT_EXTENSIONS.iter().map(|ext| ext.to_string()).collect()
    }
    pub fn output_suffix() -> String { batch::DEFAULT_OUTPUT_SUFFIX.to_string() }
    pub fn worker_threads() -> usize { batch::DEFAULT_WORKER_THREADS }
    pub fn continue_on_error() -> bool { true }
}

impl FilterConfig {
    /// Filter spec built from the configured cutoffs
    pub fn to_spec(&self) -> FilterSpec {
        FilterSpec {
            highpass_hz: self.highpass_hz,
            lowpass_hz: self.lowpass_hz,
        }
    }
}

impl Default for FilterConfig {
    fn default() -> Self {
        Self {
            highpass_hz: Some(filter::DEFAULT_BATCH_HIGHPASS_HZ),
            lowpass_hz: Some(filter::DEFAULT_BATCH_LOWPASS_HZ),
        }
    }
}

impl Default for DisplayConfig {
    fn default() -> Self {
        Self {
            time_series_cap: defaults::time_series_cap(),
            spectrum_cap: defaults::spectrum_cap(),
            max_frequency_hz: defaults::max_frequency_hz(),
        }
    }
}

impl Default for CodecConfig {
    fn default() -> Self {
        Self {
            output_format: defaults::output_format(),
        }
    }
}

impl Default for BatchConfig {
    fn default() -> Self {
        Self {
            extensions: defaults::extensions(),
            output_suffix: defaults::output_suffix(),
            worker_threads: defaults::worker_threads(),
            continue_on_error: defaults::continue_on_error(),
        }
    }
}

impl BatchConfig {
    /// Case-insensitive extension match
    pub fn accepts_extension(&self, extension: &str) -> bool {
        self.extensions
            .iter()
            .any(|ext| ext.trim_start_matches('.').eq_ignore_ascii_case(extension))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_filter_defaults_match_batch_corpus() {
        let spec = FilterConfig::default().to_spec();
        assert_eq!(spec.highpass_hz, Some(50.0));
        assert_eq!(spec.lowpass_hz, Some(460.0));
    }

    #[test]
    fn test_missing_fields_take_defaults() {
        let display: DisplayConfig = toml::from_str("spectrum_cap = 2000").unwrap();
        assert_eq!(display.spectrum_cap, 2000);
        assert_eq!(display.time_series_cap, 50_000);
        assert_eq!(display.max_frequency_hz, 20_000.0);
    }

    #[test]
    fn test_output_format_names() {
        let codec: CodecConfig = toml::from_str(r#"output_format = "float32""#).unwrap();
        assert_eq!(codec.output_format, OutputFormat::Float32);
    }

    #[test]
    fn test_extension_matching() {
        let batch = BatchConfig {
            extensions: vec![".WAV".to_string()],
            ..BatchConfig::default()
        };
        assert!(batch.accepts_extension("wav"));
        assert!(batch.accepts_extension("Wav"));
        assert!(!batch.accepts_extension("flac"));
    }
}
