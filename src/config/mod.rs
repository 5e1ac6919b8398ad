// src/config/mod.rs
//! Configuration management: defaults, TOML files and environment overrides

pub mod constants;
pub mod loader;
pub mod processing_config;
pub mod schema_validator;

pub use constants::*;
pub use loader::{ConfigError, ConfigLoader};
pub use processing_config::*;
pub use schema_validator::{SchemaValidator, ValidationError};

use serde::{Deserialize, Serialize};

/// Complete crate configuration
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq, Default)]
pub struct BandlimitConfig {
    #[serde(default)]
    pub filter: FilterConfig,

    #[serde(default)]
    pub display: DisplayConfig,

    #[serde(default)]
    pub codec: CodecConfig,

    #[serde(default)]
    pub batch: BatchConfig,
}

impl BandlimitConfig {
    /// Checks the loaded values against each other; returns every problem found
    pub fn validate_consistency(&self) -> Result<(), Vec<String>> {
        let mut errors = Vec::new();

        for (name, cutoff) in [("highpass", self.filter.highpass_hz), ("lowpass", self.filter.lowpass_hz)] {
            if let Some(hz) = cutoff {
                if !hz.is_finite() || hz <= 0.0 {
                    errors.push(format!("{} cutoff ({} Hz) must be a positive frequency", name, hz));
                }
            }
        }

        if let (Some(hp), Some(lp)) = (self.filter.highpass_hz, self.filter.lowpass_hz) {
            if hp >= lp {
                errors.push(format!(
                    "Highpass cutoff ({} Hz) must be below lowpass cutoff ({} Hz)",
                    hp, lp
                ));
            }
        }

        if self.display.time_series_cap == 0 {
            errors.push("Time series cap must be at least one point".to_string());
        }
        if self.display.spectrum_cap == 0 {
            errors.push("Spectrum cap must be at least one point".to_string());
        }
        if self.display.max_frequency_hz.is_nan() || self.display.max_frequency_hz <= 0.0 {
            errors.push(format!(
                "Maximum display frequency ({} Hz) must be positive",
                self.display.max_frequency_hz
            ));
        }

        if self.batch.extensions.is_empty() {
            errors.push("Batch extension list is empty".to_string());
        }
        if self.batch.output_suffix.is_empty() {
            errors.push("Batch output suffix is empty; outputs would overwrite inputs in place".to_string());
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }

    /// Compact view for startup logging
    pub fn get_summary(&self) -> ConfigSummary {
        ConfigSummary {
            highpass_hz: self.filter.highpass_hz,
            lowpass_hz: self.filter.lowpass_hz,
            time_series_cap: self.display.time_series_cap,
            spectrum_cap: self.display.spectrum_cap,
            output_format: self.codec.output_format,
            worker_threads: self.batch.worker_threads,
        }
    }
}

/// Key settings of a [`BandlimitConfig`]
#[derive(Debug, Clone, Serialize)]
pub struct ConfigSummary {
    pub highpass_hz: Option<f64>,
    pub lowpass_hz: Option<f64>,
    pub time_series_cap: usize,
    pub spectrum_cap: usize,
    pub output_format: OutputFormat,
    pub worker_threads: usize,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_creation() {
        let config = BandlimitConfig::default();
        assert_eq!(config.display.time_series_cap, display::DEFAULT_TIME_SERIES_CAP);
        assert_eq!(config.display.spectrum_cap, display::DEFAULT_SPECTRUM_CAP);
        assert!(config.validate_consistency().is_ok());
    }

    #[test]
    fn test_config_serialization() {
        let config = BandlimitConfig::default();
        let toml_str = toml::to_string(&config).unwrap();
        let deserialized: BandlimitConfig = toml::from_str(&toml_str).unwrap();

        assert_eq!(config, deserialized);
    }

    #[test]
    fn test_disabled_cutoffs_survive_serialization() {
        let mut config = BandlimitConfig::default();
        config.filter.lowpass_hz = None;

        let toml_str = toml::to_string(&config).unwrap();
        let deserialized: BandlimitConfig = toml::from_str(&toml_str).unwrap();
        assert_eq!(deserialized.filter.lowpass_hz, None);
        assert_eq!(deserialized.filter.highpass_hz, Some(50.0));
    }

    #[test]
    fn test_config_validation() {
        let mut config = BandlimitConfig::default();
        config.filter.highpass_hz = Some(600.0);
        config.display.spectrum_cap = 0;

        let errors = config.validate_consistency().unwrap_err();
        assert_eq!(errors.len(), 2);
    }

    #[test]
    fn test_cutoff_above_nyquist_is_consistent() {
        let mut config = BandlimitConfig::default();
        config.filter.highpass_hz = None;
        config.filter.lowpass_hz = Some(1_000_000.0);
        assert!(config.validate_consistency().is_ok());
    }
}
