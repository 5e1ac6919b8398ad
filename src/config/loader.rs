// src/config/loader.rs
//! Layered configuration loader: defaults, TOML files, then environment

use crate::config::constants::{env as env_consts, paths};
use crate::config::{schema_validator::SchemaValidator, BandlimitConfig};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::time::SystemTime;
use tracing::{debug, warn};

/// Sections replaced as a whole by each file instead of merged key by key
const WHOLE_SECTIONS: &[&str] = &["filter"];

/// Configuration loader
pub struct ConfigLoader {
    config_paths: Vec<PathBuf>,
    schema_validator: SchemaValidator,
    env_prefix: String,
    current_config: BandlimitConfig,
}

/// Configuration loading errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Configuration file not found: {0}")]
    FileNotFound(String),
    #[error("Configuration parse error: {0}")]
    ParseError(String),
    #[error("Configuration validation errors: {}", format_validation(.0))]
    ValidationError(Vec<crate::config::schema_validator::ValidationError>),
    #[error("Configuration inconsistent: {}", .0.join("; "))]
    Inconsistent(Vec<String>),
    #[error("IO error: {0}")]
    IoError(String),
}

fn format_validation(errors: &[crate::config::schema_validator::ValidationError]) -> String {
    errors
        .iter()
        .map(|e| format!("\n  {}", e))
        .collect::<String>()
}

impl From<std::io::Error> for ConfigError {
    fn from(err: std::io::Error) -> Self {
        ConfigError::IoError(err.to_string())
    }
}

impl From<toml::de::Error> for ConfigError {
    fn from(err: toml::de::Error) -> Self {
        ConfigError::ParseError(err.to_string())
    }
}

impl ConfigLoader {
    /// Create new configuration loader using the standard search paths
    pub fn new() -> Self {
        Self::with_paths(Self::discover_config_paths())
    }

    /// Create loader with custom paths; later paths override earlier ones
    pub fn with_paths(paths: Vec<PathBuf>) -> Self {
        Self {
            config_paths: paths,
            schema_validator: SchemaValidator::new(),
            env_prefix: env_consts::OVERRIDE_PREFIX.to_string(),
            current_config: BandlimitConfig::default(),
        }
    }

    /// Use a different environment prefix than `BANDLIMIT_`
    pub fn with_env_prefix(mut self, prefix: &str) -> Self {
        self.env_prefix = prefix.to_string();
        self
    }

    /// Load configuration with validation
    pub fn load(&mut self) -> Result<BandlimitConfig, ConfigError> {
        let config = self.load_and_merge_configs()?;
        self.current_config = config.clone();
        Ok(config)
    }

    /// Last successfully loaded configuration (defaults before the first load)
    pub fn current(&self) -> &BandlimitConfig {
        &self.current_config
    }

    /// Paths consulted by [`ConfigLoader::load`]
    pub fn config_paths(&self) -> &[PathBuf] {
        &self.config_paths
    }

    /// Check one file against the schema without touching the loaded configuration
    pub fn validate_config_file<P: AsRef<Path>>(&self, path: P) -> Result<(), ConfigError> {
        let layer = read_layer(path.as_ref())?;
        self.check_schema(&layer)
    }

    fn check_schema(&self, value: &toml::Value) -> Result<(), ConfigError> {
        self.schema_validator
            .validate_config(value)
            .and_then(|()| self.schema_validator.validate_dependencies(value))
            .map_err(ConfigError::ValidationError)
    }

    /// Write the current configuration as TOML
    pub fn export_config<P: AsRef<Path>>(&self, path: P) -> Result<(), ConfigError> {
        let rendered = toml::to_string_pretty(&self.current_config).map_err(|e| ConfigError::ParseError(e.to_string()))?;
        std::fs::write(path, rendered)?;
        Ok(())
    }

    /// Modification time of each search path; `None` for files that do not exist
    pub fn get_config_timestamps(&self) -> Vec<(PathBuf, Option<SystemTime>)> {
        let modified = |path: &Path| std::fs::metadata(path).and_then(|meta| meta.modified()).ok();
        self.config_paths.iter().map(|path| (path.clone(), modified(path))).collect()
    }

    fn load_and_merge_configs(&self) -> Result<BandlimitConfig, ConfigError> {
        let mut layered = toml::Value::try_from(BandlimitConfig::default()).map_err(|e| ConfigError::ParseError(e.to_string()))?;

        for path in &self.config_paths {
            match read_layer(path) {
                Ok(layer) => {
                    debug!(path = %path.display(), "merging configuration file");
                    clear_replaced_sections(&mut layered, &layer);
                    overlay(&mut layered, layer);
                }
                // Search paths are optional
                Err(ConfigError::FileNotFound(_)) => {}
                Err(e) => return Err(e),
            }
        }

        self.apply_environment_overrides(&mut layered);
        self.check_schema(&layered)?;

        let config = BandlimitConfig::deserialize(layered)
            .map_err(|e| ConfigError::ParseError(format!("merged configuration does not fit the schema: {}", e)))?;
        config.validate_consistency().map_err(ConfigError::Inconsistent)?;

        Ok(config)
    }

    /// `BANDLIMIT_FILTER_HIGHPASS_HZ=40` sets `filter.highpass_hz`
    fn apply_environment_overrides(&self, config: &mut toml::Value) {
        for (key, value) in std::env::vars() {
            let Some(rest) = key.strip_prefix(&self.env_prefix) else {
                continue;
            };
            let rest = rest.to_lowercase();
            let Some((section, field)) = rest.split_once('_') else {
                warn!(variable = %key, "ignoring environment override without a section");
                continue;
            };

            if value.trim().eq_ignore_ascii_case(env_consts::DISABLE_VALUE) {
                debug!(variable = %key, section, field, "clearing value from environment");
                remove_nested_value(config, section, field);
                continue;
            }

            let mut parsed = parse_env_value(&value);
            // A single item for a list field, e.g. BANDLIMIT_BATCH_EXTENSIONS=wav
            let target_is_list = config.get(section).and_then(|s| s.get(field)).is_some_and(|v| v.is_array());
            if target_is_list && !parsed.is_array() {
                parsed = toml::Value::Array(vec![parsed]);
            }

            debug!(variable = %key, section, field, "applying environment override");
            set_nested_value(config, section, field, parsed);
        }
    }

    fn discover_config_paths() -> Vec<PathBuf> {
        let mut paths = Vec::new();

        if let Some(home_dir) = home_dir() {
            paths.push(home_dir.join(paths::USER_CONFIG_DIR).join("config.toml"));
        }

        paths.push(PathBuf::from(paths::DEFAULT_CONFIG_FILE));
        paths.push(PathBuf::from(paths::LOCAL_CONFIG_FILE));

        paths
    }
}

impl Default for ConfigLoader {
    fn default() -> Self {
        Self::new()
    }
}

/// A file that defines `[filter]` states both cutoffs; one it leaves out is
/// disabled rather than inherited from a lower layer
fn clear_replaced_sections(below: &mut toml::Value, layer: &toml::Value) {
    let Some(table) = below.as_table_mut() else {
        return;
    };
    for section in WHOLE_SECTIONS {
        if layer.get(*section).is_some() {
            table.remove(*section);
        }
    }
}

fn read_layer(path: &Path) -> Result<toml::Value, ConfigError> {
    if !path.is_file() {
        return Err(ConfigError::FileNotFound(path.display().to_string()));
    }
    Ok(toml::from_str(&std::fs::read_to_string(path)?)?)
}

/// Tables merge key by key; any other value in `layer` replaces the one below it
fn overlay(below: &mut toml::Value, layer: toml::Value) {
    match (below, layer) {
        (toml::Value::Table(below_table), toml::Value::Table(layer_table)) => {
            for (key, value) in layer_table {
                match below_table.get_mut(&key) {
                    Some(existing) => overlay(existing, value),
                    None => {
                        below_table.insert(key, value);
                    }
                }
            }
        }
        (slot, value) => *slot = value,
    }
}

/// Environment strings typed the way a TOML literal would be; commas make a string list
fn parse_env_value(raw: &str) -> toml::Value {
    let raw = raw.trim();
    if let Ok(n) = raw.parse::<i64>() {
        return toml::Value::Integer(n);
    }
    if let Ok(x) = raw.parse::<f64>() {
        return toml::Value::Float(x);
    }
    if let Ok(flag) = raw.parse::<bool>() {
        return toml::Value::Boolean(flag);
    }
    match raw.contains(',') {
        true => toml::Value::Array(raw.split(',').map(|item| toml::Value::String(item.trim().to_owned())).collect()),
        false => toml::Value::String(raw.to_owned()),
    }
}

fn set_nested_value(config: &mut toml::Value, section: &str, field: &str, value: toml::Value) {
    if let toml::Value::Table(root) = config {
        let entry = root
            .entry(section.to_string())
            .or_insert_with(|| toml::Value::Table(toml::value::Table::new()));
        if let toml::Value::Table(table) = entry {
            table.insert(field.to_string(), value);
        }
    }
}

fn remove_nested_value(config: &mut toml::Value, section: &str, field: &str) {
    if let Some(toml::Value::Table(table)) = config.get_mut(section) {
        table.remove(field);
    }
}

fn home_dir() -> Option<PathBuf> {
    #[cfg(target_os = "windows")]
    {
        std::env::var_os("USERPROFILE").map(PathBuf::from)
    }
    #[cfg(not(target_os = "windows"))]
    {
        std::env::var_os("HOME").map(PathBuf::from)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_config_loader_creation() {
        let loader = ConfigLoader::new();
        assert!(!loader.config_paths().is_empty());
    }

    #[test]
    #[serial]
    fn test_load_defaults_without_files() {
        let mut loader = ConfigLoader::with_paths(vec![PathBuf::from("/nonexistent/bandlimit.toml")]);
        let config = loader.load().unwrap();
        assert_eq!(config, BandlimitConfig::default());
    }

    #[test]
    #[serial]
    fn test_file_overrides_defaults() {
        let mut temp_file = NamedTempFile::new().unwrap();
        writeln!(
            temp_file,
            r#"
[filter]
highpass_hz = 40

[display]
spectrum_cap = 2048
        "#
        )
        .unwrap();

        let mut loader = ConfigLoader::with_paths(vec![temp_file.path().to_path_buf()]);
        let config = loader.load().unwrap();

        assert_eq!(config.filter.highpass_hz, Some(40.0));
        assert_eq!(config.filter.lowpass_hz, None);
        assert_eq!(config.display.spectrum_cap, 2048);
        assert_eq!(loader.current().display.spectrum_cap, 2048);
    }

    #[test]
    fn test_config_file_validation() {
        let loader = ConfigLoader::new();

        let mut temp_file = NamedTempFile::new().unwrap();
        writeln!(
            temp_file,
            r#"
[filter]
highpass_hz = 50.0
lowpass_hz = 460.0

[codec]
output_format = "float32"
        "#
        )
        .unwrap();

        assert!(loader.validate_config_file(temp_file.path()).is_ok());
    }

    #[test]
    fn test_invalid_config_validation() {
        let loader = ConfigLoader::new();

        let mut temp_file = NamedTempFile::new().unwrap();
        writeln!(
            temp_file,
            r#"
[display]
time_series_cap = 0
        "#
        )
        .unwrap();

        assert!(matches!(
            loader.validate_config_file(temp_file.path()),
            Err(ConfigError::ValidationError(_))
        ));
    }

    #[test]
    #[serial]
    fn test_file_check_agrees_with_load() {
        let mut temp_file = NamedTempFile::new().unwrap();
        writeln!(temp_file, "[codec]\noutput_format = \"Float32\"").unwrap();

        let mut loader = ConfigLoader::with_paths(vec![temp_file.path().to_path_buf()]);
        assert!(loader.validate_config_file(temp_file.path()).is_err());
        assert!(loader.load().is_err());
    }

    #[test]
    #[serial]
    fn test_environment_override() {
        std::env::set_var("BLTEST_FILTER_HIGHPASS_HZ", "40");
        std::env::set_var("BLTEST_BATCH_EXTENSIONS", "wav,flac");

        let mut loader = ConfigLoader::with_paths(Vec::new()).with_env_prefix("BLTEST_");
        let config = loader.load().unwrap();

        assert_eq!(config.filter.highpass_hz, Some(40.0));
        assert_eq!(config.batch.extensions, vec!["wav".to_string(), "flac".to_string()]);

        std::env::remove_var("BLTEST_FILTER_HIGHPASS_HZ");
        std::env::remove_var("BLTEST_BATCH_EXTENSIONS");
    }

    #[test]
    #[serial]
    fn test_filter_key_left_out_of_file_disables_stage() {
        let mut temp_file = NamedTempFile::new().unwrap();
        writeln!(temp_file, "[filter]\nlowpass_hz = 300.0").unwrap();

        let mut loader = ConfigLoader::with_paths(vec![temp_file.path().to_path_buf()]);
        let config = loader.load().unwrap();

        assert_eq!(config.filter.highpass_hz, None);
        assert_eq!(config.filter.lowpass_hz, Some(300.0));
    }

    #[test]
    #[serial]
    fn test_file_without_filter_section_keeps_default_cutoffs() {
        let mut temp_file = NamedTempFile::new().unwrap();
        writeln!(temp_file, "[display]\nspectrum_cap = 512").unwrap();

        let mut loader = ConfigLoader::with_paths(vec![temp_file.path().to_path_buf()]);
        let config = loader.load().unwrap();

        assert_eq!(config.filter, crate::config::FilterConfig::default());
    }

    #[test]
    #[serial]
    fn test_environment_can_disable_stage() {
        std::env::set_var("BLOFF_FILTER_HIGHPASS_HZ", "off");

        let mut loader = ConfigLoader::with_paths(Vec::new()).with_env_prefix("BLOFF_");
        let result = loader.load();
        std::env::remove_var("BLOFF_FILTER_HIGHPASS_HZ");

        let config = result.unwrap();
        assert_eq!(config.filter.highpass_hz, None);
        assert_eq!(config.filter.lowpass_hz, Some(460.0));
    }

    #[test]
    #[serial]
    fn test_single_extension_from_environment() {
        std::env::set_var("BLONE_BATCH_EXTENSIONS", "wave");

        let mut loader = ConfigLoader::with_paths(Vec::new()).with_env_prefix("BLONE_");
        let result = loader.load();
        std::env::remove_var("BLONE_BATCH_EXTENSIONS");

        assert_eq!(result.unwrap().batch.extensions, vec!["wave".to_string()]);
    }

    #[test]
    #[serial]
    fn test_inconsistent_override_rejected() {
        std::env::set_var("BLBAD_FILTER_HIGHPASS_HZ", "900");

        let mut loader = ConfigLoader::with_paths(Vec::new()).with_env_prefix("BLBAD_");
        assert!(loader.load().is_err());

        std::env::remove_var("BLBAD_FILTER_HIGHPASS_HZ");
    }

    #[test]
    fn test_overlay_keeps_untouched_keys() {
        let mut below: toml::Value = toml::from_str("[filter]\nhighpass_hz = 50.0\nlowpass_hz = 460.0").unwrap();
        let layer: toml::Value = toml::from_str("[filter]\nlowpass_hz = 300.0\n[codec]\noutput_format = \"float32\"").unwrap();
        overlay(&mut below, layer);

        assert_eq!(below["filter"]["highpass_hz"].as_float(), Some(50.0));
        assert_eq!(below["filter"]["lowpass_hz"].as_float(), Some(300.0));
        assert_eq!(below["codec"]["output_format"].as_str(), Some("float32"));
    }

    #[test]
    fn test_env_values_are_typed() {
        assert_eq!(parse_env_value("4"), toml::Value::Integer(4));
        assert_eq!(parse_env_value(" 12.5 "), toml::Value::Float(12.5));
        assert_eq!(parse_env_value("false"), toml::Value::Boolean(false));
        assert_eq!(parse_env_value("pcm16"), toml::Value::String("pcm16".into()));
        assert_eq!(
            parse_env_value("wav, wave"),
            toml::Value::Array(vec![toml::Value::String("wav".into()), toml::Value::String("wave".into())])
        );
    }

    #[test]
    fn test_config_export() {
        let loader = ConfigLoader::with_paths(Vec::new());
        let temp_file = NamedTempFile::new().unwrap();

        assert!(loader.export_config(temp_file.path()).is_ok());

        let content = std::fs::read_to_string(temp_file.path()).unwrap();
        assert!(content.contains("[display]"));
        assert!(content.contains("time_series_cap = 50000"));
    }
}
