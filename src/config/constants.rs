// src/config/constants.rs
//! System-wide configuration constants

/// Filter design constants
pub mod filter {
    /// Butterworth order used for both stages
    pub const FILTER_ORDER: usize = 4;
    /// Second-order section count for [`FILTER_ORDER`]
    pub const SECTION_COUNT: usize = FILTER_ORDER / 2;
    /// Padding multiplier applied to `order + 1` for edge handling
    pub const PAD_FACTOR: usize = 3;

    /// Batch defaults used to prepare the training corpus
    pub const DEFAULT_BATCH_HIGHPASS_HZ: f64 = 50.0;
    pub const DEFAULT_BATCH_LOWPASS_HZ: f64 = 460.0;
}

/// Display reduction constants
pub mod display {
    pub const DEFAULT_TIME_SERIES_CAP: usize = 50_000;
    pub const DEFAULT_SPECTRUM_CAP: usize = 10_000;
    pub const DEFAULT_MAX_DISPLAY_FREQUENCY_HZ: f64 = 20_000.0;

    pub const MIN_CAP: usize = 1;
    pub const MAX_TIME_SERIES_CAP: usize = 10_000_000;
    pub const MAX_SPECTRUM_CAP: usize = 10_000_000;
}

/// Codec constants
pub mod codec {
    pub const PCM16_SCALE: f64 = 32_768.0;
    pub const PCM24_SCALE: f64 = 8_388_608.0;
    pub const PCM32_SCALE: f64 = 2_147_483_648.0;
    pub const PCM8_SCALE: f64 = 128.0;
    pub const MAX_CHANNELS: u16 = 64;
}

/// Batch driver constants
pub mod batch {
    pub const DEFAULT_EXTENSIONS: &[&str] = &["wav"];
    pub const DEFAULT_OUTPUT_SUFFIX: &str = "_filted";
    /// Zero lets rayon size the pool from the CPU count
    pub const DEFAULT_WORKER_THREADS: usize = 0;
    pub const MAX_WORKER_THREADS: usize = 256;
}

/// Configuration file paths
pub mod paths {
    pub const DEFAULT_CONFIG_FILE: &str = "config/default.toml";
    pub const LOCAL_CONFIG_FILE: &str = "bandlimit.toml";
    pub const USER_CONFIG_DIR: &str = ".config/bandlimit";
}

/// Environment variable conventions
pub mod env {
    pub const OVERRIDE_PREFIX: &str = "BANDLIMIT_";
    pub const DEFAULT_LOG_FILTER: &str = "bandlimit_core=info";
    /// Override value that removes a key, e.g. `BANDLIMIT_FILTER_HIGHPASS_HZ=off`
    pub const DISABLE_VALUE: &str = "off";
}
