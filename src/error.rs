// src/error.rs
//! Unified error handling for Bandlimit Core
//!
//! Every fallible operation in the crate returns [`BandlimitResult`]. The variants
//! follow the failure taxonomy of the processing boundary: caller mistakes
//! ([`BandlimitError::InvalidInput`]), codec failures ([`BandlimitError::Decode`],
//! [`BandlimitError::Encode`]) and numerical failures of the filter or FFT stages
//! ([`BandlimitError::Numerical`]). Each variant carries an [`ErrorContext`] naming
//! the component and operation that raised it.

use serde::{Deserialize, Serialize};
use std::time::SystemTime;
use thiserror::Error;

/// Unified error type for the crate
#[derive(Debug, Clone, Error)]
pub enum BandlimitError {
    /// Empty buffer, non-positive sample rate, non-finite sample, bad cutoff
    #[error("[INPUT] Invalid {field}: {reason} ({})", .context.operation)]
    InvalidInput {
        field: String,
        reason: String,
        context: ErrorContext,
    },

    /// The codec could not read the container
    #[error("[DECODE] {reason} ({})", .context.operation)]
    Decode {
        reason: String,
        context: ErrorContext,
    },

    /// The codec could not write the container
    #[error("[ENCODE] {reason} ({})", .context.operation)]
    Encode {
        reason: String,
        context: ErrorContext,
    },

    /// Filter design or FFT failure on degenerate input
    #[error("[NUMERICAL] {stage:?} stage error: {reason} ({})", .context.operation)]
    Numerical {
        stage: ProcessingStage,
        reason: String,
        context: ErrorContext,
    },

    /// Configuration loading or validation errors
    #[error("[CONFIG] Configuration error in {component}: {reason}")]
    Configuration {
        component: String,
        reason: String,
        context: ErrorContext,
    },

    /// Filesystem errors at the batch/CLI edge
    #[error("[IO] {path}: {reason}")]
    Io {
        path: String,
        reason: String,
        context: ErrorContext,
    },
}

/// Flat classification of [`BandlimitError`] for callers that only branch on kind
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    InvalidInput,
    Decode,
    Encode,
    Numerical,
    Configuration,
    Io,
}

/// Processing stages for error tracking
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ProcessingStage {
    FilterDesign,
    Highpass,
    Lowpass,
    Spectrum,
}

/// Where and when an error was raised
#[derive(Debug, Clone, Serialize)]
pub struct ErrorContext {
    pub timestamp: SystemTime,
    pub thread_id: Option<String>,
    pub component: String,
    pub operation: String,
    pub file: Option<&'static str>,
    pub line: Option<u32>,
}

impl ErrorContext {
    /// Context for `operation` inside `component`
    pub fn new(component: &str, operation: &str) -> Self {
        Self {
            timestamp: SystemTime::now(),
            thread_id: std::thread::current().name().map(|s| s.to_string()),
            component: component.to_string(),
            operation: operation.to_string(),
            file: None,
            line: None,
        }
    }

    /// Same as [`ErrorContext::new`] plus the source location; used by [`error_context!`]
    pub fn with_location(component: &str, operation: &str, file: &'static str, line: u32) -> Self {
        let mut context = Self::new(component, operation);
        context.file = Some(file);
        context.line = Some(line);
        context
    }
}

/// `ErrorContext` stamped with the calling file and line
#[macro_export]
macro_rules! error_context {
    ($component:expr, $operation:expr) => {
        $crate::error::ErrorContext::with_location($component, $operation, file!(), line!())
    };
}

impl BandlimitError {
    /// Kind of this error
    pub fn kind(&self) -> ErrorKind {
        match self {
            BandlimitError::InvalidInput { .. } => ErrorKind::InvalidInput,
            BandlimitError::Decode { .. } => ErrorKind::Decode,
            BandlimitError::Encode { .. } => ErrorKind::Encode,
            BandlimitError::Numerical { .. } => ErrorKind::Numerical,
            BandlimitError::Configuration { .. } => ErrorKind::Configuration,
            BandlimitError::Io { .. } => ErrorKind::Io,
        }
    }

    /// Context attached at the raise site
    pub fn context(&self) -> &ErrorContext {
        match self {
            BandlimitError::InvalidInput { context, .. }
            | BandlimitError::Decode { context, .. }
            | BandlimitError::Encode { context, .. }
            | BandlimitError::Numerical { context, .. }
            | BandlimitError::Configuration { context, .. }
            | BandlimitError::Io { context, .. } => context,
        }
    }
}

/// Conversion from filter design errors
impl From<crate::processing::filters::FilterError> for BandlimitError {
    fn from(err: crate::processing::filters::FilterError) -> Self {
        BandlimitError::Numerical {
            stage: ProcessingStage::FilterDesign,
            reason: err.to_string(),
            context: error_context!("filters", "design"),
        }
    }
}

/// Conversion from configuration loader errors
impl From<crate::config::ConfigError> for BandlimitError {
    fn from(err: crate::config::ConfigError) -> Self {
        BandlimitError::Configuration {
            component: "config_loader".to_string(),
            reason: err.to_string(),
            context: error_context!("config_loader", "load"),
        }
    }
}

/// Result type alias for crate operations
pub type BandlimitResult<T> = Result<T, BandlimitError>;

/// Builds errors that share one component/operation pair
pub struct BandlimitErrorBuilder {
    component: String,
    operation: String,
}

impl BandlimitErrorBuilder {
    pub fn new(component: &str, operation: &str) -> Self {
        Self {
            component: component.to_string(),
            operation: operation.to_string(),
        }
    }

    fn context(&self) -> ErrorContext {
        ErrorContext::new(&self.component, &self.operation)
    }

    pub fn invalid_input(self, field: &str, reason: impl Into<String>) -> BandlimitError {
        BandlimitError::InvalidInput {
            field: field.to_string(),
            reason: reason.into(),
            context: self.context(),
        }
    }

    pub fn decode(self, reason: impl Into<String>) -> BandlimitError {
        BandlimitError::Decode {
            reason: reason.into(),
            context: self.context(),
        }
    }

    pub fn encode(self, reason: impl Into<String>) -> BandlimitError {
        BandlimitError::Encode {
            reason: reason.into(),
            context: self.context(),
        }
    }

    pub fn numerical(self, stage: ProcessingStage, reason: impl Into<String>) -> BandlimitError {
        BandlimitError::Numerical {
            stage,
            reason: reason.into(),
            context: self.context(),
        }
    }

    pub fn configuration(self, reason: impl Into<String>) -> BandlimitError {
        let context = self.context();
        BandlimitError::Configuration {
            component: self.component,
            reason: reason.into(),
            context,
        }
    }

    pub fn io(self, path: impl AsRef<std::path::Path>, err: std::io::Error) -> BandlimitError {
        BandlimitError::Io {
            path: path.as_ref().display().to_string(),
            reason: err.to_string(),
            context: self.context(),
        }
    }
}
