// src/processing/mod.rs
//! Filtering and spectral analysis

pub mod decimation;
pub mod filter_bank;
pub mod filters;
pub mod pipeline;
pub mod spectrum;

pub use filter_bank::*;
pub use filters::{BandType, FilterError, FilterSpec, IirCoefficients, SecondOrderSections};
pub use pipeline::*;
pub use spectrum::*;
