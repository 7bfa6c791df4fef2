//! Error types for loading and configuration.
use std::path::PathBuf;
use thiserror::Error;

/// Failure to produce a raw table from a source file.
///
/// Individual malformed cells never end up here; only whole-table failures do.
#[derive(Debug, Error)]
pub enum LoadError {
    #[error("file not found: {}", .0.display())]
    NotFound(PathBuf),
    #[error("could not read {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("could not parse CSV {}: {source}", path.display())]
    Csv {
        path: PathBuf,
        #[source]
        source: csv::Error,
    },
    #[error("no rows in {}", .0.display())]
    EmptyDataset(PathBuf),
}

#[derive(Debug, Error, PartialEq)]
pub enum ConfigError {
    #[error("growth rate {value}% is outside {min}..={max}%")]
    GrowthRateOutOfRange { value: u32, min: u32, max: u32 },
    #[error("growth rate {value}% is not a multiple of {step}%")]
    GrowthRateStep { value: u32, step: u32 },
    #[error("target year {target_year} is before base year {base_year}")]
    InvertedWindow { base_year: i32, target_year: i32 },
    #[error("target {0} must be a positive number")]
    NonPositiveTarget(f64),
    #[error("unknown section '{0}'")]
    UnknownSection(String),
}
