use std::path::PathBuf;
use thiserror::Error;

/// An error raised while loading track data.
#[derive(Error, Debug)]
pub enum TrackError {
    #[error("failed to read {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to decode track image {}: {source}", path.display())]
    Image {
        path: PathBuf,
        #[source]
        source: image::ImageError,
    },
}

/// An error raised while parsing a single line of track data.
/// These are reported and skipped rather than propagated.
#[derive(Error, Debug, PartialEq, Eq)]
pub enum LineError {
    #[error("expected {expected} comma separated values, found {found}")]
    FieldCount { expected: usize, found: usize },
    #[error("invalid coordinate {0:?}")]
    Coordinate(String),
    #[error("expected a segment of the form (x1,y1),(x2,y2)")]
    SegmentSyntax,
}

/// An error raised while reading a simulation configuration.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[cfg(feature = "serde")]
    #[error("invalid configuration: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("vehicle count must be at least one")]
    NoVehicles,
    #[error("{name} must be positive, found {value}")]
    NonPositive { name: &'static str, value: f64 },
    #[error("{0} is set to use the track surface, but the track has none")]
    MissingSurface(&'static str),
}
