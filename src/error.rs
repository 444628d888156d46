use std::path::PathBuf;

use thiserror::Error;

/// Errors raised by the measurement pipeline.
///
/// Finding no objects is not an error; it is reported as an empty result.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum MeasureError {
    /// Configuration rejected before any processing
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    /// Contour too small or collinear to fit a rectangle
    #[error("degenerate contour with {points} point(s) cannot be fitted")]
    DegenerateContour { points: usize },

    /// Label font could not be parsed
    #[error("label font data is not a valid TrueType/OpenType font")]
    InvalidFont,

    /// Writing an intermediate stage image failed
    #[error("debug output failed for {path}: {message}")]
    DebugOutput { path: PathBuf, message: String },
}

pub type Result<T> = std::result::Result<T, MeasureError>;
