pub mod config;
pub mod error;
pub mod measurement;
pub mod models;
pub mod pipeline;

pub use config::MeasureConfig;
pub use error::MeasureError;
pub use measurement::{MeasurementPipeline, MeasurementReport, measure, measure_contours};
pub use models::{CalibrationScale, Contour, Measurement, Point2, Quad};
pub use pipeline::{DebugConfig, PipelineContext};
