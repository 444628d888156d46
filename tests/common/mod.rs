mod fixtures;
pub use fixtures::*;

// Re-export commonly used types from refmeasure for tests
pub use refmeasure::{
    MeasureConfig, MeasureError, Measurement, MeasurementPipeline, MeasurementReport,
};
