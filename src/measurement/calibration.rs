use crate::error::{MeasureError, Result};
use crate::models::CalibrationScale;

/// Derive millimeters-per-pixel from the reference object.
///
/// The reference object's pixel height is the calibration basis, whatever
/// its fitted aspect ratio.
pub fn calibrate(reference_pixel_height: f64, reference_width_mm: f64) -> Result<CalibrationScale> {
    CalibrationScale::new(reference_width_mm / reference_pixel_height).ok_or_else(|| {
        MeasureError::InvalidConfig(format!(
            "cannot calibrate {} mm against a reference height of {} px",
            reference_width_mm, reference_pixel_height
        ))
    })
}

/// Convert pixel dimensions into millimeters
pub fn apply(scale: CalibrationScale, pixel_width: f64, pixel_height: f64) -> (f64, f64) {
    let mm = scale.mm_per_pixel();
    (pixel_width * mm, pixel_height * mm)
}
