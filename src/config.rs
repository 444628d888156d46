use serde::{Deserialize, Serialize};

use crate::error::{MeasureError, Result};

/// Parameters for one measurement run.
///
/// Passed into every invocation; nothing here is cached between runs.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MeasureConfig {
    /// Known width of the leftmost (reference) object in millimeters
    pub reference_width_mm: f64,
    /// Lower Canny hysteresis threshold
    pub canny_low: u8,
    /// Upper Canny hysteresis threshold
    pub canny_high: u8,
    /// Gaussian kernel size, odd and at least 3
    pub blur_kernel: u32,
    /// Contours enclosing less area than this (in pixels) are dropped
    pub min_contour_area: u32,
}

impl MeasureConfig {
    pub fn new() -> Self {
        Self {
            reference_width_mm: 20.0,
            canny_low: 50,
            canny_high: 100,
            blur_kernel: 9,
            min_contour_area: 3000,
        }
    }

    pub fn with_reference_width(mut self, mm: f64) -> Self {
        self.reference_width_mm = mm;
        self
    }

    pub fn with_thresholds(mut self, low: u8, high: u8) -> Self {
        self.canny_low = low;
        self.canny_high = high;
        self
    }

    pub fn with_blur_kernel(mut self, size: u32) -> Self {
        self.blur_kernel = size;
        self
    }

    pub fn with_min_contour_area(mut self, area: u32) -> Self {
        self.min_contour_area = area;
        self
    }

    /// Check every field before any pixel is touched
    pub fn validate(&self) -> Result<()> {
        validate_kernel_size(self.blur_kernel)?;

        if self.canny_low > self.canny_high {
            return Err(MeasureError::InvalidConfig(format!(
                "canny low threshold {} exceeds high threshold {}",
                self.canny_low, self.canny_high
            )));
        }

        if !self.reference_width_mm.is_finite() || self.reference_width_mm <= 0.0 {
            return Err(MeasureError::InvalidConfig(format!(
                "reference width must be positive, got {}",
                self.reference_width_mm
            )));
        }

        Ok(())
    }
}

impl Default for MeasureConfig {
    fn default() -> Self {
        Self::new()
    }
}

pub(crate) fn validate_kernel_size(size: u32) -> Result<()> {
    if size < 3 || size % 2 == 0 {
        return Err(MeasureError::InvalidConfig(format!(
            "blur kernel size must be odd and >= 3, got {}",
            size
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_valid() {
        assert!(MeasureConfig::default().validate().is_ok());
    }

    #[test]
    fn test_rejects_even_or_small_kernel() {
        for size in [0, 1, 2, 4, 10] {
            let config = MeasureConfig::new().with_blur_kernel(size);
            assert!(
                matches!(config.validate(), Err(MeasureError::InvalidConfig(_))),
                "size {}",
                size
            );
        }
    }

    #[test]
    fn test_rejects_inverted_thresholds() {
        let config = MeasureConfig::new().with_thresholds(120, 80);
        assert!(config.validate().is_err());

        let equal = MeasureConfig::new().with_thresholds(80, 80);
        assert!(equal.validate().is_ok());
    }

    #[test]
    fn test_rejects_non_positive_reference() {
        for mm in [0.0, -5.0, f64::NAN, f64::INFINITY] {
            assert!(MeasureConfig::new().with_reference_width(mm).validate().is_err());
        }
    }
}
