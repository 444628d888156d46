pub mod annotate;
pub mod calibration;
pub mod contours;
pub mod edges;
pub mod quad;

use image::{DynamicImage, GrayImage, RgbImage};
use std::path::PathBuf;
use tracing::{debug, info, info_span, warn};

use crate::config::MeasureConfig;
use crate::error::Result;
use crate::models::{CalibrationScale, Contour, Measurement};
use crate::pipeline::{DebugConfig, PipelineContext};
use annotate::{DEFAULT_LABEL_SIZE, LabelFont};

/// Everything one measurement run produces
pub struct MeasurementReport {
    /// Copy of the input with outlines and labels burned in
    pub annotated: RgbImage,
    /// Binary edge map the contours were traced from
    pub edges: GrayImage,
    /// Left-to-right measurements, `None` when no object was found
    pub measurements: Option<Vec<Measurement>>,
    pub scale: Option<CalibrationScale>,
}

impl MeasurementReport {
    /// (width_mm, height_mm) pairs in left-to-right order
    pub fn dimensions(&self) -> Option<Vec<(f64, f64)>> {
        self.measurements
            .as_ref()
            .map(|list| list.iter().map(Measurement::dimensions).collect())
    }
}

/// Measures objects against a reference object of known width.
///
/// The reference must be the leftmost object in the frame. Its fitted
/// pixel height fixes the millimeters-per-pixel scale for every other
/// object in the same image, and it is reported at exactly the reference
/// width in both dimensions.
pub struct MeasurementPipeline {
    config: MeasureConfig,
    /// Bundled font when `None`
    font: Option<LabelFont>,
    context: PipelineContext,
}

impl MeasurementPipeline {
    pub fn new(config: MeasureConfig) -> Self {
        Self {
            config,
            font: None,
            context: PipelineContext::default(),
        }
    }

    pub fn with_font(mut self, font: LabelFont) -> Self {
        self.font = Some(font);
        self
    }

    /// Enable debug mode with output directory
    /// The directory must be empty or non-existent
    pub fn with_debug(mut self, output_dir: impl Into<PathBuf>) -> Result<Self> {
        self.context.debug = Some(DebugConfig::new(output_dir)?);
        Ok(self)
    }

    /// Run the full measurement pipeline on an image.
    ///
    /// The input is never modified; annotations go onto a fresh copy.
    pub fn measure(&self, img: &DynamicImage) -> Result<MeasurementReport> {
        let config = &self.config;
        config.validate()?;

        let _span = info_span!("measure", width = img.width(), height = img.height()).entered();

        // Step 1: Extract edges
        let stages = edges::extract_edge_stages(
            img,
            config.blur_kernel,
            config.canny_low,
            config.canny_high,
        )?;
        self.context.dump(0, "input", || img.clone())?;
        self.context.dump(1, "grayscale", || DynamicImage::ImageLuma8(stages.gray.clone()))?;
        self.context.dump(2, "blurred", || DynamicImage::ImageLuma8(stages.blurred.clone()))?;
        self.context.dump(3, "canny", || DynamicImage::ImageLuma8(stages.canny.clone()))?;
        self.context.dump(4, "edges", || DynamicImage::ImageLuma8(stages.edges.clone()))?;

        let edges = stages.edges;
        let mut annotated = img.to_rgb8();

        // Step 2: Find contours
        let found = contours::find_contours(&edges, config.min_contour_area);
        if found.is_empty() {
            info!("no objects detected");
            return Ok(MeasurementReport {
                annotated,
                edges,
                measurements: None,
                scale: None,
            });
        }

        // Step 3: Order left to right; the first one is the reference
        let ordered = contours::order_left_to_right(found);
        debug!(count = ordered.len(), "contours ordered left to right");

        // Step 4: Fit quads and calibrate
        let (measurements, scale) = measure_contours(&ordered, config.reference_width_mm);

        // Step 5: Draw the outlines and labels
        let font = match &self.font {
            Some(font) => font.clone(),
            None => LabelFont::bundled(DEFAULT_LABEL_SIZE)?,
        };
        for measurement in &measurements {
            annotate::annotate(&mut annotated, measurement, &font);
        }

        self.context.dump(5, "annotated", || DynamicImage::ImageRgb8(annotated.clone()))?;

        info!(objects = measurements.len(), "measurement complete");

        let measurements = (!measurements.is_empty()).then_some(measurements);
        Ok(MeasurementReport {
            annotated,
            edges,
            measurements,
            scale,
        })
    }
}

impl Default for MeasurementPipeline {
    fn default() -> Self {
        Self::new(MeasureConfig::default())
    }
}

/// Fit and calibrate contours already sorted left to right.
///
/// Contours that cannot be fitted are skipped; the first one that can
/// becomes the reference. Returns the measurements and the scale, which is
/// `None` only when nothing could be fitted.
pub fn measure_contours(
    ordered: &[Contour],
    reference_width_mm: f64,
) -> (Vec<Measurement>, Option<CalibrationScale>) {
    let mut scale: Option<CalibrationScale> = None;
    let mut measurements = Vec::with_capacity(ordered.len());

    for contour in ordered {
        let quad = match quad::fit_quad(contour) {
            Ok(quad) => quad,
            Err(e) => {
                warn!(
                    contour = contour.id,
                    bounds = ?contour.bounds(),
                    error = %e,
                    "skipping contour"
                );
                continue;
            }
        };

        let pixel_width = quad.pixel_width();
        let pixel_height = quad.pixel_height();

        let current_scale = scale;
        let (width_mm, height_mm, is_reference) = match current_scale {
            Some(current) => {
                let (w, h) = calibration::apply(current, pixel_width, pixel_height);
                (w, h, false)
            }
            None => match calibration::calibrate(pixel_height, reference_width_mm) {
                Ok(reference_scale) => {
                    info!(
                        mm_per_pixel = reference_scale.mm_per_pixel(),
                        reference_pixel_height = pixel_height,
                        "calibrated from reference object"
                    );
                    scale = Some(reference_scale);
                    (reference_width_mm, reference_width_mm, true)
                }
                Err(e) => {
                    warn!(contour = contour.id, error = %e, "reference contour unusable, skipping");
                    continue;
                }
            },
        };

        let measurement = Measurement {
            index: measurements.len(),
            width_mm,
            height_mm,
            pixel_width,
            pixel_height,
            quad,
            top_midpoint: quad.top_midpoint(),
            right_midpoint: quad.right_midpoint(),
            is_reference,
        };

        debug!(
            index = measurement.index,
            width_mm,
            height_mm,
            pixel_width,
            pixel_height,
            "object measured"
        );
        measurements.push(measurement);
    }

    (measurements, scale)
}

/// Measure `img` with `config` using the bundled label font
pub fn measure(img: &DynamicImage, config: &MeasureConfig) -> Result<MeasurementReport> {
    MeasurementPipeline::new(config.clone()).measure(img)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rectangle(id: usize, x0: i32, y0: i32, w: i32, h: i32) -> Contour {
        Contour::new(id, vec![(x0, y0), (x0 + w, y0), (x0 + w, y0 + h), (x0, y0 + h)])
    }

    #[test]
    fn test_degenerate_leftmost_contour_is_skipped() {
        let ordered = vec![
            Contour::new(0, vec![(0, 0), (5, 5), (10, 10)]),
            rectangle(1, 20, 0, 10, 10),
            rectangle(2, 60, 0, 20, 10),
        ];

        let (measurements, scale) = measure_contours(&ordered, 20.0);

        assert_eq!(measurements.len(), 2);
        assert_eq!(measurements.iter().map(|m| m.index).collect::<Vec<_>>(), vec![0, 1]);
        assert!(measurements[0].is_reference);
        assert_eq!(measurements[0].quad.tl, crate::models::Point2::new(20.0, 0.0));
        assert_eq!(measurements[0].dimensions(), (20.0, 20.0));
        assert!(!measurements[1].is_reference);
        assert!((measurements[1].width_mm - 40.0).abs() < 1e-9);
        assert!((measurements[1].height_mm - 20.0).abs() < 1e-9);
        assert_eq!(scale.map(|s| s.mm_per_pixel()), Some(2.0));
    }

    #[test]
    fn test_degenerate_contour_between_objects_is_skipped() {
        let ordered = vec![
            rectangle(0, 0, 0, 10, 10),
            Contour::new(1, vec![(15, 3)]),
            rectangle(2, 40, 0, 30, 10),
        ];

        let (measurements, _) = measure_contours(&ordered, 10.0);

        assert_eq!(measurements.len(), 2);
        assert_eq!(measurements[1].index, 1);
        assert!((measurements[1].width_mm - 30.0).abs() < 1e-9);
    }

    #[test]
    fn test_only_degenerate_contours_leave_scale_unset() {
        let ordered = vec![Contour::new(0, vec![(1, 1), (2, 2)])];
        let (measurements, scale) = measure_contours(&ordered, 20.0);
        assert!(measurements.is_empty());
        assert!(scale.is_none());
    }
}
