use serde::{Deserialize, Serialize};

/// A 2D point in floating-point pixel coordinates
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Point2 {
    pub x: f64,
    pub y: f64,
}

impl Point2 {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    pub fn midpoint(self, other: Point2) -> Point2 {
        Point2::new((self.x + other.x) / 2.0, (self.y + other.y) / 2.0)
    }

    pub fn distance(self, other: Point2) -> f64 {
        (self.x - other.x).hypot(self.y - other.y)
    }
}

/// Closed outer boundary of a connected foreground region
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Contour {
    /// Position in discovery order, kept so ties can be resolved stably
    pub id: usize,
    pub points: Vec<(i32, i32)>,
}

impl Contour {
    pub fn new(id: usize, points: Vec<(i32, i32)>) -> Self {
        Self { id, points }
    }

    /// Left edge of the axis-aligned bounding box
    pub fn min_x(&self) -> i32 {
        self.points.iter().map(|&(x, _)| x).min().unwrap_or(0)
    }

    /// Axis-aligned bounding box as (min_x, min_y, max_x, max_y)
    pub fn bounds(&self) -> (i32, i32, i32, i32) {
        let mut bounds = (i32::MAX, i32::MAX, i32::MIN, i32::MIN);
        for &(x, y) in &self.points {
            bounds.0 = bounds.0.min(x);
            bounds.1 = bounds.1.min(y);
            bounds.2 = bounds.2.max(x);
            bounds.3 = bounds.3.max(y);
        }
        bounds
    }

    /// Enclosed area of the boundary polygon (shoelace formula)
    pub fn area(&self) -> f64 {
        let n = self.points.len();
        if n < 3 {
            return 0.0;
        }
        let twice: i64 = (0..n)
            .map(|i| {
                let (x0, y0) = self.points[i];
                let (x1, y1) = self.points[(i + 1) % n];
                x0 as i64 * y1 as i64 - x1 as i64 * y0 as i64
            })
            .sum();
        twice.abs() as f64 / 2.0
    }
}

/// Four corners in canonical order: top-left, top-right, bottom-right, bottom-left
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Quad {
    pub tl: Point2,
    pub tr: Point2,
    pub br: Point2,
    pub bl: Point2,
}

impl Quad {
    pub fn corners(&self) -> [Point2; 4] {
        [self.tl, self.tr, self.br, self.bl]
    }

    pub fn top_midpoint(&self) -> Point2 {
        self.tl.midpoint(self.tr)
    }

    pub fn bottom_midpoint(&self) -> Point2 {
        self.bl.midpoint(self.br)
    }

    pub fn left_midpoint(&self) -> Point2 {
        self.tl.midpoint(self.bl)
    }

    pub fn right_midpoint(&self) -> Point2 {
        self.tr.midpoint(self.br)
    }

    /// Distance between the left-edge and right-edge midpoints
    pub fn pixel_width(&self) -> f64 {
        self.left_midpoint().distance(self.right_midpoint())
    }

    /// Distance between the top-edge and bottom-edge midpoints
    pub fn pixel_height(&self) -> f64 {
        self.top_midpoint().distance(self.bottom_midpoint())
    }
}

/// Millimeters represented by one pixel. Always finite and > 0.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CalibrationScale(f64);

impl CalibrationScale {
    /// Returns `None` unless `mm_per_pixel` is finite and positive
    pub fn new(mm_per_pixel: f64) -> Option<Self> {
        (mm_per_pixel.is_finite() && mm_per_pixel > 0.0).then_some(Self(mm_per_pixel))
    }

    pub fn mm_per_pixel(&self) -> f64 {
        self.0
    }
}

/// Calibrated dimensions of one accepted object
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Measurement {
    /// Position in left-to-right order among accepted objects
    pub index: usize,
    pub width_mm: f64,
    pub height_mm: f64,
    pub pixel_width: f64,
    pub pixel_height: f64,
    pub quad: Quad,
    /// Anchor for the width label
    pub top_midpoint: Point2,
    /// Anchor for the height label
    pub right_midpoint: Point2,
    pub is_reference: bool,
}

impl Measurement {
    pub fn dimensions(&self) -> (f64, f64) {
        (self.width_mm, self.height_mm)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_contour_area_of_square() {
        let contour = Contour::new(0, vec![(0, 0), (10, 0), (10, 10), (0, 10)]);
        assert_eq!(contour.area(), 100.0);
        assert_eq!(contour.bounds(), (0, 0, 10, 10));
    }

    #[test]
    fn test_contour_area_is_orientation_independent() {
        let ccw = Contour::new(0, vec![(0, 0), (0, 4), (6, 4), (6, 0)]);
        assert_eq!(ccw.area(), 24.0);
        assert_eq!(Contour::new(1, vec![(3, 3), (4, 4)]).area(), 0.0);
    }

    #[test]
    fn test_quad_dimensions() {
        let quad = Quad {
            tl: Point2::new(0.0, 0.0),
            tr: Point2::new(80.0, 0.0),
            br: Point2::new(80.0, 20.0),
            bl: Point2::new(0.0, 20.0),
        };
        assert_eq!(quad.pixel_width(), 80.0);
        assert_eq!(quad.pixel_height(), 20.0);
        assert_eq!(quad.top_midpoint(), Point2::new(40.0, 0.0));
        assert_eq!(quad.right_midpoint(), Point2::new(80.0, 10.0));
    }

    #[test]
    fn test_scale_rejects_non_positive() {
        assert!(CalibrationScale::new(0.0).is_none());
        assert!(CalibrationScale::new(-1.0).is_none());
        assert!(CalibrationScale::new(f64::NAN).is_none());
        assert_eq!(CalibrationScale::new(0.5).map(|s| s.mm_per_pixel()), Some(0.5));
    }
}
