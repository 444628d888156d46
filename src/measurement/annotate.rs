use ab_glyph::{FontArc, PxScale};
use image::{Rgb, RgbImage};
use imageproc::drawing::{draw_line_segment_mut, draw_text_mut};

use crate::error::{MeasureError, Result};
use crate::models::{Measurement, Quad};

pub const OUTLINE_COLOR: Rgb<u8> = Rgb([0, 255, 0]);
pub const LABEL_COLOR: Rgb<u8> = Rgb([255, 0, 0]);
pub const DEFAULT_LABEL_SIZE: f32 = 20.0;

static BUNDLED_FONT: &[u8] = include_bytes!("../../assets/DejaVuSans.ttf");

/// Font and pixel size used for dimension labels
#[derive(Clone)]
pub struct LabelFont {
    font: FontArc,
    size: f32,
}

impl LabelFont {
    /// DejaVu Sans shipped with the crate
    pub fn bundled(size: f32) -> Result<Self> {
        let font = FontArc::try_from_slice(BUNDLED_FONT).map_err(|_| MeasureError::InvalidFont)?;
        Ok(Self { font, size })
    }

    /// Caller-supplied TrueType/OpenType font
    pub fn from_font_bytes(bytes: Vec<u8>, size: f32) -> Result<Self> {
        let font = FontArc::try_from_vec(bytes).map_err(|_| MeasureError::InvalidFont)?;
        Ok(Self { font, size })
    }

    pub fn size(&self) -> f32 {
        self.size
    }

    /// Draw `text` with its baseline at `y`
    pub fn draw(&self, img: &mut RgbImage, x: i32, y: i32, text: &str, color: Rgb<u8>) {
        let top = y - self.size.ceil() as i32;
        draw_text_mut(img, color, x, top, PxScale::from(self.size), &self.font, text);
    }
}

/// Outline a quad with a 2 px wide line
pub fn draw_quad(img: &mut RgbImage, quad: &Quad, color: Rgb<u8>) {
    let corners = quad.corners();
    for i in 0..corners.len() {
        let a = corners[i];
        let b = corners[(i + 1) % corners.len()];
        for (dx, dy) in [(0.0, 0.0), (1.0, 0.0), (0.0, 1.0)] {
            draw_line_segment_mut(
                img,
                ((a.x + dx) as f32, (a.y + dy) as f32),
                ((b.x + dx) as f32, (b.y + dy) as f32),
                color,
            );
        }
    }
}

pub fn format_mm(value: f64) -> String {
    format!("{:.1} mm", value)
}

/// Burn the outline and both dimension labels of one measurement into `img`.
///
/// The width label sits above the top-edge midpoint, the height label to
/// the right of the right-edge midpoint.
pub fn annotate(img: &mut RgbImage, measurement: &Measurement, font: &LabelFont) {
    draw_quad(img, &measurement.quad, OUTLINE_COLOR);

    let top = measurement.top_midpoint;
    font.draw(
        img,
        (top.x - 15.0) as i32,
        (top.y - 10.0) as i32,
        &format_mm(measurement.width_mm),
        LABEL_COLOR,
    );

    let right = measurement.right_midpoint;
    font.draw(
        img,
        (right.x + 10.0) as i32,
        right.y as i32,
        &format_mm(measurement.height_mm),
        LABEL_COLOR,
    );
}
