use image::{DynamicImage, Rgb, RgbImage};
use imageproc::drawing::draw_filled_rect_mut;
use imageproc::rect::Rect;
use refmeasure::MeasureConfig;

pub const BACKGROUND: Rgb<u8> = Rgb([255, 255, 255]);
pub const FOREGROUND: Rgb<u8> = Rgb([20, 20, 20]);

/// Creates a white canvas of the given size
pub fn blank_canvas(width: u32, height: u32) -> RgbImage {
    RgbImage::from_pixel(width, height, BACKGROUND)
}

/// Creates a white canvas with dark filled rectangles given as (x, y, w, h)
pub fn image_with_rects(width: u32, height: u32, rects: &[(i32, i32, u32, u32)]) -> DynamicImage {
    let mut img = blank_canvas(width, height);
    for &(x, y, w, h) in rects {
        draw_filled_rect_mut(&mut img, Rect::at(x, y).of_size(w, h), FOREGROUND);
    }
    DynamicImage::ImageRgb8(img)
}

/// The two-object scene: a 40x40 reference on the left and an 80x20 object on the right
pub fn reference_and_bar() -> DynamicImage {
    image_with_rects(400, 200, &[(60, 80, 40, 40), (220, 90, 80, 20)])
}

/// Config suited to the small synthetic scenes
pub fn test_config(reference_width_mm: f64) -> MeasureConfig {
    MeasureConfig::new()
        .with_reference_width(reference_width_mm)
        .with_thresholds(50, 100)
        .with_blur_kernel(5)
        .with_min_contour_area(100)
}

/// Asserts `actual` is within `tolerance` of `expected`
pub fn assert_close(actual: f64, expected: f64, tolerance: f64) {
    assert!(
        (actual - expected).abs() <= tolerance,
        "expected {} ± {}, got {}",
        expected,
        tolerance,
        actual
    );
}
