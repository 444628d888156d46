use image::{DynamicImage, GrayImage};
use imageproc::distance_transform::Norm;
use imageproc::edges::canny;
use imageproc::filter::separable_filter_equal;
use imageproc::morphology::{dilate, erode};
use tracing::debug;

use crate::config::validate_kernel_size;
use crate::error::Result;

/// Intermediate images produced while extracting edges
pub struct EdgeStages {
    pub gray: GrayImage,
    pub blurred: GrayImage,
    pub canny: GrayImage,
    /// Canny output after one dilation and one erosion pass
    pub edges: GrayImage,
}

/// Convert image to grayscale
pub fn to_grayscale(img: &DynamicImage) -> GrayImage {
    img.to_luma8()
}

/// Normalized 1D Gaussian weights for an odd kernel size.
///
/// Sigma is derived from the size as `0.3 * ((size - 1) / 2 - 1) + 0.8`.
pub fn gaussian_kernel(size: u32) -> Vec<f32> {
    let sigma = 0.3 * ((size as f64 - 1.0) * 0.5 - 1.0) + 0.8;
    let center = (size as f64 - 1.0) / 2.0;
    let weights: Vec<f64> = (0..size)
        .map(|i| {
            let d = i as f64 - center;
            (-(d * d) / (2.0 * sigma * sigma)).exp()
        })
        .collect();
    let sum: f64 = weights.iter().sum();
    weights.into_iter().map(|w| (w / sum) as f32).collect()
}

/// Apply a square Gaussian blur of the given odd size
pub fn apply_blur(img: &GrayImage, kernel_size: u32) -> Result<GrayImage> {
    validate_kernel_size(kernel_size)?;
    let kernel = gaussian_kernel(kernel_size);
    Ok(separable_filter_equal(img, &kernel))
}

/// Detect edges using Canny edge detector.
///
/// Thresholds given in the wrong order are swapped.
pub fn detect_edges(img: &GrayImage, low_threshold: u8, high_threshold: u8) -> GrayImage {
    let (low, high) = if low_threshold <= high_threshold {
        (low_threshold, high_threshold)
    } else {
        debug!(low_threshold, high_threshold, "swapping inverted canny thresholds");
        (high_threshold, low_threshold)
    };
    canny(img, low as f32, high as f32)
}

/// One 3x3 dilation followed by one 3x3 erosion
pub fn close_gaps(edges: &GrayImage) -> GrayImage {
    let dilated = dilate(edges, Norm::LInf, 1);
    erode(&dilated, Norm::LInf, 1)
}

/// Run every edge stage, keeping the intermediate images
pub fn extract_edge_stages(
    img: &DynamicImage,
    kernel_size: u32,
    low_threshold: u8,
    high_threshold: u8,
) -> Result<EdgeStages> {
    let gray = to_grayscale(img);
    let blurred = apply_blur(&gray, kernel_size)?;
    let canny = detect_edges(&blurred, low_threshold, high_threshold);
    let edges = close_gaps(&canny);

    debug!(
        width = edges.width(),
        height = edges.height(),
        edge_pixels = edges.pixels().filter(|p| p[0] > 0).count(),
        "edge map extracted"
    );

    Ok(EdgeStages {
        gray,
        blurred,
        canny,
        edges,
    })
}

/// Binary edge map with the same dimensions as the input
pub fn extract_edges(
    img: &DynamicImage,
    kernel_size: u32,
    low_threshold: u8,
    high_threshold: u8,
) -> Result<GrayImage> {
    Ok(extract_edge_stages(img, kernel_size, low_threshold, high_threshold)?.edges)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::MeasureError;
    use image::{Luma, Rgb, RgbImage};
    use imageproc::drawing::draw_filled_rect_mut;
    use imageproc::rect::Rect;

    fn square_image() -> DynamicImage {
        let mut img = RgbImage::from_pixel(120, 90, Rgb([255, 255, 255]));
        draw_filled_rect_mut(&mut img, Rect::at(30, 20).of_size(40, 40), Rgb([0, 0, 0]));
        DynamicImage::ImageRgb8(img)
    }

    #[test]
    fn test_gaussian_kernel_is_normalized_and_symmetric() {
        for size in [3, 5, 7, 9, 11] {
            let kernel = gaussian_kernel(size);
            assert_eq!(kernel.len(), size as usize);
            let sum: f32 = kernel.iter().sum();
            assert!((sum - 1.0).abs() < 1e-5);
            for i in 0..kernel.len() / 2 {
                assert!((kernel[i] - kernel[kernel.len() - 1 - i]).abs() < 1e-7);
            }
            assert!(kernel[kernel.len() / 2] > kernel[0]);
        }
    }

    #[test]
    fn test_rejects_even_kernel() {
        let result = extract_edges(&square_image(), 4, 50, 100);
        assert!(matches!(result, Err(MeasureError::InvalidConfig(_))));
    }

    #[test]
    fn test_valid_kernels_produce_same_size_binary_map() {
        let img = square_image();
        for size in [3, 5, 7, 9, 11] {
            let edges = extract_edges(&img, size, 50, 100).unwrap();
            assert_eq!(edges.dimensions(), (120, 90));
            assert!(edges.pixels().all(|p| p[0] == 0 || p[0] == 255));
            assert!(edges.pixels().any(|p| p[0] == 255), "size {} found no edges", size);
        }
    }

    #[test]
    fn test_inverted_thresholds_match_ordered() {
        let img = square_image();
        let ordered = extract_edges(&img, 5, 50, 100).unwrap();
        let inverted = extract_edges(&img, 5, 100, 50).unwrap();
        assert_eq!(ordered, inverted);
    }

    #[test]
    fn test_flat_image_has_no_edges() {
        let img = DynamicImage::ImageRgb8(RgbImage::from_pixel(64, 64, Rgb([128, 128, 128])));
        let edges = extract_edges(&img, 3, 50, 100).unwrap();
        assert!(edges.pixels().all(|p| *p == Luma([0])));
    }
}
