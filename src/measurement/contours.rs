use image::GrayImage;
use imageproc::contours::{BorderType, find_contours as trace_borders};
use tracing::debug;

use crate::models::Contour;

/// Find the outermost boundaries of foreground regions in a binary edge map.
///
/// Holes and contours nested inside another region are skipped. Contours
/// enclosing less than `min_area` pixels are dropped. The result is in
/// discovery order and may be empty.
pub fn find_contours(edges: &GrayImage, min_area: u32) -> Vec<Contour> {
    let traced = trace_borders::<i32>(edges);
    let total = traced.len();

    let contours: Vec<Contour> = traced
        .into_iter()
        .filter(|c| c.border_type == BorderType::Outer && c.parent.is_none())
        .enumerate()
        .map(|(id, c)| Contour::new(id, c.points.iter().map(|p| (p.x, p.y)).collect()))
        .filter(|c| c.area() >= min_area as f64)
        .collect();

    debug!(
        traced = total,
        kept = contours.len(),
        min_area,
        "outer contours filtered by area"
    );

    contours
}

/// Sort contours by the left edge of their bounding box.
///
/// The sort is stable, so contours sharing a left edge keep their
/// discovery order. Callers rely on the reference object being leftmost.
pub fn order_left_to_right(mut contours: Vec<Contour>) -> Vec<Contour> {
    contours.sort_by_key(|c| c.min_x());
    contours
}
