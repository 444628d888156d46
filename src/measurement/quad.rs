use std::cmp::Ordering;

use crate::error::{MeasureError, Result};
use crate::models::{Contour, Point2, Quad};

const EPSILON: f64 = 1e-9;

/// Fit a minimum-area rotated rectangle to a contour and return its
/// corners in canonical order.
pub fn fit_quad(contour: &Contour) -> Result<Quad> {
    let points: Vec<Point2> = contour
        .points
        .iter()
        .map(|&(x, y)| Point2::new(x as f64, y as f64))
        .collect();

    let corners = min_area_rect(&points).ok_or(MeasureError::DegenerateContour {
        points: contour.points.len(),
    })?;

    Ok(order_corners(corners))
}

/// Convex hull in counter-clockwise order (monotone chain).
///
/// Collinear points on the hull boundary are dropped.
pub fn convex_hull(points: &[Point2]) -> Vec<Point2> {
    let mut sorted = points.to_vec();
    sorted.sort_by(lexicographic);
    sorted.dedup();

    if sorted.len() < 3 {
        return sorted;
    }

    let mut lower: Vec<Point2> = Vec::with_capacity(sorted.len());
    for &p in &sorted {
        while lower.len() >= 2 && cross(lower[lower.len() - 2], lower[lower.len() - 1], p) <= 0.0 {
            lower.pop();
        }
        lower.push(p);
    }

    let mut upper: Vec<Point2> = Vec::with_capacity(sorted.len());
    for &p in sorted.iter().rev() {
        while upper.len() >= 2 && cross(upper[upper.len() - 2], upper[upper.len() - 1], p) <= 0.0 {
            upper.pop();
        }
        upper.push(p);
    }

    lower.pop();
    upper.pop();
    lower.extend(upper);
    lower
}

/// Smallest-area rectangle enclosing `points`, found by rotating calipers
/// over the convex hull edges.
///
/// Returns `None` when the points are collinear or fewer than three.
pub fn min_area_rect(points: &[Point2]) -> Option<[Point2; 4]> {
    let hull = convex_hull(points);
    if hull.len() < 3 {
        return None;
    }

    let origin = hull[0];
    let mut best: Option<(f64, [Point2; 4])> = None;

    for i in 0..hull.len() {
        let a = hull[i];
        let b = hull[(i + 1) % hull.len()];
        let len = a.distance(b);
        if len < EPSILON {
            continue;
        }
        let u = Point2::new((b.x - a.x) / len, (b.y - a.y) / len);
        let v = Point2::new(-u.y, u.x);

        let (mut min_u, mut max_u, mut min_v, mut max_v) = (f64::MAX, f64::MIN, f64::MAX, f64::MIN);
        for p in &hull {
            let dx = p.x - origin.x;
            let dy = p.y - origin.y;
            let pu = dx * u.x + dy * u.y;
            let pv = dx * v.x + dy * v.y;
            min_u = min_u.min(pu);
            max_u = max_u.max(pu);
            min_v = min_v.min(pv);
            max_v = max_v.max(pv);
        }

        let area = (max_u - min_u) * (max_v - min_v);
        if best.as_ref().is_some_and(|(best_area, _)| area >= *best_area) {
            continue;
        }

        let corner = |su: f64, sv: f64| {
            Point2::new(
                origin.x + su * u.x + sv * v.x,
                origin.y + su * u.y + sv * v.y,
            )
        };
        best = Some((
            area,
            [
                corner(min_u, min_v),
                corner(max_u, min_v),
                corner(max_u, max_v),
                corner(min_u, max_v),
            ],
        ));
    }

    best.and_then(|(area, corners)| (area > EPSILON).then_some(corners))
}

/// Arrange four corners as top-left, top-right, bottom-right, bottom-left.
///
/// The two leftmost points (ties broken by smaller y) form the left side,
/// split by y into top-left and bottom-left. Of the remaining two, the one
/// farther from top-left is bottom-right. The result does not depend on
/// the order of the input points.
pub fn order_corners(corners: [Point2; 4]) -> Quad {
    let mut by_x = corners;
    by_x.sort_by(lexicographic);

    let mut left = [by_x[0], by_x[1]];
    left.sort_by(|a, b| a.y.total_cmp(&b.y).then(a.x.total_cmp(&b.x)));
    let [tl, bl] = left;

    let (r0, r1) = (by_x[2], by_x[3]);
    let d0 = tl.distance(r0);
    let d1 = tl.distance(r1);
    let (tr, br) = match d0.total_cmp(&d1) {
        Ordering::Greater => (r1, r0),
        Ordering::Less => (r0, r1),
        Ordering::Equal if r0.y <= r1.y => (r0, r1),
        Ordering::Equal => (r1, r0),
    };

    Quad { tl, tr, br, bl }
}

fn lexicographic(a: &Point2, b: &Point2) -> Ordering {
    a.x.total_cmp(&b.x).then(a.y.total_cmp(&b.y))
}

fn cross(o: Point2, a: Point2, b: Point2) -> f64 {
    (a.x - o.x) * (b.y - o.y) - (a.y - o.y) * (b.x - o.x)
}
