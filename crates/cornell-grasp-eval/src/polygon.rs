//! Convex polygon areas and overlaps.

use cornell_grasp_core::geometry::angle_difference;
use cornell_grasp_core::GraspRectangle;
use nalgebra::Point2;

const AREA_EPS: f64 = 1e-12;

/// Signed shoelace area, positive for counter-clockwise vertex order in a
/// y-up frame.
pub fn signed_area(poly: &[Point2<f64>]) -> f64 {
    if poly.len() < 3 {
        return 0.0;
    }
    let mut acc = 0.0;
    for (i, p) in poly.iter().enumerate() {
        let q = poly[(i + 1) % poly.len()];
        acc += p.x * q.y - q.x * p.y;
    }
    acc * 0.5
}

pub fn polygon_area(poly: &[Point2<f64>]) -> f64 {
    signed_area(poly).abs()
}

#[inline]
fn cross(a: Point2<f64>, b: Point2<f64>, p: Point2<f64>) -> f64 {
    (b.x - a.x) * (p.y - a.y) - (b.y - a.y) * (p.x - a.x)
}

fn segment_line_intersection(
    p: Point2<f64>,
    q: Point2<f64>,
    a: Point2<f64>,
    b: Point2<f64>,
) -> Point2<f64> {
    let dp = cross(a, b, p);
    let dq = cross(a, b, q);
    let denom = dp - dq;
    if denom.abs() < AREA_EPS {
        return p;
    }
    let t = dp / denom;
    p + (q - p) * t
}

/// Intersection of two convex polygons (Sutherland-Hodgman).
///
/// Either input may be in either winding; the result follows `subject`'s
/// vertex order and is empty when the polygons do not overlap.
pub fn convex_intersection(subject: &[Point2<f64>], clip: &[Point2<f64>]) -> Vec<Point2<f64>> {
    if subject.len() < 3 || clip.len() < 3 {
        return Vec::new();
    }
    let orientation = signed_area(clip).signum();
    if orientation == 0.0 {
        return Vec::new();
    }

    let mut output: Vec<Point2<f64>> = subject.to_vec();
    for (i, &a) in clip.iter().enumerate() {
        let b = clip[(i + 1) % clip.len()];
        let input = std::mem::take(&mut output);
        if input.is_empty() {
            break;
        }
        let inside = |p: Point2<f64>| cross(a, b, p) * orientation >= 0.0;
        for (j, &cur) in input.iter().enumerate() {
            let prev = input[(j + input.len() - 1) % input.len()];
            match (inside(prev), inside(cur)) {
                (true, true) => output.push(cur),
                (true, false) => output.push(segment_line_intersection(prev, cur, a, b)),
                (false, true) => {
                    output.push(segment_line_intersection(prev, cur, a, b));
                    output.push(cur);
                }
                (false, false) => {}
            }
        }
    }
    output
}

/// Intersection over union of two grasp rectangles as exact polygons.
pub fn rectangle_iou(a: &GraspRectangle, b: &GraspRectangle) -> f64 {
    let area_a = polygon_area(&a.corners);
    let area_b = polygon_area(&b.corners);
    let inter = polygon_area(&convex_intersection(&a.corners, &b.corners));
    let union = area_a + area_b - inter;
    if union <= AREA_EPS {
        return 0.0;
    }
    (inter / union).clamp(0.0, 1.0)
}

/// [`rectangle_iou`], or 0 unless the grasp axes differ by less than
/// `angle_threshold` (modulo π).
pub fn grasp_iou(pred: &GraspRectangle, gt: &GraspRectangle, angle_threshold: f64) -> f64 {
    if angle_difference(pred.angle(), gt.angle()) >= angle_threshold {
        return 0.0;
    }
    rectangle_iou(pred, gt)
}
