//! Scanline rasterization of convex polygons.

use nalgebra::Point2;

const EDGE_EPS: f64 = 1e-9;

/// Horizontal run of pixels `cols` on `row` (end exclusive).
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct RowSpan {
    pub row: usize,
    pub start: usize,
    pub end: usize,
}

impl RowSpan {
    pub fn cols(&self) -> std::ops::Range<usize> {
        self.start..self.end
    }
}

/// Pixel runs covered by a convex polygon on a `width x height` canvas.
///
/// A pixel `(row, col)` is covered when its center `(x = col, y = row)` lies
/// inside the polygon or on its boundary. Vertices may be given in either
/// winding order.
pub fn convex_polygon_spans(polygon: &[Point2<f64>], width: usize, height: usize) -> Vec<RowSpan> {
    if polygon.len() < 3 || width == 0 || height == 0 {
        return Vec::new();
    }
    if polygon.iter().any(|p| !p.x.is_finite() || !p.y.is_finite()) {
        return Vec::new();
    }

    let (min_y, max_y) = polygon
        .iter()
        .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), p| {
            (lo.min(p.y), hi.max(p.y))
        });
    let first_row = (min_y - EDGE_EPS).ceil().max(0.0);
    let last_row = (max_y + EDGE_EPS).floor().min(height as f64 - 1.0);
    if first_row > last_row {
        return Vec::new();
    }

    let mut spans = Vec::new();
    for row in first_row as usize..=last_row as usize {
        let Some((x_lo, x_hi)) = row_extent(polygon, row as f64) else {
            continue;
        };
        let start = (x_lo - EDGE_EPS).ceil().max(0.0);
        let end = (x_hi + EDGE_EPS).floor().min(width as f64 - 1.0);
        if start > end {
            continue;
        }
        spans.push(RowSpan {
            row,
            start: start as usize,
            end: end as usize + 1,
        });
    }
    spans
}

/// Number of canvas pixels covered by a convex polygon.
pub fn convex_polygon_pixel_count(polygon: &[Point2<f64>], width: usize, height: usize) -> usize {
    convex_polygon_spans(polygon, width, height)
        .iter()
        .map(|s| s.cols().len())
        .sum()
}

// Intersection of the horizontal line `y` with the polygon outline.
fn row_extent(polygon: &[Point2<f64>], y: f64) -> Option<(f64, f64)> {
    let mut lo = f64::INFINITY;
    let mut hi = f64::NEG_INFINITY;
    let n = polygon.len();
    for i in 0..n {
        let a = polygon[i];
        let b = polygon[(i + 1) % n];
        let (y0, y1) = if a.y <= b.y { (a.y, b.y) } else { (b.y, a.y) };
        if y < y0 - EDGE_EPS || y > y1 + EDGE_EPS {
            continue;
        }
        if (b.y - a.y).abs() <= EDGE_EPS {
            lo = lo.min(a.x.min(b.x));
            hi = hi.max(a.x.max(b.x));
            continue;
        }
        let t = ((y - a.y) / (b.y - a.y)).clamp(0.0, 1.0);
        let x = a.x + t * (b.x - a.x);
        lo = lo.min(x);
        hi = hi.max(x);
    }
    (lo <= hi).then_some((lo, hi))
}
