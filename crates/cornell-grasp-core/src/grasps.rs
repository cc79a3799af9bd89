//! Collections of grasp rectangles sharing one image frame.

use crate::error::{CapacityError, ParseError};
use crate::geometry::centroid;
use crate::grasp::GraspRectangle;
use crate::image::Image;
use crate::raster::convex_polygon_spans;
use log::debug;
use nalgebra::{Point2, Vector2};
use serde::{Deserialize, Serialize};
use std::{fs, path::Path};

/// Rasterization settings for [`GraspRectangles::draw_with`].
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct DrawOptions {
    /// Fraction of the grasp-axis extent kept for the labelled core.
    pub core_length_ratio: f64,
}

impl Default for DrawOptions {
    fn default() -> Self {
        Self {
            core_length_ratio: 1.0 / 3.0,
        }
    }
}

/// Position, angle and width label maps, single channel each.
#[derive(Clone, Debug)]
pub struct GraspMaps {
    pub position: Image,
    pub angle: Image,
    pub width: Image,
}

/// Ordered grasp rectangles in one coordinate frame.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct GraspRectangles {
    rects: Vec<GraspRectangle>,
}

impl GraspRectangles {
    pub fn new(rects: Vec<GraspRectangle>) -> Self {
        Self { rects }
    }

    /// Load a Cornell grasp file (`pcdXXXXcpos.txt` / `pcdXXXXcneg.txt`).
    pub fn load_from_file(path: impl AsRef<Path>) -> Result<Self, ParseError> {
        let path = path.as_ref();
        let text = fs::read_to_string(path).map_err(|source| ParseError {
            path: path.to_path_buf(),
            source,
        })?;
        Ok(Self::parse_str(&text))
    }

    /// Parse Cornell grasp text: every 4 consecutive lines are the corners of
    /// one rectangle, one `x y` pair per line.
    ///
    /// A group with a malformed or non-finite line is skipped; a trailing
    /// group of fewer than 4 lines is ignored.
    pub fn parse_str(text: &str) -> Self {
        let lines: Vec<&str> = text.lines().filter(|l| !l.trim().is_empty()).collect();
        let mut rects = Vec::with_capacity(lines.len() / 4);
        for (group, chunk) in lines.chunks(4).enumerate() {
            if chunk.len() < 4 {
                debug!("ignoring trailing grasp group {group} with {} lines", chunk.len());
                break;
            }
            let mut corners = [Point2::origin(); 4];
            let mut valid = true;
            for (slot, line) in corners.iter_mut().zip(chunk) {
                match parse_corner(line) {
                    Some(p) => *slot = p,
                    None => {
                        valid = false;
                        break;
                    }
                }
            }
            if valid {
                rects.push(GraspRectangle::new(corners));
            } else {
                debug!("skipping malformed grasp group {group}");
            }
        }
        Self { rects }
    }

    /// Rebuild a collection from a padded corner array, dropping padding rows.
    pub fn from_array(rows: &[[[f64; 2]; 4]]) -> Self {
        Self {
            rects: rows
                .iter()
                .map(|&r| GraspRectangle::from_array(r))
                .filter(|r| !r.is_padding())
                .collect(),
        }
    }

    pub fn len(&self) -> usize {
        self.rects.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rects.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, GraspRectangle> {
        self.rects.iter()
    }

    pub fn as_slice(&self) -> &[GraspRectangle] {
        &self.rects
    }

    pub fn push(&mut self, rect: GraspRectangle) {
        self.rects.push(rect);
    }

    /// Mean of the rectangle centers, `None` when empty.
    pub fn center(&self) -> Option<Point2<f64>> {
        centroid(self.rects.iter().map(GraspRectangle::center))
    }

    pub fn rotate(&mut self, angle: f64, center: Point2<f64>) {
        for r in &mut self.rects {
            r.rotate(angle, center);
        }
    }

    pub fn offset(&mut self, delta: Vector2<f64>) {
        for r in &mut self.rects {
            r.offset(delta);
        }
    }

    /// Scale every corner's displacement from `center` by `1 / factor`.
    ///
    /// Pairs with [`Image::zoom`] for the same factor and center.
    ///
    /// # Panics
    ///
    /// Panics if `factor` is not finite and strictly positive.
    pub fn zoom(&mut self, factor: f64, center: Point2<f64>) {
        assert!(
            factor.is_finite() && factor > 0.0,
            "zoom factor must be finite and > 0, got {factor}"
        );
        if factor == 1.0 {
            return;
        }
        for r in &mut self.rects {
            r.zoom(factor, center);
        }
    }

    /// Rectangles whose center lies on a `width x height` canvas.
    pub fn in_bounds(&self, width: usize, height: usize) -> impl Iterator<Item = &GraspRectangle> {
        self.rects
            .iter()
            .filter(move |r| center_in_bounds(r, width, height))
    }

    /// Drop rectangles whose center left the canvas.
    pub fn retain_in_bounds(&mut self, width: usize, height: usize) {
        self.rects.retain(|r| center_in_bounds(r, width, height));
    }

    pub fn draw(&self, width: usize, height: usize) -> GraspMaps {
        self.draw_with(width, height, &DrawOptions::default())
    }

    /// Rasterize in-bounds rectangles into position, angle and width maps.
    ///
    /// Rectangles are drawn in collection order; where their cores overlap
    /// the later rectangle overwrites the earlier one.
    pub fn draw_with(&self, width: usize, height: usize, opts: &DrawOptions) -> GraspMaps {
        let mut position = Image::zeros(width, height, 1);
        let mut angle = Image::zeros(width, height, 1);
        let mut grasp_width = Image::zeros(width, height, 1);

        for rect in self.in_bounds(width, height) {
            let core = rect.core(opts.core_length_ratio);
            let a = rect.angle() as f32;
            let w = rect.width() as f32;
            for span in convex_polygon_spans(&core.corners, width, height) {
                let base = span.row * width;
                let cols = span.cols();
                let run = base + cols.start..base + cols.end;
                position.data[run.clone()].fill(1.0);
                angle.data[run.clone()].fill(a);
                grasp_width.data[run].fill(w);
            }
        }

        GraspMaps {
            position,
            angle,
            width: grasp_width,
        }
    }

    /// Corners of every rectangle as `[row, col]` pairs, zero-padded to
    /// `pad_to`.
    pub fn to_array(&self, pad_to: usize) -> Result<Vec<[[f64; 2]; 4]>, CapacityError> {
        if self.rects.len() > pad_to {
            return Err(CapacityError {
                count: self.rects.len(),
                capacity: pad_to,
            });
        }
        let mut out: Vec<[[f64; 2]; 4]> = self.rects.iter().map(|r| r.to_array()).collect();
        out.resize(pad_to, [[0.0; 2]; 4]);
        Ok(out)
    }
}

impl<'a> IntoIterator for &'a GraspRectangles {
    type Item = &'a GraspRectangle;
    type IntoIter = std::slice::Iter<'a, GraspRectangle>;

    fn into_iter(self) -> Self::IntoIter {
        self.rects.iter()
    }
}

impl FromIterator<GraspRectangle> for GraspRectangles {
    fn from_iter<T: IntoIterator<Item = GraspRectangle>>(iter: T) -> Self {
        Self::new(iter.into_iter().collect())
    }
}

fn center_in_bounds(rect: &GraspRectangle, width: usize, height: usize) -> bool {
    let c = rect.center();
    c.x >= 0.0 && c.y >= 0.0 && c.x < width as f64 && c.y < height as f64
}

fn parse_corner(line: &str) -> Option<Point2<f64>> {
    let mut it = line.split_whitespace();
    let x: f64 = it.next()?.parse().ok()?;
    let y: f64 = it.next()?.parse().ok()?;
    if it.next().is_some() || !x.is_finite() || !y.is_finite() {
        return None;
    }
    Some(Point2::new(x, y))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grasp::GraspPose;
    use approx::assert_relative_eq;
    use std::io::Write;

    const CORNELL_SNIPPET: &str = "\
253 319.7
309 324
307 350
251 345.7
NaN NaN
1 2
3 4
5 6
200.5 300
240 300
240 320
200.5 320
10 10
";

    fn pose(cx: f64, cy: f64, angle: f64) -> GraspRectangle {
        GraspPose {
            center: Point2::new(cx, cy),
            angle,
            length: 12.0,
            width: 6.0,
        }
        .to_rectangle()
    }

    #[test]
    fn parses_groups_and_skips_bad_ones() {
        let grs = GraspRectangles::parse_str(CORNELL_SNIPPET);
        assert_eq!(grs.len(), 2);
        assert_relative_eq!(grs.as_slice()[0].corners[0], Point2::new(253.0, 319.7));
        assert_relative_eq!(grs.as_slice()[1].corners[3], Point2::new(200.5, 320.0));
    }

    #[test]
    fn load_from_file_reports_missing_files() {
        let err = GraspRectangles::load_from_file("/definitely/not/here/pcd0100cpos.txt")
            .expect_err("missing file");
        assert!(err.to_string().contains("pcd0100cpos.txt"));
    }

    #[test]
    fn load_from_file_reads_text() {
        let mut f = tempfile::NamedTempFile::new().unwrap();
        f.write_all(CORNELL_SNIPPET.as_bytes()).unwrap();
        let grs = GraspRectangles::load_from_file(f.path()).unwrap();
        assert_eq!(grs.len(), 2);
    }

    #[test]
    fn rotate_round_trip_restores_corners() {
        let grs = GraspRectangles::parse_str(CORNELL_SNIPPET);
        let c = grs.center().unwrap();
        let mut moved = grs.clone();
        moved.rotate(1.1, c);
        moved.rotate(-1.1, c);
        for (a, b) in grs.iter().zip(moved.iter()) {
            for (p, q) in a.corners.iter().zip(&b.corners) {
                assert_relative_eq!(p, q, epsilon = 1e-9);
            }
        }
    }

    #[test]
    fn zoom_by_one_is_a_no_op() {
        let grs = GraspRectangles::parse_str(CORNELL_SNIPPET);
        let mut zoomed = grs.clone();
        zoomed.zoom(1.0, Point2::new(3.0, 4.0));
        assert_eq!(zoomed, grs);
    }

    #[test]
    #[should_panic(expected = "zoom factor")]
    fn zoom_rejects_non_positive_factor() {
        GraspRectangles::parse_str(CORNELL_SNIPPET).zoom(0.0, Point2::origin());
    }

    #[test]
    fn offset_moves_the_center() {
        let mut grs = GraspRectangles::new(vec![pose(10.0, 10.0, 0.0)]);
        grs.offset(Vector2::new(-4.0, 3.0));
        assert_relative_eq!(grs.center().unwrap(), Point2::new(6.0, 13.0), epsilon = 1e-9);
    }

    #[test]
    fn to_array_pads_with_zeros() {
        let grs = GraspRectangles::new(vec![
            pose(10.0, 10.0, 0.0),
            pose(20.0, 20.0, 0.5),
            pose(30.0, 30.0, -0.5),
        ]);
        let arr = grs.to_array(25).unwrap();
        assert_eq!(arr.len(), 25);
        assert!(arr[3..].iter().all(|r| *r == [[0.0; 2]; 4]));
        assert_eq!(arr[1], grs.as_slice()[1].to_array());
        assert_eq!(GraspRectangles::from_array(&arr), grs);
    }

    #[test]
    fn to_array_fails_over_capacity() {
        let grs: GraspRectangles = (0..3).map(|i| pose(i as f64, 5.0, 0.0)).collect();
        let err = grs.to_array(2).unwrap_err();
        assert_eq!(
            err,
            CapacityError {
                count: 3,
                capacity: 2
            }
        );
    }

    #[test]
    fn draw_marks_core_with_angle_and_width() {
        let rect = pose(10.0, 8.0, 0.0);
        let maps = GraspRectangles::new(vec![rect]).draw(20, 16);
        // Core is 4 px along x around the center: columns 8..=12, rows 5..=11.
        assert_eq!(maps.position.get(8, 10, 0), 1.0);
        assert_eq!(maps.position.get(8, 12, 0), 1.0);
        assert_eq!(maps.position.get(8, 13, 0), 0.0);
        assert_eq!(maps.position.get(5, 10, 0), 1.0);
        assert_eq!(maps.position.get(4, 10, 0), 0.0);
        assert_relative_eq!(maps.width.get(8, 10, 0), 6.0);
        assert_relative_eq!(maps.angle.get(8, 10, 0), 0.0);
        let hot = maps.position.data.iter().filter(|&&v| v > 0.0).count();
        assert_eq!(hot, 5 * 7);
    }

    #[test]
    fn draw_skips_out_of_frame_and_overwrites_in_order() {
        let first = pose(10.0, 10.0, 0.3);
        let second = pose(10.0, 10.0, -0.4);
        let outside = pose(50.0, 10.0, 0.0);
        let maps = GraspRectangles::new(vec![first, second, outside]).draw(20, 20);
        assert_relative_eq!(maps.angle.get(10, 10, 0), second.angle() as f32);

        let only_outside = GraspRectangles::new(vec![outside]).draw(20, 20);
        assert!(only_outside.position.data.iter().all(|&v| v == 0.0));
    }

    #[test]
    fn retain_in_bounds_uses_centers() {
        let mut grs = GraspRectangles::new(vec![pose(-1.0, 5.0, 0.0), pose(5.0, 5.0, 0.0)]);
        assert_eq!(grs.in_bounds(10, 10).count(), 1);
        grs.retain_in_bounds(10, 10);
        assert_eq!(grs.len(), 1);
    }
}
