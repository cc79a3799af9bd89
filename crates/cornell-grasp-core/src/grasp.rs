//! A single oriented grasp rectangle.

use crate::geometry::{
    centroid, direction_angle, polar_offset, rotate_point, scale_point, wrap_half_pi,
};
use nalgebra::{Point2, Vector2};
use serde::{Deserialize, Serialize};

/// One candidate grasp as 4 ordered corners.
///
/// The edge `corners[0] -> corners[1]` is the grasp axis: it defines
/// [`GraspRectangle::angle`]. Corners follow the rectangle outline, so
/// `corners[1] -> corners[2]` is the perpendicular edge.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct GraspRectangle {
    pub corners: [Point2<f64>; 4],
}

impl GraspRectangle {
    pub fn new(corners: [Point2<f64>; 4]) -> Self {
        Self { corners }
    }

    /// Mean of the four corners.
    pub fn center(&self) -> Point2<f64> {
        centroid(self.corners).unwrap_or_else(Point2::origin)
    }

    /// Orientation of the grasp axis in `[-π/2, π/2)`.
    pub fn angle(&self) -> f64 {
        wrap_half_pi(direction_angle(self.corners[0], self.corners[1]))
    }

    /// Lengths of the grasp-axis edge and of the perpendicular edge.
    pub fn edge_lengths(&self) -> (f64, f64) {
        (
            (self.corners[1] - self.corners[0]).norm(),
            (self.corners[2] - self.corners[1]).norm(),
        )
    }

    /// Longer edge length.
    pub fn length(&self) -> f64 {
        let (a, b) = self.edge_lengths();
        a.max(b)
    }

    /// Shorter edge length, the gripper opening.
    pub fn width(&self) -> f64 {
        let (a, b) = self.edge_lengths();
        a.min(b)
    }

    /// Center, angle and edge extents of this rectangle.
    pub fn pose(&self) -> GraspPose {
        let (along, across) = self.edge_lengths();
        GraspPose {
            center: self.center(),
            angle: self.angle(),
            length: along,
            width: across,
        }
    }

    /// Region used for the position label: the rectangle shrunk along its
    /// grasp axis by `ratio` around the center.
    pub fn core(&self, ratio: f64) -> GraspRectangle {
        let mut pose = self.pose();
        pose.length *= ratio;
        pose.to_rectangle()
    }

    pub fn rotate(&mut self, angle: f64, center: Point2<f64>) {
        for p in &mut self.corners {
            *p = rotate_point(*p, center, angle);
        }
    }

    pub fn offset(&mut self, delta: Vector2<f64>) {
        for p in &mut self.corners {
            *p += delta;
        }
    }

    /// Scale corner displacements from `center` by `1 / factor`.
    pub fn zoom(&mut self, factor: f64, center: Point2<f64>) {
        let s = 1.0 / factor;
        for p in &mut self.corners {
            *p = scale_point(*p, center, s);
        }
    }

    /// Corners as `[row, col]` pairs.
    pub fn to_array(&self) -> [[f64; 2]; 4] {
        self.corners.map(|p| [p.y, p.x])
    }

    /// Inverse of [`to_array`](Self::to_array).
    pub fn from_array(rows: [[f64; 2]; 4]) -> Self {
        Self::new(rows.map(|[row, col]| Point2::new(col, row)))
    }

    /// All corners exactly at the origin, the padding sentinel.
    pub fn is_padding(&self) -> bool {
        self.corners.iter().all(|p| p.x == 0.0 && p.y == 0.0)
    }
}

/// Grasp described by its center, axis angle and extents.
///
/// `length` is measured along the grasp axis and `width` across it.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct GraspPose {
    pub center: Point2<f64>,
    pub angle: f64,
    pub length: f64,
    pub width: f64,
}

impl GraspPose {
    pub fn to_rectangle(&self) -> GraspRectangle {
        let half_axis = polar_offset(self.angle, self.length * 0.5);
        let half_across = polar_offset(self.angle - std::f64::consts::FRAC_PI_2, self.width * 0.5);
        let a = self.center - half_axis;
        let b = self.center + half_axis;
        GraspRectangle::new([
            a - half_across,
            b - half_across,
            b + half_across,
            a + half_across,
        ])
    }
}
