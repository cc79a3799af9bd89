//! Point and angle helpers shared by the grasp model and the image wrapper.
//!
//! Coordinates are image coordinates: `x` is the column, `y` is the row and
//! grows downwards. Angles are counter-clockwise *as seen on screen*, so a
//! positive angle moves a point on the +x axis towards -y.

use nalgebra::{Point2, Vector2};
use std::f64::consts::{FRAC_PI_2, PI};

/// Rotate `p` about `center` by `angle` radians (counter-clockwise on screen).
#[inline]
pub fn rotate_point(p: Point2<f64>, center: Point2<f64>, angle: f64) -> Point2<f64> {
    let (s, c) = angle.sin_cos();
    let d = p - center;
    Point2::new(center.x + c * d.x + s * d.y, center.y - s * d.x + c * d.y)
}

/// Scale the displacement of `p` from `center` by `s`.
#[inline]
pub fn scale_point(p: Point2<f64>, center: Point2<f64>, s: f64) -> Point2<f64> {
    center + (p - center) * s
}

/// Image-space vector of length `radius` pointing along `angle`.
#[inline]
pub fn polar_offset(angle: f64, radius: f64) -> Vector2<f64> {
    let (s, c) = angle.sin_cos();
    Vector2::new(c * radius, -s * radius)
}

/// Orientation of the vector `from -> to`, in `(-π, π]`.
#[inline]
pub fn direction_angle(from: Point2<f64>, to: Point2<f64>) -> f64 {
    let d = to - from;
    (-d.y).atan2(d.x)
}

/// Normalize an orientation to `[-π/2, π/2)`.
///
/// Grasps are symmetric under a half turn, so this is the canonical range for
/// grasp angles.
#[inline]
pub fn wrap_half_pi(angle: f64) -> f64 {
    (angle + FRAC_PI_2).rem_euclid(PI) - FRAC_PI_2
}

/// Absolute difference between two grasp orientations modulo π, in `[0, π/2]`.
#[inline]
pub fn angle_difference(a: f64, b: f64) -> f64 {
    wrap_half_pi(a - b).abs()
}

/// Mean of a non-empty set of points. Returns `None` for an empty input.
pub fn centroid<I>(points: I) -> Option<Point2<f64>>
where
    I: IntoIterator<Item = Point2<f64>>,
{
    let mut sum = Vector2::zeros();
    let mut n = 0usize;
    for p in points {
        sum += p.coords;
        n += 1;
    }
    (n > 0).then(|| Point2::from(sum / n as f64))
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn quarter_turn_moves_x_axis_up() {
        let c = Point2::new(10.0, 10.0);
        let p = Point2::new(15.0, 10.0);
        let q = rotate_point(p, c, FRAC_PI_2);
        assert_relative_eq!(q.x, 10.0, epsilon = 1e-12);
        assert_relative_eq!(q.y, 5.0, epsilon = 1e-12);
    }

    #[test]
    fn rotation_inverts_with_negated_angle() {
        let c = Point2::new(3.0, -7.5);
        let p = Point2::new(42.0, 17.25);
        let back = rotate_point(rotate_point(p, c, 0.83), c, -0.83);
        assert_relative_eq!(back, p, epsilon = 1e-9);
    }

    #[test]
    fn direction_follows_rotation() {
        let a = Point2::new(0.0, 0.0);
        let b = Point2::new(4.0, 0.0);
        let rotated = rotate_point(b, a, 0.4);
        assert_relative_eq!(direction_angle(a, rotated), 0.4, epsilon = 1e-12);
        assert_relative_eq!(
            (rotated - a).norm(),
            polar_offset(0.4, 4.0).norm(),
            epsilon = 1e-12
        );
    }

    #[test]
    fn half_pi_wrap_is_half_open() {
        assert_relative_eq!(wrap_half_pi(FRAC_PI_2), -FRAC_PI_2, epsilon = 1e-12);
        assert_relative_eq!(wrap_half_pi(PI), 0.0, epsilon = 1e-12);
        assert_relative_eq!(wrap_half_pi(-0.3), -0.3, epsilon = 1e-12);
        assert_relative_eq!(wrap_half_pi(0.3 + 3.0 * PI), 0.3, epsilon = 1e-9);
    }

    #[test]
    fn opposite_orientations_have_zero_difference() {
        assert!(angle_difference(0.7, 0.7 + PI) < 1e-12);
        assert!(angle_difference(-1.2, -1.2 - PI) < 1e-12);
        assert_relative_eq!(angle_difference(0.1, -0.1), 0.2, epsilon = 1e-12);
        assert_relative_eq!(
            angle_difference(1.5, -1.5),
            PI - 3.0,
            epsilon = 1e-12
        );
    }

    #[test]
    fn centroid_of_nothing_is_none() {
        assert!(centroid(std::iter::empty()).is_none());
        let c = centroid([Point2::new(0.0, 0.0), Point2::new(2.0, 4.0)]).unwrap();
        assert_relative_eq!(c, Point2::new(1.0, 2.0));
    }
}
