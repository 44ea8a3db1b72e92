use super::{Point2d, Vector2d};
use cgmath::prelude::*;
use cgmath::{Matrix2, Rad};

/// Computes the Euclidean distance between two points.
pub fn distance(a: Point2d, b: Point2d) -> f64 {
    a.distance(b)
}

/// Rotates a vector by `angle` radians using the standard rotation matrix.
pub fn rotate_vector(vec: Vector2d, angle: f64) -> Vector2d {
    Matrix2::from_angle(Rad(angle)) * vec
}

/// Rotates `point` about `origin` by `angle` radians.
pub fn rotate(origin: Point2d, point: Point2d, angle: f64) -> Point2d {
    origin + rotate_vector(point - origin, angle)
}

/// Rotates the four corners of a rectangle about its centre,
/// which is taken to be the midpoint of the diagonal from `corners[0]` to `corners[2]`.
pub fn rotate_rect(corners: [Point2d; 4], angle: f64) -> [Point2d; 4] {
    let centre = corners[0].midpoint(corners[2]);
    corners.map(|corner| rotate(centre, corner, angle))
}

#[cfg(test)]
mod test {
    use super::*;
    use assert_approx_eq::assert_approx_eq;
    use std::f64::consts::PI;

    #[test]
    fn rotation_is_invertible() {
        let origin = Point2d::new(3.0, -7.5);
        let point = Point2d::new(-12.0, 40.25);
        for i in -24..=24 {
            let angle = i as f64 * PI / 7.0;
            let back = rotate(origin, rotate(origin, point, angle), -angle);
            assert_approx_eq!(back.x, point.x, 1e-9);
            assert_approx_eq!(back.y, point.y, 1e-9);
        }
    }

    #[test]
    fn quarter_turn() {
        let p = rotate(Point2d::new(1.0, 1.0), Point2d::new(2.0, 1.0), 0.5 * PI);
        assert_approx_eq!(p.x, 1.0);
        assert_approx_eq!(p.y, 2.0);
    }

    #[test]
    fn half_turn_flips_forward_vector() {
        let v = rotate_vector(Vector2d::new(0.0, 5.0), PI);
        assert_approx_eq!(v.x, 0.0);
        assert_approx_eq!(v.y, -5.0);
    }

    #[test]
    fn rect_keeps_centre_and_diagonal() {
        let corners = [
            Point2d::new(-3.0, -7.5),
            Point2d::new(3.0, -7.5),
            Point2d::new(3.0, 7.5),
            Point2d::new(-3.0, 7.5),
        ];
        let rotated = rotate_rect(corners, 0.3);
        let centre = rotated[0].midpoint(rotated[2]);
        assert_approx_eq!(centre.x, 0.0);
        assert_approx_eq!(centre.y, 0.0);
        assert_approx_eq!(
            distance(rotated[0], rotated[2]),
            distance(corners[0], corners[2])
        );
        assert_approx_eq!(distance(rotated[0], rotated[1]), 6.0);
    }
}
