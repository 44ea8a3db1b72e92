use super::{Point2d, Vector2d};
#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// A straight line segment between two points.
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct LineSegment2d {
    pub start: Point2d,
    pub end: Point2d,
}

impl LineSegment2d {
    /// Creates a line segment from its two end points.
    pub const fn from_ends(start: Point2d, end: Point2d) -> Self {
        Self { start, end }
    }

    /// Creates a line segment starting at `start` and spanning `vec`.
    pub fn from_vector(start: Point2d, vec: Vector2d) -> Self {
        Self {
            start,
            end: start + vec,
        }
    }

    /// Samples the segment at the parameter `t`, where 0 is the start and 1 is the end.
    pub fn lerp(&self, t: f64) -> Point2d {
        self.start + t * (self.end - self.start)
    }

    /// Computes the parameters `(t, u)` at which the infinite lines through
    /// `self` and `other` cross, where `t` is along `self` and `u` is along `other`.
    /// Returns `None` if the lines are parallel or coincident.
    fn crossing_params(&self, other: &Self) -> Option<(f64, f64)> {
        let (x1, y1, x2, y2) = (self.start.x, self.start.y, self.end.x, self.end.y);
        let (x3, y3, x4, y4) = (other.start.x, other.start.y, other.end.x, other.end.y);

        let denom = (x1 - x2) * (y3 - y4) - (y1 - y2) * (x3 - x4);
        if denom == 0.0 {
            return None;
        }

        let t = ((x1 - x3) * (y3 - y4) - (y1 - y3) * (x3 - x4)) / denom;
        let u = -((x1 - x2) * (y1 - y3) - (y1 - y2) * (x1 - x3)) / denom;
        Some((t, u))
    }

    /// Finds the point at which two segments strictly cross.
    ///
    /// Touching at an end point does not count; both parameters must lie in
    /// the open interval (0, 1). The point is evaluated along `self`.
    pub fn intersect(&self, other: &Self) -> Option<Point2d> {
        let (t, u) = self.crossing_params(other)?;
        (0.0 < t && t < 1.0 && 0.0 < u && u < 1.0).then(|| self.lerp(t))
    }

    /// Returns true if the two segments cross or touch,
    /// i.e. both parameters lie in the closed interval [0, 1].
    pub fn overlaps(&self, other: &Self) -> bool {
        self.crossing_params(other)
            .map_or(false, |(t, u)| (0.0..=1.0).contains(&t) && (0.0..=1.0).contains(&u))
    }
}
