//! Collision detection between vehicles, the track and each other.

use crate::math::LineSegment2d;
use crate::track::Track;
use crate::vehicle::Vehicle;
#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// The number of intervals each hull edge is divided into when sampling the track surface.
const EDGE_SAMPLES: usize = 10;

/// How collisions with the track are detected.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum CollisionStrategy {
    /// Hull edges are intersected with the track's wall segments.
    #[default]
    Segments,
    /// Hull edges are sampled against the rasterised track surface,
    /// and checked for overlap with the other vehicles' hulls.
    Surface,
}

impl CollisionStrategy {
    /// Determines whether `vehicle` has collided.
    ///
    /// # Parameters
    /// * `vehicle` - The vehicle to test
    /// * `track` - The track geometry
    /// * `others` - The other active vehicles
    pub fn collides<'a>(
        self,
        vehicle: &Vehicle,
        track: &Track,
        others: impl IntoIterator<Item = &'a Vehicle>,
    ) -> bool {
        match self {
            CollisionStrategy::Segments => hits_walls(vehicle, track.walls()),
            CollisionStrategy::Surface => {
                hits_surface(vehicle, track)
                    || others.into_iter().any(|other| hulls_overlap(vehicle, other))
            }
        }
    }
}

/// Whether any hull edge strictly crosses any wall.
fn hits_walls(vehicle: &Vehicle, walls: &[LineSegment2d]) -> bool {
    let edges = vehicle.hull_edges();
    walls
        .iter()
        .any(|wall| edges.iter().any(|edge| wall.intersect(edge).is_some()))
}

/// Whether any sample along the hull edges lands on a wall pixel.
/// Samples outside the surface are ignored.
fn hits_surface(vehicle: &Vehicle, track: &Track) -> bool {
    let Some(surface) = track.surface() else {
        return false;
    };
    vehicle
        .hull_edges()
        .iter()
        .any(|edge| surface.segment_touches_wall(edge, EDGE_SAMPLES))
}

/// Whether any pair of hull edges from two different vehicles cross or touch.
fn hulls_overlap(vehicle: &Vehicle, other: &Vehicle) -> bool {
    if vehicle.id() == other.id() {
        return false;
    }
    let others = other.hull_edges();
    vehicle
        .hull_edges()
        .iter()
        .any(|edge| others.iter().any(|o| edge.overlaps(o)))
}
