//! Read-only snapshots of the simulation state for renderers.

use crate::math::Point2d;
use crate::sensor::RayHits;
use crate::VehicleId;
#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// The state of a single vehicle at the end of a tick.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct VehicleSnapshot {
    pub id: VehicleId,
    pub position: Point2d,
    pub heading: f64,
    pub hull: [Point2d; 4],
    /// The nearest hit point of each ray cast this tick.
    pub ray_hits: RayHits,
    pub score: f64,
    pub vel: f64,
    pub active: bool,
}

/// The state of the simulation at the end of a tick.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Snapshot {
    /// The number of ticks simulated since the last reset.
    pub frame: usize,
    /// The vehicles, in index order.
    pub vehicles: Vec<VehicleSnapshot>,
    /// The index of the active gate.
    pub active_gate: Option<usize>,
}

#[cfg(feature = "debug")]
impl Snapshot {
    /// Renders the snapshot as a JSON array of debugging primitives:
    /// each vehicle's hull edges and a line to every ray hit.
    pub fn debug_frame(&self) -> serde_json::Value {
        use serde_json::json;

        let line = |name: &str, p1: Point2d, p2: Point2d| {
            json!({
                "type": "line",
                "name": name,
                "p1": [p1.x, p1.y],
                "p2": [p2.x, p2.y],
            })
        };

        let mut frame = vec![];
        for vehicle in &self.vehicles {
            let hull = vehicle.hull;
            for i in 0..4 {
                frame.push(line("hull", hull[i], hull[(i + 1) % 4]));
            }
            for hit in &vehicle.ray_hits {
                frame.push(line("ray", vehicle.position, *hit));
            }
        }
        json!(frame)
    }
}
