//! Progress scoring against an ordered ring of gates.

use crate::config::CheckpointParams;
use crate::math::{distance, LineSegment2d};
use crate::util::ring_prev;
use crate::vehicle::Vehicle;

/// Tracks which of the track's gates is currently active.
///
/// The last gate starts active. Crossing the active gate hands activation to the
/// gate immediately before it in the ring, so at most one gate is ever active.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Checkpoints {
    /// The number of gates in the ring.
    count: usize,
    /// The index of the active gate.
    active: Option<usize>,
}

impl Checkpoints {
    /// Creates a ring over `count` gates with the last one active.
    pub fn new(count: usize) -> Self {
        Self {
            count,
            active: count.checked_sub(1),
        }
    }

    /// The index of the active gate, or `None` if there are no gates.
    pub fn active(&self) -> Option<usize> {
        self.active
    }

    /// Whether the gate at `idx` is active.
    pub fn is_active(&self, idx: usize) -> bool {
        self.active == Some(idx)
    }

    /// Restores the initial activation.
    pub fn reset(&mut self) {
        *self = Self::new(self.count);
    }

    /// Tests whether `vehicle` has crossed the active gate, and if so, advances the ring.
    /// Returns true iff the gate was crossed. Inactive gates are never tested.
    pub fn try_cross(
        &mut self,
        gates: &[LineSegment2d],
        vehicle: &Vehicle,
        params: &CheckpointParams,
    ) -> bool {
        let Some(idx) = self.active else {
            return false;
        };
        if !crosses(&gates[idx], vehicle, params) {
            return false;
        }
        let next = ring_prev(idx, self.count);
        log::debug!("vehicle crossed gate {idx}, gate {next} is now active");
        self.active = Some(next);
        true
    }
}

/// Whether the vehicle's forward probe crosses `gate` close enough to the vehicle.
fn crosses(gate: &LineSegment2d, vehicle: &Vehicle, params: &CheckpointParams) -> bool {
    gate.intersect(&vehicle.probe(params.probe_length))
        .map_or(false, |pt| {
            distance(vehicle.position(), pt) < params.capture_radius
        })
}
