//! Immutable simulation parameters.

use crate::collision::CollisionStrategy;
use crate::error::ConfigError;
use crate::math::{Point2d, Vector2d};
use crate::sensor::RaySource;
use crate::vehicle::ReversePolicy;
#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// The parameters of a simulation, fixed for its lifetime.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize), serde(default))]
pub struct SimulationConfig {
    /// The number of vehicles to simulate.
    pub num_vehicles: usize,
    /// The starting position of the first vehicle.
    pub start: Point2d,
    /// The offset between the starting positions of consecutive vehicles.
    pub start_spacing: Vector2d,
    /// The heading every vehicle starts with, in radians.
    pub start_heading: f64,
    /// The attributes shared by all vehicles.
    pub vehicle: VehicleAttributes,
    /// The reward constants.
    pub rewards: Rewards,
    /// The gate crossing parameters.
    pub checkpoint: CheckpointParams,
    /// The ray casting parameters.
    pub sensor: SensorParams,
    /// How collisions with the track are detected.
    pub collision: CollisionStrategy,
}

/// The attributes of a simulated vehicle.
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize), serde(default))]
pub struct VehicleAttributes {
    /// The vehicle width.
    pub width: f64,
    /// The vehicle length.
    pub length: f64,
    /// The maximum speed, in units per tick, in either direction.
    pub max_velocity: f64,
    /// The change in velocity applied by a throttle input, in units per tick.
    pub acceleration: f64,
    /// The change in heading applied by a steering input, in radians.
    pub turn_rate: f64,
    /// How reverse throttle interacts with forward motion.
    pub reverse: ReversePolicy,
}

/// The reward constants.
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize), serde(default))]
pub struct Rewards {
    /// Awarded for crossing the active gate.
    pub goal: f64,
    /// Added to every active vehicle's reward each tick.
    pub survival: f64,
    /// Added when a vehicle collides.
    pub crash: f64,
}

/// The parameters of the gate crossing test.
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize), serde(default))]
pub struct CheckpointParams {
    /// The length of the forward probe cast from the vehicle centre.
    pub probe_length: f64,
    /// The crossing point must lie within this distance of the vehicle centre.
    pub capture_radius: f64,
}

/// The parameters of the ray casting sensor.
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize), serde(default))]
pub struct SensorParams {
    /// The length of each ray, also reported as the distance when nothing is hit.
    pub range: f64,
    /// The obstacles the rays are cast against.
    pub source: RaySource,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            num_vehicles: 1,
            start: Point2d::new(665.0, 320.0),
            start_spacing: Vector2d::new(20.0, 20.0),
            start_heading: 180f64.to_radians(),
            vehicle: Default::default(),
            rewards: Default::default(),
            checkpoint: Default::default(),
            sensor: Default::default(),
            collision: CollisionStrategy::Segments,
        }
    }
}

impl Default for VehicleAttributes {
    fn default() -> Self {
        Self {
            width: 6.0,
            length: 15.0,
            max_velocity: 15.0,
            acceleration: 5.0,
            turn_rate: 15f64.to_radians(),
            reverse: ReversePolicy::Symmetric,
        }
    }
}

impl Default for Rewards {
    fn default() -> Self {
        Self {
            goal: 10.0,
            survival: 1.0,
            crash: -10.0,
        }
    }
}

impl Default for CheckpointParams {
    fn default() -> Self {
        Self {
            probe_length: 50.0,
            capture_radius: 20.0,
        }
    }
}

impl Default for SensorParams {
    fn default() -> Self {
        Self {
            range: 1000.0,
            source: RaySource::Walls,
        }
    }
}

impl SimulationConfig {
    /// Parses a configuration from JSON. Missing fields take their default values.
    #[cfg(feature = "serde")]
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Checks that the configuration describes a simulation that can be run.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.num_vehicles == 0 {
            return Err(ConfigError::NoVehicles);
        }
        let positive = [
            ("vehicle.width", self.vehicle.width),
            ("vehicle.length", self.vehicle.length),
            ("vehicle.max_velocity", self.vehicle.max_velocity),
            ("sensor.range", self.sensor.range),
        ];
        for (name, value) in positive {
            if !(value > 0.0) {
                return Err(ConfigError::NonPositive { name, value });
            }
        }
        Ok(())
    }

    /// The starting position of the vehicle at `idx`.
    pub fn start_position(&self, idx: usize) -> Point2d {
        self.start + idx as f64 * self.start_spacing
    }
}
