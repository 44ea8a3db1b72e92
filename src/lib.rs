pub use cgmath;
pub use checkpoint::Checkpoints;
pub use collision::CollisionStrategy;
pub use config::{CheckpointParams, Rewards, SensorParams, SimulationConfig, VehicleAttributes};
pub use episode::{
    run_episode, Agent, EpisodeParams, EpisodeSummary, IdleMonitor, Outcome, Transition,
};
pub use error::{ConfigError, LineError, TrackError};
pub use sensor::{Observation, RayHits, RaySource, OBSERVATION_LEN, RAY_COUNT};
pub use simulation::{Simulation, StepResult};
use slotmap::{new_key_type, SlotMap};
pub use slotmap::{Key, KeyData};
pub use surface::TrackSurface;
pub use telemetry::{Snapshot, VehicleSnapshot};
pub use track::Track;
pub use util::Interval;
pub use vehicle::{Action, ReversePolicy, Vehicle, ACTION_COUNT};

mod checkpoint;
mod collision;
mod config;
mod episode;
mod error;
pub mod math;
mod sensor;
mod simulation;
mod surface;
mod telemetry;
pub mod track;
mod util;
mod vehicle;

new_key_type! {
    /// Unique ID of a [Vehicle].
    pub struct VehicleId;
}

type VehicleSet = SlotMap<VehicleId, Vehicle>;
