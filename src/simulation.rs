use crate::checkpoint::Checkpoints;
use crate::collision::CollisionStrategy;
use crate::config::SimulationConfig;
use crate::error::ConfigError;
use crate::math::{LineSegment2d, Point2d};
use crate::sensor::{self, Observation, Obstacles, RayHits, RaySource};
use crate::telemetry::{Snapshot, VehicleSnapshot};
use crate::track::Track;
use crate::vehicle::{Action, Vehicle};
use crate::{VehicleId, VehicleSet};

/// A racing simulation.
pub struct Simulation {
    /// The simulation parameters.
    config: SimulationConfig,
    /// The track being raced on.
    track: Track,
    /// The vehicles being simulated.
    vehicles: VehicleSet,
    /// The vehicle IDs in index order.
    order: Vec<VehicleId>,
    /// The checkpoint ring, shared by all vehicles.
    checkpoints: Checkpoints,
    /// The nearest ray hits of each vehicle from the previous tick, for telemetry only.
    ray_hits: Vec<RayHits>,
    /// The current frame of simulation.
    frame: usize,
}

/// The outcome of a single simulation step, indexed by vehicle.
#[derive(Clone, Debug, PartialEq)]
pub struct StepResult {
    /// The new observation of each vehicle, or `None` once it is done.
    pub observations: Vec<Option<Observation>>,
    /// The reward earned by each vehicle this tick.
    pub rewards: Vec<f64>,
    /// Whether each vehicle is done.
    pub dones: Vec<bool>,
}

impl StepResult {
    fn new(count: usize) -> Self {
        Self {
            observations: vec![None; count],
            rewards: vec![0.0; count],
            dones: vec![false; count],
        }
    }
}

impl Simulation {
    /// Creates a new simulation and places its vehicles at their starting positions.
    /// Fails if the configuration is invalid, or relies on a track surface the track lacks.
    pub fn new(config: SimulationConfig, track: Track) -> Result<Self, ConfigError> {
        config.validate()?;
        if track.surface().is_none() {
            if config.collision == CollisionStrategy::Surface {
                return Err(ConfigError::MissingSurface("collision"));
            }
            if config.sensor.source == RaySource::Surface {
                return Err(ConfigError::MissingSurface("sensor.source"));
            }
        }
        let mut vehicles = VehicleSet::with_key();
        let order = (0..config.num_vehicles)
            .map(|idx| {
                vehicles.insert_with_key(|id| {
                    Vehicle::new(
                        id,
                        &config.vehicle,
                        config.start_position(idx),
                        config.start_heading,
                    )
                })
            })
            .collect();
        Ok(Self {
            checkpoints: Checkpoints::new(track.gates().len()),
            ray_hits: vec![RayHits::new(); config.num_vehicles],
            config,
            track,
            vehicles,
            order,
            frame: 0,
        })
    }

    /// Returns every vehicle to its starting position at rest,
    /// and restores the checkpoint ring to its initial state.
    pub fn reset(&mut self) {
        for (idx, id) in self.order.iter().enumerate() {
            let vehicle = &mut self.vehicles[*id];
            vehicle.set_pose(self.config.start_position(idx), self.config.start_heading);
            vehicle.reset();
        }
        self.checkpoints.reset();
        self.ray_hits.iter_mut().for_each(RayHits::clear);
        self.frame = 0;
    }

    /// Advances the simulation by one tick, applying one action to each vehicle in index order.
    /// Missing or unknown actions do nothing, and vehicles that are already done are skipped.
    pub fn step(&mut self, actions: &[usize]) -> StepResult {
        let mut result = StepResult::new(self.order.len());

        self.move_vehicles(actions, &mut result);
        self.cross_gates(&mut result);
        self.sense(&mut result);

        self.frame += 1;
        log::trace!("frame {}: rewards {:?}", self.frame, result.rewards);
        result
    }

    /// Casts the sensor fan from a vehicle without advancing the simulation.
    /// Returns `None` if the vehicle is done.
    ///
    /// # Panics
    /// Panics if `idx` is not less than [Simulation::num_vehicles].
    pub fn observe(&self, idx: usize) -> Option<Observation> {
        let vehicle = self.vehicle(idx);
        vehicle.is_active().then(|| self.cast(vehicle).0)
    }

    /// Gets the current simulation frame index.
    pub fn frame(&self) -> usize {
        self.frame
    }

    /// Gets the simulation parameters.
    pub fn config(&self) -> &SimulationConfig {
        &self.config
    }

    /// Gets the track.
    pub fn track(&self) -> &Track {
        &self.track
    }

    /// Gets the checkpoint ring.
    pub fn checkpoints(&self) -> &Checkpoints {
        &self.checkpoints
    }

    /// The number of vehicles being simulated.
    pub fn num_vehicles(&self) -> usize {
        self.order.len()
    }

    /// Gets a reference to the vehicle at the given index.
    ///
    /// # Panics
    /// Panics if `idx` is not less than [Simulation::num_vehicles].
    pub fn vehicle(&self, idx: usize) -> &Vehicle {
        &self.vehicles[self.order[idx]]
    }

    /// Returns an iterator over all the vehicles in index order.
    pub fn iter_vehicles(&self) -> impl Iterator<Item = &Vehicle> {
        self.order.iter().map(|id| &self.vehicles[*id])
    }

    /// Moves a vehicle to the given pose without integrating it.
    ///
    /// # Panics
    /// Panics if `idx` is not less than [Simulation::num_vehicles].
    pub fn set_vehicle_pose(&mut self, idx: usize, pos: Point2d, heading: f64) {
        self.vehicles[self.order[idx]].set_pose(pos, heading);
    }

    /// Stops a vehicle and removes it from the rest of the episode, without penalty.
    ///
    /// # Panics
    /// Panics if `idx` is not less than [Simulation::num_vehicles].
    pub fn retire_vehicle(&mut self, idx: usize) {
        self.vehicles[self.order[idx]].halt();
    }

    /// Takes a read-only snapshot of the state of the simulation for rendering.
    pub fn snapshot(&self) -> Snapshot {
        let vehicles = self
            .iter_vehicles()
            .zip(&self.ray_hits)
            .map(|(vehicle, hits)| VehicleSnapshot {
                id: vehicle.id(),
                position: vehicle.position(),
                heading: vehicle.heading(),
                hull: vehicle.hull(),
                ray_hits: hits.clone(),
                score: vehicle.score(),
                vel: vehicle.vel(),
                active: vehicle.is_active(),
            })
            .collect();
        Snapshot {
            frame: self.frame,
            vehicles,
            active_gate: self.checkpoints.active(),
        }
    }

    /// Applies actions, integrates the active vehicles and checks them for collisions.
    /// Every vehicle active at the start of the tick is an obstacle for the whole tick,
    /// including those that crash before the others are tested.
    fn move_vehicles(&mut self, actions: &[usize], result: &mut StepResult) {
        let rewards = &self.config.rewards;
        let racing = self
            .order
            .iter()
            .copied()
            .filter(|id| self.vehicles[*id].is_active())
            .collect::<Vec<_>>();

        for (idx, id) in self.order.iter().enumerate() {
            if !self.vehicles[*id].is_active() {
                result.dones[idx] = true;
                continue;
            }
            result.rewards[idx] = rewards.survival;

            let action = Action::from_id(actions.get(idx).copied().unwrap_or(0));
            let vehicle = &mut self.vehicles[*id];
            vehicle.apply(action);
            vehicle.update();

            let vehicle = &self.vehicles[*id];
            let others = racing
                .iter()
                .filter(|other| **other != *id)
                .map(|other| &self.vehicles[*other]);
            if self.config.collision.collides(vehicle, &self.track, others) {
                log::debug!("vehicle {idx} crashed at {:?}", vehicle.position());
                self.vehicles[*id].halt();
                result.rewards[idx] += rewards.crash;
                result.dones[idx] = true;
            }
        }
    }

    /// Scores the active vehicles against the checkpoint ring.
    fn cross_gates(&mut self, result: &mut StepResult) {
        let goal = self.config.rewards.goal;

        for (idx, id) in self.order.iter().enumerate() {
            let vehicle = &self.vehicles[*id];
            if !vehicle.is_active() {
                continue;
            }
            let crossed = self.checkpoints.try_cross(
                self.track.gates(),
                vehicle,
                &self.config.checkpoint,
            );
            if crossed {
                self.vehicles[*id].add_score(goal);
                result.rewards[idx] += goal;
            }
        }
    }

    /// Produces the observations of the active vehicles.
    fn sense(&mut self, result: &mut StepResult) {
        for (idx, id) in self.order.iter().enumerate() {
            let vehicle = &self.vehicles[*id];
            if !vehicle.is_active() {
                self.ray_hits[idx].clear();
                continue;
            }
            let (observation, hits) = self.cast(vehicle);
            result.observations[idx] = Some(observation);
            self.ray_hits[idx] = hits;
        }
    }

    /// Casts the sensor fan from `vehicle` against the track and the other active vehicles.
    fn cast(&self, vehicle: &Vehicle) -> (Observation, RayHits) {
        let vehicle_edges = self
            .iter_vehicles()
            .filter(|other| other.is_active() && other.id() != vehicle.id())
            .flat_map(|other| other.hull_edges())
            .collect::<Vec<LineSegment2d>>();
        let obstacles = Obstacles {
            walls: self.track.walls(),
            surface: self.track.surface(),
            vehicles: &vehicle_edges,
        };
        let sensor = &self.config.sensor;
        sensor::cast(vehicle, &obstacles, sensor.range, sensor.source)
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::surface::TrackSurface;
    use assert_approx_eq::assert_approx_eq;
    use image::RgbImage;
    use std::f64::consts::PI;

    fn config(num_vehicles: usize) -> SimulationConfig {
        SimulationConfig {
            num_vehicles,
            start: Point2d::new(100.0, 100.0),
            ..Default::default()
        }
    }

    #[test]
    fn vehicles_start_in_order() {
        let sim = Simulation::new(config(3), Track::new()).unwrap();
        assert_eq!(sim.num_vehicles(), 3);
        assert_eq!(sim.vehicle(0).position(), Point2d::new(100.0, 100.0));
        assert_eq!(sim.vehicle(2).position(), Point2d::new(140.0, 140.0));
        assert!(sim.iter_vehicles().all(|v| v.is_active() && v.heading() == PI));
    }

    #[test]
    fn rejects_invalid_config() {
        assert!(Simulation::new(config(0), Track::new()).is_err());
    }

    #[test]
    fn survival_reward_every_tick() {
        let mut sim = Simulation::new(config(2), Track::new()).unwrap();
        let result = sim.step(&[0, 0]);
        assert_eq!(result.rewards, vec![1.0, 1.0]);
        assert_eq!(result.dones, vec![false, false]);
        assert!(result.observations.iter().all(Option::is_some));
        assert_eq!(sim.frame(), 1);
    }

    #[test]
    fn missing_actions_do_nothing() {
        let mut sim = Simulation::new(config(2), Track::new()).unwrap();
        sim.step(&[1]);
        assert_eq!(sim.vehicle(0).vel(), 5.0);
        assert_eq!(sim.vehicle(1).vel(), 0.0);
        sim.step(&[42, 99]);
        assert_eq!(sim.vehicle(0).vel(), 5.0);
    }

    #[test]
    fn crashed_vehicles_stay_done() {
        let mut track = Track::new();
        track.add_wall(LineSegment2d::from_ends(
            Point2d::new(100.0, 0.0),
            Point2d::new(100.0, 200.0),
        ));
        let mut sim = Simulation::new(config(1), track).unwrap();

        let result = sim.step(&[0]);
        assert_eq!(result.dones, vec![true]);
        assert_eq!(result.observations, vec![None]);
        assert_eq!(result.rewards, vec![1.0 - 10.0]);

        let result = sim.step(&[1]);
        assert_eq!(result.dones, vec![true]);
        assert_eq!(result.observations, vec![None]);
        assert_eq!(result.rewards, vec![0.0]);
        assert_eq!(sim.vehicle(0).vel(), 0.0);
        assert_eq!(sim.vehicle(0).position(), Point2d::new(100.0, 100.0));
        assert_eq!(sim.observe(0), None);
    }

    /// A track with a 200x200 surface and no walls.
    fn open_surface() -> Track {
        let mut track = Track::new();
        track.set_surface(TrackSurface::from_rgb(&RgbImage::new(200, 200)));
        track
    }

    #[test]
    fn vehicles_collide_with_each_other() {
        let config = SimulationConfig {
            start_spacing: crate::math::Vector2d::new(4.0, 4.0),
            collision: CollisionStrategy::Surface,
            ..config(2)
        };
        let mut sim = Simulation::new(config, open_surface()).unwrap();
        let result = sim.step(&[0, 0]);
        // The second vehicle still collides with the first, which crashed earlier in the tick.
        assert_eq!(result.dones, vec![true, true]);
        assert_eq!(result.rewards, vec![1.0 - 10.0, 1.0 - 10.0]);
        assert_eq!(result.observations, vec![None, None]);

        let result = sim.step(&[0, 0]);
        assert_eq!(result.dones, vec![true, true]);
        assert_eq!(result.rewards, vec![0.0, 0.0]);
    }

    #[test]
    fn surface_strategies_need_a_surface() {
        let collision = SimulationConfig {
            collision: CollisionStrategy::Surface,
            ..config(1)
        };
        let err = Simulation::new(collision.clone(), Track::new()).err();
        assert!(matches!(err, Some(ConfigError::MissingSurface("collision"))));
        assert!(Simulation::new(collision, open_surface()).is_ok());

        let mut sensing = config(1);
        sensing.sensor.source = RaySource::Surface;
        let err = Simulation::new(sensing.clone(), Track::new()).err();
        assert!(matches!(err, Some(ConfigError::MissingSurface("sensor.source"))));
        assert!(Simulation::new(sensing, open_surface()).is_ok());
    }

    #[test]
    fn other_vehicles_are_sensed() {
        let config = SimulationConfig {
            start_spacing: crate::math::Vector2d::new(0.0, 100.0),
            ..config(2)
        };
        let sim = Simulation::new(config, Track::new()).unwrap();
        // Vehicle 1 sits 100 units ahead of vehicle 0's nose; its near edge is 7.5 closer.
        let obs = sim.observe(0).unwrap();
        assert_approx_eq!(obs.rays()[0], (1000.0 - 92.0) / 1000.0, 1e-4);
        // Vehicle 0 is behind vehicle 1.
        let obs = sim.observe(1).unwrap();
        assert_eq!(obs.rays()[0], 0.0);
        assert!(obs.rays()[7] > 0.9);
    }

    #[test]
    #[should_panic]
    fn vehicle_index_out_of_range() {
        let sim = Simulation::new(config(2), Track::new()).unwrap();
        sim.vehicle(2);
    }

    #[test]
    fn retired_vehicles_are_skipped() {
        let mut sim = Simulation::new(config(2), Track::new()).unwrap();
        sim.retire_vehicle(1);
        let result = sim.step(&[1, 1]);
        assert_eq!(result.dones, vec![false, true]);
        assert_eq!(result.rewards, vec![1.0, 0.0]);
        assert_eq!(sim.vehicle(1).position(), Point2d::new(120.0, 120.0));
    }

    #[test]
    fn snapshot_reflects_last_tick() {
        let mut track = Track::new();
        track.add_wall(LineSegment2d::from_ends(
            Point2d::new(0.0, 300.0),
            Point2d::new(300.0, 300.0),
        ));
        let mut sim = Simulation::new(config(1), track).unwrap();
        assert!(sim.snapshot().vehicles[0].ray_hits.is_empty());
        sim.step(&[1]);
        let snapshot = sim.snapshot();
        assert_eq!(snapshot.frame, 1);
        assert_eq!(snapshot.active_gate, None);
        let vehicle = &snapshot.vehicles[0];
        assert!(vehicle.active);
        assert_eq!(vehicle.vel, 5.0);
        assert_eq!(vehicle.hull, sim.vehicle(0).hull());
        assert!(!vehicle.ray_hits.is_empty());
    }
}
