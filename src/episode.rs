//! Drives whole episodes against an agent.

use crate::sensor::Observation;
use crate::simulation::Simulation;
#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Chooses actions for vehicles from their observations.
pub trait Agent {
    /// Chooses an action ID for the vehicle at `vehicle`.
    fn act(&mut self, vehicle: usize, observation: &Observation) -> usize;

    /// Called with the outcome of each action the agent chose.
    fn record(&mut self, _transition: &Transition) {}
}

impl<F: FnMut(usize, &Observation) -> usize> Agent for F {
    fn act(&mut self, vehicle: usize, observation: &Observation) -> usize {
        self(vehicle, observation)
    }
}

/// A single step taken by a single vehicle.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Transition {
    /// The index of the vehicle.
    pub vehicle: usize,
    /// The observation the action was chosen from.
    pub observation: Observation,
    /// The action ID chosen.
    pub action: usize,
    /// The reward earned, including any idle penalty.
    pub reward: f64,
    /// The observation after the step, or `None` if the vehicle is done.
    pub next: Option<Observation>,
    /// Whether the vehicle is done.
    pub done: bool,
}

/// The parameters of an episode.
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize), serde(default))]
pub struct EpisodeParams {
    /// The maximum number of ticks to simulate.
    pub max_ticks: usize,
    /// The number of consecutive zero rewards after which a vehicle is terminated.
    pub idle_limit: usize,
    /// Subtracted from the score of a vehicle terminated for idling.
    pub idle_penalty: f64,
}

impl Default for EpisodeParams {
    fn default() -> Self {
        Self {
            max_ticks: 1000,
            idle_limit: 100,
            idle_penalty: 100.0,
        }
    }
}

/// Tracks how long each vehicle has gone without earning or losing anything.
#[derive(Clone, Debug)]
pub struct IdleMonitor {
    limit: usize,
    counts: Vec<usize>,
}

impl IdleMonitor {
    /// Creates a monitor for `count` vehicles.
    pub fn new(count: usize, limit: usize) -> Self {
        Self {
            limit,
            counts: vec![0; count],
        }
    }

    /// Records a vehicle's reward for the tick, and returns whether it is now idle.
    ///
    /// # Panics
    /// Panics if `vehicle` is not less than the count the monitor was created with.
    pub fn observe(&mut self, vehicle: usize, reward: f64) -> bool {
        let count = &mut self.counts[vehicle];
        if reward == 0.0 {
            *count += 1;
        } else {
            *count = 0;
        }
        *count > self.limit
    }

    /// Clears every count.
    pub fn reset(&mut self) {
        self.counts.iter_mut().for_each(|count| *count = 0);
    }
}

/// Why a vehicle's episode ended.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum Outcome {
    /// The vehicle collided.
    Crashed,
    /// The vehicle went too long without a reward.
    Idle,
    /// The vehicle was still running when the episode ran out of ticks.
    TimeLimit,
}

/// The result of an episode.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct EpisodeSummary {
    /// The summed rewards of each vehicle.
    pub scores: Vec<f64>,
    /// The number of ticks simulated.
    pub ticks: usize,
    /// How each vehicle's episode ended.
    pub outcomes: Vec<Outcome>,
}

/// Resets the simulation and runs one episode.
///
/// # Parameters
/// * `sim` - The simulation to run
/// * `agent` - Chooses the actions of every active vehicle
/// * `params` - The episode limits
pub fn run_episode(
    sim: &mut Simulation,
    agent: &mut impl Agent,
    params: &EpisodeParams,
) -> EpisodeSummary {
    sim.reset();
    let count = sim.num_vehicles();
    let mut observations = (0..count).map(|idx| sim.observe(idx)).collect::<Vec<_>>();
    let mut idle = IdleMonitor::new(count, params.idle_limit);
    let mut scores = vec![0.0; count];
    let mut outcomes: Vec<Option<Outcome>> = vec![None; count];
    let mut ticks = 0;

    while ticks < params.max_ticks && outcomes.iter().any(Option::is_none) {
        let actions = observations
            .iter()
            .enumerate()
            .map(|(idx, obs)| obs.as_ref().map_or(0, |obs| agent.act(idx, obs)))
            .collect::<Vec<_>>();
        let result = sim.step(&actions);
        let mut next = result.observations;
        ticks += 1;

        for idx in 0..count {
            if outcomes[idx].is_some() {
                continue;
            }
            let mut reward = result.rewards[idx];
            let mut done = result.dones[idx];
            if done {
                outcomes[idx] = Some(Outcome::Crashed);
            } else if idle.observe(idx, reward) {
                log::debug!("vehicle {idx} idle after {ticks} ticks");
                sim.retire_vehicle(idx);
                reward -= params.idle_penalty;
                next[idx] = None;
                outcomes[idx] = Some(Outcome::Idle);
                done = true;
            }
            scores[idx] += reward;

            if let Some(observation) = observations[idx] {
                agent.record(&Transition {
                    vehicle: idx,
                    observation,
                    action: actions[idx],
                    reward,
                    next: next[idx],
                    done,
                });
            }
        }
        observations = next;
    }

    log::info!("episode finished after {ticks} ticks with scores {scores:?}");
    EpisodeSummary {
        scores,
        ticks,
        outcomes: outcomes
            .into_iter()
            .map(|outcome| outcome.unwrap_or(Outcome::TimeLimit))
            .collect(),
    }
}
