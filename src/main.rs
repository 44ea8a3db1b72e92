use std::f64::consts::TAU;
use std::time::Instant;

use racing_sim::math::{LineSegment2d, Point2d, Vector2d};
use racing_sim::{
    run_episode, ConfigError, EpisodeParams, Observation, Simulation, SimulationConfig, Track,
    ACTION_COUNT,
};
use rand::Rng;

const NUM_VEHICLES: usize = 5;
const NUM_EPISODES: u32 = 20;

/// A point on an ellipse centred on (400, 300).
fn ellipse(rx: f64, ry: f64, angle: f64) -> Point2d {
    Point2d::new(400.0 + rx * angle.cos(), 300.0 + ry * angle.sin())
}

/// An oval circuit 100 units wide with 16 gates.
fn oval_track() -> Track {
    let angles = |n: usize| (0..n).map(move |i| TAU * i as f64 / n as f64);
    let mut track = Track::new();
    track.add_boundary(&angles(64).map(|a| ellipse(250.0, 150.0, a)).collect::<Vec<_>>());
    track.add_boundary(&angles(64).map(|a| ellipse(350.0, 250.0, a)).collect::<Vec<_>>());
    for a in angles(16) {
        track.add_gate(LineSegment2d::from_ends(
            ellipse(250.0, 150.0, a),
            ellipse(350.0, 250.0, a),
        ));
    }
    track
}

fn main() -> Result<(), ConfigError> {
    let config = SimulationConfig {
        num_vehicles: NUM_VEHICLES,
        start: Point2d::new(700.0, 300.0),
        start_spacing: Vector2d::new(0.0, 25.0),
        ..Default::default()
    };
    let mut sim = Simulation::new(config, oval_track())?;

    let mut rng = rand::thread_rng();
    let mut agent = |_: usize, _: &Observation| -> usize { rng.gen_range(0..ACTION_COUNT) };

    println!("Simulating...");
    for episode in 0..NUM_EPISODES {
        let start = Instant::now();
        let summary = run_episode(&mut sim, &mut agent, &EpisodeParams::default());
        let tick = start.elapsed() / summary.ticks.max(1) as u32;
        let best = summary.scores.iter().copied().fold(f64::MIN, f64::max);
        println!(
            "Episode {}: {} ticks, avg. tick {:?} ({:.0} vehs), best score {:.0}",
            episode,
            summary.ticks,
            tick,
            sim.num_vehicles(),
            best,
        );
    }
    Ok(())
}
