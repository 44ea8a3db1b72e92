//! The ray casting sensor which produces an agent's observation.

use crate::math::{distance, LineSegment2d, Point2d};
use crate::surface::TrackSurface;
use crate::vehicle::Vehicle;
use arrayvec::ArrayVec;
#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// The number of rays in the sensor fan.
pub const RAY_COUNT: usize = 18;

/// The length of an observation: one value per ray plus the normalised velocity.
pub const OBSERVATION_LEN: usize = RAY_COUNT + 1;

/// Where a ray starts from.
#[derive(Clone, Copy, Debug)]
enum RayOrigin {
    /// The centre of the vehicle.
    Centre,
    /// One of the vehicle's hull corners.
    Corner(usize),
}

use RayOrigin::{Centre, Corner};

/// The sensor fan: angles in degrees relative to the vehicle's target heading,
/// and the point each ray is cast from.
const RAY_FAN: [(f64, RayOrigin); RAY_COUNT] = [
    (0.0, Centre),
    (-30.0, Centre),
    (30.0, Centre),
    (-45.0, Centre),
    (45.0, Centre),
    (-90.0, Centre),
    (90.0, Centre),
    (180.0, Centre),
    (10.0, Centre),
    (-10.0, Centre),
    (135.0, Centre),
    (-135.0, Centre),
    (20.0, Centre),
    (-20.0, Centre),
    (90.0, Corner(0)),
    (-90.0, Corner(1)),
    (0.0, Corner(0)),
    (0.0, Corner(1)),
];

/// The obstacles rays are cast against.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum RaySource {
    /// The track's wall segments.
    #[default]
    Walls,
    /// The rasterised track surface.
    Surface,
}

/// Everything a ray can hit.
#[derive(Clone, Copy, Debug, Default)]
pub struct Obstacles<'a> {
    /// Static wall segments.
    pub walls: &'a [LineSegment2d],
    /// A rasterised track to march rays through.
    pub surface: Option<&'a TrackSurface>,
    /// The hull edges of other vehicles.
    pub vehicles: &'a [LineSegment2d],
}

/// A normalised sensor reading.
///
/// Each ray value is `(range - d) / range`, where `d` is the distance from the
/// vehicle's centre to the nearest hit, so 0 means nothing in range and values
/// near 1 mean an obstacle is touching. The last value is `velocity / max_velocity`.
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Observation {
    values: [f64; OBSERVATION_LEN],
}

/// The nearest hit point of each ray that hit something, in ray order.
pub type RayHits = ArrayVec<Point2d, RAY_COUNT>;

impl Observation {
    /// The raw observation vector.
    pub fn values(&self) -> &[f64; OBSERVATION_LEN] {
        &self.values
    }

    /// The normalised ray readings.
    pub fn rays(&self) -> &[f64] {
        &self.values[..RAY_COUNT]
    }

    /// The normalised velocity.
    pub fn velocity(&self) -> f64 {
        self.values[RAY_COUNT]
    }
}

impl AsRef<[f64]> for Observation {
    fn as_ref(&self) -> &[f64] {
        &self.values
    }
}

/// Casts the sensor fan from `vehicle` and returns its observation,
/// along with the nearest hit points for telemetry.
pub fn cast(
    vehicle: &Vehicle,
    obstacles: &Obstacles,
    range: f64,
    source: RaySource,
) -> (Observation, RayHits) {
    let mut values = [0.0; OBSERVATION_LEN];
    let mut hits = RayHits::new();
    let hull = vehicle.hull();

    for (value, (angle, origin)) in values.iter_mut().zip(RAY_FAN) {
        let origin = match origin {
            Centre => vehicle.position(),
            Corner(idx) => hull[idx],
        };
        let heading = vehicle.target_heading() + angle.to_radians();
        let ray = LineSegment2d::from_vector(origin, Vehicle::facing(heading, range));

        let nearest = nearest_hit(&ray, obstacles, source, vehicle.position());
        let dist = match nearest {
            Some((pt, dist)) => {
                hits.push(pt);
                dist
            }
            None => range,
        };
        *value = (range - dist) / range;
    }

    values[RAY_COUNT] = vehicle.vel() / vehicle.max_vel();
    (Observation { values }, hits)
}

/// Finds the hit point nearest to `centre` along `ray`, and its distance.
/// Ties keep the earliest obstacle.
fn nearest_hit(
    ray: &LineSegment2d,
    obstacles: &Obstacles,
    source: RaySource,
    centre: Point2d,
) -> Option<(Point2d, f64)> {
    let segments: &[LineSegment2d] = match source {
        RaySource::Walls => obstacles.walls,
        RaySource::Surface => &[],
    };
    let segment_hits = segments
        .iter()
        .chain(obstacles.vehicles)
        .filter_map(|seg| seg.intersect(ray))
        .map(|pt| Point2d::new(pt.x.floor(), pt.y.floor()));
    let surface_hit = match (source, obstacles.surface) {
        (RaySource::Surface, Some(surface)) => surface.cast(ray),
        _ => None,
    };

    surface_hit
        .into_iter()
        .chain(segment_hits)
        .map(|pt| (pt, distance(centre, pt)))
        .fold(None, |best, (pt, dist)| match best {
            Some((_, best_dist)) if best_dist <= dist => best,
            _ => Some((pt, dist)),
        })
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::config::VehicleAttributes;
    use crate::VehicleId;
    use assert_approx_eq::assert_approx_eq;
    use image::{Rgb, RgbImage};
    use slotmap::KeyData;
    use std::f64::consts::PI;

    /// A vehicle at (100, 100) whose nose faces +y.
    fn vehicle() -> Vehicle {
        let id = VehicleId::from(KeyData::from_ffi(1));
        Vehicle::new(id, &VehicleAttributes::default(), Point2d::new(100.0, 100.0), PI)
    }

    fn wall(x1: f64, y1: f64, x2: f64, y2: f64) -> LineSegment2d {
        LineSegment2d::from_ends(Point2d::new(x1, y1), Point2d::new(x2, y2))
    }

    #[test]
    fn no_obstacles() {
        let (obs, hits) = cast(&vehicle(), &Obstacles::default(), 1000.0, RaySource::Walls);
        assert!(obs.rays().iter().all(|v| *v == 0.0));
        assert_eq!(obs.velocity(), 0.0);
        assert_eq!(obs.values().len(), 19);
        assert!(hits.is_empty());
    }

    #[test]
    fn wall_ahead() {
        // A wall across the vehicle's nose, 200 units away.
        let walls = [wall(-1000.0, 300.0, 1000.0, 300.0)];
        let obstacles = Obstacles {
            walls: &walls,
            ..Default::default()
        };
        let (obs, hits) = cast(&vehicle(), &obstacles, 1000.0, RaySource::Walls);
        assert_approx_eq!(obs.rays()[0], 0.8);
        // Rays at +-90 degrees run parallel to the wall and the one at 180 faces away.
        assert_eq!(obs.rays()[5], 0.0);
        assert_eq!(obs.rays()[6], 0.0);
        assert_eq!(obs.rays()[7], 0.0);
        // The two rays from the front corners hit as well.
        assert!(obs.rays()[16] > 0.79);
        assert!(obs.rays()[17] > 0.79);
        assert_eq!(hits.len(), 11);
        assert_eq!(hits[0], Point2d::new(100.0, 300.0));
    }

    #[test]
    fn nearest_wall_wins() {
        let walls = [
            wall(-1000.0, 600.0, 1000.0, 600.0),
            wall(-1000.0, 150.0, 1000.0, 150.0),
        ];
        let obstacles = Obstacles {
            walls: &walls,
            ..Default::default()
        };
        let (obs, hits) = cast(&vehicle(), &obstacles, 1000.0, RaySource::Walls);
        assert_approx_eq!(obs.rays()[0], 0.95);
        assert_eq!(hits[0], Point2d::new(100.0, 150.0));
    }

    #[test]
    fn sees_other_vehicles() {
        let edges = [wall(90.0, 140.0, 110.0, 140.0)];
        let obstacles = Obstacles {
            vehicles: &edges,
            ..Default::default()
        };
        let (obs, _) = cast(&vehicle(), &obstacles, 1000.0, RaySource::Walls);
        assert_approx_eq!(obs.rays()[0], 0.96);
    }

    #[test]
    fn marches_surface() {
        let image = RgbImage::from_fn(400, 400, |_, y| {
            if y >= 250 {
                Rgb([255, 255, 255])
            } else {
                Rgb([0, 0, 0])
            }
        });
        let surface = TrackSurface::from_rgb(&image);
        let obstacles = Obstacles {
            surface: Some(&surface),
            ..Default::default()
        };
        let (obs, hits) = cast(&vehicle(), &obstacles, 1000.0, RaySource::Surface);
        assert_eq!(hits[0], Point2d::new(100.0, 250.0));
        assert_approx_eq!(obs.rays()[0], 0.85);
        // Wall segments are ignored when marching the surface.
        let walls = [wall(-1000.0, 120.0, 1000.0, 120.0)];
        let obstacles = Obstacles {
            walls: &walls,
            surface: Some(&surface),
            ..Default::default()
        };
        let (obs, _) = cast(&vehicle(), &obstacles, 1000.0, RaySource::Surface);
        assert_approx_eq!(obs.rays()[0], 0.85);
    }

    #[test]
    fn velocity_is_normalised() {
        let mut veh = vehicle();
        veh.apply(crate::vehicle::Action::from_id(4));
        let (obs, _) = cast(&veh, &Obstacles::default(), 1000.0, RaySource::Walls);
        assert_approx_eq!(obs.velocity(), -1.0 / 3.0);
    }
}
