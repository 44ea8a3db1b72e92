pub use self::action::{Action, ReversePolicy, ACTION_COUNT};
use crate::config::VehicleAttributes;
use crate::math::{rotate_rect, rotate_vector, LineSegment2d, Point2d, Vector2d};
use crate::util::Interval;
use crate::VehicleId;

mod action;

/// A simulated vehicle.
///
/// In its local frame the vehicle's nose points along -y: the sensor rays and the
/// gate probe are cast that way, and the first two hull corners sit on that edge.
/// Positive velocity moves the vehicle along local +y.
#[derive(Clone, Debug, PartialEq)]
pub struct Vehicle {
    /// The vehicle's ID
    pub(crate) id: VehicleId,
    /// Half the vehicle's width.
    half_wid: f64,
    /// Half the vehicle's length.
    half_len: f64,
    /// The velocity limits.
    vel_range: Interval<f64>,
    /// The change in velocity applied by a throttle input.
    acc: f64,
    /// The change in heading applied by a steering input, in radians.
    turn_rate: f64,
    /// How reverse throttle is applied.
    reverse: ReversePolicy,
    /// The heading restored by [Vehicle::reset], in radians.
    start_heading: f64,
    /// The world space coordinates of the centre of the vehicle.
    pos: Point2d,
    /// The heading used for the last integration, in radians.
    heading: f64,
    /// The heading steering inputs are applied to, committed on the next update.
    target_heading: f64,
    /// The signed velocity in units per tick.
    vel: f64,
    /// The accumulated checkpoint score.
    score: f64,
    /// The corners of the vehicle's footprint.
    hull: [Point2d; 4],
    /// Whether the vehicle is still taking part in the episode.
    active: bool,
}

impl Vehicle {
    /// Creates a new vehicle at rest.
    pub(crate) fn new(
        id: VehicleId,
        attributes: &VehicleAttributes,
        pos: Point2d,
        heading: f64,
    ) -> Self {
        let mut vehicle = Self {
            id,
            half_wid: 0.5 * attributes.width,
            half_len: 0.5 * attributes.length,
            vel_range: Interval::disc(0.0, attributes.max_velocity),
            acc: attributes.acceleration,
            turn_rate: attributes.turn_rate,
            reverse: attributes.reverse,
            start_heading: heading,
            pos,
            heading,
            target_heading: heading,
            vel: 0.0,
            score: 0.0,
            hull: [pos; 4],
            active: true,
        };
        vehicle.update_hull();
        vehicle
    }

    /// Gets the vehicle's ID.
    pub fn id(&self) -> VehicleId {
        self.id
    }

    /// The vehicle's width.
    pub fn width(&self) -> f64 {
        2.0 * self.half_wid
    }

    /// The vehicle's length.
    pub fn length(&self) -> f64 {
        2.0 * self.half_len
    }

    /// The coordinates in world space of the centre of the vehicle.
    pub fn position(&self) -> Point2d {
        self.pos
    }

    /// The heading used for the most recent integration, in radians.
    pub fn heading(&self) -> f64 {
        self.heading
    }

    /// The heading steering is applied to, in radians.
    pub fn target_heading(&self) -> f64 {
        self.target_heading
    }

    /// The vehicle's signed velocity in units per tick.
    pub fn vel(&self) -> f64 {
        self.vel
    }

    /// The maximum speed of the vehicle.
    pub fn max_vel(&self) -> f64 {
        self.vel_range.max
    }

    /// The accumulated checkpoint score.
    pub fn score(&self) -> f64 {
        self.score
    }

    /// Whether the vehicle is still taking part in the episode.
    pub fn is_active(&self) -> bool {
        self.active
    }

    /// The four corners of the vehicle's footprint in world space.
    pub fn hull(&self) -> [Point2d; 4] {
        self.hull
    }

    /// The four edges of the vehicle's footprint.
    pub fn hull_edges(&self) -> [LineSegment2d; 4] {
        let [p1, p2, p3, p4] = self.hull;
        [
            LineSegment2d::from_ends(p1, p2),
            LineSegment2d::from_ends(p2, p3),
            LineSegment2d::from_ends(p3, p4),
            LineSegment2d::from_ends(p4, p1),
        ]
    }

    /// A vector of the given length pointing out of the nose of a vehicle with the given heading.
    pub(crate) fn facing(heading: f64, length: f64) -> Vector2d {
        rotate_vector(Vector2d::new(0.0, -length), heading)
    }

    /// A segment cast from the vehicle's centre out of its nose, used to detect gate crossings.
    pub(crate) fn probe(&self, length: f64) -> LineSegment2d {
        LineSegment2d::from_vector(self.pos, Self::facing(self.heading, length))
    }

    /// Applies a discrete action to the vehicle's velocity and target heading.
    pub(crate) fn apply(&mut self, action: Action) {
        if action.throttle != 0 {
            self.accelerate(f64::from(action.throttle) * self.acc);
        }
        if action.turn != 0 {
            self.turn(action.turn);
        }
    }

    /// Changes the velocity by `delta`, keeping it within the velocity limits.
    fn accelerate(&mut self, delta: f64) {
        let range = self.vel_range;
        self.vel = self
            .reverse
            .accelerate(self.vel, delta, |vel| range.clamp(vel));
    }

    /// Steers the target heading; -1 is left and 1 is right.
    fn turn(&mut self, direction: i8) {
        self.target_heading += f64::from(direction) * self.turn_rate;
    }

    /// Commits the target heading and integrates the vehicle's position by one tick.
    pub(crate) fn update(&mut self) {
        self.heading = self.target_heading;
        self.pos += rotate_vector(Vector2d::new(0.0, self.vel), self.heading);
        self.update_hull();
    }

    /// Brings the vehicle to a halt and removes it from the episode.
    pub(crate) fn halt(&mut self) {
        self.vel = 0.0;
        self.active = false;
    }

    /// Adds to the vehicle's checkpoint score.
    pub(crate) fn add_score(&mut self, amount: f64) {
        self.score += amount;
    }

    /// Stops the vehicle, restores its starting heading and clears its score.
    /// The vehicle keeps its current position.
    pub(crate) fn reset(&mut self) {
        self.vel = 0.0;
        self.heading = self.start_heading;
        self.target_heading = self.start_heading;
        self.score = 0.0;
        self.active = true;
        self.update_hull();
    }

    /// Moves the vehicle to a new pose without integrating.
    pub(crate) fn set_pose(&mut self, pos: Point2d, heading: f64) {
        self.pos = pos;
        self.heading = heading;
        self.target_heading = heading;
        self.update_hull();
    }

    /// Recomputes the hull corners from the position and target heading.
    fn update_hull(&mut self) {
        let (x, y) = (self.pos.x, self.pos.y);
        let (hw, hl) = (self.half_wid, self.half_len);
        self.hull = rotate_rect(
            [
                Point2d::new(x - hw, y - hl),
                Point2d::new(x + hw, y - hl),
                Point2d::new(x + hw, y + hl),
                Point2d::new(x - hw, y + hl),
            ],
            self.target_heading,
        );
    }
}
