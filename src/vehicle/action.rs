#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// The number of discrete actions an agent can choose from.
pub const ACTION_COUNT: usize = 9;

/// The effect of a discrete action on a vehicle.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Action {
    /// Steering direction: -1 turns left, 1 turns right.
    pub turn: i8,
    /// Throttle direction: 1 accelerates forward, -1 accelerates backward.
    pub throttle: i8,
}

/// How reverse throttle behaves while the vehicle is moving forward.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum ReversePolicy {
    /// Reverse throttle subtracts the full acceleration, passing through zero freely.
    #[default]
    Symmetric,
    /// Reverse throttle brakes a forward-moving vehicle no further than a standstill;
    /// it only starts reversing once it has come to rest.
    NoReverseFromMotion,
}

const fn action(turn: i8, throttle: i8) -> Action {
    Action { turn, throttle }
}

/// Maps action ids to their effects.
const ACTIONS: [Action; ACTION_COUNT] = [
    action(0, 0),   // nothing
    action(0, 1),   // forward
    action(-1, 0),  // left
    action(1, 0),   // right
    action(0, -1),  // backward
    action(1, -1),  // backward, right
    action(-1, -1), // backward, left
    action(-1, 1),  // forward, left
    action(1, 1),   // forward, right
];

impl Action {
    /// An action with no effect.
    pub const NONE: Action = action(0, 0);

    /// Looks up an action by id. Unknown ids have no effect.
    pub fn from_id(id: usize) -> Self {
        ACTIONS.get(id).copied().unwrap_or(Self::NONE)
    }
}

impl ReversePolicy {
    /// Applies a change in velocity, then clamps the result with `clamp`.
    pub fn accelerate(self, vel: f64, delta: f64, clamp: impl Fn(f64) -> f64) -> f64 {
        let next = clamp(vel + delta);
        match self {
            ReversePolicy::NoReverseFromMotion if delta < 0.0 && vel > 0.0 => f64::max(next, 0.0),
            _ => next,
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn table_is_exhaustive() {
        let turns = (0..ACTION_COUNT)
            .map(|id| Action::from_id(id))
            .filter(|a| a.turn != 0)
            .count();
        let throttles = (0..ACTION_COUNT)
            .map(|id| Action::from_id(id))
            .filter(|a| a.throttle != 0)
            .count();
        assert_eq!(turns, 6);
        assert_eq!(throttles, 6);
        assert_eq!(Action::from_id(7), Action { turn: -1, throttle: 1 });
        assert_eq!(Action::from_id(5), Action { turn: 1, throttle: -1 });
    }

    #[test]
    fn unknown_ids_do_nothing() {
        assert_eq!(Action::from_id(9), Action::NONE);
        assert_eq!(Action::from_id(usize::MAX), Action::NONE);
    }

    #[test]
    fn reverse_policies() {
        let clamp = |v: f64| v.clamp(-15.0, 15.0);
        assert_eq!(ReversePolicy::Symmetric.accelerate(3.0, -5.0, clamp), -2.0);
        assert_eq!(ReversePolicy::NoReverseFromMotion.accelerate(3.0, -5.0, clamp), 0.0);
        assert_eq!(ReversePolicy::NoReverseFromMotion.accelerate(0.0, -5.0, clamp), -5.0);
        assert_eq!(ReversePolicy::NoReverseFromMotion.accelerate(-14.0, -5.0, clamp), -15.0);
        assert_eq!(ReversePolicy::NoReverseFromMotion.accelerate(-5.0, 5.0, clamp), 0.0);
    }
}
