use crate::world::entity::Direction;
use serde::{Deserialize, Serialize};

/// Controls applied to the hunter for one tick.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Action {
    pub up: bool,
    pub down: bool,
    pub left: bool,
    pub right: bool,
    /// Edge-triggered: flips `Hunter::moving` every tick it is set.
    pub toggle_moving: bool,
    pub fire: bool,
}

impl Action {
    pub const IDLE: Action = Action {
        up: false,
        down: false,
        left: false,
        right: false,
        toggle_moving: false,
        fire: false,
    };

    /// Number of network outputs consumed by [`Action::from_outputs`].
    pub const BITS: usize = 6;

    /// Decodes network outputs in the order up, down, left, right, toggle, fire.
    /// Missing components read as false.
    pub fn from_outputs(outputs: &[f64]) -> Self {
        let bit = |k: usize| outputs.get(k).is_some_and(|&v| v > 0.0);
        Self {
            up: bit(0),
            down: bit(1),
            left: bit(2),
            right: bit(3),
            toggle_moving: bit(4),
            fire: bit(5),
        }
    }

    /// Heading requested by the movement bits, if any. Diagonals take precedence.
    pub fn direction(&self) -> Option<Direction> {
        if self.up && self.right {
            Some(Direction::UpRight)
        } else if self.down && self.right {
            Some(Direction::DownRight)
        } else if self.down && self.left {
            Some(Direction::DownLeft)
        } else if self.up && self.left {
            Some(Direction::UpLeft)
        } else if self.up {
            Some(Direction::Up)
        } else if self.right {
            Some(Direction::Right)
        } else if self.down {
            Some(Direction::Down)
        } else if self.left {
            Some(Direction::Left)
        } else {
            None
        }
    }
}
