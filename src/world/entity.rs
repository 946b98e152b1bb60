use super::rect::Rect;
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::f64::consts::SQRT_2;

/// Eight-way compass heading. Discriminants are the codes fed to the brain.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Direction {
    Up = 0,
    UpRight = 1,
    Right = 2,
    DownRight = 3,
    Down = 4,
    DownLeft = 5,
    Left = 6,
    UpLeft = 7,
}

impl Direction {
    pub const ALL: [Direction; 8] = [
        Direction::Up,
        Direction::UpRight,
        Direction::Right,
        Direction::DownRight,
        Direction::Down,
        Direction::DownLeft,
        Direction::Left,
        Direction::UpLeft,
    ];

    pub fn code(self) -> u8 {
        self as u8
    }

    pub fn from_code(code: u8) -> Option<Self> {
        Self::ALL.get(code as usize).copied()
    }

    pub fn random<R: Rng + ?Sized>(rng: &mut R) -> Self {
        Self::ALL[rng.gen_range(0..Self::ALL.len())]
    }

    /// Displacement for one tick at `speed`; diagonals travel `speed / √2` per axis.
    pub fn step(self, speed: f64) -> (f64, f64) {
        let d = speed / SQRT_2;
        match self {
            Direction::Up => (0.0, -speed),
            Direction::UpRight => (d, -d),
            Direction::Right => (speed, 0.0),
            Direction::DownRight => (d, d),
            Direction::Down => (0.0, speed),
            Direction::DownLeft => (-d, d),
            Direction::Left => (-speed, 0.0),
            Direction::UpLeft => (-d, -d),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Hunter {
    pub rect: Rect,
    pub direction: Direction,
    pub moving: bool,
}

impl Hunter {
    pub fn new(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self {
            rect: Rect::new(x, y, width, height),
            direction: Direction::Up,
            moving: false,
        }
    }

    /// Spawn point of a bullet fired in the current direction, relative to the sprite's muzzle.
    pub fn muzzle(&self) -> (f64, f64) {
        let Rect { x, y, width, height } = self.rect;
        let (dx, dy) = match self.direction {
            Direction::Up => (36.0, 0.0),
            Direction::UpRight => (width, -5.0),
            Direction::Right => (width, 17.0),
            Direction::DownRight => (width, 29.0),
            Direction::Down => (18.0, height),
            Direction::DownLeft => (0.0, 27.0),
            Direction::Left => (0.0, 17.0),
            Direction::UpLeft => (0.0, -5.0),
        };
        (x + dx, y + dy)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Bullet {
    pub rect: Rect,
    pub direction: Direction,
    pub created_tick: u64,
}

impl Bullet {
    pub fn new(x: f64, y: f64, direction: Direction, created_tick: u64) -> Self {
        Self {
            rect: Rect::new(x, y, 1.0, 1.0),
            direction,
            created_tick,
        }
    }

    pub fn age(&self, tick: u64) -> u64 {
        tick.saturating_sub(self.created_tick)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Prey {
    pub rect: Rect,
    pub direction: Direction,
    pub alive: bool,
}

impl Prey {
    pub fn new(rect: Rect, direction: Direction) -> Self {
        Self {
            rect,
            direction,
            alive: true,
        }
    }
}
