pub mod entity;
pub mod rect;

use crate::config::ArenaConfig;
use crate::simulation::action::Action;
use entity::{Bullet, Hunter, Prey};
use rand::Rng;
use rect::Rect;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct World {
    pub tick: u64,
    pub score: i64,
    pub hunter: Hunter,
    pub prey: Vec<Prey>,
    pub bullets: Vec<Bullet>,
    pub obstacles: Vec<Rect>,
    /// Invisible boundary that keeps the hunter inside the arena.
    pub walls: [Rect; 4],
    pub last_action: Action,
    max_ticks: u64,
}

impl World {
    /// A fresh world with `obstacle_count` randomly placed obstacles.
    pub fn new<R: Rng + ?Sized>(config: &ArenaConfig, rng: &mut R) -> Self {
        let obstacles = (0..config.obstacle_count)
            .map(|_| random_obstacle(config, rng))
            .collect();
        Self::with_obstacles(config, obstacles)
    }

    pub fn with_obstacles(config: &ArenaConfig, obstacles: Vec<Rect>) -> Self {
        Self {
            tick: 0,
            score: 0,
            hunter: Hunter::new(0.0, 0.0, config.hunter_width, config.hunter_height),
            prey: Vec::new(),
            bullets: Vec::new(),
            obstacles,
            walls: boundary_walls(config),
            last_action: Action::IDLE,
            max_ticks: config.max_ticks,
        }
    }

    pub fn max_ticks(&self) -> u64 {
        self.max_ticks
    }

    pub fn ticks_remaining(&self) -> u64 {
        self.max_ticks.saturating_sub(self.tick)
    }

    pub fn is_finished(&self) -> bool {
        self.tick >= self.max_ticks
    }

    pub fn living_prey(&self) -> impl Iterator<Item = &Prey> {
        self.prey.iter().filter(|p| p.alive)
    }

    pub fn snapshot(&self) -> WorldSnapshot {
        WorldSnapshot {
            tick: self.tick,
            ticks_remaining: self.ticks_remaining(),
            score: self.score,
            hunter: self.hunter.clone(),
            prey: self.prey.clone(),
            bullets: self.bullets.clone(),
            obstacles: self.obstacles.clone(),
            last_action: self.last_action,
        }
    }
}

/// Read-only view of a world handed to renderers.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WorldSnapshot {
    pub tick: u64,
    pub ticks_remaining: u64,
    pub score: i64,
    pub hunter: Hunter,
    pub prey: Vec<Prey>,
    pub bullets: Vec<Bullet>,
    pub obstacles: Vec<Rect>,
    pub last_action: Action,
}

/// Top, bottom, left, right. Each wall is one hunter thick so the hunter can
/// never step past the arena edge.
pub fn boundary_walls(config: &ArenaConfig) -> [Rect; 4] {
    let (w, h) = (config.hunter_width, config.hunter_height);
    let (width, height) = (config.width, config.height);
    [
        Rect::new(-w, -h, width + w * 2.0, h),
        Rect::new(-w, height, width + w * 2.0, h),
        Rect::new(-w, -h, w, height + h * 2.0),
        Rect::new(width, -h, w, height + h * 2.0),
    ]
}

fn random_obstacle<R: Rng + ?Sized>(config: &ArenaConfig, rng: &mut R) -> Rect {
    let size = config.obstacle_size;
    let x = uniform_in(rng, config.hunter_width, config.width - size);
    let y = uniform_in(rng, config.hunter_height, config.height - size);
    Rect::new(x.floor(), y.floor(), size, size)
}

/// Uniform draw from `[low, high)`, collapsing to `low` when the range is empty.
pub(crate) fn uniform_in<R: Rng + ?Sized>(rng: &mut R, low: f64, high: f64) -> f64 {
    if high > low {
        rng.gen_range(low..high)
    } else {
        low
    }
}
