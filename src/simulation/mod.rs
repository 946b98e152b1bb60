pub mod action;
pub mod sensor;
pub mod tick;

use crate::brain::Brain;
use crate::cancel::{CancelToken, Cancelled};
use crate::config::Config;
use crate::world::World;
use action::Action;
use rand::rngs::StdRng;
use rand::SeedableRng;

/// One episode: a world and the random stream that drives it.
#[derive(Debug, Clone)]
pub struct Simulation {
    pub world: World,
    pub seed: u64,
    rng: StdRng,
}

impl Simulation {
    pub fn new(config: &Config, seed: u64) -> Self {
        let mut rng = StdRng::seed_from_u64(seed);
        let world = World::new(&config.arena, &mut rng);
        Self { world, seed, rng }
    }

    /// Applies an externally supplied action, e.g. from a human player.
    pub fn step(&mut self, action: &Action, config: &Config) -> bool {
        self.world.tick(action, &config.arena, &mut self.rng)
    }

    /// Lets `brain` pick the action for one tick. Returns the action taken and
    /// whether the episode continues.
    pub fn step_with(&mut self, brain: &Brain, config: &Config, inputs: &mut [f64]) -> (Action, bool) {
        sensor::encode_into(&self.world, &config.sensor, inputs);
        let action = brain.decide(inputs);
        let running = self.step(&action, config);
        (action, running)
    }

    /// Drives the episode to its tick limit and returns the final score.
    pub fn run(&mut self, brain: &Brain, config: &Config, cancel: &CancelToken) -> Result<i64, Cancelled> {
        let mut inputs = vec![0.0; config.input_size()];
        loop {
            cancel.check()?;
            let (_, running) = self.step_with(brain, config, &mut inputs);
            if !running {
                return Ok(self.world.score);
            }
        }
    }
}
