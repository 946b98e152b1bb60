use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Upper bound for the WebSocket push and replay rates.
pub const MAX_SERVER_RATE_HZ: u64 = 1000;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    pub arena: ArenaConfig,
    pub sensor: SensorConfig,
    pub brain: BrainConfig,
    pub evolution: EvolutionConfig,
    pub server: ServerConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ArenaConfig {
    pub width: f64,
    pub height: f64,
    pub max_ticks: u64,
    pub hunter_width: f64,
    pub hunter_height: f64,
    pub hunter_speed: f64,
    pub prey_width: f64,
    pub prey_height: f64,
    pub prey_speed: f64,
    /// Per-tick chance that a living prey picks a new random direction.
    pub prey_turn_chance: f64,
    /// Per-tick chance that a new prey enters from one of the edges.
    pub prey_spawn_chance: f64,
    pub bullet_speed: f64,
    pub bullet_lifetime_ticks: u64,
    pub obstacle_count: usize,
    pub obstacle_size: f64,
    pub kill_bonus: i64,
    pub move_reward: i64,
    pub fire_reward: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SensorConfig {
    pub tracked_prey: usize,
    pub tracked_obstacles: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BrainConfig {
    pub hidden_layers: usize,
    pub outputs: usize,
    pub initial_mutation_probability: f64,
    pub min_mutation_probability: f64,
    pub max_mutation_probability: f64,
    pub mutation_probability_sigma: f64,
    pub weight_sigma: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EvolutionConfig {
    pub population_size: usize,
    /// Run seed; a random one is drawn at startup when absent.
    pub seed: Option<u64>,
    pub parallel: bool,
    /// 0 means train until cancelled.
    pub max_generations: u64,
    pub log_interval_generations: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    pub enabled: bool,
    pub address: String,
    pub port: u16,
    pub update_rate_hz: u64,
    pub replay_ticks_per_second: u64,
}

impl ServerConfig {
    pub fn update_period(&self) -> Duration {
        period_of(self.update_rate_hz)
    }

    pub fn replay_period(&self) -> Duration {
        period_of(self.replay_ticks_per_second)
    }
}

/// Interval for a per-second rate. A zero rate is treated as 1 Hz.
fn period_of(rate_hz: u64) -> Duration {
    Duration::from_secs_f64(1.0 / rate_hz.max(1) as f64)
}

impl Default for Config {
    fn default() -> Self {
        Self {
            arena: ArenaConfig {
                width: 960.0,
                height: 540.0,
                max_ticks: 900,           // 60 seconds at 15 TPS
                hunter_width: 57.0,
                hunter_height: 46.0,
                hunter_speed: 3.0,
                prey_width: 64.0,
                prey_height: 40.0,
                prey_speed: 5.0,
                prey_turn_chance: 1.0 / 15.0,   // ~1 second at 15 TPS
                prey_spawn_chance: 1.0 / 75.0,  // ~5 seconds at 15 TPS
                bullet_speed: 10.0,
                bullet_lifetime_ticks: 30,      // 2 seconds at 15 TPS
                obstacle_count: 1,
                obstacle_size: 80.0,
                kill_bonus: 1000,
                move_reward: 1,
                fire_reward: 1,
            },
            sensor: SensorConfig {
                tracked_prey: 5,
                tracked_obstacles: 3,
            },
            brain: BrainConfig {
                hidden_layers: 1,
                outputs: 6,
                initial_mutation_probability: 0.125,
                min_mutation_probability: 0.001,
                max_mutation_probability: 1.0,
                mutation_probability_sigma: 0.025,
                weight_sigma: 1.0,
            },
            evolution: EvolutionConfig {
                population_size: 144,
                seed: None,
                parallel: true,
                max_generations: 0,
                log_interval_generations: 1,
            },
            server: ServerConfig {
                enabled: true,
                address: "0.0.0.0".to_string(),
                port: 8080,
                update_rate_hz: 4,
                replay_ticks_per_second: 15,
            },
        }
    }
}

impl Config {
    pub fn load_from_file(path: &str) -> Result<Self, Box<dyn std::error::Error>> {
        let content = std::fs::read_to_string(path)?;
        let config: Config = serde_json::from_str(&content)?;
        config.validate()?;
        Ok(config)
    }

    pub fn save_to_file(&self, path: &str) -> Result<(), Box<dyn std::error::Error>> {
        let content = serde_json::to_string_pretty(self)?;
        std::fs::write(path, content)?;
        Ok(())
    }

    pub fn validate(&self) -> Result<(), Box<dyn std::error::Error>> {
        let arena = &self.arena;
        if arena.width <= 0.0 || arena.height <= 0.0 {
            return Err("arena width and height must be positive".into());
        }
        let sizes = [
            arena.hunter_width,
            arena.hunter_height,
            arena.prey_width,
            arena.prey_height,
            arena.obstacle_size,
        ];
        if sizes.iter().any(|&s| s <= 0.0) {
            return Err("entity sizes must be positive".into());
        }
        if arena.max_ticks == 0 {
            return Err("arena.max_ticks must be at least 1".into());
        }
        for (name, chance) in [
            ("arena.prey_turn_chance", arena.prey_turn_chance),
            ("arena.prey_spawn_chance", arena.prey_spawn_chance),
        ] {
            if !(0.0..=1.0).contains(&chance) {
                return Err(format!("{} must be within [0, 1], got {}", name, chance).into());
            }
        }

        let brain = &self.brain;
        if brain.outputs < 6 {
            return Err("brain.outputs must cover the six action bits".into());
        }
        if !(0.0 < brain.min_mutation_probability
            && brain.min_mutation_probability <= brain.max_mutation_probability
            && brain.max_mutation_probability <= 1.0)
        {
            return Err("mutation probability bounds must satisfy 0 < min <= max <= 1".into());
        }

        if self.evolution.population_size == 0 {
            return Err("evolution.population_size must be at least 1".into());
        }
        for (name, rate) in [
            ("server.update_rate_hz", self.server.update_rate_hz),
            ("server.replay_ticks_per_second", self.server.replay_ticks_per_second),
        ] {
            if !(1..=MAX_SERVER_RATE_HZ).contains(&rate) {
                return Err(format!("{} must be within [1, {}], got {}", name, MAX_SERVER_RATE_HZ, rate).into());
            }
        }

        Ok(())
    }

    /// Length of the sensor feature vector.
    pub fn input_size(&self) -> usize {
        self.sensor.tracked_prey * crate::simulation::sensor::PREY_FEATURES
            + self.sensor.tracked_obstacles * crate::simulation::sensor::OBSTACLE_FEATURES
    }
}
