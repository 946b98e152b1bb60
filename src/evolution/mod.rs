pub mod mutation;
pub mod selection;

use crate::brain::{Brain, BrainShape};
use crate::cancel::{CancelToken, Cancelled};
use crate::config::Config;
use crate::simulation::Simulation;
use crate::stats::GenerationStats;
use crate::world::WorldSnapshot;
use rand::rngs::StdRng;
use rand::SeedableRng;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};

const STREAM_SEED: u64 = 0;
const STREAM_EPISODE: u64 = 1;
const STREAM_MUTATION: u64 = 2;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Phase {
    Evaluating,
    Selecting,
    Reproducing,
}

/// Outcome of one individual's episode.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Evaluation {
    pub index: usize,
    pub score: i64,
    pub episode_seed: u64,
    pub final_snapshot: WorldSnapshot,
}

/// Best individual of a completed generation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Champion {
    pub index: usize,
    pub brain: Brain,
    pub episode_seed: u64,
    pub final_snapshot: WorldSnapshot,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GenerationReport {
    pub stats: GenerationStats,
    pub champion: Champion,
}

type PhaseHook = Box<dyn Fn(Phase) + Send + Sync>;

/// Generational trainer: evaluate every brain, keep the top half, refill the
/// population with mutated copies of the survivors.
pub struct Trainer {
    config: Config,
    run_seed: u64,
    generation: u64,
    phase: Phase,
    population: Vec<Brain>,
    /// Parent slot in the previous generation for each brain.
    lineage: Vec<Option<usize>>,
    history: Vec<GenerationStats>,
    on_phase: Option<PhaseHook>,
}

impl Trainer {
    /// Builds generation zero. Fails when `config` does not validate.
    pub fn new(config: Config, run_seed: u64) -> Result<Self, Box<dyn std::error::Error>> {
        config.validate()?;
        let shape = BrainShape::from_config(&config);
        let population: Vec<Brain> = (0..config.evolution.population_size)
            .map(|i| {
                let mut rng = StdRng::seed_from_u64(derive_seed(run_seed, STREAM_SEED, 0, i));
                Brain::seed(shape, &config.brain, &mut rng)
            })
            .collect();
        let lineage = vec![None; population.len()];

        Ok(Self {
            config,
            run_seed,
            generation: 0,
            phase: Phase::Evaluating,
            population,
            lineage,
            history: Vec::new(),
            on_phase: None,
        })
    }

    /// Registers a callback invoked on every phase change.
    pub fn on_phase<F>(&mut self, hook: F)
    where
        F: Fn(Phase) + Send + Sync + 'static,
    {
        self.on_phase = Some(Box::new(hook));
    }

    fn enter(&mut self, phase: Phase) {
        if self.phase != phase {
            self.phase = phase;
            if let Some(hook) = &self.on_phase {
                hook(phase);
            }
        }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn run_seed(&self) -> u64 {
        self.run_seed
    }

    /// Number of completed generations.
    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn population(&self) -> &[Brain] {
        &self.population
    }

    pub fn lineage(&self) -> &[Option<usize>] {
        &self.lineage
    }

    pub fn history(&self) -> &[GenerationStats] {
        &self.history
    }

    /// Seed of the episode individual `index` plays in the current generation.
    pub fn episode_seed(&self, index: usize) -> u64 {
        derive_seed(self.run_seed, STREAM_EPISODE, self.generation, index)
    }

    /// Plays every brain against its own fresh world.
    pub fn evaluate(&self, cancel: &CancelToken) -> Result<Vec<Evaluation>, Cancelled> {
        let evaluate_one = |(index, brain): (usize, &Brain)| -> Result<Evaluation, Cancelled> {
            cancel.check()?;
            let episode_seed = self.episode_seed(index);
            let mut sim = Simulation::new(&self.config, episode_seed);
            let score = sim.run(brain, &self.config, cancel)?;
            Ok(Evaluation {
                index,
                score,
                episode_seed,
                final_snapshot: sim.world.snapshot(),
            })
        };

        if self.config.evolution.parallel {
            self.population.par_iter().enumerate().map(evaluate_one).collect()
        } else {
            self.population.iter().enumerate().map(evaluate_one).collect()
        }
    }

    /// Runs one full EVALUATING -> SELECTING -> REPRODUCING cycle.
    ///
    /// On cancellation the population is left as it was before the call.
    pub fn step(&mut self, cancel: &CancelToken) -> Result<GenerationReport, Cancelled> {
        self.enter(Phase::Evaluating);
        log::debug!("Generation {}: evaluating {} individuals", self.generation + 1, self.population.len());
        let evaluations = self.evaluate(cancel)?;

        self.enter(Phase::Selecting);
        let scores: Vec<i64> = evaluations.iter().map(|e| e.score).collect();
        let survivors = selection::select_survivors(&scores);
        log::debug!("Generation {}: {} survivors", self.generation + 1, survivors.len());

        let probabilities: Vec<f64> = self.population.iter().map(|b| b.mutation_probability).collect();
        let stats = GenerationStats::compute(self.generation + 1, &scores, &probabilities, survivors.len());

        let best = survivors[0];
        let champion = Champion {
            index: best,
            brain: self.population[best].clone(),
            episode_seed: evaluations[best].episode_seed,
            final_snapshot: evaluations[best].final_snapshot.clone(),
        };

        self.enter(Phase::Reproducing);
        let parents = selection::parent_slots(&survivors, self.population.len());
        let next = self.reproduce(&parents);

        self.population = next;
        self.lineage = parents.into_iter().map(Some).collect();
        self.history.push(stats.clone());
        self.generation += 1;
        self.enter(Phase::Evaluating);

        Ok(GenerationReport { stats, champion })
    }

    fn reproduce(&self, parents: &[usize]) -> Vec<Brain> {
        let breed = |(slot, &parent): (usize, &usize)| {
            let mut rng = StdRng::seed_from_u64(derive_seed(
                self.run_seed,
                STREAM_MUTATION,
                self.generation,
                slot,
            ));
            self.population[parent].mutate(&self.config.brain, &mut rng)
        };

        if self.config.evolution.parallel {
            parents.par_iter().enumerate().map(breed).collect()
        } else {
            parents.iter().enumerate().map(breed).collect()
        }
    }

    /// Trains until `max_generations` generations have completed (0 = no
    /// limit) or `cancel` is raised. `observer` sees every report.
    pub fn run<F>(&mut self, max_generations: u64, cancel: &CancelToken, mut observer: F) -> Result<(), Cancelled>
    where
        F: FnMut(&GenerationReport),
    {
        let log_interval = self.config.evolution.log_interval_generations.max(1);

        while max_generations == 0 || self.generation < max_generations {
            cancel.check()?;
            let report = self.step(cancel)?;

            if report.stats.generation % log_interval == 0 {
                log::info!(
                    "Gen: {} | Mean Score: {:.1} | Best: {} (#{}) | Worst: {} | Mean Mutation: {:.4}",
                    report.stats.generation,
                    report.stats.mean_score,
                    report.stats.best_score,
                    report.stats.best_index + 1,
                    report.stats.worst_score,
                    report.stats.mean_mutation_probability
                );
            }

            observer(&report);
        }

        Ok(())
    }
}

/// Independent, reproducible seed per (stream, generation, slot).
pub fn derive_seed(run_seed: u64, stream: u64, generation: u64, index: usize) -> u64 {
    let mut z = run_seed;
    for part in [stream, generation, index as u64] {
        z = splitmix64(z ^ part.wrapping_mul(0x9E37_79B9_7F4A_7C15));
    }
    z
}

fn splitmix64(mut z: u64) -> u64 {
    z = z.wrapping_add(0x9E37_79B9_7F4A_7C15);
    z = (z ^ (z >> 30)).wrapping_mul(0xBF58_476D_1CE4_E5B9);
    z = (z ^ (z >> 27)).wrapping_mul(0x94D0_49BB_1331_11EB);
    z ^ (z >> 31)
}
