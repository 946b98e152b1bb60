use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Aggregates of one completed generation, computed before reproduction.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GenerationStats {
    pub generation: u64,
    pub population: usize,
    pub survivors: usize,
    pub mean_score: f64,
    pub best_score: i64,
    pub worst_score: i64,
    pub best_index: usize,
    pub mean_mutation_probability: f64,
    pub completed_at: DateTime<Utc>,
}

impl GenerationStats {
    /// `scores` and `mutation_probabilities` are indexed by population slot.
    pub fn compute(
        generation: u64,
        scores: &[i64],
        mutation_probabilities: &[f64],
        survivors: usize,
    ) -> Self {
        let population = scores.len();

        if population == 0 {
            return Self {
                generation,
                population: 0,
                survivors: 0,
                mean_score: 0.0,
                best_score: 0,
                worst_score: 0,
                best_index: 0,
                mean_mutation_probability: 0.0,
                completed_at: Utc::now(),
            };
        }

        let mean_score = scores.iter().sum::<i64>() as f64 / population as f64;
        let (best_index, best_score) = scores
            .iter()
            .copied()
            .enumerate()
            .fold((0, i64::MIN), |best, (i, s)| if s > best.1 { (i, s) } else { best });
        let worst_score = scores.iter().copied().min().unwrap_or(0);

        let mean_mutation_probability = if mutation_probabilities.is_empty() {
            0.0
        } else {
            mutation_probabilities.iter().sum::<f64>() / mutation_probabilities.len() as f64
        };

        Self {
            generation,
            population,
            survivors,
            mean_score,
            best_score,
            worst_score,
            best_index,
            mean_mutation_probability,
            completed_at: Utc::now(),
        }
    }
}
