use crate::brain::{Brain, BrainShape};
use crate::config::BrainConfig;
use rand::Rng;
use rand_distr::StandardNormal;

/// Zero-mean gaussian draw with standard deviation `sigma`.
pub fn gaussian<R: Rng + ?Sized>(rng: &mut R, sigma: f64) -> f64 {
    let z: f64 = rng.sample(StandardNormal);
    z * sigma
}

/// Adds gaussian noise to `value` with probability `probability`.
pub fn perturb_value<R: Rng + ?Sized>(value: f64, probability: f64, sigma: f64, rng: &mut R) -> f64 {
    if rng.gen_bool(probability.clamp(0.0, 1.0)) {
        value + gaussian(rng, sigma)
    } else {
        value
    }
}

/// Independently perturbs every element of `values` in place.
pub fn perturb_values<R: Rng + ?Sized>(values: &mut [f64], probability: f64, sigma: f64, rng: &mut R) {
    for value in values {
        *value = perturb_value(*value, probability, sigma, rng);
    }
}

impl Brain {
    /// First-generation brain: an all-zero network passed through one mutation.
    pub fn seed<R: Rng + ?Sized>(shape: BrainShape, config: &BrainConfig, rng: &mut R) -> Brain {
        Brain::zeroed(shape, config.initial_mutation_probability).mutate(config, rng)
    }

    /// Returns a mutated deep copy; `self` is left untouched.
    ///
    /// The mutation probability first drifts (with its own probability) and is
    /// clamped, then gates every weight and bias independently.
    pub fn mutate<R: Rng + ?Sized>(&self, config: &BrainConfig, rng: &mut R) -> Brain {
        let mut child = self.clone();

        let p = child.mutation_probability;
        if rng.gen_bool(p.clamp(0.0, 1.0)) {
            child.mutation_probability = (p + gaussian(rng, config.mutation_probability_sigma)).clamp(
                config.min_mutation_probability,
                config.max_mutation_probability,
            );
        }

        let p = child.mutation_probability;
        let sigma = config.weight_sigma;
        perturb_values(&mut child.input.weights, p, sigma, rng);
        perturb_values(&mut child.input.biases, p, sigma, rng);
        for layer in &mut child.hidden {
            perturb_values(&mut layer.weights, p, sigma, rng);
        }
        for layer in &mut child.hidden {
            perturb_values(&mut layer.biases, p, sigma, rng);
        }
        perturb_values(&mut child.output.weights, p, sigma, rng);
        perturb_values(&mut child.output.biases, p, sigma, rng);

        child
    }
}
