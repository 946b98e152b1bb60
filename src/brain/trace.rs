use serde::{Deserialize, Serialize};

/// Diagnostic record of one forward pass. Purely observational.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BrainTrace {
    pub mutation_probability: f64,
    pub inputs: Vec<f64>,
    pub layers: Vec<LayerTrace>,
    pub outputs: Vec<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LayerTrace {
    pub name: String,
    pub weights: Vec<f64>,
    pub biases: Vec<f64>,
    pub activations: Vec<f64>,
}

impl BrainTrace {
    pub fn new(mutation_probability: f64, inputs: &[f64]) -> Self {
        Self {
            mutation_probability,
            inputs: inputs.to_vec(),
            layers: Vec::new(),
            outputs: Vec::new(),
        }
    }
}
