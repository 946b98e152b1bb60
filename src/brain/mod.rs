pub mod trace;

use crate::config::Config;
use crate::simulation::action::Action;
use serde::{Deserialize, Serialize};
use trace::{BrainTrace, LayerTrace};

/// Layer sizes of a brain. Every brain in a population shares one shape.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BrainShape {
    pub inputs: usize,
    pub hidden: usize,
    pub hidden_layers: usize,
    pub outputs: usize,
}

impl BrainShape {
    /// Hidden width is two thirds of inputs plus outputs, rounded.
    pub fn new(inputs: usize, hidden_layers: usize, outputs: usize) -> Self {
        let hidden = (((inputs + outputs) as f64) * 2.0 / 3.0).round() as usize;
        Self {
            inputs,
            hidden,
            hidden_layers,
            outputs,
        }
    }

    pub fn from_config(config: &Config) -> Self {
        Self::new(config.input_size(), config.brain.hidden_layers, config.brain.outputs)
    }

    pub fn parameter_count(&self) -> usize {
        let input = self.inputs * self.hidden + self.hidden;
        let hidden = self.hidden_layers * (self.hidden * self.hidden + self.hidden);
        let output = self.hidden * self.outputs + self.outputs;
        input + hidden + output
    }
}

/// Fully connected layer. `weights` is row-major `[inputs x outputs]`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DenseLayer {
    pub inputs: usize,
    pub outputs: usize,
    pub weights: Vec<f64>,
    pub biases: Vec<f64>,
}

impl DenseLayer {
    pub fn zeroed(inputs: usize, outputs: usize) -> Self {
        Self {
            inputs,
            outputs,
            weights: vec![0.0; inputs * outputs],
            biases: vec![0.0; outputs],
        }
    }

    pub fn weight(&self, from: usize, to: usize) -> f64 {
        self.weights[from * self.outputs + to]
    }

    pub fn set_weight(&mut self, from: usize, to: usize, value: f64) {
        self.weights[from * self.outputs + to] = value;
    }

    /// `x·W + b`, optionally rectified.
    pub fn forward(&self, x: &[f64], relu: bool) -> Vec<f64> {
        debug_assert_eq!(x.len(), self.inputs);
        let mut out = self.biases.clone();
        for (i, &xi) in x.iter().enumerate() {
            let row = &self.weights[i * self.outputs..(i + 1) * self.outputs];
            for (o, &w) in out.iter_mut().zip(row) {
                *o += xi * w;
            }
        }
        if relu {
            for v in &mut out {
                *v = v.max(0.0);
            }
        }
        out
    }

    fn trace(&self, name: String, activations: &[f64]) -> LayerTrace {
        LayerTrace {
            name,
            weights: self.weights.clone(),
            biases: self.biases.clone(),
            activations: activations.to_vec(),
        }
    }
}

/// Fixed-topology feed-forward policy plus its own mutation probability.
///
/// Brains are never edited in place after construction; [`Brain::mutate`]
/// returns a fresh copy with independently owned buffers.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Brain {
    pub shape: BrainShape,
    pub mutation_probability: f64,
    pub input: DenseLayer,
    pub hidden: Vec<DenseLayer>,
    pub output: DenseLayer,
}

impl Brain {
    pub fn zeroed(shape: BrainShape, mutation_probability: f64) -> Self {
        Self {
            shape,
            mutation_probability,
            input: DenseLayer::zeroed(shape.inputs, shape.hidden),
            hidden: (0..shape.hidden_layers)
                .map(|_| DenseLayer::zeroed(shape.hidden, shape.hidden))
                .collect(),
            output: DenseLayer::zeroed(shape.hidden, shape.outputs),
        }
    }

    /// Layers in evaluation order.
    pub fn layers(&self) -> impl Iterator<Item = &DenseLayer> {
        std::iter::once(&self.input)
            .chain(self.hidden.iter())
            .chain(std::iter::once(&self.output))
    }

    /// Every weight and bias in a fixed order.
    pub fn parameters(&self) -> impl Iterator<Item = f64> + '_ {
        self.layers()
            .flat_map(|layer| layer.weights.iter().chain(layer.biases.iter()).copied())
    }

    pub fn compute(&self, inputs: &[f64]) -> Vec<f64> {
        self.forward(inputs, None)
    }

    pub fn decide(&self, inputs: &[f64]) -> Action {
        Action::from_outputs(&self.compute(inputs))
    }

    /// Same evaluation as [`Brain::compute`], additionally recording every
    /// layer's parameters and activations.
    pub fn trace(&self, inputs: &[f64]) -> BrainTrace {
        let mut trace = BrainTrace::new(self.mutation_probability, inputs);
        let outputs = self.forward(inputs, Some(&mut trace));
        trace.outputs = outputs;
        trace
    }

    fn forward(&self, inputs: &[f64], mut trace: Option<&mut BrainTrace>) -> Vec<f64> {
        assert_eq!(inputs.len(), self.shape.inputs, "Input size mismatch");

        let mut h = self.input.forward(inputs, true);
        if let Some(t) = trace.as_deref_mut() {
            t.layers.push(self.input.trace("input".to_string(), &h));
        }

        for (index, layer) in self.hidden.iter().enumerate() {
            h = layer.forward(&h, true);
            if let Some(t) = trace.as_deref_mut() {
                t.layers.push(layer.trace(format!("hidden_{}", index), &h));
            }
        }

        let y = self.output.forward(&h, false);
        if let Some(t) = trace.as_deref_mut() {
            t.layers.push(self.output.trace("output".to_string(), &y));
        }
        y
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn small_shape() -> BrainShape {
        BrainShape {
            inputs: 2,
            hidden: 2,
            hidden_layers: 1,
            outputs: 6,
        }
    }

    #[test]
    fn test_reference_shape() {
        let shape = BrainShape::from_config(&Config::default());
        assert_eq!(shape.inputs, 27);
        assert_eq!(shape.hidden, 22);
        assert_eq!(shape.hidden_layers, 1);
        assert_eq!(shape.outputs, 6);
        assert_eq!(
            shape.parameter_count(),
            27 * 22 + 22 + 22 * 22 + 22 + 22 * 6 + 6
        );
    }

    #[test]
    fn test_zeroed_brain_decides_idle() {
        let brain = Brain::zeroed(BrainShape::from_config(&Config::default()), 0.125);
        let inputs: Vec<f64> = (0..27).map(|i| i as f64 * 13.7 - 100.0).collect();

        assert!(brain.compute(&inputs).iter().all(|&v| v == 0.0));
        assert_eq!(brain.decide(&inputs), Action::IDLE);
        assert_eq!(brain.parameters().count(), brain.shape.parameter_count());
    }

    #[test]
    fn test_forward_pass_by_hand() {
        let mut brain = Brain::zeroed(small_shape(), 0.1);
        // h0 = relu(x0 - x1 + 0.5), h1 = relu(x1)
        brain.input.set_weight(0, 0, 1.0);
        brain.input.set_weight(1, 0, -1.0);
        brain.input.biases[0] = 0.5;
        brain.input.set_weight(1, 1, 1.0);
        // hidden swaps the two neurons
        brain.hidden[0].set_weight(0, 1, 1.0);
        brain.hidden[0].set_weight(1, 0, 1.0);
        // output 0 = h0 - h1, output 5 = -1
        brain.output.set_weight(0, 0, 1.0);
        brain.output.set_weight(1, 0, -1.0);
        assert_eq!(brain.input.weight(1, 0), -1.0);
        assert_eq!(brain.input.weights[2], -1.0);
        brain.output.biases[5] = -1.0;

        // x = (3, 1): h = (2.5, 1) -> swapped (1, 2.5) -> y0 = -1.5
        let y = brain.compute(&[3.0, 1.0]);
        assert_eq!(y[0], -1.5);
        assert_eq!(y[5], -1.0);

        // x = (1, 3): h = relu(-1.5)=0, 3 -> swapped (3, 0) -> y0 = 3
        let y = brain.compute(&[1.0, 3.0]);
        assert_eq!(y[0], 3.0);
        let action = brain.decide(&[1.0, 3.0]);
        assert!(action.up);
        assert!(!action.fire);
    }

    #[test]
    fn test_compute_is_deterministic() {
        let mut brain = Brain::zeroed(small_shape(), 0.1);
        for (i, w) in brain.input.weights.iter_mut().enumerate() {
            *w = (i as f64 * 0.37).sin();
        }
        for (i, w) in brain.output.weights.iter_mut().enumerate() {
            *w = (i as f64 * 1.1).cos();
        }
        let copy = brain.clone();
        let inputs = [0.3, -7.25];

        let a = brain.compute(&inputs);
        let b = copy.compute(&inputs);
        let c = brain.compute(&inputs);
        assert_eq!(a.iter().map(|v| v.to_bits()).collect::<Vec<_>>(), b.iter().map(|v| v.to_bits()).collect::<Vec<_>>());
        assert_eq!(a, c);
    }

    #[test]
    fn test_trace_matches_compute() {
        let mut brain = Brain::zeroed(small_shape(), 0.2);
        brain.input.weights = vec![0.5, -1.0, 2.0, 0.25];
        brain.hidden[0].biases = vec![0.1, -0.1];
        brain.output.weights = vec![1.0; 12];

        let inputs = [1.0, 2.0];
        let trace = brain.trace(&inputs);

        assert_eq!(trace.outputs, brain.compute(&inputs));
        assert_eq!(trace.mutation_probability, 0.2);
        assert_eq!(trace.inputs, inputs.to_vec());
        assert_eq!(trace.layers.len(), 3);
        assert_eq!(trace.layers[0].name, "input");
        assert_eq!(trace.layers[1].name, "hidden_0");
        assert_eq!(trace.layers[2].activations, trace.outputs);
        assert_eq!(trace.layers[0].weights, brain.input.weights);
    }

    #[test]
    #[should_panic(expected = "Input size mismatch")]
    fn test_wrong_input_length_panics() {
        let brain = Brain::zeroed(small_shape(), 0.1);
        brain.compute(&[1.0, 2.0, 3.0]);
    }
}
