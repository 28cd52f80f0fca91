use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::activation::activation::ActivationFunction;
use crate::error::{NnError, Result};
use crate::layers::dense::Layer;
use crate::loss::mse::MseLoss;
use crate::math::matrix::Matrix;
use crate::network::forward_state::ForwardState;
use crate::optim::sgd::Sgd;
use crate::train::{loop_fn::train_loop, train_config::TrainConfig};

/// A fully connected feed-forward network trained with online SGD.
///
/// Hidden layers use sigmoid activations and the output layer is linear.
/// Transition `i` maps layer `i` (width `layer_sizes[i]`) onto layer `i + 1`.
#[derive(Debug, Clone)]
pub struct Network {
    layer_sizes: Vec<usize>,
    layers: Vec<Layer>,
    optimizer: Sgd,
}

impl Network {
    /// Builds a randomly initialized network, seeding from the thread-local RNG.
    ///
    /// `layer_sizes` lists every layer width, input first and output last, e.g.
    /// `[1, 5, 1]` for one hidden layer of five neurons.
    pub fn new(layer_sizes: &[usize], learning_rate: f64) -> Result<Network> {
        Network::new_with_rng(layer_sizes, learning_rate, &mut rand::thread_rng())
    }

    /// Deterministic variant of [`Network::new`].
    pub fn new_with_seed(layer_sizes: &[usize], learning_rate: f64, seed: u64) -> Result<Network> {
        let mut rng = StdRng::seed_from_u64(seed);
        Network::new_with_rng(layer_sizes, learning_rate, &mut rng)
    }

    pub fn new_with_rng<R: Rng + ?Sized>(
        layer_sizes: &[usize],
        learning_rate: f64,
        rng: &mut R,
    ) -> Result<Network> {
        validate_layer_sizes(layer_sizes)?;
        let optimizer = Sgd::new(learning_rate)?;

        let transitions = layer_sizes.len() - 1;
        let layers = layer_sizes.windows(2)
            .enumerate()
            .map(|(i, pair)| Layer::random(pair[1], pair[0], activation_for(i, transitions), rng))
            .collect();

        tracing::debug!(?layer_sizes, learning_rate, "initialized network");

        Ok(Network {
            layer_sizes: layer_sizes.to_vec(),
            layers,
            optimizer,
        })
    }

    /// Builds a network from explicit per-transition `(weights, biases)`.
    ///
    /// Each weight matrix must be `layer_sizes[i + 1] × layer_sizes[i]` and
    /// each bias vector `layer_sizes[i + 1]` long.
    pub fn from_parameters(
        layer_sizes: &[usize],
        parameters: Vec<(Matrix, Vec<f64>)>,
        learning_rate: f64,
    ) -> Result<Network> {
        validate_layer_sizes(layer_sizes)?;
        let optimizer = Sgd::new(learning_rate)?;

        let transitions = layer_sizes.len() - 1;
        if parameters.len() != transitions {
            return Err(NnError::InvalidConfig(format!(
                "{} layer sizes need {} transitions, got {}",
                layer_sizes.len(),
                transitions,
                parameters.len()
            )));
        }

        let mut layers = Vec::with_capacity(transitions);
        for (i, (weights, biases)) in parameters.into_iter().enumerate() {
            let expected = (layer_sizes[i + 1], layer_sizes[i]);
            if weights.shape() != expected {
                return Err(NnError::InvalidConfig(format!(
                    "transition {i}: weights are {}x{}, expected {}x{}",
                    weights.rows(),
                    weights.cols(),
                    expected.0,
                    expected.1
                )));
            }
            layers.push(Layer::from_parameters(weights, biases, activation_for(i, transitions))?);
        }

        Ok(Network {
            layer_sizes: layer_sizes.to_vec(),
            layers,
            optimizer,
        })
    }

    pub fn layer_sizes(&self) -> &[usize] {
        &self.layer_sizes
    }

    pub fn input_size(&self) -> usize {
        self.layer_sizes[0]
    }

    pub fn output_size(&self) -> usize {
        self.layer_sizes[self.layer_sizes.len() - 1]
    }

    pub fn learning_rate(&self) -> f64 {
        self.optimizer.learning_rate
    }

    pub fn layers(&self) -> &[Layer] {
        &self.layers
    }

    /// Weight matrix of transition `transition`.
    pub fn weights(&self, transition: usize) -> Option<&Matrix> {
        self.layers.get(transition).map(|l| l.weights())
    }

    pub fn biases(&self, transition: usize) -> Option<&[f64]> {
        self.layers.get(transition).map(|l| l.biases())
    }

    /// Stateless inference. Never mutates the network.
    pub fn predict(&self, input: &[f64]) -> Result<Vec<f64>> {
        self.check_input(input)?;

        let mut current = input.to_vec();
        for layer in &self.layers {
            let (_, a) = layer.feed_from(&current)?;
            current = a;
        }
        Ok(current)
    }

    /// Forward pass that records every layer's output and every transition's
    /// weighted sum for a following [`Network::backpropagate`] call.
    pub fn forward(&self, input: &[f64]) -> Result<ForwardState> {
        self.check_input(input)?;

        let mut outputs = Vec::with_capacity(self.layers.len() + 1);
        let mut weighted_sums = Vec::with_capacity(self.layers.len());
        outputs.push(input.to_vec());

        for layer in &self.layers {
            let (z, a) = layer.feed_from(&outputs[outputs.len() - 1])?;
            weighted_sums.push(z);
            outputs.push(a);
        }

        Ok(ForwardState { outputs, weighted_sums })
    }

    /// One backpropagation step against `target` using a recorded forward pass.
    ///
    /// All gradients are computed before any parameter changes; on error the
    /// network is left exactly as it was.
    pub fn backpropagate(&mut self, state: &ForwardState, target: &[f64]) -> Result<()> {
        self.check_target(target)?;
        self.check_state(state)?;

        let n = self.layers.len();
        let mut deltas: Vec<Vec<f64>> = vec![Vec::new(); n];

        // Linear output layer: dL/dz is the raw error.
        deltas[n - 1] = MseLoss::derivative(state.output(), target)?;

        for i in (1..n).rev() {
            deltas[i - 1] = self.layers[i].backpropagate_delta(
                &deltas[i],
                &state.weighted_sums[i - 1],
                self.layers[i - 1].activator(),
            )?;
        }

        let mut updates = Vec::with_capacity(n);
        for (i, layer) in self.layers.iter().enumerate() {
            let grads = layer.compute_gradients(&deltas[i], &state.outputs[i])?;
            updates.push(self.optimizer.step(layer, &grads)?);
        }

        for (layer, (weights, biases)) in self.layers.iter_mut().zip(updates) {
            layer.replace_parameters(weights, biases)?;
        }

        Ok(())
    }

    /// Forward pass plus one backpropagation step on a single sample.
    pub fn train(&mut self, input: &[f64], target: &[f64]) -> Result<()> {
        self.check_target(target)?;
        let state = self.forward(input)?;
        self.backpropagate(&state, target)
    }

    /// Runs online SGD for `epochs` epochs with a fresh shuffle per epoch,
    /// reporting dataset MSE every `report_every` epochs and on the last one.
    ///
    /// Returns the first output of the trained network for every input.
    pub fn train_for_epochs(
        &mut self,
        inputs: &[Vec<f64>],
        targets: &[Vec<f64>],
        epochs: usize,
        report_every: usize,
    ) -> Result<Vec<f64>> {
        let config = TrainConfig::new(epochs, report_every);
        train_loop(self, inputs, targets, &config, &mut rand::thread_rng())
    }

    pub(crate) fn check_input(&self, input: &[f64]) -> Result<()> {
        if input.len() != self.input_size() {
            return Err(NnError::InvalidInput(format!(
                "input has length {}, network expects {}",
                input.len(),
                self.input_size()
            )));
        }
        Ok(())
    }

    pub(crate) fn check_target(&self, target: &[f64]) -> Result<()> {
        if target.len() != self.output_size() {
            return Err(NnError::InvalidInput(format!(
                "target has length {}, network outputs {}",
                target.len(),
                self.output_size()
            )));
        }
        Ok(())
    }

    fn check_state(&self, state: &ForwardState) -> Result<()> {
        let outputs_fit = state.outputs.len() == self.layer_sizes.len()
            && state.outputs.iter().zip(&self.layer_sizes).all(|(o, &w)| o.len() == w);
        let sums_fit = state.weighted_sums.len() == self.layers.len()
            && state.weighted_sums.iter().zip(&self.layer_sizes[1..]).all(|(z, &w)| z.len() == w);

        if !(outputs_fit && sums_fit) {
            return Err(NnError::InvalidInput(format!(
                "forward state does not match network layout {:?}",
                self.layer_sizes
            )));
        }
        Ok(())
    }
}

fn validate_layer_sizes(layer_sizes: &[usize]) -> Result<()> {
    if layer_sizes.len() < 2 {
        return Err(NnError::InvalidConfig(
            "network must have at least an input and an output layer".to_owned(),
        ));
    }
    if layer_sizes.contains(&0) {
        return Err(NnError::InvalidConfig(format!(
            "layer widths must be positive, got {layer_sizes:?}"
        )));
    }
    Ok(())
}

fn activation_for(transition: usize, transitions: usize) -> ActivationFunction {
    if transition + 1 == transitions {
        ActivationFunction::Identity
    } else {
        ActivationFunction::Sigmoid
    }
}
