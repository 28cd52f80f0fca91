use rand::Rng;

use crate::activation::activation::ActivationFunction;
use crate::error::{NnError, Result};
use crate::math::{matrix::Matrix, vector};

/// One transition between two adjacent layers.
///
/// `weights` has shape `(size, input_size)`, so the weighted sum is
/// `z = W · a_prev + b` with `a_prev` a column vector.
#[derive(Debug, Clone)]
pub struct Layer {
    weights: Matrix,
    biases: Vec<f64>,
    activator: ActivationFunction,
}

/// Gradients for a single layer, matching its parameter shapes.
#[derive(Debug, Clone)]
pub struct LayerGradients {
    pub weights: Matrix,
    pub biases: Vec<f64>,
}

impl Layer {
    /// Randomly initialized layer.
    ///
    /// Weights are `Uniform(-0.5, 0.5) * sqrt(1 / input_size)`; biases are
    /// `Uniform(0.0, 0.1)`.
    pub fn random<R: Rng + ?Sized>(
        size: usize,
        input_size: usize,
        activation: ActivationFunction,
        rng: &mut R,
    ) -> Layer {
        let fan_in_scale = (1.0 / input_size as f64).sqrt();
        let weights = Matrix::random_uniform(size, input_size, -0.5, 0.5, fan_in_scale, rng);
        let biases = (0..size).map(|_| rng.gen_range(0.0..0.1)).collect();

        Layer {
            weights,
            biases,
            activator: activation,
        }
    }

    /// Layer with explicit parameters. `biases.len()` must equal `weights.rows()`.
    pub fn from_parameters(
        weights: Matrix,
        biases: Vec<f64>,
        activation: ActivationFunction,
    ) -> Result<Layer> {
        if weights.rows() != biases.len() {
            return Err(NnError::InvalidConfig(format!(
                "layer has {} weight rows but {} biases",
                weights.rows(),
                biases.len()
            )));
        }

        Ok(Layer {
            weights,
            biases,
            activator: activation,
        })
    }

    pub fn size(&self) -> usize {
        self.weights.rows()
    }

    pub fn input_size(&self) -> usize {
        self.weights.cols()
    }

    pub fn weights(&self) -> &Matrix {
        &self.weights
    }

    pub fn biases(&self) -> &[f64] {
        &self.biases
    }

    pub fn activator(&self) -> ActivationFunction {
        self.activator
    }

    /// Computes `(z, a)`: the weighted sum and its activation.
    pub fn feed_from(&self, input: &[f64]) -> Result<(Vec<f64>, Vec<f64>)> {
        let z = vector::add(&self.weights.mul_vec(input)?, &self.biases)?;
        let a = self.activator.apply(&z);
        Ok((z, a))
    }

    /// Gradients for this layer given its delta (∂L/∂z) and the activation
    /// that fed it: `dW = delta · inputsᵀ`, `db = delta`.
    pub fn compute_gradients(&self, delta: &[f64], inputs: &[f64]) -> Result<LayerGradients> {
        if delta.len() != self.size() || inputs.len() != self.input_size() {
            return Err(NnError::DimensionMismatch(format!(
                "gradients for {}x{} layer from delta of length {} and input of length {}",
                self.size(),
                self.input_size(),
                delta.len(),
                inputs.len()
            )));
        }

        Ok(LayerGradients {
            weights: Matrix::outer(delta, inputs),
            biases: delta.to_vec(),
        })
    }

    /// Propagates this layer's delta back to the producer layer:
    /// `(Wᵀ · delta) ⊙ f'(z_prev)`, where `f` is the producer's activation.
    pub fn backpropagate_delta(
        &self,
        delta: &[f64],
        prev_weighted_sum: &[f64],
        prev_activation: ActivationFunction,
    ) -> Result<Vec<f64>> {
        let propagated = self.weights.transpose().mul_vec(delta)?;
        let act_derivative: Vec<f64> = prev_weighted_sum.iter()
            .map(|&z| prev_activation.derivative(z))
            .collect();
        vector::hadamard(&propagated, &act_derivative)
    }

    /// Swaps in new parameters of identical shape.
    pub fn replace_parameters(&mut self, weights: Matrix, biases: Vec<f64>) -> Result<()> {
        if weights.shape() != self.weights.shape() || biases.len() != self.biases.len() {
            return Err(NnError::DimensionMismatch(format!(
                "replacement parameters {}x{} / {} do not fit {}x{} layer",
                weights.rows(),
                weights.cols(),
                biases.len(),
                self.size(),
                self.input_size()
            )));
        }
        self.weights = weights;
        self.biases = biases;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn random_layer_has_consumer_by_producer_shape() {
        let mut rng = StdRng::seed_from_u64(1);
        let layer = Layer::random(3, 4, ActivationFunction::Sigmoid, &mut rng);
        assert_eq!(layer.weights().shape(), (3, 4));
        assert_eq!(layer.biases().len(), 3);
        assert!(layer.biases().iter().all(|b| (0.0..0.1).contains(b)));
    }

    #[test]
    fn feed_from_applies_activation_after_weighted_sum() {
        let weights = Matrix::from_data(vec![vec![1.0, -1.0]]).unwrap();
        let layer = Layer::from_parameters(weights, vec![0.5], ActivationFunction::Identity).unwrap();
        let (z, a) = layer.feed_from(&[2.0, 1.0]).unwrap();
        assert_eq!(z, vec![1.5]);
        assert_eq!(a, vec![1.5]);
    }

    #[test]
    fn feed_from_rejects_wrong_input_length() {
        let layer = Layer::from_parameters(Matrix::zeros(2, 3), vec![0.0; 2], ActivationFunction::Sigmoid).unwrap();
        assert!(layer.feed_from(&[1.0]).is_err());
    }

    #[test]
    fn from_parameters_rejects_bias_mismatch() {
        let res = Layer::from_parameters(Matrix::zeros(2, 3), vec![0.0; 3], ActivationFunction::Sigmoid);
        assert!(matches!(res, Err(NnError::InvalidConfig(_))));
    }

    #[test]
    fn gradients_are_outer_product_and_delta() {
        let layer = Layer::from_parameters(Matrix::zeros(2, 1), vec![0.0; 2], ActivationFunction::Sigmoid).unwrap();
        let grads = layer.compute_gradients(&[0.5, -1.0], &[2.0]).unwrap();
        assert_eq!(grads.weights.to_vec(), vec![vec![1.0], vec![-2.0]]);
        assert_eq!(grads.biases, vec![0.5, -1.0]);
    }
}
