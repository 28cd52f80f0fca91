use crate::error::{NnError, Result};
use crate::layers::dense::{Layer, LayerGradients};
use crate::math::{matrix::Matrix, vector};

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Sgd {
    pub learning_rate: f64,
}

impl Sgd {
    /// Any finite learning rate is accepted. A non-positive one never
    /// descends the loss, so it is logged but still honoured.
    pub fn new(learning_rate: f64) -> Result<Sgd> {
        if !learning_rate.is_finite() {
            return Err(NnError::InvalidConfig(format!(
                "learning rate must be finite, got {learning_rate}"
            )));
        }
        if learning_rate <= 0.0 {
            tracing::warn!(learning_rate, "learning rate is not positive; training will not reduce the loss");
        }
        Ok(Sgd { learning_rate })
    }

    /// Parameters after one SGD step: `W - lr·dW`, `b - lr·db`.
    ///
    /// The layer itself is left untouched so the caller can commit every
    /// layer's update together.
    pub fn step(&self, layer: &Layer, grads: &LayerGradients) -> Result<(Matrix, Vec<f64>)> {
        let weights = layer.weights().sub(&grads.weights.scale(self.learning_rate))?;
        let biases = vector::sub(layer.biases(), &vector::scale(&grads.biases, self.learning_rate))?;
        Ok((weights, biases))
    }
}
