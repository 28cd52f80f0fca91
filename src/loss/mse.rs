use crate::error::{NnError, Result};
use crate::math::vector;

pub struct MseLoss;

impl MseLoss {
    /// Scalar MSE: mean((predicted - expected)²)
    pub fn loss(predicted: &[f64], expected: &[f64]) -> Result<f64> {
        if predicted.len() != expected.len() {
            return Err(NnError::DimensionMismatch(format!(
                "mse: predicted has length {}, expected has length {}",
                predicted.len(),
                expected.len()
            )));
        }

        let n = predicted.len() as f64;
        let sum = predicted.iter().zip(expected.iter())
            .map(|(a, b)| (a - b).powi(2))
            .sum::<f64>();
        Ok(sum / n)
    }

    /// Per-output gradient: predicted - expected
    ///
    /// The usual factor of 2 is left out; the learning rate absorbs it.
    pub fn derivative(predicted: &[f64], expected: &[f64]) -> Result<Vec<f64>> {
        vector::sub(predicted, expected)
    }
}

pub fn mean_squared_error(predicted: &[f64], expected: &[f64]) -> Result<f64> {
    MseLoss::loss(predicted, expected)
}

pub fn mean_squared_error_derivative(predicted: &[f64], expected: &[f64]) -> Result<Vec<f64>> {
    MseLoss::derivative(predicted, expected)
}
