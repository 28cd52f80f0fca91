/// Logistic function `1 / (1 + e^-x)`.
pub fn sigmoid(x: f64) -> f64 {
    1.0 / (1.0 + (-x).exp())
}

/// Derivative of [`sigmoid`] evaluated at the pre-activation value `x`.
pub fn sigmoid_derivative(x: f64) -> f64 {
    let s = sigmoid(x);
    s * (1.0 - s)
}

/// Activation applied after a layer's weighted sum.
///
/// Hidden layers use `Sigmoid`; the output layer is always `Identity`, so the
/// network produces an unbounded real value suitable for regression.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ActivationFunction {
    Sigmoid,
    Identity,
}

impl ActivationFunction {
    pub fn function(&self, x: f64) -> f64 {
        match self {
            ActivationFunction::Sigmoid => sigmoid(x),
            ActivationFunction::Identity => x,
        }
    }

    /// Element-wise derivative, taken on pre-activation values.
    pub fn derivative(&self, x: f64) -> f64 {
        match self {
            ActivationFunction::Sigmoid => sigmoid_derivative(x),
            ActivationFunction::Identity => 1.0,
        }
    }

    pub fn apply(&self, z: &[f64]) -> Vec<f64> {
        match self {
            ActivationFunction::Identity => z.to_vec(),
            _ => z.iter().map(|&x| self.function(x)).collect(),
        }
    }
}
