/// Everything a stateful forward pass records for backpropagation.
///
/// `outputs[0]` is the input itself and `outputs[i + 1]` is the activation
/// produced by transition `i`. `weighted_sums[i]` is transition `i`'s
/// pre-activation vector. A state is tied to the input it was computed from;
/// hand it to `Network::backpropagate` together with that input's target.
#[derive(Debug, Clone, PartialEq)]
pub struct ForwardState {
    pub(crate) outputs: Vec<Vec<f64>>,
    pub(crate) weighted_sums: Vec<Vec<f64>>,
}

impl ForwardState {
    /// The network's prediction for the recorded input.
    pub fn output(&self) -> &[f64] {
        self.outputs.last().map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn input(&self) -> &[f64] {
        self.outputs.first().map(Vec::as_slice).unwrap_or(&[])
    }

    /// Post-activation vector of layer `layer` (0 = input layer).
    pub fn layer_output(&self, layer: usize) -> Option<&[f64]> {
        self.outputs.get(layer).map(|v| v.as_slice())
    }

    /// Pre-activation vector of transition `transition`.
    pub fn weighted_sum(&self, transition: usize) -> Option<&[f64]> {
        self.weighted_sums.get(transition).map(|v| v.as_slice())
    }
}
