use rand::seq::SliceRandom;
use rand::Rng;

use crate::error::Result;
use crate::loss::mse::MseLoss;
use crate::network::network::Network;

/// One epoch of online SGD: visits every sample once in a freshly shuffled
/// order and applies a full backpropagation step after each one.
///
/// `inputs` and `targets` are never reordered; only an index permutation is
/// shuffled.
pub fn train_epoch<R: Rng + ?Sized>(
    network: &mut Network,
    inputs: &[Vec<f64>],
    targets: &[Vec<f64>],
    rng: &mut R,
) -> Result<()> {
    let mut indices: Vec<usize> = (0..inputs.len()).collect();
    indices.shuffle(rng);

    for idx in indices {
        network.train(&inputs[idx], &targets[idx])?;
    }

    Ok(())
}

/// Mean of per-sample MSE over the dataset, using stateless `predict`.
pub fn dataset_mse(network: &Network, inputs: &[Vec<f64>], targets: &[Vec<f64>]) -> Result<f64> {
    let mut total = 0.0;
    for (input, target) in inputs.iter().zip(targets.iter()) {
        let prediction = network.predict(input)?;
        total += MseLoss::loss(&prediction, target)?;
    }
    Ok(total / inputs.len() as f64)
}
