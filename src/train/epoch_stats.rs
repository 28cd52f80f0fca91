use serde::{Serialize, Deserialize};

/// Progress record emitted by `train_loop` at each reporting point.
///
/// Records arrive in increasing `epoch` order and the last one always
/// describes the final completed epoch.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EpochStats {
    /// 1-based epoch number.
    pub epoch: usize,
    /// Total epochs requested for this run.
    pub total_epochs: usize,
    /// Mean squared error over the whole dataset, measured with `predict`
    /// after this epoch's updates.
    pub mse: f64,
    /// Wall-clock time since training started, in milliseconds.
    pub elapsed_ms: u64,
}

impl std::fmt::Display for EpochStats {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "epoch={},mse={}", self.epoch, self.mse)
    }
}
