use std::sync::mpsc;
use std::sync::{Arc, atomic::AtomicBool};

use crate::train::epoch_stats::EpochStats;

/// Configuration for a `train_loop` run.
///
/// # Fields
/// - `epochs`: total number of full passes over the training data
/// - `report_every`: dataset MSE is measured and reported every this many
///   epochs, and always after the last epoch; must be > 0
/// - `progress_tx`: optional channel sender; one `EpochStats` is sent per
///   reporting point.  A dropped receiver is ignored.
/// - `stop_flag`: optional atomic flag; when set to `true` from another
///   thread the loop stops before starting the next epoch.
#[derive(Debug, Clone)]
pub struct TrainConfig {
    pub epochs: usize,
    pub report_every: usize,
    pub progress_tx: Option<mpsc::Sender<EpochStats>>,
    pub stop_flag: Option<Arc<AtomicBool>>,
}

impl TrainConfig {
    /// Creates a minimal `TrainConfig` with no progress channel and no stop flag.
    pub fn new(epochs: usize, report_every: usize) -> Self {
        TrainConfig {
            epochs,
            report_every,
            progress_tx: None,
            stop_flag: None,
        }
    }

    pub fn with_progress(mut self, tx: mpsc::Sender<EpochStats>) -> Self {
        self.progress_tx = Some(tx);
        self
    }

    pub fn with_stop_flag(mut self, flag: Arc<AtomicBool>) -> Self {
        self.stop_flag = Some(flag);
        self
    }
}

impl Default for TrainConfig {
    fn default() -> Self {
        TrainConfig::new(10, 10)
    }
}
