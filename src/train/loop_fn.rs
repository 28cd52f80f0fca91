use std::sync::atomic::Ordering;
use std::time::Instant;

use rand::Rng;

use crate::error::{NnError, Result};
use crate::network::network::Network;
use crate::train::epoch_stats::EpochStats;
use crate::train::train_config::TrainConfig;
use crate::train::trainer::{dataset_mse, train_epoch};

// ---------------------------------------------------------------------------
// Public entry point
// ---------------------------------------------------------------------------

/// Trains `network` with online SGD for `config.epochs` epochs and returns
/// one prediction per input sample.
///
/// # Arguments
/// - `network`: mutable reference to the network; modified in place
/// - `inputs`: training samples, each of length `network.input_size()`
/// - `targets`: corresponding targets, same count as `inputs`, each of
///   length `network.output_size()`
/// - `config`: epoch count, reporting interval, optional progress channel
///   and stop flag
/// - `rng`: source for the per-epoch shuffle
///
/// Every epoch reshuffles the sample order and applies one backpropagation
/// step per sample.  Every `config.report_every` epochs, and after the final
/// one, the whole-dataset MSE is measured with `predict`, logged, and sent on
/// `config.progress_tx`.
///
/// The returned predictions keep only the first output of each sample, which
/// is what single-output regression callers consume.
///
/// # Errors
/// The dataset and config are validated up front; on error no training has
/// happened.
pub fn train_loop<R: Rng + ?Sized>(
    network: &mut Network,
    inputs: &[Vec<f64>],
    targets: &[Vec<f64>],
    config: &TrainConfig,
    rng: &mut R,
) -> Result<Vec<f64>> {
    validate_dataset(network, inputs, targets)?;
    if config.report_every == 0 {
        return Err(NnError::InvalidConfig("report interval must be at least 1".to_owned()));
    }

    let t_start = Instant::now();
    let mut last_reported = 0;
    let mut completed = 0;

    for epoch in 1..=config.epochs {
        if stop_requested(config) {
            tracing::info!(epoch = completed, "training stopped early");
            break;
        }

        train_epoch(network, inputs, targets, rng)?;
        completed = epoch;

        if epoch % config.report_every == 0 || epoch == config.epochs {
            report(network, inputs, targets, config, epoch, t_start)?;
            last_reported = epoch;
        }
    }

    // A stopped run still ends on a record for its last completed epoch.
    if completed > 0 && last_reported != completed {
        report(network, inputs, targets, config, completed, t_start)?;
    }

    final_predictions(network, inputs)
}

// ---------------------------------------------------------------------------
// Private helpers
// ---------------------------------------------------------------------------

fn validate_dataset(network: &Network, inputs: &[Vec<f64>], targets: &[Vec<f64>]) -> Result<()> {
    if inputs.is_empty() {
        return Err(NnError::InvalidInput("dataset must not be empty".to_owned()));
    }
    if inputs.len() != targets.len() {
        return Err(NnError::InvalidInput(format!(
            "dataset has {} inputs but {} targets",
            inputs.len(),
            targets.len()
        )));
    }
    for (input, target) in inputs.iter().zip(targets.iter()) {
        network.check_input(input)?;
        network.check_target(target)?;
    }
    Ok(())
}

fn stop_requested(config: &TrainConfig) -> bool {
    config.stop_flag
        .as_ref()
        .is_some_and(|flag| flag.load(Ordering::Relaxed))
}

fn report(
    network: &Network,
    inputs: &[Vec<f64>],
    targets: &[Vec<f64>],
    config: &TrainConfig,
    epoch: usize,
    t_start: Instant,
) -> Result<()> {
    let mse = dataset_mse(network, inputs, targets)?;

    if mse.is_finite() {
        tracing::info!(epoch, total_epochs = config.epochs, mse, "epoch complete");
    } else {
        tracing::warn!(epoch, mse, "dataset loss is no longer finite; consider a smaller learning rate");
    }

    let stats = EpochStats {
        epoch,
        total_epochs: config.epochs,
        mse,
        elapsed_ms: t_start.elapsed().as_millis() as u64,
    };

    if let Some(ref tx) = config.progress_tx {
        if tx.send(stats).is_err() {
            tracing::debug!(epoch, "progress receiver dropped");
        }
    }

    Ok(())
}

/// First output of the network for each input.
fn final_predictions(network: &Network, inputs: &[Vec<f64>]) -> Result<Vec<f64>> {
    inputs.iter()
        .map(|input| {
            let prediction = network.predict(input)?;
            Ok(prediction.first().copied().unwrap_or(f64::NAN))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::AtomicBool;
    use std::sync::{mpsc, Arc};
    use std::thread;
    use rand::rngs::StdRng;
    use rand::{RngCore, SeedableRng};

    /// Raises `flag` as soon as the first epoch asks for a shuffle.
    struct StopDuringFirstEpoch {
        inner: StdRng,
        flag: Arc<AtomicBool>,
    }

    impl RngCore for StopDuringFirstEpoch {
        fn next_u32(&mut self) -> u32 {
            self.flag.store(true, Ordering::Relaxed);
            self.inner.next_u32()
        }

        fn next_u64(&mut self) -> u64 {
            self.flag.store(true, Ordering::Relaxed);
            self.inner.next_u64()
        }

        fn fill_bytes(&mut self, dest: &mut [u8]) {
            self.flag.store(true, Ordering::Relaxed);
            self.inner.fill_bytes(dest)
        }

        fn try_fill_bytes(&mut self, dest: &mut [u8]) -> std::result::Result<(), rand::Error> {
            self.flag.store(true, Ordering::Relaxed);
            self.inner.try_fill_bytes(dest)
        }
    }

    fn dataset() -> (Vec<Vec<f64>>, Vec<Vec<f64>>) {
        (
            vec![vec![0.0], vec![0.5], vec![1.0]],
            vec![vec![0.0], vec![0.25], vec![1.0]],
        )
    }

    fn collect_reports(epochs: usize, report_every: usize) -> Vec<EpochStats> {
        let (inputs, targets) = dataset();
        let mut net = Network::new_with_seed(&[1, 3, 1], 0.4, 1).unwrap();
        let (tx, rx) = mpsc::channel();
        let config = TrainConfig::new(epochs, report_every).with_progress(tx);
        train_loop(&mut net, &inputs, &targets, &config, &mut StdRng::seed_from_u64(1)).unwrap();
        drop(config);
        rx.iter().collect()
    }

    #[test]
    fn reports_on_interval_and_final_epoch() {
        let epochs: Vec<usize> = collect_reports(7, 3).iter().map(|s| s.epoch).collect();
        assert_eq!(epochs, vec![3, 6, 7]);
    }

    #[test]
    fn aligned_final_epoch_is_reported_once() {
        let epochs: Vec<usize> = collect_reports(6, 3).iter().map(|s| s.epoch).collect();
        assert_eq!(epochs, vec![3, 6]);
    }

    #[test]
    fn zero_epochs_trains_nothing_and_reports_nothing() {
        let (inputs, targets) = dataset();
        let mut net = Network::new_with_seed(&[1, 3, 1], 0.4, 1).unwrap();
        let before = net.clone();
        let (tx, rx) = mpsc::channel();
        let config = TrainConfig::new(0, 10).with_progress(tx);
        let preds = train_loop(&mut net, &inputs, &targets, &config, &mut StdRng::seed_from_u64(1)).unwrap();
        drop(config);
        assert_eq!(preds.len(), 3);
        assert_eq!(net.weights(0), before.weights(0));
        assert_eq!(rx.iter().count(), 0);
    }

    #[test]
    fn rejects_mismatched_dataset_before_training() {
        let mut net = Network::new_with_seed(&[1, 2, 1], 0.1, 1).unwrap();
        let before = net.clone();
        let res = train_loop(
            &mut net,
            &[vec![0.0]],
            &[vec![0.0], vec![1.0]],
            &TrainConfig::new(1, 10),
            &mut StdRng::seed_from_u64(1),
        );
        assert!(matches!(res, Err(NnError::InvalidInput(_))));
        assert_eq!(net.weights(0), before.weights(0));
    }

    #[test]
    fn rejects_badly_shaped_sample_before_training() {
        let mut net = Network::new_with_seed(&[1, 2, 1], 0.1, 1).unwrap();
        let before = net.clone();
        let res = train_loop(
            &mut net,
            &[vec![0.0], vec![1.0, 2.0]],
            &[vec![0.0], vec![1.0]],
            &TrainConfig::new(3, 1),
            &mut StdRng::seed_from_u64(1),
        );
        assert!(res.is_err());
        assert_eq!(net.biases(1), before.biases(1));
    }

    #[test]
    fn rejects_empty_dataset_and_zero_interval() {
        let mut net = Network::new_with_seed(&[1, 2, 1], 0.1, 1).unwrap();
        let mut rng = StdRng::seed_from_u64(1);
        assert!(train_loop(&mut net, &[], &[], &TrainConfig::new(1, 1), &mut rng).is_err());

        let (inputs, targets) = dataset();
        let res = train_loop(&mut net, &inputs, &targets, &TrainConfig::new(1, 0), &mut rng);
        assert!(matches!(res, Err(NnError::InvalidConfig(_))));
    }

    #[test]
    fn stop_flag_halts_before_first_epoch() {
        let (inputs, targets) = dataset();
        let mut net = Network::new_with_seed(&[1, 3, 1], 0.4, 1).unwrap();
        let before = net.clone();
        let flag = Arc::new(AtomicBool::new(true));
        let config = TrainConfig::new(50, 10).with_stop_flag(flag);
        let preds = train_loop(&mut net, &inputs, &targets, &config, &mut StdRng::seed_from_u64(1)).unwrap();
        assert_eq!(preds.len(), 3);
        assert_eq!(net.weights(1), before.weights(1));
    }

    #[test]
    fn stopped_run_reports_its_last_completed_epoch() {
        let (inputs, targets) = dataset();
        let mut net = Network::new_with_seed(&[1, 3, 1], 0.4, 1).unwrap();
        let before = net.clone();
        let flag = Arc::new(AtomicBool::new(false));
        let (tx, rx) = mpsc::channel();
        let config = TrainConfig::new(50, 5)
            .with_progress(tx)
            .with_stop_flag(Arc::clone(&flag));
        let mut rng = StopDuringFirstEpoch { inner: StdRng::seed_from_u64(1), flag };

        let preds = train_loop(&mut net, &inputs, &targets, &config, &mut rng).unwrap();
        drop(config);
        let records: Vec<EpochStats> = rx.iter().collect();

        // Epoch 1 ran to completion, then the loop stopped before epoch 2.
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].epoch, 1);
        assert_eq!(records[0].total_epochs, 50);
        assert_eq!(records[0].mse, dataset_mse(&net, &inputs, &targets).unwrap());
        assert_ne!(net.weights(0), before.weights(0));
        assert_eq!(preds.len(), 3);
    }

    #[test]
    fn stop_from_progress_receiver_ends_on_final_state() {
        let (inputs, targets) = dataset();
        let mut net = Network::new_with_seed(&[1, 3, 1], 0.4, 1).unwrap();
        let flag = Arc::new(AtomicBool::new(false));
        let (tx, rx) = mpsc::channel();
        let config = TrainConfig::new(1_000_000, 4)
            .with_progress(tx)
            .with_stop_flag(Arc::clone(&flag));

        let records: Vec<EpochStats> = thread::scope(|s| {
            let (net_ref, xs, ys) = (&mut net, &inputs, &targets);
            let worker = s.spawn(move || {
                train_loop(net_ref, xs, ys, &config, &mut StdRng::seed_from_u64(1))
            });

            let mut records = Vec::new();
            for stats in rx.iter() {
                flag.store(true, Ordering::Relaxed);
                records.push(stats);
            }
            assert_eq!(worker.join().unwrap().unwrap().len(), 3);
            records
        });

        let epochs: Vec<usize> = records.iter().map(|r| r.epoch).collect();
        assert!(epochs.windows(2).all(|w| w[0] < w[1]), "repeated record in {epochs:?}");
        assert!(epochs[..epochs.len() - 1].iter().all(|e| e % 4 == 0));

        let last = records.last().unwrap();
        assert!(last.epoch < 1_000_000);
        assert_eq!(last.mse, dataset_mse(&net, &inputs, &targets).unwrap());
    }

    #[test]
    fn dropped_receiver_does_not_stop_training() {
        let (inputs, targets) = dataset();
        let mut net = Network::new_with_seed(&[1, 3, 1], 0.4, 1).unwrap();
        let (tx, rx) = mpsc::channel();
        drop(rx);
        let config = TrainConfig::new(5, 1).with_progress(tx);
        let preds = train_loop(&mut net, &inputs, &targets, &config, &mut StdRng::seed_from_u64(1));
        assert_eq!(preds.unwrap().len(), 3);
    }

    #[test]
    fn seeded_runs_are_reproducible() {
        let a = collect_reports(20, 5);
        let b = collect_reports(20, 5);
        let mses_a: Vec<f64> = a.iter().map(|s| s.mse).collect();
        let mses_b: Vec<f64> = b.iter().map(|s| s.mse).collect();
        assert_eq!(mses_a, mses_b);
    }
}
