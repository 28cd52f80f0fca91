use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::{Serialize, Deserialize};

use crate::error::Result;
use crate::network::network::Network;
use crate::train::train_config::TrainConfig;

fn default_report_every() -> usize {
    10
}

/// A serializable description of a network architecture plus the
/// hyperparameters used to train it.
///
/// Only the recipe is stored, never trained weights: building the same spec
/// twice yields two freshly initialized networks (identical ones when `seed`
/// is set).
///
/// ```json
/// { "name": "curve", "layer_sizes": [1, 5, 1], "learning_rate": 0.05,
///   "epochs": 1000, "report_every": 100, "seed": 7 }
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NetworkSpec {
    /// Human-readable label, used in log lines only.
    #[serde(default)]
    pub name: String,
    /// Layer widths, input first and output last.
    pub layer_sizes: Vec<usize>,
    pub learning_rate: f64,
    pub epochs: usize,
    #[serde(default = "default_report_every")]
    pub report_every: usize,
    /// Seed for initialization and shuffling; `None` draws from the thread RNG.
    #[serde(default)]
    pub seed: Option<u64>,
}

impl NetworkSpec {
    /// Serializes the spec to a pretty-printed JSON file.
    pub fn save_json(&self, path: &str) -> Result<()> {
        let file = std::fs::File::create(path)?;
        let writer = std::io::BufWriter::new(file);
        serde_json::to_writer_pretty(writer, self)?;
        Ok(())
    }

    /// Deserializes a `NetworkSpec` from a JSON file.
    pub fn load_json(path: &str) -> Result<NetworkSpec> {
        let file = std::fs::File::open(path)?;
        let reader = std::io::BufReader::new(file);
        Ok(serde_json::from_reader(reader)?)
    }

    /// RNG for this run: seeded when `seed` is set, from entropy otherwise.
    ///
    /// Pass the same generator to `build_with_rng` and then to `train_loop`
    /// to make a whole run reproducible.
    pub fn rng(&self) -> StdRng {
        match self.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        }
    }

    /// Constructs a freshly initialized network for this spec.
    pub fn build(&self) -> Result<Network> {
        self.build_with_rng(&mut self.rng())
    }

    pub fn build_with_rng<R: Rng + ?Sized>(&self, rng: &mut R) -> Result<Network> {
        Network::new_with_rng(&self.layer_sizes, self.learning_rate, rng)
    }

    pub fn train_config(&self) -> TrainConfig {
        TrainConfig::new(self.epochs, self.report_every)
    }
}
