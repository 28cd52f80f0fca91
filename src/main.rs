//! Command-line front end for ferrite-mlp.
//!
//! Reads two comma-separated lines from stdin (X then Y), trains a network
//! with one input and one output, streams progress as `epoch=<n>,mse=<v>`
//! lines and finishes with a summary:
//!
//! ```text
//! training_time_ms=<ms>
//! final_mse=<mse of the returned predictions against Y>
//! nn_predictions=<p1>,<p2>,...
//! ```
//!
//! Example:
//!
//! ```text
//! printf '0,0.5,1\n0,0.25,1\n' | ferrite-mlp train-predict 1-5-1 0.05 1000
//! ```

use std::io::BufRead;
use std::sync::mpsc;
use std::thread;
use std::time::Instant;

use anyhow::{anyhow, bail, Context, Result};
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use ferrite_mlp::{mean_squared_error, train_loop, NetworkSpec};

#[derive(Parser)]
#[command(name = "ferrite-mlp")]
#[command(about = "Train a small sigmoid MLP on stdin data", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Log level for diagnostics written to stderr
    #[arg(short, long, default_value = "warn")]
    log_level: String,
}

#[derive(Subcommand)]
enum Commands {
    /// Train on X/Y read from stdin and print predictions for X
    TrainPredict {
        /// Layer widths separated by '-', e.g. 1-5-1
        #[arg(required_unless_present = "config")]
        layers: Option<String>,

        /// SGD learning rate
        #[arg(required_unless_present = "config", allow_negative_numbers = true)]
        learning_rate: Option<f64>,

        /// Number of epochs
        #[arg(required_unless_present = "config")]
        epochs: Option<usize>,

        /// Report dataset MSE every N epochs
        #[arg(long, default_value_t = 10)]
        report_every: usize,

        /// Seed for initialization and shuffling
        #[arg(long)]
        seed: Option<u64>,

        /// Load all hyperparameters from a JSON network spec instead
        #[arg(long, conflicts_with_all = ["layers", "learning_rate", "epochs", "report_every", "seed"])]
        config: Option<String>,
    },
}

fn main() {
    let cli = Cli::parse();

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(&cli.log_level))
        .with_writer(std::io::stderr)
        .init();

    if let Err(e) = run(cli.command) {
        eprintln!("Error: {e:#}");
        std::process::exit(1);
    }
}

fn run(command: Commands) -> Result<()> {
    match command {
        Commands::TrainPredict { layers, learning_rate, epochs, report_every, seed, config } => {
            let spec = match config {
                Some(path) => NetworkSpec::load_json(&path)
                    .with_context(|| format!("failed to load network spec from {path}"))?,
                None => NetworkSpec {
                    name: "cli".to_owned(),
                    layer_sizes: parse_layer_sizes(layers.as_deref().unwrap_or_default())?,
                    learning_rate: learning_rate.unwrap_or_default(),
                    epochs: epochs.unwrap_or_default(),
                    report_every,
                    seed,
                },
            };
            train_predict(&spec)
        }
    }
}

fn train_predict(spec: &NetworkSpec) -> Result<()> {
    if spec.epochs == 0 {
        bail!("epochs must be at least 1");
    }
    if spec.layer_sizes.first() != Some(&1) || spec.layer_sizes.last() != Some(&1) {
        bail!("input and output layers must have width 1, got {:?}", spec.layer_sizes);
    }

    let stdin = std::io::stdin();
    let mut lines = stdin.lock().lines();
    let x = parse_vector(&lines.next().transpose()?.unwrap_or_default())
        .context("failed to parse X line")?;
    let y = parse_vector(&lines.next().transpose()?.unwrap_or_default())
        .context("failed to parse Y line")?;

    if x.is_empty() || y.is_empty() {
        bail!("expected two non-empty comma-separated lines on stdin");
    }
    if x.len() != y.len() {
        bail!("X has {} values but Y has {}", x.len(), y.len());
    }

    let inputs: Vec<Vec<f64>> = x.iter().map(|&v| vec![v]).collect();
    let targets: Vec<Vec<f64>> = y.iter().map(|&v| vec![v]).collect();

    let mut rng = spec.rng();
    let mut network = spec.build_with_rng(&mut rng)?;
    tracing::info!(name = %spec.name, layers = ?spec.layer_sizes, epochs = spec.epochs, "training");

    let (tx, rx) = mpsc::channel();
    let config = spec.train_config().with_progress(tx);

    let started = Instant::now();
    let worker = thread::spawn(move || {
        train_loop(&mut network, &inputs, &targets, &config, &mut rng)
    });

    // Ends once the worker drops `config` and with it the sender.
    for stats in rx {
        println!("{stats}");
    }

    let predictions = worker.join().map_err(|_| anyhow!("training thread panicked"))??;
    let elapsed_ms = started.elapsed().as_millis();
    let final_mse = mean_squared_error(&predictions, &y)?;

    print!("{}", summary(elapsed_ms, final_mse, &predictions));
    Ok(())
}

/// The three closing lines printed after training.
fn summary(elapsed_ms: u128, final_mse: f64, predictions: &[f64]) -> String {
    let joined: Vec<String> = predictions.iter().map(|p| p.to_string()).collect();
    format!(
        "training_time_ms={elapsed_ms}\nfinal_mse={final_mse}\nnn_predictions={}\n",
        joined.join(",")
    )
}

/// Parses `1-5-1` style layer lists. Empty segments are skipped.
fn parse_layer_sizes(s: &str) -> Result<Vec<usize>> {
    let sizes = s.split('-')
        .filter(|item| !item.is_empty())
        .map(|item| -> Result<usize> {
            let size: usize = item.trim().parse()
                .with_context(|| format!("invalid layer size '{item}'"))?;
            if size == 0 {
                bail!("layer size cannot be zero");
            }
            Ok(size)
        })
        .collect::<Result<Vec<usize>>>()?;

    if sizes.len() < 2 {
        bail!("need at least an input and an output layer (e.g. '1-1'), got '{s}'");
    }
    Ok(sizes)
}

/// Parses one comma-separated line of finite numbers.
///
/// Only the line as a whole is trimmed. Inside it, whitespace may lead a
/// value but not trail it, so `1, 2` parses while `1 ,2` does not.
fn parse_vector(line: &str) -> Result<Vec<f64>> {
    let line = line.trim();
    if line.is_empty() {
        return Ok(Vec::new());
    }

    line.split(',')
        .map(|item| -> Result<f64> {
            let value: f64 = item.trim_start().parse()
                .with_context(|| format!("invalid numeric value '{item}'"))?;
            if !value.is_finite() {
                bail!("non-finite value '{item}'");
            }
            Ok(value)
        })
        .collect()
}
