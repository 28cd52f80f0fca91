use ferrite_mlp::{Network, TrainConfig, train_loop};
use rand::rngs::StdRng;
use rand::SeedableRng;

fn main() {
    tracing_subscriber::fmt().init();

    let mut rng = StdRng::seed_from_u64(7);
    let mut network = Network::new_with_rng(&[1, 5, 1], 0.05, &mut rng)
        .expect("valid layer sizes");

    // y = x² sampled on [0, 1]
    let inputs: Vec<Vec<f64>> = (0..=10).map(|i| vec![i as f64 / 10.0]).collect();
    let targets: Vec<Vec<f64>> = inputs.iter().map(|x| vec![x[0] * x[0]]).collect();

    let config = TrainConfig::new(2000, 200);
    let predictions = train_loop(&mut network, &inputs, &targets, &config, &mut rng)
        .expect("dataset matches network shape");

    for (input, prediction) in inputs.iter().zip(&predictions) {
        println!("x = {:.1} -> {prediction:.4} (target {:.4})", input[0], input[0] * input[0]);
    }
}
