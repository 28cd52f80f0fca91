pub mod error;
pub mod math;
pub mod activation;
pub mod layers;
pub mod network;
pub mod loss;
pub mod optim;
pub mod train;

// Convenience re-exports
pub use error::{NnError, Result};
pub use math::matrix::Matrix;
pub use activation::activation::{ActivationFunction, sigmoid, sigmoid_derivative};
pub use layers::dense::Layer;
pub use network::{ForwardState, Network, NetworkSpec};
pub use loss::mse::{MseLoss, mean_squared_error, mean_squared_error_derivative};
pub use optim::sgd::Sgd;
pub use train::{EpochStats, TrainConfig, train_loop};
