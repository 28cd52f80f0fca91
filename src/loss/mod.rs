pub mod mse;

pub use mse::{MseLoss, mean_squared_error, mean_squared_error_derivative};
