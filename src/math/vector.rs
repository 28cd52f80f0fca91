//! Element-wise helpers over plain `f64` slices.
//!
//! Vectors stay as `Vec<f64>` throughout the crate; these functions only add
//! the length check the callers would otherwise repeat.

use crate::error::{NnError, Result};

fn check_lengths(op: &str, a: &[f64], b: &[f64]) -> Result<()> {
    if a.len() != b.len() {
        return Err(NnError::DimensionMismatch(format!(
            "{op}: vectors have lengths {} and {}",
            a.len(),
            b.len()
        )));
    }
    Ok(())
}

pub fn add(a: &[f64], b: &[f64]) -> Result<Vec<f64>> {
    check_lengths("add", a, b)?;
    Ok(a.iter().zip(b.iter()).map(|(x, y)| x + y).collect())
}

pub fn sub(a: &[f64], b: &[f64]) -> Result<Vec<f64>> {
    check_lengths("sub", a, b)?;
    Ok(a.iter().zip(b.iter()).map(|(x, y)| x - y).collect())
}

/// Element-wise (Hadamard) product.
pub fn hadamard(a: &[f64], b: &[f64]) -> Result<Vec<f64>> {
    check_lengths("hadamard", a, b)?;
    Ok(a.iter().zip(b.iter()).map(|(x, y)| x * y).collect())
}

pub fn scale(v: &[f64], scalar: f64) -> Vec<f64> {
    v.iter().map(|x| x * scalar).collect()
}
