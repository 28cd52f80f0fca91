use rand::distributions::{Distribution, Uniform};
use rand::Rng;

use crate::error::{NnError, Result};

/// Dense row-major matrix.
///
/// The shape is fixed at construction; every operation that combines two
/// operands checks their shapes and reports a `DimensionMismatch` instead of
/// indexing out of bounds.
#[derive(Debug, Clone, PartialEq)]
pub struct Matrix {
    rows: usize,
    cols: usize,
    data: Vec<Vec<f64>>,
}

impl Matrix {
    pub fn zeros(rows: usize, cols: usize) -> Matrix {
        Matrix {
            rows,
            cols,
            data: vec![vec![0.0; cols]; rows],
        }
    }

    /// Builds a matrix from nested rows. All rows must share one length.
    ///
    /// An empty `data` yields a 0×0 matrix.
    pub fn from_data(data: Vec<Vec<f64>>) -> Result<Matrix> {
        let rows = data.len();
        let cols = data.first().map_or(0, |row| row.len());

        if let Some((i, row)) = data.iter().enumerate().find(|(_, row)| row.len() != cols) {
            return Err(NnError::InvalidConfig(format!(
                "ragged matrix: row {} has {} columns, row 0 has {}",
                i,
                row.len(),
                cols
            )));
        }

        Ok(Matrix { rows, cols, data })
    }

    /// Samples every entry independently from `Uniform(low, high)` and
    /// multiplies it by `scale`.
    pub fn random_uniform<R: Rng + ?Sized>(
        rows: usize,
        cols: usize,
        low: f64,
        high: f64,
        scale: f64,
        rng: &mut R,
    ) -> Matrix {
        let dist = Uniform::new(low, high);
        let data = (0..rows)
            .map(|_| (0..cols).map(|_| dist.sample(rng) * scale).collect())
            .collect();
        Matrix { rows, cols, data }
    }

    pub fn rows(&self) -> usize {
        self.rows
    }

    pub fn cols(&self) -> usize {
        self.cols
    }

    pub fn shape(&self) -> (usize, usize) {
        (self.rows, self.cols)
    }

    pub fn get(&self, row: usize, col: usize) -> Option<f64> {
        self.data.get(row).and_then(|r| r.get(col)).copied()
    }

    pub fn row(&self, row: usize) -> Option<&[f64]> {
        self.data.get(row).map(|r| r.as_slice())
    }

    pub fn to_vec(&self) -> Vec<Vec<f64>> {
        self.data.clone()
    }

    /// Matrix-vector product `self · v`. Requires `v.len() == cols`.
    pub fn mul_vec(&self, v: &[f64]) -> Result<Vec<f64>> {
        if self.cols != v.len() {
            return Err(NnError::DimensionMismatch(format!(
                "cannot multiply {}x{} matrix by vector of length {}",
                self.rows,
                self.cols,
                v.len()
            )));
        }

        let res = self.data.iter()
            .map(|row| {
                let mut sum = 0.0;
                for (w, x) in row.iter().zip(v.iter()) {
                    sum += w * x;
                }
                sum
            })
            .collect();

        Ok(res)
    }

    pub fn transpose(&self) -> Matrix {
        let mut res = Matrix::zeros(self.cols, self.rows);

        for i in 0..res.rows {
            for j in 0..res.cols {
                res.data[i][j] = self.data[j][i];
            }
        }

        res
    }

    /// Outer product `a · bᵀ`, shape `(a.len(), b.len())`.
    pub fn outer(a: &[f64], b: &[f64]) -> Matrix {
        let data = a.iter()
            .map(|x| b.iter().map(|y| x * y).collect())
            .collect();
        Matrix { rows: a.len(), cols: b.len(), data }
    }

    pub fn scale(&self, scalar: f64) -> Matrix {
        self.map(|x| x * scalar)
    }

    pub fn sub(&self, rhs: &Matrix) -> Result<Matrix> {
        if self.shape() != rhs.shape() {
            return Err(NnError::DimensionMismatch(format!(
                "cannot subtract {}x{} matrix from {}x{} matrix",
                rhs.rows, rhs.cols, self.rows, self.cols
            )));
        }

        let data = self.data.iter().zip(rhs.data.iter())
            .map(|(row_a, row_b)| row_a.iter().zip(row_b.iter()).map(|(x, y)| x - y).collect())
            .collect();

        Ok(Matrix { rows: self.rows, cols: self.cols, data })
    }

    pub fn map<F>(&self, functor: F) -> Matrix
    where
        F: Fn(f64) -> f64,
    {
        let data = self.data.iter()
            .map(|row| row.iter().map(|&x| functor(x)).collect())
            .collect();
        Matrix { rows: self.rows, cols: self.cols, data }
    }
}
