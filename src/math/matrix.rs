use rand::Rng;
use rand_distr::StandardNormal;
use serde::{Deserialize, Serialize};

use crate::errors::NnError;

/// Dense row-major matrix.
///
/// Serialized as a plain array of row arrays (`[[w00, w01], [w10, w11]]`), so a
/// saved network reads as a keyed document of nested numbers.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "Vec<Vec<f64>>", into = "Vec<Vec<f64>>")]
pub struct Matrix {
    pub rows: usize,
    pub cols: usize,
    pub data: Vec<Vec<f64>>,
}

impl Matrix {
    pub fn zeros(rows: usize, cols: usize) -> Matrix {
        Matrix {
            rows,
            cols,
            data: vec![vec![0.0; cols]; rows],
        }
    }

    /// Every entry drawn independently from N(0, 1).
    pub fn standard_normal<R: Rng + ?Sized>(rows: usize, cols: usize, rng: &mut R) -> Matrix {
        let mut res = Matrix::zeros(rows, cols);
        for row in res.data.iter_mut() {
            for x in row.iter_mut() {
                *x = rng.sample(StandardNormal);
            }
        }
        res
    }

    /// Builds a matrix from rows, rejecting ragged input.
    pub fn from_data(data: Vec<Vec<f64>>) -> Result<Matrix, NnError> {
        let rows = data.len();
        let cols = data.first().map_or(0, |r| r.len());
        if let Some((row, r)) = data.iter().enumerate().find(|(_, r)| r.len() != cols) {
            return Err(NnError::RaggedMatrix {
                row,
                expected: cols,
                actual: r.len(),
            });
        }
        Ok(Matrix { rows, cols, data })
    }

    /// Checks that `data` really holds `rows` rows of `cols` entries each.
    /// The fields are public, so a struct literal can disagree with itself.
    pub fn check_shape(&self) -> Result<(), NnError> {
        if self.data.len() != self.rows {
            return Err(NnError::DimensionMismatch {
                what: "matrix rows",
                expected: self.rows,
                actual: self.data.len(),
            });
        }
        if let Some((row, r)) = self.data.iter().enumerate().find(|(_, r)| r.len() != self.cols) {
            return Err(NnError::RaggedMatrix {
                row,
                expected: self.cols,
                actual: r.len(),
            });
        }
        Ok(())
    }

    /// `self * v`, where `v` has length `cols`. Each row sum is accumulated
    /// left to right.
    pub fn mul_vec(&self, v: &[f64]) -> Vec<f64> {
        debug_assert_eq!(v.len(), self.cols);
        self.data
            .iter()
            .map(|row| {
                let mut sum = 0.0;
                for (w, x) in row.iter().zip(v) {
                    sum += w * x;
                }
                sum
            })
            .collect()
    }

    pub fn is_finite(&self) -> bool {
        self.data.iter().flatten().all(|x| x.is_finite())
    }
}

impl TryFrom<Vec<Vec<f64>>> for Matrix {
    type Error = NnError;

    fn try_from(data: Vec<Vec<f64>>) -> Result<Self, Self::Error> {
        Matrix::from_data(data)
    }
}

impl From<Matrix> for Vec<Vec<f64>> {
    fn from(m: Matrix) -> Self {
        m.data
    }
}
