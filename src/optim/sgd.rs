use crate::errors::NnError;
use crate::math::matrix::Matrix;

/// Hard-limits `x` to `[-limit, limit]`.
pub fn clamp(x: f64, limit: f64) -> f64 {
    if x > limit {
        return limit;
    }
    if x < -limit {
        return -limit;
    }
    x
}

/// Plain online gradient step with every per-parameter contribution clamped.
///
/// Without the clamp, training on raw pixel inputs diverges to non-finite
/// weights, so the limit is part of the update rule rather than an option.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Sgd {
    pub learning_rate: f64,
    pub clamp_limit: f64,
}

impl Sgd {
    pub const DEFAULT_LEARNING_RATE: f64 = 0.1;
    pub const DEFAULT_CLAMP_LIMIT: f64 = 100.0;

    pub fn new(learning_rate: f64, clamp_limit: f64) -> Result<Sgd, NnError> {
        if !(learning_rate.is_finite() && learning_rate > 0.0) {
            return Err(NnError::InvalidHyperparameter {
                name: "learning_rate",
                value: learning_rate,
            });
        }
        if !(clamp_limit.is_finite() && clamp_limit > 0.0) {
            return Err(NnError::InvalidHyperparameter {
                name: "clamp_limit",
                value: clamp_limit,
            });
        }
        Ok(Sgd {
            learning_rate,
            clamp_limit,
        })
    }

    /// Updates one layer in place:
    /// `w[i][j] += lr * clamp(delta[i] * inputs[j])`, `b[i] += lr * clamp(delta[i])`.
    ///
    /// `delta` is the error signal already pointing towards the target, so the
    /// step is added, not subtracted.
    pub fn step(&self, weights: &mut Matrix, biases: &mut [f64], delta: &[f64], inputs: &[f64]) {
        let lr = self.learning_rate;
        let limit = self.clamp_limit;
        for ((row, b), &d) in weights.data.iter_mut().zip(biases.iter_mut()).zip(delta) {
            for (w, &x) in row.iter_mut().zip(inputs) {
                *w += lr * clamp(d * x, limit);
            }
            *b += lr * clamp(d, limit);
        }
    }
}

impl Default for Sgd {
    fn default() -> Self {
        Sgd {
            learning_rate: Sgd::DEFAULT_LEARNING_RATE,
            clamp_limit: Sgd::DEFAULT_CLAMP_LIMIT,
        }
    }
}
