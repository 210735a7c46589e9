use crate::errors::NnError;
use crate::loss::mse::MseLoss;
use crate::network::network::{argmax, NeuralNetwork};
use crate::train::trainer::check_pairs;

/// Classification results over a dataset.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Evaluation {
    /// Samples whose predicted class differs from the target's class.
    pub errors: usize,
    pub total: usize,
    /// Mean over samples of Σ (target - output)².
    pub mean_loss: f64,
}

impl Evaluation {
    /// Fraction of samples classified correctly, in [0, 1].
    pub fn accuracy(&self) -> f64 {
        1.0 - self.errors as f64 / self.total as f64
    }
}

/// Predicts every sample and compares argmax(output) against argmax(target).
pub fn evaluate(
    network: &NeuralNetwork,
    inputs: &[Vec<f64>],
    targets: &[Vec<f64>],
) -> Result<Evaluation, NnError> {
    check_pairs(inputs, targets)?;

    let mut errors = 0;
    let mut total_loss = 0.0;
    for (input, target) in inputs.iter().zip(targets.iter()) {
        let output = network.predict(input)?;
        if argmax(&output) != argmax(target) {
            errors += 1;
        }
        total_loss += MseLoss::sum_squared(&output, target);
    }

    Ok(Evaluation {
        errors,
        total: inputs.len(),
        mean_loss: total_loss / inputs.len() as f64,
    })
}
