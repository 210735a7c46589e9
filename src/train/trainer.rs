use crate::{
    errors::NnError,
    network::network::NeuralNetwork,
    optim::sgd::Sgd,
};

/// Checks that `inputs` and `targets` form a non-empty paired dataset.
pub(crate) fn check_pairs(inputs: &[Vec<f64>], targets: &[Vec<f64>]) -> Result<(), NnError> {
    if inputs.is_empty() {
        return Err(NnError::EmptyDataset);
    }
    if inputs.len() != targets.len() {
        return Err(NnError::DimensionMismatch {
            what: "target count",
            expected: inputs.len(),
            actual: targets.len(),
        });
    }
    Ok(())
}

/// One online epoch: a `train` call per sample, in dataset order.
///
/// Stops at the first sample whose length does not match the network; the
/// samples before it have already been applied.
pub fn train_network(
    network: &mut NeuralNetwork,
    inputs: &[Vec<f64>],
    targets: &[Vec<f64>],
    optimizer: &Sgd,
) -> Result<(), NnError> {
    check_pairs(inputs, targets)?;

    for (input, target) in inputs.iter().zip(targets.iter()) {
        network.train(input, target, optimizer)?;
    }

    Ok(())
}
