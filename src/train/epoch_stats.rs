use serde::{Serialize, Deserialize};

/// Per-epoch training statistics emitted by `train_loop`.
///
/// When a `progress_tx` channel is configured in `TrainConfig`, the training
/// loop sends one `EpochStats` value at the end of every completed epoch.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EpochStats {
    /// 1-based epoch number.
    pub epoch: usize,
    /// Total epochs requested for this run.
    pub total_epochs: usize,
    /// Misclassified training samples, measured after the epoch's updates.
    pub train_errors: usize,
    pub train_total: usize,
    /// Mean per-sample squared error on the training set after the epoch.
    pub train_loss: f64,
    /// Misclassified validation samples, if a validation set was provided.
    pub val_errors: Option<usize>,
    pub val_total: Option<usize>,
    pub val_loss: Option<f64>,
    /// Wall-clock duration of the training pass alone, in milliseconds.
    pub elapsed_ms: u64,
}

impl EpochStats {
    /// Training accuracy as a fraction in [0, 1].
    pub fn train_accuracy(&self) -> f64 {
        1.0 - self.train_errors as f64 / self.train_total as f64
    }
}
