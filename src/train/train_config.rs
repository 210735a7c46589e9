use std::path::PathBuf;
use std::sync::mpsc;
use std::sync::{Arc, atomic::AtomicBool};
use crate::train::epoch_stats::EpochStats;

/// Configuration for a `train_loop` run.
///
/// # Fields
/// - `epochs`        : total number of full online passes over the training data
/// - `checkpoint_dir`: optional directory; the network is written there as
///                      `network-epoch{N}.json` after every completed epoch
/// - `progress_tx`   : optional channel sender; one `EpochStats` is sent per
///                      completed epoch.  If the receiver is dropped the loop
///                      terminates early (clean shutdown).
/// - `stop_flag`     : optional atomic flag; when set to `true` from another
///                      thread the loop terminates after the current epoch.
pub struct TrainConfig {
    pub epochs: usize,
    pub checkpoint_dir: Option<PathBuf>,
    pub progress_tx: Option<mpsc::Sender<EpochStats>>,
    pub stop_flag: Option<Arc<AtomicBool>>,
}

impl TrainConfig {
    /// Creates a minimal `TrainConfig` with no checkpoints, no progress channel
    /// and no stop flag.
    pub fn new(epochs: usize) -> Self {
        TrainConfig {
            epochs,
            checkpoint_dir: None,
            progress_tx: None,
            stop_flag: None,
        }
    }
}
