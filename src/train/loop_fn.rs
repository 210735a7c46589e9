use std::sync::atomic::Ordering;
use std::time::Instant;

use tracing::{debug, info, warn};

use crate::errors::NnError;
use crate::network::network::NeuralNetwork;
use crate::optim::sgd::Sgd;
use crate::train::epoch_stats::EpochStats;
use crate::train::evaluate::evaluate;
use crate::train::train_config::TrainConfig;
use crate::train::trainer::{check_pairs, train_network};

// ---------------------------------------------------------------------------
// Public entry point
// ---------------------------------------------------------------------------

/// Trains `network` for `config.epochs` epochs and returns the statistics of
/// every completed epoch.
///
/// # Arguments
/// - `network`   : mutable reference to the network; modified in place
/// - `train`     : `(inputs, targets)` of the training set
/// - `validation`: optional `(inputs, targets)` evaluated after each epoch
/// - `optimizer` : clamped SGD (learning rate and clamp limit)
/// - `config`    : epochs, optional checkpoint directory, progress channel, stop flag
///
/// Each epoch is one online pass in dataset order, followed by an error count
/// over the whole training set.
///
/// # Early termination
/// The loop breaks early if:
/// - the `progress_tx` receiver has been dropped, **or**
/// - `config.stop_flag` is set to `true`.
pub fn train_loop(
    network: &mut NeuralNetwork,
    train: (&[Vec<f64>], &[Vec<f64>]),
    validation: Option<(&[Vec<f64>], &[Vec<f64>])>,
    optimizer: &Sgd,
    config: &TrainConfig,
) -> Result<Vec<EpochStats>, NnError> {
    let (train_inputs, train_targets) = train;
    check_pairs(train_inputs, train_targets)?;
    if let Some((vi, vt)) = validation {
        check_pairs(vi, vt)?;
    }
    if let Some(ref dir) = config.checkpoint_dir {
        std::fs::create_dir_all(dir)?;
    }

    let mut history = Vec::with_capacity(config.epochs);

    for epoch in 1..=config.epochs {
        if stop_requested(config) {
            break;
        }

        let t_start = Instant::now();
        train_network(network, train_inputs, train_targets, optimizer)?;
        let elapsed_ms = t_start.elapsed().as_millis() as u64;

        if !network.is_finite() {
            warn!(epoch, "network parameters became non-finite");
        }

        // ── Evaluation ────────────────────────────────────────────────────
        let train_eval = evaluate(network, train_inputs, train_targets)?;
        let val_eval = match validation {
            Some((vi, vt)) => Some(evaluate(network, vi, vt)?),
            None => None,
        };

        info!(
            epoch,
            total_epochs = config.epochs,
            errors = train_eval.errors,
            total = train_eval.total,
            loss = train_eval.mean_loss,
            val_errors = val_eval.map(|v| v.errors),
            elapsed_ms,
            "training epoch finished"
        );

        // ── Checkpoint ────────────────────────────────────────────────────
        if let Some(ref dir) = config.checkpoint_dir {
            let path = dir.join(format!("network-epoch{epoch}.json"));
            network.save_json(&path)?;
            debug!(path = %path.display(), "wrote checkpoint");
        }

        let stats = EpochStats {
            epoch,
            total_epochs: config.epochs,
            train_errors: train_eval.errors,
            train_total: train_eval.total,
            train_loss: train_eval.mean_loss,
            val_errors: val_eval.map(|v| v.errors),
            val_total: val_eval.map(|v| v.total),
            val_loss: val_eval.map(|v| v.mean_loss),
            elapsed_ms,
        };
        history.push(stats.clone());

        // ── Emit progress ─────────────────────────────────────────────────
        if let Some(ref tx) = config.progress_tx {
            if tx.send(stats).is_err() {
                debug!(epoch, "progress receiver dropped, stopping");
                break;
            }
        }

        if stop_requested(config) {
            break;
        }
    }

    Ok(history)
}

fn stop_requested(config: &TrainConfig) -> bool {
    config
        .stop_flag
        .as_ref()
        .is_some_and(|flag| flag.load(Ordering::Relaxed))
}
