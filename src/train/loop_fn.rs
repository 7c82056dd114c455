use std::sync::atomic::Ordering;
use std::time::Instant;

use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;

use crate::error::{NnError, Result};
use crate::loss::loss_type::LossType;
use crate::math::matrix::Matrix;
use crate::network::network::Network;
use crate::optim::sgd::Sgd;
use crate::train::epoch_stats::EpochStats;
use crate::train::train_config::TrainConfig;
use crate::train::trainer::train_step;

// ---------------------------------------------------------------------------
// Public entry point
// ---------------------------------------------------------------------------

/// Trains `network` for `config.epochs` epochs of mini-batch gradient descent
/// and returns the mean training loss of the **last completed epoch**.
///
/// # Arguments
/// - `network`: modified in place
/// - `train_x`: training samples, one per row
/// - `train_y`: matching targets, one per row
/// - `val`: optional `(inputs, targets)` evaluated after every epoch
/// - `optimizer`: carries the learning rate; each batch's summed gradients
///   are averaged over the batch rows before the update
/// - `config`: hyperparameters, optional progress channel, optional stop flag
///
/// # Early termination
/// The loop breaks early if the `progress_tx` receiver has been dropped or
/// `config.stop_flag` is set to `true`.
pub fn train_loop(
    network: &mut Network,
    train_x: &Matrix,
    train_y: &Matrix,
    val: Option<(&Matrix, &Matrix)>,
    optimizer: &Sgd,
    config: &TrainConfig,
) -> Result<f64> {
    config.validate()?;
    check_rows("train_loop", train_x, train_y)?;
    if let Some((vx, vy)) = val {
        check_rows("train_loop validation", vx, vy)?;
    }

    let mut rng = match config.seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_entropy(),
    };
    let mut indices: Vec<usize> = (0..train_x.rows()).collect();
    let mut last_train_loss = 0.0;

    for epoch in 1..=config.epochs {
        if stop_requested(config) {
            log::debug!("stop flag set before epoch {}", epoch);
            break;
        }

        let t_start = Instant::now();

        if config.shuffle {
            indices.shuffle(&mut rng);
        }
        let train_loss = run_one_epoch(network, train_x, train_y, &indices, optimizer, config)?;
        last_train_loss = train_loss;

        let elapsed_ms = t_start.elapsed().as_millis() as u64;

        // ── Accuracy (CrossEntropy only) ───────────────────────────────────
        let classifies = config.loss_type == LossType::CrossEntropy;
        let train_accuracy = if classifies {
            Some(compute_accuracy(network, train_x, train_y)?)
        } else {
            None
        };

        // ── Validation ────────────────────────────────────────────────────
        let (val_loss, val_accuracy) = match val {
            Some((vx, vy)) => {
                let loss = config.loss_type.loss(&network.forward(vx)?, vy)?;
                let accuracy = if classifies { Some(compute_accuracy(network, vx, vy)?) } else { None };
                (Some(loss), accuracy)
            }
            None => (None, None),
        };

        log::info!(
            "epoch {}/{}: train loss {:.6}{}",
            epoch,
            config.epochs,
            train_loss,
            val_loss.map(|l| format!(", val loss {l:.6}")).unwrap_or_default()
        );

        let stats = EpochStats {
            epoch,
            total_epochs: config.epochs,
            train_loss,
            val_loss,
            train_accuracy,
            val_accuracy,
            elapsed_ms,
        };

        if let Some(ref tx) = config.progress_tx {
            if tx.send(stats).is_err() {
                log::debug!("progress receiver dropped; stopping after epoch {}", epoch);
                break;
            }
        }
    }

    Ok(last_train_loss)
}

// ---------------------------------------------------------------------------
// Private helpers
// ---------------------------------------------------------------------------

fn stop_requested(config: &TrainConfig) -> bool {
    config
        .stop_flag
        .as_ref()
        .map(|flag| flag.load(Ordering::Relaxed))
        .unwrap_or(false)
}

fn check_rows(op: &'static str, x: &Matrix, y: &Matrix) -> Result<()> {
    if x.rows() != y.rows() {
        return Err(NnError::shape(op, x.shape(), y.shape()));
    }
    Ok(())
}

/// One pass over the rows in `order`, `config.batch_size` rows at a time.
/// Returns the per-row mean of the batch losses.
fn run_one_epoch(
    network: &mut Network,
    x: &Matrix,
    y: &Matrix,
    order: &[usize],
    optimizer: &Sgd,
    config: &TrainConfig,
) -> Result<f64> {
    let mut total_loss = 0.0;

    for batch in order.chunks(config.batch_size) {
        let batch_x = x.select_rows(batch)?;
        let batch_y = y.select_rows(batch)?;
        let rows = batch.len() as f64;

        let averaged = Sgd::new(optimizer.learning_rate / rows);
        total_loss += train_step(network, &batch_x, &batch_y, config.loss_type, &averaged)? * rows;
    }

    Ok(total_loss / order.len() as f64)
}

/// Fraction of rows whose predicted argmax matches the target's argmax.
fn compute_accuracy(network: &mut Network, x: &Matrix, y: &Matrix) -> Result<f64> {
    let predicted = network.forward(x)?.argmax_rows();
    let expected = y.argmax_rows();
    let correct = predicted.iter().zip(&expected).filter(|(p, e)| p == e).count();
    Ok(correct as f64 / x.rows() as f64)
}
