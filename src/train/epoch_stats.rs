use serde::{Deserialize, Serialize};

/// Per-epoch statistics emitted by `train_loop`.
///
/// When `TrainConfig::progress_tx` is set, the loop sends one value at the
/// end of every completed epoch.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EpochStats {
    /// 1-based epoch number.
    pub epoch: usize,
    pub total_epochs: usize,
    /// Mean per-batch training loss over the epoch.
    pub train_loss: f64,
    pub val_loss: Option<f64>,
    /// Fraction in [0, 1]; only set for cross-entropy runs.
    pub train_accuracy: Option<f64>,
    /// Fraction in [0, 1]; only set for cross-entropy runs with a validation set.
    pub val_accuracy: Option<f64>,
    /// Wall-clock duration of the epoch's training pass.
    pub elapsed_ms: u64,
}
