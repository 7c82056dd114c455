use std::fs::File;
use std::io::BufReader;
use std::path::Path;
use std::sync::mpsc;
use std::sync::{atomic::AtomicBool, Arc};

use serde::{Deserialize, Serialize};

use crate::error::{NnError, Result};
use crate::loss::loss_type::LossType;
use crate::optim::sgd::Sgd;
use crate::train::epoch_stats::EpochStats;

fn default_learning_rate() -> f64 {
    0.1
}

fn default_shuffle() -> bool {
    true
}

/// Configuration for a `train_loop` run.
///
/// # Fields
/// - `epochs`: full passes over the training data
/// - `batch_size`: rows per mini-batch; `1` gives online SGD
/// - `learning_rate`: step size for [`TrainConfig::optimizer`]
/// - `loss_type`: loss to minimise
/// - `shuffle`: reorder rows before every epoch
/// - `seed`: fixes the shuffle order when set
/// - `progress_tx`: one `EpochStats` is sent per completed epoch; if the
///   receiver is dropped the loop stops early
/// - `stop_flag`: when set from another thread the loop stops after the
///   current epoch
///
/// The channel and the flag are runtime handles and never serialized.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrainConfig {
    pub epochs: usize,
    pub batch_size: usize,
    #[serde(default = "default_learning_rate")]
    pub learning_rate: f64,
    pub loss_type: LossType,
    #[serde(default = "default_shuffle")]
    pub shuffle: bool,
    #[serde(default)]
    pub seed: Option<u64>,
    #[serde(skip)]
    pub progress_tx: Option<mpsc::Sender<EpochStats>>,
    #[serde(skip)]
    pub stop_flag: Option<Arc<AtomicBool>>,
}

impl TrainConfig {
    /// Creates a config with no progress channel and no stop flag.
    pub fn new(epochs: usize, batch_size: usize, loss_type: LossType) -> Self {
        TrainConfig {
            epochs,
            batch_size,
            learning_rate: default_learning_rate(),
            loss_type,
            shuffle: default_shuffle(),
            seed: None,
            progress_tx: None,
            stop_flag: None,
        }
    }

    pub fn validate(&self) -> Result<()> {
        if self.batch_size == 0 {
            return Err(NnError::InvalidConfig("batch_size must be at least 1".into()));
        }
        if !(self.learning_rate.is_finite() && self.learning_rate > 0.0) {
            return Err(NnError::InvalidConfig(format!(
                "learning_rate must be positive and finite, got {}",
                self.learning_rate
            )));
        }
        Ok(())
    }

    pub fn optimizer(&self) -> Sgd {
        Sgd::new(self.learning_rate)
    }

    /// Reads and validates a config from a JSON file.
    pub fn load_json<P: AsRef<Path>>(path: P) -> Result<TrainConfig> {
        let reader = BufReader::new(File::open(path)?);
        let config: TrainConfig = serde_json::from_reader(reader)?;
        config.validate()?;
        Ok(config)
    }
}
