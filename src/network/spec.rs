use std::fs::File;
use std::io::{BufReader, BufWriter};
use std::path::Path;

use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::activation::activation::ActivationFunction;
use crate::error::{NnError, Result};
use crate::layers::dense::{Layer, WeightInit};
use crate::loss::loss_type::LossType;
use crate::network::network::Network;

/// Describes one layer in a network specification.
///
/// Fields:
/// - `size`: number of neurons in this layer
/// - `input_size`: output size of the previous layer, or the raw input
///   dimension for the first layer
/// - `activation`: activation function applied after the affine transform
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LayerSpec {
    pub size: usize,
    pub input_size: usize,
    pub activation: ActivationFunction,
}

/// Serializable architecture description: layers, the loss to train with,
/// and how to initialise weights.
///
/// Stores no parameters; [`NetworkSpec::build`] draws fresh ones.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NetworkSpec {
    pub name: String,
    /// Input side first.
    pub layers: Vec<LayerSpec>,
    pub loss: LossType,
    #[serde(default)]
    pub init: WeightInit,
}

impl NetworkSpec {
    /// Checks sizes and the layer chain without drawing any weights.
    pub fn validate(&self) -> Result<()> {
        if self.layers.is_empty() {
            return Err(NnError::InvalidConfig(format!("spec '{}' has no layers", self.name)));
        }
        for (i, layer) in self.layers.iter().enumerate() {
            if layer.size == 0 || layer.input_size == 0 {
                return Err(NnError::InvalidConfig(format!(
                    "layer {} of '{}' has a zero dimension ({} -> {})",
                    i, self.name, layer.input_size, layer.size
                )));
            }
            layer.activation.validate()?;
        }
        for (i, pair) in self.layers.windows(2).enumerate() {
            if pair[0].size != pair[1].input_size {
                return Err(NnError::InvalidConfig(format!(
                    "layer {} of '{}' outputs {} but layer {} takes {}",
                    i,
                    self.name,
                    pair[0].size,
                    i + 1,
                    pair[1].input_size
                )));
            }
        }
        let last = &self.layers[self.layers.len() - 1];
        if last.activation == ActivationFunction::Softmax && self.loss != LossType::CrossEntropy {
            log::warn!("spec '{}' pairs a softmax output with {} loss", self.name, self.loss.name());
        }
        Ok(())
    }

    pub fn build(&self) -> Result<Network> {
        self.build_with(&mut rand::thread_rng())
    }

    /// Builds a network with weights drawn from `rng`.
    pub fn build_with<R: Rng + ?Sized>(&self, rng: &mut R) -> Result<Network> {
        self.validate()?;
        let layers = self
            .layers
            .iter()
            .map(|l| Layer::with_init(l.input_size, l.size, l.activation, self.init, &mut *rng))
            .collect::<Result<Vec<_>>>()?;
        log::debug!("built network '{}' with {} layers", self.name, layers.len());
        Network::new(layers)
    }

    /// Serializes the spec to a pretty-printed JSON file.
    pub fn save_json<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let writer = BufWriter::new(File::create(path)?);
        serde_json::to_writer_pretty(writer, self)?;
        Ok(())
    }

    /// Reads and validates a spec from a JSON file.
    pub fn load_json<P: AsRef<Path>>(path: P) -> Result<NetworkSpec> {
        let reader = BufReader::new(File::open(path)?);
        let spec: NetworkSpec = serde_json::from_reader(reader)?;
        spec.validate()?;
        Ok(spec)
    }
}
