use crate::{
    activation::activation::ActivationFunction,
    cache::{Cache, CacheKey},
    error::{NnError, Result},
    layers::dense::Layer,
    math::matrix::Matrix,
};

/// Ordered stack of dense layers plus the cache that carries intermediate
/// values from the forward pass to the backward pass.
///
/// For every consecutive pair, `layers[i].size() == layers[i + 1].input_size()`.
#[derive(Debug, Clone)]
pub struct Network {
    layers: Vec<Layer>,
    cache: Cache,
}

impl Network {
    /// Validates the layer chain and wraps it with an empty cache.
    pub fn new(layers: Vec<Layer>) -> Result<Network> {
        if layers.is_empty() {
            return Err(NnError::InvalidNetwork("a network needs at least one layer".into()));
        }
        for (i, pair) in layers.windows(2).enumerate() {
            if pair[0].size() != pair[1].input_size() {
                return Err(NnError::InvalidNetwork(format!(
                    "layer {} outputs {} values but layer {} expects {}",
                    i,
                    pair[0].size(),
                    i + 1,
                    pair[1].input_size()
                )));
            }
        }
        Ok(Network { layers, cache: Cache::new() })
    }

    /// Builds randomly initialised layers from `(size, activation)` pairs,
    /// chaining each layer's input size to the previous layer's size.
    pub fn dense(input_size: usize, layers: &[(usize, ActivationFunction)]) -> Result<Network> {
        let mut built = Vec::with_capacity(layers.len());
        let mut fan_in = input_size;
        for &(size, activation) in layers {
            built.push(Layer::new(fan_in, size, activation)?);
            fan_in = size;
        }
        Network::new(built)
    }

    pub fn layers(&self) -> &[Layer] {
        &self.layers
    }

    pub fn layer(&self, index: usize) -> Result<&Layer> {
        let len = self.layers.len();
        self.layers.get(index).ok_or(NnError::LayerIndexOutOfRange { index, len })
    }

    /// Mutable access for the optimizer.
    pub fn layer_mut(&mut self, index: usize) -> Result<&mut Layer> {
        let len = self.layers.len();
        self.layers.get_mut(index).ok_or(NnError::LayerIndexOutOfRange { index, len })
    }

    /// Number of layers.
    pub fn len(&self) -> usize {
        self.layers.len()
    }

    /// Always false: construction rejects empty networks.
    pub fn is_empty(&self) -> bool {
        self.layers.is_empty()
    }

    pub fn input_size(&self) -> usize {
        self.layers[0].input_size()
    }

    pub fn output_size(&self) -> usize {
        self.layers[self.layers.len() - 1].size()
    }

    pub fn output_activation(&self) -> ActivationFunction {
        self.layers[self.layers.len() - 1].activation()
    }

    pub fn parameter_count(&self) -> usize {
        self.layers.iter().map(Layer::parameter_count).sum()
    }

    pub fn cache(&self) -> &Cache {
        &self.cache
    }

    pub(crate) fn cache_mut(&mut self) -> &mut Cache {
        &mut self.cache
    }

    /// Forward pass over a `batch x D_in` input.
    ///
    /// Clears the cache, then stores the input under `"input"` and each
    /// layer's pre-activation and activation under `"z_<i>"` / `"a_<i>"`.
    /// Returns a copy of the last activation.
    pub fn forward(&mut self, input: &Matrix) -> Result<Matrix> {
        if input.cols() != self.input_size() {
            return Err(NnError::shape("forward", input.shape(), self.layers[0].weights().shape()));
        }
        log::debug!("forward pass: batch of {} through {} layers", input.rows(), self.layers.len());

        self.cache.clear();
        self.cache.put(CacheKey::Input, input.clone());

        let mut current = input.clone();
        for (i, layer) in self.layers.iter().enumerate() {
            let z = current.dot(layer.weights())?.add_bias(layer.bias())?;
            let a = layer.activation().activate(&z);
            self.cache.put(CacheKey::Z(i), z);
            self.cache.put(CacheKey::A(i), a.clone());
            current = a;
        }

        Ok(current)
    }
}
