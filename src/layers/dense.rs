use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::{
    activation::activation::ActivationFunction,
    error::{NnError, Result},
    math::matrix::Matrix,
};

/// How a freshly built layer's weights are drawn. Biases always start at zero.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WeightInit {
    /// Uniform in `[-1/sqrt(fan_in), 1/sqrt(fan_in)]`.
    #[default]
    ScaledUniform,
    /// N(0, sqrt(2 / fan_in)); for ReLU-family layers.
    He,
    /// N(0, sqrt(1 / fan_in)); for Sigmoid/Tanh layers.
    Xavier,
}

/// Fully connected layer: `a = activation(x · W + b)`.
///
/// `weights` is `D_in x D_out` and `bias` is `1 x D_out`.
#[derive(Debug, Clone)]
pub struct Layer {
    weights: Matrix,
    bias: Matrix,
    activation: ActivationFunction,
}

impl Layer {
    /// Builds a `input_size -> size` layer with scaled-uniform weights.
    pub fn new(input_size: usize, size: usize, activation: ActivationFunction) -> Result<Layer> {
        Layer::with_init(input_size, size, activation, WeightInit::default(), &mut rand::thread_rng())
    }

    pub fn with_init<R: Rng + ?Sized>(
        input_size: usize,
        size: usize,
        activation: ActivationFunction,
        init: WeightInit,
        rng: &mut R,
    ) -> Result<Layer> {
        let weights = match init {
            WeightInit::ScaledUniform => {
                let mut w = Matrix::new(input_size, size)?;
                w.randomize_with(input_size as f64, rng);
                w
            }
            WeightInit::He => Matrix::he_with(input_size, size, rng)?,
            WeightInit::Xavier => Matrix::xavier_with(input_size, size, rng)?,
        };
        let bias = Matrix::new(1, size)?;
        Layer::from_parts(weights, bias, activation)
    }

    /// Assembles a layer from explicit parameters.
    pub fn from_parts(weights: Matrix, bias: Matrix, activation: ActivationFunction) -> Result<Layer> {
        check_parameters(&weights, &bias)?;
        activation.validate()?;
        Ok(Layer { weights, bias, activation })
    }

    pub fn weights(&self) -> &Matrix {
        &self.weights
    }

    pub fn bias(&self) -> &Matrix {
        &self.bias
    }

    pub fn activation(&self) -> ActivationFunction {
        self.activation
    }

    /// `D_in`.
    pub fn input_size(&self) -> usize {
        self.weights.rows()
    }

    /// `D_out`.
    pub fn size(&self) -> usize {
        self.weights.cols()
    }

    pub fn parameter_count(&self) -> usize {
        self.weights.len() + self.bias.len()
    }

    /// Installs new parameters of the same shapes as the current ones.
    pub fn replace_parameters(&mut self, weights: Matrix, bias: Matrix) -> Result<()> {
        if weights.shape() != self.weights.shape() {
            return Err(NnError::shape("replace_parameters", self.weights.shape(), weights.shape()));
        }
        if bias.shape() != self.bias.shape() {
            return Err(NnError::shape("replace_parameters", self.bias.shape(), bias.shape()));
        }
        self.weights = weights;
        self.bias = bias;
        Ok(())
    }

    /// `W ← W - lr·dW`, `b ← b - lr·db`.
    pub fn apply_gradients(&mut self, weights_grad: &Matrix, bias_grad: &Matrix, lr: f64) -> Result<()> {
        let weights = self.weights.subtract(&weights_grad.scale(lr))?;
        let bias = self.bias.subtract(&bias_grad.scale(lr))?;
        self.replace_parameters(weights, bias)
    }
}

fn check_parameters(weights: &Matrix, bias: &Matrix) -> Result<()> {
    if bias.rows() != 1 || bias.cols() != weights.cols() {
        return Err(NnError::shape("layer bias", weights.shape(), bias.shape()));
    }
    Ok(())
}
