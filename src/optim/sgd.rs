use crate::{error::Result, layers::dense::Layer, math::matrix::Matrix};

/// Plain gradient descent with a fixed learning rate.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Sgd {
    pub learning_rate: f64,
}

impl Sgd {
    pub fn new(learning_rate: f64) -> Sgd {
        Sgd { learning_rate }
    }

    /// Applies one update to a layer given its pre-computed gradients.
    pub fn step(&self, layer: &mut Layer, weights_grad: &Matrix, bias_grad: &Matrix) -> Result<()> {
        layer.apply_gradients(weights_grad, bias_grad, self.learning_rate)
    }
}
