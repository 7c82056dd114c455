use crate::{
    activation::activation::ActivationFunction,
    cache::{Cache, CacheKey},
    error::{NnError, Result},
    loss::loss_type::LossType,
    math::matrix::Matrix,
    network::network::Network,
};

impl Network {
    /// Backward pass for the batch most recently run through [`Network::forward`].
    ///
    /// Writes `"delta_<i>"` (dL/dz of layer i, `batch x D_out_i`) for every
    /// layer. A Softmax output trained with cross-entropy uses the fused
    /// error `a - y`. Any other output multiplies the loss gradient through
    /// the activation's derivative.
    ///
    /// Deltas are not divided by the batch size.
    pub fn backward(&mut self, y_true: &Matrix, loss: LossType) -> Result<()> {
        let last = self.len() - 1;
        let output_activation = self.output_activation();

        let output_delta = {
            let y_hat = self.cache().peek(CacheKey::A(last))?;
            if y_hat.shape() != y_true.shape() {
                return Err(NnError::shape("backward", y_hat.shape(), y_true.shape()));
            }
            match (output_activation, loss) {
                (ActivationFunction::Softmax, LossType::CrossEntropy) => y_hat.subtract(y_true)?,
                _ => {
                    if output_activation == ActivationFunction::Softmax {
                        log::warn!(
                            "softmax output paired with {} loss; using the full softmax Jacobian",
                            loss.name()
                        );
                    }
                    let upstream = loss.gradient(y_hat, y_true)?;
                    let z = self.cache().peek(CacheKey::Z(last))?;
                    output_activation.backprop(z, &upstream)?
                }
            }
        };
        self.cache_mut().put(CacheKey::Delta(last), output_delta);

        for i in (0..last).rev() {
            let delta = {
                let next = self.cache().peek(CacheKey::Delta(i + 1))?;
                let propagated = next.dot(&self.layers()[i + 1].weights().transpose())?;
                let z = self.cache().peek(CacheKey::Z(i))?;
                self.layers()[i].activation().backprop(z, &propagated)?
            };
            self.cache_mut().put(CacheKey::Delta(i), delta);
        }

        log::debug!("backward pass: {} deltas written", self.len());
        Ok(())
    }

    /// `dW` for layer `index`; see [`weight_gradient`].
    pub fn weight_gradient(&self, index: usize) -> Result<Matrix> {
        self.layer(index)?;
        weight_gradient(self.cache(), index)
    }

    /// `db` for layer `index`; see [`bias_gradient`].
    pub fn bias_gradient(&self, index: usize) -> Result<Matrix> {
        self.layer(index)?;
        bias_gradient(self.cache(), index)
    }

    /// `(dW, db)` for every layer, input side first.
    pub fn gradients(&self) -> Result<Vec<(Matrix, Matrix)>> {
        (0..self.len())
            .map(|i| Ok((self.weight_gradient(i)?, self.bias_gradient(i)?)))
            .collect()
    }
}

/// `transpose(input_i) · delta_i`, shaped like layer i's weights.
///
/// `input_i` is the cached input for layer 0 and `a_<i-1>` otherwise.
pub fn weight_gradient(cache: &Cache, index: usize) -> Result<Matrix> {
    let input = cache.peek(CacheKey::layer_input(index))?;
    let delta = cache.peek(CacheKey::Delta(index))?;
    input.transpose().dot(delta)
}

/// Column sums of `delta_i`, shaped like layer i's bias.
pub fn bias_gradient(cache: &Cache, index: usize) -> Result<Matrix> {
    Ok(cache.peek(CacheKey::Delta(index))?.sum_columns())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::layers::dense::Layer;

    fn fixed_layer(w: Vec<f64>, rows: usize, cols: usize, act: ActivationFunction) -> Layer {
        let weights = Matrix::from_vec(rows, cols, w).unwrap();
        Layer::from_parts(weights, Matrix::zeros(1, cols), act).unwrap()
    }

    #[test]
    fn fused_softmax_cross_entropy_delta() {
        let layer = fixed_layer(vec![1.0, 0.0, 0.0, 1.0], 2, 2, ActivationFunction::Softmax);
        let mut net = Network::new(vec![layer]).unwrap();
        let x = Matrix::from_vec(1, 2, vec![0.0, 0.0]).unwrap();
        let y = Matrix::from_vec(1, 2, vec![1.0, 0.0]).unwrap();
        net.forward(&x).unwrap();
        net.backward(&y, LossType::CrossEntropy).unwrap();
        let delta = net.cache().get(CacheKey::Delta(0)).unwrap();
        assert!((delta.get(0, 0) + 0.5).abs() < 1e-12);
        assert!((delta.get(0, 1) - 0.5).abs() < 1e-12);
    }

    #[test]
    fn deltas_match_layer_shapes() {
        let mut net = Network::dense(3, &[
            (4, ActivationFunction::Tanh),
            (5, ActivationFunction::ReLU),
            (2, ActivationFunction::Sigmoid),
        ]).unwrap();
        let x = Matrix::from_vec(2, 3, vec![0.1, -0.2, 0.3, 0.4, 0.5, -0.6]).unwrap();
        let y = Matrix::from_vec(2, 2, vec![1.0, 0.0, 0.0, 1.0]).unwrap();
        net.forward(&x).unwrap();
        net.backward(&y, LossType::Mse).unwrap();
        for (i, size) in [4, 5, 2].into_iter().enumerate() {
            assert_eq!(net.cache().peek(CacheKey::Delta(i)).unwrap().shape(), (2, size));
        }
        let grads = net.gradients().unwrap();
        for (layer, (dw, db)) in net.layers().iter().zip(&grads) {
            assert_eq!(dw.shape(), layer.weights().shape());
            assert_eq!(db.shape(), layer.bias().shape());
        }
    }

    #[test]
    fn gradients_single_identity_layer() {
        let layer = fixed_layer(vec![2.0], 1, 1, ActivationFunction::Identity);
        let mut net = Network::new(vec![layer]).unwrap();
        let x = Matrix::from_vec(2, 1, vec![1.0, 3.0]).unwrap();
        let y = Matrix::from_vec(2, 1, vec![1.0, 1.0]).unwrap();
        net.forward(&x).unwrap();
        net.backward(&y, LossType::Mse).unwrap();
        // delta = 2 (y_hat - y) = [2, 10]
        assert_eq!(net.cache().peek(CacheKey::Delta(0)).unwrap().as_slice(), &[2.0, 10.0]);
        assert_eq!(net.weight_gradient(0).unwrap().as_slice(), &[32.0]);
        assert_eq!(net.bias_gradient(0).unwrap().as_slice(), &[12.0]);
    }

    #[test]
    fn backward_requires_a_forward_pass() {
        let mut net = Network::dense(2, &[(1, ActivationFunction::Sigmoid)]).unwrap();
        let y = Matrix::zeros(1, 1);
        assert!(matches!(
            net.backward(&y, LossType::Mse),
            Err(NnError::MissingCacheEntry(key)) if key == "a_0"
        ));
    }

    #[test]
    fn backward_checks_target_shape() {
        let mut net = Network::dense(2, &[(1, ActivationFunction::Sigmoid)]).unwrap();
        net.forward(&Matrix::zeros(3, 2)).unwrap();
        assert!(net.backward(&Matrix::zeros(2, 1), LossType::Mse).is_err());
    }

    #[test]
    fn gradient_index_is_checked() {
        let net = Network::dense(2, &[(1, ActivationFunction::Sigmoid)]).unwrap();
        assert!(matches!(net.weight_gradient(3), Err(NnError::LayerIndexOutOfRange { .. })));
        assert!(matches!(bias_gradient(net.cache(), 0), Err(NnError::MissingCacheEntry(_))));
    }
}
