use crate::{
    error::Result,
    loss::loss_type::LossType,
    math::matrix::Matrix,
    network::{network::Network, summary::log_progress},
    optim::sgd::Sgd,
};

/// One gradient-descent step on the batch `x` / `y`.
///
/// Order: forward pass, scalar loss, backward pass, then every layer's
/// gradients are extracted before any layer is updated. Returns the loss
/// measured before the update.
pub fn train_step(
    network: &mut Network,
    x: &Matrix,
    y: &Matrix,
    loss: LossType,
    optimizer: &Sgd,
) -> Result<f64> {
    let y_hat = network.forward(x)?;
    let batch_loss = loss.loss(&y_hat, y)?;

    network.backward(y, loss)?;
    let gradients = network.gradients()?;

    for (i, (weights_grad, bias_grad)) in gradients.iter().enumerate() {
        optimizer.step(network.layer_mut(i)?, weights_grad, bias_grad)?;
    }

    Ok(batch_loss)
}

/// Runs `epochs` full-batch steps and returns the loss of the last one.
pub fn train_network(
    network: &mut Network,
    x: &Matrix,
    y: &Matrix,
    optimizer: &Sgd,
    loss: LossType,
    epochs: usize,
) -> Result<f64> {
    let mut last_loss = 0.0;
    for epoch in 0..epochs {
        last_loss = train_step(network, x, y, loss, optimizer)?;
        log_progress(epoch, epochs, last_loss);
    }
    Ok(last_loss)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::activation::activation::ActivationFunction;
    use crate::layers::dense::Layer;

    #[test]
    fn step_returns_loss_before_update() {
        let w = Matrix::from_vec(1, 1, vec![2.0]).unwrap();
        let layer = Layer::from_parts(w, Matrix::zeros(1, 1), ActivationFunction::Identity).unwrap();
        let mut net = Network::new(vec![layer]).unwrap();
        let x = Matrix::from_vec(1, 1, vec![1.0]).unwrap();
        let y = Matrix::from_vec(1, 1, vec![1.0]).unwrap();

        let loss = train_step(&mut net, &x, &y, LossType::Mse, &Sgd::new(0.25)).unwrap();
        assert_eq!(loss, 1.0);
        // dW = x^T · 2(y_hat - y) = 2, db = 2
        assert_eq!(net.layers()[0].weights().as_slice(), &[1.5]);
        assert_eq!(net.layers()[0].bias().as_slice(), &[-0.5]);
    }

    #[test]
    fn full_batch_training_lowers_loss() {
        let mut net = Network::dense(1, &[(1, ActivationFunction::Identity)]).unwrap();
        let x = Matrix::from_vec(3, 1, vec![0.0, 1.0, 2.0]).unwrap();
        let y = Matrix::from_vec(3, 1, vec![1.0, 3.0, 5.0]).unwrap();
        let before = LossType::Mse.loss(&net.forward(&x).unwrap(), &y).unwrap();
        let after = train_network(&mut net, &x, &y, &Sgd::new(0.02), LossType::Mse, 200).unwrap();
        assert!(after < before);
    }
}
