use crate::error::Result;
use crate::loss::check_shapes;
use crate::math::matrix::Matrix;

pub struct MseLoss;

impl MseLoss {
    /// Scalar MSE: mean((ŷ - y)²) over every element.
    pub fn loss(y_hat: &Matrix, y: &Matrix) -> Result<f64> {
        check_shapes("mse", y_hat, y)?;
        let sum: f64 = y_hat.as_slice().iter().zip(y.as_slice())
            .map(|(p, t)| (p - t).powi(2))
            .sum();
        Ok(sum / y_hat.len() as f64)
    }

    /// Per-element gradient: 2(ŷ - y)
    pub fn gradient(y_hat: &Matrix, y: &Matrix) -> Result<Matrix> {
        check_shapes("mse_gradient", y_hat, y)?;
        Ok(y_hat.subtract(y)?.scale(2.0))
    }
}
