use crate::error::Result;
use crate::loss::check_shapes;
use crate::math::matrix::Matrix;

pub struct MaeLoss;

impl MaeLoss {
    /// Scalar MAE: mean(|ŷ - y|)
    pub fn loss(y_hat: &Matrix, y: &Matrix) -> Result<f64> {
        check_shapes("mae", y_hat, y)?;
        let sum: f64 = y_hat.as_slice().iter().zip(y.as_slice())
            .map(|(p, t)| (p - t).abs())
            .sum();
        Ok(sum / y_hat.len() as f64)
    }

    /// Per-element subgradient: sign(ŷ - y), 0 when equal.
    pub fn gradient(y_hat: &Matrix, y: &Matrix) -> Result<Matrix> {
        check_shapes("mae_gradient", y_hat, y)?;
        Ok(y_hat.subtract(y)?.apply(|diff| {
            if diff > 0.0 { 1.0 } else if diff < 0.0 { -1.0 } else { 0.0 }
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mae_values() {
        let y_hat = Matrix::from_vec(1, 3, vec![1.0, 0.5, -1.0]).unwrap();
        let y = Matrix::from_vec(1, 3, vec![0.0, 0.5, 1.0]).unwrap();
        assert_eq!(MaeLoss::loss(&y_hat, &y).unwrap(), 1.0);
        assert_eq!(MaeLoss::gradient(&y_hat, &y).unwrap().as_slice(), &[1.0, 0.0, -1.0]);
    }
}
