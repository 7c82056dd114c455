use crate::error::Result;
use crate::loss::{check_shapes, EPSILON};
use crate::math::matrix::Matrix;

/// Categorical cross-entropy, normally paired with a Softmax output layer.
pub struct CrossEntropyLoss;

impl CrossEntropyLoss {
    /// Computes the scalar cross-entropy averaged over the batch:
    ///   L = -Σ y·ln(ŷ + ε) / rows
    ///
    /// `y_hat`: predicted class probabilities, one sample per row
    /// `y`: one-hot (or soft) target distribution, same shape
    pub fn loss(y_hat: &Matrix, y: &Matrix) -> Result<f64> {
        check_shapes("cross_entropy", y_hat, y)?;
        let sum: f64 = y_hat.as_slice().iter().zip(y.as_slice())
            .map(|(p, t)| -t * (p + EPSILON).ln())
            .sum();
        Ok(sum / y_hat.rows() as f64)
    }

    /// Gradient with respect to the probabilities: -y / (ŷ + ε).
    ///
    /// When the output layer is Softmax the backward pass never calls this;
    /// it uses the fused form `ŷ - y` with respect to the logits instead.
    pub fn gradient(y_hat: &Matrix, y: &Matrix) -> Result<Matrix> {
        check_shapes("cross_entropy_gradient", y_hat, y)?;
        let mut out = y.scale(-1.0);
        for (g, p) in out.as_mut_slice().iter_mut().zip(y_hat.as_slice()) {
            *g /= p + EPSILON;
        }
        Ok(out)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn loss_is_averaged_over_rows() {
        let y_hat = Matrix::from_vec(2, 2, vec![0.5, 0.5, 0.25, 0.75]).unwrap();
        let y = Matrix::from_vec(2, 2, vec![1.0, 0.0, 0.0, 1.0]).unwrap();
        let expected = -((0.5f64 + EPSILON).ln() + (0.75f64 + EPSILON).ln()) / 2.0;
        assert!((CrossEntropyLoss::loss(&y_hat, &y).unwrap() - expected).abs() < 1e-12);
    }

    #[test]
    fn gradient_is_zero_off_target() {
        let y_hat = Matrix::from_vec(1, 2, vec![0.5, 0.5]).unwrap();
        let y = Matrix::from_vec(1, 2, vec![0.0, 1.0]).unwrap();
        let g = CrossEntropyLoss::gradient(&y_hat, &y).unwrap();
        assert_eq!(g.as_slice()[0], 0.0);
        assert!((g.as_slice()[1] + 2.0).abs() < 1e-12);
    }

    #[test]
    fn mismatched_shapes_fail() {
        let a = Matrix::zeros(1, 2);
        let b = Matrix::zeros(2, 1);
        assert!(CrossEntropyLoss::loss(&a, &b).is_err());
        assert!(CrossEntropyLoss::gradient(&a, &b).is_err());
    }
}
