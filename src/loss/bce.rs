use crate::error::Result;
use crate::loss::{check_shapes, EPSILON};
use crate::math::matrix::Matrix;

pub struct BceLoss;

impl BceLoss {
    /// Scalar BCE: mean(-y·ln(ŷ+ε) - (1-y)·ln(1-ŷ+ε))
    pub fn loss(y_hat: &Matrix, y: &Matrix) -> Result<f64> {
        check_shapes("bce", y_hat, y)?;
        let sum: f64 = y_hat.as_slice().iter().zip(y.as_slice())
            .map(|(p, t)| -(t * (p + EPSILON).ln() + (1.0 - t) * (1.0 - p + EPSILON).ln()))
            .sum();
        Ok(sum / y_hat.len() as f64)
    }

    /// Per-element gradient: (ŷ - y) / (ŷ(1-ŷ) + ε)
    pub fn gradient(y_hat: &Matrix, y: &Matrix) -> Result<Matrix> {
        check_shapes("bce_gradient", y_hat, y)?;
        let denom = y_hat.apply(|p| p * (1.0 - p) + EPSILON);
        let mut out = y_hat.subtract(y)?;
        for (g, d) in out.as_mut_slice().iter_mut().zip(denom.as_slice()) {
            *g /= d;
        }
        Ok(out)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bce_of_perfect_prediction_is_near_zero() {
        let y = Matrix::from_vec(1, 2, vec![1.0, 0.0]).unwrap();
        assert!(BceLoss::loss(&y, &y).unwrap() < 1e-12);
    }

    #[test]
    fn bce_gradient_at_half() {
        let y_hat = Matrix::from_vec(1, 2, vec![0.5, 0.5]).unwrap();
        let y = Matrix::from_vec(1, 2, vec![1.0, 0.0]).unwrap();
        let g = BceLoss::gradient(&y_hat, &y).unwrap();
        assert!((g.as_slice()[0] + 2.0).abs() < 1e-9);
        assert!((g.as_slice()[1] - 2.0).abs() < 1e-9);
        let expected = -(0.5f64 + EPSILON).ln();
        assert!((BceLoss::loss(&y_hat, &y).unwrap() - expected).abs() < 1e-12);
    }
}
