pub mod bce;
pub mod cross_entropy;
pub mod loss_type;
pub mod mae;
pub mod mse;

pub use bce::BceLoss;
pub use cross_entropy::CrossEntropyLoss;
pub use loss_type::LossType;
pub use mae::MaeLoss;
pub use mse::MseLoss;

use crate::error::{NnError, Result};
use crate::math::matrix::Matrix;

/// Added inside logarithms and denominators to keep them finite.
pub const EPSILON: f64 = 1e-15;

pub(crate) fn check_shapes(op: &'static str, y_hat: &Matrix, y: &Matrix) -> Result<()> {
    if y_hat.shape() != y.shape() {
        return Err(NnError::shape(op, y_hat.shape(), y.shape()));
    }
    Ok(())
}
