use serde::{Serialize, Deserialize};

use crate::error::Result;
use crate::loss::{BceLoss, CrossEntropyLoss, MaeLoss, MseLoss};
use crate::math::matrix::Matrix;

/// Selects which loss function a training step uses.
///
/// - `Mse`: Mean-squared error; pair with Identity or Sigmoid output.
/// - `CrossEntropy`: Categorical cross-entropy; pair with Softmax output.
///   With a Softmax output layer the backward pass uses the fused gradient
///   `ŷ - y` instead of `gradient()`.
/// - `BinaryCrossEntropy`: Binary cross-entropy; pair with Sigmoid output.
/// - `Mae`: Mean absolute error; pair with Identity output.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LossType {
    Mse,
    CrossEntropy,
    BinaryCrossEntropy,
    Mae,
}

impl LossType {
    /// Scalar loss for a batch.
    pub fn loss(&self, y_hat: &Matrix, y: &Matrix) -> Result<f64> {
        match self {
            LossType::Mse                => MseLoss::loss(y_hat, y),
            LossType::CrossEntropy       => CrossEntropyLoss::loss(y_hat, y),
            LossType::BinaryCrossEntropy => BceLoss::loss(y_hat, y),
            LossType::Mae                => MaeLoss::loss(y_hat, y),
        }
    }

    /// Elementwise gradient with respect to `y_hat`.
    pub fn gradient(&self, y_hat: &Matrix, y: &Matrix) -> Result<Matrix> {
        match self {
            LossType::Mse                => MseLoss::gradient(y_hat, y),
            LossType::CrossEntropy       => CrossEntropyLoss::gradient(y_hat, y),
            LossType::BinaryCrossEntropy => BceLoss::gradient(y_hat, y),
            LossType::Mae                => MaeLoss::gradient(y_hat, y),
        }
    }

    /// Divisor applied by the scalar form: the element count, or the row
    /// count for cross-entropy. `gradient()` is not divided, so it equals
    /// `normalizer * d(loss)/d(y_hat)`.
    pub fn normalizer(&self, rows: usize, cols: usize) -> f64 {
        match self {
            LossType::CrossEntropy => rows as f64,
            _ => (rows * cols) as f64,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            LossType::Mse                => "MSE",
            LossType::CrossEntropy       => "CCE",
            LossType::BinaryCrossEntropy => "BCE",
            LossType::Mae                => "MAE",
        }
    }
}
