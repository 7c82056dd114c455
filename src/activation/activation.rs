use serde::{Deserialize, Serialize};
use std::fmt;

use crate::activation::softmax::{softmax, softmax_jvp, softmax_prime};
use crate::error::{NnError, Result};
use crate::math::matrix::Matrix;

/// Leak used by [`ActivationFunction::leaky_relu`] and when a serialized
/// `leaky_relu` omits `alpha`.
pub const DEFAULT_LEAK: f64 = 0.01;

fn default_leak() -> f64 {
    DEFAULT_LEAK
}

/// Activation applied after a layer's affine transform.
///
/// Derivatives are always evaluated on the pre-activation `z`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum ActivationFunction {
    #[serde(rename = "sigmoid")]
    Sigmoid,
    #[serde(rename = "relu")]
    ReLU,
    #[serde(rename = "tanh")]
    Tanh,
    #[serde(rename = "leaky_relu")]
    LeakyReLU {
        #[serde(default = "default_leak")]
        alpha: f64,
    },
    /// `{-1, 0, 1}`; its derivative is taken as 0 everywhere.
    #[serde(rename = "sign")]
    Sign,
    #[serde(rename = "identity")]
    Identity,
    /// `clamp(z, -1, 1)`.
    #[serde(rename = "hard_tanh")]
    HardTanh,
    /// Row-wise; not an elementwise function.
    #[serde(rename = "softmax")]
    Softmax,
}

impl ActivationFunction {
    pub fn leaky_relu() -> Self {
        ActivationFunction::LeakyReLU { alpha: DEFAULT_LEAK }
    }

    /// Rejects a non-finite leak.
    pub fn validate(&self) -> Result<()> {
        if let ActivationFunction::LeakyReLU { alpha } = self {
            if !alpha.is_finite() {
                return Err(NnError::InvalidConfig(format!(
                    "leaky ReLU alpha must be finite, got {alpha}"
                )));
            }
        }
        Ok(())
    }

    /// Scalar forward value. Softmax has no scalar form and is routed
    /// through [`ActivationFunction::activate`] instead.
    fn function(&self, x: f64) -> f64 {
        match *self {
            ActivationFunction::Sigmoid => sigmoid(x),
            ActivationFunction::ReLU => if x > 0.0 { x } else { 0.0 },
            ActivationFunction::Tanh => x.tanh(),
            ActivationFunction::LeakyReLU { alpha } => if x > 0.0 { x } else { alpha * x },
            ActivationFunction::Sign => {
                if x > 0.0 {
                    1.0
                } else if x < 0.0 {
                    -1.0
                } else {
                    0.0
                }
            }
            ActivationFunction::Identity => x,
            ActivationFunction::HardTanh => x.clamp(-1.0, 1.0),
            ActivationFunction::Softmax => unreachable!("softmax is applied row-wise"),
        }
    }

    fn derivative(&self, x: f64) -> f64 {
        match *self {
            ActivationFunction::Sigmoid => {
                let s = sigmoid(x);
                s * (1.0 - s)
            }
            ActivationFunction::ReLU => if x > 0.0 { 1.0 } else { 0.0 },
            ActivationFunction::Tanh => {
                let t = x.tanh();
                1.0 - t * t
            }
            ActivationFunction::LeakyReLU { alpha } => if x > 0.0 { 1.0 } else { alpha },
            ActivationFunction::Sign => 0.0,
            ActivationFunction::Identity => 1.0,
            ActivationFunction::HardTanh => if x > -1.0 && x < 1.0 { 1.0 } else { 0.0 },
            ActivationFunction::Softmax => unreachable!("softmax derivative is row-wise"),
        }
    }

    /// Forward activation of a whole pre-activation matrix.
    pub fn activate(&self, z: &Matrix) -> Matrix {
        let act = *self;
        match act {
            ActivationFunction::Softmax => softmax(z),
            _ => z.apply(move |x| act.function(x)),
        }
    }

    /// Elementwise derivative evaluated at `z`.
    ///
    /// For Softmax this is `o * (1 - o)`, the Jacobian diagonal only; the
    /// backward pass uses [`ActivationFunction::backprop`], which is exact.
    pub fn derivative_matrix(&self, z: &Matrix) -> Matrix {
        let act = *self;
        match act {
            ActivationFunction::Softmax => softmax_prime(z),
            _ => z.apply(move |x| act.derivative(x)),
        }
    }

    /// Maps `upstream = dL/da` to `dL/dz` at pre-activation `z`.
    ///
    /// Elementwise kinds multiply by the derivative; Softmax applies the full
    /// row-wise Jacobian-vector product.
    pub fn backprop(&self, z: &Matrix, upstream: &Matrix) -> Result<Matrix> {
        match self {
            ActivationFunction::Softmax => softmax_jvp(&softmax(z), upstream),
            _ => upstream.multiply(&self.derivative_matrix(z)),
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            ActivationFunction::Sigmoid => "SIGMOID",
            ActivationFunction::ReLU => "RELU",
            ActivationFunction::Tanh => "TANH",
            ActivationFunction::LeakyReLU { .. } => "LEAKY_RELU",
            ActivationFunction::Sign => "SIGN",
            ActivationFunction::Identity => "IDENTITY",
            ActivationFunction::HardTanh => "HARD_TANH",
            ActivationFunction::Softmax => "SOFTMAX",
        }
    }
}

impl fmt::Display for ActivationFunction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ActivationFunction::LeakyReLU { alpha } => write!(f, "{}(alpha={})", self.name(), alpha),
            _ => f.write_str(self.name()),
        }
    }
}

fn sigmoid(x: f64) -> f64 {
    1.0 / (1.0 + (-x).exp())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(data: &[f64]) -> Matrix {
        Matrix::from_vec(1, data.len(), data.to_vec()).unwrap()
    }

    #[test]
    fn sigmoid_values() {
        let out = ActivationFunction::Sigmoid.activate(&row(&[0.0, 1.0]));
        assert!((out.as_slice()[0] - 0.5).abs() < 1e-12);
        assert!((out.as_slice()[1] - 1.0 / (1.0 + (-1.0f64).exp())).abs() < 1e-12);
        let d = ActivationFunction::Sigmoid.derivative_matrix(&row(&[0.0]));
        assert!((d.as_slice()[0] - 0.25).abs() < 1e-12);
    }

    #[test]
    fn piecewise_kinds() {
        let z = row(&[-2.0, 0.0, 0.5, 3.0]);
        assert_eq!(ActivationFunction::ReLU.activate(&z).as_slice(), &[0.0, 0.0, 0.5, 3.0]);
        assert_eq!(ActivationFunction::ReLU.derivative_matrix(&z).as_slice(), &[0.0, 0.0, 1.0, 1.0]);

        let leaky = ActivationFunction::LeakyReLU { alpha: 0.1 };
        assert_eq!(leaky.activate(&z).as_slice(), &[-0.2, 0.0, 0.5, 3.0]);
        assert_eq!(leaky.derivative_matrix(&z).as_slice(), &[0.1, 0.1, 1.0, 1.0]);

        assert_eq!(ActivationFunction::Sign.activate(&z).as_slice(), &[-1.0, 0.0, 1.0, 1.0]);
        assert_eq!(ActivationFunction::Sign.derivative_matrix(&z).as_slice(), &[0.0; 4]);

        assert_eq!(ActivationFunction::HardTanh.activate(&z).as_slice(), &[-1.0, 0.0, 0.5, 1.0]);
        assert_eq!(ActivationFunction::HardTanh.derivative_matrix(&z).as_slice(), &[0.0, 1.0, 1.0, 0.0]);

        assert_eq!(ActivationFunction::Identity.activate(&z), z);
        assert_eq!(ActivationFunction::Identity.derivative_matrix(&z).as_slice(), &[1.0; 4]);
    }

    #[test]
    fn tanh_derivative_matches_identity() {
        let z = row(&[0.3]);
        let t = 0.3f64.tanh();
        assert!((ActivationFunction::Tanh.derivative_matrix(&z).as_slice()[0] - (1.0 - t * t)).abs() < 1e-12);
    }

    #[test]
    fn softmax_prime_is_diagonal_term() {
        let z = row(&[1.0, 2.0]);
        let o = ActivationFunction::Softmax.activate(&z);
        let d = ActivationFunction::Softmax.derivative_matrix(&z);
        for (oi, di) in o.as_slice().iter().zip(d.as_slice()) {
            assert!((oi * (1.0 - oi) - di).abs() < 1e-12);
        }
    }

    #[test]
    fn serde_tags_are_snake_case() {
        let json = serde_json::to_string(&ActivationFunction::ReLU).unwrap();
        assert_eq!(json, r#"{"type":"relu"}"#);
        let leaky: ActivationFunction = serde_json::from_str(r#"{"type":"leaky_relu"}"#).unwrap();
        assert_eq!(leaky, ActivationFunction::LeakyReLU { alpha: DEFAULT_LEAK });
        let hard: ActivationFunction = serde_json::from_str(r#"{"type":"hard_tanh"}"#).unwrap();
        assert_eq!(hard, ActivationFunction::HardTanh);
    }

    #[test]
    fn validate_rejects_nan_leak() {
        assert!(ActivationFunction::LeakyReLU { alpha: f64::NAN }.validate().is_err());
        assert!(ActivationFunction::leaky_relu().validate().is_ok());
    }
}
