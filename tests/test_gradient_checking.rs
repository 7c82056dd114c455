// Finite-difference checks of the backward pass.
//
// The backward pass does not divide by the batch, so every analytic gradient
// is compared against `normalizer * dL/dθ` where `normalizer` is the divisor
// the scalar loss applies.

use approx::relative_eq;
use ferrite_mlp::{ActivationFunction, Layer, LossType, Matrix, Network, WeightInit};
use rand::rngs::StdRng;
use rand::SeedableRng;

const STEP: f64 = 1e-5;

fn hidden_kinds() -> Vec<ActivationFunction> {
    vec![
        ActivationFunction::Sigmoid,
        ActivationFunction::ReLU,
        ActivationFunction::Tanh,
        ActivationFunction::leaky_relu(),
        ActivationFunction::Sign,
        ActivationFunction::Identity,
        ActivationFunction::HardTanh,
        ActivationFunction::Softmax,
    ]
}

fn regression_targets() -> Matrix {
    Matrix::from_rows(&[vec![0.9, -0.3], vec![0.1, 0.5]]).unwrap()
}

fn class_targets() -> Matrix {
    Matrix::from_rows(&[vec![1.0, 0.0], vec![0.0, 1.0]]).unwrap()
}

fn inputs() -> Matrix {
    Matrix::from_rows(&[vec![0.3, -0.7, 0.45], vec![-0.2, 0.6, 0.9]]).unwrap()
}

fn build(hidden: ActivationFunction, output: ActivationFunction, seed: u64) -> Network {
    let mut rng = StdRng::seed_from_u64(seed);
    let l0 = Layer::with_init(3, 4, hidden, WeightInit::Xavier, &mut rng).unwrap();
    let l1 = Layer::with_init(4, 2, output, WeightInit::Xavier, &mut rng).unwrap();
    // Non-zero biases so the check also exercises the bias path.
    let b0 = Matrix::from_vec(1, 4, vec![0.05, -0.1, 0.15, 0.02]).unwrap();
    let b1 = Matrix::from_vec(1, 2, vec![-0.05, 0.1]).unwrap();
    let l0 = Layer::from_parts(l0.weights().clone(), b0, hidden).unwrap();
    let l1 = Layer::from_parts(l1.weights().clone(), b1, output).unwrap();
    Network::new(vec![l0, l1]).unwrap()
}

fn loss_at(net: &mut Network, x: &Matrix, y: &Matrix, loss: LossType) -> f64 {
    let y_hat = net.forward(x).unwrap();
    loss.loss(&y_hat, y).unwrap()
}

/// Central difference of the loss with respect to one parameter of one layer.
fn numeric(net: &mut Network, layer: usize, bias: bool, r: usize, c: usize, x: &Matrix, y: &Matrix, loss: LossType) -> f64 {
    let original_w = net.layers()[layer].weights().clone();
    let original_b = net.layers()[layer].bias().clone();

    let mut eval = |delta: f64| {
        let (mut w, mut b) = (original_w.clone(), original_b.clone());
        if bias {
            b.set(r, c, b.get(r, c) + delta);
        } else {
            w.set(r, c, w.get(r, c) + delta);
        }
        net.layer_mut(layer).unwrap().replace_parameters(w, b).unwrap();
        loss_at(net, x, y, loss)
    };
    let plus = eval(STEP);
    let minus = eval(-STEP);
    net.layer_mut(layer).unwrap().replace_parameters(original_w, original_b).unwrap();

    (plus - minus) / (2.0 * STEP)
}

fn check(hidden: ActivationFunction, output: ActivationFunction, loss: LossType, y: &Matrix) {
    let x = inputs();
    let mut net = build(hidden, output, 42);
    net.forward(&x).unwrap();
    net.backward(y, loss).unwrap();
    let analytic = net.gradients().unwrap();
    let norm = loss.normalizer(y.rows(), y.cols());

    for (i, (dw, db)) in analytic.iter().enumerate() {
        for (bias, grad) in [(false, dw), (true, db)] {
            for r in 0..grad.rows() {
                for c in 0..grad.cols() {
                    let expected = numeric(&mut net, i, bias, r, c, &x, y, loss) * norm;
                    let got = grad.get(r, c);
                    assert!(
                        relative_eq!(got, expected, epsilon = 1e-6, max_relative = 1e-4),
                        "{hidden} -> {output} with {}: layer {i} {} [{r},{c}] analytic {got} vs numeric {expected}",
                        loss.name(),
                        if bias { "bias" } else { "weights" },
                    );
                }
            }
        }
    }
}

/// Output kinds whose values stay inside (0, 1), where the log-based losses
/// are defined.
fn probability_kinds() -> Vec<ActivationFunction> {
    vec![ActivationFunction::Sigmoid, ActivationFunction::Softmax]
}

#[test]
fn mse_gradients_match_finite_differences() {
    // Softmax outputs go through the full Jacobian here.
    for hidden in hidden_kinds() {
        for output in hidden_kinds() {
            check(hidden, output, LossType::Mse, &regression_targets());
        }
    }
}

#[test]
fn mae_gradients_match_finite_differences() {
    for hidden in hidden_kinds() {
        for output in hidden_kinds() {
            check(hidden, output, LossType::Mae, &regression_targets());
        }
    }
}

#[test]
fn bce_gradients_match_finite_differences() {
    for hidden in hidden_kinds() {
        for output in probability_kinds() {
            check(hidden, output, LossType::BinaryCrossEntropy, &class_targets());
        }
    }
}

#[test]
fn cross_entropy_gradients_match_finite_differences() {
    for hidden in hidden_kinds() {
        // Softmax takes the fused delta, Sigmoid the loss gradient times its derivative.
        for output in probability_kinds() {
            check(hidden, output, LossType::CrossEntropy, &class_targets());
        }
    }
}

#[test]
fn softmax_output_with_mse_uses_full_jacobian() {
    for hidden in hidden_kinds() {
        check(hidden, ActivationFunction::Softmax, LossType::Mse, &class_targets());
    }
}
