use std::io::Write;

use crate::error::{NnError, Result};
use crate::math::matrix::Matrix;
use crate::network::network::Network;

const RULE: &str = "==================================";
const THIN_RULE: &str = "----------------------------------";

/// Writes the layer count and, per layer, the weight/bias shapes and the
/// activation name.
pub fn write_summary<W: Write>(out: &mut W, network: &Network) -> Result<()> {
    writeln!(out, "{RULE}")?;
    writeln!(out, "{:^34}", "Network Summary")?;
    writeln!(out, "{RULE}")?;
    writeln!(out, "Layers:     {}", network.len())?;
    writeln!(out, "Parameters: {}", network.parameter_count())?;
    for (i, layer) in network.layers().iter().enumerate() {
        let (w_rows, w_cols) = layer.weights().shape();
        let (b_rows, b_cols) = layer.bias().shape();
        writeln!(out, "{THIN_RULE}")?;
        writeln!(out, "Layer {}:", i + 1)?;
        writeln!(out, "  weights:    {w_rows} x {w_cols}")?;
        writeln!(out, "  bias:       {b_rows} x {b_cols}")?;
        writeln!(out, "  activation: {}", layer.activation())?;
    }
    writeln!(out, "{RULE}")?;
    Ok(())
}

/// Runs `x` through the network and writes one line per row: the input,
/// the expected values, the prediction, and the prediction rounded.
pub fn write_predictions<W: Write>(out: &mut W, network: &mut Network, x: &Matrix, y: &Matrix) -> Result<()> {
    let predictions = network.forward(x)?;
    if predictions.shape() != y.shape() {
        return Err(NnError::shape("write_predictions", predictions.shape(), y.shape()));
    }

    writeln!(out, "{RULE}")?;
    writeln!(out, "{:^34}", "Predictions")?;
    writeln!(out, "{RULE}")?;
    writeln!(out, "input -> expected | predicted (rounded)")?;
    writeln!(out, "{THIN_RULE}")?;
    for i in 0..x.rows() {
        let predicted = predictions.row(i);
        writeln!(
            out,
            "({}) -> {} | {} ({})",
            join(x.row(i), |v| format!("{v}")),
            join(y.row(i), |v| format!("{v}")),
            join(predicted, |v| format!("{v:.4}")),
            join(predicted, |v| format!("{:.0}", v.round())),
        )?;
    }
    writeln!(out, "{RULE}")?;
    Ok(())
}

/// Logs the loss at `info` level on every hundredth epoch and on the last
/// one. `epoch` counts from zero.
pub fn log_progress(epoch: usize, epochs: usize, loss: f64) {
    if epoch % 100 == 0 || epoch + 1 == epochs {
        log::info!("epoch {}/{}, loss: {:.6}", epoch, epochs, loss);
    }
}

fn join(values: &[f64], fmt: impl Fn(f64) -> String) -> String {
    values.iter().map(|v| fmt(*v)).collect::<Vec<_>>().join(", ")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::activation::activation::ActivationFunction;
    use crate::layers::dense::Layer;

    #[test]
    fn summary_lists_every_layer() {
        let net = Network::dense(2, &[(4, ActivationFunction::ReLU), (1, ActivationFunction::Sigmoid)]).unwrap();
        let mut buf = Vec::new();
        write_summary(&mut buf, &net).unwrap();
        let text = String::from_utf8(buf).unwrap();
        assert!(text.contains("Layers:     2"));
        assert!(text.contains("Parameters: 17"));
        assert!(text.contains("weights:    2 x 4"));
        assert!(text.contains("bias:       1 x 1"));
        assert!(text.contains("activation: RELU"));
        assert!(text.contains("activation: SIGMOID"));
    }

    #[test]
    fn predictions_table_rounds_outputs() {
        let w = Matrix::from_vec(1, 1, vec![1.0]).unwrap();
        let layer = Layer::from_parts(w, Matrix::zeros(1, 1), ActivationFunction::Identity).unwrap();
        let mut net = Network::new(vec![layer]).unwrap();
        let x = Matrix::from_vec(2, 1, vec![0.25, 0.75]).unwrap();
        let y = Matrix::from_vec(2, 1, vec![0.0, 1.0]).unwrap();
        let mut buf = Vec::new();
        write_predictions(&mut buf, &mut net, &x, &y).unwrap();
        let text = String::from_utf8(buf).unwrap();
        assert!(text.contains("(0.25) -> 0 | 0.2500 (0)"));
        assert!(text.contains("(0.75) -> 1 | 0.7500 (1)"));
    }

    #[test]
    fn predictions_reject_mismatched_targets() {
        let mut net = Network::dense(2, &[(1, ActivationFunction::Sigmoid)]).unwrap();
        let x = Matrix::zeros(3, 2);
        let mut buf = Vec::new();
        assert!(write_predictions(&mut buf, &mut net, &x, &Matrix::zeros(3, 2)).is_err());
    }
}
