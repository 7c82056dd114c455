use std::io::{self, Write};

use ferrite_mlp::network::summary::{write_predictions, write_summary};
use ferrite_mlp::{train_step, ActivationFunction, Dataset, LossType, Network, Sgd};

fn main() -> ferrite_mlp::Result<()> {
    let xor = Dataset::xor()?;

    let mut network = Network::dense(2, &[
        (4, ActivationFunction::ReLU),
        (1, ActivationFunction::Sigmoid),
    ])?;

    let mut stdout = io::stdout().lock();
    write_summary(&mut stdout, &network)?;

    let optimizer = Sgd::new(0.1);
    let epochs = 2000;
    writeln!(stdout, "Training XOR for {epochs} epochs, learning rate {:.2}", optimizer.learning_rate)?;

    for epoch in 0..epochs {
        let loss = train_step(&mut network, &xor.inputs, &xor.labels, LossType::Mse, &optimizer)?;
        if epoch % 100 == 0 || epoch + 1 == epochs {
            writeln!(stdout, "Epoch {epoch}/{epochs}: loss = {loss:.6}")?;
        }
    }

    write_predictions(&mut stdout, &mut network, &xor.inputs, &xor.labels)?;
    Ok(())
}
