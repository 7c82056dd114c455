/// MNIST digit classification.
///
/// Architecture: 784 -> 128 (ReLU) -> 10 (Softmax)
/// Loss:         cross-entropy (fused with Softmax: delta = prediction - target)
/// Optimizer:    SGD, lr = 0.1 on batch-averaged gradients
/// Batch size:   32
/// Epochs:       10
///
/// Run with:
///   cargo run --example mnist --release -- [train.csv] [test.csv]
///
/// Both files hold one sample per line, the digit label first and then the
/// 784 pixel values in [0, 255]. Defaults: data/mnist/mnist_train.csv and
/// data/mnist/mnist_test.csv.

use std::env;
use std::io::{self, Write};
use std::sync::mpsc;
use std::thread;

use ferrite_mlp::data::csv::load_csv;
use ferrite_mlp::network::summary::write_summary;
use ferrite_mlp::{
    train_loop, ActivationFunction, LabelMode, LayerSpec, LossType, NetworkSpec, TrainConfig, WeightInit,
};

const PIXELS: usize = 784;
const CLASSES: usize = 10;

fn main() -> ferrite_mlp::Result<()> {
    let mut args = env::args().skip(1);
    let train_path = args.next().unwrap_or_else(|| "data/mnist/mnist_train.csv".into());
    let test_path = args.next().unwrap_or_else(|| "data/mnist/mnist_test.csv".into());

    let mut stdout = io::stdout().lock();
    writeln!(stdout, "Loading {train_path} and {test_path}")?;

    let labels = LabelMode::LeadingClassIndex { n_classes: CLASSES };
    let mut train = load_csv(&train_path, labels)?;
    let mut test = load_csv(&test_path, labels)?;
    train.normalize(255.0)?;
    test.normalize(255.0)?;
    writeln!(stdout, "{} training and {} test samples", train.len(), test.len())?;

    let spec = NetworkSpec {
        name: "mnist".into(),
        layers: vec![
            LayerSpec { size: 128, input_size: PIXELS, activation: ActivationFunction::ReLU },
            LayerSpec { size: CLASSES, input_size: 128, activation: ActivationFunction::Softmax },
        ],
        loss: LossType::CrossEntropy,
        init: WeightInit::He,
    };
    let mut network = spec.build()?;
    write_summary(&mut stdout, &network)?;

    let (tx, rx) = mpsc::channel();
    let mut config = TrainConfig::new(10, 32, spec.loss);
    config.progress_tx = Some(tx);
    let optimizer = config.optimizer();

    let net = &mut network;
    let (train_set, test_set) = (&train, &test);
    let final_loss = thread::scope(|s| -> ferrite_mlp::Result<f64> {
        // The sender lives in `config`; `rx` drains until the worker drops it.
        let trainer = s.spawn(move || {
            train_loop(
                net,
                &train_set.inputs,
                &train_set.labels,
                Some((&test_set.inputs, &test_set.labels)),
                &optimizer,
                &config,
            )
        });
        for stats in rx {
            writeln!(
                stdout,
                "Epoch {:>2}/{}: loss {:.4}, train acc {:.2}%, test acc {:.2}% ({} ms)",
                stats.epoch,
                stats.total_epochs,
                stats.train_loss,
                stats.train_accuracy.unwrap_or(0.0) * 100.0,
                stats.val_accuracy.unwrap_or(0.0) * 100.0,
                stats.elapsed_ms,
            )?;
        }
        trainer.join().unwrap_or_else(|e| std::panic::resume_unwind(e))
    })?;

    let predicted = network.forward(&test.inputs)?.argmax_rows();
    let expected = test.labels.argmax_rows();
    let correct = predicted.iter().zip(&expected).filter(|(p, e)| p == e).count();
    writeln!(stdout, "Final training loss: {final_loss:.4}")?;
    writeln!(
        stdout,
        "Test accuracy: {}/{} ({:.2}%)",
        correct,
        expected.len(),
        correct as f64 / expected.len() as f64 * 100.0
    )?;
    Ok(())
}
