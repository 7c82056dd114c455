pub mod activation;
pub mod softmax;

pub use activation::{ActivationFunction, DEFAULT_LEAK};
