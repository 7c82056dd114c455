pub mod activation;
pub mod cache;
pub mod data;
pub mod error;
pub mod layers;
pub mod loss;
pub mod math;
pub mod network;
pub mod optim;
pub mod train;

// Convenience re-exports
pub use activation::activation::ActivationFunction;
pub use cache::{Cache, CacheKey};
pub use data::csv::{Dataset, LabelMode};
pub use error::{NnError, Result};
pub use layers::dense::{Layer, WeightInit};
pub use loss::loss_type::LossType;
pub use math::matrix::{Axis, Matrix};
pub use network::network::Network;
pub use network::spec::{LayerSpec, NetworkSpec};
pub use optim::sgd::Sgd;
pub use train::{train_loop, train_network, train_step, EpochStats, TrainConfig};
