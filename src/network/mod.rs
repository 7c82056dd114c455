pub mod backprop;
pub mod network;
pub mod spec;
pub mod summary;

pub use backprop::{bias_gradient, weight_gradient};
pub use network::Network;
pub use spec::{LayerSpec, NetworkSpec};
