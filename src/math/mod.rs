pub mod io;
pub mod matrix;
pub mod ops;
pub(crate) mod par;

pub use matrix::{Axis, Matrix};
