pub mod cache;

pub use cache::{Cache, CacheKey};
