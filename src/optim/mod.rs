pub mod sgd;

pub use sgd::{clamp, Sgd};
