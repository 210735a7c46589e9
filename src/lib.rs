pub mod errors;
pub mod math;
pub mod activation;
pub mod optim;
pub mod loss;
pub mod network;
pub mod train;
pub mod data;

// Convenience re-exports
pub use errors::nn_error::NnError;
pub use math::matrix::Matrix;
pub use activation::activation::sigmoid;
pub use optim::sgd::{clamp, Sgd};
pub use loss::mse::MseLoss;
pub use network::network::{argmax, NeuralNetwork};
pub use train::{evaluate, train_loop, train_network, EpochStats, Evaluation, TrainConfig};
pub use data::idx::Dataset;
