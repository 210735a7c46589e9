pub mod network;

pub use network::{argmax, NetworkParameters, NeuralNetwork};
