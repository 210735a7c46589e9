//! Error type shared by the network, the training driver and the data loaders.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum NnError {
    #[error("Invalid network size: {name} must be positive, got {value}")]
    InvalidSize { name: &'static str, value: usize },

    #[error("Dimension mismatch for {what}: expected {expected}, got {actual}")]
    DimensionMismatch {
        what: &'static str,
        expected: usize,
        actual: usize,
    },

    #[error("Ragged matrix: row {row} has {actual} columns, expected {expected}")]
    RaggedMatrix {
        row: usize,
        expected: usize,
        actual: usize,
    },

    #[error("Invalid hyperparameter {name}: {value}")]
    InvalidHyperparameter { name: &'static str, value: f64 },

    #[error("Dataset is empty")]
    EmptyDataset,

    #[error("Label {label} at index {index} is out of range for {n_classes} classes")]
    LabelOutOfRange {
        index: usize,
        label: usize,
        n_classes: usize,
    },

    #[error("IDX format error: {0}")]
    Idx(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Image error: {0}")]
    Image(#[from] image::ImageError),
}
