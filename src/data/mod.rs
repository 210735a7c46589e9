pub mod idx;
pub mod image;

pub use idx::Dataset;
