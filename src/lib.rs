//! A multilayer perceptron trained by backpropagation with momentum, with
//! optional Elman context units for learning from sequences.

pub mod activator;
pub mod context;
pub mod error;
pub mod network;
pub mod persist;
pub mod trainer;

mod layer;
mod matrix;

pub use crate::error::{Error, Result, Shape};
pub use crate::matrix::Mat;
pub use crate::network::Network;
pub use crate::trainer::{evaluate, Evaluation, Logging, Trainer};
