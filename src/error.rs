//! Error types.

use std::fmt;
use std::io;
use thiserror::Error;

/// Result type alias for this crate.
pub type Result<T> = std::result::Result<T, Error>;

/// Which caller-supplied vector had the wrong length.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Shape {
    /// An input vector passed to the forward pass.
    Input,
    /// A target vector passed to the backward pass.
    Target,
    /// A preset context slot.
    Context,
}

impl fmt::Display for Shape {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(match self {
            Shape::Input => "input",
            Shape::Target => "target",
            Shape::Context => "context",
        })
    }
}

/// Everything that can go wrong while building, training or storing a
/// network.
#[derive(Error, Debug)]
pub enum Error {
    /// A vector did not match the network's configured size.
    #[error("{what} vector has length {actual}, expected {expected}")]
    ShapeMismatch {
        what: Shape,
        expected: usize,
        actual: usize,
    },

    /// A layer was requested with no units.
    #[error("layer sizes must be positive, got {inputs}-{hiddens}-{outputs}")]
    InvalidSize {
        inputs: usize,
        hiddens: usize,
        outputs: usize,
    },

    /// A training hyperparameter was out of range.
    #[error("invalid {0}: {1}")]
    InvalidParameter(&'static str, f64),

    /// A decoded network breaks one of its own invariants.
    #[error("corrupt network: {0}")]
    Corrupt(String),

    /// Reading or writing a saved network failed.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// A saved network is not valid JSON for this format.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl Error {
    /// Returns true if this is a [`Error::ShapeMismatch`] for `shape`.
    pub fn is_shape_mismatch(&self, shape: Shape) -> bool {
        matches!(self, Error::ShapeMismatch { what, .. } if *what == shape)
    }
}

/// Fails with a [`Error::ShapeMismatch`] unless `actual == expected`.
pub(crate) fn check_len(what: Shape, expected: usize, actual: usize) -> Result<()> {
    if actual == expected {
        Ok(())
    } else {
        Err(Error::ShapeMismatch {
            what,
            expected,
            actual,
        })
    }
}
