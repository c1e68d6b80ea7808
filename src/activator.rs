//! Activation function types.

use serde_derive::{Deserialize, Serialize};

/// [Activation function](https://en.wikipedia.org/wiki/Activation_function)
/// types.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum Activator {
    /// Logistic sigmoid, squashing into `(0, 1)`.
    Sigmoid,
    /// Identity, used by the output layer of regression networks.
    Identity,
}

impl Activator {
    /// Evaluates `f(x)` for the selected the activation function.
    pub fn f(self, x: f64) -> f64 {
        match self {
            Activator::Sigmoid => sigmoid(x),
            Activator::Identity => x,
        }
    }

    /// Evaluates the derivative `f'(x)`, where `x = f^{-1}(y)`.
    ///
    /// Note that this function takes in the *output* of the activation
    /// function, rather than the input. This is an optimization that means we
    /// don't have to store the intermediate results before activation.
    pub fn fprime(self, y: f64) -> f64 {
        match self {
            Activator::Sigmoid => dsigmoid(y),
            Activator::Identity => 1.0,
        }
    }
}

/// The logistic function `1 / (1 + e^-x)`.
#[inline]
pub fn sigmoid(x: f64) -> f64 {
    1.0 / (1.0 + (-x).exp())
}

/// The derivative of [`sigmoid`], expressed in terms of its output `y`.
#[inline]
pub fn dsigmoid(y: f64) -> f64 {
    y * (1.0 - y)
}
