use crate::activator::Activator;
use crate::matrix::Mat;

use rand::distributions::Uniform;
use rand::Rng;
use serde_derive::{Deserialize, Serialize};

/// The range initial weights are drawn from.
pub(crate) fn initial_weights() -> Uniform<f64> {
    Uniform::new(-1.0, 1.0)
}

/// A wrapper for a fully connected layer of a neural network
///
/// The weights are stored with one row per source unit and one column per
/// destination unit, next to the change applied by the previous update.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Dense {
    /// The activation function to be used for every neuron in the layer.
    activator: Activator,
    weights: Mat,
    /// The last weight change, blended into the next one.
    momentum: Mat,
}

impl Dense {
    /// Initializes a new, untrained layer.
    ///
    /// Arguments:
    ///
    ///  * `activator` - the activation function to be used for this layer's
    ///                  output.
    ///  * `inputs` - the number of inputs to this layer, bias included.
    ///  * `outputs` - the number of outputs from this layer.
    pub fn new<R>(rng: &mut R, activator: Activator, inputs: usize, outputs: usize) -> Self
    where
        R: Rng + ?Sized,
    {
        Dense {
            activator,
            weights: Mat::random(&initial_weights(), rng, inputs, outputs),
            momentum: Mat::zeros(inputs, outputs),
        }
    }

    pub fn activator(&self) -> Activator {
        self.activator
    }

    pub fn weights(&self) -> &Mat {
        &self.weights
    }

    pub fn momentum(&self) -> &Mat {
        &self.momentum
    }

    /// Overwrites `sums` with the weighted sums of `inputs`, before
    /// activation.
    pub fn sum(&self, inputs: &[f64], sums: &mut [f64]) {
        sums.iter_mut().for_each(|s| *s = 0.0);
        self.weights.feed(inputs, sums);
    }

    /// Applies the activation function in place.
    pub fn activate(&self, sums: &mut [f64]) {
        for y in sums {
            *y = self.activator.f(*y);
        }
    }

    /// Feeds the provided `inputs` forward through the layer.
    pub fn forward(&self, inputs: &[f64], outputs: &mut [f64]) {
        self.sum(inputs, outputs);
        self.activate(outputs);
    }

    /// Scales raw output `errors` by the activation slope at `outputs`,
    /// turning them into error signals.
    pub fn signal(&self, outputs: &[f64], errors: &mut [f64]) {
        for (y, e) in outputs.iter().zip(errors) {
            *e *= self.activator.fprime(*y);
        }
    }

    /// Carries the error `signals` of this layer back to its inputs,
    /// accumulating into `input_errors`.
    pub fn backward(&self, signals: &[f64], input_errors: &mut [f64]) {
        self.weights.feed_back(signals, input_errors);
    }

    /// Moves the weights along the error `signals`, with momentum.
    pub fn descend(&mut self, rate: f64, factor: f64, inputs: &[f64], signals: &[f64]) {
        self.weights
            .descend(&mut self.momentum, rate, factor, inputs, signals);
    }

    /// Returns true if both matrices have the given shape.
    pub(crate) fn has_shape(&self, inputs: usize, outputs: usize) -> bool {
        self.weights.shape() == (inputs, outputs) && self.momentum.shape() == (inputs, outputs)
    }
}
