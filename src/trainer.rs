//! Utilities for training neural networks.

use crate::error::{check_len, Error, Result, Shape};
use crate::network::Network;

use serde_derive::{Deserialize, Serialize};
use std::fmt;
use std::time::Instant;
use tracing::{debug, info, instrument};

/// Trains a `Network` by online gradient descent with momentum.
///
/// Every field has a default, so a `Trainer` can be read from a partial
/// configuration file.
#[derive(Copy, Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Trainer {
    iterations: usize,
    learning_rate: f64,
    momentum: f64,
    logging: Logging,
}

impl Default for Trainer {
    fn default() -> Self {
        Trainer {
            iterations: 1000,
            learning_rate: 0.6,
            momentum: 0.4,
            logging: Logging::Iterations(1000),
        }
    }
}

impl Trainer {
    /// Creates a new Trainer instance.
    ///
    /// The trainer is initialized with some default values. These defaults are:
    ///
    /// * Runs 1000 training iterations.
    /// * A learning rate of 0.6.
    /// * A momentum factor of 0.4.
    /// * Logs progress every 1000 iterations.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the number of passes over the training data.
    pub fn iterations(mut self, iterations: usize) -> Self {
        self.iterations = iterations;
        self
    }

    /// Sets the learning rate to use during gradient descent.
    pub fn learning_rate(mut self, rate: f64) -> Self {
        self.learning_rate = rate;
        self
    }

    /// Sets the fraction of the previous weight change added to each update.
    pub fn momentum(mut self, factor: f64) -> Self {
        self.momentum = factor;
        self
    }

    /// Sets the type of logging to be emitted during training.
    pub fn logging(mut self, logging: Logging) -> Self {
        self.logging = logging;
        self
    }

    /// Trains `network` using the provided labelled data.
    ///
    /// The provided `examples` should be a list of labelled data, where each
    /// element takes the form `(network input, expected output)`. They are
    /// presented in order, and the weights are updated after every example.
    /// Training continues from the current weights of `network`.
    ///
    /// Returns:
    ///   The summed error of every iteration, or an error if invalid training
    ///   parameters were provided, in which case `network` is untouched.
    #[instrument(level = "debug", skip(self, network, examples), fields(count = examples.len()), err)]
    pub fn train<I, O>(&self, network: &mut Network, examples: &[(I, O)]) -> Result<Vec<f64>>
    where
        I: AsRef<[f64]>,
        O: AsRef<[f64]>,
    {
        self.validate()?;
        validate_examples(network, examples)?;

        let start_time = Instant::now();
        let mut errors = Vec::with_capacity(self.iterations);
        for iteration in 0..self.iterations {
            let mut training_error = 0.0;
            for (input, expected) in examples {
                network.forward(input.as_ref())?;
                training_error +=
                    network.backward(expected.as_ref(), self.learning_rate, self.momentum)?;
            }
            self.logging.iteration(iteration, training_error);
            errors.push(training_error);
        }
        self.logging.completion(&errors, start_time);
        Ok(errors)
    }

    /// Verifies that all hyperparameters are valid, returning an error if
    /// something is wrong.
    fn validate(&self) -> Result<()> {
        if self.iterations == 0 {
            return Err(Error::InvalidParameter("iterations", 0.0));
        }
        if !(self.learning_rate.is_finite() && self.learning_rate > 0.0) {
            return Err(Error::InvalidParameter("learning rate", self.learning_rate));
        }
        if !(self.momentum.is_finite() && self.momentum >= 0.0) {
            return Err(Error::InvalidParameter("momentum", self.momentum));
        }
        Ok(())
    }
}

/// Verifies every example fits the network's input and output layers.
fn validate_examples<I, O>(network: &Network, examples: &[(I, O)]) -> Result<()>
where
    I: AsRef<[f64]>,
    O: AsRef<[f64]>,
{
    for (input, output) in examples {
        check_len(Shape::Input, network.inputs(), input.as_ref().len())?;
        check_len(Shape::Target, network.outputs(), output.as_ref().len())?;
    }
    Ok(())
}

/// The output a network produced for one example.
#[derive(Clone, Debug, PartialEq)]
pub struct Evaluation {
    pub input: Vec<f64>,
    pub output: Vec<f64>,
    pub target: Vec<f64>,
}

impl fmt::Display for Evaluation {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{:?} -> {:?} : {:?}", self.input, self.output, self.target)
    }
}

/// Runs every example through `network` without training it.
///
/// Weights are left alone, but activations and context units advance just as
/// they do for any forward pass. Only input lengths are checked, since the
/// targets are just carried into each `Evaluation`.
pub fn evaluate<I, O>(network: &mut Network, examples: &[(I, O)]) -> Result<Vec<Evaluation>>
where
    I: AsRef<[f64]>,
    O: AsRef<[f64]>,
{
    for (input, _) in examples {
        check_len(Shape::Input, network.inputs(), input.as_ref().len())?;
    }
    examples
        .iter()
        .map(|(input, target)| -> Result<Evaluation> {
            let evaluation = Evaluation {
                input: input.as_ref().to_vec(),
                output: network.predict(input.as_ref())?,
                target: target.as_ref().to_vec(),
            };
            debug!(%evaluation, "evaluated");
            Ok(evaluation)
        })
        .collect()
}

/// Logging frequency to use during training
#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum Logging {
    /// No logs will be emitted
    Silent,
    /// A summary will be emitted at completion
    Completion,
    /// Progress will be emitted every `n` training iterations, starting with
    /// the first, followed by a summary
    Iterations(usize),
}

impl Logging {
    /// Performs logging at the current `iteration` of training.
    fn iteration(&self, iteration: usize, training_error: f64) {
        if let Logging::Iterations(freq) = *self {
            if freq > 0 && iteration % freq == 0 {
                info!(iteration, error = training_error, "training");
            }
        }
    }

    /// Performs logging at the end of training.
    fn completion(&self, errors: &[f64], start_time: Instant) {
        if let Logging::Silent = self {
            return;
        }
        info!(
            iterations = errors.len(),
            error = errors.last().copied().unwrap_or_default(),
            elapsed = ?start_time.elapsed(),
            "training completed"
        );
    }
}
