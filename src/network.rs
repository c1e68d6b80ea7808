//! A single hidden layer [multilayer perceptron]
//! (https://en.wikipedia.org/wiki/Multilayer_perceptron), optionally extended
//! into an [Elman network]
//! (https://en.wikipedia.org/wiki/Recurrent_neural_network#Elman_networks_and_Jordan_networks)
//! by context units.
//!
//! # Example
//!
//! Let's train a simple neural network to compute the XOR function:
//!
//! ```
//! # use elman::network::Network;
//! # use elman::trainer::{Logging, Trainer};
//! # use rand::{rngs::StdRng, SeedableRng};
//! // Create examples of the XOR function
//! let examples = [([0.0, 0.0], [0.0]),
//!                 ([0.0, 1.0], [1.0]),
//!                 ([1.0, 0.0], [1.0]),
//!                 ([1.0, 1.0], [0.0])];
//!
//! // Train a network using those examples
//! let mut rng = StdRng::seed_from_u64(1);
//! let mut network = Network::new(&mut rng, 2, 4, 1, false).unwrap();
//! let errors = Trainer::new()
//!     .learning_rate(0.6)
//!     .momentum(0.4)
//!     .iterations(5000)
//!     .logging(Logging::Silent)
//!     .train(&mut network, &examples[..])
//!     .unwrap();
//! assert!(errors[4999] < errors[0]);
//!
//! // And verify the network correctly computes XOR!
//! for (input, expected) in &examples {
//!     let output = network.forward(input).unwrap();
//!     assert_eq!(output[0] > 0.5, expected[0] > 0.5);
//! }
//! ```

use crate::activator::Activator;
use crate::context::Context;
use crate::error::{check_len, Error, Result, Shape};
use crate::layer::Dense;
use crate::matrix::Mat;

use rand::Rng;
use serde_derive::{Deserialize, Serialize};

/// The activation of the bias units.
pub const BIAS: f64 = 1.0;

/// A multilayer perceptron with one hidden layer.
///
/// The input and hidden layers each carry an extra bias unit in their last
/// position, whose activation is always [`BIAS`].
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Network {
    input_activations: Vec<f64>,
    hidden_activations: Vec<f64>,
    output_activations: Vec<f64>,
    /// Weights from every input unit to every non-bias hidden unit.
    input: Dense,
    /// Weights from every hidden unit to every output unit.
    output: Dense,
    contexts: Option<Context>,
}

impl Network {
    /// Creates a new, untrained neural network.
    ///
    /// Arguments:
    ///  * `rng` - the source the initial weights are drawn from.
    ///  * `inputs`, `hiddens`, `outputs` - the number of neurons in each
    ///    layer, not counting bias units.
    ///  * `regression` - if set, outputs are left linear instead of squashed
    ///    through the sigmoid.
    pub fn new<R>(
        rng: &mut R,
        inputs: usize,
        hiddens: usize,
        outputs: usize,
        regression: bool,
    ) -> Result<Self>
    where
        R: Rng + ?Sized,
    {
        if inputs == 0 || hiddens == 0 || outputs == 0 {
            return Err(Error::InvalidSize {
                inputs,
                hiddens,
                outputs,
            });
        }
        let output_activator = if regression {
            Activator::Identity
        } else {
            Activator::Sigmoid
        };
        Ok(Network {
            input_activations: vec![BIAS; inputs + 1],
            hidden_activations: vec![BIAS; hiddens + 1],
            output_activations: vec![BIAS; outputs],
            input: Dense::new(rng, Activator::Sigmoid, inputs + 1, hiddens),
            output: Dense::new(rng, output_activator, hiddens + 1, outputs),
            contexts: None,
        })
    }

    /// Adds `depth` context slots, turning the network into a simple
    /// recurrent network. Every slot starts at rest.
    ///
    /// A depth of zero leaves the network feed forward.
    pub fn with_contexts<R>(mut self, rng: &mut R, depth: usize) -> Self
    where
        R: Rng + ?Sized,
    {
        self.contexts = match depth {
            0 => None,
            _ => Some(Context::new(rng, depth, self.hiddens())),
        };
        self
    }

    /// Adds one context slot per entry of `slots`, initialized with the given
    /// values. Each slot must hold one value per non-bias hidden unit.
    pub fn with_preset_contexts<R>(mut self, rng: &mut R, slots: Vec<Vec<f64>>) -> Result<Self>
    where
        R: Rng + ?Sized,
    {
        self.contexts = match slots.len() {
            0 => None,
            _ => Some(Context::preset(rng, slots, self.hiddens())?),
        };
        Ok(self)
    }

    /// Returns the number of inputs, not counting the bias.
    pub fn inputs(&self) -> usize {
        self.input_activations.len() - 1
    }

    /// Returns the number of hidden units, not counting the bias.
    pub fn hiddens(&self) -> usize {
        self.hidden_activations.len() - 1
    }

    /// Returns the number of outputs.
    pub fn outputs(&self) -> usize {
        self.output_activations.len()
    }

    /// Returns true if the output layer is linear.
    pub fn regression(&self) -> bool {
        self.output.activator() == Activator::Identity
    }

    pub fn input_activations(&self) -> &[f64] {
        &self.input_activations
    }

    pub fn hidden_activations(&self) -> &[f64] {
        &self.hidden_activations
    }

    pub fn output_activations(&self) -> &[f64] {
        &self.output_activations
    }

    /// Returns the `[inputs + 1][hiddens]` input to hidden weights.
    pub fn input_weights(&self) -> &Mat {
        self.input.weights()
    }

    /// Returns the `[hiddens + 1][outputs]` hidden to output weights.
    pub fn output_weights(&self) -> &Mat {
        self.output.weights()
    }

    pub fn input_momentum(&self) -> &Mat {
        self.input.momentum()
    }

    pub fn output_momentum(&self) -> &Mat {
        self.output.momentum()
    }

    /// Returns the context units, if any were added.
    pub fn contexts(&self) -> Option<&Context> {
        self.contexts.as_ref()
    }

    /// Returns every context unit to rest, e.g. between unrelated input
    /// sequences. Context weights are kept.
    pub fn reset_contexts(&mut self) {
        if let Some(contexts) = &mut self.contexts {
            contexts.reset();
        }
    }

    /// Feeds the provided `input` through the network, returning the output
    /// layer.
    ///
    /// With context units, this also pushes the new hidden activations into
    /// the context history.
    pub fn forward(&mut self, input: &[f64]) -> Result<&[f64]> {
        check_len(Shape::Input, self.inputs(), input.len())?;
        self.input_activations[..input.len()].copy_from_slice(input);

        let hiddens = self.hiddens();
        let hidden = &mut self.hidden_activations[..hiddens];
        self.input.sum(&self.input_activations, hidden);
        if let Some(contexts) = &mut self.contexts {
            contexts.feed(hidden);
        }
        self.input.activate(hidden);
        if let Some(contexts) = &mut self.contexts {
            contexts.shift(hidden);
        }

        self.output
            .forward(&self.hidden_activations, &mut self.output_activations);
        Ok(&self.output_activations)
    }

    /// Like [`Network::forward`], but returns an owned copy of the outputs.
    pub fn predict(&mut self, input: &[f64]) -> Result<Vec<f64>> {
        self.forward(input).map(<[f64]>::to_vec)
    }

    /// Feeds the `target` for the last forward pass back through the network
    /// and updates every weight by gradient descent with momentum.
    ///
    /// Arguments:
    ///  * `target` - the expected output for the input of the last call to
    ///    [`Network::forward`].
    ///  * `rate` - the learning rate.
    ///  * `momentum` - the fraction of the previous update to add to this
    ///    one.
    ///
    /// Returns half the sum of squared errors of the outputs, as they were
    /// before the update.
    pub fn backward(&mut self, target: &[f64], rate: f64, momentum: f64) -> Result<f64> {
        check_len(Shape::Target, self.outputs(), target.len())?;

        let mut output_signals: Vec<f64> = target
            .iter()
            .zip(&self.output_activations)
            .map(|(t, y)| t - y)
            .collect();
        let error = 0.5 * output_signals.iter().map(|e| e * e).sum::<f64>();
        self.output
            .signal(&self.output_activations, &mut output_signals);

        // Includes the hidden bias, whose signal has no incoming weights.
        let mut hidden_signals = vec![0.0; self.hidden_activations.len()];
        self.output.backward(&output_signals, &mut hidden_signals);
        self.input
            .signal(&self.hidden_activations, &mut hidden_signals);
        let hidden_signals = &hidden_signals[..self.hiddens()];

        self.output.descend(
            rate,
            momentum,
            &self.hidden_activations,
            &output_signals,
        );
        if let Some(contexts) = &mut self.contexts {
            contexts.descend(rate, momentum, hidden_signals);
        }
        self.input
            .descend(rate, momentum, &self.input_activations, hidden_signals);

        Ok(error)
    }

    /// Verifies the structural invariants of a network built elsewhere,
    /// e.g. decoded from storage.
    pub fn check(&self) -> Result<()> {
        let corrupt = |what: &str| Err(Error::Corrupt(what.into()));
        if self.input_activations.len() < 2
            || self.hidden_activations.len() < 2
            || self.output_activations.is_empty()
        {
            return corrupt("every layer needs at least one unit");
        }
        if self.input_activations.last() != Some(&BIAS)
            || self.hidden_activations.last() != Some(&BIAS)
        {
            return corrupt("bias activation is not 1");
        }
        if self.input.activator() != Activator::Sigmoid {
            return corrupt("hidden layer must be sigmoid");
        }
        if !self.input.has_shape(self.inputs() + 1, self.hiddens()) {
            return corrupt("input weights do not match layer sizes");
        }
        if !self.output.has_shape(self.hiddens() + 1, self.outputs()) {
            return corrupt("output weights do not match layer sizes");
        }
        match &self.contexts {
            Some(contexts) if !contexts.fits(self.hiddens()) => {
                corrupt("context units do not match the hidden layer")
            }
            _ => Ok(()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::activator::dsigmoid;
    use rand::rngs::StdRng;
    use rand::SeedableRng;
    use test_strategy::proptest;

    fn rng() -> StdRng {
        StdRng::seed_from_u64(42)
    }

    #[test]
    fn empty_layer() {
        assert!(matches!(
            Network::new(&mut rng(), 2, 0, 1, false),
            Err(Error::InvalidSize { hiddens: 0, .. })
        ));
        assert!(Network::new(&mut rng(), 0, 2, 1, false).is_err());
        assert!(Network::new(&mut rng(), 2, 2, 0, false).is_err());
    }

    #[proptest]
    fn weight_shapes_follow_layer_sizes(
        #[strategy(1usize..8)] i: usize,
        #[strategy(1usize..8)] h: usize,
        #[strategy(1usize..8)] o: usize,
    ) {
        let network = Network::new(&mut rng(), i, h, o, false).unwrap();
        assert_eq!(network.input_weights().shape(), (i + 1, h));
        assert_eq!(network.output_weights().shape(), (h + 1, o));
        assert_eq!(network.input_momentum(), &Mat::zeros(i + 1, h));
        assert_eq!(network.output_momentum(), &Mat::zeros(h + 1, o));
        assert_eq!(network.input_activations(), &vec![BIAS; i + 1][..]);
        assert_eq!(network.hidden_activations(), &vec![BIAS; h + 1][..]);
        assert!(network.contexts().is_none());
        assert!(network.check().is_ok());
    }

    #[proptest]
    fn same_seed_same_network(seed: u64) {
        let a = Network::new(&mut StdRng::seed_from_u64(seed), 3, 4, 2, false).unwrap();
        let b = Network::new(&mut StdRng::seed_from_u64(seed), 3, 4, 2, false).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn forward_is_repeatable_without_contexts() {
        let mut network = Network::new(&mut rng(), 2, 3, 2, false).unwrap();
        let first = network.predict(&[0.3, -0.7]).unwrap();
        let second = network.predict(&[0.3, -0.7]).unwrap();
        assert_eq!(first, second);
        assert_eq!(network.input_activations(), [0.3, -0.7, BIAS]);
        assert_eq!(network.hidden_activations()[3], BIAS);
    }

    #[test]
    fn regression_outputs_are_linear() {
        let mut network = Network::new(&mut rng(), 1, 2, 1, true).unwrap();
        assert!(network.regression());
        let output = network.predict(&[0.5]).unwrap();
        let hidden = network.hidden_activations().to_vec();
        let weights = network.output_weights();
        let expected: f64 = (0..3).map(|h| hidden[h] * weights[(h, 0)]).sum();
        assert!((output[0] - expected).abs() < 1e-12);
    }

    #[test]
    fn context_slots_hold_past_hidden_activations() {
        let depth = 3;
        let mut network = Network::new(&mut rng(), 2, 4, 1, false)
            .unwrap()
            .with_contexts(&mut rng(), depth);
        let mut history = Vec::new();
        for pass in 0..=depth {
            let x = pass as f64 / 4.0;
            network.forward(&[x, 1.0 - x]).unwrap();
            history.push(network.hidden_activations()[..4].to_vec());
        }
        let contexts = network.contexts().unwrap();
        assert_eq!(contexts.depth(), depth);
        for slot in 0..depth {
            assert_eq!(contexts.slot(slot), &history[depth - slot][..]);
        }
    }

    #[test]
    fn contexts_change_the_output() {
        let mut network = Network::new(&mut rng(), 2, 3, 1, false)
            .unwrap()
            .with_contexts(&mut rng(), 1);
        let first = network.predict(&[1.0, 0.0]).unwrap();
        let second = network.predict(&[1.0, 0.0]).unwrap();
        assert_ne!(first, second);

        network.reset_contexts();
        assert!(network.contexts().unwrap().slots().all(|s| s == [0.5; 3]));
    }

    #[test]
    fn zero_contexts_stay_feed_forward() {
        let network = Network::new(&mut rng(), 2, 3, 1, false)
            .unwrap()
            .with_contexts(&mut rng(), 0);
        assert!(network.contexts().is_none());
    }

    #[test]
    fn preset_contexts_must_match_hidden_layer() {
        let network = Network::new(&mut rng(), 2, 3, 1, false).unwrap();
        let err = network
            .clone()
            .with_preset_contexts(&mut rng(), vec![vec![0.1; 4]])
            .unwrap_err();
        assert!(err.is_shape_mismatch(Shape::Context));

        let network = network
            .with_preset_contexts(&mut rng(), vec![vec![0.1; 3], vec![0.2; 3]])
            .unwrap();
        let contexts = network.contexts().unwrap();
        assert_eq!(contexts.slot(1), [0.2; 3]);
        assert_eq!(contexts.weights().len(), 2);
        assert_eq!(contexts.weights()[0].shape(), (3, 3));
    }

    #[test]
    fn wrong_input_size() {
        let mut network = Network::new(&mut rng(), 2, 3, 1, false)
            .unwrap()
            .with_contexts(&mut rng(), 2);
        let before = network.clone();
        let err = network.forward(&[1.0]).unwrap_err();
        assert!(err.is_shape_mismatch(Shape::Input));
        assert_eq!(network, before);
    }

    #[test]
    fn wrong_target_size() {
        let mut network = Network::new(&mut rng(), 2, 3, 1, false).unwrap();
        network.forward(&[1.0, 0.0]).unwrap();
        let before = network.clone();
        let err = network.backward(&[1.0, 0.0], 0.5, 0.1).unwrap_err();
        assert!(matches!(
            err,
            Error::ShapeMismatch {
                what: Shape::Target,
                expected: 1,
                actual: 2
            }
        ));
        assert_eq!(network, before);
    }

    #[test]
    fn backward_reports_error_before_update() {
        let mut network = Network::new(&mut rng(), 2, 3, 2, false).unwrap();
        let output = network.predict(&[0.2, 0.8]).unwrap();
        let target = [1.0, 0.0];
        let expected = 0.5 * ((1.0 - output[0]).powi(2) + output[1].powi(2));
        let error = network.backward(&target, 0.5, 0.0).unwrap();
        assert!((error - expected).abs() < 1e-12);
        assert_ne!(network.input_momentum(), &Mat::zeros(3, 3));
    }

    #[test]
    fn backward_updates_context_weights_from_fed_values() {
        let fed = vec![vec![0.1, 0.6, 0.3], vec![0.9, 0.2, 0.5]];
        let mut network = Network::new(&mut rng(), 2, 3, 1, false)
            .unwrap()
            .with_preset_contexts(&mut rng(), fed.clone())
            .unwrap();
        let before = network.contexts().unwrap().weights().to_vec();
        let output_weights = network.output_weights().clone();

        let (target, rate) = (1.0, 0.3);
        let y = network.predict(&[0.4, 0.9]).unwrap()[0];
        let hidden = network.hidden_activations().to_vec();
        network.backward(&[target], rate, 0.4).unwrap();

        let output_signal = (target - y) * dsigmoid(y);
        let after = network.contexts().unwrap().weights();
        for k in 0..fed.len() {
            for j in 0..3 {
                for i in 0..3 {
                    let signal = output_weights[(i, 0)] * output_signal * dsigmoid(hidden[i]);
                    let expected = before[k][(j, i)] + rate * signal * fed[k][j];
                    assert!(
                        (after[k][(j, i)] - expected).abs() < 1e-12,
                        "slot {} weight ({}, {})",
                        k,
                        j,
                        i
                    );
                }
            }
        }
    }

    #[test]
    fn backward_moves_towards_target() {
        let mut network = Network::new(&mut rng(), 2, 3, 1, false)
            .unwrap()
            .with_contexts(&mut rng(), 1);
        let input = [0.4, 0.9];
        network.forward(&input).unwrap();
        let before = network.backward(&[1.0], 0.05, 0.0).unwrap();
        network.reset_contexts();
        let mut again = network.clone();
        again.forward(&input).unwrap();
        let after = again.backward(&[1.0], 0.0, 0.0).unwrap();
        assert!(after < before);
    }
}
