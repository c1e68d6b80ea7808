//! Elman context units.
//!
//! A [`Context`] remembers the hidden activations of the last few forward
//! passes and feeds them back into the hidden layer, each remembered slot
//! through its own learned weight matrix. Slot 0 always holds the most recent
//! activations.

use crate::error::{check_len, Result, Shape};
use crate::layer::initial_weights;
use crate::matrix::Mat;

use rand::Rng;
use serde_derive::{Deserialize, Serialize};
use std::collections::VecDeque;

/// The value every context unit starts from, and returns to on reset.
pub const RESTING_ACTIVATION: f64 = 0.5;

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Context {
    /// Past hidden activations, most recent first.
    slots: VecDeque<Vec<f64>>,
    /// The slot dropped by the last shift. Together with `slots[1..]` it
    /// holds the values that were fed into the last forward pass.
    evicted: Vec<f64>,
    /// One `[width][width]` matrix per slot.
    weights: Vec<Mat>,
    momentum: Vec<Mat>,
}

impl Context {
    /// Allocates `depth` slots of `width` units at rest.
    pub fn new<R>(rng: &mut R, depth: usize, width: usize) -> Self
    where
        R: Rng + ?Sized,
    {
        let slots = (0..depth)
            .map(|_| vec![RESTING_ACTIVATION; width])
            .collect();
        Self::with_slots(rng, slots, width)
    }

    /// Allocates one slot per entry of `slots`, starting from the given
    /// values.
    pub fn preset<R>(rng: &mut R, slots: Vec<Vec<f64>>, width: usize) -> Result<Self>
    where
        R: Rng + ?Sized,
    {
        for slot in &slots {
            check_len(Shape::Context, width, slot.len())?;
        }
        Ok(Self::with_slots(rng, slots.into(), width))
    }

    fn with_slots<R>(rng: &mut R, slots: VecDeque<Vec<f64>>, width: usize) -> Self
    where
        R: Rng + ?Sized,
    {
        let weights = (0..slots.len())
            .map(|_| Mat::random(&initial_weights(), rng, width, width))
            .collect();
        let momentum = (0..slots.len()).map(|_| Mat::zeros(width, width)).collect();
        Context {
            slots,
            evicted: vec![RESTING_ACTIVATION; width],
            weights,
            momentum,
        }
    }

    /// Returns the number of slots.
    pub fn depth(&self) -> usize {
        self.slots.len()
    }

    /// Returns the stored activations, most recent first.
    pub fn slots(&self) -> impl ExactSizeIterator<Item = &[f64]> {
        self.slots.iter().map(Vec::as_slice)
    }

    pub fn slot(&self, k: usize) -> &[f64] {
        &self.slots[k]
    }

    pub fn weights(&self) -> &[Mat] {
        &self.weights
    }

    pub fn momentum(&self) -> &[Mat] {
        &self.momentum
    }

    /// Returns every unit to rest, leaving weights untouched.
    pub fn reset(&mut self) {
        for slot in &mut self.slots {
            slot.iter_mut().for_each(|a| *a = RESTING_ACTIVATION);
        }
    }

    /// Adds the weighted contribution of every slot to the hidden `sums`.
    pub fn feed(&self, sums: &mut [f64]) {
        for (slot, weights) in self.slots.iter().zip(&self.weights) {
            weights.feed(slot, sums);
        }
    }

    /// Pushes `hidden` in as the most recent slot, dropping the oldest.
    pub fn shift(&mut self, hidden: &[f64]) {
        if let Some(mut oldest) = self.slots.pop_back() {
            std::mem::swap(&mut oldest, &mut self.evicted);
            oldest.copy_from_slice(hidden);
            self.slots.push_front(oldest);
        }
    }

    /// Moves every slot's weights along the hidden error `signals`, using the
    /// slot values fed into the last forward pass.
    pub fn descend(&mut self, rate: f64, factor: f64, signals: &[f64]) {
        let Context {
            slots,
            evicted,
            weights,
            momentum,
        } = self;
        let fed = slots.iter().skip(1).chain(std::iter::once(&*evicted));
        for ((xs, weights), momentum) in fed.zip(weights.iter_mut()).zip(momentum.iter_mut()) {
            weights.descend(momentum, rate, factor, xs, signals);
        }
    }

    /// Returns true if every slot and matrix is sized for `width` hidden
    /// units.
    pub(crate) fn fits(&self, width: usize) -> bool {
        let square = |m: &Mat| m.shape() == (width, width);
        self.evicted.len() == width
            && self.slots.iter().all(|s| s.len() == width)
            && self.weights.len() == self.slots.len()
            && self.momentum.len() == self.slots.len()
            && self.weights.iter().all(square)
            && self.momentum.iter().all(square)
    }
}
