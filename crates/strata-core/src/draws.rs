//! Sources of the independent random decisions taken during generation.

use std::collections::VecDeque;

/// Supplies Bernoulli trials and uniform picks to the generator.
///
/// Every probabilistic decision of the layered generator goes through this
/// trait, which lets tests replay a fixed outcome sequence.
pub trait DrawSource {
    /// Returns `true` with the given probability.
    fn bernoulli(&mut self, probability: f64) -> bool;

    /// Returns an index in `0..len`. Callers never pass `len == 0`.
    fn pick(&mut self, len: usize) -> usize;
}

impl<D: DrawSource + ?Sized> DrawSource for &mut D {
    fn bernoulli(&mut self, probability: f64) -> bool {
        (**self).bernoulli(probability)
    }

    fn pick(&mut self, len: usize) -> usize {
        (**self).pick(len)
    }
}

/// Replays a fixed sequence of outcomes, ignoring the requested probability.
///
/// Exhausted trial queues answer `false` and exhausted pick queues answer `0`.
#[derive(Debug, Clone, Default)]
pub struct ScriptedDraws {
    trials: VecDeque<bool>,
    picks: VecDeque<usize>,
    consumed_trials: usize,
    consumed_picks: usize,
}

impl ScriptedDraws {
    /// Creates a source from trial outcomes and pick indices.
    pub fn new(
        trials: impl IntoIterator<Item = bool>,
        picks: impl IntoIterator<Item = usize>,
    ) -> Self {
        Self {
            trials: trials.into_iter().collect(),
            picks: picks.into_iter().collect(),
            consumed_trials: 0,
            consumed_picks: 0,
        }
    }

    /// Source that answers every trial with the same outcome.
    pub fn constant(outcome: bool, trials: usize) -> Self {
        Self::new(std::iter::repeat(outcome).take(trials), std::iter::empty())
    }

    /// Number of trials answered so far.
    pub fn consumed_trials(&self) -> usize {
        self.consumed_trials
    }

    /// Number of picks answered so far.
    pub fn consumed_picks(&self) -> usize {
        self.consumed_picks
    }

    /// Returns whether both queues are drained.
    pub fn is_exhausted(&self) -> bool {
        self.trials.is_empty() && self.picks.is_empty()
    }
}

impl DrawSource for ScriptedDraws {
    fn bernoulli(&mut self, _probability: f64) -> bool {
        self.consumed_trials += 1;
        self.trials.pop_front().unwrap_or(false)
    }

    fn pick(&mut self, len: usize) -> usize {
        self.consumed_picks += 1;
        match self.picks.pop_front() {
            Some(index) if len > 0 => index % len,
            _ => 0,
        }
    }
}
