use std::fmt::Debug;

use rand_core::{CryptoRng, RngCore};

use super::{phase1::beacon_rng, SetupOptions};
use crate::utils::{cancel::CancellationToken, errors::SetupError};

/// Parameters that can be re-randomised by a sequence of contributors, each
/// publishing a record that lets anyone check the update.
pub trait Contribute: Clone + Debug + Sized {
    type Contribution: Clone + Debug;

    fn contribute<R: RngCore + CryptoRng>(
        &self,
        rng: &mut R,
        options: &SetupOptions,
        cancel: &CancellationToken,
    ) -> Result<(Self, Self::Contribution), SetupError>;

    /// Checks that `next` is `self` updated by `contribution`.
    fn verify_contribution(&self, next: &Self, contribution: &Self::Contribution) -> Result<(), String>;
}

/// Ordered transcript of contributions. States are only appended, each one
/// derived from the last.
#[derive(Clone, Debug)]
pub struct Ceremony<T: Contribute> {
    states: Vec<T>,
    contributions: Vec<T::Contribution>,
}

impl<T: Contribute> Ceremony<T> {
    pub fn new(initial: T) -> Self {
        Self {
            states: vec![initial],
            contributions: vec![],
        }
    }

    pub fn current(&self) -> &T {
        // `states` is never empty
        &self.states[self.states.len() - 1]
    }

    pub fn initial(&self) -> &T {
        &self.states[0]
    }

    pub fn contributions(&self) -> &[T::Contribution] {
        &self.contributions
    }

    pub fn num_contributions(&self) -> usize {
        self.contributions.len()
    }

    #[tracing::instrument(skip_all, name = "Ceremony::contribute", fields(index = self.contributions.len()))]
    pub fn contribute<R: RngCore + CryptoRng>(
        &mut self,
        rng: &mut R,
        options: &SetupOptions,
        cancel: &CancellationToken,
    ) -> Result<&T::Contribution, SetupError> {
        let (next, contribution) = self.current().contribute(rng, options, cancel)?;
        self.states.push(next);
        self.contributions.push(contribution);
        Ok(&self.contributions[self.contributions.len() - 1])
    }

    /// Final public contribution derived from a beacon value, e.g. a future
    /// block hash. Anyone can recompute it with [`Ceremony::verify_beacon`].
    pub fn apply_beacon(
        &mut self,
        beacon: &[u8],
        iterations_exp: u32,
        options: &SetupOptions,
    ) -> Result<&T::Contribution, SetupError> {
        let mut rng = beacon_rng(beacon, iterations_exp);
        self.contribute(&mut rng, options, &CancellationToken::new())
    }

    /// Accepts a contribution computed elsewhere after checking it against
    /// the current state.
    pub fn append(&mut self, next: T, contribution: T::Contribution) -> Result<(), SetupError> {
        let index = self.contributions.len();
        self.current()
            .verify_contribution(&next, &contribution)
            .map_err(|reason| SetupError::MalformedContribution { index, reason })?;
        self.states.push(next);
        self.contributions.push(contribution);
        Ok(())
    }

    /// Replays every check from the initial state.
    #[tracing::instrument(skip_all, name = "Ceremony::verify_transcript")]
    pub fn verify_transcript(&self) -> Result<(), SetupError> {
        for (index, (window, contribution)) in self
            .states
            .windows(2)
            .zip(self.contributions.iter())
            .enumerate()
        {
            window[0]
                .verify_contribution(&window[1], contribution)
                .map_err(|reason| SetupError::MalformedContribution { index, reason })?;
        }
        tracing::info!(
            contributions = self.contributions.len(),
            "ceremony transcript verified"
        );
        Ok(())
    }

    pub fn into_current(mut self) -> T {
        self.states.swap_remove(self.states.len() - 1)
    }
}

impl<T: Contribute + PartialEq> Ceremony<T> {
    /// Recomputes contribution `index` from the beacon and compares it with
    /// the recorded state.
    pub fn verify_beacon(
        &self,
        index: usize,
        beacon: &[u8],
        iterations_exp: u32,
        options: &SetupOptions,
    ) -> Result<(), SetupError> {
        let malformed = |reason: &str| SetupError::MalformedContribution {
            index,
            reason: reason.to_string(),
        };
        let (Some(prev), Some(recorded)) = (self.states.get(index), self.states.get(index + 1)) else {
            return Err(malformed("no such contribution"));
        };
        let mut rng = beacon_rng(beacon, iterations_exp);
        let (expected, _) = prev.contribute(&mut rng, options, &CancellationToken::new())?;
        if &expected != recorded {
            return Err(malformed("state does not match the beacon"));
        }
        Ok(())
    }
}
