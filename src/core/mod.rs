//! The core module
pub mod estimators;

use crate::deviation::Deviation;
use crate::error::Result;
use crate::series::{Series, Shape};

use num_complex::Complex;
use num_traits::Float;
use serde::{Deserialize, Serialize};

/// Integrand trait
pub trait Integrand<T: Float>: Send + Sync {
    /// Call the integrand with a point of the unit hypercube. The result is a Laurent series in
    /// the regulator whose window is given by [`Integrand::shape`].
    fn call(&self, x: &[T]) -> Series<Complex<T>>;

    /// The dimension of the integrand.
    fn dim(&self) -> usize;

    /// The window of the series returned by [`Integrand::call`].
    fn shape(&self) -> Shape;
}

/// An algorithm that integrates every order of a series-valued integrand over the unit
/// hypercube and estimates the statistical uncertainty of the result.
pub trait Integrator<T: Float> {
    /// Integrates `integrand`.
    fn integrate<I: Integrand<T>>(&self, integrand: &I) -> Result<Series<Deviation<Complex<T>>>>;
}

/// A checkpoint saves the state of the generator after an iteration.
/// Checkpoints can be used to restart or resume iterations.
#[derive(Clone, Debug, Deserialize, Serialize)]
pub struct Checkpoint<R, E> {
    rng_before: R,
    rng_after: R,
    estimators: E,
}

impl<R, E> Checkpoint<R, E> {
    /// Constructor
    pub(crate) const fn new(rng_before: R, rng_after: R, estimators: E) -> Self {
        Self {
            rng_before,
            rng_after,
            estimators,
        }
    }

    /// Returns the random number generator before generation of this checkpoint.
    pub const fn rng_before(&self) -> &R {
        &self.rng_before
    }

    /// Returns the random number generator after generation of this checkpoint
    pub const fn rng_after(&self) -> &R {
        &self.rng_after
    }

    /// Returns the estimators of this checkpoint.
    pub const fn estimators(&self) -> &E {
        &self.estimators
    }

    /// Destructure the checkpoint and return its components.
    pub fn destructure(self) -> (R, R, E) {
        (self.rng_before, self.rng_after, self.estimators)
    }
}

/// Compute the number of calls on a given core, given the total number of cores
/// `n_cores`, the index `core` (zero-based) of the current thread as well as the
/// total number of calls `total_calls` to perform combined on all cores.
pub(crate) fn compute_calls_for_core(core: usize, n_cores: usize, total_calls: usize) -> usize {
    debug_assert!(core < n_cores);
    let calls_per_core = calls_per_core(n_cores, total_calls);

    // the last core picks up the remainder, which may be smaller than `calls_per_core`; when
    // there are more cores than calls, some cores get nothing
    if n_cores == core + 1 {
        total_calls.saturating_sub(core * calls_per_core)
    } else {
        calls_per_core.min(total_calls.saturating_sub(core * calls_per_core))
    }
}

/// The number of calls every core but the last performs.
pub(crate) fn calls_per_core(n_cores: usize, total_calls: usize) -> usize {
    (total_calls + n_cores - 1) / n_cores
}
