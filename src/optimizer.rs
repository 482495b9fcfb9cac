//! Search for the deformation parameters of a sector.
//!
//! Starting from [`DeformationConfig::maximum`], every parameter $\lambda_k$ is multiplied by
//! [`DeformationConfig::decrease_factor`] until
//!
//! - it does not exceed the smallest bound $\lambda_k^\mathrm{max}(x)$ over all presamples $x$,
//! which keeps the quadratic part of $F(z)$ from flipping the sign of its imaginary part, and
//! - $F(z(x))$ has a non-positive imaginary part on every presample.
//!
//! The presamples are drawn from a seeded generator, so the result is reproducible and does not
//! depend on the number of threads.

use crate::config::DeformationConfig;
use crate::core::{calls_per_core, compute_calls_for_core};
use crate::deformation::DeformationParameters;
use crate::error::{Error, Result};
use crate::sector::BoundSector;

use log::{info, warn};
use rand::{Rng, SeedableRng};
use rand_pcg::Pcg64;

use crossbeam as cb;

/// Draws `n` points uniformly distributed in the unit hypercube of `dimension` dimensions.
pub fn presamples(dimension: usize, n: usize, seed: u64) -> Vec<Vec<f64>> {
    let mut rng = Pcg64::seed_from_u64(seed);

    (0..n)
        .map(|_| (0..dimension).map(|_| rng.gen()).collect())
        .collect()
}

/// Splits `samples` into `cores` chunks, applies `f` to every chunk on its own thread and returns
/// the results in the order of the chunks.
fn on_chunks<T, F>(samples: &[Vec<f64>], cores: usize, f: F) -> Vec<T>
where
    T: Send,
    F: Fn(&[Vec<f64>]) -> T + Sync,
{
    let per_core = calls_per_core(cores, samples.len());
    let f = &f;

    cb::thread::scope(|s| {
        let handles: Vec<_> = (0..cores)
            .map(|core| {
                let start = (core * per_core).min(samples.len());
                let end = start + compute_calls_for_core(core, cores, samples.len());
                let chunk = &samples[start..end];

                s.spawn(move |_| f(chunk))
            })
            .collect();

        handles
            .into_iter()
            .map(|handle| handle.join().unwrap_or_else(|e| std::panic::resume_unwind(e)))
            .collect()
    })
    .unwrap_or_else(|e| std::panic::resume_unwind(e))
}

/// Returns the component-wise minimum of [`BoundSector::maximal_parameters`] over `samples`.
pub fn parameter_bounds(sector: &BoundSector, samples: &[Vec<f64>], cores: usize) -> Vec<f64> {
    let fold = |chunk: &[Vec<f64>]| {
        chunk
            .iter()
            .fold(vec![f64::INFINITY; sector.dimension()], |mut bounds, x| {
                for (bound, max) in bounds.iter_mut().zip(sector.maximal_parameters(x)) {
                    *bound = bound.min(max);
                }
                bounds
            })
    };

    on_chunks(samples, cores, fold)
        .into_iter()
        .fold(vec![f64::INFINITY; sector.dimension()], |mut bounds, chunk| {
            for (bound, max) in bounds.iter_mut().zip(chunk) {
                *bound = bound.min(max);
            }
            bounds
        })
}

fn contour_valid(sector: &BoundSector, samples: &[Vec<f64>], lambda: &[f64], cores: usize) -> bool {
    on_chunks(samples, cores, |chunk| {
        chunk.iter().all(|x| sector.is_contour_valid(x, lambda))
    })
    .into_iter()
    .all(|valid| valid)
}

/// Determines deformation parameters for `sector`, whose real and complex parameters are already
/// bound. If the parameters reach [`DeformationConfig::minimum`] without passing all presamples,
/// the minimum is used for the offending components, a warning is logged and the result is
/// marked as [`DeformationParameters::exhausted`]. Fails if `config` is out of range.
pub fn optimize(
    sector: &BoundSector,
    config: &DeformationConfig,
) -> Result<DeformationParameters> {
    config.validate()?;

    let dimension = sector.dimension();
    let cores = config.cores.max(1);
    let samples = presamples(dimension, config.number_of_presamples, config.seed);
    let bounds = parameter_bounds(sector, &samples, cores);

    let mut lambda = vec![config.maximum; dimension];

    loop {
        let mut offending: Vec<_> = (0..dimension).filter(|&k| lambda[k] > bounds[k]).collect();

        // the sign check is only meaningful once the bounds hold
        if offending.is_empty() {
            if contour_valid(sector, &samples, &lambda, cores) {
                info!("sector {}: deformation parameters {:?}", sector.id(), lambda);
                return Ok(DeformationParameters::new(lambda, false));
            }

            offending = (0..dimension).collect();
        }

        offending.retain(|&k| lambda[k] > config.minimum);

        if offending.is_empty() {
            warn!(
                "{}",
                Error::DeformationBoundsExhausted {
                    sector: sector.id(),
                    minimum: config.minimum,
                }
            );
            return Ok(DeformationParameters::new(lambda, true));
        }

        for k in offending {
            lambda[k] = (lambda[k] * config.decrease_factor).max(config.minimum);
        }
    }
}
