//! Plain integrator
use crate::callbacks::{Callback, SinkCallback};
use crate::core::estimators::*;
use crate::core::*;
use crate::deviation::Deviation;
use crate::error::{Error, Result};
use crate::series::{Series, Shape};

use num_complex::Complex;
use num_traits::{Float, FromPrimitive, Zero};
use rand::distributions::{Distribution, Standard};
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::ops::Add;

use crossbeam as cb;

#[derive(Debug, Clone, Deserialize, Serialize)]
/// Estimators for the plain integrator. Sums are kept separately for every order of the
/// regulator and for real and imaginary parts.
pub struct PlainEstimators<T> {
    sum: Series<Complex<T>>,
    sumsq: Series<Complex<T>>,
    calls: usize,
    non_finite_calls: usize,
    non_zero_calls: usize,
}

impl<T: Float> PlainEstimators<T> {
    /// Estimators without any calls for integrands returning series of the given `shape`.
    pub fn new(shape: &Shape) -> Self {
        Self {
            sum: Series::zeros(shape),
            sumsq: Series::zeros(shape),
            calls: 0,
            non_finite_calls: 0,
            non_zero_calls: 0,
        }
    }

    fn accumulate(&mut self, value: &Series<Complex<T>>) {
        self.calls += 1;

        let orders = self.sum.min_order()..=self.sum.max_order();
        let values: Vec<_> = orders
            .map(|order| value.get(order).copied().unwrap_or_else(Complex::zero))
            .collect();

        if values.iter().all(|v| v.is_zero()) {
            return;
        }

        self.non_zero_calls += 1;

        if values.iter().all(|v| v.re.is_finite() && v.im.is_finite()) {
            for ((sum, sumsq), v) in self
                .sum
                .coefficients_mut()
                .iter_mut()
                .zip(self.sumsq.coefficients_mut().iter_mut())
                .zip(values)
            {
                *sum = *sum + v;
                *sumsq = *sumsq + Complex::new(v.re * v.re, v.im * v.im);
            }
        } else {
            self.non_finite_calls += 1;
        }
    }
}

impl<T: Float> Add for PlainEstimators<T> {
    type Output = Self;

    fn add(self, other: Self) -> Self {
        Self {
            sum: self.sum + other.sum,
            sumsq: self.sumsq + other.sumsq,
            calls: self.calls + other.calls,
            non_finite_calls: self.non_finite_calls + other.non_finite_calls,
            non_zero_calls: self.non_zero_calls + other.non_zero_calls,
        }
    }
}

impl<T> BasicEstimators<T> for PlainEstimators<T>
where
    T: Float + FromPrimitive,
{
    fn mean(&self) -> Series<Complex<T>> {
        let calls = T::from_usize(self.calls).unwrap_or_else(T::nan);
        self.sum.map(|s| s / calls)
    }

    fn var(&self) -> Series<Complex<T>> {
        let calls = T::from_usize(self.calls).unwrap_or_else(T::nan);
        // rounding may push the variance of a constant below zero
        let variance = |sum: T, sumsq: T| {
            ((sumsq - sum * sum / calls) / calls / (calls - T::one())).max(T::zero())
        };

        let mut var = self.sum.clone();
        for (v, sq) in var
            .coefficients_mut()
            .iter_mut()
            .zip(self.sumsq.coefficients())
        {
            *v = Complex::new(variance(v.re, sq.re), variance(v.im, sq.im));
        }

        var
    }
}

impl<T> Estimators<T> for PlainEstimators<T>
where
    T: Float + FromPrimitive,
{
    fn calls(&self) -> usize {
        self.calls
    }

    fn non_finite_calls(&self) -> usize {
        self.non_finite_calls
    }

    fn non_zero_calls(&self) -> usize {
        self.non_zero_calls
    }
}

/// Perform part of the integration of a given integration on a specific `core`.
fn perform_iteration_contribution_from_core<T, R, I>(
    integrand: &I,
    mut rng: R,
    calls: usize,
    calls_per_core: usize,
    core: usize,
    n_cores: usize,
) -> PlainEstimators<T>
where
    I: Integrand<T>,
    T: Float + FromPrimitive + Send + Sync,
    R: Clone + Rng + Send + Sync,
    Standard: Distribution<T>,
{
    // determine how many calls to the random number generator to skip
    let skip = calls_per_core * core * integrand.dim();

    // initialize the random number generator on the given core
    for _ in 0..skip {
        let _ = rng.gen::<T>();
    }

    // in the last iteration, not all calls might be needed
    let actual_calls = compute_calls_for_core(core, n_cores, calls);

    // create a buffer for the sampled random variables such that
    // we do not need to allocate vectors in every call
    let mut x = vec![T::zero(); integrand.dim()];

    (0..actual_calls).fold(PlainEstimators::new(&integrand.shape()), |mut acc, _| {
        // sample a new phase space point
        x.iter_mut().for_each(|v| *v = rng.gen());

        acc.accumulate(&integrand.call(&x));
        acc
    })
}

/// Perform a single iteration of integrating the `integrand` on `n_cores` cores using `calls` samples.
fn integrate_iteration<T, R, I>(
    integrand: &I,
    rng: &R,
    n_cores: usize,
    calls: usize,
) -> Checkpoint<R, PlainEstimators<T>>
where
    I: Integrand<T>,
    T: Float + FromPrimitive + Send + Sync,
    R: Clone + Rng + Send + Sync,
    Standard: Distribution<T>,
{
    let calls_per_core = calls_per_core(n_cores, calls);

    let mut rng_global = rng.clone();

    // distribute the workload evenly across the cores
    let estimators = cb::thread::scope(|s| {
        let mut handles = Vec::with_capacity(n_cores);

        for core in 0..n_cores {
            // Needs to be defined before spawning the thread
            let rng_local = rng_global.clone();

            handles.push(s.spawn(move |_| {
                perform_iteration_contribution_from_core(
                    integrand,
                    rng_local,
                    calls,
                    calls_per_core,
                    core,
                    n_cores,
                )
            }));
        }

        // wait for the threads to finish
        handles
            .into_iter()
            .map(|handle| handle.join().unwrap_or_else(|e| std::panic::resume_unwind(e)))
            .collect::<Vec<_>>()
    })
    .unwrap_or_else(|e| std::panic::resume_unwind(e));

    // accumulate the intermediate results in the order of the cores
    let accumulate = estimators
        .into_iter()
        .fold(PlainEstimators::new(&integrand.shape()), |acc, r| acc + r);

    // return the updated rng
    for _ in 0..calls * integrand.dim() {
        let _ = rng_global.gen::<T>();
    }

    Checkpoint::new(rng.clone(), rng_global, accumulate)
}

/// Integrate the `integrand` using `n_cores` cores.
///
/// The random number generator in its initial state is provided in `rng`
/// together with a `callback` function that prints estimates after each
/// iteration.
/// The number of calls of the integrand per iteration is stored in the slice
/// `iterations`.
pub fn integrate<T, R, I>(
    integrand: &I,
    rng: &R,
    callback: &impl Callback<T, R, PlainEstimators<T>>,
    n_cores: usize,
    iterations: &[usize],
) -> Vec<Checkpoint<R, PlainEstimators<T>>>
where
    I: Integrand<T>,
    T: Float + FromPrimitive + Send + Sync,
    R: Clone + Rng + Send + Sync,
    Standard: Distribution<T>,
{
    resume_integration_from_checkpoints(integrand, rng, Vec::new(), callback, n_cores, iterations)
}

/// Continue an integration whose previous iterations are stored in `checkpoints`. The random
/// number generator continues from the state after the last checkpoint, or from `rng` if there
/// are no checkpoints. Returns all checkpoints, old and new.
pub fn resume_integration_from_checkpoints<T, R, I>(
    integrand: &I,
    rng: &R,
    mut checkpoints: Vec<Checkpoint<R, PlainEstimators<T>>>,
    callback: &impl Callback<T, R, PlainEstimators<T>>,
    n_cores: usize,
    iterations: &[usize],
) -> Vec<Checkpoint<R, PlainEstimators<T>>>
where
    I: Integrand<T>,
    T: Float + FromPrimitive + Send + Sync,
    R: Clone + Rng + Send + Sync,
    Standard: Distribution<T>,
{
    checkpoints.reserve(iterations.len());

    let mut rng_global = checkpoints
        .last()
        .map_or_else(|| rng.clone(), |chkpt| chkpt.rng_after().clone());

    // Integration iterations are treated sequentially
    for &calls in iterations {
        let checkpoint = integrate_iteration(integrand, &rng_global, n_cores, calls);
        // synchronize the random number generation
        rng_global = checkpoint.rng_after().clone();

        checkpoints.push(checkpoint);
        callback.print(&checkpoints);
    }

    checkpoints
}

/// Adds the estimators of all `checkpoints`.
pub fn accumulate<R, T: Float>(
    checkpoints: &[Checkpoint<R, PlainEstimators<T>>],
) -> Option<PlainEstimators<T>> {
    checkpoints
        .iter()
        .map(|chkpt| chkpt.estimators().clone())
        .reduce(|acc, e| acc + e)
}

/// The PLAIN integrator with a fixed random number generator, number of cores and iterations.
#[derive(Clone, Debug)]
pub struct PlainIntegrator<R> {
    rng: R,
    n_cores: usize,
    iterations: Vec<usize>,
}

impl<R> PlainIntegrator<R> {
    /// Constructor.
    pub fn new(rng: R, n_cores: usize, iterations: Vec<usize>) -> Result<Self> {
        if n_cores == 0 {
            return Err(Error::InvalidConfiguration(
                "the number of cores must be positive".to_string(),
            ));
        }

        if iterations.is_empty() || iterations.iter().any(|&calls| calls < 2) {
            return Err(Error::InvalidConfiguration(
                "every iteration needs at least two calls".to_string(),
            ));
        }

        Ok(Self {
            rng,
            n_cores,
            iterations,
        })
    }
}

impl<T, R> Integrator<T> for PlainIntegrator<R>
where
    T: Float + FromPrimitive + Send + Sync,
    R: Clone + Rng + Send + Sync,
    Standard: Distribution<T>,
{
    fn integrate<I: Integrand<T>>(&self, integrand: &I) -> Result<Series<Deviation<Complex<T>>>> {
        let checkpoints = integrate(
            integrand,
            &self.rng,
            &SinkCallback {},
            self.n_cores,
            &self.iterations,
        );

        accumulate(&checkpoints)
            .map(|estimators| estimators.result())
            .ok_or_else(|| Error::InvalidConfiguration("no iterations were performed".to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::callbacks::{FileWriterCallback, SinkCallback};
    use crate::integrators::plain;
    use rand_pcg::Pcg64;
    use std::fs::read_to_string;
    use tempfile::NamedTempFile;

    use assert_approx_eq::assert_approx_eq;

    fn assert_eq_rng<R>(lhs: &R, rhs: &R)
    where
        R: Rng + Serialize,
    {
        assert_eq!(
            serde_json::to_string(lhs).unwrap(),
            serde_json::to_string(rhs).unwrap()
        );
    }

    fn rng() -> Pcg64 {
        Pcg64::new(0xcafef00dd15ea5e5, 0xa02bdbf7bb3c0a7ac28fa16a64abf96)
    }

    // |2x - 1| / eps + i x at order zero, with the integral 1/(2 eps) + i/2
    struct MyIntegrand {}

    impl Integrand<f64> for MyIntegrand {
        fn call(&self, x: &[f64]) -> Series<Complex<f64>> {
            Series::new(
                -1,
                0,
                vec![
                    Complex::new((2.0 * x[0] - 1.0).abs(), 0.0),
                    Complex::new(0.0, x[0]),
                ],
                true,
                "eps",
            )
            .unwrap()
        }

        fn dim(&self) -> usize {
            1
        }

        fn shape(&self) -> Shape {
            self.call(&[0.0]).shape()
        }
    }

    // returns zero on half of the domain and nan at a quarter
    struct Poisoned {}

    impl Integrand<f64> for Poisoned {
        fn call(&self, x: &[f64]) -> Series<Complex<f64>> {
            let value = if x[0] < 0.5 {
                0.0
            } else if x[0] < 0.75 {
                f64::NAN
            } else {
                1.0
            };
            Series::constant(Complex::new(value, 0.0), "eps")
        }

        fn dim(&self) -> usize {
            1
        }

        fn shape(&self) -> Shape {
            self.call(&[0.0]).shape()
        }
    }

    #[test]
    fn plain_iteration() {
        let chkpts = plain::integrate(&MyIntegrand {}, &rng(), &SinkCallback {}, 1, &[1000]);
        let estimators = chkpts[0].estimators();

        // we requested 1000 calls
        assert_eq!(estimators.calls(), 1000);
        assert_eq!(estimators.non_zero_calls(), 1000);
        assert_eq!(estimators.non_finite_calls(), 0);

        let mean = estimators.mean();
        let std = estimators.std();

        assert_eq!(mean.min_order(), -1);
        assert_eq!(mean.max_order(), 0);

        // the exact values lie well within five standard deviations
        assert!((mean[-1].re - 0.5).abs() < 5.0 * std[-1].re);
        assert!((mean[0].im - 0.5).abs() < 5.0 * std[0].im);
        assert_eq!(mean[0].re, 0.0);
        assert_eq!(std[0].re, 0.0);

        // the variance of |2x - 1| and x is 1/12
        assert_approx_eq!(std[-1].re, (1.0 / 12.0 / 1000.0f64).sqrt(), 1e-3);
    }

    #[test]
    fn rng_after_iteration() {
        const CALLS: usize = 1_000;

        let mut rng = rng();
        let chkpt =
            plain::integrate(&MyIntegrand {}, &rng, &SinkCallback {}, 1, &[CALLS]).remove(0);

        assert_eq_rng(chkpt.rng_before(), &rng);

        for _ in 0..CALLS {
            let _: f64 = rng.gen();
        }
        assert_eq_rng(chkpt.rng_after(), &rng);
    }

    #[test]
    fn results_do_not_depend_on_cores() {
        let one = plain::integrate(&MyIntegrand {}, &rng(), &SinkCallback {}, 1, &[999, 10]);
        let four = plain::integrate(&MyIntegrand {}, &rng(), &SinkCallback {}, 4, &[999, 10]);

        for (a, b) in one.iter().zip(&four) {
            assert_eq_rng(a.rng_after(), b.rng_after());
            assert_eq!(a.estimators().calls(), b.estimators().calls());

            let (mean_a, mean_b) = (a.estimators().mean(), b.estimators().mean());
            for order in -1..=0 {
                assert_approx_eq!(mean_a[order].re, mean_b[order].re, 1e-14);
                assert_approx_eq!(mean_a[order].im, mean_b[order].im, 1e-14);
            }
        }
    }

    #[test]
    fn non_finite_and_zero_calls() {
        let chkpts = plain::integrate(&Poisoned {}, &rng(), &SinkCallback {}, 2, &[1000]);
        let estimators = chkpts[0].estimators();

        assert_eq!(estimators.calls(), 1000);
        assert!(estimators.non_zero_calls() < 1000);
        assert!(estimators.non_finite_calls() > 0);
        assert!(estimators.non_finite_calls() < estimators.non_zero_calls());

        let mean = estimators.mean()[0].re;
        assert!(mean.is_finite());
        assert!(mean > 0.0 && mean < 0.5);
    }

    #[test]
    fn resume_from_checkpoint() {
        let iterations = vec![1000, 1000, 1000, 1000];

        let result_4_it =
            plain::integrate(&MyIntegrand {}, &rng(), &SinkCallback {}, 1, &iterations);

        // continue after the second iteration
        let first_two = result_4_it[..2].to_vec();
        let resumed = plain::resume_integration_from_checkpoints(
            &MyIntegrand {},
            &rng(),
            first_two,
            &SinkCallback {},
            1,
            &iterations[2..4],
        );

        assert_eq!(resumed.len(), 4);
        assert_eq_rng(result_4_it[3].rng_after(), resumed[3].rng_after());
        assert_eq!(
            result_4_it[3].estimators().mean(),
            resumed[3].estimators().mean()
        );
        assert_eq!(
            result_4_it[3].estimators().var(),
            resumed[3].estimators().var()
        );

        let total = plain::accumulate(&resumed).unwrap();
        assert_eq!(total.calls(), 4000);
    }

    #[test]
    fn write_checkpoint_to_file() {
        let file = NamedTempFile::new().unwrap();
        let path = file.path();
        let iterations = vec![1000, 100];

        let callback = FileWriterCallback::new(path);

        let original = plain::integrate(&MyIntegrand {}, &rng(), &callback, 1, &iterations);

        let chkpt_file = read_to_string(path).expect("Unable to read checkpoint file");
        let chkpts: Vec<Checkpoint<Pcg64, PlainEstimators<f64>>> =
            serde_json::from_str(&chkpt_file).expect("Unable to deserialize checkpoint from json.");

        assert_eq!(original.len(), chkpts.len());

        for (read, written) in chkpts.iter().zip(&original) {
            assert_eq!(read.estimators().calls(), written.estimators().calls());
            assert_eq!(read.estimators().mean(), written.estimators().mean());
            assert_eq!(read.estimators().var(), written.estimators().var());
            assert_eq_rng(read.rng_after(), written.rng_after());
        }
    }

    #[test]
    fn integrator_trait() {
        assert!(PlainIntegrator::new(rng(), 0, vec![100]).is_err());
        assert!(PlainIntegrator::new(rng(), 1, vec![]).is_err());

        let integrator = PlainIntegrator::new(rng(), 2, vec![500, 500]).unwrap();
        let result = integrator.integrate(&MyIntegrand {}).unwrap();

        assert_eq!(result.min_order(), -1);
        let leading = result[-1];
        assert!((leading.value().re - 0.5).abs() < 5.0 * leading.uncertainty().re);
    }
}
