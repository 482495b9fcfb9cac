//! This module contains everything related to estimators.
use crate::deviation::Deviation;
use crate::series::Series;

use num_complex::Complex;
use num_traits::Float;

/// Basic estimators, like the mean, variance, and the standard deviation. All of them are
/// series in the regulator; real and imaginary parts are estimated independently.
pub trait BasicEstimators<T: Float> {
    /// Returns the mean value of every order.
    fn mean(&self) -> Series<Complex<T>>;

    /// Returns the variance of the mean, $V$, of every order.
    fn var(&self) -> Series<Complex<T>>;

    /// Returns the standard deviation, $\sigma = \sqrt{V}$, of every order.
    fn std(&self) -> Series<Complex<T>> {
        self.var().map(|v| Complex::new(v.re.sqrt(), v.im.sqrt()))
    }

    /// Returns the mean together with its standard deviation.
    fn result(&self) -> Series<Deviation<Complex<T>>> {
        let mean = self.mean();
        let std = self.std();

        let mut result = Series::zeros(&mean.shape());
        for ((r, &m), &s) in result
            .coefficients_mut()
            .iter_mut()
            .zip(mean.coefficients())
            .zip(std.coefficients())
        {
            *r = Deviation::new(m, s);
        }

        result
    }
}

/// More estimators.
pub trait Estimators<T: Float>: BasicEstimators<T> {
    /// Returns the number of times $N$, the integrand has been called.
    fn calls(&self) -> usize;

    /// Returns the number of times, $N_\mathrm{nf}$, the integrand has been called
    /// and any order of its return value was non-finite.
    fn non_finite_calls(&self) -> usize;

    /// Returns the number of times, $N_\mathrm{nz}$, the integrand has been called
    /// and any order of its return value was non-zero.
    fn non_zero_calls(&self) -> usize;
}
