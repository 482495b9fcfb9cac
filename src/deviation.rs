//! Values with uncorrelated statistical uncertainties.
//!
//! A [`Deviation`] stores an estimate together with its standard deviation. Arithmetic assumes
//! that the uncertainties of different operands are independent, so they add in quadrature. For
//! complex numbers the real and imaginary parts carry independent uncertainties, i.e. the
//! uncertainty of `x + iy` is stored as `dx + i dy`.

use num_complex::Complex;
use num_traits::{Float, Zero};
use serde::{Deserialize, Serialize};
use std::fmt::{self, Display};
use std::iter::Sum;
use std::ops::{Add, AddAssign, Div, Mul, Neg, Sub};

/// Scalars that can carry an uncertainty.
pub trait Uncertain: Copy + Zero + Mul<Output = Self> + Neg<Output = Self> {
    /// Combines the two independent uncertainties `a` and `b`.
    fn quadrature(a: Self, b: Self) -> Self;

    /// Returns the uncertainty of `x * factor`, if `uncertainty` is the uncertainty of `x` and
    /// `factor` is exact.
    fn scaled(uncertainty: Self, factor: Self) -> Self;

    /// Returns `true` if no component is infinite or `NaN`.
    fn is_finite(self) -> bool;
}

impl Uncertain for f64 {
    fn quadrature(a: Self, b: Self) -> Self {
        a.hypot(b)
    }

    fn scaled(uncertainty: Self, factor: Self) -> Self {
        uncertainty * factor.abs()
    }

    fn is_finite(self) -> bool {
        f64::is_finite(self)
    }
}

impl Uncertain for f32 {
    fn quadrature(a: Self, b: Self) -> Self {
        a.hypot(b)
    }

    fn scaled(uncertainty: Self, factor: Self) -> Self {
        uncertainty * factor.abs()
    }

    fn is_finite(self) -> bool {
        f32::is_finite(self)
    }
}

impl<T: Float> Uncertain for Complex<T> {
    fn quadrature(a: Self, b: Self) -> Self {
        Self::new(a.re.hypot(b.re), a.im.hypot(b.im))
    }

    fn scaled(uncertainty: Self, factor: Self) -> Self {
        // Re(x c) = Re(x) Re(c) - Im(x) Im(c) and Im(x c) = Re(x) Im(c) + Im(x) Re(c)
        Self::new(
            (uncertainty.re * factor.re).hypot(uncertainty.im * factor.im),
            (uncertainty.re * factor.im).hypot(uncertainty.im * factor.re),
        )
    }

    fn is_finite(self) -> bool {
        self.re.is_finite() && self.im.is_finite()
    }
}

/// A value together with its (uncorrelated) uncertainty.
#[derive(Clone, Copy, Debug, Default, PartialEq, Deserialize, Serialize)]
pub struct Deviation<T> {
    value: T,
    uncertainty: T,
}

impl<T> Deviation<T> {
    /// Constructor.
    pub const fn new(value: T, uncertainty: T) -> Self {
        Self { value, uncertainty }
    }

    /// Returns the central value.
    pub const fn value(&self) -> &T {
        &self.value
    }

    /// Returns the uncertainty.
    pub const fn uncertainty(&self) -> &T {
        &self.uncertainty
    }
}

impl<T: Uncertain> Deviation<T> {
    /// An exact value, i.e. one with vanishing uncertainty.
    pub fn exact(value: T) -> Self {
        Self::new(value, T::zero())
    }

    /// Folds `deviations` from left to right into their sum.
    pub fn combine<I>(deviations: I) -> Self
    where
        I: IntoIterator<Item = Self>,
    {
        deviations
            .into_iter()
            .fold(Self::zero(), |acc, deviation| acc + deviation)
    }

    /// Returns `true` if both the value and the uncertainty are finite.
    pub fn is_finite(&self) -> bool {
        self.value.is_finite() && self.uncertainty.is_finite()
    }
}

impl<T: Uncertain> Add for Deviation<T> {
    type Output = Self;

    fn add(self, other: Self) -> Self {
        Self {
            value: self.value + other.value,
            uncertainty: T::quadrature(self.uncertainty, other.uncertainty),
        }
    }
}

impl<T: Uncertain> AddAssign for Deviation<T> {
    fn add_assign(&mut self, other: Self) {
        *self = *self + other;
    }
}

impl<T: Uncertain + Sub<Output = T>> Sub for Deviation<T> {
    type Output = Self;

    fn sub(self, other: Self) -> Self {
        Self {
            value: self.value - other.value,
            uncertainty: T::quadrature(self.uncertainty, other.uncertainty),
        }
    }
}

impl<T: Uncertain> Neg for Deviation<T> {
    type Output = Self;

    fn neg(self) -> Self {
        Self {
            value: -self.value,
            uncertainty: self.uncertainty,
        }
    }
}

impl<T: Uncertain> Mul for Deviation<T> {
    type Output = Self;

    /// First order error propagation for the product of independent quantities.
    fn mul(self, other: Self) -> Self {
        Self {
            value: self.value * other.value,
            uncertainty: T::quadrature(
                T::scaled(self.uncertainty, other.value),
                T::scaled(other.uncertainty, self.value),
            ),
        }
    }
}

impl<T: Uncertain> Mul<T> for Deviation<T> {
    type Output = Self;

    fn mul(self, factor: T) -> Self {
        Self {
            value: self.value * factor,
            uncertainty: T::scaled(self.uncertainty, factor),
        }
    }
}

impl<T: Uncertain + Div<Output = T> + num_traits::One> Div<T> for Deviation<T> {
    type Output = Self;

    fn div(self, divisor: T) -> Self {
        self * (T::one() / divisor)
    }
}

impl<T: Uncertain> Zero for Deviation<T> {
    fn zero() -> Self {
        Self::new(T::zero(), T::zero())
    }

    fn is_zero(&self) -> bool {
        self.value.is_zero() && self.uncertainty.is_zero()
    }
}

impl<T: Uncertain> Sum for Deviation<T> {
    fn sum<I: Iterator<Item = Self>>(iter: I) -> Self {
        Self::combine(iter)
    }
}

macro_rules! impl_scalar_mul {
    ($($t:ty),*) => {
        $(
            impl Mul<Deviation<$t>> for $t {
                type Output = Deviation<$t>;

                fn mul(self, deviation: Deviation<$t>) -> Deviation<$t> {
                    deviation * self
                }
            }
        )*
    };
}

impl_scalar_mul!(f32, f64);

impl<T: Float> Mul<Deviation<Complex<T>>> for Complex<T> {
    type Output = Deviation<Complex<T>>;

    fn mul(self, deviation: Deviation<Complex<T>>) -> Deviation<Complex<T>> {
        deviation * self
    }
}

impl<T: Display> Display for Deviation<T> {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{} +/- {}", self.value, self.uncertainty)
    }
}
