//! Truncated Laurent series in a regulator.
//!
//! A [`Series`] stores the coefficients of
//!
//! $$ \sum_{k=k_\mathrm{min}}^{k_\mathrm{max}} c_k \, \epsilon^{k + \delta} + \mathcal{O} \left(
//! \epsilon^{k_\mathrm{max} + 1 + \delta} \right) $$
//!
//! where $\delta \in [0, 1)$ is a rational [`Offset`] shared by all terms and the error term is
//! only present if the series is *truncated*. Every order inside the window is stored, possibly
//! with a zero coefficient.

use crate::error::{Error, Result};
use num_traits::Zero;
use serde::{Deserialize, Serialize};
use std::cmp::{max, min};
use std::convert::TryFrom;
use std::fmt::{self, Display};
use std::ops::{Add, AddAssign, Index, Mul, Neg, Sub};

fn gcd(mut a: i32, mut b: i32) -> i32 {
    while b != 0 {
        let t = a % b;
        a = b;
        b = t;
    }
    a.abs()
}

/// A rational exponent, always stored in lowest terms with a positive denominator.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Deserialize, Serialize)]
#[serde(try_from = "(i32, i32)", into = "(i32, i32)")]
pub struct Offset {
    numerator: i32,
    denominator: i32,
}

impl Offset {
    /// Constructs the rational number `numerator / denominator`.
    pub fn new(numerator: i32, denominator: i32) -> Result<Self> {
        if denominator == 0 {
            return Err(Error::MalformedSeries(format!(
                "offset {}/0 has a vanishing denominator",
                numerator
            )));
        }

        let sign = denominator.signum();
        let divisor = gcd(numerator, denominator).max(1);

        Ok(Self {
            numerator: sign * numerator / divisor,
            denominator: sign * denominator / divisor,
        })
    }

    /// The integer `value`.
    pub const fn integer(value: i32) -> Self {
        Self {
            numerator: value,
            denominator: 1,
        }
    }

    /// Returns the numerator.
    pub const fn numerator(&self) -> i32 {
        self.numerator
    }

    /// Returns the (positive) denominator.
    pub const fn denominator(&self) -> i32 {
        self.denominator
    }

    /// Returns the largest integer not greater than this number.
    pub fn floor(&self) -> i32 {
        self.numerator.div_euclid(self.denominator)
    }

    /// Returns the fractional part, which lies in `[0, 1)`.
    pub fn fract(&self) -> Self {
        Self {
            numerator: self.numerator.rem_euclid(self.denominator),
            denominator: self.denominator,
        }
    }

    /// Returns `true` if this is an integer.
    pub const fn is_integer(&self) -> bool {
        self.denominator == 1
    }

    /// Converts to a floating point number.
    pub fn to_f64(&self) -> f64 {
        f64::from(self.numerator) / f64::from(self.denominator)
    }
}

impl Default for Offset {
    fn default() -> Self {
        Self::integer(0)
    }
}

impl TryFrom<(i32, i32)> for Offset {
    type Error = Error;

    fn try_from((numerator, denominator): (i32, i32)) -> Result<Self> {
        Self::new(numerator, denominator)
    }
}

impl From<Offset> for (i32, i32) {
    fn from(offset: Offset) -> Self {
        (offset.numerator, offset.denominator)
    }
}

impl Add for Offset {
    type Output = Self;

    fn add(self, other: Self) -> Self {
        let numerator = self.numerator * other.denominator + other.numerator * self.denominator;
        let denominator = self.denominator * other.denominator;
        let divisor = gcd(numerator, denominator).max(1);

        Self {
            numerator: numerator / divisor,
            denominator: denominator / divisor,
        }
    }
}

impl Display for Offset {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        if self.is_integer() {
            write!(f, "{}", self.numerator)
        } else {
            write!(f, "{}/{}", self.numerator, self.denominator)
        }
    }
}

/// The window of a series without its coefficients.
#[derive(Clone, Debug, PartialEq, Eq, Deserialize, Serialize)]
pub struct Shape {
    /// Lowest order.
    pub min_order: i32,
    /// Highest order.
    pub max_order: i32,
    /// Whether orders above `max_order` are unknown.
    pub truncated: bool,
    /// Name of the expansion parameter.
    pub regulator: String,
    /// Offset shared by all exponents.
    pub offset: Offset,
}

impl Shape {
    /// Returns the number of orders in the window.
    pub fn len(&self) -> usize {
        (self.max_order - self.min_order + 1) as usize
    }

    /// Returns `true` if the window contains no orders, which never happens for a valid shape.
    pub fn is_empty(&self) -> bool {
        self.max_order < self.min_order
    }
}

/// A truncated Laurent series with coefficients of type `T`.
#[derive(Clone, Debug, PartialEq, Deserialize, Serialize)]
#[serde(try_from = "RawSeries<T>")]
pub struct Series<T> {
    min_order: i32,
    max_order: i32,
    coefficients: Vec<T>,
    truncated: bool,
    regulator: String,
    offset: Offset,
}

// the serialized form, checked by `Series::new` before use
#[derive(Deserialize)]
struct RawSeries<T> {
    min_order: i32,
    max_order: i32,
    coefficients: Vec<T>,
    truncated: bool,
    regulator: String,
    #[serde(default)]
    offset: Offset,
}

impl<T> TryFrom<RawSeries<T>> for Series<T> {
    type Error = Error;

    fn try_from(raw: RawSeries<T>) -> Result<Self> {
        let series = Self::new(
            raw.min_order,
            raw.max_order,
            raw.coefficients,
            raw.truncated,
            raw.regulator,
        )?;

        Ok(series.shift_by(raw.offset))
    }
}

impl<T> Series<T> {
    /// Constructs a series in `regulator` whose order `min_order + i` has the coefficient
    /// `coefficients[i]`. If `truncated` is `true`, orders above `max_order` are unknown,
    /// otherwise they are exactly zero.
    pub fn new(
        min_order: i32,
        max_order: i32,
        coefficients: Vec<T>,
        truncated: bool,
        regulator: impl Into<String>,
    ) -> Result<Self> {
        if max_order < min_order {
            return Err(Error::MalformedSeries(format!(
                "highest order {} is below lowest order {}",
                max_order, min_order
            )));
        }

        let expected = (max_order - min_order + 1) as usize;

        if coefficients.len() != expected {
            return Err(Error::MalformedSeries(format!(
                "window [{}, {}] needs {} coefficients, got {}",
                min_order,
                max_order,
                expected,
                coefficients.len()
            )));
        }

        Ok(Self {
            min_order,
            max_order,
            coefficients,
            truncated,
            regulator: regulator.into(),
            offset: Offset::default(),
        })
    }

    /// Constructs a series with the window described by `shape`.
    pub fn from_shape(shape: &Shape, coefficients: Vec<T>) -> Result<Self> {
        let series = Self::new(
            shape.min_order,
            shape.max_order,
            coefficients,
            shape.truncated,
            shape.regulator.clone(),
        )?;

        Ok(series.shift_by(shape.offset))
    }

    /// Returns the lowest order.
    pub const fn min_order(&self) -> i32 {
        self.min_order
    }

    /// Returns the highest order.
    pub const fn max_order(&self) -> i32 {
        self.max_order
    }

    /// Returns `true` if orders above [`Series::max_order`] are unknown.
    pub const fn truncated(&self) -> bool {
        self.truncated
    }

    /// Returns the name of the expansion parameter.
    pub fn regulator(&self) -> &str {
        &self.regulator
    }

    /// Returns the offset shared by all exponents.
    pub const fn offset(&self) -> Offset {
        self.offset
    }

    /// Returns the coefficients, starting with the lowest order.
    pub fn coefficients(&self) -> &[T] {
        &self.coefficients
    }

    /// Returns the coefficients for modification; the window stays fixed.
    pub fn coefficients_mut(&mut self) -> &mut [T] {
        &mut self.coefficients
    }

    /// Consumes the series and returns its coefficients.
    pub fn into_coefficients(self) -> Vec<T> {
        self.coefficients
    }

    /// Returns the window of this series.
    pub fn shape(&self) -> Shape {
        Shape {
            min_order: self.min_order,
            max_order: self.max_order,
            truncated: self.truncated,
            regulator: self.regulator.clone(),
            offset: self.offset,
        }
    }

    /// Returns `true` if `order` lies inside the window.
    pub fn has_term(&self, order: i32) -> bool {
        self.min_order <= order && order <= self.max_order
    }

    /// Returns the coefficient of `order`, if it lies inside the window.
    pub fn get(&self, order: i32) -> Option<&T> {
        if self.has_term(order) {
            self.coefficients.get((order - self.min_order) as usize)
        } else {
            None
        }
    }

    /// Iterates over all `(order, coefficient)` pairs.
    pub fn iter(&self) -> impl Iterator<Item = (i32, &T)> {
        let min_order = self.min_order;
        self.coefficients
            .iter()
            .enumerate()
            .map(move |(index, c)| (min_order + index as i32, c))
    }

    /// Applies `f` to every coefficient, keeping the orders and the truncation flag. This is
    /// how every order is integrated independently.
    pub fn map<U, F>(&self, f: F) -> Series<U>
    where
        F: FnMut(&T) -> U,
    {
        Series {
            min_order: self.min_order,
            max_order: self.max_order,
            coefficients: self.coefficients.iter().map(f).collect(),
            truncated: self.truncated,
            regulator: self.regulator.clone(),
            offset: self.offset,
        }
    }

    /// Multiplies the series by `eps^power`.
    pub fn shift(mut self, power: i32) -> Self {
        self.min_order += power;
        self.max_order += power;
        self
    }

    /// Multiplies the series by `eps^power` for a rational `power`.
    pub fn shift_by(self, power: Offset) -> Self {
        let total = self.offset + power;
        let mut series = self.shift(total.floor());
        series.offset = total.fract();
        series
    }

    fn check_compatible<U>(&self, other: &Series<U>) -> Result<()> {
        if self.regulator != other.regulator {
            return Err(Error::RegulatorMismatch {
                left: self.regulator.clone(),
                right: other.regulator.clone(),
            });
        }

        Ok(())
    }
}

impl<T: Clone + Zero> Series<T> {
    /// Returns the series with all coefficients in the window of `shape` set to zero.
    pub fn zeros(shape: &Shape) -> Self {
        Self {
            min_order: shape.min_order,
            max_order: shape.max_order,
            coefficients: vec![T::zero(); shape.len()],
            truncated: shape.truncated,
            regulator: shape.regulator.clone(),
            offset: shape.offset,
        }
    }

    /// The exact series consisting of `value` at order zero.
    pub fn constant(value: T, regulator: impl Into<String>) -> Self {
        Self {
            min_order: 0,
            max_order: 0,
            coefficients: vec![value],
            truncated: false,
            regulator: regulator.into(),
            offset: Offset::default(),
        }
    }

    fn coefficient_or_zero(&self, order: i32) -> T {
        self.get(order).cloned().unwrap_or_else(T::zero)
    }

    /// Restricts the series to the window `[min_order, max_order]`. Orders below the current
    /// window are filled with zeros. Orders above the current window are filled with zeros only
    /// if the series is exact; a truncated series keeps its highest order instead. Dropping known
    /// higher orders marks the result as truncated.
    pub fn truncate(&self, min_order: i32, max_order: i32) -> Result<Self> {
        let effective_max = if self.truncated {
            min(max_order, self.max_order)
        } else {
            max_order
        };

        if effective_max < min_order {
            return Err(Error::MalformedSeries(format!(
                "window [{}, {}] lies above the highest known order {}",
                min_order, max_order, self.max_order
            )));
        }

        Ok(Self {
            min_order,
            max_order: effective_max,
            coefficients: (min_order..=effective_max)
                .map(|order| self.coefficient_or_zero(order))
                .collect(),
            truncated: self.truncated || effective_max < self.max_order,
            regulator: self.regulator.clone(),
            offset: self.offset,
        })
    }

    /// Extends the window to include `[min_order, max_order]` using the zero-fill rules of
    /// [`Series::truncate`]; known orders are never dropped.
    pub fn widen(&self, min_order: i32, max_order: i32) -> Self {
        let min_order = min(min_order, self.min_order);
        let max_order = if self.truncated {
            self.max_order
        } else {
            max(max_order, self.max_order)
        };

        Self {
            min_order,
            max_order,
            coefficients: (min_order..=max_order)
                .map(|order| self.coefficient_or_zero(order))
                .collect(),
            truncated: self.truncated,
            regulator: self.regulator.clone(),
            offset: self.offset,
        }
    }

    /// Adds two series. The lowest order of the result is the lower of both lowest orders; the
    /// highest order is the lower of both highest orders of the truncated operands, or the higher
    /// of both if neither is truncated.
    pub fn try_add(&self, other: &Self) -> Result<Self>
    where
        T: Add<Output = T>,
    {
        self.check_compatible(other)?;

        if self.offset != other.offset {
            return Err(Error::OffsetMismatch {
                left: self.offset,
                right: other.offset,
            });
        }

        let min_order = min(self.min_order, other.min_order);
        let (max_order, truncated) = match (self.truncated, other.truncated) {
            (true, true) => (min(self.max_order, other.max_order), true),
            (true, false) => (self.max_order, true),
            (false, true) => (other.max_order, true),
            (false, false) => (max(self.max_order, other.max_order), false),
        };

        Ok(Self {
            min_order,
            max_order,
            coefficients: (min_order..=max_order)
                .map(|order| self.coefficient_or_zero(order) + other.coefficient_or_zero(order))
                .collect(),
            truncated,
            regulator: self.regulator.clone(),
            offset: self.offset,
        })
    }

    /// Subtracts `other` from this series.
    pub fn try_sub(&self, other: &Self) -> Result<Self>
    where
        T: Add<Output = T> + Neg<Output = T>,
    {
        self.try_add(&other.map(|c| -c.clone()))
    }

    /// Multiplies every coefficient with the exact scalar `factor`.
    pub fn scale<U, V>(&self, factor: &U) -> Series<V>
    where
        T: Mul<U, Output = V>,
        U: Clone,
    {
        self.map(|c| c.clone() * factor.clone())
    }

    /// Multiplies two series. The window of the result is the convolution of both windows,
    /// limited by the highest known order of any truncated operand.
    pub fn try_mul<U, V>(&self, other: &Series<U>) -> Result<Series<V>>
    where
        T: Mul<U, Output = V>,
        U: Clone,
        V: Zero,
    {
        self.check_compatible(other)?;

        let min_order = self.min_order + other.min_order;
        let max_order = match (self.truncated, other.truncated) {
            (true, true) => min(
                self.max_order + other.min_order,
                other.max_order + self.min_order,
            ),
            (true, false) => self.max_order + other.min_order,
            (false, true) => other.max_order + self.min_order,
            (false, false) => self.max_order + other.max_order,
        };

        let coefficients = (min_order..=max_order)
            .map(|order| {
                let lower = max(self.min_order, order - other.max_order);
                let upper = min(self.max_order, order - other.min_order);

                (lower..=upper).fold(V::zero(), |acc, i| {
                    let lhs = self.coefficients[(i - self.min_order) as usize].clone();
                    let rhs = other.coefficients[(order - i - other.min_order) as usize].clone();
                    acc + lhs * rhs
                })
            })
            .collect();

        let series = Series {
            min_order,
            max_order,
            coefficients,
            truncated: self.truncated || other.truncated,
            regulator: self.regulator.clone(),
            offset: Offset::default(),
        };

        Ok(series.shift_by(self.offset + other.offset))
    }
}

impl<T> Index<i32> for Series<T> {
    type Output = T;

    fn index(&self, order: i32) -> &T {
        match self.get(order) {
            Some(c) => c,
            None => panic!(
                "order {} is outside of the window [{}, {}]",
                order, self.min_order, self.max_order
            ),
        }
    }
}

impl<T: Clone + Zero> Add for Series<T> {
    type Output = Self;

    fn add(self, other: Self) -> Self {
        self.try_add(&other).unwrap_or_else(|e| panic!("{}", e))
    }
}

impl<'a, T: Clone + Zero> Add<&'a Series<T>> for &'a Series<T> {
    type Output = Series<T>;

    fn add(self, other: &'a Series<T>) -> Series<T> {
        self.try_add(other).unwrap_or_else(|e| panic!("{}", e))
    }
}

impl<T: Clone + Zero> AddAssign for Series<T> {
    fn add_assign(&mut self, other: Self) {
        *self = self.try_add(&other).unwrap_or_else(|e| panic!("{}", e));
    }
}

impl<T: Clone + Zero + Neg<Output = T>> Sub for Series<T> {
    type Output = Self;

    fn sub(self, other: Self) -> Self {
        self.try_sub(&other).unwrap_or_else(|e| panic!("{}", e))
    }
}

impl<T: Clone + Neg<Output = T>> Neg for Series<T> {
    type Output = Self;

    fn neg(self) -> Self {
        self.map(|c| -c.clone())
    }
}

impl<T, U, V> Mul<Series<U>> for Series<T>
where
    T: Clone + Zero + Mul<U, Output = V>,
    U: Clone,
    V: Zero,
{
    type Output = Series<V>;

    fn mul(self, other: Series<U>) -> Series<V> {
        self.try_mul(&other).unwrap_or_else(|e| panic!("{}", e))
    }
}

impl<'a, T, U, V> Mul<&'a Series<U>> for &'a Series<T>
where
    T: Clone + Zero + Mul<U, Output = V>,
    U: Clone,
    V: Zero,
{
    type Output = Series<V>;

    fn mul(self, other: &'a Series<U>) -> Series<V> {
        self.try_mul(other).unwrap_or_else(|e| panic!("{}", e))
    }
}

impl<T: Display> Display for Series<T> {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        for (order, c) in self.iter() {
            write!(
                f,
                " + ({})*{}^{}",
                c,
                self.regulator,
                Offset::integer(order) + self.offset
            )?;
        }

        if self.truncated {
            write!(
                f,
                " + O({}^{})",
                self.regulator,
                Offset::integer(self.max_order + 1) + self.offset
            )?;
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn series(min_order: i32, coefficients: Vec<f64>, truncated: bool) -> Series<f64> {
        let max_order = min_order + coefficients.len() as i32 - 1;
        Series::new(min_order, max_order, coefficients, truncated, "eps").unwrap()
    }

    #[test]
    fn offset_normalization() {
        let half = Offset::new(2, 4).unwrap();
        assert_eq!(half, Offset::new(-1, -2).unwrap());
        assert_eq!(half.numerator(), 1);
        assert_eq!(half.denominator(), 2);

        let three_halves = half + Offset::integer(1);
        assert_eq!(three_halves.floor(), 1);
        assert_eq!(three_halves.fract(), half);

        let minus_half = Offset::new(-1, 2).unwrap();
        assert_eq!(minus_half.floor(), -1);
        assert_eq!(minus_half.fract(), half);
        assert_eq!(half + half, Offset::integer(1));

        assert!(Offset::new(1, 0).is_err());
    }

    #[test]
    fn new_checks_the_window() {
        assert!(Series::new(0, 1, vec![1.0], false, "eps").is_err());
        assert!(Series::new(1, 0, Vec::<f64>::new(), false, "eps").is_err());
        assert!(Series::new(-1, 1, vec![1.0, 2.0, 3.0], false, "eps").is_ok());
    }

    #[test]
    fn addition_widens_exact_windows() {
        let a = series(-1, vec![1.0, 2.0], false);
        let b = series(0, vec![3.0, 4.0], false);
        let sum = a + b;

        assert_eq!(sum.min_order(), -1);
        assert_eq!(sum.max_order(), 1);
        assert_eq!(sum.coefficients(), &[1.0, 5.0, 4.0]);
        assert!(!sum.truncated());
    }

    #[test]
    fn addition_respects_truncation() {
        let a = series(-1, vec![1.0, 2.0], true);
        let b = series(0, vec![3.0, 4.0, 5.0], false);
        let sum = &a + &b;

        assert_eq!(sum.min_order(), -1);
        assert_eq!(sum.max_order(), 0);
        assert_eq!(sum.coefficients(), &[1.0, 5.0]);
        assert!(sum.truncated());

        let c = series(-2, vec![1.0, 1.0, 1.0, 1.0], true);
        let sum = a.try_add(&c).unwrap();
        assert_eq!(sum.min_order(), -2);
        assert_eq!(sum.max_order(), 0);
        assert_eq!(sum.coefficients(), &[1.0, 2.0, 3.0]);
    }

    #[test]
    fn addition_is_commutative_and_associative() {
        let a = series(-2, vec![1.0, -3.0, 0.5], true);
        let b = series(-2, vec![4.0, 2.0, -1.5], true);
        let c = series(-2, vec![0.25, 8.0, 16.0], true);

        assert_eq!(&a + &b, &b + &a);
        assert_eq!(&(&a + &b) + &c, &a + &(&b + &c));
    }

    #[test]
    fn multiplication_convolves_windows() {
        let a = series(-1, vec![1.0, 2.0], false);
        let b = series(0, vec![3.0, 4.0], false);
        let product = a * b;

        assert_eq!(product.min_order(), -1);
        assert_eq!(product.max_order(), 1);
        assert_eq!(product.coefficients(), &[3.0, 10.0, 8.0]);
        assert!(!product.truncated());
    }

    #[test]
    fn multiplication_with_truncated_series() {
        // (1/eps + 2 + O(eps)) * (3 + 4 eps + 5 eps^2) = 3/eps + 10 + O(eps)
        let a = series(-1, vec![1.0, 2.0], true);
        let b = series(0, vec![3.0, 4.0, 5.0], false);
        let product = &a * &b;

        assert_eq!(product.min_order(), -1);
        assert_eq!(product.max_order(), 0);
        assert_eq!(product.coefficients(), &[3.0, 10.0]);
        assert!(product.truncated());

        // both truncated: (1/eps + 2 + O(eps)) * (1 + 1 eps + 1 eps^2 + O(eps^3))
        let c = series(0, vec![1.0, 1.0, 1.0], true);
        let product = a.try_mul(&c).unwrap();
        assert_eq!(product.max_order(), 0);
        assert_eq!(product.coefficients(), &[1.0, 3.0]);
    }

    #[test]
    fn multiplication_distributes_over_addition() {
        let a = series(-1, vec![1.0, 2.0, -1.0], true);
        let b = series(-1, vec![0.5, 4.0, 3.0], true);
        let c = series(0, vec![2.0, -8.0, 0.25], true);

        let lhs = &(&a + &b) * &c;
        let rhs = &(&a * &c) + &(&b * &c);

        assert_eq!(lhs, rhs);
    }

    #[test]
    fn regulator_mismatch_is_reported() {
        let a = series(0, vec![1.0], false);
        let b = Series::new(0, 0, vec![1.0], false, "delta").unwrap();

        match a.try_add(&b) {
            Err(Error::RegulatorMismatch { left, right }) => {
                assert_eq!(left, "eps");
                assert_eq!(right, "delta");
            }
            other => panic!("unexpected result {:?}", other),
        }

        assert!(a.try_mul::<f64, f64>(&b).is_err());
    }

    #[test]
    #[should_panic(expected = "regulator mismatch")]
    fn operator_panics_on_regulator_mismatch() {
        let a = series(0, vec![1.0], false);
        let b = Series::new(0, 0, vec![1.0], false, "delta").unwrap();
        let _ = a + b;
    }

    #[test]
    fn map_keeps_orders_and_truncation() {
        let a = series(-2, vec![1.0, 2.0], true);
        let mapped = a.map(|c| c * 10.0);

        assert_eq!(mapped.min_order(), -2);
        assert_eq!(mapped.max_order(), -1);
        assert!(mapped.truncated());
        assert_eq!(mapped[-1], 20.0);
    }

    #[test]
    fn truncate_and_widen() {
        let exact = series(-1, vec![1.0, 2.0, 3.0], false);

        let narrowed = exact.truncate(-1, 0).unwrap();
        assert_eq!(narrowed.coefficients(), &[1.0, 2.0]);
        assert!(narrowed.truncated());

        let widened = exact.truncate(-3, 2).unwrap();
        assert_eq!(widened.coefficients(), &[0.0, 0.0, 1.0, 2.0, 3.0, 0.0]);
        assert!(!widened.truncated());

        let truncated = series(-1, vec![1.0, 2.0], true);
        let clipped = truncated.truncate(-2, 3).unwrap();
        assert_eq!(clipped.min_order(), -2);
        assert_eq!(clipped.max_order(), 0);
        assert_eq!(clipped.coefficients(), &[0.0, 1.0, 2.0]);
        assert!(truncated.truncate(1, 2).is_err());

        let widened = truncated.widen(-3, 4);
        assert_eq!(widened.min_order(), -3);
        assert_eq!(widened.max_order(), 0);
    }

    #[test]
    fn offsets_add_under_multiplication() {
        let half = Offset::new(1, 2).unwrap();
        let a = series(0, vec![1.0, 1.0], false).shift_by(half);
        let b = series(-1, vec![2.0], false).shift_by(half);

        assert_eq!(a.offset(), half);
        let product = &a * &b;
        // eps^(1/2) * eps^(-1/2) = eps^0
        assert_eq!(product.offset(), Offset::default());
        assert_eq!(product.min_order(), 0);
        assert_eq!(product.coefficients(), &[2.0, 2.0]);

        match a.try_add(&series(0, vec![1.0], false)) {
            Err(Error::OffsetMismatch { .. }) => {}
            other => panic!("unexpected result {:?}", other),
        }
    }

    #[test]
    fn display() {
        let a = series(-1, vec![1.0, 2.5], true);
        assert_eq!(a.to_string(), " + (1)*eps^-1 + (2.5)*eps^0 + O(eps^1)");

        let b = series(0, vec![3.0], false).shift_by(Offset::new(1, 2).unwrap());
        assert_eq!(b.to_string(), " + (3)*eps^1/2");
    }

    #[test]
    fn serde_round_trip() {
        let a = series(-1, vec![1.0, 2.5], true).shift_by(Offset::new(1, 2).unwrap());
        let json = serde_json::to_string(&a).unwrap();
        let b: Series<f64> = serde_json::from_str(&json).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn deserialization_checks_the_window() {
        let json = r#"{
            "min_order": -1,
            "max_order": 1,
            "coefficients": [1.0, 2.0],
            "truncated": true,
            "regulator": "eps"
        }"#;
        assert!(serde_json::from_str::<Series<f64>>(json).is_err());

        let json = r#"{
            "min_order": 2,
            "max_order": 1,
            "coefficients": [],
            "truncated": false,
            "regulator": "eps"
        }"#;
        assert!(serde_json::from_str::<Series<f64>>(json).is_err());

        let json = r#"{
            "min_order": -1,
            "max_order": 0,
            "coefficients": [1.0, 2.0],
            "truncated": true,
            "regulator": "eps",
            "offset": [3, 2]
        }"#;
        let series: Series<f64> = serde_json::from_str(json).unwrap();
        assert_eq!(series.min_order(), 0);
        assert_eq!(series.offset(), Offset::new(1, 2).unwrap());
    }
}
