//! Sectors and their integrands.
//!
//! A sector is described by static data, a [`SectorDescriptor`], produced by the sector
//! decomposition. Its integrand has the form
//!
//! $$ c \, J(x) \prod_k z_k^{a_k + b_k \epsilon} \prod_j P_j(z(x))^{\alpha_j + \beta_j \epsilon} $$
//!
//! where the polynomials $P_j$, which include the Symanzik polynomials $U$ and $F$, and the
//! monomials are evaluated on the deformed contour $z(x)$ with Jacobian $J(x)$. Each monomial is
//! written as $x_k^{a_k + b_k \epsilon} (z_k / x_k)^{a_k + b_k \epsilon}$, so that its singular
//! part stays real. The product is expanded in the regulator $\epsilon$ as
//!
//! $$ c \, J \prod_j B_j^{\alpha_j} \exp \left( \epsilon \sum_j \beta_j \ln B_j \right) .$$
//!
//! Monomials with exponent $-1 + b \epsilon$ produce poles in $\epsilon$. They are subtracted at
//! $x_k = 0$ and the subtraction term is integrated analytically, which yields a factor
//! $1/(b \epsilon)$.

use crate::core::Integrand;
use crate::deformation::{Deformation, DeformationParameters};
use crate::error::{Error, Result};
use crate::polynomial::{self, Polynomial};
use crate::series::{Offset, Series, Shape};

use log::debug;
use num_complex::Complex64;
use num_traits::{One, Zero};
use serde::{Deserialize, Serialize};
use std::f64::consts::PI;
use std::sync::atomic::{AtomicUsize, Ordering};

/// The exponent `constant + regulator * eps`.
#[derive(Clone, Copy, Debug, Default, PartialEq, Deserialize, Serialize)]
pub struct AffineExponent {
    /// The part independent of the regulator.
    pub constant: f64,
    /// The coefficient of the regulator.
    #[serde(default)]
    pub regulator: f64,
}

impl AffineExponent {
    /// Constructor.
    pub const fn new(constant: f64, regulator: f64) -> Self {
        Self {
            constant,
            regulator,
        }
    }

    /// Returns `true` if the exponent vanishes identically.
    pub fn is_zero(&self) -> bool {
        self.constant == 0.0 && self.regulator == 0.0
    }

    /// Returns `true` for `-1 + b eps` with `b != 0`.
    pub fn is_logarithmic_pole(&self) -> bool {
        self.constant == -1.0 && self.regulator != 0.0
    }

    fn needs_logarithm(&self) -> bool {
        self.regulator != 0.0 || self.constant.fract() != 0.0
    }
}

/// A polynomial raised to an affine exponent.
#[derive(Clone, Debug, PartialEq, Deserialize, Serialize)]
pub struct PolynomialFactor {
    /// The polynomial in the notation understood by [`polynomial::parse`].
    pub expression: String,
    /// Its exponent.
    pub exponent: AffineExponent,
}

impl PolynomialFactor {
    /// Constructor.
    pub fn new(expression: impl Into<String>, exponent: AffineExponent) -> Self {
        Self {
            expression: expression.into(),
            exponent,
        }
    }
}

fn default_constant() -> String {
    "1".to_string()
}

/// Static data of a sector. Integration variables are called `x0`, `x1`, ...; polynomials may
/// additionally depend on the real and complex parameters of the integral.
#[derive(Clone, Debug, PartialEq, Deserialize, Serialize)]
pub struct SectorDescriptor {
    /// Identifier of the sector.
    pub id: usize,
    /// Number of integration variables.
    pub dimension: usize,
    /// Power of the regulator multiplying the whole sector, possibly non-integer.
    #[serde(default)]
    pub regulator_power: Offset,
    /// The highest order of the regulator that is computed.
    pub order_max: i32,
    /// Constant prefactor, an expression in the parameters.
    #[serde(default = "default_constant")]
    pub constant: String,
    /// One exponent for each monomial `x_k`.
    pub monomials: Vec<AffineExponent>,
    /// The first Symanzik polynomial.
    pub u: PolynomialFactor,
    /// The second Symanzik polynomial, which also drives the contour deformation.
    pub f: PolynomialFactor,
    /// Further deformed polynomial factors.
    #[serde(default)]
    pub others: Vec<PolynomialFactor>,
}

/// A sector parsed from its descriptor, independent of numerical parameter values.
#[derive(Clone, Debug)]
pub struct Sector {
    id: usize,
    dimension: usize,
    regulator_power: Offset,
    order_max: i32,
    shape: Shape,
    constant: Polynomial<f64>,
    monomials: Vec<AffineExponent>,
    poles: Vec<usize>,
    // `U`, `F` and the other factors in this order
    factors: Vec<(Polynomial<f64>, AffineExponent)>,
    real_parameters: usize,
    complex_parameters: usize,
}

impl Sector {
    /// Parses `descriptor`, whose polynomials may use the symbols in `real_parameters` and
    /// `complex_parameters`. The series of the sector are expanded in `regulator`.
    pub fn new(
        descriptor: &SectorDescriptor,
        regulator: &str,
        real_parameters: &[&str],
        complex_parameters: &[&str],
    ) -> Result<Self> {
        let id = descriptor.id;
        let malformed = |reason: String| Error::MalformedSector { sector: id, reason };

        if descriptor.dimension == 0 || descriptor.dimension >= 64 {
            return Err(malformed(format!(
                "unsupported dimension {}",
                descriptor.dimension
            )));
        }

        if descriptor.monomials.len() != descriptor.dimension {
            return Err(malformed(format!(
                "expected {} monomial exponents, got {}",
                descriptor.dimension,
                descriptor.monomials.len()
            )));
        }

        for (k, exponent) in descriptor.monomials.iter().enumerate() {
            let finite = exponent.constant.is_finite() && exponent.regulator.is_finite();

            if !finite || exponent.constant < -1.0 {
                return Err(malformed(format!(
                    "monomial exponent {} + {}*{} of x{} is not integrable",
                    exponent.constant, exponent.regulator, regulator, k
                )));
            }

            if exponent.constant == -1.0 && exponent.regulator == 0.0 {
                return Err(malformed(format!(
                    "monomial x{} has an unregulated pole",
                    k
                )));
            }
        }

        let poles: Vec<_> = descriptor
            .monomials
            .iter()
            .enumerate()
            .filter(|(_, exponent)| exponent.is_logarithmic_pole())
            .map(|(k, _)| k)
            .collect();

        let min_order = descriptor.regulator_power.floor() - poles.len() as i32;

        if descriptor.order_max < min_order {
            return Err(malformed(format!(
                "highest order {} is below the leading pole {}",
                descriptor.order_max, min_order
            )));
        }

        let variables: Vec<_> = (0..descriptor.dimension)
            .map(|k| format!("x{}", k))
            .collect();
        let symbols: Vec<&str> = variables
            .iter()
            .map(String::as_str)
            .chain(real_parameters.iter().copied())
            .chain(complex_parameters.iter().copied())
            .collect();

        let factors = std::iter::once(&descriptor.u)
            .chain(std::iter::once(&descriptor.f))
            .chain(descriptor.others.iter())
            .map(|factor| {
                polynomial::parse(&factor.expression, &symbols).map(|p| (p, factor.exponent))
            })
            .collect::<Result<Vec<_>>>()?;

        let constant = polynomial::parse(&descriptor.constant, &symbols[descriptor.dimension..])?;

        Ok(Self {
            id,
            dimension: descriptor.dimension,
            regulator_power: descriptor.regulator_power,
            order_max: descriptor.order_max,
            shape: Shape {
                min_order,
                max_order: descriptor.order_max,
                truncated: true,
                regulator: regulator.to_string(),
                offset: descriptor.regulator_power.fract(),
            },
            constant,
            monomials: descriptor.monomials.clone(),
            poles,
            factors,
            real_parameters: real_parameters.len(),
            complex_parameters: complex_parameters.len(),
        })
    }

    /// Returns the identifier.
    pub const fn id(&self) -> usize {
        self.id
    }

    /// Returns the number of integration variables.
    pub const fn dimension(&self) -> usize {
        self.dimension
    }

    /// Returns the window of the series this sector evaluates to.
    pub fn shape(&self) -> &Shape {
        &self.shape
    }

    /// Returns the indices of the variables with logarithmic endpoint poles.
    pub fn poles(&self) -> &[usize] {
        &self.poles
    }

    /// Substitutes numerical values for the parameters.
    pub fn bind(&self, real: &[f64], complex: &[Complex64]) -> Result<BoundSector> {
        if real.len() != self.real_parameters {
            return Err(Error::ParameterMismatch {
                kind: "real",
                expected: self.real_parameters,
                found: real.len(),
            });
        }

        if complex.len() != self.complex_parameters {
            return Err(Error::ParameterMismatch {
                kind: "complex",
                expected: self.complex_parameters,
                found: complex.len(),
            });
        }

        let parameters: Vec<_> = real
            .iter()
            .map(|&r| Complex64::new(r, 0.0))
            .chain(complex.iter().copied())
            .collect();

        let factors = self
            .factors
            .iter()
            .map(|(polynomial, exponent)| {
                polynomial
                    .bind(self.dimension, &parameters)
                    .map(|p| (p, *exponent))
            })
            .collect::<Result<Vec<_>>>()?;

        let constant = self
            .constant
            .bind(0, &parameters)?
            .constant_value()
            .unwrap_or_else(Complex64::zero);

        let deformation = Deformation::new(factors[1].0.clone());

        Ok(BoundSector {
            id: self.id,
            regulator_power: self.regulator_power,
            order_max: self.order_max,
            shape: self.shape.clone(),
            constant,
            monomials: self.monomials.clone(),
            poles: self.poles.clone(),
            factors,
            deformation,
        })
    }
}

/// The value of a sector integrand at one point.
#[derive(Debug)]
pub struct Evaluation {
    /// The Laurent series of the integrand.
    pub value: Series<Complex64>,
    /// Set to [`Error::ContourSingularityProximity`] if a deformed polynomial was evaluated on
    /// or next to its branch cut. The value is computed nonetheless.
    pub proximity: Option<Error>,
}

/// A sector with numerical values for all parameters.
#[derive(Clone, Debug)]
pub struct BoundSector {
    id: usize,
    regulator_power: Offset,
    order_max: i32,
    shape: Shape,
    constant: Complex64,
    monomials: Vec<AffineExponent>,
    poles: Vec<usize>,
    factors: Vec<(Polynomial<Complex64>, AffineExponent)>,
    deformation: Deformation,
}

impl BoundSector {
    /// Returns the identifier.
    pub const fn id(&self) -> usize {
        self.id
    }

    /// Returns the number of integration variables.
    pub fn dimension(&self) -> usize {
        self.monomials.len()
    }

    /// Returns the window of the series this sector evaluates to.
    pub fn shape(&self) -> &Shape {
        &self.shape
    }

    /// Returns the contour deformation.
    pub fn deformation(&self) -> &Deformation {
        &self.deformation
    }

    /// Returns the largest deformation parameters that are allowed at `x`.
    pub fn maximal_parameters(&self, x: &[f64]) -> Vec<f64> {
        self.deformation.maximal_parameters(x)
    }

    /// Evaluates `F` on the contour defined by `lambda`.
    pub fn contour_polynomial(&self, x: &[f64], lambda: &[f64]) -> Complex64 {
        self.deformation.contour_polynomial(x, lambda)
    }

    /// Returns `true` if the contour defined by `lambda` respects the $-i0$ prescription at `x`.
    pub fn is_contour_valid(&self, x: &[f64], lambda: &[f64]) -> bool {
        self.deformation.is_valid(x, lambda)
    }

    /// Freezes the deformation parameters.
    pub fn with_parameters(self, parameters: DeformationParameters) -> Result<SectorIntegrand> {
        SectorIntegrand::new(self, parameters)
    }

    /// Expands everything except the real pole monomials `x_k^(-1 + b eps)` up to `order`. The
    /// monomials are split as `x_k^e (z_k / x_k)^e`, where the first factor stays real and the
    /// second carries the deformation.
    fn expand_regular(
        &self,
        x: &[f64],
        lambda: &[f64],
        order: i32,
        on_cut_allowed: bool,
        proximity: &mut Option<String>,
    ) -> Vec<Complex64> {
        let contour = self.deformation.deform(x, lambda);
        let mut base = contour.jacobian;
        let mut logarithm = Complex64::zero();

        for ((&xk, ratio), exponent) in x.iter().zip(&contour.ratios).zip(&self.monomials) {
            if exponent.is_zero() {
                continue;
            }

            if !exponent.is_logarithmic_pole() {
                if exponent.constant != 0.0 {
                    base *= xk.powf(exponent.constant);
                }

                if exponent.regulator != 0.0 {
                    logarithm += exponent.regulator * xk.ln();
                }
            }

            // the real part of the ratio is one, so the principal branch is continuous
            if !ratio.is_one() {
                let ln = ratio.ln();
                base *= (ln * exponent.constant).exp();
                logarithm += ln * exponent.regulator;
            }
        }

        for (polynomial, exponent) in &self.factors {
            if exponent.is_zero() {
                continue;
            }

            let value = polynomial.evaluate(&contour.z);

            if exponent.needs_logarithm() {
                let (ln, reason) = feynman_ln(value);

                match reason {
                    Some(BranchIssue::OnCut(_)) if on_cut_allowed => {}
                    Some(BranchIssue::OnCut(reason)) | Some(BranchIssue::Singular(reason)) => {
                        proximity.get_or_insert(reason);
                    }
                    None => {}
                }

                base *= (ln * exponent.constant).exp();
                logarithm += ln * exponent.regulator;
            } else {
                if !is_finite(value) || (value.is_zero() && exponent.constant < 0.0) {
                    proximity.get_or_insert(format!("polynomial evaluates to {}", value));
                }

                base *= value.powi(exponent.constant as i32);
            }
        }

        if !is_finite(base) || !is_finite(logarithm) {
            proximity.get_or_insert(format!(
                "integrand evaluates to {} with logarithm {}",
                base, logarithm
            ));
        }

        expand_exponential(base, logarithm, order)
    }

    /// Evaluates the Laurent series of the integrand at `x` on the contour defined by `lambda`.
    pub fn evaluate(&self, x: &[f64], lambda: &[f64]) -> Evaluation {
        let poles = self.poles.len();
        let order = self.order_max - self.regulator_power.floor() + poles as i32;
        let len = (order + 1) as usize;
        let mut proximity = None;

        // bit `i` of the index is set if the pole variable `poles[i]` is set to zero
        let corners: Vec<_> = (0..1_usize << poles)
            .map(|mask| {
                let mut point = x.to_vec();
                for (bit, &k) in self.poles.iter().enumerate() {
                    if mask & (1 << bit) != 0 {
                        point[k] = 0.0;
                    }
                }
                // the -i0 limit is exact where the pole variables vanish
                self.expand_regular(&point, lambda, order, mask != 0, &mut proximity)
            })
            .collect();

        let all = (1_usize << poles) - 1;
        let mut value = Series::zeros(&self.shape);
        let coefficients = value.coefficients_mut();

        for integrated in 0..=all {
            let remaining = all & !integrated;

            // apply the subtraction `G(x) - G(x_k = 0)` for every remaining pole variable
            let mut subtracted = vec![Complex64::zero(); len];
            let mut subset = remaining;
            loop {
                let sign = if subset.count_ones() % 2 == 0 { 1.0 } else { -1.0 };
                for (acc, c) in subtracted.iter_mut().zip(&corners[integrated | subset]) {
                    *acc += c * sign;
                }
                if subset == 0 {
                    break;
                }
                subset = (subset - 1) & remaining;
            }

            let mut weight = 1.0;
            let mut logarithm = 0.0;
            let mut residue = 1.0;

            for (bit, &k) in self.poles.iter().enumerate() {
                let b = self.monomials[k].regulator;

                if integrated & (1 << bit) != 0 {
                    residue /= b;
                } else {
                    weight /= x[k];
                    logarithm += b * x[k].ln();
                }
            }

            let weight = expand_exponential(
                Complex64::new(weight, 0.0),
                Complex64::new(logarithm, 0.0),
                order,
            );

            // every analytically integrated variable lowers the order by one
            let shift = integrated.count_ones() as usize;

            for n in 0..len {
                let index = n + poles - shift;
                if index >= len {
                    break;
                }
                let term: Complex64 = (0..=n).map(|i| subtracted[i] * weight[n - i]).sum();
                coefficients[index] += term * residue;
            }
        }

        for c in coefficients.iter_mut() {
            *c *= self.constant;
        }

        Evaluation {
            value,
            proximity: proximity.map(|reason| Error::ContourSingularityProximity {
                sector: self.id,
                reason,
            }),
        }
    }
}

fn is_finite(value: Complex64) -> bool {
    value.re.is_finite() && value.im.is_finite()
}

/// Returns the coefficients of `base * exp(eps * logarithm)` up to `eps^order`.
fn expand_exponential(base: Complex64, logarithm: Complex64, order: i32) -> Vec<Complex64> {
    let mut coefficients = Vec::with_capacity((order + 1) as usize);
    let mut term = base;

    for n in 0..=order {
        if n > 0 {
            term = term * logarithm / f64::from(n);
        }
        coefficients.push(term);
    }

    coefficients
}

enum BranchIssue {
    OnCut(String),
    Singular(String),
}

/// Natural logarithm continued from below the negative real axis, i.e. `ln(-a) = ln(a) - i pi`
/// for `a > 0`. Values on or numerically next to the branch cut, vanishing and non-finite values
/// are reported.
fn feynman_ln(value: Complex64) -> (Complex64, Option<BranchIssue>) {
    if !is_finite(value) || value.is_zero() {
        return (
            value.ln(),
            Some(BranchIssue::Singular(format!("polynomial evaluates to {}", value))),
        );
    }

    if value.re < 0.0 && value.im.abs() <= 4.0 * f64::EPSILON * value.norm() {
        return (
            Complex64::new((-value.re).ln(), -PI),
            Some(BranchIssue::OnCut(format!(
                "polynomial value {} lies on the branch cut",
                value
            ))),
        );
    }

    (value.ln(), None)
}

/// The integrand of a single sector with frozen deformation parameters.
#[derive(Debug)]
pub struct SectorIntegrand {
    sector: BoundSector,
    parameters: DeformationParameters,
    proximity_points: AtomicUsize,
}

impl SectorIntegrand {
    /// Constructor.
    pub fn new(sector: BoundSector, parameters: DeformationParameters) -> Result<Self> {
        if parameters.values().len() != sector.dimension() {
            return Err(Error::MalformedSector {
                sector: sector.id(),
                reason: format!(
                    "expected {} deformation parameters, got {}",
                    sector.dimension(),
                    parameters.values().len()
                ),
            });
        }

        Ok(Self {
            sector,
            parameters,
            proximity_points: AtomicUsize::new(0),
        })
    }

    /// Returns the bound sector.
    pub fn sector(&self) -> &BoundSector {
        &self.sector
    }

    /// Returns the frozen deformation parameters.
    pub fn parameters(&self) -> &DeformationParameters {
        &self.parameters
    }

    /// Evaluates the integrand at `x`.
    pub fn evaluate(&self, x: &[f64]) -> Evaluation {
        self.sector.evaluate(x, self.parameters.values())
    }

    /// Returns the number of calls that reported a contour singularity proximity.
    pub fn proximity_points(&self) -> usize {
        self.proximity_points.load(Ordering::Relaxed)
    }
}

impl Integrand<f64> for SectorIntegrand {
    fn call(&self, x: &[f64]) -> Series<Complex64> {
        let evaluation = self.evaluate(x);

        if let Some(error) = evaluation.proximity {
            self.proximity_points.fetch_add(1, Ordering::Relaxed);
            debug!("{} at {:?}", error, x);
        }

        evaluation.value
    }

    fn dim(&self) -> usize {
        self.sector.dimension()
    }

    fn shape(&self) -> Shape {
        self.sector.shape().clone()
    }
}
