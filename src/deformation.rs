//! Contour deformation of the integration variables.
//!
//! The real integration variables are shifted into the complex plane along the direction of
//! steepest ascent of the imaginary part of the singular polynomial $F$,
//!
//! $$ z_k = x_k - i \lambda_k x_k (1 - x_k) \frac{\partial \mathrm{Re} F}{\partial x_k}(x) ,$$
//!
//! which vanishes on the boundary of the unit hypercube and moves the contour away from the
//! zeros of $F$ in accordance with the Feynman $-i0$ prescription. The Jacobian of the
//! transformation is the full determinant of $\partial z_k / \partial x_l$.

use num_complex::Complex64;
use num_traits::{One, Zero};
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;

use crate::polynomial::Polynomial;

/// Per-variable deformation parameters of a sector, frozen before the integration begins.
#[derive(Clone, Debug, PartialEq, Deserialize, Serialize)]
pub struct DeformationParameters {
    values: Vec<f64>,
    exhausted: bool,
}

impl DeformationParameters {
    /// Constructor.
    pub fn new(values: Vec<f64>, exhausted: bool) -> Self {
        Self { values, exhausted }
    }

    /// Parameters that switch the deformation off.
    pub fn undeformed(dimension: usize) -> Self {
        Self::new(vec![0.0; dimension], false)
    }

    /// Returns one parameter per integration variable.
    pub fn values(&self) -> &[f64] {
        &self.values
    }

    /// Returns `true` if the search reached its lower bound without validating every presample.
    pub const fn exhausted(&self) -> bool {
        self.exhausted
    }
}

/// A deformed point together with the Jacobian of the deformation.
#[derive(Clone, Debug, PartialEq)]
pub struct Contour {
    /// The deformed integration variables.
    pub z: Vec<Complex64>,
    /// The ratios `z_k / x_k`, which stay finite at `x_k = 0`.
    pub ratios: Vec<Complex64>,
    /// The determinant of the Jacobian matrix.
    pub jacobian: Complex64,
}

/// The deformation generated by a bound singular polynomial.
#[derive(Clone, Debug)]
pub struct Deformation {
    polynomial: Polynomial<Complex64>,
    gradient: Vec<Polynomial<Complex64>>,
    // only the upper triangle `l >= k` is stored
    hessian: Vec<Vec<Polynomial<Complex64>>>,
}

impl Deformation {
    /// Derives the deformation from the singular polynomial `polynomial`.
    pub fn new(polynomial: Polynomial<Complex64>) -> Self {
        let dimension = polynomial.variables();
        let gradient: Vec<_> = (0..dimension).map(|k| polynomial.derivative(k)).collect();
        let hessian = gradient
            .iter()
            .enumerate()
            .map(|(k, first)| (k..dimension).map(|l| first.derivative(l)).collect())
            .collect();

        Self {
            polynomial,
            gradient,
            hessian,
        }
    }

    /// Returns the number of integration variables.
    pub fn dimension(&self) -> usize {
        self.polynomial.variables()
    }

    /// Returns the singular polynomial.
    pub fn polynomial(&self) -> &Polynomial<Complex64> {
        &self.polynomial
    }

    fn second_derivative(&self, k: usize, l: usize) -> &Polynomial<Complex64> {
        let (k, l) = if k <= l { (k, l) } else { (l, k) };
        &self.hessian[k][l - k]
    }

    fn real_gradient(&self, point: &[Complex64]) -> Vec<f64> {
        self.gradient
            .iter()
            .map(|derivative| derivative.evaluate(point).re)
            .collect()
    }

    /// Deforms the real point `x` with the parameters `lambda`.
    pub fn deform(&self, x: &[f64], lambda: &[f64]) -> Contour {
        let dimension = self.dimension();
        debug_assert_eq!(x.len(), dimension);
        debug_assert_eq!(lambda.len(), dimension);

        let point = real_point(x);
        let gradient = self.real_gradient(&point);

        let ratios: Vec<_> = (0..dimension)
            .map(|k| Complex64::new(1.0, -lambda[k] * (1.0 - x[k]) * gradient[k]))
            .collect();
        let z = ratios.iter().zip(x).map(|(r, &xk)| r * xk).collect();

        if lambda.iter().all(|&l| l == 0.0) {
            return Contour {
                z,
                ratios,
                jacobian: Complex64::one(),
            };
        }

        let matrix = (0..dimension)
            .map(|k| {
                (0..dimension)
                    .map(|l| {
                        let curvature = self.second_derivative(k, l).evaluate(&point).re;
                        let mut shift = x[k] * (1.0 - x[k]) * curvature;
                        let mut entry = Complex64::zero();

                        if k == l {
                            shift += (1.0 - 2.0 * x[k]) * gradient[k];
                            entry = Complex64::one();
                        }

                        entry - Complex64::i() * lambda[k] * shift
                    })
                    .collect()
            })
            .collect();

        Contour {
            z,
            ratios,
            jacobian: determinant(matrix),
        }
    }

    /// Evaluates the singular polynomial on the contour defined by `lambda`.
    pub fn contour_polynomial(&self, x: &[f64], lambda: &[f64]) -> Complex64 {
        self.polynomial.evaluate(&self.deform(x, lambda).z)
    }

    /// Returns the largest parameter for each variable such that the linearized deformation
    /// of `x_k` stays monotonic at `x`, i.e. the diagonal of the Jacobian keeps a positive
    /// real part. Variables whose deformation does not depend on themselves are unbounded.
    pub fn maximal_parameters(&self, x: &[f64]) -> Vec<f64> {
        let point = real_point(x);
        let gradient = self.real_gradient(&point);

        (0..self.dimension())
            .map(|k| {
                let curvature = self.second_derivative(k, k).evaluate(&point).re;
                let slope =
                    ((1.0 - 2.0 * x[k]) * gradient[k] + x[k] * (1.0 - x[k]) * curvature).abs();

                if slope == 0.0 {
                    f64::INFINITY
                } else {
                    1.0 / slope
                }
            })
            .collect()
    }

    /// Returns `true` if the deformed singular polynomial at `x` is finite and has a
    /// non-positive imaginary part, as required by the $-i0$ prescription.
    pub fn is_valid(&self, x: &[f64], lambda: &[f64]) -> bool {
        let value = self.contour_polynomial(x, lambda);
        value.re.is_finite() && value.im.is_finite() && value.im <= 0.0
    }
}

fn real_point(x: &[f64]) -> Vec<Complex64> {
    x.iter().map(|&v| Complex64::new(v, 0.0)).collect()
}

/// Determinant by LU decomposition with partial pivoting.
fn determinant(mut matrix: Vec<Vec<Complex64>>) -> Complex64 {
    let n = matrix.len();
    let mut det = Complex64::one();

    for col in 0..n {
        let pivot = (col..n)
            .max_by(|&a, &b| {
                matrix[a][col]
                    .norm()
                    .partial_cmp(&matrix[b][col].norm())
                    .unwrap_or(Ordering::Equal)
            })
            .unwrap_or(col);

        if matrix[pivot][col].is_zero() {
            return Complex64::zero();
        }

        if pivot != col {
            matrix.swap(pivot, col);
            det = -det;
        }

        let pivot_row = matrix[col].clone();
        det *= pivot_row[col];

        for row in matrix.iter_mut().skip(col + 1) {
            let factor = row[col] / pivot_row[col];
            for (entry, &upper) in row.iter_mut().zip(&pivot_row).skip(col) {
                *entry -= factor * upper;
            }
        }
    }

    det
}
