//! Single sectors of the massive two-loop double box integrals.
//!
//! The full planar and non-planar double boxes decompose into many sectors; only sector 10 of
//! the planar and sector 5 of the non-planar integral are bundled here. Each is a one-sector
//! [`Integral`] whose result is the contribution of that sector alone.
//!
//! Both depend on the real parameters `s`, `t` and `msq` and are expanded in the regulator
//! `eps`. The sectors are six-dimensional with the integrand
//!
//! $$ 2 \, z_k^{1 + \epsilon} \, U(z)^{1 + 3 \epsilon} F(z)^{-3 - 2 \epsilon} $$
//!
//! for one variable $x_k$, where the monomial is deformed together with $U$ and $F$. Their
//! prefactor is one.

use crate::collection::SectorCollection;
use crate::config::Config;
use crate::error::Result;
use crate::integral::Integral;
use crate::sector::{AffineExponent, PolynomialFactor, SectorDescriptor};
use crate::series::{Offset, Series};

use num_complex::Complex64;

/// Names of the real parameters of both double box sectors.
pub const REAL_PARAMETERS: [&str; 3] = ["s", "t", "msq"];

/// Name of the regulator of both double box sectors.
pub const REGULATOR: &str = "eps";

const PLANAR_U: &str = "\
    + ( + (1))*x4 + ( + (1))*x2*x4*x5 + ( + (1))*x1*x4 + ( + (1))*x0*x4 + ( + (1))*x3 \
    + ( + (1))*x2*x3*x5 + ( + (1))*x1*x3 + ( + (1))*x0*x3 + ( + (1)) + ( + (1))*x2 \
    + ( + (1))*x2*x5 + ( + (1))*x1 + ( + (1))*x0 + ( + (1))*x1*x2 + ( + (1))*x0*x2";

const PLANAR_F: &str = "\
    + ( + (msq))*x0^2*x2 + ( + (2*msq))*x0*x1*x2 + ( + (msq))*x1^2*x2 \
    + ( + (msq))*x0*x2^2*x5 + ( + (msq))*x1*x2^2*x5 + ( + (msq))*x0^2 + ( + (2*msq))*x0*x1 \
    + ( + (msq))*x1^2 + ( + (3*msq))*x0*x2*x5 + ( + (3*msq))*x1*x2*x5 \
    + ( + (msq))*x2^2*x5^2 + ( + (msq))*x0*x5 + ( + (msq))*x1*x5 + ( + (msq))*x2*x5^2 \
    + ( + (2*msq))*x0*x2 + ( + (2*msq - s))*x1*x2 + ( + (msq))*x2^2*x5 + ( + (2*msq))*x0 \
    + ( + (2*msq - s))*x1 + ( + (3*msq - s))*x2*x5 + ( + (msq))*x5 + ( + (msq))*x2 \
    + ( + (msq)) + ( + (msq))*x0^2*x3 + ( + (2*msq))*x0*x1*x3 + ( + (msq))*x1^2*x3 \
    + ( + (3*msq + s + t))*x0*x2*x3*x5 + ( + (3*msq))*x1*x2*x3*x5 \
    + ( + (msq))*x2^2*x3*x5^2 + ( + (2*msq))*x0*x3*x5 + ( + (2*msq))*x1*x3*x5 \
    + ( + (2*msq))*x2*x3*x5^2 + ( + (2*msq))*x0*x3 + ( + (2*msq - s))*x1*x3 \
    + ( + (3*msq))*x2*x3*x5 + ( + (2*msq))*x3*x5 + ( + (msq))*x3 + ( + (msq))*x0*x3^2*x5 \
    + ( + (msq))*x1*x3^2*x5 + ( + (msq))*x2*x3^2*x5^2 + ( + (msq))*x3^2*x5 \
    + ( + (msq))*x0^2*x4 + ( + (2*msq))*x0*x1*x4 + ( + (msq))*x1^2*x4 \
    + ( + (3*msq))*x0*x2*x4*x5 + ( + (3*msq - s))*x1*x2*x4*x5 + ( + (msq))*x2^2*x4*x5^2 \
    + ( + (2*msq - s))*x0*x4*x5 + ( + (2*msq - s))*x1*x4*x5 + ( + (2*msq - s))*x2*x4*x5^2 \
    + ( + (2*msq))*x0*x4 + ( + (2*msq - s))*x1*x4 + ( + (3*msq))*x2*x4*x5 \
    + ( + (2*msq - s))*x4*x5 + ( + (msq))*x4 + ( + (2*msq))*x0*x3*x4*x5 \
    + ( + (2*msq))*x1*x3*x4*x5 + ( + (2*msq))*x2*x3*x4*x5^2 + ( + (2*msq))*x3*x4*x5 \
    + ( + (msq))*x0*x4^2*x5 + ( + (msq))*x1*x4^2*x5 + ( + (msq))*x2*x4^2*x5^2 \
    + ( + (msq))*x4^2*x5";

const NONPLANAR_U: &str = "\
    + ( + (1))*x5 + ( + (1))*x4 + ( + (1)) + ( + (1))*x0 + ( + (1))*x3*x5 + ( + (1))*x1*x5 \
    + ( + (1))*x2*x5 + ( + (1))*x3*x4 + ( + (1))*x1*x4 + ( + (1))*x2*x4 + ( + (1))*x3 \
    + ( + (1))*x0*x3 + ( + (1))*x2 + ( + (1))*x0*x1 + ( + (1))*x0*x2";

const NONPLANAR_F: &str = "\
    + ( + (msq))*x0^2*x1*x2 + ( + (msq))*x0*x2^2 + ( + (msq))*x0^2*x1^2 \
    + ( + (3*msq - s))*x0*x1*x2 + ( + (msq))*x2^2 + ( + (msq))*x0*x1^2 + ( + (msq))*x1*x2 \
    + ( + (msq))*x0^2*x1*x3 + ( + (2*msq))*x0*x2*x3 + ( + (3*msq))*x0*x1*x3 \
    + ( + (2*msq))*x2*x3 + ( + (msq))*x1*x3 + ( + (msq))*x0*x3^2 + ( + (msq))*x3^2 \
    + ( + (2*msq))*x0*x1*x2*x4 + ( + (msq))*x2^2*x4 + ( + (2*msq))*x0*x1^2*x4 \
    + ( + (3*msq))*x1*x2*x4 + ( + (msq))*x1^2*x4 + ( + (2*msq))*x0*x1*x3*x4 \
    + ( + (2*msq))*x2*x3*x4 + ( + (3*msq))*x1*x3*x4 + ( + (msq))*x3^2*x4 \
    + ( + (msq))*x1*x2*x4^2 + ( + (msq))*x1^2*x4^2 + ( + (msq))*x1*x3*x4^2 \
    + ( + (2*msq))*x0*x1*x2*x5 + ( + (msq))*x2^2*x5 + ( + (2*msq))*x0*x1^2*x5 \
    + ( + (3*msq))*x1*x2*x5 + ( + (msq))*x1^2*x5 + ( + (2*msq))*x0*x1*x3*x5 \
    + ( + (2*msq))*x2*x3*x5 + ( + (3*msq - t))*x1*x3*x5 + ( + (msq))*x3^2*x5 \
    + ( + (2*msq - t))*x1*x2*x4*x5 + ( + (2*msq - t))*x1^2*x4*x5 \
    + ( + (2*msq - t))*x1*x3*x4*x5 + ( + (msq))*x1*x2*x5^2 + ( + (msq))*x1^2*x5^2 \
    + ( + (msq))*x1*x3*x5^2 + ( + (msq))*x0^2*x1 + ( + (2*msq))*x0*x2 + ( + (3*msq))*x0*x1 \
    + ( + (2*msq))*x2 + ( + (msq))*x1 + ( + (2*msq - t))*x0*x3 + ( + (2*msq - t))*x3 \
    + ( + (2*msq))*x0*x1*x4 + ( + (2*msq))*x2*x4 + ( + (3*msq - t))*x1*x4 \
    + ( + (2*msq - t))*x3*x4 + ( + (msq))*x1*x4^2 + ( + (2*msq))*x0*x1*x5 \
    + ( + (2*msq))*x2*x5 + ( + (3*msq))*x1*x5 + ( + (2*msq - t))*x3*x5 \
    + ( + (2*msq - t))*x1*x4*x5 + ( + (msq))*x1*x5^2 + ( + (msq))*x0 + ( + (msq)) \
    + ( + (msq))*x4 + ( + (msq))*x5";

fn double_box_sector(id: usize, monomial: usize, u: &str, f: &str) -> SectorDescriptor {
    let mut monomials = vec![AffineExponent::default(); 6];
    monomials[monomial] = AffineExponent::new(1.0, 1.0);

    SectorDescriptor {
        id,
        dimension: 6,
        regulator_power: Offset::default(),
        order_max: 0,
        constant: "2".to_string(),
        monomials,
        u: PolynomialFactor::new(u, AffineExponent::new(1.0, 3.0)),
        f: PolynomialFactor::new(f, AffineExponent::new(-3.0, -2.0)),
        others: Vec::new(),
    }
}

/// The descriptor of sector 10 of the planar double box, with the monomial `x5`.
pub fn doublebox_planar_sector10_descriptors() -> Vec<SectorDescriptor> {
    vec![double_box_sector(10, 5, PLANAR_U, PLANAR_F)]
}

/// The descriptor of sector 5 of the non-planar double box, with the monomial `x1`.
pub fn doublebox_nonplanar_sector5_descriptors() -> Vec<SectorDescriptor> {
    vec![double_box_sector(5, 1, NONPLANAR_U, NONPLANAR_F)]
}

/// Sector 10 of the planar double box as an integral of its own.
pub fn doublebox_planar_sector10(config: Config) -> Result<Integral> {
    let descriptors = doublebox_planar_sector10_descriptors();
    let collection = SectorCollection::new(&descriptors, REGULATOR, &REAL_PARAMETERS, &[])?;
    Integral::new("doublebox_planar_sector10", collection, config)
}

/// Sector 5 of the non-planar double box as an integral of its own.
pub fn doublebox_nonplanar_sector5(config: Config) -> Result<Integral> {
    let descriptors = doublebox_nonplanar_sector5_descriptors();
    let collection = SectorCollection::new(&descriptors, REGULATOR, &REAL_PARAMETERS, &[])?;
    Integral::new("doublebox_nonplanar_sector5", collection, config)
}

/// The prefactor of both double box sectors.
pub fn prefactor() -> Series<Complex64> {
    Series::constant(Complex64::new(1.0, 0.0), REGULATOR)
}
