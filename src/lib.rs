#![warn(clippy::all, clippy::cargo, clippy::nursery, clippy::pedantic)]
#![warn(missing_docs)]

//! The crate `secdecintir` evaluates and integrates the sectors of [sector-decomposed] Feynman
//! integrals. Each sector is a multi-dimensional integral over the unit hypercube whose integrand
//! is a Laurent series in a dimensional regulator $\epsilon$. Integrable singularities inside the
//! integration domain are avoided by [contour deformation], and poles at the boundary of the
//! domain are subtracted and integrated analytically.
//!
//! # Features
//!
//! - **Sectors as data**. A sector is described by a [`sector::SectorDescriptor`]: its dimension,
//! the exponents of its monomials and the polynomials $U$ and $F$ together with exponents that are
//! affine in the regulator. The polynomials are given as text and parsed once.
//! - **Laurent series with uncertainties**. Results are [`series::Series`] of
//! [`deviation::Deviation`]s, truncated at the highest requested order. Products of series only
//! keep the orders that are known for sure.
//! - **Contour deformation**. Integration variables are moved into the complex plane such that
//! the Feynman $-i0$ prescription is respected. Deformation parameters are determined once per
//! sector on a reproducible set of presamples, see [`optimizer`].
//! - **Robust evaluation**. Points close to a branch cut are reported rather than hidden, and a
//! sector that is not finite at some point does not spoil the sum of all sectors.
//! - **Reproducible integration**. The PLAIN Monte Carlo integrator in [`integrators::plain`]
//! gives results that only depend on the random number generator and its seed, not on the number
//! of cores, and supports checkpoints.
//!
//! # What is ...?
//!
//! Given a sector with integration variables $x_1, \ldots, x_d$ we integrate
//!
//! $$ I(\epsilon) = \prod_{i=1}^d \int_0^1 \mathrm{d} x_i \, c \, \prod_{k=1}^d x_k^{a_k + b_k
//! \epsilon} \, U(x)^{\alpha + \beta \epsilon} F(x)^{\gamma + \delta \epsilon} = \sum_{n} I_n
//! \epsilon^n .$$
//!
//! We use the following terms:
//!
//! - the *regulator* is $\epsilon$, and the *orders* are the powers $n$ of the regulator,
//! - a *pole* is a negative order of the result; it arises from monomials with $a_k = -1$,
//! - the *window* of a series is the range of orders it stores,
//! - a series is *truncated* if the orders above its window are unknown,
//! - the *deformation parameters* $\lambda_k$ control how far the variable $x_k$ is moved away
//! from the real axis,
//! - the *prefactor* is an exact series the sum of all sectors is multiplied with.
//!
//! [sector-decomposed]: https://en.wikipedia.org/wiki/Sector_decomposition
//! [contour deformation]: https://en.wikipedia.org/wiki/Methods_of_contour_integration

pub mod callbacks;
pub mod collection;
pub mod config;
pub mod core;
pub mod deformation;
pub mod deviation;
pub mod error;
pub mod integral;
pub mod integrators;
pub mod optimizer;
pub mod polynomial;
pub mod sector;
pub mod series;
pub mod topologies;

pub use crate::core::*;
