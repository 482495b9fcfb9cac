//! The driver tying sectors, deformation search and integration together.

use crate::collection::{CombinedIntegrand, SectorCollection};
use crate::config::Config;
use crate::core::Integrator;
use crate::deformation::DeformationParameters;
use crate::deviation::Deviation;
use crate::error::Result;
use crate::optimizer;
use crate::sector::{BoundSector, SectorIntegrand};
use crate::series::Series;

use log::{info, warn};
use num_complex::Complex64;
use serde::{Deserialize, Serialize};

/// Multiplies an integration result with an exact `prefactor`.
pub fn apply_prefactor(
    prefactor: &Series<Complex64>,
    result: &Series<Deviation<Complex64>>,
) -> Result<Series<Deviation<Complex64>>> {
    prefactor.try_mul(result)
}

/// Results of a sector-by-sector integration.
#[derive(Clone, Debug, Deserialize, Serialize)]
pub struct IntegralResult {
    /// Identifier and result of every sector, without the prefactor.
    pub sectors: Vec<(usize, Series<Deviation<Complex64>>)>,
    /// Sum of all sectors, without the prefactor.
    pub sum: Series<Deviation<Complex64>>,
    /// Sum of all sectors multiplied with the prefactor.
    pub total: Series<Deviation<Complex64>>,
}

/// An integral given by a collection of sectors.
#[derive(Clone, Debug)]
pub struct Integral {
    name: String,
    collection: SectorCollection,
    config: Config,
}

impl Integral {
    /// Constructor.
    pub fn new(
        name: impl Into<String>,
        collection: SectorCollection,
        config: Config,
    ) -> Result<Self> {
        config.validate()?;

        Ok(Self {
            name: name.into(),
            collection,
            config,
        })
    }

    /// Returns the name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the sectors.
    pub const fn collection(&self) -> &SectorCollection {
        &self.collection
    }

    /// Returns the configuration.
    pub const fn config(&self) -> &Config {
        &self.config
    }

    /// Determines the deformation parameters of every sector, or switches the deformation off if
    /// [`Config::contour_deformation`] is `false`.
    pub fn deformation_parameters(
        &self,
        sectors: &[BoundSector],
    ) -> Result<Vec<DeformationParameters>> {
        sectors
            .iter()
            .map(|sector| {
                if self.config.contour_deformation {
                    optimizer::optimize(sector, &self.config.deformation)
                } else {
                    Ok(DeformationParameters::undeformed(sector.dimension()))
                }
            })
            .collect()
    }

    /// Returns one integrand per sector with frozen deformation parameters.
    pub fn make_integrands(
        &self,
        real: &[f64],
        complex: &[Complex64],
    ) -> Result<Vec<SectorIntegrand>> {
        let sectors = self.collection.bind(real, complex)?;
        let parameters = self.deformation_parameters(&sectors)?;

        let exhausted = parameters.iter().filter(|p| p.exhausted()).count();
        if exhausted > 0 {
            warn!(
                "{}: {} of {} sectors use deformation parameters that failed the presampling",
                self.name,
                exhausted,
                sectors.len()
            );
        }

        sectors
            .into_iter()
            .zip(parameters)
            .map(|(sector, parameters)| sector.with_parameters(parameters))
            .collect()
    }

    /// Returns the sum of all sector integrands.
    pub fn make_combined_integrand(
        &self,
        real: &[f64],
        complex: &[Complex64],
    ) -> Result<CombinedIntegrand> {
        CombinedIntegrand::new(self.make_integrands(real, complex)?)
    }

    /// Integrates every sector separately and sums the results.
    pub fn integrate_sectors<I: Integrator<f64>>(
        &self,
        integrator: &I,
        real: &[f64],
        complex: &[Complex64],
        prefactor: &Series<Complex64>,
    ) -> Result<IntegralResult> {
        let integrands = self.make_integrands(real, complex)?;
        let mut sectors = Vec::with_capacity(integrands.len());

        for integrand in &integrands {
            let id = integrand.sector().id();
            let result = integrator.integrate(integrand)?;

            if integrand.proximity_points() > 0 {
                warn!(
                    "{}: sector {} was close to a contour singularity at {} points",
                    self.name,
                    id,
                    integrand.proximity_points()
                );
            }

            info!("{}: sector {} = {}", self.name, id, result);
            sectors.push((id, result));
        }

        let mut results = sectors.iter().map(|(_, result)| result);
        let sum = match results.next() {
            Some(first) => results.try_fold(first.clone(), |acc, result| acc.try_add(result))?,
            None => Series::zeros(self.collection.shape()),
        };
        let total = apply_prefactor(prefactor, &sum)?;

        info!("{}: total = {}", self.name, total);

        Ok(IntegralResult {
            sectors,
            sum,
            total,
        })
    }

    /// Integrates the sum of all sectors at once and multiplies the result with `prefactor`.
    pub fn integrate_combined<I: Integrator<f64>>(
        &self,
        integrator: &I,
        real: &[f64],
        complex: &[Complex64],
        prefactor: &Series<Complex64>,
    ) -> Result<Series<Deviation<Complex64>>> {
        let integrand = self.make_combined_integrand(real, complex)?;
        let sum = integrator.integrate(&integrand)?;

        integrand.log_summary();

        let total = apply_prefactor(prefactor, &sum)?;

        info!("{}: total = {}", self.name, total);

        Ok(total)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::DeformationConfig;
    use crate::error::Error;
    use crate::integrators::plain::PlainIntegrator;
    use crate::sector::{AffineExponent, PolynomialFactor, SectorDescriptor};
    use crate::series::Offset;
    use assert_approx_eq::assert_approx_eq;
    use rand_pcg::Pcg64;

    fn descriptor(id: usize, f: &str, exponent: AffineExponent) -> SectorDescriptor {
        SectorDescriptor {
            id,
            dimension: 1,
            regulator_power: Offset::default(),
            order_max: 0,
            constant: "1".to_string(),
            monomials: vec![AffineExponent::default()],
            u: PolynomialFactor::new("1 + x0", AffineExponent::new(1.0, 1.0)),
            f: PolynomialFactor::new(f, exponent),
            others: Vec::new(),
        }
    }

    fn config(contour_deformation: bool) -> Config {
        Config {
            contour_deformation,
            deformation: DeformationConfig {
                number_of_presamples: 1000,
                ..DeformationConfig::default()
            },
        }
    }

    fn integrator() -> PlainIntegrator<Pcg64> {
        PlainIntegrator::new(
            Pcg64::new(0xcafef00dd15ea5e5, 0xa02bdbf7bb3c0a7ac28fa16a64abf96),
            2,
            vec![50_000, 50_000],
        )
        .unwrap()
    }

    #[test]
    fn euclidean_sectors() {
        let collection = SectorCollection::new(
            &[
                descriptor(1, "s + x0", AffineExponent::new(-1.0, -1.0)),
                descriptor(2, "s", AffineExponent::new(-1.0, -1.0)),
            ],
            "eps",
            &["s"],
            &[],
        )
        .unwrap();
        let integral = Integral::new("euclidean", collection, config(true)).unwrap();
        let prefactor = Series::constant(Complex64::new(2.0, 0.0), "eps");

        let result = integral
            .integrate_sectors(&integrator(), &[2.0], &[], &prefactor)
            .unwrap();

        // 1 - ln(3/2) and 3/4
        let first = 1.0 - 1.5_f64.ln();
        let second = 0.75;

        assert_eq!(result.sectors.len(), 2);
        assert_eq!(result.sectors[0].0, 1);
        assert_approx_eq!(result.sectors[0].1[0].value().re, first, 5e-3);
        assert_approx_eq!(result.sectors[1].1[0].value().re, second, 5e-3);
        assert_approx_eq!(result.sum[0].value().re, first + second, 5e-3);
        assert_approx_eq!(result.total[0].value().re, 2.0 * (first + second), 1e-2);
        assert_approx_eq!(
            result.total[0].uncertainty().re,
            2.0 * result.sum[0].uncertainty().re
        );

        let combined = integral
            .integrate_combined(&integrator(), &[2.0], &[], &prefactor)
            .unwrap();
        assert_approx_eq!(combined[0].value().re, 2.0 * (first + second), 1e-2);
        assert_approx_eq!(combined[0].value().im, 0.0, 1e-2);
    }

    #[test]
    fn deformed_square_root() {
        let collection = SectorCollection::new(
            &[descriptor(1, "x0 - 0.5", AffineExponent::new(-0.5, 0.0))],
            "eps",
            &[],
            &[],
        )
        .unwrap();

        let integral = Integral::new("sqrt", collection, config(true)).unwrap();
        let integrands = integral.make_integrands(&[], &[]).unwrap();

        assert_eq!(integrands[0].parameters().values(), &[1.0]);

        let one = Series::constant(Complex64::new(1.0, 0.0), "eps");
        let result = integral
            .integrate_combined(&integrator(), &[], &[], &one)
            .unwrap();

        // integral of (1 + x) (x - 1/2 - i0)^(-1/2)
        let expected = Complex64::new(5.0, 4.0) * 2.0_f64.sqrt() / 3.0;
        assert_approx_eq!(result[0].value().re, expected.re, 2e-2);
        assert_approx_eq!(result[0].value().im, expected.im, 2e-2);
    }

    #[test]
    fn undeformed_configuration() {
        let collection = SectorCollection::new(
            &[descriptor(1, "s + x0", AffineExponent::new(-1.0, -1.0))],
            "eps",
            &["s"],
            &[],
        )
        .unwrap();
        let integral = Integral::new("plain", collection, config(false)).unwrap();

        let integrands = integral.make_integrands(&[2.0], &[]).unwrap();
        assert_eq!(integrands[0].parameters().values(), &[0.0]);
    }

    #[test]
    fn parameter_counts_are_checked() {
        let collection = SectorCollection::new(
            &[descriptor(1, "s + x0", AffineExponent::new(-1.0, -1.0))],
            "eps",
            &["s"],
            &[],
        )
        .unwrap();
        let integral = Integral::new("counts", collection, config(true)).unwrap();

        assert!(matches!(
            integral.make_integrands(&[1.0, 2.0], &[]),
            Err(Error::ParameterMismatch {
                kind: "real",
                expected: 1,
                found: 2
            })
        ));
        assert!(matches!(
            integral.make_combined_integrand(&[1.0], &[Complex64::new(0.0, 1.0)]),
            Err(Error::ParameterMismatch { kind: "complex", .. })
        ));
    }

    #[test]
    fn prefactor_is_exact() {
        let result = Series::new(
            -1,
            0,
            vec![
                Deviation::new(Complex64::new(1.0, 0.0), Complex64::new(0.1, 0.0)),
                Deviation::new(Complex64::new(2.0, 1.0), Complex64::new(0.2, 0.1)),
            ],
            true,
            "eps",
        )
        .unwrap();
        let prefactor = Series::new(
            0,
            1,
            vec![Complex64::new(3.0, 0.0), Complex64::new(1.0, 0.0)],
            false,
            "eps",
        )
        .unwrap();

        let total = apply_prefactor(&prefactor, &result).unwrap();

        assert_eq!(total.min_order(), -1);
        assert_eq!(total.max_order(), 0);
        assert_approx_eq!(total[-1].value().re, 3.0);
        assert_approx_eq!(total[-1].uncertainty().re, 0.3);
        // 3 (2 + i) + 1
        assert_approx_eq!(total[0].value().re, 7.0);
        assert_approx_eq!(total[0].value().im, 3.0);
        assert_approx_eq!(total[0].uncertainty().re, (0.36_f64 + 0.01).sqrt());
    }
}
