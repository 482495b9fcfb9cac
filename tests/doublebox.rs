use secdecintir::collection::CombinedIntegrand;
use secdecintir::config::{Config, DeformationConfig};
use secdecintir::core::{Integrand, Integrator};
use secdecintir::integrators::plain::PlainIntegrator;
use secdecintir::series::{Series, Shape};
use secdecintir::topologies;

use num_complex::Complex64;
use rand_pcg::Pcg64;

// Euclidean point away from all thresholds
const S: f64 = -1.0;
const T: f64 = -0.5;
const MSQ: f64 = 1.0;

fn config(contour_deformation: bool) -> Config {
    Config {
        contour_deformation,
        deformation: DeformationConfig {
            number_of_presamples: 1000,
            maximum: 1.0,
            minimum: 1e-5,
            decrease_factor: 0.9,
            ..DeformationConfig::default()
        },
    }
}

fn integrator(calls: usize) -> PlainIntegrator<Pcg64> {
    PlainIntegrator::new(
        Pcg64::new(0xcafef00dd15ea5e5, 0xa02bdbf7bb3c0a7ac28fa16a64abf96),
        2,
        vec![calls],
    )
    .unwrap()
}

#[test]
fn combined_integrand_is_finite_at_the_center() {
    for integral in &[
        topologies::doublebox_planar_sector10(config(true)).unwrap(),
        topologies::doublebox_nonplanar_sector5(config(true)).unwrap(),
    ] {
        let integrand = integral.make_combined_integrand(&[S, T, MSQ], &[]).unwrap();
        let value = integrand.call(&[0.5; 6]);

        assert_eq!(value.min_order(), 0);
        assert_eq!(value.max_order(), 0);
        assert!(value.truncated());

        for c in value.coefficients() {
            assert!(c.re.is_finite());
            assert!(c.im.is_finite());
        }

        assert_eq!(integrand.isolated_evaluations(), 0);
    }
}

#[test]
fn deformation_parameters_are_within_bounds() {
    let config = config(true);
    let integral = topologies::doublebox_planar_sector10(config.clone()).unwrap();

    for integrand in integral.make_integrands(&[S, T, MSQ], &[]).unwrap() {
        assert_eq!(integrand.parameters().values().len(), 6);

        for &lambda in integrand.parameters().values() {
            assert!(lambda >= config.deformation.minimum);
            assert!(lambda <= config.deformation.maximum);
        }
    }

    // same seed, same parameters
    let again = integral.make_integrands(&[S, T, MSQ], &[]).unwrap();
    let first = integral.make_integrands(&[S, T, MSQ], &[]).unwrap();
    assert_eq!(again[0].parameters(), first[0].parameters());
}

// deformed minus undeformed integrand at the same point
struct Difference {
    deformed: CombinedIntegrand,
    undeformed: CombinedIntegrand,
}

impl Integrand<f64> for Difference {
    fn call(&self, x: &[f64]) -> Series<Complex64> {
        self.deformed.call(x) - self.undeformed.call(x)
    }

    fn dim(&self) -> usize {
        self.deformed.dim()
    }

    fn shape(&self) -> Shape {
        self.deformed.shape()
    }
}

#[test]
fn deformed_and_undeformed_integrals_agree() {
    let real = [S, T, MSQ];
    let difference = Difference {
        deformed: topologies::doublebox_planar_sector10(config(true))
            .unwrap()
            .make_combined_integrand(&real, &[])
            .unwrap(),
        undeformed: topologies::doublebox_planar_sector10(config(false))
            .unwrap()
            .make_combined_integrand(&real, &[])
            .unwrap(),
    };

    let integrator = integrator(50_000);
    let value = integrator.integrate(&difference.undeformed).unwrap()[0];
    let delta = integrator.integrate(&difference).unwrap()[0];

    assert!(value.is_finite());
    assert!(delta.is_finite());
    assert!(value.value().re > 0.0);

    // the integral is real in the Euclidean region
    assert_eq!(value.value().im, 0.0);

    // both integrands see the same points, so the error of the difference is small enough to
    // resolve a bias of one percent
    assert!(delta.uncertainty().re < 5e-3 * value.value().re);
    assert!(delta.value().re.abs() < 5.0 * delta.uncertainty().re);
    assert!(delta.value().im.abs() < 5.0 * delta.uncertainty().im);

    assert_eq!(difference.deformed.isolated_evaluations(), 0);
}

#[test]
fn parameter_mismatch_is_reported() {
    let integral = topologies::doublebox_nonplanar_sector5(config(true)).unwrap();

    assert!(integral.make_combined_integrand(&[S, T], &[]).is_err());
}
