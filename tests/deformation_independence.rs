use secdecintir::core::Integrator;
use secdecintir::deformation::DeformationParameters;
use secdecintir::integrators::plain::PlainIntegrator;
use secdecintir::sector::{
    AffineExponent, BoundSector, PolynomialFactor, Sector, SectorDescriptor,
};
use secdecintir::series::Offset;

use assert_approx_eq::assert_approx_eq;
use num_complex::Complex64;
use rand_pcg::Pcg64;

// x^monomial (x - 1/2 - i0)^f on the unit interval
fn sector(monomial: AffineExponent, f: AffineExponent, order_max: i32) -> BoundSector {
    let descriptor = SectorDescriptor {
        id: 0,
        dimension: 1,
        regulator_power: Offset::default(),
        order_max,
        constant: "1".to_string(),
        monomials: vec![monomial],
        u: PolynomialFactor::new("1", AffineExponent::default()),
        f: PolynomialFactor::new("x0 - 0.5", f),
        others: Vec::new(),
    };

    Sector::new(&descriptor, "eps", &[], &[])
        .unwrap()
        .bind(&[], &[])
        .unwrap()
}

// (x - 1/2 - i0)^(-1/2 - eps)
fn square_root() -> BoundSector {
    sector(AffineExponent::default(), AffineExponent::new(-0.5, -1.0), 1)
}

// returns the lowest order and the midpoint-rule estimate of every order
fn midpoint_rule(sector: &BoundSector, lambda: f64, points: usize) -> (i32, Vec<Complex64>) {
    let min_order = sector.shape().min_order;
    let mut sum = vec![Complex64::new(0.0, 0.0); sector.shape().len()];

    for i in 0..points {
        let x = [(i as f64 + 0.5) / points as f64];
        assert!(sector.is_contour_valid(&x, &[lambda]));

        let evaluation = sector.evaluate(&x, &[lambda]);
        assert!(evaluation.proximity.is_none());

        for (s, (_, c)) in sum.iter_mut().zip(evaluation.value.iter()) {
            *s += *c;
        }
    }

    let mean = sum.into_iter().map(|s| s / points as f64).collect();
    (min_order, mean)
}

fn exact() -> Vec<Complex64> {
    let a = 0.5_f64.sqrt();
    let log = 4.0 * a - 2.0 * a * 0.5_f64.ln();

    vec![
        Complex64::new(2.0 * a, 2.0 * a),
        Complex64::new(log - 2.0 * std::f64::consts::PI * a, log),
    ]
}

fn assert_relative(actual: Complex64, expected: Complex64, tolerance: f64) {
    assert!(
        (actual - expected).norm() <= tolerance * expected.norm(),
        "{} differs from {}",
        actual,
        expected
    );
}

#[test]
fn closed_form_for_two_deformations() {
    let sector = square_root();
    let exact = exact();

    let (_, large) = midpoint_rule(&sector, 1.0, 10_000);
    let (_, small) = midpoint_rule(&sector, 0.5, 10_000);

    for order in 0..2 {
        assert_relative(large[order], exact[order], 1e-4);
        assert_relative(small[order], exact[order], 1e-4);
        assert_relative(large[order], small[order], 1e-4);
    }
}

#[test]
fn deformed_monomial() {
    // int x (x - 1/2 - i0)^(-1/2) = sqrt(2) (2 + i) / 3
    let sector = sector(AffineExponent::new(1.0, 0.0), AffineExponent::new(-0.5, 0.0), 0);
    let exact = Complex64::new(2.0, 1.0) * 2.0_f64.sqrt() / 3.0;

    for &lambda in &[0.25, 0.5, 1.0] {
        let (_, value) = midpoint_rule(&sector, lambda, 10_000);
        assert_relative(value[0], exact, 1e-4);
    }
}

#[test]
fn deformed_pole_monomial() {
    // int x^(-1 + eps) (x - 1/2 - i0)^(-1/2) = i sqrt(2) / eps + pi / sqrt(2) + i sqrt(2) ln(2)
    let sector = sector(AffineExponent::new(-1.0, 1.0), AffineExponent::new(-0.5, 0.0), 0);
    let sqrt2 = 2.0_f64.sqrt();
    let pole = Complex64::new(0.0, sqrt2);
    let finite = Complex64::new(std::f64::consts::PI / sqrt2, sqrt2 * 2.0_f64.ln());

    for &lambda in &[0.25, 0.5, 1.0] {
        let (min_order, value) = midpoint_rule(&sector, lambda, 10_000);

        assert_eq!(min_order, -1);
        assert_relative(value[0], pole, 1e-10);
        assert_relative(value[1], finite, 1e-4);
    }
}

#[test]
fn sign_of_the_imaginary_part() {
    // the -i0 prescription puts the integral into the upper half plane
    let sector = square_root();
    let (_, value) = midpoint_rule(&sector, 0.25, 2_000);

    assert!(value[0].im > 0.0);
    assert_approx_eq!(value[0].re, value[0].im, 1e-3);
}

#[test]
fn monte_carlo_agrees_with_closed_form() {
    let integrand = square_root()
        .with_parameters(DeformationParameters::new(vec![1.0], false))
        .unwrap();
    let integrator = PlainIntegrator::new(
        Pcg64::new(0xcafef00dd15ea5e5, 0xa02bdbf7bb3c0a7ac28fa16a64abf96),
        4,
        vec![50_000, 50_000],
    )
    .unwrap();

    let result = integrator.integrate(&integrand).unwrap();
    let exact = exact();

    for order in 0..2 {
        let value = result[order].value();
        let error = result[order].uncertainty();

        assert!((value.re - exact[order as usize].re).abs() < 5.0 * error.re);
        assert!((value.im - exact[order as usize].im).abs() < 5.0 * error.im);
    }

    assert_eq!(integrand.proximity_points(), 0);
}
