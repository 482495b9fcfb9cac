use secdecintir::callbacks::SimpleCumulativeCallback;
use secdecintir::config::Config;
use secdecintir::core::estimators::BasicEstimators;
use secdecintir::error::Result;
use secdecintir::integral::apply_prefactor;
use secdecintir::integrators::plain::*;
use secdecintir::topologies;

use rand_pcg::Pcg64;
use std::env;

fn main() -> Result<()> {
    // an optional JSON file overrides the default settings
    let config = match env::args().nth(1) {
        Some(path) => Config::from_file(path)?,
        None => Config::default(),
    };

    // Euclidean kinematics: s, t, msq
    let real = [-1.0, -0.5, 1.0];

    // Initialize the random number generator.
    let rng = Pcg64::new(0xcafef00dd15ea5e5, 0xa02bdbf7bb3c0a7ac28fa16a64abf96);

    for integral in &[
        topologies::doublebox_planar_sector10(config.clone())?,
        topologies::doublebox_nonplanar_sector5(config.clone())?,
    ] {
        println!("{}", integral.name());

        let integrand = integral.make_combined_integrand(&real, &[])?;
        let checkpoints = integrate(
            &integrand,
            &rng,
            &SimpleCumulativeCallback {},
            4,
            &[10_000, 10_000, 10_000, 10_000],
        );
        integrand.log_summary();

        if let Some(estimators) = accumulate(&checkpoints) {
            let result = apply_prefactor(&topologies::prefactor(), &estimators.result())?;
            println!("result: {}", result);
        }
    }

    Ok(())
}
