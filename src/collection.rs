//! Collections of sectors and the integrand summing them.

use crate::core::Integrand;
use crate::deformation::DeformationParameters;
use crate::error::{Error, Result};
use crate::sector::{BoundSector, Sector, SectorDescriptor, SectorIntegrand};
use crate::series::{Series, Shape};

use log::{debug, info, warn};
use num_complex::Complex64;
use std::collections::BTreeSet;
use std::fs;
use std::path::Path;
use std::sync::atomic::{AtomicUsize, Ordering};

/// Returns the window of the sum of series with the given shapes: the lowest order of all
/// windows and, since sector series are truncated, the lowest highest order.
fn combined_shape<'a>(mut shapes: impl Iterator<Item = &'a Shape>) -> Result<Shape> {
    let first = shapes.next().ok_or_else(|| {
        Error::InvalidConfiguration("at least one sector is required".to_string())
    })?;

    shapes
        .try_fold(Series::<Complex64>::zeros(first), |acc, shape| {
            acc.try_add(&Series::zeros(shape))
        })
        .map(|sum| sum.shape())
}

/// All sectors of an integral together with the names of its regulator and parameters.
#[derive(Clone, Debug)]
pub struct SectorCollection {
    regulator: String,
    real_parameters: Vec<String>,
    complex_parameters: Vec<String>,
    sectors: Vec<Sector>,
    shape: Shape,
}

impl SectorCollection {
    /// Parses all `descriptors`. Sector identifiers must be unique and all sectors must expand
    /// in the same powers of the regulator.
    pub fn new(
        descriptors: &[SectorDescriptor],
        regulator: &str,
        real_parameters: &[&str],
        complex_parameters: &[&str],
    ) -> Result<Self> {
        let mut ids = BTreeSet::new();

        for descriptor in descriptors {
            if !ids.insert(descriptor.id) {
                return Err(Error::MalformedSector {
                    sector: descriptor.id,
                    reason: "the identifier is used more than once".to_string(),
                });
            }
        }

        let sectors = descriptors
            .iter()
            .map(|descriptor| {
                Sector::new(descriptor, regulator, real_parameters, complex_parameters)
            })
            .collect::<Result<Vec<_>>>()?;

        let shape = combined_shape(sectors.iter().map(Sector::shape))?;

        Ok(Self {
            regulator: regulator.to_string(),
            real_parameters: real_parameters.iter().map(|&p| p.to_string()).collect(),
            complex_parameters: complex_parameters.iter().map(|&p| p.to_string()).collect(),
            sectors,
            shape,
        })
    }

    /// Reads a JSON array of [`SectorDescriptor`]s.
    pub fn from_json(
        json: &str,
        regulator: &str,
        real_parameters: &[&str],
        complex_parameters: &[&str],
    ) -> Result<Self> {
        let descriptors: Vec<SectorDescriptor> = serde_json::from_str(json)?;
        Self::new(&descriptors, regulator, real_parameters, complex_parameters)
    }

    /// Reads a JSON array of [`SectorDescriptor`]s from the file at `path`.
    pub fn from_file(
        path: impl AsRef<Path>,
        regulator: &str,
        real_parameters: &[&str],
        complex_parameters: &[&str],
    ) -> Result<Self> {
        Self::from_json(
            &fs::read_to_string(path)?,
            regulator,
            real_parameters,
            complex_parameters,
        )
    }

    /// Returns the name of the regulator.
    pub fn regulator(&self) -> &str {
        &self.regulator
    }

    /// Returns the names of the real parameters.
    pub fn real_parameters(&self) -> &[String] {
        &self.real_parameters
    }

    /// Returns the names of the complex parameters.
    pub fn complex_parameters(&self) -> &[String] {
        &self.complex_parameters
    }

    /// Returns the sectors.
    pub fn sectors(&self) -> &[Sector] {
        &self.sectors
    }

    /// Returns the window of the sum of all sectors.
    pub fn shape(&self) -> &Shape {
        &self.shape
    }

    /// Checks the number of supplied parameters.
    pub fn check_parameters(&self, real: &[f64], complex: &[Complex64]) -> Result<()> {
        if real.len() != self.real_parameters.len() {
            return Err(Error::ParameterMismatch {
                kind: "real",
                expected: self.real_parameters.len(),
                found: real.len(),
            });
        }

        if complex.len() != self.complex_parameters.len() {
            return Err(Error::ParameterMismatch {
                kind: "complex",
                expected: self.complex_parameters.len(),
                found: complex.len(),
            });
        }

        Ok(())
    }

    /// Substitutes numerical values for the parameters of every sector.
    pub fn bind(&self, real: &[f64], complex: &[Complex64]) -> Result<Vec<BoundSector>> {
        self.check_parameters(real, complex)?;

        let bound = self
            .sectors
            .iter()
            .map(|sector| sector.bind(real, complex))
            .collect::<Result<Vec<_>>>()?;

        info!("bound {} sectors to {:?} and {:?}", bound.len(), real, complex);

        Ok(bound)
    }
}

/// The sum of several sector integrands. Sectors whose value at a point is not finite are left
/// out of the sum at that point.
#[derive(Debug)]
pub struct CombinedIntegrand {
    integrands: Vec<SectorIntegrand>,
    shape: Shape,
    dim: usize,
    isolated_evaluations: AtomicUsize,
    proximity_points: AtomicUsize,
}

impl CombinedIntegrand {
    /// Constructor. All integrands must share the regulator and its offset.
    pub fn new(integrands: Vec<SectorIntegrand>) -> Result<Self> {
        let shape = combined_shape(integrands.iter().map(|i| i.sector().shape()))?;
        let dim = integrands
            .iter()
            .map(|i| i.sector().dimension())
            .max()
            .unwrap_or(0);

        Ok(Self {
            integrands,
            shape,
            dim,
            isolated_evaluations: AtomicUsize::new(0),
            proximity_points: AtomicUsize::new(0),
        })
    }

    /// Returns the sector integrands.
    pub fn integrands(&self) -> &[SectorIntegrand] {
        &self.integrands
    }

    /// Returns the number of sector evaluations left out because of non-finite values.
    pub fn isolated_evaluations(&self) -> usize {
        self.isolated_evaluations.load(Ordering::Relaxed)
    }

    /// Returns the number of sector evaluations close to a contour singularity.
    pub fn proximity_points(&self) -> usize {
        self.proximity_points.load(Ordering::Relaxed)
    }

    /// Logs how many sector evaluations were problematic since construction.
    pub fn log_summary(&self) {
        let proximity = self.proximity_points();
        let isolated = self.isolated_evaluations();

        if proximity > 0 {
            warn!(
                "{} sector evaluations were close to a contour singularity",
                proximity
            );
        }

        if isolated > 0 {
            warn!(
                "{} sector evaluations were not finite and left out of the sum",
                isolated
            );
        }
    }
}

impl Integrand<f64> for CombinedIntegrand {
    fn call(&self, x: &[f64]) -> Series<Complex64> {
        let mut total = Series::zeros(&self.shape);
        let min_order = self.shape.min_order;

        for integrand in &self.integrands {
            let evaluation = integrand.evaluate(&x[..integrand.dim()]);

            if let Some(error) = evaluation.proximity {
                self.proximity_points.fetch_add(1, Ordering::Relaxed);
                debug!("{} at {:?}", error, x);
            }

            let value = evaluation.value;

            if !value
                .coefficients()
                .iter()
                .all(|c| c.re.is_finite() && c.im.is_finite())
            {
                self.isolated_evaluations.fetch_add(1, Ordering::Relaxed);
                debug!(
                    "sector {} is not finite at {:?}: {}",
                    integrand.sector().id(),
                    x,
                    value
                );
                continue;
            }

            // orders below the window of a sector vanish
            for (i, c) in total.coefficients_mut().iter_mut().enumerate() {
                if let Some(v) = value.get(min_order + i as i32) {
                    *c += *v;
                }
            }
        }

        total
    }

    fn dim(&self) -> usize {
        self.dim
    }

    fn shape(&self) -> Shape {
        self.shape.clone()
    }
}

/// Binds every sector to the given parameters, freezes its deformation parameters and returns
/// the sum of all sector integrands.
pub fn make_combined_integrand(
    sectors: &[Sector],
    real: &[f64],
    complex: &[Complex64],
    parameters: &[DeformationParameters],
) -> Result<CombinedIntegrand> {
    if parameters.len() != sectors.len() {
        return Err(Error::ParameterMismatch {
            kind: "deformation",
            expected: sectors.len(),
            found: parameters.len(),
        });
    }

    let integrands = sectors
        .iter()
        .zip(parameters)
        .map(|(sector, parameters)| sector.bind(real, complex)?.with_parameters(parameters.clone()))
        .collect::<Result<Vec<_>>>()?;

    CombinedIntegrand::new(integrands)
}
