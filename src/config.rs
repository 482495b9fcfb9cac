//! Settings of the contour-deformation search.

use crate::error::{Error, Result};

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

/// Settings of the deformation-parameter search, see [`crate::optimizer::optimize`].
#[derive(Clone, Debug, PartialEq, Deserialize, Serialize)]
#[serde(default, deny_unknown_fields)]
pub struct DeformationConfig {
    /// Number of uniformly distributed points the contour is tested on.
    pub number_of_presamples: usize,
    /// Initial value of every deformation parameter.
    pub maximum: f64,
    /// Lower bound of every deformation parameter.
    pub minimum: f64,
    /// Factor an offending parameter is multiplied with, between zero and one.
    pub decrease_factor: f64,
    /// Seed of the generator producing the presamples.
    pub seed: u64,
    /// Number of threads testing presamples.
    pub cores: usize,
}

impl Default for DeformationConfig {
    fn default() -> Self {
        Self {
            number_of_presamples: 100_000,
            maximum: 1.0,
            minimum: 1e-5,
            decrease_factor: 0.9,
            seed: 0xcafe_f00d_d15e_a5e5,
            cores: 1,
        }
    }
}

impl DeformationConfig {
    /// Checks that all values are in range.
    pub fn validate(&self) -> Result<()> {
        if !(self.minimum > 0.0 && self.minimum.is_finite()) {
            return Err(Error::InvalidConfiguration(format!(
                "the minimal deformation parameter must be positive and finite, got {}",
                self.minimum
            )));
        }

        if !(self.maximum >= self.minimum && self.maximum.is_finite()) {
            return Err(Error::InvalidConfiguration(format!(
                "the maximal deformation parameter {} is below the minimum {}",
                self.maximum, self.minimum
            )));
        }

        if !(self.decrease_factor > 0.0 && self.decrease_factor < 1.0) {
            return Err(Error::InvalidConfiguration(format!(
                "the decrease factor must lie in (0, 1), got {}",
                self.decrease_factor
            )));
        }

        if self.cores == 0 {
            return Err(Error::InvalidConfiguration(
                "the number of cores must be positive".to_string(),
            ));
        }

        Ok(())
    }
}

/// Settings of an [`crate::integral::Integral`].
#[derive(Clone, Debug, PartialEq, Deserialize, Serialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    /// If `false`, all sectors are integrated on the real axis.
    pub contour_deformation: bool,
    /// Settings of the deformation-parameter search.
    pub deformation: DeformationConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            contour_deformation: true,
            deformation: DeformationConfig::default(),
        }
    }
}

impl Config {
    /// Reads a configuration from a JSON string. Missing fields take their default values.
    pub fn from_json(json: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Reads a configuration from the JSON file at `path`.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        Self::from_json(&fs::read_to_string(path)?)
    }

    /// Checks that all values are in range.
    pub fn validate(&self) -> Result<()> {
        if self.contour_deformation && self.deformation.number_of_presamples == 0 {
            return Err(Error::InvalidConfiguration(
                "contour deformation needs at least one presample".to_string(),
            ));
        }

        self.deformation.validate()
    }
}
