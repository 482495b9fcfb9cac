//! Error types shared by all modules of the crate.

use crate::series::Offset;

/// Errors raised while building or evaluating sector integrands.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Arithmetic between series expanded in different regulators.
    #[error("regulator mismatch: cannot combine a series in `{left}` with a series in `{right}`")]
    RegulatorMismatch {
        /// Regulator of the left operand.
        left: String,
        /// Regulator of the right operand.
        right: String,
    },

    /// Addition of series whose exponents live on different lattices, e.g. integer and
    /// half-integer powers of the regulator.
    #[error("order offset mismatch: cannot add series with offsets {left} and {right}")]
    OffsetMismatch {
        /// Offset of the left operand.
        left: Offset,
        /// Offset of the right operand.
        right: Offset,
    },

    /// A series was constructed from inconsistent data.
    #[error("malformed series: {0}")]
    MalformedSeries(String),

    /// The branch computation of a deformed polynomial is numerically ill-conditioned.
    #[error("contour singularity proximity in sector {sector}: {reason}")]
    ContourSingularityProximity {
        /// Identifier of the sector.
        sector: usize,
        /// What went wrong.
        reason: String,
    },

    /// The deformation-parameter search reached its lower bound without validating all
    /// presamples.
    #[error(
        "deformation bounds exhausted in sector {sector}: parameters reached the minimum {minimum} \
         without passing all presamples"
    )]
    DeformationBoundsExhausted {
        /// Identifier of the sector.
        sector: usize,
        /// The lower bound that was reached.
        minimum: f64,
    },

    /// The static data of a sector violates the descriptor contract.
    #[error("malformed sector {sector}: {reason}")]
    MalformedSector {
        /// Identifier of the sector.
        sector: usize,
        /// What is wrong with the data.
        reason: String,
    },

    /// A polynomial expression could not be parsed.
    #[error("failed to parse `{expression}`: {reason}")]
    Parse {
        /// The offending expression.
        expression: String,
        /// What the parser expected.
        reason: String,
    },

    /// The number of supplied parameters does not match the integral.
    #[error("expected {expected} {kind} parameters, got {found}")]
    ParameterMismatch {
        /// The kind of parameter, e.g. `real` or `complex`.
        kind: &'static str,
        /// Number of parameters the integral depends on.
        expected: usize,
        /// Number of parameters supplied.
        found: usize,
    },

    /// A configuration value is out of range.
    #[error("invalid configuration: {0}")]
    InvalidConfiguration(String),

    /// (De-)serialization failure.
    #[error(transparent)]
    Json(#[from] serde_json::Error),

    /// I/O failure while reading configuration or sector data.
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

/// Result type used throughout this crate.
pub type Result<T> = std::result::Result<T, Error>;
