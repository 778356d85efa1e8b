use thiserror::Error;

use crate::core::model::ModelError;
use crate::criteria::CriterionError;
use crate::engine::calculator::CalcError;
use crate::engine::results::Capability;
use crate::params::ParamError;

/// Errors raised by a sweep run. All of these are fatal: a run either
/// completes the whole grid or stops at the first failure, keeping the
/// rows written so far on disk.
#[derive(Debug, Error)]
pub enum SearchError {
    /// An input descriptor's location could not be resolved in the model
    /// tree. Raised during validation, before any output file exists.
    #[error("invalid input parameter '{column}'")]
    Validation {
        column: String,
        #[source]
        source: ModelError,
    },

    /// Two input descriptors resolve to the same model leaf. Applying both
    /// would silently overwrite one of them, so this is rejected up front.
    #[error("input parameters '{first}' and '{second}' target the same model leaf")]
    LocationCollision { first: String, second: String },

    /// A sweep needs at least one input parameter to define its grid.
    #[error("no input parameter ranges provided")]
    EmptyParameterSet,

    /// The product of the range lengths does not fit the flat step index.
    #[error("total number of grid steps overflows")]
    GridOverflow,

    /// The criteria require a calculation the engine cannot dispatch.
    /// This is a configuration error, detected before the run starts.
    #[error("required capability {capability} is not supported by calculator '{calculator}'")]
    UnsupportedCapability {
        capability: Capability,
        calculator: String,
    },

    /// A flat step index outside `[0, total_steps)` was requested.
    #[error("step {step} is out of range for a grid of {total} steps")]
    StepOutOfRange { step: usize, total: usize },

    /// Applying an input value to the model tree failed.
    #[error("step {step}: failed to apply parameter '{column}'")]
    Apply {
        step: usize,
        column: String,
        #[source]
        source: ParamError,
    },

    /// Persisting the model snapshot for the calculation engine failed.
    #[error("step {step}: failed to persist model snapshot")]
    Persist {
        step: usize,
        #[source]
        source: ModelError,
    },

    /// The calculation engine failed to produce a requested result.
    #[error("step {step}: dispatch of {capability} failed")]
    Dispatch {
        step: usize,
        capability: Capability,
        #[source]
        source: CalcError,
    },

    /// The dispatched result set is missing a capability a criterion
    /// declared. Indicates an engine/criterion mismatch, not a user error.
    #[error("step {step}: no {capability} result available for criterion '{column}'")]
    MissingResult {
        step: usize,
        column: String,
        capability: Capability,
    },

    /// A criterion rejected or failed on the handlers it received.
    #[error("step {step}: criterion '{column}' failed")]
    Criterion {
        step: usize,
        column: String,
        #[source]
        source: CriterionError,
    },

    #[error("output sink error")]
    Sink(#[from] csv::Error),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}
