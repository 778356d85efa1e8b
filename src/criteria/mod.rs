mod harmonic;
mod mesh;

pub use harmonic::{CoefficientKind, HarmonicCoefficient};
pub use mesh::{MaxCurvature, MaxVonMises, MaxZ, MinZ};

use thiserror::Error;

use crate::engine::results::{Capability, ResultHandler};

#[derive(Debug, Error)]
pub enum CriterionError {
    /// The handlers passed to a criterion do not match its declared
    /// capability set. A programming/configuration error, never
    /// recoverable at runtime.
    #[error("expected result handlers {expected:?}, received {received:?}")]
    CapabilityMismatch {
        expected: Vec<Capability>,
        received: Vec<Capability>,
    },

    #[error("harmonic order {0} was not computed")]
    OrderNotComputed(usize),

    #[error("mesh result contains no nodes to evaluate")]
    EmptyMesh,
}

/// Contract for one recorded scalar output.
///
/// A criterion is immutable during a run; any internal state (such as a
/// spatial filter) is fixed at construction time. Evaluation is pure.
pub trait OutputCriterion {
    /// Name of the column recording this criterion in the output file.
    fn column_name(&self) -> &str;

    /// The capabilities this criterion consumes, in the order its
    /// evaluator expects them. An empty set means the criterion computes
    /// its value without dispatched results.
    fn required_capabilities(&self) -> &[Capability];

    /// Reduces the handlers to a single double. `handlers` is positionally
    /// aligned to [`OutputCriterion::required_capabilities`]; every
    /// implementation must verify the match (see [`verify_handlers`])
    /// before touching the data.
    fn evaluate(&self, handlers: &[&ResultHandler]) -> Result<f64, CriterionError>;
}

/// Verifies that `handlers` matches `expected` by length and capability,
/// in order.
pub fn verify_handlers(
    expected: &[Capability],
    handlers: &[&ResultHandler],
) -> Result<(), CriterionError> {
    let received: Vec<Capability> = handlers.iter().map(|h| h.capability()).collect();
    if received != expected {
        return Err(CriterionError::CapabilityMismatch {
            expected: expected.to_vec(),
            received,
        });
    }
    Ok(())
}
