use crate::engine::results::{Capability, ResultHandler};

use super::{verify_handlers, CriterionError, OutputCriterion};

/// Whether a normal (b_n) or skew (a_n) coefficient is recorded.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CoefficientKind {
    Normal,
    Skew,
}

/// Records one harmonic coefficient of the calculated field.
///
/// Column name is `b<order>` or `a<order>`.
pub struct HarmonicCoefficient {
    column_name: String,
    kind: CoefficientKind,
    order: usize,
}

impl HarmonicCoefficient {
    /// `order` is 1-based (dipole = 1, quadrupole = 2, ...).
    pub fn new(kind: CoefficientKind, order: usize) -> Self {
        let prefix = match kind {
            CoefficientKind::Normal => 'b',
            CoefficientKind::Skew => 'a',
        };
        Self {
            column_name: format!("{prefix}{order}"),
            kind,
            order,
        }
    }
}

impl OutputCriterion for HarmonicCoefficient {
    fn column_name(&self) -> &str {
        &self.column_name
    }

    fn required_capabilities(&self) -> &[Capability] {
        &[Capability::Harmonics]
    }

    fn evaluate(&self, handlers: &[&ResultHandler]) -> Result<f64, CriterionError> {
        verify_handlers(self.required_capabilities(), handlers)?;
        let ResultHandler::Harmonics(data) = handlers[0] else {
            return Err(CriterionError::CapabilityMismatch {
                expected: self.required_capabilities().to_vec(),
                received: handlers.iter().map(|h| h.capability()).collect(),
            });
        };

        let value = match self.kind {
            CoefficientKind::Normal => data.normal_coefficient(self.order),
            CoefficientKind::Skew => data.skew_coefficient(self.order),
        };
        value.ok_or(CriterionError::OrderNotComputed(self.order))
    }
}
