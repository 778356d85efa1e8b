mod geometry;
mod leaf;
mod multipole;
pub mod ranges;
mod spline;

pub use geometry::{LayerPitch, WindingAngle};
pub use leaf::LeafValue;
pub use multipole::{MultipoleScaling, ScalingTarget};
pub use spline::SplineControlOffsets;

use serde_json::Value;
use thiserror::Error;

use crate::core::model::{ModelError, ModelStore, ParamLocation};

#[derive(Debug, Error)]
pub enum ParamError {
    #[error(transparent)]
    Model(#[from] ModelError),

    /// A composite descriptor received a value whose structure does not
    /// match its expected encoding.
    #[error("offset vector has {actual} elements, expected {expected}")]
    Shape { expected: usize, actual: usize },

    #[error("expected a numeric value, got '{0}'")]
    NotNumeric(Value),

    #[error("a linear range needs at least two steps, got {0}")]
    TooFewSteps(usize),

    #[error("range start {start} exceeds end {end}")]
    ReversedBounds { start: f64, end: f64 },

    #[error("lower and upper bounds differ in length ({lower} vs {upper})")]
    BoundsMismatch { lower: usize, upper: usize },

    #[error("at least one configuration is required")]
    EmptyRange,
}

/// Contract for one swept input variable.
///
/// A descriptor is constructed once before a run and stays immutable for
/// its duration: the engine reads its range, probes its location during
/// validation, and calls [`InputParam::apply`] once per grid point with a
/// value drawn from its own range.
pub trait InputParam {
    /// Name of the column recording this parameter in the output file.
    /// Uniqueness across the active input set is the caller's
    /// responsibility.
    fn column_name(&self) -> &str;

    /// The ordered value range of this parameter. Order defines the grid
    /// enumeration; values need not be unique.
    fn range(&self) -> &[Value];

    /// Where in the model tree this parameter is written. Also used as the
    /// read-only validation probe before the run starts.
    fn location(&self) -> &ParamLocation;

    /// Writes `value` into the model tree. The default behavior is a
    /// direct leaf-set at `location()`; composite descriptors override
    /// this to derive and write several other leaves instead.
    ///
    /// `value` must have originated from this descriptor's own `range()`.
    fn apply(&self, model: &mut dyn ModelStore, value: &Value) -> Result<(), ParamError> {
        model.set_value(self.location(), value.clone())?;
        Ok(())
    }

    /// Rendering of `value` used when logging the applied configuration.
    fn value_label(&self, value: &Value) -> String {
        value.to_string()
    }
}
