use serde_json::Value;

use crate::core::model::ParamLocation;

use super::InputParam;

/// Which value of a custom harmonic's scaling function is swept.
///
/// Harmonics with a constant amplitude expose the single `scaling` value;
/// harmonics with a linear amplitude expose the `offset` and `slope` of
/// the scaling function.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScalingTarget {
    Const,
    LinearOffset,
    LinearSlope,
}

impl ScalingTarget {
    fn leaf(self) -> &'static str {
        match self {
            ScalingTarget::Const => "scaling",
            ScalingTarget::LinearOffset => "offset",
            ScalingTarget::LinearSlope => "slope",
        }
    }
}

/// Sweeps one scaling-function value of a custom harmonic drive.
///
/// Values are given in [m] or [m/coil], depending on the target.
#[derive(Debug)]
pub struct MultipoleScaling {
    column_name: String,
    location: ParamLocation,
    range: Vec<Value>,
}

impl MultipoleScaling {
    /// `multipole` is the coefficient label (`"a1"`, `"b10"`, ...) and
    /// doubles as the column name; `node_name` is the `name` field of the
    /// harmonic-drive node in the model tree.
    pub fn new(
        multipole: &str,
        node_name: &str,
        target: ScalingTarget,
        range: Vec<Value>,
    ) -> Self {
        Self {
            column_name: multipole.to_string(),
            location: ParamLocation::new(
                node_name,
                vec!["harmonic_drive".into()],
                target.leaf(),
            ),
            range,
        }
    }

    /// Appends a suffix to the column name, to disambiguate several
    /// descriptors sweeping the same multipole.
    pub fn with_column_suffix(mut self, suffix: &str) -> Self {
        self.column_name.push_str(suffix);
        self
    }
}

impl InputParam for MultipoleScaling {
    fn column_name(&self) -> &str {
        &self.column_name
    }

    fn range(&self) -> &[Value] {
        &self.range
    }

    fn location(&self) -> &ParamLocation {
        &self.location
    }
}
