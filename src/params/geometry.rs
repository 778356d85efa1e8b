use serde_json::{json, Value};

use crate::core::model::ParamLocation;

use super::{InputParam, ParamError};

/// Sweeps the winding angle of one CCT layer.
///
/// The range is given in degrees and stored in radians, the unit of the
/// `alpha` field in the model file. The converted values are what ends up
/// in the output columns.
#[derive(Debug)]
pub struct WindingAngle {
    column_name: String,
    location: ParamLocation,
    range: Vec<Value>,
}

impl WindingAngle {
    /// `node_name` is the `name` field of the custom CCT node.
    pub fn new(node_name: &str, degrees: Vec<Value>) -> Result<Self, ParamError> {
        let range = convert_range(degrees, |deg| deg.to_radians())?;
        Ok(Self {
            column_name: "cct_winding_angle".to_string(),
            location: ParamLocation::new(node_name, vec!["rho".into()], "alpha"),
            range,
        })
    }

    pub fn with_column_suffix(mut self, suffix: &str) -> Self {
        self.column_name.push_str(suffix);
        self
    }
}

impl InputParam for WindingAngle {
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

/// Sweeps the pitch of one CCT layer.
///
/// The range is given in millimetres and stored in metres, the unit of
/// the `scaling` field in the model file.
#[derive(Debug)]
pub struct LayerPitch {
    column_name: String,
    location: ParamLocation,
    range: Vec<Value>,
}

impl LayerPitch {
    /// `node_name` is the `name` field of the custom CCT node.
    pub fn new(node_name: &str, millimetres: Vec<Value>) -> Result<Self, ParamError> {
        let range = convert_range(millimetres, |mm| mm / 1000.0)?;
        Ok(Self {
            column_name: "layer_pitch".to_string(),
            location: ParamLocation::new(node_name, vec!["omega".into()], "scaling"),
            range,
        })
    }

    pub fn with_column_suffix(mut self, suffix: &str) -> Self {
        self.column_name.push_str(suffix);
        self
    }
}

impl InputParam for LayerPitch {
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

fn convert_range<F>(values: Vec<Value>, convert: F) -> Result<Vec<Value>, ParamError>
where
    F: Fn(f64) -> f64,
{
    values
        .into_iter()
        .map(|value| {
            let number = value
                .as_f64()
                .ok_or_else(|| ParamError::NotNumeric(value.clone()))?;
            Ok(json!(convert(number)))
        })
        .collect()
}
