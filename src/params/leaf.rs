use serde_json::Value;

use crate::core::model::ParamLocation;

use super::InputParam;

/// Direct descriptor for an arbitrary leaf of the model tree. Values from
/// the range are written verbatim.
#[derive(Debug)]
pub struct LeafValue {
    column_name: String,
    location: ParamLocation,
    range: Vec<Value>,
}

impl LeafValue {
    pub fn new(column_name: &str, location: ParamLocation, range: Vec<Value>) -> Self {
        Self {
            column_name: column_name.to_string(),
            location,
            range,
        }
    }
}

impl InputParam for LeafValue {
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
