use serde_json::{json, Value};

use crate::core::model::{ModelStore, ParamLocation};

use super::{InputParam, ParamError};

/// Composite descriptor for the control points of a connection-spline
/// pair.
///
/// Each range value is a flat vector of control-point offsets. Applying a
/// value reconstructs the absolute `u`/`v`/`w` coordinates by cumulative
/// summation and writes the full `uvw1` and `uvw2` arrays of the spline
/// node, so the model never sees the flat encoding.
///
/// The flat layout matches the spline's optimization vector: `u` offsets
/// for control points `1..n`, then `v` offsets for points `4..n`, then
/// (if `enable_w`) `w` offsets for points `7..n`; a second block of the
/// same shape follows for the second spline unless `symmetric` is set, in
/// which case the first configuration is mirrored.
#[derive(Debug)]
pub struct SplineControlOffsets {
    column_name: String,
    location: ParamLocation,
    range: Vec<Value>,
    node_name: String,
    control_points: usize,
    symmetric: bool,
    enable_w: bool,
}

impl SplineControlOffsets {
    /// `node_name` is the `name` field of the spline node, which must be
    /// fully configured beforehand: `control_points`, `symmetric` and
    /// `enable_w` determine the expected shape of every range value.
    pub fn new(
        node_name: &str,
        configs: Vec<Value>,
        control_points: usize,
        symmetric: bool,
        enable_w: bool,
    ) -> Self {
        Self {
            column_name: "spline_uvw".to_string(),
            // validation probes uvw1; uvw2 lives next to it
            location: ParamLocation::new(node_name, Vec::new(), "uvw1"),
            range: configs,
            node_name: node_name.to_string(),
            control_points,
            symmetric,
            enable_w,
        }
    }

    pub fn with_column_suffix(mut self, suffix: &str) -> Self {
        self.column_name.push_str(suffix);
        self
    }

    /// Number of offsets one range value must carry.
    fn expected_len(&self) -> usize {
        let n = self.control_points;
        let per_spline = n.saturating_sub(1)
            + n.saturating_sub(4)
            + if self.enable_w { n.saturating_sub(7) } else { 0 };
        if self.symmetric {
            per_spline
        } else {
            2 * per_spline
        }
    }

    /// Reconstructs the absolute control points of both splines from the
    /// flat offset vector.
    fn decode(&self, offsets: &[f64]) -> Result<(Value, Value), ParamError> {
        if offsets.len() != self.expected_len() {
            return Err(ParamError::Shape {
                expected: self.expected_len(),
                actual: offsets.len(),
            });
        }

        let n = self.control_points;
        let mut cnt = 0;
        let mut fill = |points: &mut Vec<[f64; 3]>| {
            for i in 1..n {
                points[i][0] = points[i - 1][0] + offsets[cnt];
                cnt += 1;
            }
            for i in 4..n {
                points[i][1] = points[i - 1][1] + offsets[cnt];
                cnt += 1;
            }
            if self.enable_w {
                for i in 7..n {
                    points[i][2] = points[i - 1][2] + offsets[cnt];
                    cnt += 1;
                }
            }
        };

        let mut first = vec![[0.0f64; 3]; n];
        fill(&mut first);

        let second = if self.symmetric {
            first.clone()
        } else {
            let mut second = vec![[0.0f64; 3]; n];
            fill(&mut second);
            second
        };
        debug_assert_eq!(cnt, offsets.len());

        Ok((to_uvw_array(&first), to_uvw_array(&second)))
    }
}

fn to_uvw_array(points: &[[f64; 3]]) -> Value {
    Value::Array(
        points
            .iter()
            .map(|p| json!({ "u": p[0], "v": p[1], "w": p[2] }))
            .collect(),
    )
}

impl InputParam for SplineControlOffsets {
    fn column_name(&self) -> &str {
        &self.column_name
    }

    fn range(&self) -> &[Value] {
        &self.range
    }

    fn location(&self) -> &ParamLocation {
        &self.location
    }

    fn apply(&self, model: &mut dyn ModelStore, value: &Value) -> Result<(), ParamError> {
        let offsets: Vec<f64> = value
            .as_array()
            .ok_or_else(|| ParamError::NotNumeric(value.clone()))?
            .iter()
            .map(|item| {
                item.as_f64()
                    .ok_or_else(|| ParamError::NotNumeric(item.clone()))
            })
            .collect::<Result<_, _>>()?;

        let (uvw1, uvw2) = self.decode(&offsets)?;

        model.set_value(
            &ParamLocation::new(self.node_name.as_str(), Vec::new(), "uvw1"),
            uvw1,
        )?;
        model.set_value(
            &ParamLocation::new(self.node_name.as_str(), Vec::new(), "uvw2"),
            uvw2,
        )?;
        Ok(())
    }
}
