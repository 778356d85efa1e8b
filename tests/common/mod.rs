#![allow(dead_code)]

use std::cell::RefCell;
use std::fs;
use std::path::Path;
use std::rc::Rc;

use nalgebra::Point3;
use serde_json::{json, Value};

use cctsweep::core::model::{JsonModelHandler, ParamLocation};
use cctsweep::criteria::{verify_handlers, CriterionError, OutputCriterion};
use cctsweep::engine::calculator::{CalcError, Calculator};
use cctsweep::engine::results::{Capability, HarmonicsData, MeshData, MeshNode, ResultHandler};
use cctsweep::params::{InputParam, LeafValue};

/// Record of every dispatch a MockCalculator served, shared with the test
/// through an Rc so it stays observable after the calculator moves into a
/// ParameterSearch.
#[derive(Default)]
pub struct CallLog {
    pub requested: Vec<Capability>,
}

pub struct MockCalculator {
    pub log: Rc<RefCell<CallLog>>,
    pub supported: Vec<Capability>,
    /// Fail the nth dispatch call (0-based) with an engine error.
    pub fail_on_call: Option<usize>,
}

impl MockCalculator {
    pub fn new() -> Self {
        Self {
            log: Rc::new(RefCell::new(CallLog::default())),
            supported: vec![Capability::Harmonics, Capability::Mesh],
            fail_on_call: None,
        }
    }
}

impl Calculator for MockCalculator {
    fn supported(&self) -> &[Capability] {
        &self.supported
    }

    fn dispatch(
        &mut self,
        capability: Capability,
        snapshot: &Path,
    ) -> Result<ResultHandler, CalcError> {
        let call = {
            let mut log = self.log.borrow_mut();
            log.requested.push(capability);
            log.requested.len() - 1
        };
        if Some(call) == self.fail_on_call {
            return Err(CalcError::Engine("injected failure".to_string()));
        }

        // The persisted snapshot must be readable and valid at dispatch time.
        let raw = fs::read_to_string(snapshot)?;
        serde_json::from_str::<Value>(&raw).map_err(|err| CalcError::Parse(err.to_string()))?;

        Ok(match capability {
            Capability::Harmonics => ResultHandler::Harmonics(HarmonicsData::new(
                (1..=10).map(|n| n as f64 / 10.0).collect(),
                (1..=10).map(|n| n as f64).collect(),
            )),
            Capability::Mesh => ResultHandler::Mesh(sample_mesh()),
        })
    }

    fn name(&self) -> &str {
        "mock calculator"
    }
}

pub fn sample_mesh() -> MeshData {
    MeshData {
        nodes: vec![
            MeshNode {
                position: Point3::new(0.0, 0.0, -0.25),
                curvature: 3.0,
                von_mises: 120.0,
            },
            MeshNode {
                position: Point3::new(0.05, 0.0, 0.1),
                curvature: 7.5,
                von_mises: 340.0,
            },
            MeshNode {
                position: Point3::new(0.0, 0.05, 0.4),
                curvature: 5.0,
                von_mises: 210.0,
            },
        ],
    }
}

/// Criterion with an empty capability set returning a fixed value.
pub struct ConstCriterion {
    pub name: String,
    pub value: f64,
}

impl OutputCriterion for ConstCriterion {
    fn column_name(&self) -> &str {
        &self.name
    }

    fn required_capabilities(&self) -> &[Capability] {
        &[]
    }

    fn evaluate(&self, handlers: &[&ResultHandler]) -> Result<f64, CriterionError> {
        verify_handlers(&[], handlers)?;
        Ok(self.value)
    }
}

fn zero_uvw(points: usize) -> Value {
    Value::Array(
        (0..points)
            .map(|_| json!({ "u": 0.0, "v": 0.0, "w": 0.0 }))
            .collect(),
    )
}

/// A small quadrupole model tree with the node shapes the descriptors
/// expect.
pub fn sample_model() -> Value {
    json!({
        "name": "quad test",
        "models": [
            {
                "name": "custom cct inner",
                "omega": { "scaling": 0.002 },
                "rho": { "alpha": 0.52 }
            },
            {
                "name": "custom cct outer",
                "omega": { "scaling": 0.00205 },
                "rho": { "alpha": 0.61 }
            },
            {
                "name": "B3",
                "harmonic_drive": { "type": "linear", "scaling": 0.0, "offset": 0.0, "slope": 0.0 }
            },
            {
                "name": "Connect South V2",
                "order": 7,
                "uvw1": zero_uvw(8),
                "uvw2": zero_uvw(8)
            }
        ]
    })
}

/// Model handler whose snapshot lives under `dir`.
pub fn model_in(dir: &Path) -> JsonModelHandler {
    JsonModelHandler::from_tree(sample_model(), dir.join("quad_test_run.json"))
        .expect("failed to create model handler")
}

/// Boxed direct leaf descriptor.
pub fn leaf_param(
    column: &str,
    node: &str,
    children: &[&str],
    target: &str,
    range: Vec<Value>,
) -> Box<dyn InputParam> {
    let children = children.iter().map(|&child| child.into()).collect();
    Box::new(LeafValue::new(
        column,
        ParamLocation::new(node, children, target),
        range,
    ))
}
