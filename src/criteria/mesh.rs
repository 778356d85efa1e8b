use crate::engine::results::{Capability, Cube3D, MeshData, ResultHandler};

use super::{verify_handlers, CriterionError, OutputCriterion};

fn mesh_data<'a>(
    expected: &[Capability],
    handlers: &[&'a ResultHandler],
) -> Result<&'a MeshData, CriterionError> {
    verify_handlers(expected, handlers)?;
    match handlers[0] {
        ResultHandler::Mesh(data) => Ok(data),
        other => Err(CriterionError::CapabilityMismatch {
            expected: expected.to_vec(),
            received: vec![other.capability()],
        }),
    }
}

/// Records the maximum z coordinate of the calculated mesh.
pub struct MaxZ;

impl OutputCriterion for MaxZ {
    fn column_name(&self) -> &str {
        "z_max"
    }

    fn required_capabilities(&self) -> &[Capability] {
        &[Capability::Mesh]
    }

    fn evaluate(&self, handlers: &[&ResultHandler]) -> Result<f64, CriterionError> {
        let data = mesh_data(self.required_capabilities(), handlers)?;
        data.z_extent()
            .map(|(_, max)| max)
            .ok_or(CriterionError::EmptyMesh)
    }
}

/// Records the minimum z coordinate of the calculated mesh.
pub struct MinZ;

impl OutputCriterion for MinZ {
    fn column_name(&self) -> &str {
        "z_min"
    }

    fn required_capabilities(&self) -> &[Capability] {
        &[Capability::Mesh]
    }

    fn evaluate(&self, handlers: &[&ResultHandler]) -> Result<f64, CriterionError> {
        let data = mesh_data(self.required_capabilities(), handlers)?;
        data.z_extent()
            .map(|(min, _)| min)
            .ok_or(CriterionError::EmptyMesh)
    }
}

/// Records the maximum von Mises stress (MPa) in the model.
pub struct MaxVonMises;

impl OutputCriterion for MaxVonMises {
    fn column_name(&self) -> &str {
        "max_von_mises"
    }

    fn required_capabilities(&self) -> &[Capability] {
        &[Capability::Mesh]
    }

    fn evaluate(&self, handlers: &[&ResultHandler]) -> Result<f64, CriterionError> {
        let data = mesh_data(self.required_capabilities(), handlers)?;
        data.max_von_mises().ok_or(CriterionError::EmptyMesh)
    }
}

/// Records the maximum curvature of the field magnitude, optionally
/// restricted to nodes inside a coordinate cube fixed at construction.
pub struct MaxCurvature {
    column_name: String,
    filter: Option<Cube3D>,
}

impl MaxCurvature {
    pub fn new() -> Self {
        Self {
            column_name: "max_curvature_magnitude".to_string(),
            filter: None,
        }
    }

    /// Only curvature values for nodes inside `cube` are considered.
    pub fn with_filter(cube: Cube3D) -> Self {
        Self {
            column_name: "max_curvature_magnitude".to_string(),
            filter: Some(cube),
        }
    }

    pub fn with_column_suffix(mut self, suffix: &str) -> Self {
        self.column_name.push_str(suffix);
        self
    }
}

impl Default for MaxCurvature {
    fn default() -> Self {
        Self::new()
    }
}

impl OutputCriterion for MaxCurvature {
    fn column_name(&self) -> &str {
        &self.column_name
    }

    fn required_capabilities(&self) -> &[Capability] {
        &[Capability::Mesh]
    }

    fn evaluate(&self, handlers: &[&ResultHandler]) -> Result<f64, CriterionError> {
        let data = mesh_data(self.required_capabilities(), handlers)?;
        data.max_curvature(self.filter.as_ref())
            .ok_or(CriterionError::EmptyMesh)
    }
}
