use std::fmt;

use nalgebra::Point3;
use serde::{Deserialize, Serialize};

/// Identifier for a category of derived result the calculation engine can
/// produce. Shared between output criteria (which declare what they need)
/// and the dispatch table (which produces it).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Capability {
    /// Harmonic coefficients of the magnetic field.
    Harmonics,
    /// Mesh geometry with per-node field and stress data.
    Mesh,
}

impl fmt::Display for Capability {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Capability::Harmonics => write!(f, "harmonics"),
            Capability::Mesh => write!(f, "mesh"),
        }
    }
}

/// Harmonic coefficient tables. Index 0 holds order 1.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct HarmonicsData {
    /// Skew coefficients (a_n).
    pub skew: Vec<f64>,
    /// Normal coefficients (b_n).
    pub normal: Vec<f64>,
}

impl HarmonicsData {
    pub fn new(skew: Vec<f64>, normal: Vec<f64>) -> Self {
        Self { skew, normal }
    }

    /// Skew coefficient a_n for a 1-based order.
    pub fn skew_coefficient(&self, order: usize) -> Option<f64> {
        order.checked_sub(1).and_then(|i| self.skew.get(i)).copied()
    }

    /// Normal coefficient b_n for a 1-based order.
    pub fn normal_coefficient(&self, order: usize) -> Option<f64> {
        order.checked_sub(1).and_then(|i| self.normal.get(i)).copied()
    }
}

/// One node of the calculated mesh.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct MeshNode {
    pub position: Point3<f64>,
    /// Curvature of the field magnitude at this node.
    pub curvature: f64,
    /// Von Mises stress (MPa) at this node.
    pub von_mises: f64,
}

/// Mesh geometry with per-node derived quantities.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MeshData {
    pub nodes: Vec<MeshNode>,
}

impl MeshData {
    /// Minimum and maximum z coordinate over all nodes.
    pub fn z_extent(&self) -> Option<(f64, f64)> {
        let mut extent: Option<(f64, f64)> = None;
        for node in &self.nodes {
            let z = node.position.z;
            extent = Some(match extent {
                Some((min, max)) => (min.min(z), max.max(z)),
                None => (z, z),
            });
        }
        extent
    }

    /// Maximum curvature, optionally restricted to nodes inside `filter`.
    pub fn max_curvature(&self, filter: Option<&Cube3D>) -> Option<f64> {
        self.nodes
            .iter()
            .filter(|node| filter.map_or(true, |cube| cube.contains(&node.position)))
            .map(|node| node.curvature)
            .fold(None, |best, value| {
                Some(best.map_or(value, |b: f64| b.max(value)))
            })
    }

    /// Maximum von Mises stress over all nodes.
    pub fn max_von_mises(&self) -> Option<f64> {
        self.nodes
            .iter()
            .map(|node| node.von_mises)
            .fold(None, |best, value| {
                Some(best.map_or(value, |b: f64| b.max(value)))
            })
    }
}

/// Axis-aligned coordinate cube used to restrict mesh evaluations to a
/// spatial region.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct Cube3D {
    min: Point3<f64>,
    max: Point3<f64>,
}

impl Cube3D {
    /// Builds a cube from two opposite corners, in any order.
    pub fn new(a: Point3<f64>, b: Point3<f64>) -> Self {
        Self {
            min: Point3::new(a.x.min(b.x), a.y.min(b.y), a.z.min(b.z)),
            max: Point3::new(a.x.max(b.x), a.y.max(b.y), a.z.max(b.z)),
        }
    }

    /// Builds a cube from per-axis bounds.
    pub fn from_bounds(x: (f64, f64), y: (f64, f64), z: (f64, f64)) -> Self {
        Self::new(Point3::new(x.0, y.0, z.0), Point3::new(x.1, y.1, z.1))
    }

    /// Inclusive containment check.
    pub fn contains(&self, p: &Point3<f64>) -> bool {
        p.x >= self.min.x
            && p.x <= self.max.x
            && p.y >= self.min.y
            && p.y <= self.max.y
            && p.z >= self.min.z
            && p.z <= self.max.z
    }
}

/// The typed output of one capability's computation at one grid point.
/// Handlers live for exactly one grid point and are never cached across
/// steps.
#[derive(Debug, Clone)]
pub enum ResultHandler {
    Harmonics(HarmonicsData),
    Mesh(MeshData),
}

impl ResultHandler {
    /// The capability this handler was produced for.
    pub fn capability(&self) -> Capability {
        match self {
            ResultHandler::Harmonics(_) => Capability::Harmonics,
            ResultHandler::Mesh(_) => Capability::Mesh,
        }
    }
}
