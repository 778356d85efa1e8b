use std::path::Path;
use std::process::{Command, Stdio};

use anyhow::{anyhow, bail, Context, Result};
use nalgebra::Point3;

use crate::engine::calculator::{CalcError, Calculator};
use crate::engine::results::{Capability, HarmonicsData, MeshData, MeshNode, ResultHandler};

const SUPPORTED: &[Capability] = &[Capability::Harmonics, Capability::Mesh];

/// Calculator backed by an external field-solver executable.
///
/// Each dispatch invokes the solver with the calculation kind and the
/// snapshot path and parses the requested table from stdout:
///
/// - `<solver> [extra args] harmonics <snapshot>` prints a
///   `harmonic coefficients` section with one `<order> <a_n> <b_n>` row
///   per order, starting at order 1;
/// - `<solver> [extra args] mesh <snapshot>` prints a `mesh nodes`
///   section with one `<x> <y> <z> <curvature> <von_mises>` row per node.
///
/// Lines starting with `ERROR` anywhere in the output mark the
/// configuration as inconsistent for the requested calculation.
pub struct SolverCli {
    executable: String,
    extra_args: Vec<String>,
}

impl SolverCli {
    pub fn new(executable: &str) -> Self {
        Self {
            executable: executable.to_string(),
            extra_args: Vec::new(),
        }
    }

    /// Additional arguments placed before the calculation kind.
    pub fn with_args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.extra_args = args.into_iter().map(Into::into).collect();
        self
    }

    fn run_process(&self, kind: &str, snapshot: &Path) -> Result<String> {
        let output = Command::new(&self.executable)
            .args(&self.extra_args)
            .arg(kind)
            .arg(snapshot)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .output()
            .context("failed to spawn solver executable")?;

        if !output.status.success() {
            let err_msg = String::from_utf8_lossy(&output.stderr);
            bail!("solver exited with {}: {}", output.status, err_msg.trim());
        }

        Ok(String::from_utf8_lossy(&output.stdout).to_string())
    }

    fn check_errors(&self, output: &str) -> Result<()> {
        for line in output.lines() {
            let trimmed = line.trim_start();
            if trimmed.starts_with("ERROR") {
                bail!("solver reported: {}", trimmed);
            }
        }
        Ok(())
    }

    fn parse_harmonics(&self, output: &str) -> Result<HarmonicsData> {
        let mut skew = Vec::new();
        let mut normal = Vec::new();
        let mut in_table = false;

        for line in output.lines() {
            let trimmed = line.trim();
            if !in_table {
                if trimmed.to_ascii_lowercase().contains("harmonic coefficients") {
                    in_table = true;
                }
                continue;
            }
            if trimmed.is_empty() && !skew.is_empty() {
                break;
            }
            if trimmed.is_empty() || trimmed.starts_with('-') {
                continue;
            }
            let parts: Vec<&str> = trimmed.split_whitespace().collect();
            if parts.len() != 3 {
                break;
            }
            let order: usize = parts[0]
                .parse()
                .with_context(|| format!("bad harmonic order '{}'", parts[0]))?;
            if order != skew.len() + 1 {
                bail!("harmonic orders out of sequence at order {}", order);
            }
            skew.push(parse_float(parts[1])?);
            normal.push(parse_float(parts[2])?);
        }

        if skew.is_empty() {
            bail!("no harmonic coefficient table found in solver output");
        }
        Ok(HarmonicsData::new(skew, normal))
    }

    fn parse_mesh(&self, output: &str) -> Result<MeshData> {
        let mut nodes = Vec::new();
        let mut in_table = false;

        for line in output.lines() {
            let trimmed = line.trim();
            if !in_table {
                if trimmed.to_ascii_lowercase().contains("mesh nodes") {
                    in_table = true;
                }
                continue;
            }
            if trimmed.is_empty() && !nodes.is_empty() {
                break;
            }
            if trimmed.is_empty() || trimmed.starts_with('-') {
                continue;
            }
            let parts: Vec<&str> = trimmed.split_whitespace().collect();
            if parts.len() != 5 {
                break;
            }
            let x = parse_float(parts[0])?;
            let y = parse_float(parts[1])?;
            let z = parse_float(parts[2])?;
            let curvature = parse_float(parts[3])?;
            let von_mises = parse_float(parts[4])?;
            nodes.push(MeshNode {
                position: Point3::new(x, y, z),
                curvature,
                von_mises,
            });
        }

        if !in_table {
            bail!("no mesh node table found in solver output");
        }
        Ok(MeshData { nodes })
    }
}

fn parse_float(token: &str) -> Result<f64> {
    let value: f64 = token
        .parse()
        .with_context(|| format!("failed to parse '{token}' as a float"))?;
    if value.is_nan() {
        return Err(anyhow!("solver output contains NaN"));
    }
    Ok(value)
}

impl Calculator for SolverCli {
    fn supported(&self) -> &[Capability] {
        SUPPORTED
    }

    fn dispatch(
        &mut self,
        capability: Capability,
        snapshot: &Path,
    ) -> Result<ResultHandler, CalcError> {
        let kind = match capability {
            Capability::Harmonics => "harmonics",
            Capability::Mesh => "mesh",
        };

        let output = self
            .run_process(kind, snapshot)
            .map_err(|err| CalcError::Engine(format!("{err:#}")))?;
        self.check_errors(&output)
            .map_err(|err| CalcError::Engine(format!("{err:#}")))?;

        match capability {
            Capability::Harmonics => self
                .parse_harmonics(&output)
                .map(ResultHandler::Harmonics)
                .map_err(|err| CalcError::Parse(format!("{err:#}"))),
            Capability::Mesh => self
                .parse_mesh(&output)
                .map(ResultHandler::Mesh)
                .map_err(|err| CalcError::Parse(format!("{err:#}"))),
        }
    }

    fn name(&self) -> &str {
        &self.executable
    }
}
