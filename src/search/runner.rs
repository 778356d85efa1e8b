use std::path::PathBuf;

use log::{error, info, warn};
use serde_json::Value;

use crate::core::model::ModelStore;
use crate::criteria::OutputCriterion;
use crate::engine::calculator::Calculator;
use crate::engine::results::{Capability, ResultHandler};
use crate::error::SearchError;
use crate::params::InputParam;
use crate::search::grid::{self, Grid};
use crate::search::sink::CsvSink;

/// Lifecycle of one sweep run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SearchState {
    Constructed,
    Validating,
    Ready,
    Running,
    Completed,
    Failed,
}

/// Grid-search engine over the input parameters of a model.
///
/// Owns the descriptor lists, a private model store and the calculation
/// engine for the duration of one run. `run()` validates every input
/// location, enumerates the full grid, applies each combination, runs the
/// deduplicated set of required calculations, evaluates all criteria and
/// records one CSV row per grid point.
///
/// A run is strictly sequential: each grid point is a blocking sequence
/// of configuration-write, engine dispatch and criterion evaluation. The
/// first error at any step aborts the remaining grid; rows written before
/// the failure remain on disk and the sink is closed on every exit path.
pub struct ParameterSearch<M: ModelStore, C: Calculator> {
    inputs: Vec<Box<dyn InputParam>>,
    criteria: Vec<Box<dyn OutputCriterion>>,
    model: M,
    calculator: C,
    output_dir: PathBuf,
    state: SearchState,
}

impl<M: ModelStore, C: Calculator> ParameterSearch<M, C> {
    pub fn new(
        inputs: Vec<Box<dyn InputParam>>,
        criteria: Vec<Box<dyn OutputCriterion>>,
        model: M,
        calculator: C,
        output_dir: impl Into<PathBuf>,
    ) -> Self {
        Self {
            inputs,
            criteria,
            model,
            calculator,
            output_dir: output_dir.into(),
            state: SearchState::Constructed,
        }
    }

    pub fn state(&self) -> SearchState {
        self.state
    }

    /// Validates the input descriptors against the model store: every
    /// location must resolve with a read-only probe, and no two
    /// descriptors may target the same leaf. Runs before any computation
    /// is spent and before any output file is created.
    pub fn validate(&mut self) -> Result<(), SearchError> {
        self.state = SearchState::Validating;
        match self.check_inputs() {
            Ok(()) => {
                info!("all input parameters are valid");
                self.state = SearchState::Ready;
                Ok(())
            }
            Err(err) => {
                error!("input validation failed: {err}");
                self.state = SearchState::Failed;
                Err(err)
            }
        }
    }

    fn check_inputs(&self) -> Result<(), SearchError> {
        if self.inputs.is_empty() {
            return Err(SearchError::EmptyParameterSet);
        }

        for input in &self.inputs {
            self.model
                .get_value(input.location())
                .map_err(|source| SearchError::Validation {
                    column: input.column_name().to_string(),
                    source,
                })?;
        }

        for (i, first) in self.inputs.iter().enumerate() {
            for second in &self.inputs[i + 1..] {
                if first.location() == second.location() {
                    return Err(SearchError::LocationCollision {
                        first: first.column_name().to_string(),
                        second: second.column_name().to_string(),
                    });
                }
            }
        }

        Ok(())
    }

    /// Runs the sweep to completion or to its first error, returning the
    /// path of the output file on success.
    pub fn run(&mut self) -> Result<PathBuf, SearchError> {
        match self.run_inner() {
            Ok(path) => {
                self.state = SearchState::Completed;
                info!("=== finished parameter sweep ===");
                info!("all results saved to {}", path.display());
                Ok(path)
            }
            Err(err) => {
                self.state = SearchState::Failed;
                error!("sweep aborted: {err}");
                Err(err)
            }
        }
    }

    fn run_inner(&mut self) -> Result<PathBuf, SearchError> {
        if self.state != SearchState::Ready {
            self.validate()?;
        }

        info!("=== starting parameter sweep ===");

        // Refuse the run before the output file exists if the criteria
        // need something the engine cannot dispatch.
        let capabilities = grid::required_capabilities(&self.criteria);
        for &capability in &capabilities {
            if !self.calculator.supported().contains(&capability) {
                return Err(SearchError::UnsupportedCapability {
                    capability,
                    calculator: self.calculator.name().to_string(),
                });
            }
        }

        let grid = Grid::new(self.inputs.iter().map(|input| input.range().len()).collect())?;

        let input_columns: Vec<&str> = self.inputs.iter().map(|p| p.column_name()).collect();
        let criterion_columns: Vec<&str> = self.criteria.iter().map(|c| c.column_name()).collect();
        let mut sink = CsvSink::create(&self.output_dir, &input_columns, &criterion_columns)?;

        self.state = SearchState::Running;
        info!("number of steps: {}", grid.total_steps());

        match self.run_steps(&grid, &capabilities, &mut sink) {
            Ok(()) => sink.finish(),
            Err(err) => {
                // close the sink first so partial output stays readable
                if let Err(close_err) = sink.finish() {
                    warn!("failed to close output sink: {close_err}");
                }
                Err(err)
            }
        }
    }

    fn run_steps(
        &mut self,
        grid: &Grid,
        capabilities: &[Capability],
        sink: &mut CsvSink,
    ) -> Result<(), SearchError> {
        let total = grid.total_steps();
        for step in 0..total {
            info!("== starting step {} / {} ==", step, total - 1);

            let indices = grid.indices(step)?;
            let values: Vec<Value> = self
                .inputs
                .iter()
                .zip(&indices)
                .map(|(input, &index)| input.range()[index].clone())
                .collect();

            for (input, value) in self.inputs.iter().zip(&values) {
                input
                    .apply(&mut self.model, value)
                    .map_err(|source| SearchError::Apply {
                        step,
                        column: input.column_name().to_string(),
                        source,
                    })?;
            }

            let summary = self
                .inputs
                .iter()
                .zip(&values)
                .map(|(input, value)| {
                    format!("{}: {}", input.column_name(), input.value_label(value))
                })
                .collect::<Vec<_>>()
                .join(", ");
            info!("applied parameter configuration: {summary}");

            self.model
                .save()
                .map_err(|source| SearchError::Persist { step, source })?;

            // Result handlers live for exactly one grid point.
            let snapshot = self.model.snapshot_path();
            let mut handlers = Vec::with_capacity(capabilities.len());
            for &capability in capabilities {
                let handler = self
                    .calculator
                    .dispatch(capability, snapshot)
                    .map_err(|source| SearchError::Dispatch {
                        step,
                        capability,
                        source,
                    })?;
                handlers.push(handler);
            }

            let mut outputs = Vec::with_capacity(self.criteria.len());
            for criterion in &self.criteria {
                let selected = select_handlers(criterion.as_ref(), &handlers, step)?;
                let value =
                    criterion
                        .evaluate(&selected)
                        .map_err(|source| SearchError::Criterion {
                            step,
                            column: criterion.column_name().to_string(),
                            source,
                        })?;
                info!("computed criterion {} = {}", criterion.column_name(), value);
                outputs.push(value);
            }

            sink.append(step, &values, &outputs)?;
        }

        Ok(())
    }
}

/// Picks the handlers a criterion declared, matched by capability
/// identity rather than position, so the dispatch-set ordering stays
/// independent of criterion declaration order.
fn select_handlers<'a>(
    criterion: &dyn OutputCriterion,
    handlers: &'a [ResultHandler],
    step: usize,
) -> Result<Vec<&'a ResultHandler>, SearchError> {
    criterion
        .required_capabilities()
        .iter()
        .map(|&capability| {
            handlers
                .iter()
                .find(|handler| handler.capability() == capability)
                .ok_or_else(|| SearchError::MissingResult {
                    step,
                    column: criterion.column_name().to_string(),
                    capability,
                })
        })
        .collect()
}
