use cctsweep::criteria::{verify_handlers, CriterionError, OutputCriterion};
use cctsweep::engine::results::{Capability, ResultHandler};
use cctsweep::error::SearchError;
use cctsweep::search::grid::{required_capabilities, Grid};

use crate::common::ConstCriterion;

mod common;

#[test]
fn total_steps_is_product_of_range_lengths() {
    let grid = Grid::new(vec![2, 3, 4]).unwrap();
    assert_eq!(grid.total_steps(), 24);
}

#[test]
fn zero_dimensions_is_an_error() {
    assert!(matches!(
        Grid::new(Vec::new()),
        Err(SearchError::EmptyParameterSet)
    ));
}

#[test]
fn empty_range_makes_grid_empty() {
    let grid = Grid::new(vec![3, 0]).unwrap();
    assert_eq!(grid.total_steps(), 0);
    assert!(matches!(
        grid.indices(0),
        Err(SearchError::StepOutOfRange { step: 0, total: 0 })
    ));
}

#[test]
fn oversized_grid_is_rejected() {
    assert!(matches!(
        Grid::new(vec![usize::MAX, 2]),
        Err(SearchError::GridOverflow)
    ));
}

#[test]
fn last_dimension_varies_fastest() {
    let grid = Grid::new(vec![1, 4]).unwrap();
    assert_eq!(grid.total_steps(), 4);
    for step in 0..4 {
        assert_eq!(grid.indices(step).unwrap(), vec![0, step]);
    }
}

#[test]
fn mixed_radix_decode() {
    let grid = Grid::new(vec![2, 3]).unwrap();
    assert_eq!(grid.indices(0).unwrap(), vec![0, 0]);
    assert_eq!(grid.indices(1).unwrap(), vec![0, 1]);
    assert_eq!(grid.indices(2).unwrap(), vec![0, 2]);
    assert_eq!(grid.indices(3).unwrap(), vec![1, 0]);
    assert_eq!(grid.indices(5).unwrap(), vec![1, 2]);
}

#[test]
fn step_out_of_range_is_rejected() {
    let grid = Grid::new(vec![2, 2]).unwrap();
    assert!(matches!(
        grid.indices(4),
        Err(SearchError::StepOutOfRange { step: 4, total: 4 })
    ));
}

/// Criterion requiring both capabilities, for dedup tests.
struct BothCriterion;

impl OutputCriterion for BothCriterion {
    fn column_name(&self) -> &str {
        "both"
    }

    fn required_capabilities(&self) -> &[Capability] {
        &[Capability::Harmonics, Capability::Mesh]
    }

    fn evaluate(&self, handlers: &[&ResultHandler]) -> Result<f64, CriterionError> {
        verify_handlers(self.required_capabilities(), handlers)?;
        Ok(0.0)
    }
}

/// Criterion requiring only harmonics.
struct HarmonicsOnly;

impl OutputCriterion for HarmonicsOnly {
    fn column_name(&self) -> &str {
        "harmonics_only"
    }

    fn required_capabilities(&self) -> &[Capability] {
        &[Capability::Harmonics]
    }

    fn evaluate(&self, handlers: &[&ResultHandler]) -> Result<f64, CriterionError> {
        verify_handlers(self.required_capabilities(), handlers)?;
        Ok(0.0)
    }
}

#[test]
fn capabilities_are_deduplicated_order_stable() {
    let criteria: Vec<Box<dyn OutputCriterion>> = vec![
        Box::new(HarmonicsOnly),
        Box::new(BothCriterion),
        Box::new(ConstCriterion {
            name: "const".to_string(),
            value: 1.0,
        }),
    ];
    assert_eq!(
        required_capabilities(&criteria),
        vec![Capability::Harmonics, Capability::Mesh]
    );
}

#[test]
fn no_criteria_means_no_capabilities() {
    let criteria: Vec<Box<dyn OutputCriterion>> = Vec::new();
    assert!(required_capabilities(&criteria).is_empty());
}
