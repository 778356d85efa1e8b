//! Grid-search orchestration for CCT magnet models.
//!
//! A sweep is defined by a set of input parameter descriptors (each owning
//! an ordered value range and a location in the JSON model tree) and a set
//! of output criteria (each reducing one or more calculation results to a
//! scalar). The search engine enumerates the full cartesian grid, applies
//! every combination to a private model snapshot, asks the calculation
//! engine for the results the criteria need, and records one CSV row per
//! grid point.

pub mod core;
pub mod criteria;
pub mod engine;
pub mod error;
pub mod params;
pub mod search;

pub use crate::core::model::{ChildKey, JsonModelHandler, ModelStore, ParamLocation};
pub use crate::engine::calculator::Calculator;
pub use crate::engine::results::{Capability, ResultHandler};
pub use crate::error::SearchError;
pub use crate::search::runner::{ParameterSearch, SearchState};
