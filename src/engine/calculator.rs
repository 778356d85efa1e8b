use std::path::Path;

use thiserror::Error;

use super::results::{Capability, ResultHandler};

#[derive(Debug, Error)]
pub enum CalcError {
    #[error("capability {0} is not supported by this calculator")]
    Unsupported(Capability),

    /// The engine ran but could not produce a result for the current
    /// configuration (e.g. malformed geometry).
    #[error("calculation failed: {0}")]
    Engine(String),

    #[error("solver produced unparseable output: {0}")]
    Parse(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

/// A generic interface for field-calculation engines.
///
/// The search engine treats a calculator as a pure function from
/// (persisted configuration snapshot, requested capability) to a result
/// handler. Each dispatch reloads the snapshot; nothing is cached between
/// grid points.
pub trait Calculator {
    /// Capabilities this engine can dispatch. A sweep whose criteria
    /// require anything outside this set is refused before it starts.
    fn supported(&self) -> &[Capability];

    /// Runs one calculation against the persisted model snapshot.
    fn dispatch(&mut self, capability: Capability, snapshot: &Path)
        -> Result<ResultHandler, CalcError>;

    /// Returns the name of the engine (for logs and error messages).
    fn name(&self) -> &str;
}
