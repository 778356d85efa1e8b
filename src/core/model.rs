use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};

use log::info;
use serde_json::Value;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ModelError {
    #[error("no node named '{0}' in the model tree")]
    NodeNotFound(String),

    #[error("child '{key}' not found under node '{node}'")]
    ChildNotFound { node: String, key: ChildKey },

    #[error("target '{target}' not found under node '{node}'")]
    TargetNotFound { node: String, target: ChildKey },

    #[error("failed to read model file '{path}'")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("model file '{path}' is not valid JSON")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("failed to encode model snapshot")]
    Encode(#[source] serde_json::Error),

    #[error("failed to write model snapshot '{path}'")]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// One traversal step below a named node: either an object field or an
/// array element.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChildKey {
    Key(String),
    Index(usize),
}

impl ChildKey {
    /// JSON-pointer segment for this key, with `/` and `~` escaped.
    fn pointer_segment(&self) -> String {
        match self {
            ChildKey::Key(key) => format!("/{}", key.replace('~', "~0").replace('/', "~1")),
            ChildKey::Index(index) => format!("/{index}"),
        }
    }
}

impl fmt::Display for ChildKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ChildKey::Key(key) => write!(f, "{key}"),
            ChildKey::Index(index) => write!(f, "[{index}]"),
        }
    }
}

impl From<&str> for ChildKey {
    fn from(key: &str) -> Self {
        ChildKey::Key(key.to_string())
    }
}

impl From<String> for ChildKey {
    fn from(key: String) -> Self {
        ChildKey::Key(key)
    }
}

impl From<usize> for ChildKey {
    fn from(index: usize) -> Self {
        ChildKey::Index(index)
    }
}

/// Location of one leaf in the model tree.
///
/// Resolution starts at the first node anywhere in the tree whose `"name"`
/// property equals `node`, then follows `children` one step at a time, and
/// finally reads or writes the `target` leaf of the last child.
///
/// E.g. node `"custom cct inner"`, children `["rho"]`, target `"alpha"`
/// addresses the `alpha` field of the `rho` object inside the node named
/// `"custom cct inner"`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParamLocation {
    pub node: String,
    pub children: Vec<ChildKey>,
    pub target: ChildKey,
}

impl ParamLocation {
    pub fn new(node: impl Into<String>, children: Vec<ChildKey>, target: impl Into<ChildKey>) -> Self {
        Self {
            node: node.into(),
            children,
            target: target.into(),
        }
    }
}

impl fmt::Display for ParamLocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.node)?;
        for child in &self.children {
            write!(f, ".{child}")?;
        }
        write!(f, ".{}", self.target)
    }
}

/// Storage interface for the hierarchical simulation configuration.
///
/// The search engine only needs leaf reads (validation probes), leaf
/// writes (parameter application) and durable persistence to a location
/// the calculation engine can read.
pub trait ModelStore {
    /// Read-only probe of a leaf. Fails if the location cannot be resolved.
    fn get_value(&self, location: &ParamLocation) -> Result<Value, ModelError>;

    /// Overwrites an existing leaf. Fails if the location cannot be resolved.
    fn set_value(&mut self, location: &ParamLocation, value: Value) -> Result<(), ModelError>;

    /// Persists the current tree to the snapshot path.
    fn save(&mut self) -> Result<(), ModelError>;

    /// Path of the persisted snapshot handed to the calculation engine.
    fn snapshot_path(&self) -> &Path;
}

/// JSON-backed model store.
///
/// Each handler owns a private working copy of the model file, so
/// concurrent runs against the same source model never share a snapshot.
pub struct JsonModelHandler {
    tree: Value,
    snapshot: PathBuf,
}

impl JsonModelHandler {
    /// Loads a model file and creates a private working copy next to it.
    pub fn open(model_path: impl AsRef<Path>) -> Result<Self, ModelError> {
        let model_path = model_path.as_ref();
        let snapshot = Self::private_snapshot_path(model_path);
        Self::with_snapshot(model_path, snapshot)
    }

    /// Loads a model file with an explicit snapshot location.
    pub fn with_snapshot(
        model_path: impl AsRef<Path>,
        snapshot: impl Into<PathBuf>,
    ) -> Result<Self, ModelError> {
        let model_path = model_path.as_ref();
        let raw = fs::read_to_string(model_path).map_err(|source| ModelError::Read {
            path: model_path.to_path_buf(),
            source,
        })?;
        let tree = serde_json::from_str(&raw).map_err(|source| ModelError::Parse {
            path: model_path.to_path_buf(),
            source,
        })?;
        let handler = Self::from_tree(tree, snapshot)?;
        info!(
            "model '{}' loaded, private snapshot at '{}'",
            model_path.display(),
            handler.snapshot.display()
        );
        Ok(handler)
    }

    /// Builds a handler from an in-memory tree. The snapshot file is
    /// materialized immediately.
    pub fn from_tree(tree: Value, snapshot: impl Into<PathBuf>) -> Result<Self, ModelError> {
        let mut handler = Self {
            tree,
            snapshot: snapshot.into(),
        };
        handler.save()?;
        Ok(handler)
    }

    fn private_snapshot_path(model_path: &Path) -> PathBuf {
        // pid alone is not enough: several handlers may open the same
        // model file within one process
        static SNAPSHOT_SEQ: AtomicU64 = AtomicU64::new(0);
        let seq = SNAPSHOT_SEQ.fetch_add(1, Ordering::Relaxed);

        let stem = model_path
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_else(|| "model".to_string());
        model_path.with_file_name(format!(
            "{}_run_{}_{}.json",
            stem,
            std::process::id(),
            seq
        ))
    }

    /// Depth-first search for the first value whose `"name"` property
    /// equals `name`, returning its JSON pointer.
    fn find_node_pointer(value: &Value, name: &str, prefix: String) -> Option<String> {
        if value.get("name").and_then(Value::as_str) == Some(name) {
            return Some(prefix);
        }
        match value {
            Value::Object(map) => map.iter().find_map(|(key, child)| {
                let segment = ChildKey::Key(key.clone()).pointer_segment();
                Self::find_node_pointer(child, name, format!("{prefix}{segment}"))
            }),
            Value::Array(items) => items.iter().enumerate().find_map(|(index, child)| {
                Self::find_node_pointer(child, name, format!("{prefix}/{index}"))
            }),
            _ => None,
        }
    }

    /// Resolves a location to the JSON pointer of its target leaf,
    /// reporting which traversal step failed.
    fn resolve_pointer(&self, location: &ParamLocation) -> Result<String, ModelError> {
        let mut pointer = Self::find_node_pointer(&self.tree, &location.node, String::new())
            .ok_or_else(|| ModelError::NodeNotFound(location.node.clone()))?;
        for child in &location.children {
            pointer.push_str(&child.pointer_segment());
            if self.tree.pointer(&pointer).is_none() {
                return Err(ModelError::ChildNotFound {
                    node: location.node.clone(),
                    key: child.clone(),
                });
            }
        }
        pointer.push_str(&location.target.pointer_segment());
        if self.tree.pointer(&pointer).is_none() {
            return Err(ModelError::TargetNotFound {
                node: location.node.clone(),
                target: location.target.clone(),
            });
        }
        Ok(pointer)
    }
}

impl ModelStore for JsonModelHandler {
    fn get_value(&self, location: &ParamLocation) -> Result<Value, ModelError> {
        let pointer = self.resolve_pointer(location)?;
        // resolve_pointer verified the leaf exists
        Ok(self.tree.pointer(&pointer).cloned().unwrap_or(Value::Null))
    }

    fn set_value(&mut self, location: &ParamLocation, value: Value) -> Result<(), ModelError> {
        let pointer = self.resolve_pointer(location)?;
        match self.tree.pointer_mut(&pointer) {
            Some(slot) => {
                *slot = value;
                Ok(())
            }
            None => Err(ModelError::TargetNotFound {
                node: location.node.clone(),
                target: location.target.clone(),
            }),
        }
    }

    fn save(&mut self) -> Result<(), ModelError> {
        let encoded = serde_json::to_string_pretty(&self.tree).map_err(ModelError::Encode)?;
        fs::write(&self.snapshot, encoded).map_err(|source| ModelError::Write {
            path: self.snapshot.clone(),
            source,
        })
    }

    fn snapshot_path(&self) -> &Path {
        &self.snapshot
    }
}
