use std::fs;

use serde_json::{json, Value};
use tempfile::tempdir;

use cctsweep::core::model::{JsonModelHandler, ModelError, ModelStore, ParamLocation};

use crate::common::sample_model;

mod common;

fn location(node: &str, children: &[&str], target: &str) -> ParamLocation {
    ParamLocation::new(
        node,
        children.iter().map(|&child| child.into()).collect(),
        target,
    )
}

#[test]
fn open_creates_a_private_working_copy() {
    let dir = tempdir().unwrap();
    let model_path = dir.path().join("quad_test.json");
    fs::write(&model_path, sample_model().to_string()).unwrap();

    let handler = JsonModelHandler::open(&model_path).unwrap();
    assert_ne!(handler.snapshot_path(), model_path.as_path());
    assert!(handler.snapshot_path().exists());

    // the snapshot is a faithful copy of the source tree
    let snapshot: Value =
        serde_json::from_str(&fs::read_to_string(handler.snapshot_path()).unwrap()).unwrap();
    assert_eq!(snapshot, sample_model());
}

#[test]
fn handlers_on_the_same_model_never_share_a_working_copy() {
    let dir = tempdir().unwrap();
    let model_path = dir.path().join("quad_test.json");
    fs::write(&model_path, sample_model().to_string()).unwrap();

    let mut first = JsonModelHandler::open(&model_path).unwrap();
    let second = JsonModelHandler::open(&model_path).unwrap();
    assert_ne!(first.snapshot_path(), second.snapshot_path());

    // a write through one handler leaves the other's snapshot untouched
    first
        .set_value(
            &location("custom cct inner", &["omega"], "scaling"),
            json!(0.009),
        )
        .unwrap();
    first.save().unwrap();

    let other: Value =
        serde_json::from_str(&fs::read_to_string(second.snapshot_path()).unwrap()).unwrap();
    assert_eq!(other["models"][0]["omega"]["scaling"], json!(0.002));
}

#[test]
fn get_value_resolves_named_nodes() {
    let dir = tempdir().unwrap();
    let handler = common::model_in(dir.path());

    let value = handler
        .get_value(&location("custom cct inner", &["omega"], "scaling"))
        .unwrap();
    assert_eq!(value, json!(0.002));
}

#[test]
fn set_then_get_roundtrips() {
    let dir = tempdir().unwrap();
    let mut handler = common::model_in(dir.path());
    let loc = location("custom cct inner", &["omega"], "scaling");

    handler.set_value(&loc, json!(0.0021)).unwrap();
    assert_eq!(handler.get_value(&loc).unwrap(), json!(0.0021));
}

#[test]
fn array_indices_traverse_into_children() {
    let dir = tempdir().unwrap();
    let mut handler = common::model_in(dir.path());
    let loc = ParamLocation::new(
        "Connect South V2",
        vec!["uvw1".into(), 0usize.into()],
        "u",
    );

    assert_eq!(handler.get_value(&loc).unwrap(), json!(0.0));
    handler.set_value(&loc, json!(0.1)).unwrap();
    assert_eq!(handler.get_value(&loc).unwrap(), json!(0.1));
}

#[test]
fn missing_node_is_reported() {
    let dir = tempdir().unwrap();
    let handler = common::model_in(dir.path());

    let err = handler
        .get_value(&location("no such node", &[], "scaling"))
        .unwrap_err();
    assert!(matches!(err, ModelError::NodeNotFound(name) if name == "no such node"));
}

#[test]
fn missing_child_and_target_are_distinguished() {
    let dir = tempdir().unwrap();
    let handler = common::model_in(dir.path());

    let err = handler
        .get_value(&location("custom cct inner", &["sigma"], "scaling"))
        .unwrap_err();
    assert!(matches!(err, ModelError::ChildNotFound { .. }));

    let err = handler
        .get_value(&location("custom cct inner", &["omega"], "radius"))
        .unwrap_err();
    assert!(matches!(err, ModelError::TargetNotFound { .. }));
}

#[test]
fn save_persists_mutations_to_the_snapshot() {
    let dir = tempdir().unwrap();
    let mut handler = common::model_in(dir.path());
    let loc = location("B3", &["harmonic_drive"], "offset");

    handler.set_value(&loc, json!(0.25)).unwrap();
    handler.save().unwrap();

    let snapshot: Value =
        serde_json::from_str(&fs::read_to_string(handler.snapshot_path()).unwrap()).unwrap();
    assert_eq!(
        snapshot["models"][2]["harmonic_drive"]["offset"],
        json!(0.25)
    );
}
