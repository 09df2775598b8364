mod common;

use autoqliq::workflow::{ActionKind, ActionType, LoadError, WorkflowLoader};
use common::*;
use std::path::Path;

#[test]
fn test_is_workflow_file() {
    assert!(WorkflowLoader::is_workflow_file(Path::new("login.yaml")));
    assert!(WorkflowLoader::is_workflow_file(Path::new("login.yml")));
    assert!(WorkflowLoader::is_workflow_file(Path::new("login.json")));
    assert!(!WorkflowLoader::is_workflow_file(Path::new("runner.yaml")));
    assert!(!WorkflowLoader::is_workflow_file(Path::new("notes.txt")));
}

#[test]
fn test_load_yaml_mapping() {
    let dir = create_test_dir();
    write_workflow(
        dir.path(),
        "login.yaml",
        r##"
name: Login flow
variables:
  env: staging
actions:
  - type: Navigate
    name: Open
    url: https://example.com/login
  - type: Type
    name: Password
    selector: "#pass"
    value_type: credential
    value_key: admin.password
"##,
    );

    let workflow = WorkflowLoader::load_file(&dir.path().join("login.yaml")).unwrap();

    assert_eq!(workflow.name, "Login flow");
    assert_eq!(workflow.variables["env"], serde_json::json!("staging"));
    assert_eq!(workflow.actions.len(), 2);
    assert_eq!(workflow.actions[1].action_type(), ActionType::Type);
    assert!(workflow.validate().is_ok());
}

#[test]
fn test_load_json_list_uses_file_stem() {
    let dir = create_test_dir();
    write_workflow(
        dir.path(),
        "checkout.json",
        r#"[
            {"type": "Click", "name": "Cart", "selector": "a.cart"},
            {"type": "Loop", "name": "Items", "loop_type": "count", "count": 2,
             "loop_actions": [{"type": "Click", "name": "Remove", "selector": ".remove"}]}
        ]"#,
    );

    let workflow = WorkflowLoader::load_file(&dir.path().join("checkout.json")).unwrap();

    assert_eq!(workflow.name, "checkout");
    assert_eq!(workflow.actions.len(), 2);
    assert_eq!(workflow.action_count(), 3);
    assert!(matches!(
        workflow.actions[1].kind,
        ActionKind::Loop { count: Some(2), .. }
    ));
}

#[test]
fn test_load_directory_sorted_and_skips_config() {
    let dir = create_test_dir();
    write_workflow(dir.path(), "b.yaml", &wait_only_workflow("second"));
    write_workflow(dir.path(), "a.yaml", &wait_only_workflow("first"));
    write_workflow(dir.path(), "notes.md", "# not a workflow");
    write_runner_config(dir.path(), "error_handling:\n  strategy: continue\n");

    let workflows = WorkflowLoader::load_directory(dir.path()).unwrap();

    let names: Vec<_> = workflows.iter().map(|w| w.name.as_str()).collect();
    assert_eq!(names, vec!["first", "second"]);
}

#[test]
fn test_unknown_action_type() {
    let dir = create_test_dir();
    write_workflow(
        dir.path(),
        "bad.yaml",
        "- type: Teleport\n  name: Beam me up\n",
    );

    let err = WorkflowLoader::load_file(&dir.path().join("bad.yaml")).unwrap_err();

    assert!(matches!(err, LoadError::Action { .. }));
    assert!(err.to_string().contains("Teleport"));
}

#[test]
fn test_missing_required_field() {
    let dir = create_test_dir();
    write_workflow(
        dir.path(),
        "bad.yaml",
        "- type: Navigate\n  name: Nowhere\n",
    );

    let err = WorkflowLoader::load_file(&dir.path().join("bad.yaml")).unwrap_err();

    assert!(matches!(err, LoadError::Action { .. }));
}

#[test]
fn test_invalid_yaml() {
    let dir = create_test_dir();
    write_workflow(dir.path(), "broken.yaml", "actions: [unclosed");

    let err = WorkflowLoader::load_file(&dir.path().join("broken.yaml")).unwrap_err();

    assert!(matches!(err, LoadError::Yaml { .. }));
}

#[test]
fn test_actions_must_be_list() {
    let dir = create_test_dir();
    write_workflow(dir.path(), "odd.yaml", "name: odd\nactions: 42\n");

    let err = WorkflowLoader::load_file(&dir.path().join("odd.yaml")).unwrap_err();

    assert!(matches!(err, LoadError::Invalid { .. }));
    assert!(err.to_string().contains("'actions' must be a list"));
}

#[test]
fn test_validation_reports_nested_path() {
    let dir = create_test_dir();
    write_workflow(
        dir.path(),
        "nested.yaml",
        r#"
name: nested
actions:
  - type: Loop
    name: Outer
    loop_type: count
    count: 2
    loop_actions:
      - type: Click
        name: Inner
        selector: ""
"#,
    );

    let workflow = WorkflowLoader::load_file(&dir.path().join("nested.yaml")).unwrap();
    let err = workflow.validate().unwrap_err();

    assert_eq!(err.path, "Outer/Inner");
    assert!(err.reason.contains("selector"));
}
