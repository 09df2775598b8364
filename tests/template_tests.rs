mod common;

use std::collections::HashMap;
use std::sync::Arc;

use autoqliq::engine::{ExecutionStatus, WorkflowRunner};
use autoqliq::repository::{FileTemplateStore, MemoryCredentialRepository, MemoryTemplateStore};
use autoqliq::workflow::{Action, LimitsConfig};
use common::{create_test_dir, RecordingDriver};
use serde_json::json;

fn params(pairs: &[(&str, &str)]) -> HashMap<String, String> {
    pairs
        .iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect()
}

fn runner_with(driver: Arc<RecordingDriver>, store: MemoryTemplateStore) -> WorkflowRunner {
    WorkflowRunner::new(driver, Arc::new(MemoryCredentialRepository::new()))
        .with_template_store(Arc::new(store))
}

fn login_store() -> MemoryTemplateStore {
    let store = MemoryTemplateStore::new();
    store.insert(
        "login",
        vec![
            json!({"type": "Navigate", "name": "Open", "url": "{{ base_url }}/login"}),
            json!({"type": "Type", "name": "User", "selector": "#user", "value_type": "text", "value_key": "{{user}}"}),
            json!({"type": "Click", "name": "Submit", "selector": "{{ submit }}"}),
        ],
    );
    store
}

#[tokio::test]
async fn test_template_expands_parameters() {
    let driver = RecordingDriver::new();
    let actions = vec![Action::template(
        "Sign in",
        "login",
        params(&[
            ("base_url", "https://example.com"),
            ("user", "alice"),
            ("submit", "#go"),
        ]),
    )];

    let report = runner_with(driver.clone(), login_store())
        .run(&actions, "template")
        .await;

    assert!(report.is_success());
    assert_eq!(
        driver.calls(),
        vec![
            "navigate:https://example.com/login",
            "type:#user=alice",
            "click:#go"
        ]
    );
    assert_eq!(report.action_results.len(), 1);
}

#[tokio::test]
async fn test_unknown_placeholder_is_left_alone() {
    let driver = RecordingDriver::new();
    let actions = vec![Action::template(
        "Sign in",
        "login",
        params(&[("base_url", "https://example.com"), ("submit", "#go")]),
    )];

    let report = runner_with(driver.clone(), login_store())
        .run(&actions, "partial-params")
        .await;

    assert!(report.is_success());
    assert!(driver.calls().contains(&"type:#user={{user}}".to_string()));
}

#[tokio::test]
async fn test_nested_templates() {
    let driver = RecordingDriver::new();
    let store = login_store();
    store.insert(
        "login_and_accept",
        vec![
            json!({
                "type": "Template",
                "name": "Login",
                "template_name": "login",
                "parameters": {"base_url": "{{ host }}", "user": "bob", "submit": "#go"}
            }),
            json!({"type": "Click", "name": "Accept", "selector": "#accept"}),
        ],
    );
    let actions = vec![Action::template(
        "Full",
        "login_and_accept",
        params(&[("host", "https://example.org")]),
    )];

    let report = runner_with(driver.clone(), store).run(&actions, "nested").await;

    assert!(report.is_success());
    assert_eq!(
        driver.calls(),
        vec![
            "navigate:https://example.org/login",
            "type:#user=bob",
            "click:#go",
            "click:#accept"
        ]
    );
}

#[tokio::test]
async fn test_template_cycle_is_rejected() {
    let driver = RecordingDriver::new();
    let store = MemoryTemplateStore::new();
    store.insert(
        "ping",
        vec![json!({"type": "Template", "name": "To pong", "template_name": "pong"})],
    );
    store.insert(
        "pong",
        vec![json!({"type": "Template", "name": "To ping", "template_name": "ping"})],
    );
    let actions = vec![Action::template("Start", "ping", HashMap::new())];

    let report = runner_with(driver.clone(), store).run(&actions, "cycle").await;

    assert_eq!(report.final_status, ExecutionStatus::Failed);
    assert!(report
        .error_message
        .unwrap()
        .contains("Template cycle detected: ping -> pong -> ping"));
}

#[tokio::test]
async fn test_template_depth_limit() {
    let driver = RecordingDriver::new();
    let store = MemoryTemplateStore::new();
    store.insert(
        "outer",
        vec![json!({"type": "Template", "name": "Middle", "template_name": "middle"})],
    );
    store.insert(
        "middle",
        vec![json!({"type": "Template", "name": "Inner", "template_name": "inner"})],
    );
    store.insert(
        "inner",
        vec![json!({"type": "Click", "name": "Deep", "selector": "#deep"})],
    );
    let actions = vec![Action::template("Start", "outer", HashMap::new())];

    let report = runner_with(driver.clone(), store)
        .with_limits(LimitsConfig {
            while_max_iterations: 100,
            template_max_depth: 2,
        })
        .run(&actions, "too-deep")
        .await;

    assert_eq!(report.final_status, ExecutionStatus::Failed);
    assert!(report.error_message.unwrap().contains("maximum depth 2"));
    assert!(driver.calls().is_empty());
}

#[tokio::test]
async fn test_missing_template_fails_action() {
    let driver = RecordingDriver::new();
    let actions = vec![Action::template("Start", "nowhere", HashMap::new())];

    let report = runner_with(driver, MemoryTemplateStore::new())
        .run(&actions, "missing")
        .await;

    assert_eq!(report.final_status, ExecutionStatus::Failed);
    assert!(report.error_message.unwrap().contains("nowhere"));
}

#[tokio::test]
async fn test_template_without_store_fails() {
    let driver = RecordingDriver::new();
    let runner = WorkflowRunner::new(driver, Arc::new(MemoryCredentialRepository::new()));

    let report = runner
        .run(&[Action::template("Start", "login", HashMap::new())], "no-store")
        .await;

    assert_eq!(report.final_status, ExecutionStatus::Failed);
    assert!(report
        .error_message
        .unwrap()
        .contains("No template store is configured"));
}

#[tokio::test]
async fn test_file_template_store() {
    let dir = create_test_dir();
    std::fs::write(
        dir.path().join("search.yaml"),
        r##"
- type: Type
  name: Query
  selector: "#q"
  value_key: "{{ term }}"
- type: Click
  name: Go
  selector: "#search"
"##,
    )
    .unwrap();

    let driver = RecordingDriver::new();
    let runner = WorkflowRunner::new(driver.clone(), Arc::new(MemoryCredentialRepository::new()))
        .with_template_store(Arc::new(FileTemplateStore::new(dir.path())));

    let report = runner
        .run(
            &[Action::template("Search", "search", params(&[("term", "rust")]))],
            "file-store",
        )
        .await;

    assert!(report.is_success());
    assert_eq!(driver.calls(), vec!["type:#q=rust", "click:#search"]);
}
