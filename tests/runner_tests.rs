mod common;

use std::collections::HashMap;
use std::sync::Arc;

use autoqliq::engine::{ContinueOnError, ExecutionStatus, StopSignal, WorkflowRunner};
use autoqliq::repository::{Credential, MemoryCredentialRepository};
use autoqliq::workflow::{Action, ExecutionContext, Workflow};
use common::RecordingDriver;

fn runner(driver: Arc<RecordingDriver>) -> WorkflowRunner {
    WorkflowRunner::new(driver, Arc::new(MemoryCredentialRepository::new()))
}

#[tokio::test]
async fn test_actions_run_in_order() {
    let driver = RecordingDriver::new();
    let actions = vec![
        Action::navigate("Open", "https://example.com"),
        Action::click("Accept", "#accept"),
        Action::type_text("Search", "#q", "rust"),
    ];

    let report = runner(driver.clone()).run(&actions, "ordered").await;

    assert_eq!(report.final_status, ExecutionStatus::Success);
    assert_eq!(report.action_results.len(), 3);
    assert_eq!(
        driver.calls(),
        vec!["navigate:https://example.com", "click:#accept", "type:#q=rust"]
    );
    assert_eq!(report.summary.success_count, 3);
    assert!(report.error_message.is_none());
}

#[tokio::test]
async fn test_stop_strategy_aborts_on_first_error() {
    let driver = RecordingDriver::new();
    driver.fail_selector("#missing");
    let actions = vec![
        Action::click("First", "#first"),
        Action::click("Broken", "#missing"),
        Action::click("Never", "#never"),
    ];

    let report = runner(driver.clone()).run(&actions, "aborting").await;

    assert_eq!(report.final_status, ExecutionStatus::Failed);
    assert_eq!(report.action_results.len(), 2);
    assert!(report.action_results[0].is_success());
    assert!(!report.action_results[1].is_success());
    assert_eq!(driver.count("click:#never"), 0);

    let message = report.error_message.unwrap();
    assert!(message.contains("Broken"));
    assert!(message.contains("#missing"));
}

#[tokio::test]
async fn test_continue_strategy_runs_everything() {
    let driver = RecordingDriver::new();
    driver.fail_selector("#missing");
    let actions = vec![
        Action::click("First", "#first"),
        Action::click("Broken", "#missing"),
        Action::click("Last", "#last"),
    ];

    let report = runner(driver.clone())
        .with_strategy(Arc::new(ContinueOnError))
        .run(&actions, "continuing")
        .await;

    assert_eq!(report.final_status, ExecutionStatus::CompletedWithErrors);
    assert_eq!(report.action_results.len(), 3);
    assert_eq!(report.summary.failure_count, 1);
    assert_eq!(driver.count("click:#last"), 1);
}

#[tokio::test]
async fn test_stop_signal_halts_before_next_action() {
    let driver = RecordingDriver::new();
    let signal = StopSignal::new();
    driver.stop_on("click:#second", signal.clone());
    let actions = vec![
        Action::click("First", "#first"),
        Action::click("Second", "#second"),
        Action::click("Third", "#third"),
    ];

    let report = runner(driver.clone())
        .with_stop_signal(signal)
        .run(&actions, "cancelled")
        .await;

    assert_eq!(report.final_status, ExecutionStatus::Stopped);
    assert_eq!(report.action_results.len(), 2);
    assert_eq!(driver.count("click:#third"), 0);
}

#[tokio::test]
async fn test_stop_signal_reaches_nested_loop() {
    let driver = RecordingDriver::new();
    let signal = StopSignal::new();
    driver.stop_on("click:#row", signal.clone());
    let actions = vec![Action::count_loop(
        "Rows",
        5,
        vec![Action::click("Row", "#row")],
    )];

    let report = runner(driver.clone())
        .with_stop_signal(signal)
        .run(&actions, "nested-stop")
        .await;

    assert_eq!(report.final_status, ExecutionStatus::Stopped);
    assert_eq!(driver.count("click:#row"), 1);
}

#[tokio::test]
async fn test_stopped_before_start_runs_nothing() {
    let driver = RecordingDriver::new();
    let runner = runner(driver.clone());
    runner.stop_signal().stop();

    let report = runner
        .run(&[Action::navigate("Open", "https://example.com")], "pre-stopped")
        .await;

    assert_eq!(report.final_status, ExecutionStatus::Stopped);
    assert!(report.action_results.is_empty());
    assert!(driver.calls().is_empty());
}

#[tokio::test]
async fn test_stop_signal_wins_over_continue_strategy() {
    let driver = RecordingDriver::new();
    let signal = StopSignal::new();
    driver.fail_selector("#first");
    driver.stop_on("click:#first", signal.clone());
    let actions = vec![
        Action::click("First", "#first"),
        Action::click("Second", "#second"),
    ];

    let report = runner(driver.clone())
        .with_strategy(Arc::new(ContinueOnError))
        .with_stop_signal(signal)
        .run(&actions, "continue-then-stop")
        .await;

    assert_eq!(report.final_status, ExecutionStatus::Stopped);
    assert_eq!(report.action_results.len(), 1);
    assert!(!report.action_results[0].is_success());
    assert_eq!(driver.calls(), vec!["click:#first"]);
}

#[tokio::test]
async fn test_stop_inside_try_block_skips_catch() {
    let driver = RecordingDriver::new();
    let signal = StopSignal::new();
    driver.fail_selector("#a");
    driver.stop_on("click:#a", signal.clone());
    let actions = vec![
        Action::try_catch(
            "Guarded",
            vec![Action::click("A", "#a"), Action::click("B", "#b")],
            vec![Action::click("Recover", "#recover")],
        ),
        Action::click("After", "#after"),
    ];

    let report = runner(driver.clone())
        .with_stop_signal(signal)
        .run(&actions, "stop-in-try")
        .await;

    assert_eq!(report.final_status, ExecutionStatus::Stopped);
    assert!(report.action_results.is_empty());
    assert_eq!(driver.calls(), vec!["click:#a"]);
    assert_eq!(driver.count("click:#recover"), 0);
}

#[tokio::test]
async fn test_navigate_wait_screenshot() {
    let driver = RecordingDriver::new();
    let actions = vec![
        Action::navigate("Open", "https://example.com"),
        Action::wait("Settle", 0.01),
        Action::screenshot("Capture", "out/home.png"),
    ];

    let report = runner(driver.clone()).run(&actions, "capture").await;

    assert!(report.is_success());
    assert_eq!(
        driver.calls(),
        vec!["navigate:https://example.com", "screenshot:out/home.png"]
    );
    assert_eq!(
        report.action_results[2].data().get("file_path").and_then(|v| v.as_str()),
        Some("out/home.png")
    );
}

#[tokio::test]
async fn test_type_credential_uses_repository() {
    let driver = RecordingDriver::new();
    let credentials = Arc::new(MemoryCredentialRepository::with_credentials([
        Credential::new("admin", "root", "s3cret"),
    ]));
    let actions = vec![
        Action::type_credential("User", "#user", "admin.username"),
        Action::type_credential("Pass", "#pass", "admin.password"),
    ];

    let report = WorkflowRunner::new(driver.clone(), credentials)
        .run(&actions, "login")
        .await;

    assert!(report.is_success());
    assert_eq!(driver.calls(), vec!["type:#user=root", "type:#pass=s3cret"]);
    for result in &report.action_results {
        assert!(!result.message().contains("s3cret"));
    }
}

#[tokio::test]
async fn test_missing_credential_is_failure_result() {
    let driver = RecordingDriver::new();
    let actions = vec![Action::type_credential("User", "#user", "ghost.username")];

    let report = runner(driver.clone())
        .with_strategy(Arc::new(ContinueOnError))
        .run(&actions, "missing-credential")
        .await;

    assert_eq!(report.final_status, ExecutionStatus::CompletedWithErrors);
    assert!(report.action_results[0].message().contains("ghost"));
    assert!(driver.calls().is_empty());
}

#[tokio::test]
async fn test_workflow_variables_seed_context() {
    let driver = RecordingDriver::new();
    let mut workflow = Workflow::new(
        "variables",
        vec![Action::variable_equals(
            "Check env",
            "env",
            "staging",
            vec![Action::navigate("Staging", "https://staging.example.com")],
            vec![Action::navigate("Prod", "https://example.com")],
        )],
    );
    workflow.variables = HashMap::from([("env".to_string(), serde_json::json!("staging"))]);

    let report = runner(driver.clone()).run_workflow(&workflow).await;

    assert!(report.is_success());
    assert_eq!(driver.calls(), vec!["navigate:https://staging.example.com"]);
}

#[tokio::test]
async fn test_run_with_context_keeps_run_id() {
    let driver = RecordingDriver::new();
    let ctx = ExecutionContext::new();
    let run_id = ctx.run_id.clone();

    let report = runner(driver)
        .run_with_context(&[Action::wait("Pause", 0.0)], "with-context", ctx)
        .await;

    assert_eq!(report.run_id, run_id);
    assert_eq!(report.workflow_name, "with-context");
    assert!(report.end_time >= report.start_time);
}

#[tokio::test]
async fn test_report_serializes_status() {
    let driver = RecordingDriver::new();
    let report = runner(driver).run(&[], "empty").await;

    assert!(report.is_success());
    let json = report.to_json().unwrap();
    assert!(json.contains("\"final_status\": \"SUCCESS\""));
}
