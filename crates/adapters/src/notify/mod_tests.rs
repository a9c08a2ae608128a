// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::command::breach_env;
use super::*;
use tempfile::tempdir;

fn resource_breach() -> DurationBreach {
    DurationBreach::Resource {
        tenant: Tenant::new("reports"),
        resource_id: ResourceId::new("2026/q1.csv"),
        elapsed: Duration::from_millis(1500),
        limit: Duration::from_millis(1000),
    }
}

#[test]
fn breach_display_names_subject_and_limit() {
    assert_eq!(
        resource_breach().to_string(),
        "resource 2026/q1.csv of reports took 1500ms (limit 1000ms)"
    );
}

#[test]
fn resource_breach_env_has_resource_id_but_no_run_id() {
    let env = breach_env(&resource_breach());
    let get = |key: &str| env.iter().find(|(k, _)| *k == key).map(|(_, v)| v.clone());

    assert_eq!(get("RW_KIND").as_deref(), Some("resource"));
    assert_eq!(get("RW_RESOURCE_ID").as_deref(), Some("2026/q1.csv"));
    assert_eq!(get("RW_ELAPSED_MS").as_deref(), Some("1500"));
    assert_eq!(get("RW_LIMIT_MS").as_deref(), Some("1000"));
    assert!(get("RW_RUN_ID").is_none());
}

#[tokio::test]
async fn noop_notifier_accepts_everything() {
    assert!(NoOpNotifier.notify(&resource_breach()).await.is_ok());
}

#[tokio::test]
async fn command_notifier_passes_breach_in_env() {
    let dir = tempdir().unwrap();
    let out = dir.path().join("breach.txt");
    let notifier = CommandNotifier::new(format!(
        "echo \"$RW_KIND $RW_TENANT $RW_RESOURCE_ID\" > {}",
        out.display()
    ));

    notifier.notify(&resource_breach()).await.unwrap();

    let written = std::fs::read_to_string(&out).unwrap();
    assert_eq!(written.trim(), "resource reports 2026/q1.csv");
}

#[tokio::test]
async fn command_notifier_reports_nonzero_exit() {
    let notifier = CommandNotifier::new("echo nope >&2; exit 3");

    let err = notifier.notify(&resource_breach()).await.unwrap_err();

    assert!(err.to_string().contains("nope"), "got: {}", err);
}
