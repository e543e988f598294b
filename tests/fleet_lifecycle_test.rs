//! End-to-end fleet lifecycle over the mock adapters: provisioning,
//! watching, output aggregation, and partial-failure semantics.

mod common;

use std::collections::BTreeMap;

use common::{complete_container, harness};
use flotilla::application::FleetRequest;
use flotilla::domain::models::TIMEOUT_REACHED;

fn fleet_request(name: &str, instances: usize, task: Option<&str>) -> FleetRequest {
    FleetRequest {
        name: Some(name.to_string()),
        image: "scanner:latest".to_string(),
        instance_count: instances,
        task: task.map(ToString::to_string),
        targets: Vec::new(),
        wait_budget_secs: Some(30),
        region: None,
        rm_when_done: false,
    }
}

#[tokio::test]
async fn fleet_collects_one_output_per_container() {
    let h = harness();
    for i in 1..=3 {
        complete_container(
            &h,
            "scan-01",
            &format!("scan-{i:02}"),
            &format!("tok-{i}"),
            &format!("results for shard {i}"),
        )
        .await;
    }

    let outcome = h
        .controller
        .fleet(fleet_request("scan", 3, Some("run-scan")))
        .await
        .unwrap();

    assert_eq!(outcome.fleet.name, "scan");
    assert_eq!(outcome.fleet.instance_count, 3);
    assert_eq!(outcome.groups.groups.len(), 1);
    assert_eq!(outcome.outputs.len(), 3);
    for i in 1..=3 {
        let entry = &outcome.outputs[&format!("scan-{i:02}")];
        assert_eq!(entry.result.as_deref(), Some(format!("results for shard {i}").as_str()));
        assert_eq!(entry.error, None);
    }
}

#[tokio::test]
async fn targets_are_sharded_and_staged_before_provisioning() {
    let h = harness();
    for i in 1..=3 {
        complete_container(&h, "scan-01", &format!("scan-{i:02}"), &format!("t{i}"), "ok").await;
    }

    let mut request = fleet_request("scan", 3, Some("run-scan"));
    request.targets = (0..100).map(|i| format!("10.0.0.{i}")).collect();
    h.controller.fleet(request).await.unwrap();

    // Each submitted container carries a distinct shard reference.
    let specs = h.provider.submitted_specs().await;
    let refs: Vec<&String> = specs[0]
        .containers
        .iter()
        .map(|c| &c.environment["FLOTILLA_SHARD_REF"])
        .collect();
    assert_eq!(refs.len(), 3);
    let distinct: std::collections::HashSet<&&String> = refs.iter().collect();
    assert_eq!(distinct.len(), 3);

    // And the staged shard lines sum to the full target list.
    let mut total = 0;
    for key in h.store.keys().await {
        if key.starts_with("shard-") {
            let body = flotilla::domain::ports::ObjectStore::get(h.store.as_ref(), &key)
                .await
                .unwrap();
            total += String::from_utf8(body).unwrap().lines().count();
        }
    }
    assert_eq!(total, 100);
}

#[tokio::test]
async fn sibling_failures_do_not_abort_other_containers() {
    let h = harness();
    complete_container(&h, "scan-01", "scan-01", "tok-good", "good output").await;
    // scan-02 never signals; a one-second budget times it out.
    h.provider.set_logs("scan-01", "scan-02", "Running\n").await;

    let mut request = fleet_request("scan", 2, Some("run-scan"));
    request.wait_budget_secs = Some(1);
    let outcome = h.controller.fleet(request).await.unwrap();

    assert_eq!(outcome.outputs["scan-01"].result.as_deref(), Some("good output"));
    assert_eq!(outcome.outputs["scan-02"].error.as_deref(), Some(TIMEOUT_REACHED));
}

#[tokio::test]
async fn exception_marker_lands_in_that_containers_entry() {
    let h = harness();
    complete_container(&h, "scan-01", "scan-01", "tok-1", "fine").await;
    h.provider
        .set_logs("scan-01", "scan-02", "boot\nException: scanner crashed\n")
        .await;

    let outcome = h
        .controller
        .fleet(fleet_request("scan", 2, Some("run-scan")))
        .await
        .unwrap();

    assert!(outcome.outputs["scan-02"]
        .error
        .as_deref()
        .unwrap()
        .contains("scanner crashed"));
    assert!(outcome.outputs["scan-01"].result.is_some());
}

#[tokio::test]
async fn large_fleet_spans_multiple_groups_and_all_watchers_join() {
    let h = harness();
    for i in 1..=12 {
        let group = if i <= 10 { "big-01" } else { "big-02" };
        complete_container(&h, group, &format!("big-{i:02}"), &format!("tok-{i}"), "done").await;
    }

    let outcome = h
        .controller
        .fleet(fleet_request("big", 12, Some("run")))
        .await
        .unwrap();

    assert_eq!(outcome.groups.groups.len(), 2);
    assert_eq!(outcome.groups.groups["big-01"].len(), 10);
    assert_eq!(outcome.groups.groups["big-02"].len(), 2);
    // Every watcher resolved before the call returned.
    assert_eq!(outcome.outputs.len(), 12);
}

#[tokio::test]
async fn provisioning_failure_yields_partial_success_without_rollback() {
    let h = harness();
    h.provider.fail_group("big-02", "quota exceeded").await;
    for i in 1..=10 {
        complete_container(&h, "big-01", &format!("big-{i:02}"), &format!("tok-{i}"), "ok").await;
    }

    let outcome = h
        .controller
        .fleet(fleet_request("big", 15, Some("run")))
        .await
        .unwrap();

    // Group one stands and produced outputs; group two reported false.
    assert!(outcome.groups.groups["big-01"].values().all(|ok| *ok));
    assert!(outcome.groups.groups["big-02"].values().all(|ok| !ok));
    assert_eq!(outcome.groups.aborted.as_deref(), Some("Provider error: quota exceeded"));
    assert_eq!(outcome.outputs.len(), 10);
    assert!(h.provider.deleted_groups().await.is_empty());
}

#[tokio::test]
async fn fleet_without_task_provisions_idle() {
    let h = harness();
    let outcome = h.controller.fleet(fleet_request("idle", 2, None)).await.unwrap();

    assert_eq!(outcome.groups.groups.len(), 1);
    assert!(outcome.outputs.is_empty());
}

#[tokio::test]
async fn rm_when_done_deletes_groups_after_collection() {
    let h = harness();
    complete_container(&h, "tmp-01", "tmp-01", "tok-1", "payload").await;

    let mut request = fleet_request("tmp", 1, Some("run"));
    request.rm_when_done = true;
    let outcome = h.controller.fleet(request).await.unwrap();

    assert_eq!(outcome.outputs["tmp-01"].result.as_deref(), Some("payload"));
    assert_eq!(h.provider.deleted_groups().await, vec!["tmp-01"]);
}

#[tokio::test]
async fn missing_image_fails_validation_before_any_resource() {
    let h = harness();
    let mut request = fleet_request("scan", 2, Some("run"));
    request.image = String::new();

    let err = h.controller.fleet(request).await.unwrap_err();
    assert_eq!(err.kind(), "ValidationError");
    assert!(h.provider.submitted_specs().await.is_empty());
    assert!(h.store.keys().await.is_empty());
}

#[tokio::test]
async fn missing_result_object_surfaces_as_container_error() {
    let h = harness();
    // Sentinel present but no payload staged under the token.
    h.provider
        .set_logs("scan-01", "scan-01", "command: tok-ghost\n")
        .await;

    let outcome = h
        .controller
        .fleet(fleet_request("scan", 1, Some("run")))
        .await
        .unwrap();

    let entry: &BTreeMap<String, bool> = &outcome.groups.groups["scan-01"];
    assert!(entry["scan-01"]);
    assert!(outcome.outputs["scan-01"].error.as_deref().unwrap().contains("tok-ghost"));
}
