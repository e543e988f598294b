//! Selection, interactive exec, and removal over the mock adapters.

mod common;

use common::{complete_container, harness};

#[tokio::test]
async fn select_matches_anchored_glob_against_group_names() {
    let h = harness();
    h.provider.seed_group("fleet-01", &["fleet-01"]).await;
    h.provider.seed_group("fleet-02", &["fleet-02"]).await;
    h.provider.seed_group("other-fleet", &["other-fleet"]).await;

    let matched = h.controller.select("fleet*").await.unwrap();
    assert_eq!(matched, vec!["fleet-01", "fleet-02"]);
}

#[tokio::test]
async fn exec_dispatches_interactively_and_aggregates_outputs() {
    let h = harness();
    h.provider.seed_group("scan-01", &["scan-01", "scan-02"]).await;
    complete_container(&h, "scan-01", "scan-01", "tok-a", "alpha results").await;
    complete_container(&h, "scan-01", "scan-02", "tok-b", "beta results").await;

    h.controller.select("scan*").await.unwrap();
    let outputs = h
        .controller
        .exec("run-followup", Some(30), Vec::new())
        .await
        .unwrap();

    assert_eq!(outputs.len(), 2);
    assert_eq!(outputs["scan-01"].result.as_deref(), Some("alpha results"));
    assert_eq!(outputs["scan-02"].result.as_deref(), Some("beta results"));

    // One injected session script per container, backgrounded with a
    // capture-file redirect.
    let injected = h.shell.injected().await;
    assert_eq!(injected.len(), 2);
    for (_, _, script) in &injected {
        assert!(script.contains("run-followup"));
        assert!(script.contains("/tmp/flotilla-capture.log"));
        assert!(script.ends_with('&'));
    }
}

#[tokio::test]
async fn exec_shards_targets_across_the_selection() {
    let h = harness();
    h.provider.seed_group("scan-01", &["scan-01", "scan-02"]).await;
    complete_container(&h, "scan-01", "scan-01", "tok-a", "ok").await;
    complete_container(&h, "scan-01", "scan-02", "tok-b", "ok").await;

    h.controller.select("scan*").await.unwrap();
    let targets: Vec<String> = (0..10).map(|i| format!("192.168.0.{i}")).collect();
    h.controller.exec("run", Some(30), targets).await.unwrap();

    // Each injected script fetches a distinct staged shard.
    let injected = h.shell.injected().await;
    let shard_mentions: Vec<bool> = injected
        .iter()
        .map(|(_, _, script)| script.contains("shard-"))
        .collect();
    assert_eq!(shard_mentions, vec![true, true]);
}

#[tokio::test]
async fn exec_with_empty_selection_returns_no_outputs() {
    let h = harness();
    let outputs = h.controller.exec("run", Some(5), Vec::new()).await.unwrap();
    assert!(outputs.is_empty());
    assert!(h.shell.injected().await.is_empty());
}

#[tokio::test]
async fn rm_deletes_matching_groups_independently() {
    let h = harness();
    h.provider.seed_group("x1", &["x1"]).await;
    h.provider.seed_group("x2", &["x2"]).await;
    h.provider.seed_group("y1", &["y1"]).await;

    let outcomes = h.controller.remove("x*").await.unwrap();

    assert_eq!(outcomes.len(), 2);
    assert!(outcomes["x1"]);
    assert!(outcomes["x2"]);
    assert!(!outcomes.contains_key("y1"));

    let remaining = h.controller.list().await.unwrap();
    assert_eq!(remaining.len(), 1);
    assert_eq!(remaining[0].name, "y1");
}

#[tokio::test]
async fn one_failed_deletion_does_not_block_the_others() {
    let h = harness();
    h.provider.seed_group("x1", &["x1"]).await;
    h.provider.seed_group("x2", &["x2"]).await;
    h.provider.fail_delete("x1", "provider outage").await;

    let outcomes = h.controller.remove("x*").await.unwrap();

    assert!(!outcomes["x1"]);
    assert!(outcomes["x2"]);
}

#[tokio::test]
async fn list_reports_groups_with_their_containers() {
    let h = harness();
    h.provider.seed_group("a-01", &["a-01", "a-02"]).await;

    let groups = h.controller.list().await.unwrap();
    assert_eq!(groups.len(), 1);
    assert_eq!(groups[0].container_names, vec!["a-01", "a-02"]);
}
