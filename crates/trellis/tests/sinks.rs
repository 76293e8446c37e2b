//! Integration tests for notification sinks, including cross-process
//! idempotence of the JSONL log.

use std::fs;
use tempfile::TempDir;
use trellis::sink::{JsonlSink, MemorySink, NotificationRecord};
use trellis::store::{JsonlSnapshotStore, SnapshotSource};
use trellis_engine::cascade::{
    dedupe_key, trigger_unblock_cascade, EmitOutcome, Notification, NotificationSink,
};
use trellis_engine::domain::{NodeId, OrgId, UserId};

fn notification(node: &str, owner: &str) -> Notification {
    let node = NodeId::new(node);
    let owner = UserId::new(owner);
    Notification {
        org: OrgId("acme".to_string()),
        dedupe_key: dedupe_key(&node, &owner),
        title: format!("Unblocked: {node}"),
        message: "dependencies resolved".to_string(),
        node,
        owner,
    }
}

#[tokio::test]
async fn memory_sink_dedupes_on_key() {
    let sink = MemorySink::new();
    let n = notification("b", "alice");

    assert_eq!(sink.emit(&n).await.unwrap(), EmitOutcome::Created);
    assert_eq!(sink.emit(&n).await.unwrap(), EmitOutcome::Deduplicated);
    assert_eq!(sink.delivered().await.len(), 1);
}

#[tokio::test]
async fn memory_sink_failure_injection() {
    let sink = MemorySink::new();
    sink.fail_for(UserId::new("alice")).await;

    assert!(sink.emit(&notification("b", "alice")).await.is_err());
    assert_eq!(
        sink.emit(&notification("b", "bob")).await.unwrap(),
        EmitOutcome::Created
    );
}

#[tokio::test]
async fn jsonl_sink_appends_and_dedupes() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("notifications.jsonl");
    let sink = JsonlSink::open(&path).await.unwrap();

    assert_eq!(
        sink.emit(&notification("b", "alice")).await.unwrap(),
        EmitOutcome::Created
    );
    assert_eq!(
        sink.emit(&notification("b", "bob")).await.unwrap(),
        EmitOutcome::Created
    );
    assert_eq!(
        sink.emit(&notification("b", "alice")).await.unwrap(),
        EmitOutcome::Deduplicated
    );

    let contents = fs::read_to_string(&path).unwrap();
    let records: Vec<NotificationRecord> = contents
        .lines()
        .map(|line| serde_json::from_str(line).unwrap())
        .collect();
    assert_eq!(records.len(), 2);
    assert_eq!(records[0].notification.owner, UserId::new("alice"));
    assert_eq!(records[1].notification.owner, UserId::new("bob"));
}

#[tokio::test]
async fn jsonl_sink_stays_idempotent_across_reopen() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("notifications.jsonl");

    {
        let sink = JsonlSink::open(&path).await.unwrap();
        sink.emit(&notification("b", "alice")).await.unwrap();
    }

    // A fresh sink over the same log pre-loads the existing keys.
    let sink = JsonlSink::open(&path).await.unwrap();
    assert_eq!(
        sink.emit(&notification("b", "alice")).await.unwrap(),
        EmitOutcome::Deduplicated
    );
    assert_eq!(
        sink.emit(&notification("b", "bob")).await.unwrap(),
        EmitOutcome::Created
    );

    let contents = fs::read_to_string(&path).unwrap();
    assert_eq!(contents.lines().count(), 2);
}

#[tokio::test]
async fn cascade_end_to_end_over_jsonl() {
    let dir = TempDir::new().unwrap();
    fs::write(
        dir.path().join("nodes.jsonl"),
        concat!(
            "{\"id\":\"a\",\"title\":\"Design\",\"manual_status\":\"done\"}\n",
            "{\"id\":\"b\",\"title\":\"Build\",\"manual_status\":\"todo\",\"owners\":[\"alice\"]}\n",
        ),
    )
    .unwrap();
    fs::write(
        dir.path().join("edges.jsonl"),
        "{\"from\":\"b\",\"to\":\"a\",\"relation\":\"depends-on\"}\n",
    )
    .unwrap();

    let store = JsonlSnapshotStore::new(dir.path());
    let (snapshot, _) = store.load().await.unwrap();
    let index = snapshot.index();
    let org = OrgId("acme".to_string());
    let log = dir.path().join("notifications.jsonl");

    let sink = JsonlSink::open(&log).await.unwrap();
    let outcome = trigger_unblock_cascade(&index, &org, &NodeId::new("a"), &sink).await;
    assert_eq!(
        outcome.notified,
        vec![(NodeId::new("b"), UserId::new("alice"))]
    );

    // A retry after a process restart finds the log and stays quiet.
    let sink = JsonlSink::open(&log).await.unwrap();
    let outcome = trigger_unblock_cascade(&index, &org, &NodeId::new("a"), &sink).await;
    assert!(outcome.notified.is_empty());
    assert_eq!(outcome.deduplicated, 1);
    assert_eq!(fs::read_to_string(&log).unwrap().lines().count(), 1);
}
