use super::*;
use parking_lot::Mutex;
use std::sync::Arc;

fn path(segments: &[&str]) -> Vec<String> {
    segments.iter().map(|s| s.to_string()).collect()
}

#[test]
fn test_report_id_is_sixteen_alphanumeric_chars() {
    let id = generate_report_id();
    assert_eq!(id.len(), 16);
    assert!(id.chars().all(|c| c.is_ascii_alphanumeric()));
    assert_ne!(id, generate_report_id());
}

#[test]
fn test_start_requires_existing_parent() {
    let report = Report::default();

    let err = report.start_at_path(&path(&["a", "b"])).unwrap_err();
    assert_eq!(
        err,
        ReportError::MissingParent {
            path: "/a/b".to_string()
        }
    );

    report.start_at_path(&path(&["a"])).unwrap();
    report.start_at_path(&path(&["a", "b"])).unwrap();

    let snapshot = report.snapshot();
    assert_eq!(
        snapshot.find(&["a", "b"]).map(|n| n.status),
        Some(NodeStatus::Running)
    );
}

#[test]
fn test_root_cannot_be_started_and_missing_nodes_error() {
    let report = Report::default();

    assert!(matches!(
        report.start_at_path(&[]),
        Err(ReportError::RootPath { .. })
    ));
    assert!(matches!(
        report.end_at_path(&path(&["nope"])),
        Err(ReportError::NodeNotFound { .. })
    ));
    assert!(matches!(
        report.error_at_path(&path(&["nope"]), "x"),
        Err(ReportError::NodeNotFound { .. })
    ));
}

#[test]
fn test_end_and_error_stamp_completion() {
    let report = Report::default();
    report.start_at_path(&path(&["ok"])).unwrap();
    report.start_at_path(&path(&["bad"])).unwrap();

    report.end_at_path(&path(&["ok"])).unwrap();
    report.error_at_path(&path(&["bad"]), "boom").unwrap();

    let snapshot = report.snapshot();
    let ok = snapshot.child("ok").unwrap();
    assert_eq!(ok.status, NodeStatus::Complete);
    assert!(ok.completed_at.is_some());
    assert!(ok.duration_ms.is_some());

    let bad = snapshot.child("bad").unwrap();
    assert_eq!(bad.status, NodeStatus::Error);
    assert_eq!(bad.error.as_deref(), Some("boom"));
}

#[test]
fn test_set_at_empty_path_writes_root() {
    let report = Report::default();
    report
        .set_at_path(&[], "lesson", serde_json::json!("Fractions"))
        .unwrap();

    let snapshot = report.snapshot();
    assert_eq!(snapshot.data["lesson"], "Fractions");
    assert_eq!(snapshot.report_id.as_deref(), Some(report.id()));
}

#[test]
fn test_restart_resets_node_and_drops_children() {
    let report = Report::default();
    report.start_at_path(&path(&["stage"])).unwrap();
    report.start_at_path(&path(&["stage", "inner"])).unwrap();
    report
        .set_at_path(&path(&["stage"]), "k", serde_json::json!(1))
        .unwrap();
    report.end_at_path(&path(&["stage"])).unwrap();

    report.start_at_path(&path(&["stage"])).unwrap();

    let snapshot = report.snapshot();
    assert_eq!(snapshot.children.len(), 1);
    let stage = snapshot.child("stage").unwrap();
    assert_eq!(stage.status, NodeStatus::Running);
    assert!(stage.children.is_empty());
    assert!(stage.data.is_empty());
    assert!(matches!(
        report.end_at_path(&path(&["stage", "inner"])),
        Err(ReportError::NodeNotFound { .. })
    ));
}

#[test]
fn test_restart_reuses_released_slots() {
    let report = Report::default();
    report.start_at_path(&path(&["stage"])).unwrap();
    report.start_at_path(&path(&["stage", "a"])).unwrap();
    report.start_at_path(&path(&["stage", "b"])).unwrap();
    assert_eq!(report.arena_len(), 4);

    for _ in 0..5 {
        report.start_at_path(&path(&["stage"])).unwrap();
        report.start_at_path(&path(&["stage", "a"])).unwrap();
        report.start_at_path(&path(&["stage", "b"])).unwrap();
        report.end_at_path(&path(&["stage", "b"])).unwrap();
    }

    assert_eq!(report.arena_len(), 4);
    let stage = report.snapshot();
    let stage = stage.child("stage").unwrap();
    let names: Vec<&str> = stage.children.iter().map(|c| c.name.as_str()).collect();
    assert_eq!(names, vec!["a", "b"]);
    assert_eq!(stage.child("b").unwrap().status, NodeStatus::Complete);
}

#[test]
fn test_snapshot_is_independent_copy() {
    let report = Report::default();
    report.start_at_path(&path(&["a"])).unwrap();

    let mut snapshot = report.snapshot();
    snapshot.children.clear();
    snapshot.status = NodeStatus::Error;

    let fresh = report.snapshot();
    assert_eq!(fresh.children.len(), 1);
    assert_eq!(fresh.status, NodeStatus::Running);
}

#[tokio::test]
async fn test_tracker_completes_report_on_success() {
    let tracker = Tracker::new();

    let value = tracker
        .run(|task| async move {
            task.child("generate", |t| async move {
                t.set_data("pools", 2);
                Ok::<_, anyhow::Error>(())
            })
            .await?;
            Ok::<_, anyhow::Error>(42)
        })
        .await
        .unwrap();

    assert_eq!(value, 42);

    let report = tracker.get_report();
    assert_eq!(report.status, NodeStatus::Complete);
    assert!(report.duration_ms.is_some());
    assert_eq!(report.report_id.as_deref(), Some(tracker.report_id()));

    let generate = report.child("generate").unwrap();
    assert_eq!(generate.status, NodeStatus::Complete);
    assert_eq!(generate.data["pools"], 2);
}

#[tokio::test]
async fn test_child_error_is_recorded_and_rethrown() {
    let tracker = Tracker::new();

    let result: Result<(), anyhow::Error> = tracker
        .run(|task| async move {
            task.child("evaluate", |_t| async move {
                Err::<(), _>(anyhow::anyhow!("boom"))
            })
            .await
        })
        .await;

    assert_eq!(result.unwrap_err().to_string(), "boom");

    let report = tracker.get_report();
    assert_eq!(report.status, NodeStatus::Complete);
    assert!(report.duration_ms.is_some());
    assert_eq!(report.data["error"], "boom");

    let evaluate = report.child("evaluate").unwrap();
    assert_eq!(evaluate.status, NodeStatus::Error);
    assert_eq!(evaluate.error.as_deref(), Some("boom"));
}

#[tokio::test]
async fn test_parallel_children_keep_start_order() {
    let tracker = Tracker::new();

    tracker
        .run(|task| async move {
            let a = task.child("a", |_t| async move {
                tokio::time::sleep(std::time::Duration::from_millis(20)).await;
                Ok::<_, anyhow::Error>(())
            });
            let b = task.child("b", |_t| async move { Ok::<_, anyhow::Error>(()) });
            let (ra, rb) = futures_util::future::join(a, b).await;
            ra?;
            rb
        })
        .await
        .unwrap();

    let report = tracker.get_report();
    let names: Vec<_> = report.children.iter().map(|c| c.name.as_str()).collect();
    assert_eq!(names, vec!["a", "b"]);
    assert!(
        report
            .children
            .iter()
            .all(|c| c.status == NodeStatus::Complete)
    );
}

#[tokio::test]
async fn test_subscriber_sees_running_complete_and_data_updates() {
    let seen: Arc<Mutex<Vec<ReportNode>>> = Arc::new(Mutex::new(Vec::new()));
    let sink = Arc::clone(&seen);
    let tracker = Tracker::with_subscriber(move |snapshot| sink.lock().push(snapshot.clone()));

    tracker
        .run(|task| async move {
            task.child("stage", |t| async move {
                t.set_data("note", "hello");
                Ok::<_, anyhow::Error>(())
            })
            .await
        })
        .await
        .unwrap();

    let seen = seen.lock();
    assert!(seen.len() >= 4);

    let first = seen[0].child("stage").unwrap();
    assert_eq!(first.status, NodeStatus::Running);

    assert!(
        seen.iter()
            .any(|s| s.child("stage").is_some_and(|n| n.data.contains_key("note")))
    );

    let last = seen.last().unwrap();
    assert_eq!(last.status, NodeStatus::Complete);
    assert_eq!(last.child("stage").unwrap().status, NodeStatus::Complete);
}

#[tokio::test]
async fn test_nested_children_have_complete_ancestry() {
    let tracker = Tracker::new();

    tracker
        .run(|task| async move {
            task.child("generators", |g| async move {
                g.child("basedOnLesson", |b| async move {
                    b.child("lookup", |_l| async move { Ok::<_, anyhow::Error>(()) })
                        .await
                })
                .await?;
                g.child("currentQuiz", |_c| async move { Ok::<_, anyhow::Error>(()) })
                    .await
            })
            .await?;
            task.child("evaluate", |_e| async move { Ok::<_, anyhow::Error>(()) })
                .await
        })
        .await
        .unwrap();

    let report = tracker.get_report();
    let mut count = 0;
    report.walk(&mut |node_path, _node| {
        for depth in 0..node_path.len() {
            assert!(
                report.find(&node_path[..depth]).is_some(),
                "missing ancestor of {:?}",
                node_path
            );
        }
        count += 1;
    });

    assert_eq!(count, 6);
    assert!(
        report
            .find(&["generators", "basedOnLesson", "lookup"])
            .is_some()
    );
}

#[tokio::test]
async fn test_detached_task_records_without_span() {
    let task = Task::detached();
    assert!(task.path().is_empty());

    let out = task
        .child("work", |t| async move {
            assert_eq!(t.path(), ["work".to_string()]);
            Ok::<_, anyhow::Error>("done")
        })
        .await
        .unwrap();

    assert_eq!(out, "done");
    assert_eq!(
        task.snapshot().child("work").map(|n| n.status),
        Some(NodeStatus::Complete)
    );
}
