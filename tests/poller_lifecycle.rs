//! End-to-end poller tests over a scripted host bridge.
//!
//! These exercise the full chain — poller -> facade -> bridge client ->
//! host module — with a paused tokio clock, so the 5000 ms poll cadence
//! is simulated rather than slept.

use async_trait::async_trait;
use conbridge::{
    BridgeModule, BridgeOp, CorrelationId, DetailsLevel, Error, HostBridge, QueryManager, Result,
    TaskPoller, TaskStatus,
};
use parking_lot::Mutex;
use serde_json::{json, Value};
use std::collections::{HashMap, HashSet, VecDeque};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

/// One recorded bridge call: which task was polled, under which
/// correlation id.
struct CallRecord {
    task_id: String,
    correlation_id: String,
}

/// Host module answering task-status queries from per-task scripts.
///
/// Each script entry is either a canned response or a rejection message;
/// entries are consumed in order, one per poll.
struct ScriptedHost {
    scripts: Mutex<HashMap<String, VecDeque<std::result::Result<Value, String>>>>,
    calls: Mutex<Vec<CallRecord>>,
}

impl ScriptedHost {
    fn new() -> Arc<Self> {
        Arc::new(Self {
            scripts: Mutex::new(HashMap::new()),
            calls: Mutex::new(Vec::new()),
        })
    }

    fn script(&self, task_id: &str, steps: Vec<std::result::Result<Value, String>>) {
        self.scripts
            .lock()
            .insert(task_id.to_string(), steps.into_iter().collect());
    }

    fn polls_for(&self, task_id: &str) -> usize {
        self.calls
            .lock()
            .iter()
            .filter(|call| call.task_id == task_id)
            .count()
    }

    fn correlation_ids_for(&self, task_id: &str) -> Vec<String> {
        self.calls
            .lock()
            .iter()
            .filter(|call| call.task_id == task_id)
            .map(|call| call.correlation_id.clone())
            .collect()
    }
}

#[async_trait]
impl BridgeModule for ScriptedHost {
    async fn invoke(
        &self,
        op: BridgeOp,
        args: Vec<Value>,
        correlation_id: &CorrelationId,
        _alt_module_path: Option<&str>,
    ) -> Result<Value> {
        assert_eq!(op, BridgeOp::Query, "poller must only issue queries");
        assert_eq!(args[0], "show-task");

        let task_id = args[1]["task-id"]
            .as_str()
            .expect("task-id missing from poll params")
            .to_string();

        self.calls.lock().push(CallRecord {
            task_id: task_id.clone(),
            correlation_id: correlation_id.as_str().to_string(),
        });

        let step = self
            .scripts
            .lock()
            .get_mut(&task_id)
            .unwrap_or_else(|| panic!("no script for task {task_id}"))
            .pop_front()
            .unwrap_or_else(|| panic!("script exhausted for task {task_id}"));

        step.map_err(|message| Error::Transport {
            op: "query",
            correlation_id: correlation_id.as_str().to_string(),
            message,
        })
    }

    async fn dispose(&self) -> Result<()> {
        Ok(())
    }
}

/// Environment whose module is the scripted host itself.
struct ScriptedEnv(Arc<ScriptedHost>);

#[async_trait]
impl HostBridge for ScriptedEnv {
    async fn load_module(&self) -> Result<Arc<dyn BridgeModule>> {
        Ok(self.0.clone())
    }

    fn has_host_marker(&self) -> bool {
        true
    }
}

/// Route poller logs through the test harness; `RUST_LOG` filters them.
fn init_tracing() {
    static INIT: std::sync::Once = std::sync::Once::new();
    INIT.call_once(|| {
        let _ = tracing_subscriber::fmt()
            .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
            .with_test_writer()
            .try_init();
    });
}

fn manager_for(host: &Arc<ScriptedHost>) -> Arc<QueryManager> {
    init_tracing();
    Arc::new(QueryManager::new(Arc::new(ScriptedEnv(host.clone()))))
}

fn status_response(task_id: &str, status: &str) -> std::result::Result<Value, String> {
    Ok(json!({ "tasks": [{ "task-id": task_id, "status": status }] }))
}

#[tokio::test(start_paused = true)]
async fn blocking_poll_loops_until_succeeded() {
    let host = ScriptedHost::new();
    host.script(
        "t1",
        vec![
            status_response("t1", "in progress"),
            status_response("t1", "in progress"),
            status_response("t1", "succeeded"),
        ],
    );

    let done = Arc::new(AtomicUsize::new(0));
    let done_counter = done.clone();
    let poller = TaskPoller::new(manager_for(&host)).on_done(move || {
        done_counter.fetch_add(1, Ordering::SeqCst);
    });

    let started = tokio::time::Instant::now();
    let outcome = poller
        .poll_with_status("t1", DetailsLevel::Standard, true)
        .await;

    assert_eq!(host.polls_for("t1"), 3, "exactly three polls");
    assert_eq!(
        started.elapsed(),
        Duration::from_millis(10_000),
        "two 5000 ms sleeps between the three polls"
    );
    assert_eq!(outcome.status, Some(TaskStatus::Succeeded));
    assert_eq!(outcome.task.unwrap()["status"], "succeeded");
    assert_eq!(done.load(Ordering::SeqCst), 1, "observer fires once");
}

#[tokio::test(start_paused = true)]
async fn blocking_poll_reports_failed_terminal() {
    let host = ScriptedHost::new();
    host.script(
        "t2",
        vec![
            status_response("t2", "in progress"),
            status_response("t2", "failed"),
        ],
    );

    let poller = TaskPoller::new(manager_for(&host));
    let outcome = poller
        .poll_with_status("t2", DetailsLevel::Standard, true)
        .await;

    assert_eq!(host.polls_for("t2"), 2);
    assert_eq!(outcome.status, Some(TaskStatus::Failed));
    assert_eq!(outcome.task.unwrap()["task-id"], "t2");
}

#[tokio::test]
async fn non_blocking_poll_issues_exactly_one_poll() {
    let host = ScriptedHost::new();
    host.script("t3", vec![status_response("t3", "in progress")]);

    let poller = TaskPoller::new(manager_for(&host));
    let outcome = poller
        .poll_with_status("t3", DetailsLevel::Standard, false)
        .await;

    assert_eq!(host.polls_for("t3"), 1);
    // Non-terminal, yet still returned to the caller.
    assert_eq!(outcome.status, Some(TaskStatus::InProgress));
    assert_eq!(outcome.task.unwrap()["status"], "in progress");
}

#[tokio::test]
async fn failed_poll_aborts_without_retry() {
    let host = ScriptedHost::new();
    host.script("t4", vec![Err("host rejected the call".to_string())]);

    let done = Arc::new(AtomicUsize::new(0));
    let done_counter = done.clone();
    let poller = TaskPoller::new(manager_for(&host)).on_done(move || {
        done_counter.fetch_add(1, Ordering::SeqCst);
    });

    let outcome = poller
        .poll_with_status("t4", DetailsLevel::Standard, true)
        .await;

    assert_eq!(host.polls_for("t4"), 1, "no second attempt after a failure");
    assert!(outcome.task.is_none());
    assert!(outcome.status.is_none());
    assert_eq!(
        done.load(Ordering::SeqCst),
        1,
        "observer fires on the abort path too"
    );
}

#[tokio::test(start_paused = true)]
async fn failure_mid_loop_aborts() {
    let host = ScriptedHost::new();
    host.script(
        "t5",
        vec![
            status_response("t5", "in progress"),
            Err("session expired".to_string()),
        ],
    );

    let poller = TaskPoller::new(manager_for(&host));
    let outcome = poller
        .poll_with_status("t5", DetailsLevel::Standard, true)
        .await;

    assert_eq!(host.polls_for("t5"), 2);
    assert!(outcome.task.is_none());
    assert!(outcome.status.is_none());
}

#[tokio::test]
async fn observer_fires_once_on_unknown_status() {
    let host = ScriptedHost::new();
    host.script("t6", vec![status_response("t6", "enqueued")]);

    let done = Arc::new(AtomicUsize::new(0));
    let done_counter = done.clone();
    let poller = TaskPoller::new(manager_for(&host)).on_done(move || {
        done_counter.fetch_add(1, Ordering::SeqCst);
    });

    let outcome = poller
        .poll_with_status("t6", DetailsLevel::Standard, true)
        .await;

    // Unknown text maps to nothing, but the raw payload survives.
    assert!(outcome.status.is_none());
    assert_eq!(outcome.task.unwrap()["status"], "enqueued");
    assert_eq!(done.load(Ordering::SeqCst), 1);
}

#[tokio::test(start_paused = true)]
async fn concurrent_pollers_do_not_share_state() {
    let host = ScriptedHost::new();
    host.script(
        "left",
        vec![
            status_response("left", "in progress"),
            status_response("left", "succeeded"),
        ],
    );
    host.script(
        "right",
        vec![
            status_response("right", "in progress"),
            status_response("right", "in progress"),
            status_response("right", "failed"),
        ],
    );

    let manager = manager_for(&host);
    let left_poller = TaskPoller::new(manager.clone());
    let right_poller = TaskPoller::new(manager);

    let (left, right) = futures::join!(
        left_poller.poll_with_status("left", DetailsLevel::Standard, true),
        right_poller.poll_with_status("right", DetailsLevel::Standard, true),
    );

    assert_eq!(left.status, Some(TaskStatus::Succeeded));
    assert_eq!(left.task.unwrap()["task-id"], "left");
    assert_eq!(right.status, Some(TaskStatus::Failed));
    assert_eq!(right.task.unwrap()["task-id"], "right");

    assert_eq!(host.polls_for("left"), 2);
    assert_eq!(host.polls_for("right"), 3);

    // Every call carried its own correlation id; none leaked between
    // the two invocations.
    let mut all_ids: Vec<String> = host.correlation_ids_for("left");
    all_ids.extend(host.correlation_ids_for("right"));
    let unique: HashSet<&String> = all_ids.iter().collect();
    assert_eq!(unique.len(), all_ids.len(), "correlation ids must be unique");
}

#[tokio::test(start_paused = true)]
async fn custom_interval_drives_cadence() {
    let host = ScriptedHost::new();
    host.script(
        "t7",
        vec![
            status_response("t7", "in progress"),
            status_response("t7", "succeeded"),
        ],
    );

    let poller = TaskPoller::new(manager_for(&host)).with_interval(Duration::from_millis(250));

    let started = tokio::time::Instant::now();
    let outcome = poller
        .poll_with_status("t7", DetailsLevel::Standard, true)
        .await;

    assert_eq!(started.elapsed(), Duration::from_millis(250));
    assert_eq!(outcome.status, Some(TaskStatus::Succeeded));
}
