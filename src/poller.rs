//! Task poller: drives task-status queries until a terminal status is
//! observed.
//!
//! # State machine
//!
//! ```text
//! Initiated -> Polling (status = in progress, blocking mode)
//! Initiated | Polling -> Succeeded | Failed   (status-derived terminals)
//! Initiated | Polling -> Aborted              (transport/host failure)
//! ```
//!
//! A failed poll is never retried: one failure aborts the whole
//! invocation and reports an absent pair. The blocking loop itself is
//! unbounded — no iteration cap, no timeout, no cancellation handle —
//! and relies on the host eventually reaching a terminal status.
//! Callers that need a bound can use non-blocking mode and schedule
//! their own cadence.

use serde_json::Value;
use std::sync::Arc;
use std::time::Duration;
use tokio::time::sleep;
use tracing::{debug, error};

use crate::query::QueryManager;
use crate::types::{DetailsLevel, PollOutcome, QueryRequest, TaskStatus, TaskView};

/// Fixed delay between two polls of the same invocation.
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_millis(5000);

/// Single-subscriber completion observer, invoked synchronously once per
/// poller invocation.
pub type DoneObserver = Box<dyn Fn() + Send + Sync>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum PollState {
    Initiated,
    Polling,
    Succeeded,
    Failed,
    Aborted,
}

/// Polls a task id through the query facade until done.
///
/// Within one invocation polls are strictly sequential: the next poll is
/// only issued after the previous response was observed. Separate
/// invocations (even on the same poller) share no mutable state and may
/// interleave freely at the bridge.
///
/// # Examples
///
/// ```rust,ignore
/// use std::sync::Arc;
/// use conbridge::{DetailsLevel, TaskPoller};
///
/// let poller = TaskPoller::new(manager).on_done(|| println!("task settled"));
/// let outcome = poller
///     .poll_with_status("task-uid", DetailsLevel::Standard, true)
///     .await;
/// ```
pub struct TaskPoller {
    manager: Arc<QueryManager>,
    interval: Duration,
    on_done: Option<DoneObserver>,
}

impl std::fmt::Debug for TaskPoller {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TaskPoller")
            .field("interval", &self.interval)
            .field("has_observer", &self.on_done.is_some())
            .finish()
    }
}

impl TaskPoller {
    /// Create a poller over the given facade with the default 5000 ms
    /// interval and no observer.
    pub fn new(manager: Arc<QueryManager>) -> Self {
        Self {
            manager,
            interval: DEFAULT_POLL_INTERVAL,
            on_done: None,
        }
    }

    /// Override the delay between polls.
    pub fn with_interval(mut self, interval: Duration) -> Self {
        self.interval = interval;
        self
    }

    /// Subscribe the single completion observer. It fires exactly once
    /// per invocation, after the state machine settles — terminal,
    /// unknown-status, and aborted paths alike.
    pub fn on_done(mut self, observer: impl Fn() + Send + Sync + 'static) -> Self {
        self.on_done = Some(Box::new(observer));
        self
    }

    /// Poll the task and return both the raw payload and the mapped
    /// status.
    ///
    /// In blocking mode (`wait = true`) the loop re-polls every interval
    /// for as long as the host reports the in-progress wire status. With
    /// `wait = false` exactly one poll is issued and whatever it showed
    /// is returned, terminal or not.
    pub async fn poll_with_status(
        &self,
        task_id: &str,
        details_level: DetailsLevel,
        wait: bool,
    ) -> PollOutcome {
        let outcome = self.run(task_id, details_level, wait).await;

        if let Some(observer) = &self.on_done {
            observer();
        }

        outcome
    }

    /// Poll the task, discarding the mapped status.
    pub async fn poll(
        &self,
        task_id: &str,
        details_level: DetailsLevel,
        wait: bool,
    ) -> Option<Value> {
        self.poll_with_status(task_id, details_level, wait)
            .await
            .task
    }

    async fn run(&self, task_id: &str, details_level: DetailsLevel, wait: bool) -> PollOutcome {
        let mut state = PollState::Initiated;

        let view = loop {
            // A request is immutable once built, so each poll shapes a
            // fresh one.
            let request = QueryRequest::task_status(task_id, details_level);

            let response = match self.manager.task_status_raw(request).await {
                Ok(response) => response,
                Err(e) => {
                    state = PollState::Aborted;
                    error!(task_id, state = ?state, error = %e, "task poll aborted");
                    return PollOutcome::absent();
                }
            };

            // Absent or malformed response: status stays empty and the
            // loop exits non-terminal with unknown status.
            let view = TaskView::from_response(&response);

            let in_progress = view
                .as_ref()
                .is_some_and(|v| v.status_text() == TaskStatus::InProgress.as_wire_str());

            if wait && in_progress {
                state = PollState::Polling;
                sleep(self.interval).await;
                continue;
            }

            break view;
        };

        let status = view.as_ref().and_then(TaskView::status);
        state = match status {
            Some(TaskStatus::Succeeded) => PollState::Succeeded,
            Some(TaskStatus::Failed) => PollState::Failed,
            _ => state,
        };
        debug!(task_id, state = ?state, ?status, "task poll finished");

        PollOutcome {
            task: view.map(TaskView::into_payload),
            status,
        }
    }
}
