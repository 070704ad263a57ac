//! Task status wire type and the per-poll task view.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;

use crate::error::Error;

/// Status of a server-side task as reported by the host.
///
/// Terminal states are `Succeeded` and `Failed`; `InProgress` keeps a
/// blocking poll loop running. Unlike [`DetailsLevel`], this table is
/// straight: each variant maps to the obvious wire string.
///
/// [`DetailsLevel`]: crate::DetailsLevel
///
/// # Examples
///
/// ```
/// use conbridge::TaskStatus;
///
/// assert_eq!(TaskStatus::InProgress.as_wire_str(), "in progress");
/// assert!(!TaskStatus::InProgress.is_terminal());
/// assert!(TaskStatus::Succeeded.is_terminal());
/// assert_eq!(TaskStatus::from_wire_str("failed"), Some(TaskStatus::Failed));
/// assert_eq!(TaskStatus::from_wire_str("queued"), None);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TaskStatus {
    /// Task is still being processed.
    #[serde(rename = "in progress")]
    InProgress,
    /// Task completed successfully (terminal).
    #[serde(rename = "succeeded")]
    Succeeded,
    /// Task failed (terminal).
    #[serde(rename = "failed")]
    Failed,
}

impl TaskStatus {
    /// All members, in table order.
    pub const ALL: [Self; 3] = [Self::InProgress, Self::Succeeded, Self::Failed];

    /// Returns the wire string the host uses for this status.
    pub fn as_wire_str(self) -> &'static str {
        match self {
            Self::InProgress => "in progress",
            Self::Succeeded => "succeeded",
            Self::Failed => "failed",
        }
    }

    /// Maps a raw status string to the enum by linear lookup over the
    /// table, `None` if the text is not in it.
    pub fn from_wire_str(s: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|status| status.as_wire_str() == s)
    }

    /// Returns `true` if no further status change is expected.
    pub fn is_terminal(self) -> bool {
        matches!(self, Self::Succeeded | Self::Failed)
    }
}

impl fmt::Display for TaskStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_wire_str())
    }
}

/// Ephemeral view over one poll's response.
///
/// Holds the first element of the response's `tasks` list plus the raw
/// status text. A view lives for one poll cycle and is replaced, not
/// mutated, by the next; the final view's payload is handed to the
/// caller, who becomes its sole owner.
#[derive(Debug, Clone)]
pub struct TaskView {
    payload: Value,
    status_text: String,
}

impl TaskView {
    /// Extracts the task view from a query response.
    ///
    /// Returns `None` when the response has no `tasks` list or the list
    /// is empty. A task element without a string `status` field still
    /// yields a view, with empty status text, so the raw payload is not
    /// lost to a shape defect in one field.
    pub fn from_response(response: &Value) -> Option<Self> {
        let task = response.get("tasks")?.get(0)?;
        let status_text = task
            .get("status")
            .and_then(Value::as_str)
            .unwrap_or_default()
            .to_string();

        Some(Self {
            payload: task.clone(),
            status_text,
        })
    }

    /// Raw status text as the host sent it; empty if absent.
    pub fn status_text(&self) -> &str {
        &self.status_text
    }

    /// The status mapped into the closed table, `None` if unmapped.
    pub fn status(&self) -> Option<TaskStatus> {
        TaskStatus::from_wire_str(&self.status_text)
    }

    /// Like [`status`](Self::status), but an unknown status becomes an
    /// [`Error::UnmappedStatus`] carrying the raw text. The poller
    /// itself reports `None` instead; this is for callers that want to
    /// surface the offending text.
    pub fn try_status(&self) -> Result<TaskStatus, Error> {
        self.status().ok_or_else(|| Error::UnmappedStatus {
            status: self.status_text.clone(),
        })
    }

    /// Consumes the view, yielding the raw task payload.
    pub fn into_payload(self) -> Value {
        self.payload
    }
}

/// Outcome of one poller invocation: the raw task payload (if any poll
/// produced one) and the mapped status (if the final status text was in
/// the table).
#[derive(Debug, Clone, Default)]
pub struct PollOutcome {
    /// Raw task payload from the last successful poll.
    pub task: Option<Value>,
    /// Final status mapped into the closed table.
    pub status: Option<TaskStatus>,
}

impl PollOutcome {
    /// An outcome with neither payload nor status, reported when the
    /// first poll aborts.
    pub fn absent() -> Self {
        Self::default()
    }
}
