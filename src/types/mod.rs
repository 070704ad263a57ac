//! Wire types shared across the bridge client, query facade, and task
//! poller.

pub mod details;
pub mod query;
pub mod task;

pub use details::DetailsLevel;
pub use query::{
    CorrelationId, QueryKind, QueryRequest, DEFAULT_OBJECT_TYPE, MEMBERSHIP_BY_NAME,
    MEMBERSHIP_BY_TAG,
};
pub use task::{PollOutcome, TaskStatus, TaskView};
