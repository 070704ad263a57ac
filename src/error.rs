//! Error types for bridge and query operations.
//!
//! Provides [`Error`], the crate-wide error enum, and the [`Result`]
//! alias. Variants carry context (operation name, correlation id) to aid
//! debugging, since the host gives little more than a rejection message.

use thiserror::Error;

/// Result alias used throughout the crate.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while talking to the host bridge.
///
/// The read-side query facade swallows these (logging them and returning
/// `None`); write and identity operations propagate them to the caller.
///
/// # Examples
///
/// ```
/// use conbridge::Error;
///
/// let err = Error::Transport {
///     op: "requestCommit",
///     correlation_id: "b49f65a1".to_string(),
///     message: "user declined".to_string(),
/// };
/// assert!(err.to_string().contains("requestCommit"));
/// ```
#[derive(Debug, Error)]
pub enum Error {
    /// The bridge channel could never be established. Every operation
    /// that depends on the channel fails with this once lazy
    /// initialization has failed.
    #[error("bridge channel unavailable: {reason}")]
    ChannelUnavailable {
        /// Why the channel could not be established.
        reason: String,
    },

    /// The host rejected a specific call. No local timeout is enforced,
    /// so this only ever reflects a host-side rejection.
    #[error("host rejected {op} (correlation {correlation_id}): {message}")]
    Transport {
        /// Wire name of the bridge operation that failed.
        op: &'static str,
        /// Correlation id of the failed call.
        correlation_id: String,
        /// Rejection message from the host.
        message: String,
    },

    /// A response arrived but expected fields were absent.
    #[error("malformed response: {context}")]
    MalformedResponse {
        /// What was being looked for when the shape check failed.
        context: String,
    },

    /// A task status string outside the known table. Produced by
    /// [`TaskView::try_status`](crate::TaskView::try_status); the poller
    /// reports an absent status instead of this.
    #[error("unmapped task status: {status:?}")]
    UnmappedStatus {
        /// The raw status text the host returned.
        status: String,
    },
}

impl Error {
    /// Returns `true` if this error means the channel itself is down,
    /// as opposed to a single call having failed.
    pub fn is_channel_unavailable(&self) -> bool {
        matches!(self, Self::ChannelUnavailable { .. })
    }
}
