//! Async bridge client SDK for security-management console extensions.
//!
//! Browser-hosted extension code talks to its management host through an
//! asynchronous message bridge. This crate wraps that bridge in a typed
//! Rust surface: catalogued read/query operations, write/commit
//! operations requiring user approval, host-presence probing, and a
//! polling state machine that tracks long-running server-side tasks to
//! completion.
//!
//! # Overview
//!
//! Three components, leaf first:
//!
//! - [`BridgeClient`] owns the single lazily-established channel to the
//!   host and executes named operations, each stamped with a fresh
//!   [`CorrelationId`]. It never swallows errors.
//! - [`QueryManager`] shapes one request per catalogued query kind and
//!   applies the divergent error policy: read paths log failures and return
//!   `None`, write/identity paths log and re-raise.
//! - [`TaskPoller`] repeatedly issues the task-status query until a
//!   terminal [`TaskStatus`] is observed (or once, in non-blocking
//!   mode), then notifies its single completion observer.
//!
//! The host side is injected through the [`HostBridge`] and
//! [`BridgeModule`] traits, so tests and demo environments substitute
//! scripted implementations.
//!
//! # Module Organization
//!
//! - [`bridge`] - The bridge client and host boundary traits
//! - [`query`] - The query facade
//! - [`poller`] - The task-completion poller
//! - [`types`] - Wire types (details level, task status, query catalog)
//! - [`error`] - Crate error taxonomy

#![warn(missing_docs)]
#![forbid(unsafe_code)]

pub mod bridge;
pub mod error;
pub mod poller;
pub mod query;
pub mod types;

pub use bridge::{BridgeClient, BridgeModule, BridgeOp, HostBridge};
pub use error::{Error, Result};
pub use poller::{DoneObserver, TaskPoller, DEFAULT_POLL_INTERVAL};
pub use query::QueryManager;
pub use types::{
    CorrelationId, DetailsLevel, PollOutcome, QueryKind, QueryRequest, TaskStatus, TaskView,
    DEFAULT_OBJECT_TYPE, MEMBERSHIP_BY_NAME, MEMBERSHIP_BY_TAG,
};
