//! Query facade: one request shape per catalogued query kind, with the
//! divergent error policy between read and write paths.
//!
//! Read queries degrade quietly: any failure is logged and the caller
//! gets `None`, so demo-level UIs built on top never have to branch on
//! transport faults (they cannot tell "no data" from "error" without
//! the logs — a deliberate trade-off). Write and identity operations
//! (`request_commit`, `get_context`, navigation) log AND re-raise,
//! because silently dropping a commit is never acceptable.

use serde_json::Value;
use std::sync::Arc;
use tracing::error;

use crate::bridge::{BridgeClient, HostBridge};
use crate::error::Result;
use crate::types::{DetailsLevel, QueryRequest};

/// Translates domain-level requests into generic bridge invokes.
///
/// # Examples
///
/// ```rust,ignore
/// use std::sync::Arc;
/// use conbridge::{DetailsLevel, QueryManager};
///
/// let manager = QueryManager::new(host);
/// if let Some(object) = manager.get_object("uid-1", DetailsLevel::Standard).await {
///     // render it
/// }
/// ```
#[derive(Debug)]
pub struct QueryManager {
    client: BridgeClient,
}

impl QueryManager {
    /// Create a facade over a fresh [`BridgeClient`] for the given host.
    pub fn new(host: Arc<dyn HostBridge>) -> Self {
        Self {
            client: BridgeClient::new(host),
        }
    }

    /// Create a facade over an existing client.
    pub fn with_client(client: BridgeClient) -> Self {
        Self { client }
    }

    /// The underlying bridge client.
    pub fn client(&self) -> &BridgeClient {
        &self.client
    }

    /// Retrieve one object by uid. Failures are logged and reported as
    /// `None`.
    pub async fn get_object(&self, uid: &str, details_level: DetailsLevel) -> Option<Value> {
        match self
            .client
            .query(QueryRequest::object_by_id(uid, details_level))
            .await
        {
            Ok(response) => Some(response),
            Err(e) => {
                error!(uid, error = %e, "failed to get object");
                None
            }
        }
    }

    /// Retrieve objects by name. `None` type falls back to the generic
    /// object type. Failures are logged and reported as `None`.
    pub async fn get_objects_by_name(
        &self,
        name: &str,
        obj_type: Option<&str>,
        details_level: DetailsLevel,
    ) -> Option<Value> {
        match self
            .client
            .query(QueryRequest::objects_by_name(name, obj_type, details_level))
            .await
        {
            Ok(response) => Some(response),
            Err(e) => {
                error!(name, error = %e, "failed to get objects");
                None
            }
        }
    }

    /// Retrieve objects tagged with the given tag. Failures are logged
    /// and reported as `None`.
    pub async fn get_objects_by_tag(
        &self,
        tag: &str,
        obj_type: Option<&str>,
        details_level: DetailsLevel,
    ) -> Option<Value> {
        match self
            .client
            .query(QueryRequest::objects_by_tag(tag, obj_type, details_level))
            .await
        {
            Ok(response) => Some(response),
            Err(e) => {
                error!(tag, error = %e, "failed to get objects");
                None
            }
        }
    }

    /// Retrieve all tags. Failures are logged and reported as `None`.
    pub async fn get_tags(&self, details_level: DetailsLevel) -> Option<Value> {
        match self.client.query(QueryRequest::all_tags(details_level)).await {
            Ok(response) => Some(response),
            Err(e) => {
                error!(error = %e, "failed to get tags");
                None
            }
        }
    }

    /// One task-status poll. Unlike the public read paths this
    /// propagates failure, so the poller can tell a transport abort
    /// apart from a present-but-shapeless response.
    pub(crate) async fn task_status_raw(&self, request: QueryRequest) -> Result<Value> {
        self.client.query(request).await
    }

    /// Ask the user to approve and execute the given commands. Failures
    /// are logged and re-raised.
    pub async fn request_commit(&self, commands: &[String]) -> Result<Value> {
        self.client
            .request_commit(commands)
            .await
            .inspect_err(|e| error!(error = %e, "request commit failed"))
    }

    /// Retrieve the extension context provided by the host. Failures
    /// are logged and re-raised.
    pub async fn get_context(&self) -> Result<Value> {
        self.client
            .get_context()
            .await
            .inspect_err(|e| error!(error = %e, "failed to get context"))
    }

    /// Navigate the host UI to the object with the given uid.
    pub async fn navigate(&self, uid: &str) -> Result<()> {
        self.client
            .navigate(uid)
            .await
            .inspect_err(|e| error!(uid, error = %e, "navigate failed"))
    }

    /// Request the host to close the extension window.
    pub async fn close_window(&self) -> Result<()> {
        self.client
            .close_window()
            .await
            .inspect_err(|e| error!(error = %e, "close window failed"))
    }

    /// The execution environment's identity string. Failures propagate.
    pub async fn user_agent(&self) -> Result<String> {
        self.client.user_agent().await
    }

    /// Whether the extension runs inside the expected host. Never fails.
    pub fn is_host_mode(&self) -> bool {
        self.client.is_host_mode()
    }

    /// The alternate interaction-module path, if set.
    pub fn alt_module_path(&self) -> Option<String> {
        self.client.alt_module_path()
    }

    /// Set the alternate interaction-module path forwarded on every
    /// bridge invoke.
    pub fn set_alt_module_path(&self, path: impl Into<String>) {
        self.client.set_alt_module_path(path);
    }
}
