//! The bridge client: the sole channel between extension code and the
//! management host.
//!
//! The host side is abstracted behind two traits. [`HostBridge`] stands
//! for the hosting environment itself (it can load the interaction
//! module and answer the host-marker probe); [`BridgeModule`] is the
//! loaded module through which every named operation travels. Both are
//! injected, so tests substitute scripted implementations and the crate
//! never owns a real socket or script engine.
//!
//! [`BridgeClient`] lazily loads the module exactly once per client,
//! stamps every call with a fresh [`CorrelationId`], and forwards the
//! optional alternate module path used for demo/test substitution. It
//! never swallows errors: failures are logged and re-raised, and the
//! decision to degrade quietly belongs to the query facade one layer up.

use async_trait::async_trait;
use parking_lot::RwLock;
use serde_json::{json, Value};
use std::sync::Arc;
use tokio::sync::OnceCell;
use tracing::{debug, error};

use crate::error::{Error, Result};
use crate::types::{CorrelationId, QueryRequest};

/// The named operations the host exposes over the bridge.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BridgeOp {
    /// Execute a catalogued query against the management API.
    Query,
    /// Fetch the extension's execution context.
    GetContext,
    /// Ask the user to approve and execute a list of commands.
    RequestCommit,
    /// Navigate the host UI to an object.
    Navigate,
    /// Close the extension window.
    CloseWindow,
    /// Fetch the execution environment's identity string.
    GetUserAgent,
}

impl BridgeOp {
    /// Wire name of the exported host function for this operation.
    pub fn wire_name(self) -> &'static str {
        match self {
            Self::Query => "query",
            Self::GetContext => "getContextObject",
            Self::RequestCommit => "requestCommit",
            Self::Navigate => "navigate",
            Self::CloseWindow => "closeExtensionWindow",
            Self::GetUserAgent => "getUserAgent",
        }
    }
}

/// The loaded interaction module.
///
/// One invoke maps to one asynchronous host round trip. Implementations
/// must tolerate interleaved calls from independent call sites; replies
/// are matched to requests by correlation id alone.
#[async_trait]
pub trait BridgeModule: Send + Sync {
    /// Invoke a named operation with positional arguments.
    async fn invoke(
        &self,
        op: BridgeOp,
        args: Vec<Value>,
        correlation_id: &CorrelationId,
        alt_module_path: Option<&str>,
    ) -> Result<Value>;

    /// Release the underlying module reference.
    async fn dispose(&self) -> Result<()>;
}

/// The hosting environment around the extension.
#[async_trait]
pub trait HostBridge: Send + Sync {
    /// Establish the channel by loading the interaction module.
    ///
    /// Called at most once per [`BridgeClient`]; the result (success or
    /// failure) is memoized there.
    async fn load_module(&self) -> Result<Arc<dyn BridgeModule>>;

    /// Whether the host-injected global marker is present, i.e. the
    /// extension runs inside the expected host. Pure query, never fails.
    fn has_host_marker(&self) -> bool;
}

/// Client owning the single lazily-established channel to the host.
///
/// The module is loaded on first use and reused for the life of the
/// client; a load failure is memoized too, so every dependent operation
/// afterwards fails with [`Error::ChannelUnavailable`]. Call sites are
/// independent: each invoke gets its own correlation id and may overlap
/// with others at the bridge.
pub struct BridgeClient {
    host: Arc<dyn HostBridge>,
    // Memoizes the load outcome, not just the module: a failed load must
    // keep failing dependent calls instead of being retried.
    module: OnceCell<std::result::Result<Arc<dyn BridgeModule>, String>>,
    alt_module_path: RwLock<Option<String>>,
}

impl std::fmt::Debug for BridgeClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BridgeClient")
            .field("channel_established", &self.module.initialized())
            .field("alt_module_path", &*self.alt_module_path.read())
            .finish()
    }
}

impl BridgeClient {
    /// Create a client for the given host environment. The channel is
    /// not established until the first operation needs it.
    pub fn new(host: Arc<dyn HostBridge>) -> Self {
        Self {
            host,
            module: OnceCell::new(),
            alt_module_path: RwLock::new(None),
        }
    }

    /// The alternate interaction-module path, if set.
    pub fn alt_module_path(&self) -> Option<String> {
        self.alt_module_path.read().clone()
    }

    /// Set the alternate interaction-module path forwarded on every
    /// invoke. Used to substitute a demo module outside the real host.
    pub fn set_alt_module_path(&self, path: impl Into<String>) {
        *self.alt_module_path.write() = Some(path.into());
    }

    async fn ensure_module(&self) -> Result<Arc<dyn BridgeModule>> {
        let slot = self
            .module
            .get_or_init(|| async {
                match self.host.load_module().await {
                    Ok(module) => {
                        debug!("bridge channel established");
                        Ok(module)
                    }
                    // Keep the bare reason: rewrapping would nest one
                    // "channel unavailable" inside another.
                    Err(Error::ChannelUnavailable { reason }) => Err(reason),
                    Err(e) => Err(e.to_string()),
                }
            })
            .await;

        match slot {
            Ok(module) => Ok(module.clone()),
            Err(reason) => Err(Error::ChannelUnavailable {
                reason: reason.clone(),
            }),
        }
    }

    /// Invoke a named host operation with a fresh correlation id.
    ///
    /// Any failure — channel establishment or host rejection — is logged
    /// and re-raised to the caller. No local recovery happens here.
    pub async fn invoke(&self, op: BridgeOp, args: Vec<Value>) -> Result<Value> {
        let module = self.ensure_module().await.inspect_err(|e| {
            error!(op = op.wire_name(), error = %e, "bridge call failed");
        })?;

        let correlation_id = CorrelationId::generate();
        let alt_module_path = self.alt_module_path();

        module
            .invoke(op, args, &correlation_id, alt_module_path.as_deref())
            .await
            .inspect_err(|e| {
                error!(
                    op = op.wire_name(),
                    correlation = %correlation_id,
                    error = %e,
                    "bridge call failed"
                );
            })
    }

    /// Execute a catalogued query. Arguments on the wire are the query
    /// request id followed by the kind-specific parameter object.
    pub async fn query(&self, request: QueryRequest) -> Result<Value> {
        let wire_id = request.kind().wire_id();
        self.invoke(BridgeOp::Query, vec![json!(wire_id), request.into_params()])
            .await
    }

    /// Fetch the extension context provided by the host.
    pub async fn get_context(&self) -> Result<Value> {
        self.invoke(BridgeOp::GetContext, Vec::new()).await
    }

    /// Ask the user to approve and execute the given commands.
    ///
    /// An empty list passes through unchanged; the host is the arbiter
    /// of command validity.
    pub async fn request_commit(&self, commands: &[String]) -> Result<Value> {
        self.invoke(BridgeOp::RequestCommit, vec![json!(commands)])
            .await
    }

    /// Navigate the host UI to the object with the given uid.
    pub async fn navigate(&self, uid: &str) -> Result<()> {
        self.invoke(BridgeOp::Navigate, vec![json!(uid)]).await?;
        Ok(())
    }

    /// Request the host to close the extension window.
    pub async fn close_window(&self) -> Result<()> {
        self.invoke(BridgeOp::CloseWindow, Vec::new()).await?;
        Ok(())
    }

    /// The execution environment's identity string.
    pub async fn user_agent(&self) -> Result<String> {
        let value = self.invoke(BridgeOp::GetUserAgent, Vec::new()).await?;
        value
            .as_str()
            .map(str::to_string)
            .ok_or_else(|| Error::MalformedResponse {
                context: "user agent is not a string".to_string(),
            })
    }

    /// Whether the extension runs inside the expected host.
    pub fn is_host_mode(&self) -> bool {
        self.host.has_host_marker()
    }

    /// Tear down the module reference iff the channel was actually
    /// established; a no-op otherwise.
    pub async fn dispose(&self) -> Result<()> {
        if let Some(Ok(module)) = self.module.get() {
            module.dispose().await?;
        }
        Ok(())
    }
}
