//! Query catalog: request kinds, per-kind parameter shaping, and the
//! per-call correlation id.

use serde::{Deserialize, Serialize};
use serde_json::{json, Map, Value};
use std::fmt;
use uuid::Uuid;

use super::details::DetailsLevel;

/// Membership-filter marker selecting lookup by object name.
pub const MEMBERSHIP_BY_NAME: &str = "name";

/// Membership-filter marker selecting lookup by tag.
pub const MEMBERSHIP_BY_TAG: &str = "tags";

/// Object type used when the caller does not narrow the query.
pub const DEFAULT_OBJECT_TYPE: &str = "object";

/// Opaque unique token generated per bridge call.
///
/// Scope is a single call: a fresh id is generated for every invoke,
/// never reused and never persisted. The host uses it to associate a
/// request with its eventual reply when calls interleave.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CorrelationId(String);

impl CorrelationId {
    /// Generates a fresh id.
    pub fn generate() -> Self {
        Self(Uuid::new_v4().to_string())
    }

    /// The id in its wire form.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for CorrelationId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// The fixed catalog of query kinds the host understands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum QueryKind {
    /// A single object by uid.
    ObjectById,
    /// Objects matching a name filter.
    ObjectsByName,
    /// Objects carrying a tag.
    ObjectsByTag,
    /// All tags.
    AllTags,
    /// Status of a server-side task.
    TaskStatus,
}

impl QueryKind {
    /// The query request id sent over the bridge. The two membership
    /// queries share one id; they differ only in the filter marker.
    pub fn wire_id(self) -> &'static str {
        match self {
            Self::ObjectById => "show-object",
            Self::ObjectsByName | Self::ObjectsByTag => "show-objects",
            Self::AllTags => "show-tags",
            Self::TaskStatus => "show-task",
        }
    }
}

/// A query kind plus its kind-specific named parameters.
///
/// Immutable once built; constructed fresh for every call. The builders
/// below are the only way to obtain one, so a request's parameter shape
/// always matches its kind.
///
/// # Examples
///
/// ```
/// use conbridge::{DetailsLevel, QueryKind, QueryRequest};
///
/// let request = QueryRequest::objects_by_name("fw1", Some("gateway"), DetailsLevel::Full);
/// assert_eq!(request.kind(), QueryKind::ObjectsByName);
/// assert_eq!(request.params()["in"][0], "name");
/// assert_eq!(request.params()["in"][1], "fw1");
/// assert_eq!(request.params()["type"], "gateway");
/// ```
#[derive(Debug, Clone)]
pub struct QueryRequest {
    kind: QueryKind,
    params: Map<String, Value>,
}

impl QueryRequest {
    /// Request one object by uid.
    pub fn object_by_id(uid: &str, details_level: DetailsLevel) -> Self {
        let mut params = Map::new();
        params.insert("uid".to_string(), json!(uid));
        params.insert(
            "details-level".to_string(),
            json!(details_level.as_wire_str()),
        );

        Self {
            kind: QueryKind::ObjectById,
            params,
        }
    }

    /// Request objects by name. A `None` type falls back to
    /// [`DEFAULT_OBJECT_TYPE`].
    pub fn objects_by_name(
        name: &str,
        obj_type: Option<&str>,
        details_level: DetailsLevel,
    ) -> Self {
        Self::membership_query(
            QueryKind::ObjectsByName,
            MEMBERSHIP_BY_NAME,
            name,
            obj_type,
            details_level,
        )
    }

    /// Request objects tagged with the given tag. A `None` type falls
    /// back to [`DEFAULT_OBJECT_TYPE`].
    pub fn objects_by_tag(tag: &str, obj_type: Option<&str>, details_level: DetailsLevel) -> Self {
        Self::membership_query(
            QueryKind::ObjectsByTag,
            MEMBERSHIP_BY_TAG,
            tag,
            obj_type,
            details_level,
        )
    }

    /// Request all tags.
    pub fn all_tags(details_level: DetailsLevel) -> Self {
        let mut params = Map::new();
        params.insert(
            "details-level".to_string(),
            json!(details_level.as_wire_str()),
        );

        Self {
            kind: QueryKind::AllTags,
            params,
        }
    }

    /// Request the status of a server-side task.
    pub fn task_status(task_id: &str, details_level: DetailsLevel) -> Self {
        let mut params = Map::new();
        params.insert("task-id".to_string(), json!(task_id));
        params.insert(
            "details-level".to_string(),
            json!(details_level.as_wire_str()),
        );

        Self {
            kind: QueryKind::TaskStatus,
            params,
        }
    }

    fn membership_query(
        kind: QueryKind,
        marker: &str,
        value: &str,
        obj_type: Option<&str>,
        details_level: DetailsLevel,
    ) -> Self {
        let mut params = Map::new();
        params.insert("in".to_string(), json!([marker, value]));
        params.insert(
            "type".to_string(),
            json!(obj_type.unwrap_or(DEFAULT_OBJECT_TYPE)),
        );
        params.insert(
            "details-level".to_string(),
            json!(details_level.as_wire_str()),
        );

        Self { kind, params }
    }

    /// The kind this request was built for.
    pub fn kind(&self) -> QueryKind {
        self.kind
    }

    /// The named parameters, shaped for this kind.
    pub fn params(&self) -> &Map<String, Value> {
        &self.params
    }

    /// Consumes the request, yielding the parameters as a JSON object.
    pub fn into_params(self) -> Value {
        Value::Object(self.params)
    }
}
