//! Execution metadata attached to a finished query: counters, query plans, notifications.

use crate::messages::Success;
use crate::types::{BoltMap, BoltType};
use std::convert::TryFrom;

/// Where a query ran and which protocol version it spoke, taken from `HELLO`'s response.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ServerInfo {
    pub(crate) address: String,
    pub(crate) agent: Option<String>,
}

impl ServerInfo {
    pub fn address(&self) -> &str {
        &self.address
    }

    pub fn agent(&self) -> Option<&str> {
        self.agent.as_deref()
    }
}

/// A planner/runtime notification attached to a query result, e.g. an unused variable warning.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notification {
    code: String,
    title: String,
    description: String,
    severity: String,
}

impl Notification {
    pub fn code(&self) -> &str {
        &self.code
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    pub fn severity(&self) -> &str {
        &self.severity
    }
}

impl TryFrom<BoltType> for Notification {
    type Error = crate::errors::Error;

    fn try_from(value: BoltType) -> crate::errors::Result<Self> {
        let map = BoltMap::try_from(value)?;
        Ok(Notification {
            code: map.get("code").unwrap_or_default(),
            title: map.get("title").unwrap_or_default(),
            description: map.get("description").unwrap_or_default(),
            severity: map.get("severity").unwrap_or_default(),
        })
    }
}

/// Write-statistics for a query, e.g. nodes or relationships created/deleted.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Counters {
    nodes_created: i64,
    nodes_deleted: i64,
    relationships_created: i64,
    relationships_deleted: i64,
    properties_set: i64,
    labels_added: i64,
    labels_removed: i64,
    indexes_added: i64,
    indexes_removed: i64,
    constraints_added: i64,
    constraints_removed: i64,
    system_updates: i64,
}

impl Counters {
    pub fn contains_updates(&self) -> bool {
        *self != Counters::default()
    }

    pub fn nodes_created(&self) -> i64 {
        self.nodes_created
    }

    pub fn nodes_deleted(&self) -> i64 {
        self.nodes_deleted
    }

    pub fn relationships_created(&self) -> i64 {
        self.relationships_created
    }

    pub fn relationships_deleted(&self) -> i64 {
        self.relationships_deleted
    }

    pub fn properties_set(&self) -> i64 {
        self.properties_set
    }

    pub fn labels_added(&self) -> i64 {
        self.labels_added
    }

    pub fn labels_removed(&self) -> i64 {
        self.labels_removed
    }

    pub fn indexes_added(&self) -> i64 {
        self.indexes_added
    }

    pub fn indexes_removed(&self) -> i64 {
        self.indexes_removed
    }

    pub fn constraints_added(&self) -> i64 {
        self.constraints_added
    }

    pub fn constraints_removed(&self) -> i64 {
        self.constraints_removed
    }

    pub fn system_updates(&self) -> i64 {
        self.system_updates
    }
}

impl std::ops::AddAssign for Counters {
    fn add_assign(&mut self, other: Self) {
        self.nodes_created += other.nodes_created;
        self.nodes_deleted += other.nodes_deleted;
        self.relationships_created += other.relationships_created;
        self.relationships_deleted += other.relationships_deleted;
        self.properties_set += other.properties_set;
        self.labels_added += other.labels_added;
        self.labels_removed += other.labels_removed;
        self.indexes_added += other.indexes_added;
        self.indexes_removed += other.indexes_removed;
        self.constraints_added += other.constraints_added;
        self.constraints_removed += other.constraints_removed;
        self.system_updates += other.system_updates;
    }
}

impl From<BoltMap> for Counters {
    fn from(map: BoltMap) -> Self {
        Counters {
            nodes_created: map.get("nodes-created").unwrap_or_default(),
            nodes_deleted: map.get("nodes-deleted").unwrap_or_default(),
            relationships_created: map.get("relationships-created").unwrap_or_default(),
            relationships_deleted: map.get("relationships-deleted").unwrap_or_default(),
            properties_set: map.get("properties-set").unwrap_or_default(),
            labels_added: map.get("labels-added").unwrap_or_default(),
            labels_removed: map.get("labels-removed").unwrap_or_default(),
            indexes_added: map.get("indexes-added").unwrap_or_default(),
            indexes_removed: map.get("indexes-removed").unwrap_or_default(),
            constraints_added: map.get("constraints-added").unwrap_or_default(),
            constraints_removed: map.get("constraints-removed").unwrap_or_default(),
            system_updates: map.get("system-updates").unwrap_or_default(),
        }
    }
}

/// Execution metadata a server attaches to the final `SUCCESS` of a query: statement type,
/// write counters, the plan the planner chose (if `EXPLAIN`/`PROFILE`d), notifications, and the
/// bookmark to chain after this query.
#[derive(Debug, Clone)]
pub struct ResultSummary {
    query_type: Option<String>,
    counters: Counters,
    plan: Option<BoltMap>,
    profile: Option<BoltMap>,
    notifications: Vec<Notification>,
    bookmark: Option<String>,
    server: ServerInfo,
}

impl ResultSummary {
    pub(crate) fn new(success: &Success, server: ServerInfo) -> Self {
        let notifications = success
            .get::<crate::types::BoltList>("notifications")
            .map(|list| {
                list.into_iter()
                    .filter_map(|v| Notification::try_from(v).ok())
                    .collect()
            })
            .unwrap_or_default();

        ResultSummary {
            query_type: success.get("type"),
            counters: success
                .get::<BoltMap>("stats")
                .map(Counters::from)
                .unwrap_or_default(),
            plan: success.get("plan"),
            profile: success.get("profile"),
            notifications,
            bookmark: success.get("bookmark"),
            server,
        }
    }

    /// `"r"`, `"w"`, `"rw"` or `"s"` as reported by the server, if any.
    pub fn query_type(&self) -> Option<&str> {
        self.query_type.as_deref()
    }

    pub fn counters(&self) -> &Counters {
        &self.counters
    }

    /// The raw `EXPLAIN` plan tree, if the query was explained.
    pub fn plan(&self) -> Option<&BoltMap> {
        self.plan.as_ref()
    }

    /// The raw `PROFILE` tree, if the query was profiled.
    pub fn profile(&self) -> Option<&BoltMap> {
        self.profile.as_ref()
    }

    pub fn notifications(&self) -> &[Notification] {
        &self.notifications
    }

    pub fn bookmark(&self) -> Option<&str> {
        self.bookmark.as_deref()
    }

    pub fn server(&self) -> &ServerInfo {
        &self.server
    }
}
