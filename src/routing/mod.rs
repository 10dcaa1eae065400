mod connection_registry;
mod load_balancing;
mod routed_connection_manager;
mod routing_table_provider;
pub(crate) mod types;

use std::fmt::{Display, Formatter};

use crate::config::Database;
use crate::routing::types::BoltServer;

pub(crate) use connection_registry::ConnectionRegistry;
pub use load_balancing::round_robin_strategy::RoundRobinStrategy;
pub use routed_connection_manager::RoutedConnectionManager;
pub use routing_table_provider::ClusterRoutingTableProvider;
pub(crate) use routing_table_provider::RoutingTableProvider;

/// A cluster's routing table, as returned by `dbms.routing.getRoutingTable`: a TTL, the database
/// it applies to, and the set of READ/WRITE/ROUTE servers currently responsible for it.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct RoutingTable {
    pub(crate) ttl: u64,
    pub(crate) db: Option<Database>,
    pub(crate) servers: Vec<Server>,
}

impl RoutingTable {
    pub(crate) fn resolve(&self) -> Vec<BoltServer> {
        self.servers
            .iter()
            .flat_map(BoltServer::resolve)
            .collect::<Vec<BoltServer>>()
    }
}

/// One row of a [`RoutingTable`]: a role (`READ`, `WRITE` or `ROUTE`) and the addresses serving it.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Server {
    pub(crate) addresses: Vec<String>,
    pub(crate) role: String,
}

impl Display for RoutingTable {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "RoutingTable {{ ttl: {}, db: {:?}, servers: {} }}",
            self.ttl,
            self.db.clone(),
            self.servers
                .iter()
                .map(|s| s.addresses.join(", "))
                .collect::<Vec<String>>()
                .join(", ")
        )
    }
}
