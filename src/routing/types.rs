use crate::connection::NeoUrl;
use crate::pool::ConnectionPool;
use crate::routing::{RoutingTable, Server};
use crate::utils::ConcurrentHashMap;
use log::debug;
use std::hash::Hash;
use std::time::Duration;

/// Represents a Bolt server, with its address, port and role.
#[derive(Debug, Clone)]
pub(crate) struct BoltServer {
    pub(crate) address: String,
    pub(crate) port: u16,
    pub(crate) role: String,
}

impl BoltServer {
    pub(crate) fn resolve(server: &Server) -> Vec<Self> {
        server
            .addresses
            .iter()
            .filter_map(|address| match NeoUrl::parse(address) {
                Ok(addr) => Some(BoltServer {
                    address: addr.host().to_string(),
                    port: addr.port(),
                    role: server.role.to_string(),
                }),
                Err(e) => {
                    debug!("Ignoring unparseable server address {address} in routing table: {e}");
                    None
                }
            })
            .collect()
    }

    pub fn has_same_address(&self, other: &Self) -> bool {
        self.address == other.address && self.port == other.port
    }

    /// Parses the `host:port` form returned by [`crate::connection::Connection::address`] back
    /// into a lookup key. The role is left blank since it plays no part in equality.
    pub(crate) fn from_address(address: &str) -> Option<Self> {
        let (host, port) = address.rsplit_once(':')?;
        Some(BoltServer {
            address: host.to_owned(),
            port: port.parse().ok()?,
            role: String::new(),
        })
    }
}

impl PartialEq for BoltServer {
    fn eq(&self, other: &Self) -> bool {
        self.has_same_address(other)
    }
}

impl Eq for BoltServer {}

impl Hash for BoltServer {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        self.address.hash(state);
        self.port.hash(state);
    }
}

/// Represents a table of Bolt servers for a specific database, along with the last update time and TTL.
/// This is used to manage the routing table for a specific database.
#[derive(Debug, Clone)]
pub(crate) struct DatabaseTable {
    servers: Vec<BoltServer>,
    last_updated: std::time::Instant,
    ttl: Duration,
}

impl Default for DatabaseTable {
    fn default() -> Self {
        DatabaseTable {
            servers: Vec::new(),
            last_updated: std::time::Instant::now(),
            ttl: Duration::from_secs(0),
        }
    }
}

impl From<RoutingTable> for DatabaseTable {
    fn from(table: RoutingTable) -> Self {
        Self::from(&table)
    }
}

impl From<&RoutingTable> for DatabaseTable {
    fn from(table: &RoutingTable) -> Self {
        DatabaseTable {
            servers: table.resolve(),
            last_updated: std::time::Instant::now(),
            ttl: Duration::from_secs(table.ttl),
        }
    }
}

impl DatabaseTable {
    pub(crate) fn is_expired(&self) -> bool {
        self.last_updated.elapsed() >= self.ttl
    }

    pub(crate) fn resolve(&self) -> Vec<BoltServer> {
        self.servers.clone()
    }

    pub(crate) fn mark_server_unavailable(&mut self, server: &BoltServer) -> bool {
        let before = self.servers.len();
        self.servers.retain(|s| !server.has_same_address(s));
        if before != self.servers.len() {
            true
        } else {
            debug!("Server not found in the database table: {server:?}");
            false
        }
    }

    /// Drops `server` from the `WRITE` role only, leaving it reachable as a reader.
    pub(crate) fn mark_role_unavailable(&mut self, server: &BoltServer, role: &str) -> bool {
        let before = self.servers.len();
        self.servers
            .retain(|s| !(server.has_same_address(s) && s.role.eq_ignore_ascii_case(role)));
        before != self.servers.len()
    }

    pub(crate) fn has_address(&self, server: &BoltServer) -> bool {
        self.servers.iter().any(|s| s.has_same_address(server))
    }
}

/// A registry of connection pools, indexed by the Bolt server they connect to.
pub(crate) type PoolRegistry = ConcurrentHashMap<BoltServer, ConnectionPool>;
/// A map of registries, indexed by the database name.
pub(crate) type DatabaseServerMap = ConcurrentHashMap<String, DatabaseTable>;
