use crate::{
    config::Config,
    connection::{Connection, ConnectionInfo},
    errors::{Error, Result},
};
use backon::ExponentialBuilder;
use deadpool::managed::{Manager, Metrics, Object, Pool, RecycleError, RecycleResult};
use log::{info, trace};
use std::time::Duration;

pub type ConnectionPool = Pool<ConnectionManager>;
pub type ManagedConnection = Object<ConnectionManager>;

pub struct ConnectionManager {
    info: ConnectionInfo,
    backoff: ExponentialBuilder,
    max_connection_lifetime: Option<Duration>,
}

impl ConnectionManager {
    pub(crate) fn new(
        info: ConnectionInfo,
        backoff: ExponentialBuilder,
        max_connection_lifetime: Option<Duration>,
    ) -> Self {
        ConnectionManager {
            info,
            backoff,
            max_connection_lifetime,
        }
    }

    pub fn backoff(&self) -> ExponentialBuilder {
        self.backoff.clone()
    }
}

impl Manager for ConnectionManager {
    type Type = Connection;
    type Error = Error;

    async fn create(&self) -> Result<Self::Type, Self::Error> {
        trace!("creating new connection");
        Connection::new(&self.info).await
    }

    async fn recycle(&self, obj: &mut Self::Type, metrics: &Metrics) -> RecycleResult<Self::Error> {
        if let Some(max_lifetime) = self.max_connection_lifetime {
            if metrics.created.elapsed() > max_lifetime {
                trace!("dropping connection past max_connection_lifetime");
                return Err(RecycleError::Message(
                    "connection exceeded max_connection_lifetime".into(),
                ));
            }
        }
        trace!("recycling connection");
        Ok(obj.reset().await?)
    }
}

/// Builds a pool dialing `config`'s URI directly, used for single-instance (`bolt://`) setups and
/// for the initial contact point of a routed deployment.
pub(crate) fn create_pool(config: &Config) -> Result<ConnectionPool> {
    create_pool_for(ConnectionInfo::from_config(config)?, config)
}

/// Builds a pool dialing a specific routing-table member, reusing `config`'s auth/TLS/backoff.
pub(crate) fn create_pool_for_address(address: &str, config: &Config) -> Result<ConnectionPool> {
    create_pool_for(ConnectionInfo::for_address(address, config)?, config)
}

fn create_pool_for(info: ConnectionInfo, config: &Config) -> Result<ConnectionPool> {
    let backoff = config.backoff.to_exponential_builder();
    info!(
        "creating connection pool for node {} with max size {}",
        config.uri, config.max_connections
    );
    let mgr = ConnectionManager::new(info, backoff, config.max_connection_lifetime);
    Ok(ConnectionPool::builder(mgr)
        .max_size(config.max_connections)
        .create_timeout(Some(config.connection_timeout))
        .wait_timeout(Some(config.connection_acquisition_timeout))
        .build()
        .expect("No timeouts configured"))
}
