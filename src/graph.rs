use crate::{
    config::{Config, ConfigBuilder, Database, ImpersonateUser, LiveConfig},
    errors::{Error, Result},
    pool::{create_pool, ConnectionPool, ManagedConnection},
    query::Query,
    routing::RoutedConnectionManager,
    session::{Session, SessionConfig},
    stream::DetachedRowStream,
    summary::ResultSummary,
    txn::Txn,
    Operation,
};
use backon::{ExponentialBuilder, Retryable};
use std::sync::atomic::AtomicBool;
use std::sync::Arc;
use std::time::Duration;

#[derive(Clone)]
enum ConnectionPoolManager {
    Routed(RoutedConnectionManager),
    Normal(ConnectionPool),
}

impl ConnectionPoolManager {
    async fn get(
        &self,
        operation: Operation,
        db: Option<Database>,
        imp_user: Option<ImpersonateUser>,
        bookmarks: &[String],
    ) -> Result<ManagedConnection> {
        match self {
            ConnectionPoolManager::Routed(manager) => {
                manager.get(Some(operation), db, imp_user, bookmarks).await
            }
            ConnectionPoolManager::Normal(pool) => pool.get().await.map_err(Error::from),
        }
    }

    async fn get_default_db(
        &self,
        imp_user: Option<ImpersonateUser>,
        bookmarks: &[String],
    ) -> Result<Option<Database>> {
        match self {
            ConnectionPoolManager::Routed(manager) => {
                manager.get_default_db(imp_user, bookmarks).await
            }
            ConnectionPoolManager::Normal(_) => Ok(None),
        }
    }

    fn backoff(&self) -> ExponentialBuilder {
        match self {
            ConnectionPoolManager::Routed(manager) => manager.backoff(),
            ConnectionPoolManager::Normal(pool) => pool.manager().backoff(),
        }
    }

    /// Forgets `address` entirely (a no-op outside cluster mode).
    fn report_failure(&self, address: &str, db: Option<Database>) {
        if let ConnectionPoolManager::Routed(manager) = self {
            manager.report_failure(address, db);
        }
    }

    /// Demotes `address` out of the writer set only (a no-op outside cluster mode).
    fn report_not_a_leader(&self, address: &str, db: Option<Database>) {
        if let ConnectionPoolManager::Routed(manager) = self {
            manager.report_not_a_leader(address, db);
        }
    }
}

/// A Neo4j database abstraction.
///
/// This type can be cloned and shared across threads; internal resources (the connection pool,
/// and in cluster mode the routing table registry) are reference-counted.
#[derive(Clone)]
pub struct Graph {
    config: LiveConfig,
    pool: ConnectionPoolManager,
}

/// Returns a [`Query`] which provides methods like [`Query::param`] to add parameters to the query.
pub fn query(q: &str) -> Query {
    Query::new(q.to_owned())
}

impl Graph {
    /// Connects to the database with configurations provided.
    ///
    /// You can build a config using [`ConfigBuilder::default()`].
    pub async fn connect(config: Config) -> Result<Self> {
        let pool = if config.routing {
            ConnectionPoolManager::Routed(RoutedConnectionManager::connect(&config)?)
        } else {
            ConnectionPoolManager::Normal(create_pool(&config)?)
        };
        Ok(Graph {
            config: config.into_live_config(),
            pool,
        })
    }

    /// Connects to the database with default configurations.
    pub async fn new(
        uri: impl Into<String>,
        user: impl Into<String>,
        password: impl Into<String>,
    ) -> Result<Self> {
        let config = ConfigBuilder::default()
            .uri(uri)
            .user(user)
            .password(password)
            .build()?;
        Self::connect(config).await
    }

    /// Opens a new [`Session`] bound to this driver, tracking its own database, bookmarks and
    /// fetch size.
    pub fn session(&self, config: SessionConfig) -> Session<'_> {
        Session::new(config, self)
    }

    /// Starts a new transaction on the configured database.
    /// All queries that need to be run/executed within the transaction
    /// should be executed using either [`Txn::run`] or [`Txn::execute`].
    ///
    /// Transactions will not be automatically retried on any failure.
    pub async fn start_txn(&self) -> Result<Txn> {
        self.impl_start_txn_on(self.config.db.clone(), Operation::Write, None, &[], None, None)
            .await
    }

    /// Starts a new transaction on the configured database specifying the desired operation.
    ///
    /// Transactions will not be automatically retried on any failure.
    pub async fn start_txn_as(&self, operation: Operation) -> Result<Txn> {
        self.impl_start_txn_on(self.config.db.clone(), operation, None, &[], None, None)
            .await
    }

    /// Starts a new transaction on the provided database.
    ///
    /// Transactions will not be automatically retried on any failure.
    pub async fn start_txn_on(&self, db: impl Into<Database>) -> Result<Txn> {
        self.impl_start_txn_on(Some(db.into()), Operation::Write, None, &[], None, None)
            .await
    }

    pub(crate) async fn impl_start_txn_on(
        &self,
        db: Option<Database>,
        operation: Operation,
        imp_user: Option<ImpersonateUser>,
        bookmarks: &[String],
        fetch_size: Option<usize>,
        open_flag: Option<Arc<AtomicBool>>,
    ) -> Result<Txn> {
        let connection = self
            .pool
            .get(operation, db.clone(), imp_user.clone(), bookmarks)
            .await?;
        let fetch_size = fetch_size.unwrap_or(self.config.fetch_size);
        Txn::new(
            db,
            fetch_size as i64,
            connection,
            operation,
            imp_user,
            bookmarks,
            open_flag,
        )
        .await
    }

    /// Runs a query on the configured database using a connection from the connection pool.
    /// It doesn't return any [`DetachedRowStream`] as the `run` abstraction discards any stream.
    ///
    /// This operation retries the query on certain failures. All errors with the `Transient`
    /// error class as well as a few other error classes are considered retryable. This includes
    /// errors during a leader election or when the transaction resources on the server (memory,
    /// handles, ...) are exhausted. Retries happen with an exponential backoff until the
    /// configured maximum accumulated retry time elapses, at which point the query fails with the
    /// last error as it would without any retry.
    ///
    /// Use [`Graph::execute`] when you are interested in the result stream.
    pub async fn run(&self, q: impl Into<Query>) -> Result<()> {
        self.impl_run_on(
            self.config.db.clone(),
            None,
            &[],
            Operation::Write,
            q.into(),
        )
        .await?;
        Ok(())
    }

    /// Runs a READ ONLY query on the configured database using a connection from the connection
    /// pool. See [`Graph::run`] for retry semantics.
    pub async fn run_read(&self, q: impl Into<Query>) -> Result<()> {
        self.impl_run_on(
            self.config.db.clone(),
            None,
            &[],
            Operation::Read,
            q.into(),
        )
        .await?;
        Ok(())
    }

    /// Runs a query on the provided database. See [`Graph::run`] for retry semantics.
    pub async fn run_on(&self, db: impl Into<Database>, q: impl Into<Query>) -> Result<()> {
        self.impl_run_on(Some(db.into()), None, &[], Operation::Write, q.into())
            .await?;
        Ok(())
    }

    pub(crate) async fn impl_run_on(
        &self,
        db: Option<Database>,
        imp_user: Option<ImpersonateUser>,
        bookmarks: &[String],
        operation: Operation,
        q: Query,
    ) -> Result<ResultSummary> {
        (|| async {
            let mut connection = self
                .pool
                .get(operation, db.clone(), imp_user.clone(), bookmarks)
                .await?;
            let address = connection.address().to_owned();
            q.clone()
                .run_on(db.as_deref().unwrap_or(""), &mut connection)
                .await
                .map_err(|e| self.reclassify(e, &address, &db))
        })
        .retry(self.pool.backoff())
        .when(Error::can_retry)
        .notify(Self::log_retry)
        .await
    }

    /// Executes a READ/WRITE query on the configured database and returns a [`DetachedRowStream`].
    ///
    /// See [`Graph::run`] for retry semantics.
    pub async fn execute(&self, q: impl Into<Query>) -> Result<DetachedRowStream> {
        self.impl_execute_on(
            Operation::Write,
            self.config.db.clone(),
            None,
            &[],
            None,
            q.into(),
        )
        .await
    }

    /// Executes a READ ONLY query on the configured database and returns a [`DetachedRowStream`].
    ///
    /// See [`Graph::run`] for retry semantics.
    pub async fn execute_read(&self, q: impl Into<Query>) -> Result<DetachedRowStream> {
        self.impl_execute_on(
            Operation::Read,
            self.config.db.clone(),
            None,
            &[],
            None,
            q.into(),
        )
        .await
    }

    /// Executes a query on the provided database and returns a [`DetachedRowStream`].
    ///
    /// See [`Graph::run`] for retry semantics.
    pub async fn execute_on(
        &self,
        db: impl Into<Database>,
        q: impl Into<Query>,
    ) -> Result<DetachedRowStream> {
        self.impl_execute_on(
            Operation::Write,
            Some(db.into()),
            None,
            &[],
            None,
            q.into(),
        )
        .await
    }

    pub(crate) async fn impl_execute_on(
        &self,
        operation: Operation,
        db: Option<Database>,
        imp_user: Option<ImpersonateUser>,
        bookmarks: &[String],
        fetch_size: Option<usize>,
        q: Query,
    ) -> Result<DetachedRowStream> {
        let fetch_size = fetch_size.unwrap_or(self.config.fetch_size);
        (|| async {
            let connection = self
                .pool
                .get(operation, db.clone(), imp_user.clone(), bookmarks)
                .await?;
            let address = connection.address().to_owned();
            q.clone()
                .execute_on(db.as_deref().unwrap_or(""), fetch_size as i64, connection)
                .await
                .map_err(|e| self.reclassify(e, &address, &db))
        })
        .retry(self.pool.backoff())
        .when(Error::can_retry)
        .notify(Self::log_retry)
        .await
    }

    pub(crate) async fn get_default_db(
        &self,
        imp_user: Option<ImpersonateUser>,
        bookmarks: &[String],
    ) -> Result<Option<Database>> {
        self.pool.get_default_db(imp_user, bookmarks).await
    }

    /// The exponential backoff schedule used to retry retryable failures, shared by auto-commit
    /// queries and session-managed transaction functions alike.
    pub(crate) fn retry_backoff(&self) -> ExponentialBuilder {
        self.pool.backoff()
    }

    /// Feeds a query-execution failure back to the routing provider so the offending server
    /// doesn't get picked again, and rewrites a `NotALeader` failure into the `SessionExpired`
    /// error the application actually sees.
    pub(crate) fn reclassify(&self, e: Error, address: &str, db: &Option<Database>) -> Error {
        if e.is_not_a_leader() {
            self.pool.report_not_a_leader(address, db.clone());
            return Error::SessionExpired(format!(
                "No longer possible to write to server at {address}"
            ));
        }
        if e.is_routing_failure() {
            self.pool.report_failure(address, db.clone());
        }
        e
    }

    fn log_retry(e: &Error, delay: Duration) {
        let level = match delay.as_millis() {
            0..=499 => log::Level::Debug,
            500..=4999 => log::Level::Info,
            _ => log::Level::Warn,
        };
        log::log!(level, "Retrying query in {delay:?} due to error: {e}");
    }
}

const _: () = {
    const fn assert_send_sync<T: ?Sized + Send + Sync>() {}
    assert_send_sync::<Graph>();
};
