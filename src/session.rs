use crate::config::ImpersonateUser;
use crate::summary::{Counters, ResultSummary};
use crate::txn::Txn;
use crate::{Database, DetachedRowStream, Error, Graph, Operation, Query, RowStream};
use backon::Retryable;
use std::sync::atomic::AtomicBool;
use std::sync::atomic::Ordering::{Acquire, Relaxed};
use std::sync::Arc;

#[derive(Default)]
pub struct SessionConfig {
    db: Option<Database>,
    imp_user: Option<ImpersonateUser>,
    fetch_size: Option<usize>,
    bookmarks: Vec<String>,
}

impl SessionConfig {
    pub fn builder() -> SessionConfigBuilder {
        SessionConfigBuilder::default()
    }
}

#[derive(Default)]
pub struct SessionConfigBuilder {
    db: Option<Database>,
    imp_user: Option<ImpersonateUser>,
    fetch_size: Option<usize>,
    bookmarks: Vec<String>,
}

impl SessionConfigBuilder {
    pub fn with_db(mut self, db: Database) -> Self {
        self.db = Some(db);
        self
    }

    pub fn with_imp_user(mut self, imp_user: ImpersonateUser) -> Self {
        self.imp_user = Some(imp_user);
        self
    }

    pub fn with_fetch_size(mut self, fetch_size: usize) -> Self {
        self.fetch_size = Some(fetch_size);
        self
    }

    pub fn with_bookmarks(mut self, bookmarks: Vec<String>) -> Self {
        self.bookmarks = bookmarks;
        self
    }

    pub fn build(self) -> SessionConfig {
        SessionConfig {
            db: self.db,
            imp_user: self.imp_user,
            fetch_size: self.fetch_size,
            bookmarks: self.bookmarks,
        }
    }
}

pub struct Session<'a> {
    db: Option<Database>,
    imp_user: Option<ImpersonateUser>,
    fetch_size: Option<usize>,
    bookmarks: Vec<String>,
    should_fetch_default_db: AtomicBool,
    /// Set while an explicit transaction opened from this session (via [`Session::read_transaction`]
    /// or, for the duration of the call, [`Session::write_transaction`]) is still open. Checked by
    /// `run`/`execute_read`/`execute_write`/`write_transaction`/`read_transaction` so a session with
    /// an open transaction can't also be driven directly.
    open_txn: Arc<AtomicBool>,
    driver: &'a Graph,
}

impl<'a> Session<'a> {
    pub(crate) fn new(config: SessionConfig, graph: &'a Graph) -> Session<'a> {
        Self {
            db: config.db,
            imp_user: config.imp_user,
            fetch_size: config.fetch_size,
            bookmarks: config.bookmarks,
            should_fetch_default_db: AtomicBool::new(true),
            open_txn: Arc::new(AtomicBool::new(false)),
            driver: graph,
        }
    }

    /// Fails with the documented precondition error if an explicit transaction from this session
    /// is still open.
    fn check_no_open_txn(&self) -> crate::Result<()> {
        if self.open_txn.load(Acquire) {
            return Err(Error::ClientError(
                "Queries cannot be run directly on a session with an open transaction".to_owned(),
            ));
        }
        Ok(())
    }

    pub async fn run(&mut self, query: impl Into<Query>) -> crate::Result<ResultSummary> {
        self.check_no_open_txn()?;
        self.update_db_name().await?;
        let result = self
            .driver
            .impl_run_on(
                self.db.clone(),
                self.imp_user.clone(),
                &self.bookmarks,
                Operation::Write,
                query.into(),
            )
            .await?;
        if let Some(bookmark) = result.bookmark() {
            self.bookmarks = vec![bookmark.to_owned()];
        }
        Ok(result)
    }

    pub async fn execute_read(
        &mut self,
        query: impl Into<Query>,
    ) -> crate::Result<DetachedRowStream> {
        self.check_no_open_txn()?;
        self.update_db_name().await?;
        self.driver
            .impl_execute_on(
                Operation::Read,
                self.db.clone(),
                self.imp_user.clone(),
                &self.bookmarks,
                self.fetch_size,
                query.into(),
            )
            .await
    }

    pub async fn execute_write(
        &mut self,
        query: impl Into<Query>,
    ) -> crate::Result<DetachedRowStream> {
        self.check_no_open_txn()?;
        self.update_db_name().await?;
        self.driver
            .impl_execute_on(
                Operation::Write,
                self.db.clone(),
                self.imp_user.clone(),
                &self.bookmarks,
                self.fetch_size,
                query.into(),
            )
            .await
    }

    /// Runs `queries` inside one explicit write transaction, committing on success.
    ///
    /// This is a managed transaction function: a transient failure (leader change, deadlock,
    /// lost connection) re-begins the whole transaction from scratch with exponential backoff,
    /// rather than surfacing the error on the first attempt. See [`crate::ConfigBuilder::max_transaction_retry_time`].
    pub async fn write_transaction(
        &mut self,
        queries: Vec<impl Into<Query> + Clone>,
    ) -> crate::Result<Counters> {
        self.check_no_open_txn()?;
        self.update_db_name().await?;
        let (counters, bookmark) = (|| async { self.run_write_txn_once(queries.clone()).await })
            .retry(self.driver.retry_backoff())
            .when(Error::can_retry)
            .await?;
        if let Some(bookmark) = bookmark {
            self.bookmarks = vec![bookmark];
        }
        Ok(counters)
    }

    async fn run_write_txn_once(
        &self,
        queries: Vec<impl Into<Query>>,
    ) -> crate::Result<(Counters, Option<String>)> {
        let mut txn = self
            .driver
            .impl_start_txn_on(
                self.db.clone(),
                Operation::Write,
                self.imp_user.clone(),
                &self.bookmarks,
                self.fetch_size,
                Some(self.open_txn.clone()),
            )
            .await?;
        let address = txn.address().to_owned();
        match txn.run_queries(queries).await {
            Ok(counters) => match txn.commit().await {
                Ok(bookmark) => Ok((counters, bookmark)),
                Err(e) => Err(self.driver.reclassify(e, &address, &self.db)),
            },
            Err(e) => {
                let _ = txn.rollback().await;
                Err(self.driver.reclassify(e, &address, &self.db))
            }
        }
    }

    /// Runs `query` inside one explicit read transaction, returning both the still-open
    /// transaction and its row stream; the caller drives the stream with the returned [`Txn`] as
    /// its handle and is responsible for calling [`Txn::commit`] once done.
    ///
    /// Like [`Session::write_transaction`], beginning the transaction and dispatching the query
    /// is retried on a transient failure; once a stream has been handed back, consuming it is not.
    pub async fn read_transaction(
        &mut self,
        query: impl Into<Query> + Clone,
    ) -> crate::Result<(Txn, RowStream)> {
        self.check_no_open_txn()?;
        self.update_db_name().await?;
        (|| async { self.run_read_txn_once(query.clone()).await })
            .retry(self.driver.retry_backoff())
            .when(Error::can_retry)
            .await
    }

    async fn run_read_txn_once(&self, query: impl Into<Query>) -> crate::Result<(Txn, RowStream)> {
        let mut txn = self
            .driver
            .impl_start_txn_on(
                self.db.clone(),
                Operation::Read,
                self.imp_user.clone(),
                &self.bookmarks,
                self.fetch_size,
                Some(self.open_txn.clone()),
            )
            .await?;
        let address = txn.address().to_owned();
        match txn.execute(query).await {
            Ok(stream) => Ok((txn, stream)),
            Err(e) => Err(self.driver.reclassify(e, &address, &self.db)),
        }
    }

    pub fn last_bookmark(&self) -> Option<String> {
        self.bookmarks.last().cloned()
    }

    async fn update_db_name(&mut self) -> Result<(), Error> {
        if self.db.is_none() && self.should_fetch_default_db.fetch_or(false, Relaxed) {
            let db = self
                .driver
                .get_default_db(self.imp_user.clone(), &self.bookmarks)
                .await?;
            self.db = db;
            self.should_fetch_default_db
                .compare_exchange(true, false, Relaxed, Relaxed)
                .unwrap();
        }
        Ok(())
    }
}
