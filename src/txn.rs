//! Explicit transactions: a connection pinned to one in-flight `BEGIN`/`COMMIT`/`ROLLBACK` cycle.

use crate::{
    config::{Database, ImpersonateUser},
    errors::{Error, Result},
    messages::{BoltRequest, BoltResponse},
    pool::ManagedConnection,
    query::Query,
    types::{BoltList, BoltMap, BoltType},
    Operation,
};
use log::debug;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum State {
    Active,
    Succeeded,
    RolledBack,
    Failed,
}

/// A handle controlling one explicit transaction, created by [`crate::Graph::start_txn`] or
/// [`crate::Session::read_transaction`]/[`crate::Session::write_transaction`].
///
/// A dedicated connection is reserved for the lifetime of the handle and released back to the
/// pool when the transaction ends (commit, rollback, or drop).
///
/// Follows a strict state machine: once a transaction has committed, rolled back, or failed, every
/// further `run`/`execute`/`commit`/`rollback` call returns an error describing exactly why,
/// instead of silently reusing a dead connection.
pub struct Txn {
    db: Option<Database>,
    fetch_size: i64,
    connection: ManagedConnection,
    operation: Operation,
    bookmark: Option<String>,
    state: State,
    /// Set while this handle is open so the [`crate::Session`] it was opened from can refuse
    /// `run`/`execute_read`/`execute_write`/`write_transaction`/`read_transaction` calls until
    /// this transaction ends. `None` for transactions opened directly on a [`crate::Graph`].
    open_flag: Option<Arc<AtomicBool>>,
}

impl Txn {
    pub(crate) async fn new(
        db: Option<Database>,
        fetch_size: i64,
        mut connection: ManagedConnection,
        operation: Operation,
        imp_user: Option<ImpersonateUser>,
        bookmarks: &[String],
        open_flag: Option<Arc<AtomicBool>>,
    ) -> Result<Self> {
        debug!("starting transaction with bookmarks: {:?}", bookmarks);

        let mut extra = BoltMap::default();
        if let Some(db) = db.as_ref() {
            extra.put("db".into(), db.to_string().into());
        }
        if let Some(imp_user) = imp_user.as_ref() {
            extra.put("imp_user".into(), imp_user.to_string().into());
        }
        extra.put(
            "mode".into(),
            match operation {
                Operation::Read => "r".into(),
                Operation::Write => "w".into(),
            },
        );
        if !bookmarks.is_empty() {
            let list: BoltList = bookmarks
                .iter()
                .map(|b| BoltType::String(b.as_str().into()))
                .collect::<Vec<_>>()
                .into();
            extra.put("bookmarks".into(), BoltType::List(list));
        }

        match connection.send_recv(BoltRequest::begin(extra)).await? {
            BoltResponse::Success(_) => {
                if let Some(flag) = &open_flag {
                    flag.store(true, Ordering::Release);
                }
                Ok(Txn {
                    db,
                    fetch_size,
                    connection,
                    operation,
                    bookmark: None,
                    state: State::Active,
                    open_flag,
                })
            }
            msg => Err(msg.into_error("BEGIN")),
        }
    }

    /// Runs a single query, discarding its rows, returning the commit-bound result summary.
    pub async fn run(&mut self, q: impl Into<Query>) -> Result<crate::summary::ResultSummary> {
        match self.state {
            State::Active => {
                let summary = q.into().run_on("", &mut self.connection).await;
                match summary {
                    Ok(summary) => {
                        self.save_bookmark(&summary);
                        Ok(summary)
                    }
                    Err(e) => {
                        self.state = State::Failed;
                        Err(e)
                    }
                }
            }
            State::Failed => Err(Error::ClientError(
                "Cannot run query in this transaction, because a previous error occurred"
                    .to_owned(),
            )),
            State::Succeeded => Err(Error::ClientError("already closed".to_owned())),
            State::RolledBack => Err(Error::ClientError("already rolled back".to_owned())),
        }
    }

    /// Runs multiple queries one after the other on this transaction's connection, merging the
    /// write counters from each result summary.
    pub async fn run_queries<Q: Into<Query>>(
        &mut self,
        queries: impl IntoIterator<Item = Q>,
    ) -> Result<crate::summary::Counters> {
        let mut counters = crate::summary::Counters::default();
        for query in queries {
            let summary = self.run(query.into()).await?;
            counters += *summary.counters();
        }
        Ok(counters)
    }

    /// Runs a query and returns a stream over its rows.
    pub async fn execute(&mut self, q: impl Into<Query>) -> Result<crate::stream::RowStream> {
        match self.state {
            State::Active => {
                match q.into().execute_mut("", self.fetch_size, &mut self.connection).await {
                    Ok(stream) => Ok(stream),
                    Err(e) => {
                        self.state = State::Failed;
                        Err(e)
                    }
                }
            }
            State::Failed => Err(Error::ClientError(
                "Cannot run query in this transaction, because a previous error occurred"
                    .to_owned(),
            )),
            State::Succeeded => Err(Error::ClientError("already closed".to_owned())),
            State::RolledBack => Err(Error::ClientError("already rolled back".to_owned())),
        }
    }

    /// Commits the transaction, consuming the handle.
    pub async fn commit(mut self) -> Result<Option<String>> {
        match self.state {
            State::Active => match self.connection.send_recv(BoltRequest::commit()).await {
                Ok(BoltResponse::Success(s)) => {
                    self.state = State::Succeeded;
                    if let Some(bookmark) = s.get::<String>("bookmark") {
                        self.bookmark = Some(bookmark);
                    }
                    Ok(self.bookmark.clone())
                }
                Ok(msg) => {
                    self.state = State::Failed;
                    Err(msg.into_error("COMMIT"))
                }
                Err(e) => {
                    self.state = State::Failed;
                    Err(e)
                }
            },
            State::Failed => Err(Error::ClientError(
                "Cannot commit this transaction, because a previous error occurred".to_owned(),
            )),
            State::Succeeded => Err(Error::ClientError("already committed".to_owned())),
            State::RolledBack => Err(Error::ClientError("already rolled back".to_owned())),
        }
    }

    /// Rolls the transaction back, consuming the handle.
    pub async fn rollback(mut self) -> Result<()> {
        match self.state {
            State::Active => match self.connection.send_recv(BoltRequest::rollback()).await {
                Ok(BoltResponse::Success(_)) => {
                    self.state = State::RolledBack;
                    Ok(())
                }
                Ok(msg) => Err(msg.into_error("ROLLBACK")),
                Err(e) => Err(e),
            },
            State::Failed => Err(Error::ClientError("cannot rollback, already rolled back".to_owned())),
            State::Succeeded => Err(Error::ClientError("already closed".to_owned())),
            State::RolledBack => Err(Error::ClientError("already rolled back".to_owned())),
        }
    }

    pub fn last_bookmark(&self) -> Option<&str> {
        self.bookmark.as_deref()
    }

    pub fn db(&self) -> Option<&Database> {
        self.db.as_ref()
    }

    pub fn operation(&self) -> Operation {
        self.operation
    }

    /// The address of the server this transaction's connection is bound to, used to report
    /// routing failures back to the provider that selected it.
    pub(crate) fn address(&self) -> &str {
        self.connection.address()
    }

    pub fn handle(&mut self) -> &mut impl TransactionHandle {
        self
    }

    fn save_bookmark(&mut self, summary: &crate::summary::ResultSummary) {
        if let Some(bookmark) = summary.bookmark() {
            self.bookmark = Some(bookmark.to_owned());
        }
    }
}

impl Drop for Txn {
    fn drop(&mut self) {
        if let Some(flag) = &self.open_flag {
            flag.store(false, Ordering::Release);
        }
    }
}

const _: () = {
    const fn assert_send_sync<T: ?Sized + Send + Sync>() {}
    assert_send_sync::<Txn>();
};

/// Something a [`crate::stream::RowStream`] can pull records against: either a running [`Txn`]
/// or a bare connection (used by [`crate::stream::DetachedRowStream`]).
pub trait TransactionHandle: private::Handle {}

impl TransactionHandle for Txn {}
impl TransactionHandle for ManagedConnection {}
impl<T: TransactionHandle> TransactionHandle for &mut T {}

pub(crate) mod private {
    use crate::pool::ManagedConnection;

    pub trait Handle {
        fn connection(&mut self) -> &mut ManagedConnection;
    }

    impl Handle for super::Txn {
        fn connection(&mut self) -> &mut ManagedConnection {
            &mut self.connection
        }
    }

    impl Handle for ManagedConnection {
        fn connection(&mut self) -> &mut ManagedConnection {
            self
        }
    }

    impl<T: Handle> Handle for &mut T {
        fn connection(&mut self) -> &mut ManagedConnection {
            (**self).connection()
        }
    }
}
