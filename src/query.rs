use crate::{
    errors::{Error, Result},
    messages::{BoltRequest, BoltResponse},
    pool::ManagedConnection,
    stream::{DetachedRowStream, RowStream},
    summary::{ResultSummary, ServerInfo},
    types::{BoltMap, BoltString, BoltType},
};

/// A Cypher statement plus its bound parameters, ready to `RUN` against a connection.
#[derive(Clone, Debug)]
pub struct Query {
    query: String,
    params: BoltMap,
}

impl Query {
    pub fn new(query: impl Into<String>) -> Self {
        Query {
            query: query.into(),
            params: BoltMap::default(),
        }
    }

    pub fn param<T: Into<BoltType>>(mut self, key: &str, value: T) -> Self {
        self.params.put(key.into(), value.into());
        self
    }

    pub fn params<K, V>(mut self, input_params: impl IntoIterator<Item = (K, V)>) -> Self
    where
        K: Into<BoltString>,
        V: Into<BoltType>,
    {
        for (key, value) in input_params {
            self.params.put(key.into(), value.into());
        }
        self
    }

    pub fn has_param_key(&self, key: &str) -> bool {
        self.params.value.contains_key(&BoltString::new(key))
    }

    /// Runs the query on `connection` and discards every record, returning only the summary.
    /// `db` is sent on `RUN` for auto-commit queries; pass `""` when running inside an explicit
    /// transaction, where the database was already fixed by `BEGIN`.
    pub(crate) async fn run_on(self, db: &str, connection: &mut ManagedConnection) -> Result<ResultSummary> {
        let request = BoltRequest::run(db, &self.query, self.params);
        Self::try_request(request, connection).await?;

        match connection.send_recv(BoltRequest::discard()).await? {
            BoltResponse::Success(s) => Ok(ResultSummary::new(&s, server_info(connection))),
            other => Err(other.into_error("DISCARD")),
        }
    }

    /// Runs the query on a pool-checked-out `connection`, returning a stream that owns it.
    pub(crate) async fn execute_on(
        self,
        db: &str,
        fetch_size: i64,
        mut connection: ManagedConnection,
    ) -> Result<DetachedRowStream> {
        let stream = Self::execute_mut(self, db, fetch_size, &mut connection).await?;
        Ok(DetachedRowStream::new(stream, connection))
    }

    /// Runs the query on a borrowed `connection` (e.g. one held open by a [`crate::Txn`]).
    pub(crate) async fn execute_mut(
        self,
        db: &str,
        fetch_size: i64,
        connection: &mut ManagedConnection,
    ) -> Result<RowStream> {
        let request = BoltRequest::run(db, &self.query, self.params);
        let success = Self::try_request(request, connection).await?;
        let fields: crate::types::BoltList = success
            .fields()
            .into_iter()
            .map(|f| BoltType::String(f.into()))
            .collect::<Vec<_>>()
            .into();
        let qid: i64 = success.get("qid").unwrap_or(-1);
        Ok(RowStream::new(qid, fields, fetch_size))
    }

    async fn try_request(
        request: BoltRequest,
        connection: &mut ManagedConnection,
    ) -> Result<crate::messages::Success> {
        match connection.send_recv(request).await? {
            BoltResponse::Success(success) => Ok(success),
            other => Err(other.into_error("RUN")),
        }
    }
}

fn server_info(connection: &ManagedConnection) -> ServerInfo {
    ServerInfo {
        address: connection.address().to_owned(),
        agent: connection.server_agent().map(str::to_owned),
    }
}

impl From<String> for Query {
    fn from(query: String) -> Self {
        Query::new(query)
    }
}

impl From<&str> for Query {
    fn from(query: &str) -> Self {
        Query::new(query)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn add_params() {
        let q = Query::new("MATCH (n) WHERE n.name = $name AND n.age > $age RETURN n");
        let q = q.params([
            ("name", BoltType::from("Frobniscante")),
            ("age", BoltType::from(42)),
        ]);

        assert_eq!(
            q.params.get::<String>("name").unwrap(),
            String::from("Frobniscante")
        );
        assert_eq!(q.params.get::<i64>("age").unwrap(), 42);

        assert!(q.has_param_key("name"));
        assert!(!q.has_param_key("country"));
    }
}
