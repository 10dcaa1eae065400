//! Buffered streaming of `RECORD`s produced by a `RUN`+`PULL` pair.

use crate::{
    errors::{Error, Result},
    messages::{BoltRequest, BoltResponse},
    pool::ManagedConnection,
    row::Row,
    summary::{ResultSummary, ServerInfo},
    txn::TransactionHandle,
    types::BoltList,
    DeError,
};
use futures::{
    stream::{try_unfold, TryStreamExt as _},
    TryStream,
};
use serde::de::DeserializeOwned;
use std::collections::VecDeque;

/// A stream of rows produced by `RUN`+`PULL`. Driven against a connection borrowed from a
/// [`crate::Txn`] or, via [`DetachedRowStream`], one owned outright for an auto-commit query.
#[must_use = "streams do nothing unless polled with `next`"]
pub struct RowStream {
    qid: i64,
    fields: BoltList,
    state: State,
    fetch_size: i64,
    buffer: VecDeque<Row>,
}

impl RowStream {
    pub(crate) fn new(qid: i64, fields: BoltList, fetch_size: i64) -> Self {
        RowStream {
            qid,
            fields,
            fetch_size,
            state: State::Ready,
            buffer: VecDeque::new(),
        }
    }

    /// Column names, in the order they were declared by the query's `RETURN` clause.
    pub fn keys(&self) -> Vec<String> {
        self.fields.iter().map(|f| f.to_string()).collect()
    }
}

/// A stream of rows produced by [`crate::Graph::execute`], owning the connection it was run on.
/// The connection returns to the pool once the stream is fully consumed or dropped.
#[must_use = "streams do nothing unless polled with `next`"]
pub struct DetachedRowStream {
    stream: RowStream,
    connection: ManagedConnection,
}

impl DetachedRowStream {
    pub(crate) fn new(stream: RowStream, connection: ManagedConnection) -> Self {
        DetachedRowStream { stream, connection }
    }

    pub fn keys(&self) -> Vec<String> {
        self.stream.keys()
    }
}

/// An item yielded while draining a [`RowStream`]: either a row, or the final
/// [`ResultSummary`] once the server reports no more records.
pub enum RowItem<T = Row> {
    Row(T),
    Summary(Box<ResultSummary>),
    Done,
}

impl<T> RowItem<T> {
    pub fn row(&self) -> Option<&T> {
        match self {
            RowItem::Row(row) => Some(row),
            _ => None,
        }
    }

    pub fn summary(&self) -> Option<&ResultSummary> {
        match self {
            RowItem::Summary(summary) => Some(summary),
            _ => None,
        }
    }

    pub fn into_row(self) -> Option<T> {
        match self {
            RowItem::Row(row) => Some(row),
            _ => None,
        }
    }

    pub fn into_summary(self) -> Option<Box<ResultSummary>> {
        match self {
            RowItem::Summary(summary) => Some(summary),
            _ => None,
        }
    }
}

impl RowStream {
    /// Returns the next row, pulling another batch from the server (sized by
    /// [`crate::ConfigBuilder::fetch_size`]) when the internal buffer runs dry.
    pub async fn next(&mut self, handle: impl TransactionHandle) -> Result<Option<Row>> {
        self.next_or_summary(handle)
            .await
            .map(|item| item.into_row())
    }

    /// Like [`Self::next`], but also surfaces the [`ResultSummary`] once the stream is drained,
    /// instead of silently discarding it.
    pub async fn next_or_summary(&mut self, mut handle: impl TransactionHandle) -> Result<RowItem> {
        loop {
            if let Some(row) = self.buffer.pop_front() {
                return Ok(RowItem::Row(row));
            }

            match self.state {
                State::Ready => {
                    let pull = BoltRequest::pull(self.fetch_size, self.qid);
                    let connection = handle.connection();
                    connection.send(pull).await?;

                    self.state = loop {
                        match connection.recv().await {
                            Ok(BoltResponse::Success(s)) => {
                                let has_more: bool = s.get("has_more").unwrap_or(false);
                                break if has_more {
                                    State::Ready
                                } else {
                                    let server = ServerInfo {
                                        address: connection.address().to_owned(),
                                        agent: connection.server_agent().map(str::to_owned),
                                    };
                                    State::Complete(Some(Box::new(ResultSummary::new(
                                        &s, server,
                                    ))))
                                };
                            }
                            Ok(BoltResponse::Record(record)) => {
                                let row = Row::new(self.fields.clone(), record.data);
                                self.buffer.push_back(row);
                            }
                            Ok(msg) => return Err(msg.into_error("PULL")),
                            Err(e) => return Err(e),
                        }
                    };
                }
                State::Complete(ref mut summary) => {
                    return match summary.take() {
                        Some(summary) => Ok(RowItem::Summary(summary)),
                        None => Ok(RowItem::Done),
                    };
                }
            }
        }
    }

    /// Turns this stream into a [`futures::stream::TryStream`] of [`Row`]s.
    pub fn into_stream(self, handle: impl TransactionHandle) -> impl TryStream<Ok = Row, Error = Error> {
        self.into_stream_convert(handle, Ok)
    }

    /// Turns this stream into a [`futures::stream::TryStream`], converting each row into `T`
    /// via [`Row::to`].
    pub fn into_stream_as<T: DeserializeOwned>(
        self,
        handle: impl TransactionHandle,
    ) -> impl TryStream<Ok = T, Error = Error> {
        self.into_stream_convert(handle, |row| row.to::<T>())
    }

    /// Turns this stream into a [`futures::stream::TryStream`] over a single column, converted
    /// via [`Row::get`].
    pub fn column_into_stream<'db, T: DeserializeOwned + 'db>(
        self,
        handle: impl TransactionHandle + 'db,
        column: &'db str,
    ) -> impl TryStream<Ok = T, Error = Error> + 'db {
        self.into_stream_convert(handle, move |row| {
            row.get::<T>(column)
                .ok_or_else(|| DeError::MissingField("column"))
        })
    }

    fn into_stream_convert<T>(
        self,
        handle: impl TransactionHandle,
        convert: impl Fn(Row) -> std::result::Result<T, DeError>,
    ) -> impl TryStream<Ok = T, Error = Error> {
        self.into_stream_convert_and_summary(handle, convert)
            .try_filter_map(|row| async { Ok(row.into_row()) })
    }

    fn into_stream_convert_and_summary<T>(
        self,
        handle: impl TransactionHandle,
        convert: impl Fn(Row) -> std::result::Result<T, DeError>,
    ) -> impl TryStream<Ok = RowItem<T>, Error = Error> {
        try_unfold(
            (self, handle, convert),
            |(mut stream, mut hd, de)| async move {
                match stream.next_or_summary(&mut hd).await {
                    Ok(RowItem::Row(row)) => match de(row) {
                        Ok(res) => Ok(Some((RowItem::Row(res), (stream, hd, de)))),
                        Err(e) => Err(Error::DeserializationError(e)),
                    },
                    Ok(RowItem::Summary(summary)) => {
                        Ok(Some((RowItem::Summary(summary), (stream, hd, de))))
                    }
                    Ok(RowItem::Done) => Ok(None),
                    Err(e) => Err(e),
                }
            },
        )
    }
}

impl DetachedRowStream {
    pub async fn next(&mut self) -> Result<Option<Row>> {
        self.stream.next(&mut self.connection).await
    }

    pub async fn next_or_summary(&mut self) -> Result<RowItem> {
        self.stream.next_or_summary(&mut self.connection).await
    }

    pub fn into_stream(self) -> impl TryStream<Ok = Row, Error = Error> {
        self.stream.into_stream(self.connection)
    }

    pub fn into_stream_as<T: DeserializeOwned>(self) -> impl TryStream<Ok = T, Error = Error> {
        self.stream.into_stream_as(self.connection)
    }

    pub fn column_into_stream<'db, T: DeserializeOwned + 'db>(
        self,
        column: &'db str,
    ) -> impl TryStream<Ok = T, Error = Error> + 'db {
        self.stream.column_into_stream(self.connection, column)
    }
}

enum State {
    Ready,
    Complete(Option<Box<ResultSummary>>),
}
