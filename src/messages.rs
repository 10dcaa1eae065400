mod begin;
mod bye;
mod commit;
mod discard;
mod failure;
mod hello;
mod ignore;
mod pull;
mod record;
mod reset;
mod rollback;
mod run;
mod success;

use crate::{
    errors::{Error, Result},
    types::BoltMap,
    version::Version,
    BoltString, BoltType,
};
use begin::Begin;
use bye::Bye;
use bytes::Bytes;
use commit::Commit;
use discard::Discard;
use failure::Failure;
use hello::Hello;
use ignore::Ignore;
use pull::Pull;
use record::Record;
use reset::Reset;
use rollback::Rollback;
use run::Run;
use std::cell::RefCell;
use std::rc::Rc;
pub(crate) use success::Success;

/// A message received from the server in response to a [`BoltRequest`].
#[derive(Debug, PartialEq, Clone)]
pub enum BoltResponse {
    Success(Success),
    Failure(Failure),
    Record(Record),
    Ignored(Ignore),
}

impl BoltResponse {
    /// Turns a non-`Success` response into the error it represents.
    pub(crate) fn into_error(self, msg: &'static str) -> Error {
        match self {
            BoltResponse::Failure(f) => Error::Neo4j(f.into_error()),
            BoltResponse::Ignored(i) => {
                let _ = i.into_error();
                Error::Ignored(msg)
            }
            BoltResponse::Success(_) | BoltResponse::Record(_) => {
                Error::UnexpectedMessage(format!("unexpected response to {}", msg))
            }
        }
    }
}

#[derive(Debug, PartialEq, Clone)]
pub enum BoltRequest {
    Hello(Hello),
    Run(Run),
    Pull(Pull),
    Discard(Discard),
    Begin(Begin),
    Commit(Commit),
    Rollback(Rollback),
    Reset(Reset),
    Goodbye(Bye),
}

pub struct HelloBuilder {
    agent: BoltString,
    principal: BoltString,
    credentials: BoltString,
    routing: Option<BoltMap>,
    version: Version,
}

impl HelloBuilder {
    pub fn new(principal: impl Into<BoltString>, credentials: impl Into<BoltString>) -> Self {
        Self {
            agent: "boltdrive".into(),
            principal: principal.into(),
            credentials: credentials.into(),
            routing: None,
            version: Version::V4,
        }
    }

    pub fn with_routing(self, routing: impl Into<Option<BoltMap>>) -> Self {
        Self {
            routing: routing.into(),
            ..self
        }
    }

    pub fn with_version(self, version: Version) -> Self {
        Self { version, ..self }
    }

    pub fn build(self) -> BoltRequest {
        let HelloBuilder {
            agent,
            principal,
            credentials,
            routing,
            version,
        } = self;
        BoltRequest::hello(agent, principal, credentials, routing, version)
    }
}

impl BoltRequest {
    /// Builds a `HELLO` message from an [`crate::auth::AuthToken`]'s `extra` map, the
    /// configured user agent, and -- from 4.1 onward -- a routing context.
    pub fn hello_from_auth(
        mut extra: BoltMap,
        agent: &str,
        routing: Option<BoltMap>,
        version: Version,
    ) -> BoltRequest {
        extra.put("user_agent".into(), agent.into());
        if version >= Version::V4_1 {
            if let Some(context) = routing {
                extra.put("routing".into(), BoltType::Map(context));
            }
        }
        BoltRequest::Hello(Hello::new(extra))
    }

    pub fn hello(
        agent: BoltString,
        principal: BoltString,
        credentials: BoltString,
        routing: Option<BoltMap>,
        version: Version,
    ) -> BoltRequest {
        let mut data = BoltMap::default();
        data.put("user_agent".into(), BoltType::String(agent));
        data.put("scheme".into(), "basic".into());
        data.put("principal".into(), BoltType::String(principal));
        data.put("credentials".into(), BoltType::String(credentials));
        if version >= Version::V4_1 {
            if let Some(context) = routing {
                data.put("routing".into(), BoltType::Map(context));
            }
        }
        BoltRequest::Hello(Hello::new(data))
    }

    pub fn run(db: &str, query: &str, params: BoltMap) -> BoltRequest {
        BoltRequest::Run(Run::new(db.into(), query.into(), params))
    }

    pub fn pull(n: i64, qid: i64) -> BoltRequest {
        BoltRequest::Pull(Pull::new(n, qid))
    }

    pub fn discard() -> BoltRequest {
        BoltRequest::Discard(Discard::default())
    }

    pub fn begin(extra: BoltMap) -> BoltRequest {
        BoltRequest::Begin(Begin::new(extra))
    }

    pub fn commit() -> BoltRequest {
        BoltRequest::Commit(Commit::new())
    }

    pub fn rollback() -> BoltRequest {
        BoltRequest::Rollback(Rollback::new())
    }

    pub fn reset() -> BoltRequest {
        BoltRequest::Reset(Reset::new())
    }

    pub fn goodbye() -> BoltRequest {
        BoltRequest::Goodbye(Bye::new())
    }
}

impl BoltRequest {
    pub fn into_bytes(self, version: Version) -> Result<Bytes> {
        let bytes: Bytes = match self {
            BoltRequest::Hello(hello) => hello.into_bytes(version)?,
            BoltRequest::Run(run) => run.into_bytes(version)?,
            BoltRequest::Pull(pull) => pull.into_bytes(version)?,
            BoltRequest::Discard(discard) => discard.into_bytes(version)?,
            BoltRequest::Begin(begin) => begin.into_bytes(version)?,
            BoltRequest::Commit(commit) => commit.into_bytes(version)?,
            BoltRequest::Rollback(rollback) => rollback.into_bytes(version)?,
            BoltRequest::Reset(reset) => reset.into_bytes(version)?,
            BoltRequest::Goodbye(bye) => bye.into_bytes(version)?,
        };
        Ok(bytes)
    }
}

impl BoltResponse {
    pub fn parse(version: Version, response: Bytes) -> Result<BoltResponse> {
        let input = Rc::new(RefCell::new(response));
        if Success::can_parse(version, input.clone()) {
            let success = Success::parse(version, input)?;
            return Ok(BoltResponse::Success(success));
        }
        if Failure::can_parse(version, input.clone()) {
            let failure = Failure::parse(version, input)?;
            return Ok(BoltResponse::Failure(failure));
        }
        if Ignore::can_parse(version, input.clone()) {
            let ignored = Ignore::parse(version, input)?;
            return Ok(BoltResponse::Ignored(ignored));
        }
        if Record::can_parse(version, input.clone()) {
            let record = Record::parse(version, input)?;
            return Ok(BoltResponse::Record(record));
        }
        Err(Error::UnknownMessage(format!(
            "unknown message {:?}",
            input.borrow()
        )))
    }
}
