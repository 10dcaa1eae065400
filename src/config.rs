use std::{fmt, path::PathBuf, sync::Arc, time::Duration};

pub use crate::errors::*;
use crate::{auth::AuthToken, connection::NeoUrl};

const DEFAULT_FETCH_SIZE: usize = 200;
const DEFAULT_MAX_CONNECTIONS: usize = 16;
const DEFAULT_USER_AGENT: &str = concat!("boltdrive/", env!("CARGO_PKG_VERSION"));
const DEFAULT_CONNECTION_TIMEOUT: Duration = Duration::from_secs(30);
const DEFAULT_CONNECTION_ACQUISITION_TIMEOUT: Duration = Duration::from_secs(60);
const DEFAULT_MAX_TRANSACTION_RETRY_TIME: Duration = Duration::from_secs(30);

/// The name of a database on the server, e.g. "neo4j" or "system".
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Database(pub(crate) Arc<str>);

impl From<&str> for Database {
    fn from(s: &str) -> Self {
        Database(Arc::from(s))
    }
}

impl From<String> for Database {
    fn from(s: String) -> Self {
        Database(Arc::from(s.as_str()))
    }
}

impl std::ops::Deref for Database {
    type Target = str;

    fn deref(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Database {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// The user to impersonate for the duration of a session, see
/// [Neo4j's user impersonation](https://neo4j.com/docs/operations-manual/current/authentication-authorization/user-impersonation/).
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ImpersonateUser(pub(crate) Arc<str>);

impl From<&str> for ImpersonateUser {
    fn from(s: &str) -> Self {
        ImpersonateUser(Arc::from(s))
    }
}

impl From<String> for ImpersonateUser {
    fn from(s: String) -> Self {
        ImpersonateUser(Arc::from(s.as_str()))
    }
}

impl fmt::Display for ImpersonateUser {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// How the server's certificate is validated when [`Trust`] requires TLS.
#[derive(Debug, Clone)]
pub enum Trust {
    /// Validate against the platform's native root store (`rustls-native-certs`).
    TrustSystemCas,
    /// Validate against a fixed list of PEM-encoded CA certificate files.
    TrustCustomCas(Vec<PathBuf>),
    /// Accept any certificate the server presents. Only for local development.
    TrustAny,
}

/// Encryption settings for a connection.
#[derive(Debug, Clone)]
pub struct TlsConfig {
    pub(crate) encrypted: bool,
    pub(crate) trust: Trust,
}

impl Default for TlsConfig {
    fn default() -> Self {
        TlsConfig {
            encrypted: false,
            trust: Trust::TrustSystemCas,
        }
    }
}

/// Exponential backoff parameters for the managed transaction retry executor,
/// see [`crate::Graph::execute_read`]/[`crate::Graph::execute_write`].
///
/// Jitter is always applied (`backon`'s full-jitter algorithm via `with_jitter()`); `backon`
/// does not expose a way to parameterize its strength, so there's no `jitter_factor` field here
/// to configure it with.
#[derive(Debug, Clone)]
pub struct BackoffConfig {
    pub(crate) initial_delay: Duration,
    pub(crate) multiplier: f32,
    pub(crate) max_elapsed_time: Duration,
}

impl Default for BackoffConfig {
    fn default() -> Self {
        BackoffConfig {
            initial_delay: Duration::from_secs(1),
            multiplier: 2.0,
            max_elapsed_time: DEFAULT_MAX_TRANSACTION_RETRY_TIME,
        }
    }
}

impl BackoffConfig {
    pub(crate) fn to_exponential_builder(&self) -> backon::ExponentialBuilder {
        backon::ExponentialBuilder::default()
            .with_min_delay(self.initial_delay)
            .with_factor(self.multiplier)
            .with_jitter()
            .with_total_delay(Some(self.max_elapsed_time))
            .without_max_times()
    }
}

/// A custom resolver for the initial set of addresses to contact, used before the first
/// routing table is fetched. See [`ConfigBuilder::with_resolver`].
pub type AddressResolver = Arc<dyn Fn(&str) -> Vec<String> + Send + Sync>;

/// The configuration used to connect to the database, see [`crate::Graph::connect`].
#[derive(Clone)]
pub struct Config {
    pub(crate) uri: String,
    pub(crate) auth: AuthToken,
    pub(crate) routing: bool,
    pub(crate) tls: TlsConfig,
    pub(crate) max_connections: usize,
    pub(crate) db: Option<Database>,
    pub(crate) fetch_size: usize,
    pub(crate) user_agent: String,
    pub(crate) connection_timeout: Duration,
    pub(crate) connection_acquisition_timeout: Duration,
    pub(crate) max_connection_lifetime: Option<Duration>,
    pub(crate) disable_lossless_integers: bool,
    pub(crate) backoff: BackoffConfig,
    pub(crate) resolver: Option<AddressResolver>,
}

impl fmt::Debug for Config {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Config")
            .field("uri", &self.uri)
            .field("routing", &self.routing)
            .field("tls", &self.tls)
            .field("max_connections", &self.max_connections)
            .field("db", &self.db)
            .field("fetch_size", &self.fetch_size)
            .field("user_agent", &self.user_agent)
            .finish_non_exhaustive()
    }
}

impl Config {
    pub(crate) fn into_live_config(self) -> LiveConfig {
        LiveConfig {
            db: self.db,
            fetch_size: self.fetch_size,
            backoff: self.backoff,
        }
    }
}

/// The subset of [`Config`] a [`crate::Graph`] keeps around after connecting, used as the default
/// for every call that doesn't specify its own database/fetch size.
#[derive(Clone)]
pub(crate) struct LiveConfig {
    pub(crate) db: Option<Database>,
    pub(crate) fetch_size: usize,
    pub(crate) backoff: BackoffConfig,
}

/// A builder to override default configurations and build the [`Config`].
pub struct ConfigBuilder {
    uri: Option<String>,
    user: Option<String>,
    password: Option<String>,
    auth: Option<AuthToken>,
    db: Option<Database>,
    fetch_size: usize,
    max_connections: usize,
    user_agent: String,
    encrypted: Option<bool>,
    trust: Trust,
    connection_timeout: Duration,
    connection_acquisition_timeout: Duration,
    max_connection_lifetime: Option<Duration>,
    disable_lossless_integers: bool,
    backoff: BackoffConfig,
    resolver: Option<AddressResolver>,
}

/// Returns a new [`ConfigBuilder`] with default values, see [`ConfigBuilder::new`].
pub fn config() -> ConfigBuilder {
    ConfigBuilder::new()
}

impl ConfigBuilder {
    /// Creates a new `ConfigBuilder` with default values.
    pub fn new() -> Self {
        Self::default()
    }

    /// The uri of the Neo4j server, e.g. "127.0.0.1:7687" or "neo4j://my-cluster:7687".
    ///
    /// The scheme determines whether client-side routing is used (`neo4j`, `neo4j+s`,
    /// `neo4j+ssc`) or a direct connection (`bolt`, `bolt+s`, `bolt+ssc`), and a `+s`/`+ssc`
    /// suffix implies encryption; it is an error to also call [`ConfigBuilder::encrypted`] with a
    /// conflicting value.
    pub fn uri(mut self, uri: impl Into<String>) -> Self {
        self.uri = Some(uri.into());
        self
    }

    /// The username for authenticating with the Neo4j server using the basic auth scheme.
    pub fn user(mut self, user: impl Into<String>) -> Self {
        self.user = Some(user.into());
        self
    }

    /// The password for authenticating with the Neo4j server using the basic auth scheme.
    pub fn password(mut self, password: impl Into<String>) -> Self {
        self.password = Some(password.into());
        self
    }

    /// Overrides the auth token entirely, for bearer/kerberos/custom auth providers.
    pub fn auth_token(mut self, auth: AuthToken) -> Self {
        self.auth = Some(auth);
        self
    }

    /// Whether the connection should be encrypted. Defaults to what the URI scheme implies
    /// (`false` for `bolt`/`neo4j`, `true` for the `+s`/`+ssc` variants).
    pub fn encrypted(mut self, encrypted: bool) -> Self {
        self.encrypted = Some(encrypted);
        self
    }

    /// How the server's certificate should be validated. Defaults to the platform's native root
    /// store, unless the URI scheme is `+ssc`, which trusts any certificate.
    pub fn trust(mut self, trust: Trust) -> Self {
        self.trust = trust;
        self
    }

    /// The name of the database to connect to. If unset, the server's configured default
    /// database is used, resolved lazily on first use.
    pub fn db(mut self, db: impl Into<Database>) -> Self {
        self.db = Some(db.into());
        self
    }

    /// `fetch_size` indicates the number of rows to fetch from server in one request.
    /// It is recommended to use a large `fetch_size` if you are working with large data sets.
    ///
    /// Defaults to 200 if not set.
    pub fn fetch_size(mut self, fetch_size: usize) -> Self {
        self.fetch_size = fetch_size;
        self
    }

    /// The maximum number of connections in the connection pool.
    ///
    /// Defaults to 16 if not set.
    pub fn max_connections(mut self, max_connections: usize) -> Self {
        self.max_connections = max_connections;
        self
    }

    /// A user agent string sent during the `HELLO` handshake. Defaults to `boltdrive/<version>`.
    pub fn user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = user_agent.into();
        self
    }

    /// How long to wait for the TCP connection and handshake to complete.
    pub fn connection_timeout(mut self, timeout: Duration) -> Self {
        self.connection_timeout = timeout;
        self
    }

    /// How long a caller is willing to wait for a connection to become available in the pool.
    pub fn connection_acquisition_timeout(mut self, timeout: Duration) -> Self {
        self.connection_acquisition_timeout = timeout;
        self
    }

    /// The maximum lifetime of a pooled connection before it is discarded and replaced.
    pub fn max_connection_lifetime(mut self, lifetime: Duration) -> Self {
        self.max_connection_lifetime = Some(lifetime);
        self
    }

    /// The maximum accumulated delay before a managed transaction gives up retrying.
    ///
    /// Defaults to 30s.
    pub fn max_transaction_retry_time(mut self, max_elapsed_time: Duration) -> Self {
        self.backoff.max_elapsed_time = max_elapsed_time;
        self
    }

    /// When set, integers returned by the server that don't fit in an `f64` without loss of
    /// precision are coerced to `f64` (saturating to infinity on overflow) rather than kept as
    /// exact `i64` values.
    pub fn disable_lossless_integers(mut self, disable: bool) -> Self {
        self.disable_lossless_integers = disable;
        self
    }

    /// A custom resolver used to expand the initial contact address before the first routing
    /// table is fetched, e.g. to resolve a DNS name that round-robins over multiple cluster
    /// members.
    pub fn with_resolver<F>(mut self, resolver: F) -> Self
    where
        F: Fn(&str) -> Vec<String> + Send + Sync + 'static,
    {
        self.resolver = Some(Arc::new(resolver));
        self
    }

    pub fn build(self) -> Result<Config> {
        let uri = self.uri.ok_or(Error::InvalidConfig)?;
        let parsed = NeoUrl::parse(&uri)?;
        let (routing, scheme_encrypted, scheme_trust) = parsed.routing_and_tls_hint()?;

        let encrypted = match (self.encrypted, scheme_encrypted) {
            (Some(a), Some(b)) if a != b => return Err(Error::ConflictingEncryptionConfig),
            (Some(a), _) => a,
            (None, Some(b)) => b,
            (None, None) => false,
        };

        let trust = scheme_trust.unwrap_or(self.trust);

        let auth = match (self.auth, self.user, self.password) {
            (Some(auth), _, _) => auth,
            (None, Some(user), Some(password)) => AuthToken::basic(user, password),
            (None, None, None) => AuthToken::None,
            _ => return Err(Error::InvalidConfig),
        };

        Ok(Config {
            uri,
            auth,
            routing,
            tls: TlsConfig { encrypted, trust },
            max_connections: self.max_connections,
            db: self.db,
            fetch_size: self.fetch_size,
            user_agent: self.user_agent,
            connection_timeout: self.connection_timeout,
            connection_acquisition_timeout: self.connection_acquisition_timeout,
            max_connection_lifetime: self.max_connection_lifetime,
            disable_lossless_integers: self.disable_lossless_integers,
            backoff: self.backoff,
            resolver: self.resolver,
        })
    }
}

impl Default for ConfigBuilder {
    fn default() -> Self {
        ConfigBuilder {
            uri: None,
            user: None,
            password: None,
            auth: None,
            db: None,
            max_connections: DEFAULT_MAX_CONNECTIONS,
            fetch_size: DEFAULT_FETCH_SIZE,
            user_agent: DEFAULT_USER_AGENT.to_owned(),
            encrypted: None,
            trust: Trust::TrustSystemCas,
            connection_timeout: DEFAULT_CONNECTION_TIMEOUT,
            connection_acquisition_timeout: DEFAULT_CONNECTION_ACQUISITION_TIMEOUT,
            max_connection_lifetime: None,
            disable_lossless_integers: false,
            backoff: BackoffConfig::default(),
            resolver: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn should_build_config() {
        let config = ConfigBuilder::default()
            .uri("bolt://127.0.0.1:7687")
            .user("some_user")
            .password("some_password")
            .db("some_db")
            .fetch_size(10)
            .max_connections(5)
            .build()
            .unwrap();
        assert_eq!(config.uri, "bolt://127.0.0.1:7687");
        assert_eq!(config.db.as_deref(), Some("some_db"));
        assert_eq!(config.fetch_size, 10);
        assert_eq!(config.max_connections, 5);
        assert!(!config.routing);
        assert!(!config.tls.encrypted);
    }

    #[test]
    fn should_build_with_defaults() {
        let config = ConfigBuilder::default()
            .uri("127.0.0.1:7687")
            .user("some_user")
            .password("some_password")
            .build()
            .unwrap();
        assert_eq!(config.db, None);
        assert_eq!(config.fetch_size, 200);
        assert_eq!(config.max_connections, 16);
    }

    #[test]
    fn should_reject_missing_uri() {
        assert!(ConfigBuilder::default()
            .user("some_user")
            .password("some_password")
            .build()
            .is_err());
    }

    #[test]
    fn neo4j_scheme_enables_routing() {
        let config = ConfigBuilder::default()
            .uri("neo4j://cluster:7687")
            .user("neo4j")
            .password("pw")
            .build()
            .unwrap();
        assert!(config.routing);
        assert!(!config.tls.encrypted);
    }

    #[test]
    fn plus_s_scheme_implies_encryption() {
        let config = ConfigBuilder::default()
            .uri("neo4j+s://cluster:7687")
            .user("neo4j")
            .password("pw")
            .build()
            .unwrap();
        assert!(config.routing);
        assert!(config.tls.encrypted);
    }

    #[test]
    fn conflicting_encryption_is_an_error() {
        let result = ConfigBuilder::default()
            .uri("bolt+s://localhost:7687")
            .user("neo4j")
            .password("pw")
            .encrypted(false)
            .build();
        assert!(matches!(result, Err(Error::ConflictingEncryptionConfig)));
    }
}
