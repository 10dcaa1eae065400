//! A single Bolt TCP/TLS connection: handshake, chunked framing, and request/response exchange.

use crate::{
    auth::AuthToken,
    config::{Config, Trust},
    errors::{Error, Result},
    messages::{BoltRequest, BoltResponse},
    types::{BoltList, BoltMap},
    version::Version,
};
use bytes::{Bytes, BytesMut};
use std::{
    io::BufReader,
    mem,
    sync::Arc,
};
use stream::ConnectionStream;
use tokio::{
    io::{AsyncReadExt, AsyncWriteExt, BufStream},
    net::TcpStream,
};
use tokio_rustls::{
    rustls::{
        client::danger::{HandshakeSignatureValid, ServerCertVerified, ServerCertVerifier},
        pki_types::{CertificateDer, ServerName, UnixTime},
        ClientConfig, RootCertStore,
    },
    TlsConnector,
};
use url::{Host, Url};

const MAX_CHUNK_SIZE: usize = 65_535 - mem::size_of::<u16>();

/// A single connection to a Bolt server: handshake state plus the chunked framing layer.
///
/// Not `Clone`: each connection belongs to exactly one [`crate::pool::ConnectionManager`] slot
/// at a time, checked out through [`deadpool::managed::Pool`].
#[derive(Debug)]
pub struct Connection {
    version: Version,
    stream: BufStream<ConnectionStream>,
    server_agent: Option<String>,
    address: String,
}

impl Connection {
    /// Opens a TCP (and, if requested, TLS) connection to `info`'s address, performs the
    /// handshake, and sends `HELLO`.
    pub(crate) async fn new(info: &ConnectionInfo) -> Result<Connection> {
        let stream = match &info.host {
            Host::Domain(domain) => TcpStream::connect((&**domain, info.port)).await?,
            Host::Ipv4(ip) => TcpStream::connect((*ip, info.port)).await?,
            Host::Ipv6(ip) => TcpStream::connect((*ip, info.port)).await?,
        };

        let mut connection = match info.tls.encrypted {
            false => Self::init(stream).await?,
            true => Self::init_tls(stream, &info.host, &info.tls.trust).await?,
        };
        connection.address = format!("{}:{}", info.host, info.port);

        connection
            .hello(&info.auth, &info.user_agent, info.routing_context.clone())
            .await?;
        Ok(connection)
    }

    async fn init(stream: TcpStream) -> Result<Connection> {
        Self::handshake(stream.into()).await
    }

    async fn init_tls<T: AsRef<str>>(
        stream: TcpStream,
        host: &Host<T>,
        trust: &Trust,
    ) -> Result<Connection> {
        let config = build_tls_config(trust)?;
        let connector = TlsConnector::from(Arc::new(config));

        let domain = match host {
            Host::Domain(domain) => ServerName::try_from(domain.as_ref().to_owned())
                .map_err(|_| Error::InvalidDnsName(domain.as_ref().to_owned()))?,
            Host::Ipv4(ip) => ServerName::IpAddress((*ip).into()),
            Host::Ipv6(ip) => ServerName::IpAddress((*ip).into()),
        };

        let stream = connector.connect(domain, stream).await?;
        Self::handshake(stream.into()).await
    }

    async fn handshake(stream: ConnectionStream) -> Result<Connection> {
        let mut stream = BufStream::new(stream);
        stream.write_all(&[0x60, 0x60, 0xB0, 0x17]).await?;
        stream.write_all(&Version::supported_versions()).await?;
        stream.flush().await?;
        let mut response = [0, 0, 0, 0];
        stream.read_exact(&mut response).await?;
        let version = Version::parse(response)?;
        Ok(Connection {
            version,
            stream,
            server_agent: None,
            address: String::new(),
        })
    }

    async fn hello(
        &mut self,
        auth: &AuthToken,
        user_agent: &str,
        routing: Option<BoltMap>,
    ) -> Result<()> {
        let hello = BoltRequest::hello_from_auth(auth.to_extra(), user_agent, routing, self.version);
        match self.send_recv(hello).await? {
            BoltResponse::Success(s) => {
                self.server_agent = s.get::<String>("server");
                Ok(())
            }
            other => Err(other.into_error("HELLO")),
        }
    }

    pub async fn version(&self) -> Version {
        self.version
    }

    /// The server-reported agent string from `HELLO`'s response, if any.
    pub(crate) fn server_agent(&self) -> Option<&str> {
        self.server_agent.as_deref()
    }

    /// The `host:port` this connection is dialed to.
    pub(crate) fn address(&self) -> &str {
        &self.address
    }

    pub async fn reset(&mut self) -> Result<()> {
        match self.send_recv(BoltRequest::reset()).await? {
            BoltResponse::Success(_) => Ok(()),
            other => Err(other.into_error("RESET")),
        }
    }

    pub async fn goodbye(&mut self) -> Result<()> {
        let bytes = BoltRequest::goodbye().into_bytes(self.version)?;
        self.send_bytes(bytes).await
    }

    pub async fn send_recv(&mut self, message: BoltRequest) -> Result<BoltResponse> {
        self.send(message).await?;
        self.recv().await
    }

    pub async fn send(&mut self, message: BoltRequest) -> Result<()> {
        let bytes: Bytes = message.into_bytes(self.version)?;
        self.send_bytes(bytes).await
    }

    pub async fn recv(&mut self) -> Result<BoltResponse> {
        let bytes = self.recv_bytes().await?;
        BoltResponse::parse(self.version, bytes)
    }

    /// Runs a one-shot Cypher query to completion and returns all records, used for the
    /// `CALL dbms.routing.getRoutingTable(...)` procedure call.
    pub(crate) async fn run_to_completion(
        &mut self,
        query: &str,
        params: BoltMap,
    ) -> Result<Vec<BoltList>> {
        match self.send_recv(BoltRequest::run("", query, params)).await? {
            BoltResponse::Success(_) => {}
            other => return Err(other.into_error("RUN")),
        }

        let mut records = Vec::new();
        loop {
            match self.send_recv(BoltRequest::pull(-1, -1)).await? {
                BoltResponse::Success(s) => {
                    let has_more: Option<bool> = s.get("has_more");
                    if has_more != Some(true) {
                        break;
                    }
                }
                BoltResponse::Record(record) => records.push(record.data),
                other => return Err(other.into_error("PULL")),
            }
        }
        Ok(records)
    }

    async fn send_bytes(&mut self, bytes: Bytes) -> Result<()> {
        let end_marker: [u8; 2] = [0, 0];
        for c in bytes.chunks(MAX_CHUNK_SIZE) {
            self.stream.write_u16(c.len() as u16).await?;
            self.stream.write_all(c).await?;
        }
        self.stream.write_all(&end_marker).await?;
        self.stream.flush().await?;
        Ok(())
    }

    async fn recv_bytes(&mut self) -> Result<Bytes> {
        let mut bytes = BytesMut::new();
        let mut chunk_size = 0;
        while chunk_size == 0 {
            chunk_size = self.read_chunk_size().await?;
        }

        while chunk_size > 0 {
            self.read_chunk(chunk_size, &mut bytes).await?;
            chunk_size = self.read_chunk_size().await?;
        }

        Ok(bytes.freeze())
    }

    async fn read_chunk_size(&mut self) -> Result<usize> {
        Ok(usize::from(self.stream.read_u16().await?))
    }

    async fn read_chunk(&mut self, chunk_size: usize, buf: &mut BytesMut) -> Result<()> {
        let pos = buf.len();
        let new_len = pos + chunk_size;
        if buf.capacity() < new_len {
            buf.reserve(new_len - buf.capacity());
        }
        unsafe {
            buf.set_len(new_len);
        }
        self.stream.read_exact(&mut buf[pos..]).await?;
        Ok(())
    }
}

fn build_tls_config(trust: &Trust) -> Result<ClientConfig> {
    let builder = ClientConfig::builder();

    let config = match trust {
        Trust::TrustAny => builder
            .dangerous()
            .with_custom_certificate_verifier(Arc::new(AcceptAnyServerCert))
            .with_no_client_auth(),
        Trust::TrustSystemCas => {
            let mut store = RootCertStore::empty();
            for cert in rustls_native_certs::load_native_certs().certs {
                let _ = store.add(cert);
            }
            builder.with_root_certificates(store).with_no_client_auth()
        }
        Trust::TrustCustomCas(paths) => {
            let mut store = RootCertStore::empty();
            for path in paths {
                let file = std::fs::File::open(path)?;
                let mut reader = BufReader::new(file);
                for cert in rustls_pemfile::certs(&mut reader) {
                    let cert = cert.map_err(Error::IOError)?;
                    store
                        .add(cert)
                        .map_err(|e| Error::TlsError(e.into()))?;
                }
            }
            builder.with_root_certificates(store).with_no_client_auth()
        }
    };

    Ok(config)
}

/// Accepts any certificate the server presents. Only for [`Trust::TrustAny`], i.e. `+ssc` URIs
/// or an explicit opt-in, never the default.
#[derive(Debug)]
struct AcceptAnyServerCert;

impl ServerCertVerifier for AcceptAnyServerCert {
    fn verify_server_cert(
        &self,
        _end_entity: &CertificateDer<'_>,
        _intermediates: &[CertificateDer<'_>],
        _server_name: &ServerName<'_>,
        _ocsp_response: &[u8],
        _now: UnixTime,
    ) -> std::result::Result<ServerCertVerified, tokio_rustls::rustls::Error> {
        Ok(ServerCertVerified::assertion())
    }

    fn verify_tls12_signature(
        &self,
        _message: &[u8],
        _cert: &CertificateDer<'_>,
        _dss: &tokio_rustls::rustls::DigitallySignedStruct,
    ) -> std::result::Result<HandshakeSignatureValid, tokio_rustls::rustls::Error> {
        Ok(HandshakeSignatureValid::assertion())
    }

    fn verify_tls13_signature(
        &self,
        _message: &[u8],
        _cert: &CertificateDer<'_>,
        _dss: &tokio_rustls::rustls::DigitallySignedStruct,
    ) -> std::result::Result<HandshakeSignatureValid, tokio_rustls::rustls::Error> {
        Ok(HandshakeSignatureValid::assertion())
    }

    fn supported_verify_schemes(&self) -> Vec<tokio_rustls::rustls::SignatureScheme> {
        use tokio_rustls::rustls::SignatureScheme::*;
        vec![
            RSA_PKCS1_SHA1,
            ECDSA_SHA1_Legacy,
            RSA_PKCS1_SHA256,
            ECDSA_NISTP256_SHA256,
            RSA_PKCS1_SHA384,
            ECDSA_NISTP384_SHA384,
            RSA_PKCS1_SHA512,
            ECDSA_NISTP521_SHA512,
            RSA_PSS_SHA256,
            RSA_PSS_SHA384,
            RSA_PSS_SHA512,
            ED25519,
        ]
    }
}

/// Everything a [`Connection`] needs to dial and authenticate with one server: resolved from
/// [`Config`] for the initial contact point, or from a routing table entry for a cluster member.
#[derive(Clone)]
pub(crate) struct ConnectionInfo {
    pub(crate) host: Host<Arc<str>>,
    pub(crate) port: u16,
    pub(crate) auth: AuthToken,
    pub(crate) tls: crate::config::TlsConfig,
    pub(crate) user_agent: String,
    pub(crate) routing_context: Option<BoltMap>,
}

impl ConnectionInfo {
    pub(crate) fn from_config(config: &Config) -> Result<Self> {
        let url = NeoUrl::parse(&config.uri)?;
        Self::build(url.host_owned(), url.port(), config)
    }

    /// Builds connection info for a specific routing-table member address (`host:port`), reusing
    /// the auth/TLS/user-agent from `config`.
    pub(crate) fn for_address(address: &str, config: &Config) -> Result<Self> {
        let url = NeoUrl::parse(address)?;
        Self::build(url.host_owned(), url.port(), config)
    }

    fn build(host: Host<Arc<str>>, port: u16, config: &Config) -> Result<Self> {
        let routing_context = config.routing.then(|| {
            let mut ctx = BoltMap::default();
            ctx.put("address".into(), config.uri.as_str().into());
            ctx
        });
        Ok(Self {
            host,
            port,
            auth: config.auth.clone(),
            tls: config.tls.clone(),
            user_agent: config.user_agent.clone(),
            routing_context,
        })
    }
}

/// A Neo4j connection URI: `<scheme>://<host>[:<port>]`, where the scheme selects routing
/// (`neo4j*`) vs. direct connection (`bolt*`) and encryption (`*+s`/`*+ssc`).
pub(crate) struct NeoUrl(Url);

impl NeoUrl {
    pub(crate) fn parse(uri: &str) -> Result<Self> {
        let url = match Url::parse(uri) {
            Ok(url) if url.has_host() => url,
            Ok(_) | Err(url::ParseError::RelativeUrlWithoutBase) => {
                Url::parse(&format!("bolt://{}", uri))?
            }
            Err(err) => return Err(Error::UrlParseError(err)),
        };

        Ok(Self(url))
    }

    pub(crate) fn scheme(&self) -> &str {
        self.0.scheme()
    }

    pub(crate) fn host(&self) -> Host<&str> {
        self.0.host().unwrap()
    }

    pub(crate) fn host_owned(&self) -> Host<Arc<str>> {
        match self.host() {
            Host::Domain(s) => Host::Domain(Arc::from(s)),
            Host::Ipv4(ip) => Host::Ipv4(ip),
            Host::Ipv6(ip) => Host::Ipv6(ip),
        }
    }

    pub(crate) fn port(&self) -> u16 {
        self.0.port().unwrap_or(7687)
    }

    /// Derives `(routing, encrypted, trust)` from the URI scheme: `neo4j*` schemes imply
    /// client-side routing, `*+s` implies full TLS validation, `*+ssc` implies TLS with any
    /// certificate accepted.
    pub(crate) fn routing_and_tls_hint(&self) -> Result<(bool, Option<bool>, Option<Trust>)> {
        match self.scheme() {
            "bolt" | "" => Ok((false, None, None)),
            "bolt+s" => Ok((false, Some(true), Some(Trust::TrustSystemCas))),
            "bolt+ssc" => Ok((false, Some(true), Some(Trust::TrustAny))),
            "neo4j" => Ok((true, None, None)),
            "neo4j+s" => Ok((true, Some(true), Some(Trust::TrustSystemCas))),
            "neo4j+ssc" => Ok((true, Some(true), Some(Trust::TrustAny))),
            other => Err(Error::UnsupportedScheme(other.to_owned())),
        }
    }
}

mod stream {
    use pin_project_lite::pin_project;
    use tokio::{
        io::{AsyncRead, AsyncWrite},
        net::TcpStream,
    };
    use tokio_rustls::client::TlsStream;

    pin_project! {
        #[project = ConnectionStreamProj]
        #[derive(Debug)]
        pub(super) enum ConnectionStream {
            Unencrypted { #[pin] stream: TcpStream },
            Encrypted { #[pin] stream: TlsStream<TcpStream> },
        }
    }

    impl From<TcpStream> for ConnectionStream {
        fn from(stream: TcpStream) -> Self {
            ConnectionStream::Unencrypted { stream }
        }
    }

    impl From<TlsStream<TcpStream>> for ConnectionStream {
        fn from(stream: TlsStream<TcpStream>) -> Self {
            ConnectionStream::Encrypted { stream }
        }
    }

    impl AsyncRead for ConnectionStream {
        fn poll_read(
            self: std::pin::Pin<&mut Self>,
            cx: &mut std::task::Context<'_>,
            buf: &mut tokio::io::ReadBuf<'_>,
        ) -> std::task::Poll<std::io::Result<()>> {
            match self.project() {
                ConnectionStreamProj::Unencrypted { stream } => stream.poll_read(cx, buf),
                ConnectionStreamProj::Encrypted { stream } => stream.poll_read(cx, buf),
            }
        }
    }

    impl AsyncWrite for ConnectionStream {
        fn poll_write(
            self: std::pin::Pin<&mut Self>,
            cx: &mut std::task::Context<'_>,
            buf: &[u8],
        ) -> std::task::Poll<Result<usize, std::io::Error>> {
            match self.project() {
                ConnectionStreamProj::Unencrypted { stream } => stream.poll_write(cx, buf),
                ConnectionStreamProj::Encrypted { stream } => stream.poll_write(cx, buf),
            }
        }

        fn poll_flush(
            self: std::pin::Pin<&mut Self>,
            cx: &mut std::task::Context<'_>,
        ) -> std::task::Poll<Result<(), std::io::Error>> {
            match self.project() {
                ConnectionStreamProj::Unencrypted { stream } => stream.poll_flush(cx),
                ConnectionStreamProj::Encrypted { stream } => stream.poll_flush(cx),
            }
        }

        fn poll_shutdown(
            self: std::pin::Pin<&mut Self>,
            cx: &mut std::task::Context<'_>,
        ) -> std::task::Poll<Result<(), std::io::Error>> {
            match self.project() {
                ConnectionStreamProj::Unencrypted { stream } => stream.poll_shutdown(cx),
                ConnectionStreamProj::Encrypted { stream } => stream.poll_shutdown(cx),
            }
        }

        fn poll_write_vectored(
            self: std::pin::Pin<&mut Self>,
            cx: &mut std::task::Context<'_>,
            bufs: &[std::io::IoSlice<'_>],
        ) -> std::task::Poll<Result<usize, std::io::Error>> {
            match self.project() {
                ConnectionStreamProj::Unencrypted { stream } => {
                    stream.poll_write_vectored(cx, bufs)
                }
                ConnectionStreamProj::Encrypted { stream } => stream.poll_write_vectored(cx, bufs),
            }
        }

        fn is_write_vectored(&self) -> bool {
            match self {
                ConnectionStream::Unencrypted { stream } => stream.is_write_vectored(),
                ConnectionStream::Encrypted { stream } => stream.is_write_vectored(),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::NeoUrl;
    use url::Host;

    #[test]
    fn should_parse_uri() {
        let url = NeoUrl::parse("bolt://localhost:4242").unwrap();
        assert_eq!(url.port(), 4242);
        assert_eq!(url.host(), Host::Domain("localhost"));
        assert_eq!(url.scheme(), "bolt");
    }

    #[test]
    fn should_parse_uri_without_scheme() {
        let url = NeoUrl::parse("localhost:4242").unwrap();
        assert_eq!(url.port(), 4242);
        assert_eq!(url.host(), Host::Domain("localhost"));
        assert_eq!(url.scheme(), "bolt");
    }

    #[test]
    fn should_parse_ip_uri_without_scheme() {
        let url = NeoUrl::parse("127.0.0.1:4242").unwrap();
        assert_eq!(url.port(), 4242);
        assert_eq!(url.host(), Host::Domain("127.0.0.1"));
        assert_eq!(url.scheme(), "bolt");
    }

    #[test]
    fn neo4j_scheme_enables_routing() {
        let url = NeoUrl::parse("neo4j://cluster:7687").unwrap();
        let (routing, encrypted, _) = url.routing_and_tls_hint().unwrap();
        assert!(routing);
        assert_eq!(encrypted, None);
    }

    #[test]
    fn plus_ssc_trusts_any_certificate() {
        let url = NeoUrl::parse("bolt+ssc://localhost:7687").unwrap();
        let (routing, encrypted, trust) = url.routing_and_tls_hint().unwrap();
        assert!(!routing);
        assert_eq!(encrypted, Some(true));
        assert!(matches!(trust, Some(super::Trust::TrustAny)));
    }
}
