//! Connection establishment for the NNTP client
//!
//! Handles TCP dial with socket tuning, optional implicit TLS, and greeting
//! validation.

use crate::codec::Codec;
use crate::config::BackendConfig;
use crate::error::{NntpError, Result};
use crate::response::codes;
use std::io;
use std::net::ToSocketAddrs;
use std::pin::Pin;
use std::sync::Arc;
use std::task::{Context, Poll};
use std::time::Duration;
use tokio::io::{AsyncRead, AsyncWrite, ReadBuf};
use tokio::net::TcpStream;
use tokio::time::timeout;
use tokio_rustls::TlsConnector;
use tokio_rustls::client::TlsStream;
use tokio_rustls::rustls::client::danger::{
    HandshakeSignatureValid, ServerCertVerified, ServerCertVerifier,
};
use tokio_rustls::rustls::pki_types::{CertificateDer, ServerName, UnixTime};
use tokio_rustls::rustls::{ClientConfig, DigitallySignedStruct, RootCertStore, SignatureScheme};
use tracing::{debug, warn};

use super::NntpClient;

/// TCP connection timeout in seconds
const TCP_CONNECT_TIMEOUT_SECS: u64 = 30;

/// TLS handshake timeout in seconds
const TLS_HANDSHAKE_TIMEOUT_SECS: u64 = 30;

/// Transport of a dialed upstream connection
#[derive(Debug)]
pub enum NntpStream {
    /// Plain TCP connection
    Plain(TcpStream),
    /// Implicit TLS over TCP
    Tls(Box<TlsStream<TcpStream>>),
}

impl NntpStream {
    pub fn is_tls(&self) -> bool {
        matches!(self, Self::Tls(_))
    }
}

impl AsyncRead for NntpStream {
    fn poll_read(
        mut self: Pin<&mut Self>,
        cx: &mut Context<'_>,
        buf: &mut ReadBuf<'_>,
    ) -> Poll<io::Result<()>> {
        match &mut *self {
            Self::Plain(stream) => Pin::new(stream).poll_read(cx, buf),
            Self::Tls(stream) => Pin::new(stream.as_mut()).poll_read(cx, buf),
        }
    }
}

impl AsyncWrite for NntpStream {
    fn poll_write(
        mut self: Pin<&mut Self>,
        cx: &mut Context<'_>,
        buf: &[u8],
    ) -> Poll<io::Result<usize>> {
        match &mut *self {
            Self::Plain(stream) => Pin::new(stream).poll_write(cx, buf),
            Self::Tls(stream) => Pin::new(stream.as_mut()).poll_write(cx, buf),
        }
    }

    fn poll_flush(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<io::Result<()>> {
        match &mut *self {
            Self::Plain(stream) => Pin::new(stream).poll_flush(cx),
            Self::Tls(stream) => Pin::new(stream.as_mut()).poll_flush(cx),
        }
    }

    fn poll_shutdown(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<io::Result<()>> {
        match &mut *self {
            Self::Plain(stream) => Pin::new(stream).poll_shutdown(cx),
            Self::Tls(stream) => Pin::new(stream.as_mut()).poll_shutdown(cx),
        }
    }
}

/// Verifier accepting any upstream certificate, for `allow_insecure_tls`
/// backends only
#[derive(Debug)]
struct DangerousAcceptAnyCertificate;

impl ServerCertVerifier for DangerousAcceptAnyCertificate {
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
        _dss: &DigitallySignedStruct,
    ) -> std::result::Result<HandshakeSignatureValid, tokio_rustls::rustls::Error> {
        Ok(HandshakeSignatureValid::assertion())
    }

    fn verify_tls13_signature(
        &self,
        _message: &[u8],
        _cert: &CertificateDer<'_>,
        _dss: &DigitallySignedStruct,
    ) -> std::result::Result<HandshakeSignatureValid, tokio_rustls::rustls::Error> {
        Ok(HandshakeSignatureValid::assertion())
    }

    fn supported_verify_schemes(&self) -> Vec<SignatureScheme> {
        tokio_rustls::rustls::crypto::ring::default_provider()
            .signature_verification_algorithms
            .supported_schemes()
    }
}

fn tls_connector(allow_insecure_tls: bool) -> TlsConnector {
    use tokio_rustls::rustls::crypto::{CryptoProvider, ring};
    let _ = CryptoProvider::install_default(ring::default_provider());

    let tls_config = if allow_insecure_tls {
        warn!("TLS certificate validation disabled - connection vulnerable to MITM attacks");
        ClientConfig::builder()
            .dangerous()
            .with_custom_certificate_verifier(Arc::new(DangerousAcceptAnyCertificate))
            .with_no_client_auth()
    } else {
        let mut root_store = RootCertStore::empty();
        root_store.extend(webpki_roots::TLS_SERVER_ROOTS.iter().cloned());
        ClientConfig::builder()
            .with_root_certificates(root_store)
            .with_no_client_auth()
    };
    TlsConnector::from(Arc::new(tls_config))
}

/// Dial `addr` through socket2 so the socket can be tuned before connecting
async fn dial(addr: &str) -> Result<TcpStream> {
    use socket2::{Domain, Protocol, Socket, Type};

    let socket_addr = addr
        .to_socket_addrs()
        .map_err(|e| {
            NntpError::Io(io::Error::new(
                io::ErrorKind::InvalidInput,
                format!("Failed to resolve address {}: {}", addr, e),
            ))
        })?
        .next()
        .ok_or_else(|| {
            NntpError::Io(io::Error::new(
                io::ErrorKind::InvalidInput,
                format!("No address resolved for {}", addr),
            ))
        })?;

    let domain = if socket_addr.is_ipv4() {
        Domain::IPV4
    } else {
        Domain::IPV6
    };
    let socket = Socket::new(domain, Type::STREAM, Some(Protocol::TCP))?;
    socket.set_nodelay(true)?;
    if let Err(e) = socket.set_keepalive(true) {
        warn!("Failed to enable TCP keepalive: {}", e);
    }

    // socket2 connect blocks; set non-blocking only after it succeeds
    let stream = timeout(
        Duration::from_secs(TCP_CONNECT_TIMEOUT_SECS),
        tokio::task::spawn_blocking(move || -> io::Result<std::net::TcpStream> {
            socket.connect(&socket_addr.into())?;
            socket.set_nonblocking(true)?;
            Ok(socket.into())
        }),
    )
    .await
    .map_err(|_| NntpError::Timeout)?
    .map_err(|e| NntpError::Io(io::Error::other(format!("Task join error: {}", e))))??;

    Ok(TcpStream::from_std(stream)?)
}

impl NntpClient<NntpStream> {
    /// Connect to the upstream described by `config`
    ///
    /// Wraps the connection in TLS when `config.tls` is set. Does not
    /// authenticate; call [`authenticate`](Self::authenticate) afterwards.
    ///
    /// # Errors
    ///
    /// - [`NntpError::Io`] - Name resolution or TCP connection failed
    /// - [`NntpError::Tls`] - TLS handshake failed
    /// - [`NntpError::Timeout`] - Connection or handshake timed out
    /// - [`NntpError::Protocol`] - Greeting was not `200`
    pub async fn connect(config: Arc<BackendConfig>) -> Result<Self> {
        let addr = config.address();
        debug!("Connecting to NNTP server {}", addr);

        let tcp_stream = dial(&addr).await?;

        let stream = if config.tls {
            let server_name = ServerName::try_from(config.server.as_str())
                .map_err(|e| NntpError::Tls(format!("Invalid domain: {}", e)))?
                .to_owned();
            let tls_stream = timeout(
                Duration::from_secs(TLS_HANDSHAKE_TIMEOUT_SECS),
                tls_connector(config.allow_insecure_tls).connect(server_name, tcp_stream),
            )
            .await
            .map_err(|_| NntpError::Timeout)?
            .map_err(|e| NntpError::Tls(format!("TLS handshake failed: {}", e)))?;
            NntpStream::Tls(Box::new(tls_stream))
        } else {
            NntpStream::Plain(tcp_stream)
        };

        let tls = stream.is_tls();
        Self::handshake(stream, tls).await
    }
}

impl<S> NntpClient<S>
where
    S: AsyncRead + AsyncWrite + Unpin,
{
    /// Start a session over an already established transport
    ///
    /// Reads the server greeting exactly like [`NntpClient::connect`].
    pub async fn from_stream(stream: S) -> Result<Self> {
        Self::handshake(stream, false).await
    }

    async fn handshake(stream: S, tls: bool) -> Result<Self> {
        let mut codec = Codec::new(stream);
        let (code, banner) = codec.read_code_line(codes::READY).await?;
        debug!("Server greeting: {} {}", code, banner);

        Ok(Self {
            codec,
            tls,
            banner,
            capabilities: None,
            is_broken: false,
        })
    }
}
