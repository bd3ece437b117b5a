//! NNTP client for one upstream connection
//!
//! The client is strictly single-request: every call reads its complete
//! response before returning, except the article calls, which hand back a
//! [`DotReader`](crate::codec::DotReader) borrowing the client until the body
//! is consumed.
//!
//! Any error leaves the connection in an unknown position in the stream. The
//! client then refuses further commands with
//! [`NntpError::ConnectionBroken`](crate::NntpError::ConnectionBroken); the
//! owner is expected to drop it and connect again.

mod articles;
mod auth;
mod connection;
mod group_ops;
mod io;
mod metadata;

pub use articles::ArticleResponse;
pub use connection::NntpStream;

use crate::capabilities::Capabilities;
use crate::codec::Codec;
use tokio::io::{AsyncRead, AsyncWrite};
use tracing::debug;

/// Async NNTP client over plain TCP, TLS, or any supplied transport
///
/// # Example
///
/// ```no_run
/// use newsrelay::{BackendConfig, NntpClient};
/// use std::sync::Arc;
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let config = BackendConfig::tls("source", "news.example.com");
/// let mut client = NntpClient::connect(Arc::new(config)).await?;
/// client.authenticate("user", "pass").await?;
///
/// let info = client.select_group("alt.test").await?;
/// println!("Group has {} articles", info.count);
/// # Ok(())
/// # }
/// ```
#[must_use]
pub struct NntpClient<S = NntpStream> {
    codec: Codec<S>,
    /// Whether the transport is TLS wrapped
    tls: bool,
    /// Message of the server's 200 greeting
    banner: String,
    /// Filled by the first CAPABILITIES call
    capabilities: Option<Capabilities>,
    /// Whether this connection saw an error and must be discarded
    is_broken: bool,
}

impl<S> NntpClient<S>
where
    S: AsyncRead + AsyncWrite + Unpin,
{
    /// Check if this connection is broken and should be discarded
    pub fn is_broken(&self) -> bool {
        self.is_broken
    }

    /// Mark this connection as broken
    fn mark_broken(&mut self) {
        self.is_broken = true;
    }

    /// Whether the connection is TLS wrapped
    pub fn has_tls(&self) -> bool {
        self.tls
    }

    /// Greeting message sent by the server on connect
    pub fn banner(&self) -> &str {
        &self.banner
    }
}

impl<S> Drop for NntpClient<S> {
    fn drop(&mut self) {
        debug!("NntpClient dropped");
    }
}
