//! Downstream NNTP server
//!
//! One [`Session`] runs per accepted connection. Each command line is split
//! on whitespace and dispatched through a table keyed by the lower-cased
//! verb; unknown verbs go to a default handler answering 500.
//!
//! A handler either writes a complete response, returns
//! [`NntpError::Protocol`](crate::NntpError::Protocol) (written back to the
//! peer as a coded line), returns [`Step::Close`] (QUIT), or fails with any
//! other error, which drops the connection without a reply.

mod handlers;
mod session;
pub mod status;

pub use session::{Session, SessionState};

use crate::codec::Codec;
use crate::error::Result;
use crate::operator::Operator;
use std::collections::HashMap;
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;
use tokio::io::{AsyncRead, AsyncWrite};
use tracing::{debug, warn};

/// Any bidirectional byte stream a session can run over
pub trait Transport: AsyncRead + AsyncWrite + Unpin + Send {}

impl<T> Transport for T where T: AsyncRead + AsyncWrite + Unpin + Send {}

/// Framed downstream connection as seen by handlers
pub type Conn = Codec<Box<dyn Transport>>;

/// What the session does after a handler returns successfully
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Step {
    Continue,
    /// End the session (QUIT)
    Close,
}

pub type HandlerFuture<'a> = Pin<Box<dyn Future<Output = Result<Step>> + Send + 'a>>;

/// Command handler: arguments after the verb, the session, the connection
pub type Handler = for<'a> fn(Vec<String>, &'a mut Session, &'a mut Conn) -> HandlerFuture<'a>;

/// Handler table keyed by lower-cased command name
///
/// The empty key holds the fallback for unknown commands.
pub type HandlerTable = HashMap<&'static str, Handler>;

/// NNTP server handle
#[derive(Clone)]
pub struct NntpServer {
    handlers: Arc<HandlerTable>,
    operator: Arc<dyn Operator>,
}

impl NntpServer {
    /// Server whose sessions start with `operator`
    pub fn new(operator: Arc<dyn Operator>) -> Self {
        let mut table: HandlerTable = HashMap::new();
        table.insert("", handlers::handle_default);
        table.insert("quit", handlers::handle_quit);
        table.insert("group", handlers::handle_group);
        table.insert("list", handlers::handle_list);
        table.insert("head", handlers::handle_head);
        table.insert("body", handlers::handle_body);
        table.insert("article", handlers::handle_article);
        table.insert("capabilities", handlers::handle_capabilities);
        table.insert("mode", handlers::handle_mode);
        table.insert("authinfo", handlers::handle_authinfo);
        table.insert("newgroups", handlers::handle_newgroups);
        table.insert("over", handlers::handle_over);
        table.insert("xover", handlers::handle_over);

        Self {
            handlers: Arc::new(table),
            operator,
        }
    }

    /// Serve one connection until QUIT, hang-up, or a fatal error
    pub async fn process<T>(&self, stream: T)
    where
        T: Transport + 'static,
    {
        let stream: Box<dyn Transport> = Box::new(stream);
        let mut conn: Conn = Codec::new(stream);
        let session = Session::new(Arc::clone(&self.operator));

        match session.run(&mut conn, &self.handlers).await {
            Ok(state) => debug!("Session ended ({:?})", state),
            Err(e) => warn!("Error dispatching command, dropping conn: {}", e),
        }
    }
}

/// Parse an OVER/XOVER range: `""`, `"N"` or `"N-M"`
///
/// An empty range covers everything and a single number `N` means `0..=N`.
/// An unparseable upper bound becomes `i64::MAX`, an unparseable lower
/// bound becomes 0.
pub fn parse_range(spec: &str) -> (i64, i64) {
    if spec.is_empty() {
        return (0, i64::MAX);
    }
    match spec.split_once('-') {
        None => (0, spec.parse().unwrap_or(i64::MAX)),
        Some((low, high)) => (low.parse().unwrap_or(0), high.parse().unwrap_or(i64::MAX)),
    }
}
