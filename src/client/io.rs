//! Command transmission and response reading for the client
//!
//! Every primitive here marks the client broken on failure, so callers only
//! need `?`.

use super::NntpClient;
use crate::error::{NntpError, Result};
use crate::response::NntpResponse;
use tokio::io::{AsyncRead, AsyncWrite};

impl<S> NntpClient<S>
where
    S: AsyncRead + AsyncWrite + Unpin,
{
    /// Record a failed call before handing the error back
    pub(super) fn check<T>(&mut self, result: Result<T>) -> Result<T> {
        if result.is_err() {
            self.mark_broken();
        }
        result
    }

    /// Send one command line
    ///
    /// Refused when an earlier call failed, or when the body of an article
    /// response was abandoned before its terminator.
    pub(super) async fn send_command(&mut self, command: &str) -> Result<()> {
        if self.is_broken {
            return Err(NntpError::ConnectionBroken(
                "connection was left in an unknown state by an earlier error".to_string(),
            ));
        }
        if self.codec.in_block() {
            self.mark_broken();
            return Err(NntpError::ConnectionBroken(
                "previous response body was not consumed".to_string(),
            ));
        }
        let result = self.codec.print_line(command).await;
        self.check(result)
    }

    /// Read a status line that must carry `expected`
    pub(super) async fn read_response(&mut self, expected: u16) -> Result<(u16, String)> {
        let result = self.codec.read_code_line(expected).await;
        self.check(result)
    }

    /// Read a status line that must carry `expected`, followed by its dot-block
    pub(super) async fn read_multiline_response(&mut self, expected: u16) -> Result<NntpResponse> {
        let result = self.codec.read_multiline(expected).await;
        self.check(result)
    }

    /// Send `command` and read a multi-line response with status `expected`
    pub(super) async fn multiline_command(
        &mut self,
        command: &str,
        expected: u16,
    ) -> Result<NntpResponse> {
        self.send_command(command).await?;
        self.read_multiline_response(expected).await
    }

    /// Send an arbitrary command line and require status `expected`
    ///
    /// Low-level escape hatch for commands without a dedicated method. Only
    /// valid for commands answered by a single status line.
    ///
    /// # Errors
    ///
    /// - [`NntpError::Protocol`] - Server answered with another code
    /// - [`NntpError::ConnectionBroken`] - Client is unusable after an earlier error
    pub async fn command(&mut self, line: &str, expected: u16) -> Result<(u16, String)> {
        self.send_command(line).await?;
        self.read_response(expected).await
    }
}
