//! AUTHINFO USER/PASS authentication (RFC 4643 Section 2.3)

use super::NntpClient;
use crate::commands;
use crate::error::{NntpError, Result};
use crate::response::codes;
use tokio::io::{AsyncRead, AsyncWrite};
use tracing::debug;

impl<S> NntpClient<S>
where
    S: AsyncRead + AsyncWrite + Unpin,
{
    /// Authenticate with username and password
    ///
    /// Sends `AUTHINFO USER` (expecting 381) then `AUTHINFO PASS` (expecting
    /// 281) and returns the server's acceptance message.
    ///
    /// # Errors
    ///
    /// - [`NntpError::AuthFailed`] - Server answered either step with another
    ///   code; carries the server's message
    /// - [`NntpError::ConnectionClosed`] - Server closed the connection
    pub async fn authenticate(&mut self, user: &str, pass: &str) -> Result<String> {
        debug!("Authenticating as {}", user);

        self.send_command(&commands::authinfo_user(user)).await?;
        self.expect_auth_step(codes::AUTH_CONTINUE).await?;

        self.send_command(&commands::authinfo_pass(pass)).await?;
        let message = self.expect_auth_step(codes::AUTH_ACCEPTED).await?;

        debug!("Authentication successful");
        Ok(message)
    }

    async fn expect_auth_step(&mut self, expected: u16) -> Result<String> {
        match self.read_response(expected).await {
            Ok((_, message)) => Ok(message),
            Err(NntpError::Protocol { message, .. }) => Err(NntpError::AuthFailed(message)),
            Err(e) => Err(e),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader, duplex};

    #[tokio::test]
    async fn test_authenticate_success() {
        let (client, server) = duplex(1024);
        let server = tokio::spawn(async move {
            let (read, mut write) = tokio::io::split(server);
            let mut read = BufReader::new(read);
            write.write_all(b"200 ready\r\n").await.unwrap();

            let mut line = String::new();
            read.read_line(&mut line).await.unwrap();
            assert_eq!(line, "AUTHINFO USER alice\r\n");
            write.write_all(b"381 more\r\n").await.unwrap();

            line.clear();
            read.read_line(&mut line).await.unwrap();
            assert_eq!(line, "AUTHINFO PASS secret\r\n");
            write.write_all(b"281 welcome\r\n").await.unwrap();
        });

        let mut client = NntpClient::from_stream(client).await.unwrap();
        let message = client.authenticate("alice", "secret").await.unwrap();
        assert_eq!(message, "welcome");
        server.await.unwrap();
    }

    #[tokio::test]
    async fn test_authenticate_rejected_user() {
        let (client, mut server) = duplex(1024);
        server
            .write_all(b"200 ready\r\n481 unknown user\r\n")
            .await
            .unwrap();

        let mut client = NntpClient::from_stream(client).await.unwrap();
        match client.authenticate("mallory", "x").await {
            Err(NntpError::AuthFailed(message)) => assert_eq!(message, "unknown user"),
            other => panic!("expected auth failure, got {other:?}"),
        }
        assert!(client.is_broken());
    }

    #[tokio::test]
    async fn test_authenticate_rejected_password() {
        let (client, mut server) = duplex(1024);
        server
            .write_all(b"200 ready\r\n381 more\r\n481 bad password\r\n")
            .await
            .unwrap();

        let mut client = NntpClient::from_stream(client).await.unwrap();
        let err = client.authenticate("alice", "wrong").await.unwrap_err();
        assert!(matches!(err, NntpError::AuthFailed(m) if m == "bad password"));
    }
}
