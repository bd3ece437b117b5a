//! Capabilities, overview data and session teardown

use super::NntpClient;
use crate::capabilities::Capabilities;
use crate::commands;
use crate::error::{NntpError, Result};
use crate::response::codes;
use tokio::io::{AsyncRead, AsyncWrite};
use tracing::debug;

impl<S> NntpClient<S>
where
    S: AsyncRead + AsyncWrite + Unpin,
{
    /// Fetch server capabilities (`CAPABILITIES`, expecting 101)
    ///
    /// The list is fetched once per connection and cached; later calls
    /// return the cached copy without touching the wire.
    pub async fn capabilities(&mut self) -> Result<&Capabilities> {
        if self.capabilities.is_none() {
            debug!("Fetching capabilities");
            let response = self
                .multiline_command(commands::capabilities(), codes::CAPABILITY_LIST)
                .await?;
            self.capabilities = Some(Capabilities::parse(&response.lines));
        }
        self.cached_capabilities()
    }

    fn cached_capabilities(&self) -> Result<&Capabilities> {
        self.capabilities.as_ref().ok_or_else(|| {
            NntpError::Other("capabilities have not been fetched on this connection".to_string())
        })
    }

    /// Full capability line for `name` from the cached list
    ///
    /// # Errors
    ///
    /// - [`NntpError::Other`] - [`capabilities`](Self::capabilities) was never called
    pub fn capability(&self, name: &str) -> Result<Option<&str>> {
        Ok(self.cached_capabilities()?.get(name))
    }

    /// Whether the cached capability `name` lists `argument`
    ///
    /// # Errors
    ///
    /// - [`NntpError::Other`] - Capabilities were never fetched, or `name`
    ///   is not advertised at all
    pub fn has_capability_argument(&self, name: &str, argument: &str) -> Result<bool> {
        self.cached_capabilities()?
            .has_arg(name, argument)
            .ok_or_else(|| NntpError::Other(format!("capability {} not advertised", name)))
    }

    /// Raw overview lines (`OVER range`, expecting 224)
    ///
    /// Lines are returned tab-delimited as sent; field order is given by
    /// [`list_overview_fmt`](Self::list_overview_fmt).
    pub async fn over(&mut self, range: &str) -> Result<Vec<String>> {
        debug!("Fetching overview for {:?}", range);
        let response = self
            .multiline_command(&commands::over(range), codes::OVERVIEW_INFO_FOLLOWS)
            .await?;
        Ok(response.lines)
    }

    /// Overview field order (`LIST OVERVIEW.FMT`, expecting 215)
    pub async fn list_overview_fmt(&mut self) -> Result<Vec<String>> {
        let response = self
            .multiline_command(commands::list_overview_fmt(), codes::LIST_INFORMATION_FOLLOWS)
            .await?;
        Ok(response.lines)
    }

    /// End the session (`QUIT`, expecting 205)
    pub async fn quit(mut self) -> Result<()> {
        debug!("Sending QUIT");
        self.send_command(commands::quit()).await?;
        self.read_response(codes::CLOSING_CONNECTION).await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader, DuplexStream, duplex};

    async fn client_with(script: &[u8]) -> (NntpClient<DuplexStream>, DuplexStream) {
        let (client, mut server) = duplex(4096);
        server.write_all(b"200 ready\r\n").await.unwrap();
        server.write_all(script).await.unwrap();
        (NntpClient::from_stream(client).await.unwrap(), server)
    }

    #[tokio::test]
    async fn test_capabilities_are_cached() {
        let (mut client, server) =
            client_with(b"101 list\r\nVERSION 2\r\nreader\r\nlist active newsgroups\r\n.\r\n")
                .await;

        assert!(client.capability("READER").is_err());

        let caps = client.capabilities().await.unwrap();
        assert_eq!(caps.lines(), &["VERSION 2", "READER", "LIST ACTIVE NEWSGROUPS"]);
        // Served from the cache: the script holds no second reply
        assert!(client.capabilities().await.unwrap().has("reader"));

        assert_eq!(client.capability("version").unwrap(), Some("VERSION 2"));
        assert!(client.has_capability_argument("LIST", "NEWSGROUPS").unwrap());
        assert!(!client.has_capability_argument("LIST", "COUNTS").unwrap());
        assert!(client.has_capability_argument("OVER", "MSGID").is_err());

        let mut server = BufReader::new(server);
        let mut line = String::new();
        server.read_line(&mut line).await.unwrap();
        assert_eq!(line, "CAPABILITIES\r\n");
    }

    #[tokio::test]
    async fn test_over_returns_raw_lines() {
        let (mut client, _server) =
            client_with(b"224 overview\r\n1\tSubject\tFrom\r\n2\tOther\tFrom\r\n.\r\n").await;

        let lines = client.over("1-2").await.unwrap();
        assert_eq!(lines, vec!["1\tSubject\tFrom", "2\tOther\tFrom"]);
    }

    #[tokio::test]
    async fn test_list_overview_fmt() {
        let (mut client, _server) =
            client_with(b"215 order\r\nSubject:\r\nFrom:\r\n:bytes\r\n.\r\n").await;
        let fields = client.list_overview_fmt().await.unwrap();
        assert_eq!(fields, vec!["Subject:", "From:", ":bytes"]);
    }

    #[tokio::test]
    async fn test_quit() {
        let (client, _server) = client_with(b"205 bye\r\n").await;
        client.quit().await.unwrap();
    }
}
