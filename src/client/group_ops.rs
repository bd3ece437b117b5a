//! Newsgroup listing and selection

use super::NntpClient;
use crate::commands::{self, GroupInfo};
use crate::error::{NntpError, Result};
use crate::response::codes;
use crate::types::Group;
use tokio::io::{AsyncRead, AsyncWrite};
use tracing::debug;

impl<S> NntpClient<S>
where
    S: AsyncRead + AsyncWrite + Unpin,
{
    /// List newsgroups (`LIST [pattern]`, expecting 215)
    ///
    /// Each line is read as `name high low`. Lines whose bounds do not parse
    /// are skipped rather than failing the listing. Returned groups carry no
    /// source; the caller assigns it.
    ///
    /// # Errors
    ///
    /// - [`NntpError::Protocol`](crate::NntpError::Protocol) - Server answered with another code
    pub async fn list_groups(&mut self, pattern: Option<&str>) -> Result<Vec<Group>> {
        debug!("Listing groups (pattern: {:?})", pattern);

        let response = self
            .multiline_command(&commands::list(pattern), codes::LIST_INFORMATION_FOLLOWS)
            .await?;
        let groups = commands::parse_active_lines(&response.lines);

        debug!(
            "Listed {} groups ({} lines skipped)",
            groups.len(),
            response.lines.len() - groups.len()
        );
        Ok(groups)
    }

    /// Select a newsgroup (`GROUP name`, expecting 211)
    ///
    /// # Errors
    ///
    /// - [`NntpError::NoSuchGroup`] - Server answered 411
    /// - [`NntpError::Protocol`] - Any other unexpected code
    /// - [`NntpError::InvalidResponse`](crate::NntpError::InvalidResponse) - Reply has fewer than four fields
    pub async fn select_group(&mut self, name: &str) -> Result<GroupInfo> {
        debug!("Selecting group: {}", name);

        self.send_command(&commands::group(name)).await?;
        let (_, message) = match self.read_response(codes::GROUP_SELECTED).await {
            Err(NntpError::Protocol {
                code: codes::NO_SUCH_GROUP,
                ..
            }) => return Err(NntpError::NoSuchGroup(name.to_string())),
            other => other?,
        };
        let parsed = commands::parse_group_response(&message);
        let info = self.check(parsed)?;

        debug!(
            "Group {} selected: {} articles ({}-{})",
            info.name, info.count, info.low, info.high
        );
        Ok(info)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::io::{AsyncWriteExt, DuplexStream, duplex};

    async fn client_with(script: &[u8]) -> (NntpClient<DuplexStream>, DuplexStream) {
        let (client, mut server) = duplex(4096);
        server.write_all(b"200 ready\r\n").await.unwrap();
        server.write_all(script).await.unwrap();
        (NntpClient::from_stream(client).await.unwrap(), server)
    }

    #[tokio::test]
    async fn test_list_groups_skips_malformed_lines() {
        let (mut client, _server) = client_with(
            b"215 list follows\r\nalt.test 100 1 y\r\nbroken x 1 y\r\nalt.binaries 500 10 y\r\n.\r\n",
        )
        .await;

        let groups = client.list_groups(None).await.unwrap();
        assert_eq!(groups.len(), 2);
        assert_eq!(groups[0].name, "alt.test");
        assert_eq!((groups[0].high, groups[0].low), (100, 1));
        assert_eq!(groups[1].name, "alt.binaries");
        assert_eq!((groups[1].high, groups[1].low), (500, 10));
        assert!(!client.is_broken());
    }

    #[tokio::test]
    async fn test_select_group() {
        let (mut client, _server) = client_with(b"211 99 1 100 alt.test\r\n").await;

        let info = client.select_group("alt.test").await.unwrap();
        assert_eq!(info.count, 99);
        assert_eq!(info.low, 1);
        assert_eq!(info.high, 100);
        assert_eq!(info.name, "alt.test");
    }

    #[tokio::test]
    async fn test_select_missing_group_breaks_client() {
        let (mut client, _server) = client_with(b"411 No such newsgroup\r\n").await;

        let err = client.select_group("alt.none").await.unwrap_err();
        assert!(matches!(&err, NntpError::NoSuchGroup(name) if name == "alt.none"));
        assert!(client.is_broken());

        let err = client.select_group("alt.test").await.unwrap_err();
        assert!(matches!(err, NntpError::ConnectionBroken(_)));
    }

    #[tokio::test]
    async fn test_select_group_short_reply() {
        let (mut client, _server) = client_with(b"211 99 1\r\n").await;
        let err = client.select_group("alt.test").await.unwrap_err();
        assert!(matches!(err, NntpError::InvalidResponse(_)));
        assert!(client.is_broken());
    }
}
