//! ARTICLE, HEAD and BODY retrieval

use super::NntpClient;
use crate::article::Article;
use crate::codec::DotReader;
use crate::commands;
use crate::error::Result;
use crate::response::codes;
use tokio::io::{AsyncRead, AsyncWrite};
use tracing::debug;

/// Reply to ARTICLE, HEAD or BODY
///
/// `body` streams the dot-block lazily and borrows the client; it must be
/// consumed (or drained) before the client can send another command.
pub struct ArticleResponse<'a, S> {
    /// Article number reported by the server (0 for message-id lookups on most servers)
    pub number: i64,
    pub message_id: String,
    pub body: DotReader<'a, S>,
}

impl<S> NntpClient<S>
where
    S: AsyncRead + AsyncWrite + Unpin,
{
    async fn fetch(&mut self, command: String, expected: u16) -> Result<ArticleResponse<'_, S>> {
        self.send_command(&command).await?;
        let (_, message) = self.read_response(expected).await?;
        let parsed = commands::parse_article_response(&message);
        let (number, message_id) = self.check(parsed)?;
        debug!("Article {} {} follows ({})", number, message_id, expected);

        Ok(ArticleResponse {
            number,
            message_id,
            body: self.codec.dot_reader(),
        })
    }

    /// Fetch headers and body (`ARTICLE`, expecting 220)
    ///
    /// # Errors
    ///
    /// - [`NntpError::Protocol`](crate::NntpError::Protocol) - Article not found (423/430) or other failure
    /// - [`NntpError::InvalidResponse`](crate::NntpError::InvalidResponse) - Status line is not `number message-id`
    pub async fn article(&mut self, specifier: &str) -> Result<ArticleResponse<'_, S>> {
        self.fetch(commands::article(specifier), codes::ARTICLE_FOLLOWS)
            .await
    }

    /// Fetch headers only (`HEAD`, expecting 221)
    pub async fn head(&mut self, specifier: &str) -> Result<ArticleResponse<'_, S>> {
        self.fetch(commands::head(specifier), codes::HEAD_FOLLOWS)
            .await
    }

    /// Fetch body only (`BODY`, expecting 222)
    pub async fn body(&mut self, specifier: &str) -> Result<ArticleResponse<'_, S>> {
        self.fetch(commands::body(specifier), codes::BODY_FOLLOWS)
            .await
    }

    /// Fetch and parse a complete article
    pub async fn fetch_article(&mut self, specifier: &str) -> Result<Article> {
        let response = self.article(specifier).await?;
        let data = response.body.read_to_end().await;
        let data = self.check(data)?;
        Ok(Article::parse(&data))
    }
}
