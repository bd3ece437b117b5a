//! Storage access for server sessions
//!
//! A session holds exactly one [`Operator`]. Authentication does not mutate
//! it; [`Operator::authenticate`] hands back a new operator for the
//! authenticated scope, which the session swaps in.

use crate::article::{Article, NumberedArticle};
use crate::commands::is_message_id;
use crate::error::Result;
use crate::server::status;
use crate::storage::Store;
use crate::types::Group;
use async_trait::async_trait;
use std::sync::Arc;
use tracing::debug;

/// Session-level requests against the relay's storage
#[async_trait]
pub trait Operator: Send + Sync {
    /// Known groups; `None` lists all of them
    async fn list_groups(&self, max: Option<usize>) -> Result<Vec<Group>>;

    /// Resolve a downstream name `<source>.<name>` to a group
    ///
    /// Fails with 411 when the name has no dot or no such group exists.
    async fn get_group(&self, qualified_name: &str) -> Result<Group>;

    /// Resolve an article number or bracketed message-id within `group`
    ///
    /// Fails with 423 for a missing number and 430 for a missing message-id.
    async fn get_article(&self, group: &Group, specifier: &str) -> Result<Article>;

    /// Articles numbered `from..=to`; empty when none match
    async fn get_articles(&self, group: &Group, from: i64, to: i64)
    -> Result<Vec<NumberedArticle>>;

    fn authorized(&self) -> bool;

    /// Operator for the scope of `user`; fails with 452 on bad credentials
    async fn authenticate(&self, user: &str, pass: &str) -> Result<Arc<dyn Operator>>;
}

/// Access scope of a [`StoreOperator`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Scope {
    Anonymous,
    Authenticated { user: String },
}

/// [`Operator`] backed by the relay [`Store`]
#[derive(Debug, Clone)]
pub struct StoreOperator {
    store: Store,
    scope: Scope,
}

impl StoreOperator {
    /// Operator for a freshly connected, unauthenticated peer
    pub fn anonymous(store: Store) -> Self {
        Self {
            store,
            scope: Scope::Anonymous,
        }
    }

    pub fn scope(&self) -> &Scope {
        &self.scope
    }
}

/// Split `<source>.<name>` at the first dot
fn split_qualified(qualified_name: &str) -> Option<(&str, &str)> {
    qualified_name
        .split_once('.')
        .filter(|(source, name)| !source.is_empty() && !name.is_empty())
}

#[async_trait]
impl Operator for StoreOperator {
    async fn list_groups(&self, max: Option<usize>) -> Result<Vec<Group>> {
        self.store.list_groups(max).await
    }

    async fn get_group(&self, qualified_name: &str) -> Result<Group> {
        let (source, name) = split_qualified(qualified_name).ok_or(status::NO_SUCH_GROUP)?;
        self.store
            .group(name, source)
            .await?
            .ok_or_else(|| status::NO_SUCH_GROUP.into())
    }

    async fn get_article(&self, group: &Group, specifier: &str) -> Result<Article> {
        if is_message_id(specifier) {
            return self
                .store
                .article_by_message_id(group, specifier)
                .await?
                .ok_or_else(|| status::INVALID_MESSAGE_ID.into());
        }
        let number: i64 = specifier
            .parse()
            .map_err(|_| status::INVALID_ARTICLE_NUMBER)?;
        self.store
            .article_by_number(group, number)
            .await?
            .ok_or_else(|| status::INVALID_ARTICLE_NUMBER.into())
    }

    async fn get_articles(
        &self,
        group: &Group,
        from: i64,
        to: i64,
    ) -> Result<Vec<NumberedArticle>> {
        self.store.articles_in_range(group, from, to).await
    }

    fn authorized(&self) -> bool {
        matches!(self.scope, Scope::Authenticated { .. })
    }

    async fn authenticate(&self, user: &str, pass: &str) -> Result<Arc<dyn Operator>> {
        if !self.store.verify_user(user, pass).await? {
            debug!("Rejected credentials for {}", user);
            return Err(status::AUTH_REJECTED.into());
        }
        debug!("Authenticated {}", user);
        Ok(Arc::new(Self {
            store: self.store.clone(),
            scope: Scope::Authenticated {
                user: user.to_string(),
            },
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::article::Headers;
    use crate::error::NntpError;

    async fn operator() -> StoreOperator {
        let store = Store::open_in_memory().unwrap();
        store
            .store_groups(&[Group {
                name: "alt.test".into(),
                description: "testing".into(),
                source: "src".into(),
                low: 1,
                high: 100,
            }])
            .await
            .unwrap();
        let mut headers = Headers::new();
        headers.push("Message-Id", "<1@example>");
        let group = store.group("alt.test", "src").await.unwrap().unwrap();
        store
            .store_article(&group, 1, &Article::new(headers, b"hi\r\n".to_vec()))
            .await
            .unwrap();
        store.create_user("alice", "secret").await.unwrap();
        StoreOperator::anonymous(store)
    }

    fn code(err: NntpError) -> u16 {
        match err {
            NntpError::Protocol { code, .. } => code,
            other => panic!("expected protocol error, got {other:?}"),
        }
    }

    #[test]
    fn test_split_qualified() {
        assert_eq!(split_qualified("src.alt.test"), Some(("src", "alt.test")));
        assert_eq!(split_qualified("nodot"), None);
        assert_eq!(split_qualified(".alt"), None);
        assert_eq!(split_qualified("src."), None);
    }

    #[tokio::test]
    async fn test_get_group() {
        let op = operator().await;
        let group = op.get_group("src.alt.test").await.unwrap();
        assert_eq!(group.name, "alt.test");
        assert_eq!(group.source, "src");

        assert_eq!(code(op.get_group("alt").await.unwrap_err()), 411);
        assert_eq!(code(op.get_group("").await.unwrap_err()), 411);
        assert_eq!(code(op.get_group("other.alt.test").await.unwrap_err()), 411);
    }

    #[tokio::test]
    async fn test_get_article_error_codes() {
        let op = operator().await;
        let group = op.get_group("src.alt.test").await.unwrap();

        assert!(op.get_article(&group, "1").await.is_ok());
        assert!(op.get_article(&group, "<1@example>").await.is_ok());
        assert_eq!(code(op.get_article(&group, "2").await.unwrap_err()), 423);
        assert_eq!(code(op.get_article(&group, "<2@example>").await.unwrap_err()), 430);
    }

    #[tokio::test]
    async fn test_get_articles_empty_range_is_not_an_error() {
        let op = operator().await;
        let group = op.get_group("src.alt.test").await.unwrap();
        assert_eq!(op.get_articles(&group, 0, i64::MAX).await.unwrap().len(), 1);
        assert!(op.get_articles(&group, 50, 60).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_authenticate_returns_new_scope() {
        let op = operator().await;
        assert!(!op.authorized());

        let authed = op.authenticate("alice", "secret").await.unwrap();
        assert!(authed.authorized());
        assert!(!op.authorized());

        assert_eq!(code(op.authenticate("alice", "nope").await.err().unwrap()), 452);
    }
}
