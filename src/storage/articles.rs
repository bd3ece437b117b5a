//! Article operations
//!
//! Articles are stored per group; headers are kept as JSON so order and
//! repeated fields survive.

use super::Store;
use crate::article::{Article, Headers, NumberedArticle};
use crate::error::Result;
use crate::types::Group;
use rusqlite::{OptionalExtension, Row, params};

const SELECT_ARTICLE: &str = "SELECT number, headers, body FROM articles";

fn row_to_numbered(row: &Row<'_>) -> rusqlite::Result<(i64, String, Vec<u8>)> {
    Ok((row.get("number")?, row.get("headers")?, row.get("body")?))
}

fn decode((number, headers, body): (i64, String, Vec<u8>)) -> Result<NumberedArticle> {
    let headers: Headers = serde_json::from_str(&headers)?;
    Ok(NumberedArticle {
        number,
        article: Article::new(headers, body),
    })
}

impl Store {
    /// Store an article under `number` in `group`, replacing any previous one
    pub async fn store_article(&self, group: &Group, number: i64, article: &Article) -> Result<()> {
        let headers = serde_json::to_string(&article.headers)?;
        let conn = self.conn.lock().await;
        conn.execute(
            "INSERT INTO articles
                (group_name, group_source, number, message_id, headers, body, bytes, lines)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)
             ON CONFLICT(group_name, group_source, number) DO UPDATE SET
                message_id = excluded.message_id,
                headers = excluded.headers,
                body = excluded.body,
                bytes = excluded.bytes,
                lines = excluded.lines",
            params![
                group.name,
                group.source,
                number,
                article.message_id().unwrap_or_default(),
                headers,
                article.body,
                article.bytes as i64,
                article.lines as i64
            ],
        )?;
        Ok(())
    }

    /// Article `number` of `group`
    pub async fn article_by_number(&self, group: &Group, number: i64) -> Result<Option<Article>> {
        let row = {
            let conn = self.conn.lock().await;
            conn.query_row(
                &format!(
                    "{} WHERE group_name = ?1 AND group_source = ?2 AND number = ?3",
                    SELECT_ARTICLE
                ),
                params![group.name, group.source, number],
                row_to_numbered,
            )
            .optional()?
        };
        row.map(|r| decode(r).map(|n| n.article)).transpose()
    }

    /// Article of `group` carrying `message_id`
    pub async fn article_by_message_id(
        &self,
        group: &Group,
        message_id: &str,
    ) -> Result<Option<Article>> {
        let row = {
            let conn = self.conn.lock().await;
            conn.query_row(
                &format!(
                    "{} WHERE group_name = ?1 AND group_source = ?2 AND message_id = ?3
                     ORDER BY number LIMIT 1",
                    SELECT_ARTICLE
                ),
                params![group.name, group.source, message_id],
                row_to_numbered,
            )
            .optional()?
        };
        row.map(|r| decode(r).map(|n| n.article)).transpose()
    }

    /// Articles of `group` numbered `from..=to`, in number order
    pub async fn articles_in_range(
        &self,
        group: &Group,
        from: i64,
        to: i64,
    ) -> Result<Vec<NumberedArticle>> {
        let rows = {
            let conn = self.conn.lock().await;
            let mut stmt = conn.prepare(&format!(
                "{} WHERE group_name = ?1 AND group_source = ?2 AND number BETWEEN ?3 AND ?4
                 ORDER BY number",
                SELECT_ARTICLE
            ))?;
            stmt.query_map(params![group.name, group.source, from, to], row_to_numbered)?
                .collect::<rusqlite::Result<Vec<_>>>()?
        };
        rows.into_iter().map(decode).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn group() -> Group {
        Group {
            name: "alt.test".into(),
            description: String::new(),
            source: "src".into(),
            low: 1,
            high: 3,
        }
    }

    fn article(n: i64) -> Article {
        let mut headers = Headers::new();
        headers.push("Subject", format!("post {n}"));
        headers.push("Message-Id", format!("<{n}@example>"));
        headers.push("Newsgroups", "alt.test");
        headers.push("Newsgroups", "alt.misc");
        Article::new(headers, format!("body {n}\r\n").into_bytes())
    }

    #[tokio::test]
    async fn test_lookup_by_number_and_message_id() {
        let store = Store::open_in_memory().unwrap();
        let group = group();
        store.store_article(&group, 1, &article(1)).await.unwrap();

        let found = store.article_by_number(&group, 1).await.unwrap().unwrap();
        assert_eq!(found, article(1));
        assert_eq!(found.headers.get_all("newsgroups").count(), 2);

        let by_id = store
            .article_by_message_id(&group, "<1@example>")
            .await
            .unwrap();
        assert_eq!(by_id, Some(article(1)));

        assert!(store.article_by_number(&group, 2).await.unwrap().is_none());
        assert!(
            store
                .article_by_message_id(&group, "<nope@example>")
                .await
                .unwrap()
                .is_none()
        );
    }

    #[tokio::test]
    async fn test_range_is_inclusive_and_ordered() {
        let store = Store::open_in_memory().unwrap();
        let group = group();
        for n in [3, 1, 2, 5] {
            store.store_article(&group, n, &article(n)).await.unwrap();
        }

        let numbers: Vec<i64> = store
            .articles_in_range(&group, 2, 5)
            .await
            .unwrap()
            .iter()
            .map(|a| a.number)
            .collect();
        assert_eq!(numbers, vec![2, 3, 5]);
        assert!(store.articles_in_range(&group, 6, 9).await.unwrap().is_empty());
    }
}
