//! Subscription and group operations

use super::{Store, sql_limit};
use crate::error::Result;
use crate::types::{Group, Subscription};
use rusqlite::{OptionalExtension, Row, params};

fn row_to_group(row: &Row<'_>) -> rusqlite::Result<Group> {
    Ok(Group {
        name: row.get("name")?,
        description: row.get("description")?,
        source: row.get("source")?,
        low: row.get("low")?,
        high: row.get("high")?,
    })
}

fn row_to_subscription(row: &Row<'_>) -> rusqlite::Result<Subscription> {
    Ok(Subscription {
        name: row.get("name")?,
        description: row.get("description")?,
        high: row.get("high")?,
        low: row.get("low")?,
        kind: row.get("type")?,
        source: row.get("source")?,
    })
}

impl Store {
    /// Number of subscriptions a backend has recorded
    pub async fn count_subscriptions(&self, kind: &str, source: &str) -> Result<i64> {
        let conn = self.conn.lock().await;
        let count = conn.query_row(
            "SELECT COUNT(*) FROM subscriptions WHERE type = ?1 AND source = ?2",
            params![kind, source],
            |row| row.get(0),
        )?;
        Ok(count)
    }

    /// Insert subscriptions, refreshing `high` and `low` of existing rows
    ///
    /// Rows are matched on `(name, type, source)`; all writes share one
    /// transaction.
    pub async fn store_subscriptions(&self, subscriptions: &[Subscription]) -> Result<usize> {
        let mut conn = self.conn.lock().await;
        let tx = conn.transaction()?;
        {
            let mut stmt = tx.prepare(
                "INSERT INTO subscriptions (name, description, high, low, type, source)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6)
                 ON CONFLICT(name, type, source) DO UPDATE SET
                    high = excluded.high,
                    low = excluded.low",
            )?;
            for sub in subscriptions {
                stmt.execute(params![
                    sub.name,
                    sub.description,
                    sub.high,
                    sub.low,
                    sub.kind,
                    sub.source
                ])?;
            }
        }
        tx.commit()?;
        Ok(subscriptions.len())
    }

    /// Subscriptions of a backend in catalog order, at most `limit`
    pub async fn subscriptions(
        &self,
        kind: &str,
        source: &str,
        limit: Option<usize>,
    ) -> Result<Vec<Subscription>> {
        let conn = self.conn.lock().await;
        let mut stmt = conn.prepare(
            "SELECT name, description, high, low, type, source FROM subscriptions
             WHERE type = ?1 AND source = ?2 ORDER BY id LIMIT ?3",
        )?;
        let rows = stmt
            .query_map(params![kind, source, sql_limit(limit)], row_to_subscription)?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
    }

    /// Insert groups, refreshing `high` and `low` of existing rows
    ///
    /// Rows are matched on `(name, source)`; all writes share one transaction.
    pub async fn store_groups(&self, groups: &[Group]) -> Result<usize> {
        let mut conn = self.conn.lock().await;
        let tx = conn.transaction()?;
        {
            let mut stmt = tx.prepare(
                "INSERT INTO groups (name, description, source, low, high)
                 VALUES (?1, ?2, ?3, ?4, ?5)
                 ON CONFLICT(name, source) DO UPDATE SET
                    high = excluded.high,
                    low = excluded.low",
            )?;
            for group in groups {
                stmt.execute(params![
                    group.name,
                    group.description,
                    group.source,
                    group.low,
                    group.high
                ])?;
            }
        }
        tx.commit()?;
        Ok(groups.len())
    }

    /// Every local group, ordered by source then name, at most `limit`
    pub async fn list_groups(&self, limit: Option<usize>) -> Result<Vec<Group>> {
        let conn = self.conn.lock().await;
        let mut stmt = conn.prepare(
            "SELECT name, description, source, low, high FROM groups
             ORDER BY source, name LIMIT ?1",
        )?;
        let rows = stmt
            .query_map(params![sql_limit(limit)], row_to_group)?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
    }

    /// Look up one group by its identity
    pub async fn group(&self, name: &str, source: &str) -> Result<Option<Group>> {
        let conn = self.conn.lock().await;
        let group = conn
            .query_row(
                "SELECT name, description, source, low, high FROM groups
                 WHERE name = ?1 AND source = ?2",
                params![name, source],
                row_to_group,
            )
            .optional()?;
        Ok(group)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::NNTP_TYPE;

    fn sub(name: &str, high: i64, low: i64) -> Subscription {
        Subscription {
            name: name.to_string(),
            description: String::new(),
            high,
            low,
            kind: NNTP_TYPE.to_string(),
            source: "src".to_string(),
        }
    }

    #[tokio::test]
    async fn test_subscription_upsert_refreshes_bounds() {
        let store = Store::open_in_memory().unwrap();
        store
            .store_subscriptions(&[sub("alt.test", 100, 1), sub("alt.binaries", 500, 10)])
            .await
            .unwrap();
        assert_eq!(store.count_subscriptions(NNTP_TYPE, "src").await.unwrap(), 2);
        assert_eq!(store.count_subscriptions(NNTP_TYPE, "other").await.unwrap(), 0);

        store
            .store_subscriptions(&[sub("alt.test", 150, 5)])
            .await
            .unwrap();
        let subs = store.subscriptions(NNTP_TYPE, "src", None).await.unwrap();
        assert_eq!(subs.len(), 2);
        assert_eq!(subs[0], sub("alt.test", 150, 5));
        assert_eq!(subs[1], sub("alt.binaries", 500, 10));

        let first = store.subscriptions(NNTP_TYPE, "src", Some(1)).await.unwrap();
        assert_eq!(first.len(), 1);
    }

    #[tokio::test]
    async fn test_group_upsert_and_lookup() {
        let store = Store::open_in_memory().unwrap();
        let mut group = Group::from(&sub("alt.test", 100, 1));
        store.store_groups(&[group.clone()]).await.unwrap();

        group.high = 120;
        store.store_groups(&[group.clone()]).await.unwrap();

        let found = store.group("alt.test", "src").await.unwrap().unwrap();
        assert_eq!(found.high, 120);
        assert!(store.group("alt.test", "other").await.unwrap().is_none());
        assert_eq!(store.list_groups(None).await.unwrap().len(), 1);
        assert!(store.list_groups(Some(0)).await.unwrap().is_empty());
    }
}
