//! Upstream NNTP backend: imports the group catalog into local storage
//!
//! On start the backend connects to its upstream and syncs subscriptions:
//!
//! 1. When storage holds no subscription for this backend yet, the full
//!    upstream `LIST` is imported as subscriptions (upserted on
//!    `(name, type, source)`).
//! 2. The first `sync_groups` subscriptions become local groups, upserted on
//!    `(name, source)`.
//!
//! The catalog import only runs against an empty catalog; later starts just
//! refresh the group working set from stored subscriptions.

use crate::client::NntpClient;
use crate::config::BackendConfig;
use crate::engine::{BackendRepository, ComponentStatus};
use crate::error::{NntpError, Result};
use crate::storage::Store;
use crate::types::{Group, NNTP_TYPE, Subscription};
use async_trait::async_trait;
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::{debug, info, warn};

/// Backend syncing from one upstream NNTP server
pub struct NntpBackend {
    config: Arc<BackendConfig>,
    store: Store,
    /// Upstream connection; `None` while down
    client: Mutex<Option<NntpClient>>,
}

impl NntpBackend {
    pub fn new(config: BackendConfig, store: Store) -> Self {
        Self {
            config: Arc::new(config),
            store,
            client: Mutex::new(None),
        }
    }

    pub fn config(&self) -> &BackendConfig {
        &self.config
    }

    /// Connected, authenticated client, reusing a healthy existing one
    async fn ensure_client<'a>(
        &self,
        slot: &'a mut Option<NntpClient>,
    ) -> Result<&'a mut NntpClient> {
        if slot.as_ref().is_some_and(NntpClient::is_broken) {
            debug!("[Backend] {} discarding broken connection", self.config.name);
            *slot = None;
        }
        if slot.is_none() {
            let mut client = NntpClient::connect(Arc::clone(&self.config)).await?;
            if self.config.has_credentials() {
                client
                    .authenticate(&self.config.user, &self.config.pass)
                    .await?;
            }
            *slot = Some(client);
        }
        slot.as_mut().ok_or(NntpError::ConnectionClosed)
    }

    async fn sync_with(&self, slot: &mut Option<NntpClient>) -> Result<usize> {
        let client = self.ensure_client(slot).await?;
        let source = self.config.name.as_str();

        let count = self.store.count_subscriptions(NNTP_TYPE, source).await?;
        let working_set: Vec<Subscription> = if count == 0 {
            let subscriptions: Vec<Subscription> = client
                .list_groups(None)
                .await?
                .into_iter()
                .map(|g| Subscription {
                    description: g.name.clone(),
                    name: g.name,
                    high: g.high,
                    low: g.low,
                    kind: NNTP_TYPE.to_string(),
                    source: source.to_string(),
                })
                .collect();
            self.store.store_subscriptions(&subscriptions).await?;
            info!(
                "[Backend] {} imported {} subscriptions",
                source,
                subscriptions.len()
            );
            subscriptions
                .into_iter()
                .take(self.config.sync_groups)
                .collect()
        } else {
            debug!("[Backend] {} already has {} subscriptions", source, count);
            self.store
                .subscriptions(NNTP_TYPE, source, Some(self.config.sync_groups))
                .await?
        };

        let groups: Vec<Group> = working_set.iter().map(Group::from).collect();
        self.store.store_groups(&groups).await
    }
}

#[async_trait]
impl BackendRepository for NntpBackend {
    fn kind(&self) -> &str {
        NNTP_TYPE
    }

    fn name(&self) -> &str {
        &self.config.name
    }

    async fn start(&self) -> Result<()> {
        info!("[Backend] {}-{} starting", self.kind(), self.name());
        self.sync_sub().await?;
        info!(
            "[Backend] {}-{} sync subscriptions finished",
            self.kind(),
            self.name()
        );
        Ok(())
    }

    /// Drop the upstream connection, saying QUIT when it still looks alive
    ///
    /// A failed QUIT is only logged: the connection is discarded either way.
    async fn stop(&self) -> Result<()> {
        let client = self.client.lock().await.take();
        if let Some(client) = client.filter(|c| !c.is_broken())
            && let Err(e) = client.quit().await
        {
            debug!("[Backend] {} QUIT failed, dropping connection: {}", self.name(), e);
        }
        Ok(())
    }

    async fn sync_sub(&self) -> Result<()> {
        let mut slot = self.client.lock().await;
        match self.sync_with(&mut slot).await {
            Ok(groups) => {
                debug!("[Backend] {} materialized {} groups", self.name(), groups);
                Ok(())
            }
            Err(e) => {
                warn!("[Backend] {} sync failed: {}", self.name(), e);
                *slot = None;
                Err(e)
            }
        }
    }

    async fn status(&self) -> ComponentStatus {
        match self.client.lock().await.as_ref() {
            Some(client) if !client.is_broken() => ComponentStatus::Up,
            _ => ComponentStatus::Down,
        }
    }
}
