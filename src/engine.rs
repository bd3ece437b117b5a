//! Lifecycle of the relay: backends first, then downstream services

use crate::backend::NntpBackend;
use crate::config::Config;
use crate::error::{NntpError, Result};
use crate::operator::{Operator, StoreOperator};
use crate::server::NntpServer;
use crate::service::NntpService;
use crate::storage::Store;
use async_trait::async_trait;
use std::fmt;
use std::sync::Arc;
use tracing::{error, info};

/// Whether a component currently holds a live connection
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ComponentStatus {
    Up,
    Down,
}

impl fmt::Display for ComponentStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ComponentStatus::Up => f.write_str("up"),
            ComponentStatus::Down => f.write_str("down"),
        }
    }
}

/// An upstream source feeding the local catalog
#[async_trait]
pub trait BackendRepository: Send + Sync {
    /// Backend type, e.g. `nntp`
    fn kind(&self) -> &str;

    /// Name used as the `source` of everything this backend stores
    fn name(&self) -> &str;

    async fn start(&self) -> Result<()>;

    async fn stop(&self) -> Result<()>;

    async fn restart(&self) -> Result<()> {
        self.stop().await?;
        self.start().await
    }

    /// Refresh subscriptions and the group working set from upstream
    async fn sync_sub(&self) -> Result<()>;

    async fn status(&self) -> ComponentStatus;
}

/// A downstream listener
#[async_trait]
pub trait ServiceDelivery: Send + Sync {
    /// Serve until [`stop`](Self::stop) is called
    async fn run(&self) -> Result<()>;

    fn stop(&self);
}

/// Owns every backend and service built from a [`Config`]
pub struct Engine {
    backends: Vec<Arc<dyn BackendRepository>>,
    services: Vec<Arc<dyn ServiceDelivery>>,
}

impl Engine {
    pub fn new(
        backends: Vec<Arc<dyn BackendRepository>>,
        services: Vec<Arc<dyn ServiceDelivery>>,
    ) -> Self {
        Self { backends, services }
    }

    /// Build components for `config` and seed its users into `store`
    pub async fn from_config(config: &Config, store: Store) -> Result<Self> {
        for user in &config.users {
            store.create_user(&user.name, &user.pass).await?;
        }

        let backends = config
            .backends
            .iter()
            .map(|b| {
                Arc::new(NntpBackend::new(b.clone(), store.clone())) as Arc<dyn BackendRepository>
            })
            .collect();

        let operator: Arc<dyn Operator> = Arc::new(StoreOperator::anonymous(store));
        let server = NntpServer::new(operator);
        let services = config
            .services
            .iter()
            .map(|s| {
                Arc::new(NntpService::new(s.clone(), server.clone())) as Arc<dyn ServiceDelivery>
            })
            .collect();

        Ok(Self::new(backends, services))
    }

    pub fn backends(&self) -> &[Arc<dyn BackendRepository>] {
        &self.backends
    }

    /// Start every backend, then serve on every service until all stop
    ///
    /// A backend failing to start is logged and left down; a service failing
    /// to bind aborts the run.
    pub async fn run(&self) -> Result<()> {
        for backend in &self.backends {
            if let Err(e) = backend.start().await {
                error!(
                    "[Engine] backend {}-{} failed to start: {}",
                    backend.kind(),
                    backend.name(),
                    e
                );
            }
        }

        let mut tasks = tokio::task::JoinSet::new();
        for service in &self.services {
            let service = Arc::clone(service);
            tasks.spawn(async move { service.run().await });
        }
        info!("[Engine] running {} services", self.services.len());

        while let Some(joined) = tasks.join_next().await {
            joined.map_err(|e| NntpError::Other(format!("service task failed: {}", e)))??;
        }
        Ok(())
    }

    /// Stop services, then backends
    pub async fn stop(&self) {
        for service in &self.services {
            service.stop();
        }
        for backend in &self.backends {
            if let Err(e) = backend.stop().await {
                error!("[Engine] backend {} failed to stop: {}", backend.name(), e);
            }
        }
    }
}
