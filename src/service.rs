//! Downstream TCP listener feeding accepted connections to the server

use crate::config::ServiceConfig;
use crate::engine::ServiceDelivery;
use crate::error::{NntpError, Result};
use crate::server::NntpServer;
use async_trait::async_trait;
use std::net::SocketAddr;
use tokio::net::TcpListener;
use tokio::sync::watch;
use tracing::{debug, error, info};

/// Plain-TCP NNTP service on one listen address
pub struct NntpService {
    config: ServiceConfig,
    server: NntpServer,
    shutdown: watch::Sender<bool>,
}

impl NntpService {
    pub fn new(config: ServiceConfig, server: NntpServer) -> Self {
        let (shutdown, _) = watch::channel(false);
        Self {
            config,
            server,
            shutdown,
        }
    }

    pub fn config(&self) -> &ServiceConfig {
        &self.config
    }

    /// Bind the configured address
    pub async fn bind(&self) -> Result<TcpListener> {
        let address = self.config.address();
        let listener = TcpListener::bind(&address).await.map_err(|e| {
            NntpError::Config(format!("Unable to listen on {}: {}", address, e))
        })?;
        info!("[Service] listening on {}", address);
        Ok(listener)
    }

    /// Accept connections on `listener` until stopped
    ///
    /// Every connection runs on its own task. Sessions already running are
    /// not interrupted by [`stop`](ServiceDelivery::stop).
    pub async fn serve(&self, listener: TcpListener) -> Result<()> {
        let mut shutdown = self.shutdown.subscribe();
        if *shutdown.borrow_and_update() {
            return Ok(());
        }

        loop {
            tokio::select! {
                _ = shutdown.changed() => {
                    info!("[Service] {} shutting down", self.config.address());
                    return Ok(());
                }
                accepted = listener.accept() => match accepted {
                    Ok((stream, peer)) => self.spawn_session(stream, peer),
                    Err(e) => error!("[Service] accept failed: {}", e),
                },
            }
        }
    }

    fn spawn_session(&self, stream: tokio::net::TcpStream, peer: SocketAddr) {
        debug!("[Service] accepted connection from {}", peer);
        if let Err(e) = stream.set_nodelay(true) {
            debug!("[Service] set_nodelay failed for {}: {}", peer, e);
        }
        let server = self.server.clone();
        tokio::spawn(async move {
            server.process(stream).await;
            debug!("[Service] connection from {} closed", peer);
        });
    }
}

#[async_trait]
impl ServiceDelivery for NntpService {
    async fn run(&self) -> Result<()> {
        let listener = self.bind().await?;
        self.serve(listener).await
    }

    fn stop(&self) {
        self.shutdown.send_replace(true);
    }
}
