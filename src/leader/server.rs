use std::net::SocketAddr;
use std::sync::Arc;

use tokio::sync::RwLock;
use tokio_util::sync::CancellationToken;
use tonic::transport::Server;

use crate::config::DeltaConfig;
use crate::error::Result;
use crate::leader::service::RingLeaderService;
use crate::leader::sweep::LivenessSweep;
use crate::proto::ring_leader_server::RingLeaderServer;
use crate::registry::WorkerRegistry;

/// Ring-leader bootstrap: owns the registry, mounts the gRPC service, and
/// runs the liveness sweep alongside it.
pub struct LeaderServer {
    host: String,
    port: u32,
    config: DeltaConfig,
    registry: Arc<RwLock<WorkerRegistry>>,
}

impl LeaderServer {
    pub fn new(host: String, port: u32, config: DeltaConfig) -> Self {
        Self {
            host,
            port,
            config,
            registry: Arc::new(RwLock::new(WorkerRegistry::new())),
        }
    }

    /// Handle to the registry shared with the service and the sweep.
    pub fn registry(&self) -> Arc<RwLock<WorkerRegistry>> {
        self.registry.clone()
    }

    /// Serve until the shutdown token fires. A failed bind is fatal and
    /// propagates to the caller.
    pub async fn run(self, shutdown: CancellationToken) -> Result<()> {
        let addr: SocketAddr = format!("{}:{}", self.host, self.port).parse()?;

        let service =
            RingLeaderService::new(self.registry.clone(), self.host.clone(), self.port);
        let sweep = LivenessSweep::new(self.registry.clone(), &self.config.ring_leader);

        let sweep_shutdown = shutdown.clone();
        tokio::spawn(async move {
            sweep.run(sweep_shutdown).await;
        });

        tracing::info!(addr = %addr, "Starting ring-leader server");

        Server::builder()
            .add_service(RingLeaderServer::new(service))
            .serve_with_shutdown(addr, shutdown.cancelled_owned())
            .await?;

        Ok(())
    }
}
