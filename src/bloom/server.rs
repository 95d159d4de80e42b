use std::net::SocketAddr;

use tokio_util::sync::CancellationToken;
use tonic::transport::Server;

use crate::bloom::filter::Bloom;
use crate::bloom::service::BloomFilterService;
use crate::error::Result;
use crate::proto::bloom_filter_server::BloomFilterServer;

/// Bloom-filter server bootstrap.
pub struct BloomServer {
    host: String,
    port: u32,
    filter: Bloom,
}

impl BloomServer {
    pub fn new(host: String, port: u32, filter: Bloom) -> Self {
        Self { host, port, filter }
    }

    /// Serve until the shutdown token fires. A failed bind is fatal and
    /// propagates to the caller.
    pub async fn run(self, shutdown: CancellationToken) -> Result<()> {
        let addr: SocketAddr = format!("{}:{}", self.host, self.port).parse()?;
        let service = BloomFilterService::new(self.filter);

        tracing::info!(addr = %addr, "Starting bloom-filter server");

        Server::builder()
            .add_service(BloomFilterServer::new(service))
            .serve_with_shutdown(addr, shutdown.cancelled_owned())
            .await?;

        Ok(())
    }
}
