//! Shared helpers for integration tests: spawn a ring leader on a local
//! port and poll for conditions.

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::RwLock;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

use delta::config::DeltaConfig;
use delta::leader::LeaderServer;
use delta::registry::WorkerRegistry;

/// Handle to a leader running on a local port for the duration of a test.
pub struct TestLeader {
    pub port: u32,
    pub registry: Arc<RwLock<WorkerRegistry>>,
    shutdown: CancellationToken,
    handle: JoinHandle<()>,
}

impl TestLeader {
    pub async fn start(port: u32) -> Self {
        Self::start_with_config(port, DeltaConfig::default()).await
    }

    pub async fn start_with_config(port: u32, config: DeltaConfig) -> Self {
        let server = LeaderServer::new("127.0.0.1".to_string(), port, config);
        let registry = server.registry();
        let shutdown = CancellationToken::new();

        let server_shutdown = shutdown.clone();
        let handle = tokio::spawn(async move {
            if let Err(e) = server.run(server_shutdown).await {
                eprintln!("leader server error: {}", e);
            }
        });

        // Give the listener a moment to come up.
        tokio::time::sleep(Duration::from_millis(100)).await;

        Self {
            port,
            registry,
            shutdown,
            handle,
        }
    }

    pub fn addr(&self) -> String {
        format!("http://127.0.0.1:{}", self.port)
    }
}

impl Drop for TestLeader {
    fn drop(&mut self) {
        self.shutdown.cancel();
        self.handle.abort();
    }
}

/// Wait for a condition to become true, polling every 50ms until timeout.
pub async fn wait_for<F, Fut>(condition: F, timeout: Duration) -> bool
where
    F: Fn() -> Fut,
    Fut: Future<Output = bool>,
{
    let start = tokio::time::Instant::now();
    while start.elapsed() < timeout {
        if condition().await {
            return true;
        }
        tokio::time::sleep(Duration::from_millis(50)).await;
    }
    false
}
