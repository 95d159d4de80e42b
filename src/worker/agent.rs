use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use chrono::Utc;
use tokio::sync::mpsc;
use tokio_stream::wrappers::ReceiverStream;
use tonic::transport::{Channel, Endpoint};
use tonic::Request;
use uuid::Uuid;

use crate::config::WorkerConfig;
use crate::error::Result;
use crate::proto::ring_leader_client::RingLeaderClient;
use crate::proto::{ConnectRequest, HeartbeatFromWorker};
use crate::worker::backoff::ExponentialBackoff;

/// Address of the leader this agent reports to. Static for the agent's
/// lifetime; there is no re-election in scope.
#[derive(Debug, Clone)]
pub struct LeaderInfo {
    pub host: String,
    pub port: u32,
}

/// One worker process's membership lifecycle against the ring leader.
pub struct WorkerAgent {
    service_id: String,
    host: String,
    port: u32,
    leader: LeaderInfo,
    connected_to_leader: AtomicBool,
    config: WorkerConfig,
}

impl WorkerAgent {
    pub fn new(host: String, port: u32, leader: LeaderInfo, config: WorkerConfig) -> Self {
        Self {
            service_id: Uuid::new_v4().to_string(),
            host,
            port,
            leader,
            connected_to_leader: AtomicBool::new(false),
            config,
        }
    }

    pub fn service_id(&self) -> &str {
        &self.service_id
    }

    /// Whether the last registration succeeded and no send failure has
    /// happened since. Readable by external health checks.
    pub fn is_connected(&self) -> bool {
        self.connected_to_leader.load(Ordering::SeqCst)
    }

    async fn dial(&self) -> Result<RingLeaderClient<Channel>> {
        let endpoint = Endpoint::from_shared(format!(
            "http://{}:{}",
            self.leader.host, self.leader.port
        ))?;
        let channel = endpoint.connect().await?;
        Ok(RingLeaderClient::new(channel))
    }

    /// Register with the leader, retrying on a fixed delay until an ack
    /// arrives. Blocks its caller indefinitely; there is deliberately no
    /// attempt cap.
    pub async fn register(&self) {
        let retry_delay = Duration::from_secs(self.config.connections.time_between_retries);

        loop {
            let mut client = match self.dial().await {
                Ok(client) => client,
                Err(e) => {
                    tracing::warn!(
                        error = %e,
                        "Failed to set up client to connect with leader"
                    );
                    tokio::time::sleep(retry_delay).await;
                    continue;
                }
            };

            let request = ConnectRequest {
                service_id: self.service_id.clone(),
                service_host: self.host.clone(),
                port: self.port,
                timestamp: Utc::now().to_rfc3339(),
            };

            match client.connect(Request::new(request)).await {
                Ok(response) => {
                    let ack = response.into_inner();
                    tracing::info!(
                        leader_host = %ack.host,
                        leader_port = ack.port,
                        "Connected with leader"
                    );
                    self.connected_to_leader.store(true, Ordering::SeqCst);
                    return;
                }
                Err(status) => {
                    tracing::warn!(
                        error = %status,
                        leader_host = %self.leader.host,
                        leader_port = self.leader.port,
                        "Failed to get ack from ring-leader"
                    );
                    tokio::time::sleep(retry_delay).await;
                }
            }
        }
    }

    /// Long-running liveness driver.
    ///
    /// Stream setup retries with exponential backoff, reset once a stream
    /// opens. On an open stream, a spawned task drains the leader's acks
    /// while this loop sends one heartbeat per `heartbeat_interval`. A
    /// failed send marks the agent disconnected, drops the stream (and with
    /// it the drain task), and re-registers before the outer loop reopens
    /// the stream.
    pub async fn run_heartbeat_loop(&self) {
        let mut backoff =
            ExponentialBackoff::new(Duration::from_secs(self.config.backoff_max * 60));
        let heartbeat_interval = Duration::from_secs(self.config.heartbeat_interval);

        loop {
            let mut client = match self.dial().await {
                Ok(client) => client,
                Err(e) => {
                    tracing::warn!(
                        error = %e,
                        "Failed to set up client to connect with leader"
                    );
                    tokio::time::sleep(backoff.next_delay()).await;
                    continue;
                }
            };

            let (beat_tx, beat_rx) = mpsc::channel(1);
            let mut acks = match client.heartbeat(ReceiverStream::new(beat_rx)).await {
                Ok(response) => response.into_inner(),
                Err(status) => {
                    tracing::warn!(
                        error = %status,
                        "Failed to set up heartbeats with leader"
                    );
                    tokio::time::sleep(backoff.next_delay()).await;
                    continue;
                }
            };

            backoff.reset();

            let drain_worker_id = self.service_id.clone();
            let ack_drain = tokio::spawn(async move {
                loop {
                    match acks.message().await {
                        Ok(Some(_)) => {}
                        Ok(None) => {
                            tracing::warn!(
                                worker_id = %drain_worker_id,
                                "Heartbeat stream closed by leader"
                            );
                            break;
                        }
                        Err(status) => {
                            tracing::warn!(
                                worker_id = %drain_worker_id,
                                error = %status,
                                "Failed to recv ack for heartbeat"
                            );
                            break;
                        }
                    }
                }
            });

            let mut ticker = tokio::time::interval(heartbeat_interval);
            loop {
                ticker.tick().await;

                let beat = HeartbeatFromWorker {
                    service_id: self.service_id.clone(),
                    timestamp: Utc::now().to_rfc3339(),
                    host: self.host.clone(),
                    port: self.port,
                };

                if beat_tx.send(beat).await.is_err() {
                    tracing::warn!(
                        worker_id = %self.service_id,
                        "Failed to send a heartbeat to leader"
                    );
                    self.connected_to_leader.store(false, Ordering::SeqCst);
                    break;
                }
            }

            // The drain task lives exactly as long as its stream.
            ack_drain.abort();

            self.register().await;
        }
    }
}
