use std::pin::Pin;
use std::sync::Arc;

use chrono::Utc;
use tokio::sync::{mpsc, RwLock};
use tokio_stream::wrappers::ReceiverStream;
use tonic::{Request, Response, Status, Streaming};

use crate::proto::ring_leader_server::RingLeader;
use crate::proto::{ConnectAck, ConnectRequest, HeartbeatFromLeader, HeartbeatFromWorker};
use crate::registry::WorkerRegistry;

/// gRPC service implementing worker membership for the ring leader.
pub struct RingLeaderService {
    registry: Arc<RwLock<WorkerRegistry>>,
    leader_host: String,
    leader_port: u32,
}

impl RingLeaderService {
    pub fn new(
        registry: Arc<RwLock<WorkerRegistry>>,
        leader_host: String,
        leader_port: u32,
    ) -> Self {
        Self {
            registry,
            leader_host,
            leader_port,
        }
    }
}

type AckStream = Pin<Box<dyn tokio_stream::Stream<Item = Result<HeartbeatFromLeader, Status>> + Send>>;

#[tonic::async_trait]
impl RingLeader for RingLeaderService {
    async fn connect(
        &self,
        request: Request<ConnectRequest>,
    ) -> Result<Response<ConnectAck>, Status> {
        let req = request.into_inner();

        {
            let mut registry = self.registry.write().await;
            registry
                .insert(&req.service_id, &req.service_host, req.port, &req.timestamp)
                .map_err(|e| Status::invalid_argument(e.to_string()))?;
        }

        tracing::info!(
            worker_id = %req.service_id,
            worker_host = %req.service_host,
            worker_port = req.port,
            "Connected with new worker"
        );

        Ok(Response::new(ConnectAck {
            host: self.leader_host.clone(),
            port: self.leader_port,
            timestamp: Utc::now().to_rfc3339(),
        }))
    }

    type HeartbeatStream = AckStream;

    async fn heartbeat(
        &self,
        request: Request<Streaming<HeartbeatFromWorker>>,
    ) -> Result<Response<Self::HeartbeatStream>, Status> {
        let mut inbound = request.into_inner();
        let registry = self.registry.clone();
        let (ack_tx, ack_rx) = mpsc::channel(16);

        tokio::spawn(async move {
            // Remembered across beats so the record can be dropped when the
            // peer closes the stream.
            let mut stream_worker: Option<String> = None;

            loop {
                match inbound.message().await {
                    Ok(Some(beat)) => {
                        let update = {
                            let mut registry = registry.write().await;
                            registry.update_heartbeat(&beat.service_id, &beat.timestamp)
                        };

                        if let Err(e) = update {
                            tracing::warn!(
                                worker_id = %beat.service_id,
                                error = %e,
                                "Rejecting heartbeat with malformed timestamp"
                            );
                            let _ = ack_tx
                                .send(Err(Status::invalid_argument(e.to_string())))
                                .await;
                            break;
                        }

                        stream_worker = Some(beat.service_id.clone());
                        tracing::info!(
                            worker_id = %beat.service_id,
                            "Updated worker status from heartbeat"
                        );

                        let ack = HeartbeatFromLeader {
                            timestamp: Utc::now().to_rfc3339(),
                        };
                        if ack_tx.send(Ok(ack)).await.is_err() {
                            // Ack receiver is gone: the peer already went away.
                            remove_on_stream_end(&registry, &mut stream_worker).await;
                            break;
                        }
                    }
                    Ok(None) => {
                        // End of input: the worker is gone. It owns the retry
                        // decision, so drop the record rather than keep it.
                        remove_on_stream_end(&registry, &mut stream_worker).await;
                        break;
                    }
                    Err(status) => {
                        tracing::error!(
                            error = %status,
                            "Failed to receive heartbeat from worker"
                        );
                        break;
                    }
                }
            }
        });

        Ok(Response::new(
            Box::pin(ReceiverStream::new(ack_rx)) as Self::HeartbeatStream
        ))
    }
}

async fn remove_on_stream_end(
    registry: &RwLock<WorkerRegistry>,
    stream_worker: &mut Option<String>,
) {
    if let Some(id) = stream_worker.take() {
        if registry.write().await.remove(&id).is_some() {
            tracing::info!(worker_id = %id, "Heartbeat stream closed, worker removed");
        }
    }
}
