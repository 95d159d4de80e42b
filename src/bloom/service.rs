use std::sync::Arc;

use tokio::sync::RwLock;
use tonic::{Request, Response, Status};

use crate::bloom::filter::Bloom;
use crate::proto::bloom_filter_server::BloomFilter;
use crate::proto::{AddKeyAck, CheckKeyAck, KeyRequest, RemoveKeyAck};

/// gRPC surface over one shared bloom filter. The filter is the only state;
/// requests carry everything else.
pub struct BloomFilterService {
    filter: Arc<RwLock<Bloom>>,
}

impl BloomFilterService {
    pub fn new(filter: Bloom) -> Self {
        Self {
            filter: Arc::new(RwLock::new(filter)),
        }
    }
}

#[tonic::async_trait]
impl BloomFilter for BloomFilterService {
    async fn add_key(
        &self,
        request: Request<KeyRequest>,
    ) -> Result<Response<AddKeyAck>, Status> {
        let req = request.into_inner();

        self.filter
            .write()
            .await
            .add_key(&req.key)
            .map_err(|e| Status::internal(e.to_string()))?;

        tracing::info!(key_len = req.key.len(), "Added key to filter");
        Ok(Response::new(AddKeyAck {}))
    }

    async fn check_key(
        &self,
        request: Request<KeyRequest>,
    ) -> Result<Response<CheckKeyAck>, Status> {
        let req = request.into_inner();

        let present = self
            .filter
            .read()
            .await
            .check_key(&req.key)
            .map_err(|e| Status::internal(e.to_string()))?;

        Ok(Response::new(CheckKeyAck { present }))
    }

    async fn remove_key(
        &self,
        request: Request<KeyRequest>,
    ) -> Result<Response<RemoveKeyAck>, Status> {
        let req = request.into_inner();

        self.filter
            .write()
            .await
            .remove_key(&req.key)
            .map_err(|e| Status::internal(e.to_string()))?;

        tracing::info!(key_len = req.key.len(), "Removed key from filter");
        Ok(Response::new(RemoveKeyAck {}))
    }
}
