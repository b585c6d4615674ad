use async_trait::async_trait;
use tonic::transport::Channel;
use tonic::{Request, Status};
use tracing::debug;

use corral_model::RetireRequest;

use crate::internals::RetireSliceRequest;
use crate::internals::bookkeeping_service_client::BookkeepingServiceClient;

/// Tells the local scheduler to give up on a slice.
///
/// The receiver must be safe to call repeatedly with the same
/// (slice, reason): the bridge re-derives decisions on every delivery and
/// does not deduplicate requests.
#[async_trait]
pub trait BookkeepingClient: Send + Sync + 'static {
    async fn retire_slice(&self, req: RetireRequest) -> Result<(), Status>;
}

/// gRPC-backed implementation wrapping the generated client.
#[derive(Clone)]
pub struct GrpcBookkeepingClient {
    inner: BookkeepingServiceClient<Channel>,
}

impl GrpcBookkeepingClient {
    pub async fn connect(endpoint: String) -> Result<Self, tonic::transport::Error> {
        let inner = BookkeepingServiceClient::connect(endpoint.clone()).await?;
        debug!(endpoint = %endpoint, "connected to bookkeeping service");
        Ok(Self { inner })
    }

    pub fn new(channel: Channel) -> Self {
        Self {
            inner: BookkeepingServiceClient::new(channel),
        }
    }
}

#[async_trait]
impl BookkeepingClient for GrpcBookkeepingClient {
    async fn retire_slice(&self, req: RetireRequest) -> Result<(), Status> {
        let mut client = self.inner.clone();
        client
            .retire_slice(Request::new(RetireSliceRequest::from(req)))
            .await?;
        Ok(())
    }
}
