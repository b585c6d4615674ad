use async_trait::async_trait;
use tonic::transport::Channel;
use tonic::{Request, Status};
use tracing::debug;

use crate::reservation_service_client::ReservationServiceClient;
use crate::{
    CancelIntent, CancelReservationRequest, CreateReservationRequest, GetReservationRequest,
    Reservation,
};

/// Builds the globally unique name of a reservation.
///
/// Retried create calls must collapse onto the same remote object, so the
/// name is a pure function of the scheduler instance and the reservation id.
pub fn reservation_name(instance: &str, reservation_id: &str) -> String {
    format!("{instance}/reservations/{reservation_id}")
}

/// Client surface of the botplane scheduler.
///
/// Deliberately narrow: create, fetch, cancel. All errors are status-coded
/// (`already-exists`, `not-found`, `failed-precondition`, ...); callers
/// classify them, this trait does not.
#[async_trait]
pub trait ReservationClient: Send + Sync + 'static {
    async fn create(&self, req: CreateReservationRequest) -> Result<Reservation, Status>;

    async fn fetch(&self, name: &str) -> Result<Reservation, Status>;

    async fn cancel(&self, name: &str, intent: CancelIntent) -> Result<(), Status>;
}

/// gRPC-backed implementation wrapping the generated client.
#[derive(Clone)]
pub struct GrpcReservationClient {
    inner: ReservationServiceClient<Channel>,
}

impl GrpcReservationClient {
    /// Connect to a scheduler endpoint, e.g. `"https://botplane.example.com"`.
    pub async fn connect(endpoint: String) -> Result<Self, tonic::transport::Error> {
        let inner = ReservationServiceClient::connect(endpoint.clone()).await?;
        debug!(endpoint = %endpoint, "connected to botplane scheduler");
        Ok(Self { inner })
    }

    /// Wrap an already established channel.
    pub fn new(channel: Channel) -> Self {
        Self {
            inner: ReservationServiceClient::new(channel),
        }
    }
}

#[async_trait]
impl ReservationClient for GrpcReservationClient {
    async fn create(&self, req: CreateReservationRequest) -> Result<Reservation, Status> {
        let mut client = self.inner.clone();
        Ok(client.create_reservation(Request::new(req)).await?.into_inner())
    }

    async fn fetch(&self, name: &str) -> Result<Reservation, Status> {
        let mut client = self.inner.clone();
        let req = GetReservationRequest {
            name: name.to_string(),
        };
        Ok(client.get_reservation(Request::new(req)).await?.into_inner())
    }

    async fn cancel(&self, name: &str, intent: CancelIntent) -> Result<(), Status> {
        let mut client = self.inner.clone();
        let req = CancelReservationRequest {
            name: name.to_string(),
            intent: intent as i32,
        };
        client.cancel_reservation(Request::new(req)).await?;
        Ok(())
    }
}
