mod proto {
    tonic::include_proto!("corral.botplane.v1");
}
pub use proto::*;

mod client;
pub use client::{GrpcReservationClient, ReservationClient, reservation_name};

pub use tonic;
