pub mod internals {
    tonic::include_proto!("corral.internals.v1");
}

mod error;
pub use error::{HandlerError, is_transient_code};

mod config;
pub use config::{Config, ConfigHandle};

mod ports;
pub use ports::{ClaimStore, StoreError};

mod bookkeeping;
pub use bookkeeping::{BookkeepingClient, GrpcBookkeepingClient};

mod convert;
pub use convert::ConvertError;

mod outcome;
pub use outcome::{RetireDecision, classify_reservation_outcome, create_failure_reason};

mod bridge;
pub use bridge::ReservationBridge;
