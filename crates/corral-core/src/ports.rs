use async_trait::async_trait;
use thiserror::Error;

use corral_model::{ClaimRecord, SliceRef};

/// Claim store lookup failure. Handlers treat these as transient: the store
/// decided nothing, the event can simply be redelivered.
#[derive(Debug, Error)]
#[error("claim store: {0}")]
pub struct StoreError(pub String);

/// Read access to locally persisted claim records.
///
/// The backing store owns per-record consistency; concurrent readers see
/// either the reapable or the claimed state, never something in between.
#[async_trait]
pub trait ClaimStore: Send + Sync + 'static {
    /// Fetch the claim record for a slice, or `None` once the record has
    /// been cleaned up.
    async fn get(&self, slice: &SliceRef) -> Result<Option<ClaimRecord>, StoreError>;
}
