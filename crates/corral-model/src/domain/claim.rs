use std::time::SystemTime;

use serde::{Deserialize, Serialize};

use crate::SliceRef;

/// Locally persisted claim state of a slice.
///
/// The expiration marker doubles as the claim marker: while it is present the
/// slice is still waiting to be picked up and a timeout/no-resource outcome
/// may legitimately retire it. Once a bot takes the slice the marker is
/// cleared and the record must never be retired by the reconciliation path.
///
/// Transitions are one-way (reapable to claimed, or reapable to retired) and
/// happen outside this crate; consumers only read records.
#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClaimRecord {
    pub slice: SliceRef,
    /// Present while the slice is unclaimed.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub expiration: Option<SystemTime>,
}

impl ClaimRecord {
    /// True if the slice is still unclaimed and may be retired.
    pub fn is_reapable(&self) -> bool {
        self.expiration.is_some()
    }
}
