use std::fmt;

use serde::{Deserialize, Serialize};

/// Identity of one schedulable slice of a task.
///
/// A slice is one attempt (among possibly several alternatives) at executing
/// a logical task. The claim store is keyed by this triple; the slice index
/// inside the payload is diagnostic only and not part of the key.
#[derive(Clone, Debug, Eq, PartialEq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SliceRef {
    /// Identifier of the owning task.
    pub task_id: String,
    /// Shard of the claim table the record lives in.
    pub claim_shard: i32,
    /// Per-shard sequence number of the claim record.
    pub claim_seq: i64,
}

impl fmt::Display for SliceRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}/{}", self.task_id, self.claim_shard, self.claim_seq)
    }
}
