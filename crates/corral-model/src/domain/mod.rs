mod slice;
pub use slice::SliceRef;

mod claim;
pub use claim::ClaimRecord;

mod retire;
pub use retire::{RetireReason, RetireRequest};

mod constants;
pub use constants::CONSTRAINT_KEY_PREFIX;
