use std::fmt;

use serde::{Deserialize, Serialize};

use crate::SliceRef;

/// Why a slice was given up.
///
/// Wire-visible and stable: values are consumed by the local bookkeeping
/// service and by operator tooling. `Unspecified` is a sentinel and is never
/// sent deliberately.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RetireReason {
    Unspecified,
    /// The reservation's own queueing timeout fired before any bot engaged.
    Expired,
    /// No eligible bot could be found for the slice's constraints.
    NoResource,
    /// The scheduler rejected the reservation for authorization reasons.
    PermissionDenied,
    /// A bot picked the slice up and then failed on its own side.
    BotInternalError,
}

impl RetireReason {
    pub fn as_str(&self) -> &'static str {
        match self {
            RetireReason::Unspecified => "UNSPECIFIED",
            RetireReason::Expired => "EXPIRED",
            RetireReason::NoResource => "NO_RESOURCE",
            RetireReason::PermissionDenied => "PERMISSION_DENIED",
            RetireReason::BotInternalError => "BOT_INTERNAL_ERROR",
        }
    }
}

impl fmt::Display for RetireReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Command value telling the local scheduler to give up on a slice.
///
/// Duplicate requests for the same (slice, reason) must be safely ignorable
/// by the receiver; the sender does not deduplicate.
#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RetireRequest {
    pub slice: SliceRef,
    pub reason: RetireReason,
    /// Free-text diagnostics, typically the upstream error message.
    pub details: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reason_serializes_as_stable_wire_names() {
        let s = serde_json::to_string(&RetireReason::NoResource).unwrap();
        assert_eq!(s, "\"NO_RESOURCE\"");

        let s = serde_json::to_string(&RetireReason::BotInternalError).unwrap();
        assert_eq!(s, "\"BOT_INTERNAL_ERROR\"");
    }

    #[test]
    fn reason_display_matches_wire_names() {
        assert_eq!(RetireReason::Expired.to_string(), "EXPIRED");
        assert_eq!(RetireReason::PermissionDenied.to_string(), "PERMISSION_DENIED");
    }
}
