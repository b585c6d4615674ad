use tonic::Code;

use corral_botplane::{ReservationState, RpcStatus};
use corral_model::RetireReason;

use crate::internals::SliceResult;

/// A decision to give up on a slice.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct RetireDecision {
    pub reason: RetireReason,
    /// Diagnostic text, typically the upstream error message.
    pub details: String,
}

/// Maps a reservation's terminal state onto a retire decision.
///
/// Pure and side-effect free on purpose: the whole decision table lives here,
/// separate from the I/O-performing handlers, so it can be tested without
/// mocking network clients. `None` means "no decision yet" or "nothing for
/// the reconciliation path to do".
pub fn classify_reservation_outcome(
    state: ReservationState,
    status: Option<&RpcStatus>,
    result: Option<&SliceResult>,
) -> Option<RetireDecision> {
    // PENDING and ASSIGNED are not resolved yet. CANCELLED was recorded
    // through the cancellation path already.
    if state != ReservationState::Completed {
        return None;
    }

    // A failure reported by the bot itself wins over any generic code.
    if let Some(result) = result {
        if !result.bot_internal_error.is_empty() {
            return Some(RetireDecision {
                reason: RetireReason::BotInternalError,
                details: result.bot_internal_error.clone(),
            });
        }
    }

    let code = status.map_or(Code::Ok, |s| Code::from(s.code));
    let message = status.map(|s| s.message.clone()).unwrap_or_default();

    match code {
        // The reservation's own timeout fired before any bot engaged.
        Code::DeadlineExceeded => Some(RetireDecision {
            reason: RetireReason::Expired,
            details: message,
        }),
        // No eligible bot could be found.
        Code::FailedPrecondition => Some(RetireDecision {
            reason: RetireReason::NoResource,
            details: message,
        }),
        // A bot died before completing the claim handshake.
        Code::Aborted => Some(RetireDecision {
            reason: RetireReason::BotInternalError,
            details: message,
        }),
        // A cooperative cancellation, already recorded elsewhere.
        Code::Cancelled => None,
        _ => {
            if result.is_some() {
                // Ran to genuine completion.
                None
            } else {
                // Completed with no error and no result: an anomaly.
                Some(RetireDecision {
                    reason: RetireReason::BotInternalError,
                    details: "unexpectedly finished".to_string(),
                })
            }
        }
    }
}

/// Reason recorded when the scheduler rejects a reservation outright at
/// creation time.
pub fn create_failure_reason(code: Code) -> RetireReason {
    match code {
        Code::FailedPrecondition => RetireReason::NoResource,
        Code::PermissionDenied => RetireReason::PermissionDenied,
        _ => RetireReason::BotInternalError,
    }
}
