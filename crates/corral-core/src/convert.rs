use std::time::SystemTime;

use prost::Message;
use prost_types::{Any, Duration, Timestamp};
use thiserror::Error;

use corral_model::{RetireReason, RetireRequest, SliceRef};

use crate::internals;
use crate::internals::{SlicePayload, SliceResult};

const SLICE_PAYLOAD_TYPE_URL: &str = "type.googleapis.com/corral.internals.v1.SlicePayload";
const SLICE_RESULT_TYPE_URL: &str = "type.googleapis.com/corral.internals.v1.SliceResult";

/// A reservation carried something this bridge cannot interpret.
#[derive(Debug, Error)]
pub enum ConvertError {
    #[error("unexpected message type {0}")]
    UnexpectedType(String),
    #[error("undecodable message: {0}")]
    Decode(#[from] prost::DecodeError),
}

impl From<RetireReason> for internals::RetireReason {
    fn from(reason: RetireReason) -> Self {
        match reason {
            RetireReason::Unspecified => internals::RetireReason::Unspecified,
            RetireReason::Expired => internals::RetireReason::Expired,
            RetireReason::NoResource => internals::RetireReason::NoResource,
            RetireReason::PermissionDenied => internals::RetireReason::PermissionDenied,
            RetireReason::BotInternalError => internals::RetireReason::BotInternalError,
        }
    }
}

impl From<internals::RetireReason> for RetireReason {
    fn from(reason: internals::RetireReason) -> Self {
        match reason {
            internals::RetireReason::Unspecified => RetireReason::Unspecified,
            internals::RetireReason::Expired => RetireReason::Expired,
            internals::RetireReason::NoResource => RetireReason::NoResource,
            internals::RetireReason::PermissionDenied => RetireReason::PermissionDenied,
            internals::RetireReason::BotInternalError => RetireReason::BotInternalError,
        }
    }
}

impl From<RetireRequest> for internals::RetireSliceRequest {
    fn from(req: RetireRequest) -> Self {
        internals::RetireSliceRequest {
            task_id: req.slice.task_id,
            claim_shard: req.slice.claim_shard,
            claim_seq: req.slice.claim_seq,
            reason: internals::RetireReason::from(req.reason) as i32,
            details: req.details,
        }
    }
}

/// The claim-store key addressed by a payload.
pub(crate) fn slice_ref(payload: &SlicePayload) -> SliceRef {
    SliceRef {
        task_id: payload.task_id.clone(),
        claim_shard: payload.claim_shard,
        claim_seq: payload.claim_seq,
    }
}

pub(crate) fn pack_slice_payload(payload: &SlicePayload) -> Any {
    Any {
        type_url: SLICE_PAYLOAD_TYPE_URL.to_string(),
        value: payload.encode_to_vec(),
    }
}

pub(crate) fn unpack_slice_payload(any: &Any) -> Result<SlicePayload, ConvertError> {
    if !is_type(any, SLICE_PAYLOAD_TYPE_URL) {
        return Err(ConvertError::UnexpectedType(any.type_url.clone()));
    }
    Ok(SlicePayload::decode(any.value.as_slice())?)
}

#[cfg(test)]
pub(crate) fn pack_slice_result(result: &SliceResult) -> Any {
    Any {
        type_url: SLICE_RESULT_TYPE_URL.to_string(),
        value: result.encode_to_vec(),
    }
}

pub(crate) fn unpack_slice_result(any: &Any) -> Result<SliceResult, ConvertError> {
    if !is_type(any, SLICE_RESULT_TYPE_URL) {
        return Err(ConvertError::UnexpectedType(any.type_url.clone()));
    }
    Ok(SliceResult::decode(any.value.as_slice())?)
}

// Type urls may carry any resolver prefix; only the fully qualified message
// name is significant.
fn is_type(any: &Any, expected_url: &str) -> bool {
    let expected = expected_url.rsplit('/').next().unwrap_or(expected_url);
    any.type_url.rsplit('/').next().unwrap_or(&any.type_url) == expected
}

/// `ts + d`, normalized to timestamp conventions (nanos in `[0, 1e9)`).
pub(crate) fn timestamp_add(ts: &Timestamp, d: &Duration) -> Timestamp {
    let mut seconds = ts.seconds + d.seconds;
    let mut nanos = ts.nanos + d.nanos;
    if nanos >= 1_000_000_000 {
        seconds += 1;
        nanos -= 1_000_000_000;
    } else if nanos < 0 {
        seconds -= 1;
        nanos += 1_000_000_000;
    }
    Timestamp { seconds, nanos }
}

/// Signed `ts - now` as a proto duration. Negative when `ts` is in the past;
/// the scheduler is the one to decide what to do with that.
pub(crate) fn duration_until(ts: &Timestamp, now: SystemTime) -> Duration {
    let now = Timestamp::from(now);
    let mut seconds = ts.seconds - now.seconds;
    let mut nanos = ts.nanos - now.nanos;
    // Proto durations keep both fields on the same sign.
    if nanos < 0 && seconds > 0 {
        seconds -= 1;
        nanos += 1_000_000_000;
    } else if nanos > 0 && seconds < 0 {
        seconds += 1;
        nanos -= 1_000_000_000;
    }
    Duration { seconds, nanos }
}
