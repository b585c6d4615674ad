use std::sync::Arc;
use std::time::SystemTime;

use tonic::Code;
use tracing::{debug, instrument, warn};

use corral_botplane::{
    CancelIntent, Constraint, CreateReservationRequest, Reservation, ReservationClient,
    reservation_name,
};
use corral_model::{CONSTRAINT_KEY_PREFIX, RetireRequest};

use crate::bookkeeping::BookkeepingClient;
use crate::config::ConfigHandle;
use crate::convert;
use crate::error::{HandlerError, is_transient_code};
use crate::internals::{CancelReservationTask, EnqueueReservationTask, slice_payload};
use crate::outcome::{classify_reservation_outcome, create_failure_reason};
use crate::ports::ClaimStore;

/// Reconciles locally persisted slice claims with botplane reservations.
///
/// The claim store and the scheduler are independently replicated state
/// machines coupled only by best-effort RPCs; there is no transaction
/// spanning the two. Every handler here is therefore idempotent, re-derives
/// its decision from current state on each delivery, and uses the claim
/// record's reapability as the sole synchronization point. All entry points
/// are driven by an at-least-once work queue and are safe under duplicate
/// and out-of-order delivery.
pub struct ReservationBridge {
    reservations: Arc<dyn ReservationClient>,
    bookkeeping: Arc<dyn BookkeepingClient>,
    claims: Arc<dyn ClaimStore>,
    config: ConfigHandle,
}

impl ReservationBridge {
    pub fn new(
        reservations: Arc<dyn ReservationClient>,
        bookkeeping: Arc<dyn BookkeepingClient>,
        claims: Arc<dyn ClaimStore>,
        config: ConfigHandle,
    ) -> Self {
        Self {
            reservations,
            bookkeeping,
            claims,
            config,
        }
    }

    /// Handles a "create reservation for slice" queue event.
    #[instrument(level = "debug", skip(self, task), fields(instance = %task.botplane_instance))]
    pub async fn handle_enqueue(&self, task: EnqueueReservationTask) -> Result<(), HandlerError> {
        self.handle_enqueue_at(task, SystemTime::now()).await
    }

    async fn handle_enqueue_at(
        &self,
        task: EnqueueReservationTask,
        now: SystemTime,
    ) -> Result<(), HandlerError> {
        // Redelivery cannot fix a malformed event.
        let mut payload = task
            .payload
            .ok_or_else(|| HandlerError::Fatal("enqueue event has no slice payload".to_string()))?;
        let expiry = task
            .expiry
            .ok_or_else(|| HandlerError::Fatal("enqueue event has no expiry".to_string()))?;
        let execution_timeout = task.execution_timeout.ok_or_else(|| {
            HandlerError::Fatal("enqueue event has no execution timeout".to_string())
        })?;

        let slice = convert::slice_ref(&payload);

        // A stale redelivery may arrive after the slice has already moved on.
        match self
            .claims
            .get(&slice)
            .await
            .map_err(|e| HandlerError::Transient(e.to_string()))?
        {
            None => {
                debug!(slice = %slice, "claim record is gone, nothing to enqueue");
                return Ok(());
            }
            Some(record) if !record.is_reapable() => {
                debug!(slice = %slice, "slice already claimed, nothing to enqueue");
                return Ok(());
            }
            Some(_) => {}
        }

        let cfg = self.config.snapshot();
        payload
            .debug_info
            .get_or_insert_with(slice_payload::DebugInfo::default)
            .bridge_version = cfg.bridge_version.clone();

        let name = reservation_name(&task.botplane_instance, &payload.reservation_id);
        let reservation = Reservation {
            name: name.clone(),
            payload: Some(convert::pack_slice_payload(&payload)),
            constraints: task
                .constraints
                .iter()
                .map(|c| Constraint {
                    key: format!("{CONSTRAINT_KEY_PREFIX}{}", c.key),
                    allowed_values: c.allowed_values.clone(),
                })
                .collect(),
            // Must outlive both the wait-for-a-bot window and the run window.
            expire_time: Some(convert::timestamp_add(&expiry, &execution_timeout)),
            queuing_timeout: Some(convert::duration_until(&expiry, now)),
            execution_timeout: Some(execution_timeout),
            priority: task.priority,
            requested_bot_id: task.requested_bot_id.clone(),
            ..Default::default()
        };

        let status = match self
            .reservations
            .create(CreateReservationRequest {
                parent: task.botplane_instance.clone(),
                reservation: Some(reservation),
            })
            .await
        {
            Ok(_) => {
                debug!(reservation = %name, slice = %slice, "reservation created");
                return Ok(());
            }
            Err(status) if status.code() == Code::AlreadyExists => {
                // The expected shape of an idempotent retry.
                debug!(reservation = %name, "reservation already exists");
                return Ok(());
            }
            Err(status) if is_transient_code(status.code()) => {
                return Err(HandlerError::Transient(status.to_string()));
            }
            Err(status) => status,
        };

        // The scheduler rejected the reservation outright. Record the give-up
        // locally before acknowledging the event.
        let reason = create_failure_reason(status.code());
        let expected = status.code() == Code::FailedPrecondition;
        warn!(
            reservation = %name,
            slice = %slice,
            code = ?status.code(),
            reason = %reason,
            "reservation creation failed",
        );

        let retire = RetireRequest {
            slice: slice.clone(),
            reason,
            details: status.to_string(),
        };
        match self.bookkeeping.retire_slice(retire).await {
            Ok(()) if expected => Err(HandlerError::Ignore(status.to_string())),
            Ok(()) => Err(HandlerError::Fatal(status.to_string())),
            Err(err) => {
                // The local record was not updated; claiming the event is
                // handled would strand the slice. Redeliver and redo the
                // whole decision.
                warn!(slice = %slice, error = %err, "failed to retire slice");
                Err(HandlerError::Transient(err.to_string()))
            }
        }
    }

    /// Handles a "cancel reservation" queue event.
    ///
    /// Best effort: asks for cancellation regardless of current assignment
    /// and does not wait for the reservation to reach a cancelled state.
    #[instrument(
        level = "debug",
        skip(self, task),
        fields(instance = %task.botplane_instance, reservation = %task.reservation_id),
    )]
    pub async fn handle_cancel(&self, task: CancelReservationTask) -> Result<(), HandlerError> {
        let name = reservation_name(&task.botplane_instance, &task.reservation_id);
        match self.reservations.cancel(&name, CancelIntent::Any).await {
            Ok(()) => Ok(()),
            Err(status) if status.code() == Code::NotFound => {
                debug!(reservation = %name, "reservation is already gone");
                Ok(())
            }
            Err(status) => Err(HandlerError::Transient(status.to_string())),
        }
    }

    /// Fetches a reservation by name and reconciles the slice it carries.
    ///
    /// Invoked on push notifications about terminal reservations and from
    /// periodic sweeps; the two may race, which is fine since the decision is
    /// re-derived from current state on every call.
    #[instrument(level = "debug", skip(self))]
    pub async fn reconcile_by_name(&self, name: &str) -> Result<(), HandlerError> {
        let reservation = match self.reservations.fetch(name).await {
            Ok(reservation) => reservation,
            Err(status) if status.code() == Code::NotFound => {
                debug!(reservation = %name, "reservation is gone, nothing to reconcile");
                return Ok(());
            }
            Err(status) => return Err(HandlerError::Transient(status.to_string())),
        };
        self.reconcile(&reservation).await
    }

    /// Decides whether the slice behind a reservation should be retired and,
    /// if so, tells the local bookkeeping service.
    pub async fn reconcile(&self, reservation: &Reservation) -> Result<(), HandlerError> {
        let payload = reservation.payload.as_ref().ok_or_else(|| {
            HandlerError::Fatal(format!("reservation {} has no payload", reservation.name))
        })?;
        let payload = convert::unpack_slice_payload(payload)
            .map_err(|e| HandlerError::Fatal(format!("reservation {}: {e}", reservation.name)))?;
        let slice = convert::slice_ref(&payload);

        // Re-check reapability immediately before retiring: a bot may have
        // claimed the slice while the reservation was in flight, and retiring
        // it then would be incorrect.
        match self
            .claims
            .get(&slice)
            .await
            .map_err(|e| HandlerError::Transient(e.to_string()))?
        {
            None => {
                debug!(slice = %slice, "claim record is gone, already cleaned up");
                return Ok(());
            }
            Some(record) if !record.is_reapable() => {
                debug!(slice = %slice, "slice already claimed, leaving it alone");
                return Ok(());
            }
            Some(_) => {}
        }

        let result = match &reservation.result {
            Some(any) => Some(convert::unpack_slice_result(any).map_err(|e| {
                HandlerError::Fatal(format!("reservation {}: {e}", reservation.name))
            })?),
            None => None,
        };

        let Some(decision) = classify_reservation_outcome(
            reservation.state(),
            reservation.status.as_ref(),
            result.as_ref(),
        ) else {
            return Ok(());
        };

        warn!(
            slice = %slice,
            reason = %decision.reason,
            details = %decision.details,
            "retiring slice",
        );
        self.bookkeeping
            .retire_slice(RetireRequest {
                slice,
                reason: decision.reason,
                details: decision.details,
            })
            .await
            .map_err(|status| HandlerError::Transient(status.to_string()))
    }
}
