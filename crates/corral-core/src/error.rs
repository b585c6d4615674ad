use thiserror::Error;
use tonic::Code;

/// Failure of a work-queue handler invocation.
///
/// Failures classify along two independent axes. `Transient` means nothing
/// was decided and the queue should redeliver the event. `Ignore` and
/// `Fatal` are both terminal (a decision was recorded, stop retrying);
/// `Fatal` additionally signals operators about an unexpected condition,
/// while `Ignore` covers expected operational outcomes like a lack of bot
/// resources.
#[derive(Debug, Error)]
pub enum HandlerError {
    #[error("transient: {0}")]
    Transient(String),
    #[error("ignored: {0}")]
    Ignore(String),
    #[error("fatal: {0}")]
    Fatal(String),
}

impl HandlerError {
    /// True when the queue dispatcher should redeliver the event.
    pub fn is_retryable(&self) -> bool {
        matches!(self, HandlerError::Transient(_))
    }
}

/// Status codes that indicate a transient infrastructure fault on an RPC:
/// nothing was decided remotely and the same call can simply be repeated.
pub fn is_transient_code(code: Code) -> bool {
    matches!(
        code,
        Code::Internal | Code::Unavailable | Code::Unknown | Code::DeadlineExceeded
    )
}
