//! Session correlation of outbound sends with their asynchronous replies.
//!
//! [`SessionHandler`] keeps at most one undelivered message per session id
//! in an expiring mailbox. Callers block in
//! [`SessionHandler::wait_response`] on a per-session [`SessionSignal`]
//! handed out by the [`LockProvider`]; a reply, an explicit notify, expiry
//! or removal wakes them.

mod handler;
mod lock;

pub use handler::SessionHandler;
pub use lock::{LockProvider, SessionSignal};

use thiserror::Error;

/// Errors raised by session bookkeeping.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum SessionError {
    /// Mailbox or signal table lock was poisoned.
    #[error("session state unavailable: {0}")]
    Lock(String),
}

/// Result type for session operations.
pub type SessionResult<T> = Result<T, SessionError>;

fn lock_error(err: impl std::fmt::Display) -> SessionError {
    SessionError::Lock(err.to_string())
}
