//! Lazily created wake-up signals keyed by session id.

use super::{SessionResult, lock_error};
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::sync::Notify;
use tokio::time::Instant;

/// One-shot wake-up primitive for a session's waiter.
///
/// A notification sent before anyone waits is kept as a permit, so the next
/// wait completes at once. Cancellation is permanent.
#[derive(Debug, Default)]
pub struct SessionSignal {
    notify: Notify,
    cancelled: AtomicBool,
}

impl SessionSignal {
    /// Wakes the waiter, or lets the next wait pass immediately.
    pub fn notify(&self) {
        self.notify.notify_one();
    }

    /// Cancels the signal and wakes the waiter.
    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::Release);
        self.notify.notify_waiters();
        self.notify.notify_one();
    }

    /// Returns whether the signal was cancelled.
    #[must_use]
    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::Acquire)
    }

    /// Completes on the next notification.
    pub async fn notified(&self) {
        self.notify.notified().await;
    }
}

#[derive(Debug)]
struct SignalEntry {
    signal: Arc<SessionSignal>,
    expires_at: Instant,
}

/// Expiring table of [`SessionSignal`]s.
#[derive(Debug)]
pub struct LockProvider {
    ttl: Duration,
    signals: Mutex<HashMap<String, SignalEntry>>,
}

impl LockProvider {
    /// Creates a provider whose entries live `ttl` after their last use.
    #[must_use]
    pub fn new(ttl: Duration) -> Self {
        Self {
            ttl,
            signals: Mutex::new(HashMap::new()),
        }
    }

    /// Returns the signal for `session_id`, creating it on first use.
    ///
    /// # Errors
    ///
    /// Returns [`super::SessionError::Lock`] when the table is unavailable.
    pub fn signal(&self, session_id: &str) -> SessionResult<Arc<SessionSignal>> {
        let expires_at = Instant::now() + self.ttl;
        let mut signals = self.signals.lock().map_err(lock_error)?;
        let entry = signals
            .entry(session_id.to_owned())
            .or_insert_with(|| SignalEntry {
                signal: Arc::new(SessionSignal::default()),
                expires_at,
            });
        entry.expires_at = expires_at;
        Ok(Arc::clone(&entry.signal))
    }

    /// Wakes the waiter of `session_id`, creating the signal if needed.
    ///
    /// # Errors
    ///
    /// Returns [`super::SessionError::Lock`] when the table is unavailable.
    pub fn notify(&self, session_id: &str) -> SessionResult<()> {
        self.signal(session_id)?.notify();
        Ok(())
    }

    /// Drops the signal of `session_id` when no waiter holds it.
    ///
    /// The signal is not cancelled. Returns whether an entry was removed.
    ///
    /// # Errors
    ///
    /// Returns [`super::SessionError::Lock`] when the table is unavailable.
    pub fn release(&self, session_id: &str) -> SessionResult<bool> {
        let mut signals = self.signals.lock().map_err(lock_error)?;
        let idle = signals
            .get(session_id)
            .is_some_and(|entry| Arc::strong_count(&entry.signal) == 1);
        if idle {
            signals.remove(session_id);
        }
        Ok(idle)
    }

    /// Removes and cancels the signal of `session_id`.
    ///
    /// Returns whether a signal existed.
    ///
    /// # Errors
    ///
    /// Returns [`super::SessionError::Lock`] when the table is unavailable.
    pub fn cancel(&self, session_id: &str) -> SessionResult<bool> {
        let removed = self.signals.lock().map_err(lock_error)?.remove(session_id);
        let Some(entry) = removed else {
            return Ok(false);
        };
        entry.signal.cancel();
        Ok(true)
    }

    /// Removes and cancels every signal unused for longer than the TTL.
    ///
    /// # Errors
    ///
    /// Returns [`super::SessionError::Lock`] when the table is unavailable.
    pub fn evict_expired(&self, now: Instant) -> SessionResult<Vec<String>> {
        let mut signals = self.signals.lock().map_err(lock_error)?;
        let expired: Vec<String> = signals
            .iter()
            .filter(|(_, entry)| entry.expires_at <= now)
            .map(|(session_id, _)| session_id.clone())
            .collect();
        for session_id in &expired {
            if let Some(entry) = signals.remove(session_id) {
                entry.signal.cancel();
            }
        }
        Ok(expired)
    }

    /// Returns the number of live signals.
    ///
    /// # Errors
    ///
    /// Returns [`super::SessionError::Lock`] when the table is unavailable.
    pub fn len(&self) -> SessionResult<usize> {
        Ok(self.signals.lock().map_err(lock_error)?.len())
    }

    /// Returns whether no signal is live.
    ///
    /// # Errors
    ///
    /// Returns [`super::SessionError::Lock`] when the table is unavailable.
    pub fn is_empty(&self) -> SessionResult<bool> {
        Ok(self.len()? == 0)
    }
}
