//! Expiring single-slot mailbox with a back-off wait.

use super::{LockProvider, SessionResult, SessionSignal, lock_error};
use crate::config::SessionConfig;
use crate::message::Message;
use std::collections::HashMap;
use std::sync::{Arc, Mutex, Weak};
use std::time::Duration;
use tokio::task::JoinHandle;
use tokio::time::Instant;
use tracing::{debug, warn};

const MIN_POLL_INTERVAL: Duration = Duration::from_millis(1);
const MAX_MULTIPLIER: f64 = 1024.0;

#[derive(Debug, Clone, Copy)]
struct Backoff {
    pause: Duration,
    ceiling: Duration,
    factor: f64,
}

impl Backoff {
    fn new(interval: Duration, max_interval: Duration, multiplier: f64, timeout: Duration) -> Self {
        let ceiling = max_interval
            .max(interval)
            .min(timeout)
            .max(MIN_POLL_INTERVAL);
        Self {
            pause: interval.max(MIN_POLL_INTERVAL).min(ceiling),
            ceiling,
            factor: multiplier.max(1.0).min(MAX_MULTIPLIER),
        }
    }

    fn grow(&mut self) {
        self.pause = self
            .pause
            .mul_f64(self.factor)
            .min(self.ceiling)
            .max(MIN_POLL_INTERVAL);
    }
}

#[derive(Debug)]
struct Pending {
    message: Message,
    expires_at: Instant,
}

/// Correlates replies with the sessions waiting for them.
///
/// Each session holds at most one undelivered message; a later write
/// replaces it. Messages expire after the configured TTL and expiry wakes
/// the session's waiter. Delivered sessions release their signal at once;
/// unread messages and abandoned signals are dropped by
/// [`Self::evict_expired`], which [`Self::spawn_eviction`] runs periodically.
#[derive(Debug)]
pub struct SessionHandler {
    config: SessionConfig,
    mailbox: Mutex<HashMap<String, Pending>>,
    locks: LockProvider,
}

impl SessionHandler {
    /// Creates an empty handler.
    #[must_use]
    pub fn new(config: SessionConfig) -> Self {
        let locks = LockProvider::new(config.lock_ttl());
        Self {
            config,
            mailbox: Mutex::new(HashMap::new()),
            locks,
        }
    }

    /// Returns the signal table.
    #[must_use]
    pub const fn locks(&self) -> &LockProvider {
        &self.locks
    }

    /// Stores `message` for `session_id` and wakes its waiter.
    ///
    /// # Errors
    ///
    /// Returns [`super::SessionError::Lock`] when session state is
    /// unavailable.
    pub fn add_message(&self, session_id: &str, message: Message) -> SessionResult<()> {
        let expires_at = Instant::now() + self.config.message_ttl();
        let replaced = self
            .mailbox
            .lock()
            .map_err(lock_error)?
            .insert(session_id.to_owned(), Pending { message, expires_at });
        if replaced.is_some() {
            debug!(session_id, "replaced undelivered session message");
        }
        self.locks.notify(session_id)
    }

    /// Takes the message stored for `session_id`, if any.
    ///
    /// A delivered session with nobody waiting on it also drops its signal.
    ///
    /// # Errors
    ///
    /// Returns [`super::SessionError::Lock`] when session state is
    /// unavailable.
    pub fn get_message(&self, session_id: &str) -> SessionResult<Option<Message>> {
        let pending = self.mailbox.lock().map_err(lock_error)?.remove(session_id);
        let Some(entry) = pending else {
            return Ok(None);
        };
        self.locks.release(session_id)?;
        Ok((entry.expires_at > Instant::now()).then_some(entry.message))
    }

    /// Waits for the reply to `session_id`.
    ///
    /// Polls every `interval`, growing the pause by `multiplier` (values
    /// below `1.0` mean a fixed interval) up to `max_interval`. Gives up
    /// after the configured wait timeout, or when the session is evicted or
    /// removed, returning `None`. The session's signal is released once the
    /// wait ends.
    ///
    /// # Errors
    ///
    /// Returns [`super::SessionError::Lock`] when session state is
    /// unavailable.
    pub async fn wait_response(
        &self,
        session_id: &str,
        interval: Duration,
        max_interval: Duration,
        multiplier: f64,
    ) -> SessionResult<Option<Message>> {
        if let Some(message) = self.get_message(session_id)? {
            return Ok(Some(message));
        }

        let timeout = self.config.wait_timeout();
        let deadline = Instant::now() + timeout;
        let backoff = Backoff::new(interval, max_interval, multiplier, timeout);
        let signal = self.locks.signal(session_id)?;
        let outcome = self.poll(session_id, &signal, deadline, backoff).await;
        drop(signal);
        self.locks.release(session_id)?;
        outcome
    }

    async fn poll(
        &self,
        session_id: &str,
        signal: &SessionSignal,
        deadline: Instant,
        mut backoff: Backoff,
    ) -> SessionResult<Option<Message>> {
        loop {
            if let Some(message) = self.get_message(session_id)? {
                return Ok(Some(message));
            }
            if signal.is_cancelled() {
                debug!(session_id, "session evicted while waiting");
                return Ok(None);
            }
            let remaining = deadline.saturating_duration_since(Instant::now());
            if remaining.is_zero() {
                debug!(session_id, "no reply before timeout");
                return Ok(None);
            }
            // Elapsed pauses simply start the next poll.
            let _elapsed =
                tokio::time::timeout(backoff.pause.min(remaining), signal.notified()).await;
            backoff.grow();
        }
    }

    /// Wakes the waiter of `session_id` without storing a message.
    ///
    /// Safe to call before anyone waits.
    ///
    /// # Errors
    ///
    /// Returns [`super::SessionError::Lock`] when session state is
    /// unavailable.
    pub fn notify(&self, session_id: &str) -> SessionResult<()> {
        self.locks.notify(session_id)
    }

    /// Drops the session's message and cancels its waiter.
    ///
    /// # Errors
    ///
    /// Returns [`super::SessionError::Lock`] when session state is
    /// unavailable.
    pub fn remove(&self, session_id: &str) -> SessionResult<()> {
        self.mailbox.lock().map_err(lock_error)?.remove(session_id);
        self.locks.cancel(session_id)?;
        Ok(())
    }

    /// Evicts expired messages and stale signals, waking affected waiters.
    ///
    /// Returns the number of messages evicted.
    ///
    /// # Errors
    ///
    /// Returns [`super::SessionError::Lock`] when session state is
    /// unavailable.
    pub fn evict_expired(&self) -> SessionResult<usize> {
        let now = Instant::now();
        let expired: Vec<String> = {
            let mut mailbox = self.mailbox.lock().map_err(lock_error)?;
            let keys: Vec<String> = mailbox
                .iter()
                .filter(|(_, pending)| pending.expires_at <= now)
                .map(|(session_id, _)| session_id.clone())
                .collect();
            for session_id in &keys {
                mailbox.remove(session_id);
            }
            keys
        };

        for session_id in &expired {
            if self.locks.cancel(session_id)? {
                debug!(session_id = %session_id, "woke waiter of expired session");
            }
        }
        for session_id in self.locks.evict_expired(now)? {
            debug!(session_id = %session_id, "dropped stale session signal");
        }
        Ok(expired.len())
    }

    /// Starts a background sweeper calling [`Self::evict_expired`] every
    /// eviction interval.
    ///
    /// The task holds only a weak reference and ends once the handler is
    /// dropped.
    #[must_use]
    pub fn spawn_eviction(self: &Arc<Self>) -> JoinHandle<()> {
        let handler: Weak<Self> = Arc::downgrade(self);
        let period = self.config.eviction_interval().max(MIN_POLL_INTERVAL);
        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(period);
            loop {
                ticker.tick().await;
                let Some(live) = handler.upgrade() else {
                    break;
                };
                if let Err(err) = live.evict_expired() {
                    warn!(error = %err, "session eviction failed");
                }
            }
        })
    }

    /// Returns the number of undelivered messages.
    ///
    /// # Errors
    ///
    /// Returns [`super::SessionError::Lock`] when session state is
    /// unavailable.
    pub fn len(&self) -> SessionResult<usize> {
        Ok(self.mailbox.lock().map_err(lock_error)?.len())
    }

    /// Returns whether no message is pending.
    ///
    /// # Errors
    ///
    /// Returns [`super::SessionError::Lock`] when session state is
    /// unavailable.
    pub fn is_empty(&self) -> SessionResult<bool> {
        Ok(self.len()? == 0)
    }
}
