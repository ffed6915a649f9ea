//! Bridge from inbound transport events into session mailboxes.

use crate::message::Message;
use crate::session::SessionHandler;
use crate::transport::ports::{EventSink, TransportError, TransportResult};
use async_trait::async_trait;
use std::sync::Arc;
use tracing::debug;

/// Event sink storing inbound replies in the session handler.
#[derive(Debug, Clone)]
pub struct SessionEventSink {
    sessions: Arc<SessionHandler>,
}

impl SessionEventSink {
    /// Creates a sink feeding `sessions`.
    #[must_use]
    pub const fn new(sessions: Arc<SessionHandler>) -> Self {
        Self { sessions }
    }
}

#[async_trait]
impl EventSink for SessionEventSink {
    async fn on_event(
        &self,
        transport: &str,
        session_id: &str,
        message: Message,
    ) -> TransportResult<()> {
        debug!(transport, session_id, "inbound reply for session");
        self.sessions
            .add_message(session_id, message)
            .map_err(|err| TransportError::remote(transport, err))
    }
}
