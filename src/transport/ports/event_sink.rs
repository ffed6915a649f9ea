//! Callback receiving inbound asynchronous messages.

use super::TransportResult;
use crate::message::Message;
use async_trait::async_trait;

/// Receives messages transports produce outside a request exchange.
#[async_trait]
pub trait EventSink: Send + Sync {
    /// Handles `message` arriving on `transport` for `session_id`.
    async fn on_event(
        &self,
        transport: &str,
        session_id: &str,
        message: Message,
    ) -> TransportResult<()>;
}
