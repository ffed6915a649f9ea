//! Transport that answers from a script instead of a remote system.

use crate::context::{ProjectId, ProjectUuid};
use crate::message::Message;
use crate::transport::domain::TransportDescriptor;
use crate::transport::ports::{EventSink, Transport, TransportError, TransportResult};
use async_trait::async_trait;
use std::sync::{Arc, RwLock};

/// A message handed to [`LoopbackTransport::send`].
#[derive(Debug, Clone, PartialEq)]
pub struct SentMessage {
    /// Session the message was sent for.
    pub session_id: String,
    /// Project the send belonged to.
    pub project_uuid: Option<ProjectUuid>,
    /// The message itself.
    pub message: Message,
}

/// Loopback transport used for local runs and tests.
///
/// Synchronous exchanges return the scripted reply. Asynchronous sends are
/// recorded and, when a reply and sink are configured, answered through the
/// sink under the same session id.
#[derive(Clone)]
pub struct LoopbackTransport {
    descriptor: TransportDescriptor,
    endpoint_prefix: Option<String>,
    reply: Option<Message>,
    sink: Arc<RwLock<Option<Arc<dyn EventSink>>>>,
    sent: Arc<RwLock<Vec<SentMessage>>>,
}

impl LoopbackTransport {
    /// Creates a loopback transport for `descriptor` with no scripted reply.
    #[must_use]
    pub fn new(descriptor: TransportDescriptor) -> Self {
        Self {
            descriptor,
            endpoint_prefix: None,
            reply: None,
            sink: Arc::new(RwLock::new(None)),
            sent: Arc::new(RwLock::new(Vec::new())),
        }
    }

    /// Sets the reply returned for every exchange.
    #[must_use]
    pub fn with_reply(mut self, reply: Message) -> Self {
        self.reply = Some(reply);
        self
    }

    /// Sets the published endpoint prefix.
    #[must_use]
    pub fn with_endpoint_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.endpoint_prefix = Some(prefix.into());
        self
    }

    /// Routes asynchronous replies to `sink`.
    ///
    /// # Errors
    ///
    /// Returns [`TransportError::Registry`] when transport state is
    /// unavailable.
    pub fn connect(&self, sink: Arc<dyn EventSink>) -> TransportResult<()> {
        *self
            .sink
            .write()
            .map_err(|err| TransportError::Registry(err.to_string()))? = Some(sink);
        Ok(())
    }

    /// Returns the messages sent so far.
    ///
    /// # Errors
    ///
    /// Returns [`TransportError::Registry`] when transport state is
    /// unavailable.
    pub fn sent(&self) -> TransportResult<Vec<SentMessage>> {
        Ok(self
            .sent
            .read()
            .map_err(|err| TransportError::Registry(err.to_string()))?
            .clone())
    }

    fn current_sink(&self) -> TransportResult<Option<Arc<dyn EventSink>>> {
        Ok(self
            .sink
            .read()
            .map_err(|err| TransportError::Registry(err.to_string()))?
            .clone())
    }
}

#[async_trait]
impl Transport for LoopbackTransport {
    fn descriptor(&self) -> &TransportDescriptor {
        &self.descriptor
    }

    fn endpoint_prefix(&self) -> Option<&str> {
        self.endpoint_prefix.as_deref()
    }

    async fn send(
        &self,
        message: Message,
        session_id: &str,
        project_uuid: Option<ProjectUuid>,
    ) -> TransportResult<()> {
        if self.mep().is_sync() {
            return Err(self.unsupported("send"));
        }
        self.sent
            .write()
            .map_err(|err| TransportError::Registry(err.to_string()))?
            .push(SentMessage {
                session_id: session_id.to_owned(),
                project_uuid,
                message,
            });

        let sink = self.current_sink()?;
        if let (Some(reply), Some(target)) = (self.reply.clone(), sink) {
            target
                .on_event(self.descriptor.type_name(), session_id, reply)
                .await?;
        }
        Ok(())
    }

    async fn receive(&self, session_id: &str) -> TransportResult<Option<Message>> {
        let sent = self
            .sent
            .read()
            .map_err(|err| TransportError::Registry(err.to_string()))?;
        let answered = sent.iter().any(|entry| entry.session_id == session_id);
        Ok(answered.then(|| self.reply.clone()).flatten())
    }

    async fn send_receive_sync(
        &self,
        message: Message,
        _project_id: Option<ProjectId>,
    ) -> TransportResult<Message> {
        if !self.mep().is_sync() {
            return Err(self.unsupported("send_receive_sync"));
        }
        self.sent
            .write()
            .map_err(|err| TransportError::Registry(err.to_string()))?
            .push(SentMessage {
                session_id: String::new(),
                project_uuid: None,
                message: message.clone(),
            });
        Ok(self.reply.clone().unwrap_or(message))
    }
}

impl std::fmt::Debug for LoopbackTransport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LoopbackTransport")
            .field("type_name", &self.descriptor.type_name())
            .field("endpoint_prefix", &self.endpoint_prefix)
            .finish_non_exhaustive()
    }
}
