//! Unit tests for the transport registry and loopback adapter.

mod registry_tests;

use crate::message::Message;
use crate::transport::domain::{Mep, TransportDescriptor};
use crate::transport::ports::{EventSink, TransportResult};
use async_trait::async_trait;
use std::sync::Mutex;

pub(super) fn descriptor(type_name: &str, mep: Mep) -> TransportDescriptor {
    TransportDescriptor::new(type_name, type_name.to_uppercase(), mep).expect("valid descriptor")
}

/// Sink remembering every relayed event.
#[derive(Default)]
pub(super) struct RecordingSink {
    events: Mutex<Vec<(String, String, Message)>>,
}

impl RecordingSink {
    pub(super) fn events(&self) -> Vec<(String, String, Message)> {
        self.events.lock().expect("sink lock").clone()
    }
}

#[async_trait]
impl EventSink for RecordingSink {
    async fn on_event(
        &self,
        transport: &str,
        session_id: &str,
        message: Message,
    ) -> TransportResult<()> {
        self.events.lock().expect("sink lock").push((
            transport.to_owned(),
            session_id.to_owned(),
            message,
        ));
        Ok(())
    }
}
