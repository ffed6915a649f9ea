//! Lifecycle registry for deployed transports.

use crate::message::Message;
use crate::plugin::PluginLoader;
use crate::transport::domain::{TransportDescriptor, TransportState};
use crate::transport::ports::{
    EventSink, Transport, TransportCapability, TransportError, TransportExporter, TransportResult,
};
use async_trait::async_trait;
use std::collections::{BTreeMap, HashMap};
use std::sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard};
use tracing::{debug, error, info, warn};

#[derive(Default)]
struct RegistryState {
    transports: HashMap<String, Arc<dyn Transport>>,
    display_names: BTreeMap<String, String>,
    states: BTreeMap<String, TransportState>,
}

impl RegistryState {
    fn state_of(&self, type_name: &str) -> TransportState {
        self.states.get(type_name).copied().unwrap_or_default()
    }

    fn transition(&mut self, type_name: &str, target: TransportState) -> TransportResult<()> {
        let current = self.state_of(type_name);
        if !current.can_transition_to(target) {
            return Err(TransportError::InvalidTransition {
                transport: type_name.to_owned(),
                from: current,
                to: target,
            });
        }
        self.states.insert(type_name.to_owned(), target);
        Ok(())
    }
}

/// Registry of deployed transports keyed by type name.
///
/// Each type moves through `NOT_READY -> REGISTERING -> REGISTERED ->
/// UNDEPLOYED`. The actual publication is delegated to the exporter `E`.
/// Registry locks are never held while the exporter or the event sink runs.
pub struct TransportRegistry<E: TransportExporter> {
    exporter: Arc<E>,
    state: RwLock<RegistryState>,
    sink: RwLock<Option<Arc<dyn EventSink>>>,
}

impl<E: TransportExporter> TransportRegistry<E> {
    /// Creates an empty registry publishing through `exporter`.
    #[must_use]
    pub fn new(exporter: Arc<E>) -> Self {
        Self {
            exporter,
            state: RwLock::new(RegistryState::default()),
            sink: RwLock::new(None),
        }
    }

    /// Exports `transport` and records it as registered.
    ///
    /// # Errors
    ///
    /// Returns [`TransportError::InvalidTransition`] when the type is
    /// already being registered, or the exporter's error. A failed export
    /// leaves the type `NOT_READY` and unregistered.
    pub async fn register(&self, transport: Arc<dyn Transport>) -> TransportResult<()> {
        let type_name = transport.descriptor().type_name().to_owned();
        let display_name = transport.descriptor().user_name().to_owned();
        self.write_state()?
            .transition(&type_name, TransportState::Registering)?;
        debug!(transport = %type_name, "registering transport");

        if let Err(err) = self.exporter.export(Arc::clone(&transport)).await {
            let mut state = self.write_state()?;
            state.transports.remove(&type_name);
            state.display_names.remove(&type_name);
            state.transition(&type_name, TransportState::NotReady)?;
            error!(transport = %type_name, error = %err, "transport export failed");
            return Err(err);
        }

        let mut state = self.write_state()?;
        state.transports.insert(type_name.clone(), transport);
        state
            .display_names
            .insert(type_name.clone(), display_name);
        state.transition(&type_name, TransportState::Registered)?;
        info!(transport = %type_name, "transport registered");
        Ok(())
    }

    /// Registers every transport, logging and skipping failures.
    ///
    /// Returns the type names that ended up registered.
    pub async fn register_all(
        &self,
        transports: impl IntoIterator<Item = Arc<dyn Transport>>,
    ) -> Vec<String> {
        let mut registered = Vec::new();
        for transport in transports {
            let type_name = transport.descriptor().type_name().to_owned();
            match self.register(transport).await {
                Ok(()) => registered.push(type_name),
                Err(err) => {
                    warn!(transport = %type_name, error = %err, "skipping transport");
                }
            }
        }
        registered
    }

    /// Instantiates `descriptors` through the plugin `loader` and registers
    /// the resulting transports.
    ///
    /// Instantiation failures are logged and skipped like export failures.
    pub async fn register_from_plugins(
        &self,
        loader: &PluginLoader<TransportCapability>,
        descriptors: &[TransportDescriptor],
    ) -> Vec<String> {
        let mut transports = Vec::with_capacity(descriptors.len());
        for descriptor in descriptors {
            match loader.instantiate(descriptor.type_name(), descriptor) {
                Ok(transport) => transports.push(transport),
                Err(err) => {
                    warn!(
                        transport = descriptor.type_name(),
                        error = %err,
                        "transport plugin unavailable"
                    );
                }
            }
        }
        self.register_all(transports).await
    }

    /// Withdraws `type_name` from the exporter, then removes it from the
    /// registry and marks it `UNDEPLOYED`.
    ///
    /// A failed unexport leaves the registry untouched: the type stays
    /// `REGISTERED` and can still be found.
    ///
    /// # Errors
    ///
    /// Returns [`TransportError::NotDeployed`] when the registry has never
    /// seen the type, [`TransportError::InvalidTransition`] when it cannot
    /// be undeployed from its current state, or the exporter's error.
    pub async fn unregister(&self, type_name: &str) -> TransportResult<()> {
        let deployed = {
            let state = self.read_state()?;
            let Some(current) = state.states.get(type_name).copied() else {
                return Err(TransportError::NotDeployed(type_name.to_owned()));
            };
            if !current.can_transition_to(TransportState::Undeployed) {
                return Err(TransportError::InvalidTransition {
                    transport: type_name.to_owned(),
                    from: current,
                    to: TransportState::Undeployed,
                });
            }
            state.transports.contains_key(type_name)
        };

        if deployed {
            self.exporter
                .unexport(type_name)
                .await
                .inspect_err(|err| {
                    error!(transport = type_name, error = %err, "transport stays deployed");
                })?;
        }

        let mut state = self.write_state()?;
        state.transition(type_name, TransportState::Undeployed)?;
        state.display_names.remove(type_name);
        state.transports.remove(type_name);
        info!(transport = type_name, "transport undeployed");
        Ok(())
    }

    /// Returns the live transport for `type_name`.
    ///
    /// # Errors
    ///
    /// Returns [`TransportError::NotDeployed`] when the type is not
    /// registered.
    pub fn find(&self, type_name: &str) -> TransportResult<Arc<dyn Transport>> {
        self.read_state()?
            .transports
            .get(type_name)
            .cloned()
            .ok_or_else(|| TransportError::NotDeployed(type_name.to_owned()))
    }

    /// Installs the callback receiving inbound asynchronous messages,
    /// replacing any previous one.
    ///
    /// # Errors
    ///
    /// Returns [`TransportError::Registry`] when registry state is
    /// unavailable.
    pub fn set_event_sink(&self, sink: Arc<dyn EventSink>) -> TransportResult<()> {
        *self
            .sink
            .write()
            .map_err(|err| TransportError::Registry(err.to_string()))? = Some(sink);
        Ok(())
    }

    /// Relays an inbound message for `session_id` to the event sink.
    ///
    /// # Errors
    ///
    /// Returns [`TransportError::NoEventSink`] when no sink is installed, or
    /// the sink's error.
    pub async fn produce_event(
        &self,
        type_name: &str,
        session_id: &str,
        message: Message,
    ) -> TransportResult<()> {
        let sink = self
            .sink
            .read()
            .map_err(|err| TransportError::Registry(err.to_string()))?
            .clone()
            .ok_or(TransportError::NoEventSink)?;
        debug!(transport = type_name, session = session_id, "relaying inbound message");
        sink.on_event(type_name, session_id, message).await
    }

    /// Returns the state table.
    ///
    /// # Errors
    ///
    /// Returns [`TransportError::Registry`] when registry state is
    /// unavailable.
    pub fn get_states(&self) -> TransportResult<BTreeMap<String, TransportState>> {
        Ok(self.read_state()?.states.clone())
    }

    /// Returns the state of `type_name`; unknown types are `NOT_READY`.
    ///
    /// # Errors
    ///
    /// Returns [`TransportError::Registry`] when registry state is
    /// unavailable.
    pub fn get_state(&self, type_name: &str) -> TransportResult<TransportState> {
        Ok(self.read_state()?.state_of(type_name))
    }

    /// Returns registered type names mapped to their display names.
    ///
    /// # Errors
    ///
    /// Returns [`TransportError::Registry`] when registry state is
    /// unavailable.
    pub fn registered_types(&self) -> TransportResult<BTreeMap<String, String>> {
        Ok(self.read_state()?.display_names.clone())
    }

    fn read_state(&self) -> TransportResult<RwLockReadGuard<'_, RegistryState>> {
        self.state
            .read()
            .map_err(|err| TransportError::Registry(err.to_string()))
    }

    fn write_state(&self) -> TransportResult<RwLockWriteGuard<'_, RegistryState>> {
        self.state
            .write()
            .map_err(|err| TransportError::Registry(err.to_string()))
    }
}

#[async_trait]
impl<E: TransportExporter> EventSink for TransportRegistry<E> {
    async fn on_event(
        &self,
        transport: &str,
        session_id: &str,
        message: Message,
    ) -> TransportResult<()> {
        self.produce_event(transport, session_id, message).await
    }
}
