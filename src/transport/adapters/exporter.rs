//! Exporter recording which transports are published.

use crate::transport::ports::{Transport, TransportError, TransportExporter, TransportResult};
use async_trait::async_trait;
use std::collections::BTreeSet;
use std::io;
use std::sync::{Arc, RwLock};

/// Exporter that keeps the published type names in memory.
///
/// Types listed with [`Self::fail_for`] are rejected on export and on
/// unexport.
#[derive(Debug, Default, Clone)]
pub struct InMemoryTransportExporter {
    state: Arc<RwLock<ExporterState>>,
}

#[derive(Debug, Default)]
struct ExporterState {
    exported: BTreeSet<String>,
    failing: BTreeSet<String>,
}

impl InMemoryTransportExporter {
    /// Creates an exporter with nothing published.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Makes every later export and unexport of `type_name` fail.
    ///
    /// # Errors
    ///
    /// Returns [`TransportError::Registry`] when exporter state is
    /// unavailable.
    pub fn fail_for(&self, type_name: impl Into<String>) -> TransportResult<()> {
        self.write()?.failing.insert(type_name.into());
        Ok(())
    }

    /// Returns the published type names, sorted.
    ///
    /// # Errors
    ///
    /// Returns [`TransportError::Registry`] when exporter state is
    /// unavailable.
    pub fn exported(&self) -> TransportResult<Vec<String>> {
        Ok(self.read()?.exported.iter().cloned().collect())
    }

    fn read(&self) -> TransportResult<std::sync::RwLockReadGuard<'_, ExporterState>> {
        self.state
            .read()
            .map_err(|err| TransportError::Registry(err.to_string()))
    }

    fn write(&self) -> TransportResult<std::sync::RwLockWriteGuard<'_, ExporterState>> {
        self.state
            .write()
            .map_err(|err| TransportError::Registry(err.to_string()))
    }
}

#[async_trait]
impl TransportExporter for InMemoryTransportExporter {
    async fn export(&self, transport: Arc<dyn Transport>) -> TransportResult<()> {
        let type_name = transport.descriptor().type_name().to_owned();
        let mut state = self.write()?;
        if state.failing.contains(&type_name) {
            return Err(TransportError::remote(
                type_name,
                io::Error::other("export rejected"),
            ));
        }
        state.exported.insert(type_name);
        Ok(())
    }

    async fn unexport(&self, type_name: &str) -> TransportResult<()> {
        let mut state = self.write()?;
        if state.failing.contains(type_name) {
            return Err(TransportError::remote(
                type_name.to_owned(),
                io::Error::other("unexport rejected"),
            ));
        }
        state.exported.remove(type_name);
        Ok(())
    }
}
