//! Explicit registration table of plugin implementations.

use super::domain::{Capability, PluginError, PluginFactory, PluginResult};
use std::fmt;
use std::sync::Arc;

/// One implementation entered into a [`PluginTable`].
pub struct PluginRegistration<C: Capability> {
    unit: String,
    type_name: String,
    factory: PluginFactory<C>,
}

impl<C: Capability> PluginRegistration<C> {
    /// Returns the key of the unit shipping the implementation.
    #[must_use]
    pub fn unit(&self) -> &str {
        &self.unit
    }

    /// Returns the type name descriptors refer to.
    #[must_use]
    pub fn type_name(&self) -> &str {
        &self.type_name
    }

    pub(super) fn factory(&self) -> PluginFactory<C> {
        Arc::clone(&self.factory)
    }
}

impl<C: Capability> Clone for PluginRegistration<C> {
    fn clone(&self) -> Self {
        Self {
            unit: self.unit.clone(),
            type_name: self.type_name.clone(),
            factory: self.factory(),
        }
    }
}

impl<C: Capability> fmt::Debug for PluginRegistration<C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PluginRegistration")
            .field("unit", &self.unit)
            .field("type_name", &self.type_name)
            .finish_non_exhaustive()
    }
}

/// Name-to-factory table for one capability, populated at start-up.
pub struct PluginTable<C: Capability> {
    registrations: Vec<PluginRegistration<C>>,
}

impl<C: Capability> Default for PluginTable<C> {
    fn default() -> Self {
        Self {
            registrations: Vec::new(),
        }
    }
}

impl<C: Capability> fmt::Debug for PluginTable<C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PluginTable")
            .field("capability", &C::NAME)
            .field("registrations", &self.registrations)
            .finish()
    }
}

impl<C: Capability> PluginTable<C> {
    /// Creates an empty table.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers an implementation shipped by `unit` under `type_name`.
    ///
    /// # Errors
    ///
    /// Returns [`PluginError::DuplicateType`] when `type_name` is already
    /// registered.
    pub fn register(
        &mut self,
        unit: impl Into<String>,
        type_name: impl Into<String>,
        factory: PluginFactory<C>,
    ) -> PluginResult<()> {
        let name = type_name.into();
        if self.find(&name).is_some() {
            return Err(PluginError::DuplicateType {
                capability: C::NAME,
                type_name: name,
            });
        }
        self.registrations.push(PluginRegistration {
            unit: unit.into(),
            type_name: name,
            factory,
        });
        Ok(())
    }

    /// Returns the registration for a type name.
    #[must_use]
    pub fn find(&self, type_name: &str) -> Option<&PluginRegistration<C>> {
        self.registrations
            .iter()
            .find(|registration| registration.type_name == type_name)
    }

    /// Returns every registration shipped by `unit`, in registration order.
    #[must_use]
    pub fn for_unit(&self, unit: &str) -> Vec<&PluginRegistration<C>> {
        self.registrations
            .iter()
            .filter(|registration| registration.unit == unit)
            .collect()
    }

    /// Returns the distinct unit keys, in first-registration order.
    #[must_use]
    pub fn unit_keys(&self) -> Vec<String> {
        let mut keys: Vec<String> = Vec::new();
        for registration in &self.registrations {
            if !keys.contains(&registration.unit) {
                keys.push(registration.unit.clone());
            }
        }
        keys
    }

    /// Returns the number of registrations.
    #[must_use]
    pub fn len(&self) -> usize {
        self.registrations.len()
    }

    /// Returns whether nothing is registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.registrations.is_empty()
    }
}
