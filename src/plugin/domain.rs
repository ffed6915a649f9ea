//! Capability contract and plugin errors.

use camino::Utf8PathBuf;
use std::sync::Arc;
use thiserror::Error;

/// How many implementations one plugin unit may contribute.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DiscoveryPolicy {
    /// Every unit ships exactly one implementation.
    ExactlyOnePerUnit,
    /// Units may ship any number of implementations.
    Unrestricted,
}

/// A pluggable extension point.
pub trait Capability: Send + Sync + 'static {
    /// Descriptor handed to the implementation's constructor.
    type Descriptor: Send + Sync + 'static;
    /// Trait object the implementation is used through.
    type Instance: ?Sized + Send + Sync + 'static;
    /// Name used in logs and errors.
    const NAME: &'static str;
    /// Validation applied when units are loaded.
    const POLICY: DiscoveryPolicy;
}

/// Constructor taking the owning descriptor.
pub type PluginFactory<C> = Arc<
    dyn Fn(&<C as Capability>::Descriptor) -> PluginResult<Arc<<C as Capability>::Instance>>
        + Send
        + Sync,
>;

/// Errors raised while registering, loading or instantiating plugins.
#[derive(Debug, Clone, Error)]
pub enum PluginError {
    /// Two registrations claim the same type name.
    #[error("{capability} type '{type_name}' is registered more than once")]
    DuplicateType {
        /// Capability name.
        capability: &'static str,
        /// Conflicting type name.
        type_name: String,
    },

    /// A deployed unit has no registered implementation.
    #[error("{capability} unit '{unit}' provides no implementation")]
    NoImplementation {
        /// Capability name.
        capability: &'static str,
        /// Unit grouping key.
        unit: String,
    },

    /// A unit that must contribute one implementation contributes several.
    #[error("{capability} unit '{unit}' provides several implementations: {}", .types.join(", "))]
    AmbiguousImplementation {
        /// Capability name.
        capability: &'static str,
        /// Unit grouping key.
        unit: String,
        /// Type names registered for the unit.
        types: Vec<String>,
    },

    /// No loaded unit provides the requested type.
    #[error("{capability} type '{type_name}' is not loaded")]
    NotLoaded {
        /// Capability name.
        capability: &'static str,
        /// Requested type name.
        type_name: String,
    },

    /// The implementation rejected its descriptor.
    #[error("failed to instantiate '{type_name}': {reason}")]
    Instantiation {
        /// Type name being constructed.
        type_name: String,
        /// Failure reason.
        reason: String,
    },

    /// The plugin directory could not be read.
    #[error("failed to scan plugin directory {path}: {source}")]
    Scan {
        /// Directory or entry being read.
        path: Utf8PathBuf,
        /// Underlying I/O failure.
        source: Arc<std::io::Error>,
    },

    /// Loader state lock was poisoned.
    #[error("plugin loader state unavailable: {0}")]
    Lock(String),
}

impl PluginError {
    /// Wraps a factory failure for `type_name`.
    pub fn instantiation(type_name: impl Into<String>, reason: impl std::fmt::Display) -> Self {
        Self::Instantiation {
            type_name: type_name.into(),
            reason: reason.to_string(),
        }
    }

    pub(super) fn scan(path: impl Into<Utf8PathBuf>, err: std::io::Error) -> Self {
        Self::Scan {
            path: path.into(),
            source: Arc::new(err),
        }
    }
}

/// Result type for plugin operations.
pub type PluginResult<T> = Result<T, PluginError>;
