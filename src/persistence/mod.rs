//! Persistence boundary consumed by the engine core.
//!
//! The core never maps entities itself. It sees stored objects through the
//! [`Storable`] contract, resolves the manager for an entity type through
//! [`ObjectManagers`], and reads project configuration through
//! [`ProjectSettings`].

mod object_manager;
mod settings;

pub use object_manager::{InMemoryObjectManager, ObjectManager, ObjectManagers};
pub use settings::{InMemoryProjectSettings, LEGACY_CONDITIONS_SETTING, ProjectSettings};

use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;
use thiserror::Error;

/// Numeric identifier issued by the identifier pool.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ObjectId(u64);

impl ObjectId {
    /// Wraps a raw identifier.
    #[must_use]
    pub const fn new(value: u64) -> Self {
        Self(value)
    }

    /// Returns the raw identifier.
    #[must_use]
    pub const fn value(self) -> u64 {
        self.0
    }
}

impl fmt::Display for ObjectId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Contract every persisted engine object fulfils.
pub trait Storable: Clone + Send + Sync + 'static {
    /// Returns the object's identifier.
    fn object_id(&self) -> ObjectId;

    /// Returns the identifier of the owning object, if any.
    fn parent_id(&self) -> Option<ObjectId>;

    /// Returns identifiers of other objects this one refers to.
    fn references(&self) -> Vec<ObjectId> {
        Vec::new()
    }
}

/// Result type for persistence boundary operations.
pub type PersistenceResult<T> = Result<T, PersistenceError>;

/// Errors returned across the persistence boundary.
#[derive(Debug, Clone, Error)]
pub enum PersistenceError {
    /// The object does not exist.
    #[error("object {0} not found")]
    NotFound(ObjectId),

    /// The object is still referenced and cannot be removed.
    #[error("object {id} is still used by {usages} object(s)")]
    InUse {
        /// Object that was about to be removed.
        id: ObjectId,
        /// Number of referencing objects.
        usages: usize,
    },

    /// Backing store failure.
    #[error("persistence error: {0}")]
    Backend(Arc<dyn std::error::Error + Send + Sync>),
}

impl PersistenceError {
    /// Wraps a backing-store failure.
    pub fn backend(err: impl std::error::Error + Send + Sync + 'static) -> Self {
        Self::Backend(Arc::new(err))
    }
}
