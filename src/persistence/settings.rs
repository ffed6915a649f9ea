//! Per-project key/value settings lookup.

use super::{PersistenceError, PersistenceResult};
use crate::context::ProjectId;
use std::collections::HashMap;
use std::sync::RwLock;

/// Setting that restores legacy evaluation of value conditions on missing keys.
pub const LEGACY_CONDITIONS_SETTING: &str = "conditions.legacy";

/// Read-only project configuration lookup.
pub trait ProjectSettings: Send + Sync {
    /// Returns the raw value of `key` for the project.
    fn get(&self, project_id: ProjectId, key: &str) -> Option<String>;

    /// Returns a boolean setting, defaulting to `false` when the key is
    /// absent or not a boolean.
    fn get_bool(&self, project_id: ProjectId, key: &str) -> bool {
        self.get(project_id, key)
            .is_some_and(|value| value.trim().eq_ignore_ascii_case("true"))
    }
}

/// In-memory settings store.
#[derive(Debug, Default)]
pub struct InMemoryProjectSettings {
    values: RwLock<HashMap<(ProjectId, String), String>>,
}

impl InMemoryProjectSettings {
    /// Creates an empty settings store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets a project setting.
    ///
    /// # Errors
    ///
    /// Returns [`PersistenceError::Backend`] when the store lock is poisoned.
    pub fn set(
        &self,
        project_id: ProjectId,
        key: impl Into<String>,
        value: impl Into<String>,
    ) -> PersistenceResult<()> {
        let mut values = self.values.write().map_err(|err| {
            PersistenceError::backend(std::io::Error::other(err.to_string()))
        })?;
        values.insert((project_id, key.into()), value.into());
        Ok(())
    }
}

impl ProjectSettings for InMemoryProjectSettings {
    fn get(&self, project_id: ProjectId, key: &str) -> Option<String> {
        let values = self.values.read().ok()?;
        values.get(&(project_id, key.to_owned())).cloned()
    }
}
