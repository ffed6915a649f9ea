//! Type-indexed object managers.

use super::{ObjectId, PersistenceError, PersistenceResult, Storable};
use async_trait::async_trait;
use std::any::{Any, TypeId};
use std::collections::{BTreeMap, HashMap};
use std::sync::{Arc, RwLock};

/// Storage operations for one entity type.
#[async_trait]
pub trait ObjectManager<T: Storable>: Send + Sync {
    /// Inserts or replaces an object.
    async fn store(&self, object: &T) -> PersistenceResult<()>;

    /// Removes an object.
    ///
    /// # Errors
    ///
    /// Returns [`PersistenceError::NotFound`] when the object is absent and
    /// [`PersistenceError::InUse`] when other objects still reference it.
    async fn remove(&self, id: ObjectId) -> PersistenceResult<()>;

    /// Loads an object by identifier.
    async fn get(&self, id: ObjectId) -> PersistenceResult<Option<T>>;

    /// Returns objects of this type that reference `id`.
    async fn find_usages(&self, id: ObjectId) -> PersistenceResult<Vec<T>>;

    /// Returns the parent identifier of a stored object.
    async fn get_parent_id(&self, id: ObjectId) -> PersistenceResult<Option<ObjectId>> {
        Ok(self.get(id).await?.and_then(|object| object.parent_id()))
    }
}

/// Lookup service resolving the manager registered for an entity type.
#[derive(Default)]
pub struct ObjectManagers {
    managers: RwLock<HashMap<TypeId, Arc<dyn Any + Send + Sync>>>,
}

impl ObjectManagers {
    /// Creates an empty lookup service.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers the manager for entity type `T`, replacing any previous one.
    ///
    /// # Errors
    ///
    /// Returns [`PersistenceError::Backend`] when the registry lock is
    /// poisoned.
    pub fn register<T: Storable>(
        &self,
        manager: Arc<dyn ObjectManager<T>>,
    ) -> PersistenceResult<()> {
        let mut managers = self.managers.write().map_err(|err| {
            PersistenceError::backend(std::io::Error::other(err.to_string()))
        })?;
        managers.insert(TypeId::of::<T>(), Arc::new(manager));
        Ok(())
    }

    /// Returns the manager registered for entity type `T`.
    ///
    /// # Errors
    ///
    /// Returns [`PersistenceError::Backend`] when the registry lock is
    /// poisoned.
    pub fn manager<T: Storable>(&self) -> PersistenceResult<Option<Arc<dyn ObjectManager<T>>>> {
        let managers = self.managers.read().map_err(|err| {
            PersistenceError::backend(std::io::Error::other(err.to_string()))
        })?;
        Ok(managers
            .get(&TypeId::of::<T>())
            .and_then(|entry| entry.downcast_ref::<Arc<dyn ObjectManager<T>>>())
            .cloned())
    }
}

/// Thread-safe in-memory object manager.
#[derive(Debug)]
pub struct InMemoryObjectManager<T> {
    objects: RwLock<BTreeMap<ObjectId, T>>,
}

impl<T> Default for InMemoryObjectManager<T> {
    fn default() -> Self {
        Self {
            objects: RwLock::new(BTreeMap::new()),
        }
    }
}

impl<T> InMemoryObjectManager<T> {
    /// Creates an empty manager.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

fn lock_error(err: impl ToString) -> PersistenceError {
    PersistenceError::backend(std::io::Error::other(err.to_string()))
}

#[async_trait]
impl<T: Storable> ObjectManager<T> for InMemoryObjectManager<T> {
    async fn store(&self, object: &T) -> PersistenceResult<()> {
        let mut objects = self.objects.write().map_err(lock_error)?;
        objects.insert(object.object_id(), object.clone());
        Ok(())
    }

    async fn remove(&self, id: ObjectId) -> PersistenceResult<()> {
        let mut objects = self.objects.write().map_err(lock_error)?;
        let usages = objects
            .values()
            .filter(|object| object.references().contains(&id))
            .count();
        if usages > 0 {
            return Err(PersistenceError::InUse { id, usages });
        }
        objects
            .remove(&id)
            .map(|_| ())
            .ok_or(PersistenceError::NotFound(id))
    }

    async fn get(&self, id: ObjectId) -> PersistenceResult<Option<T>> {
        let objects = self.objects.read().map_err(lock_error)?;
        Ok(objects.get(&id).cloned())
    }

    async fn find_usages(&self, id: ObjectId) -> PersistenceResult<Vec<T>> {
        let objects = self.objects.read().map_err(lock_error)?;
        Ok(objects
            .values()
            .filter(|object| object.references().contains(&id))
            .cloned()
            .collect())
    }
}
