//! Interceptor pipeline with per-interceptor instance caching.

use super::domain::InterceptorDescriptor;
use super::ports::{Interceptor, InterceptorCapability, InterceptorError, InterceptorResult};
use crate::message::Message;
use crate::persistence::ObjectId;
use crate::plugin::PluginLoader;
use std::collections::HashMap;
use std::sync::{Arc, RwLock};
use tracing::{debug, error};

/// Applies interceptor chains to messages.
pub struct InterceptorPipeline {
    loader: Arc<PluginLoader<InterceptorCapability>>,
    instances: RwLock<HashMap<ObjectId, Arc<dyn Interceptor>>>,
}

impl InterceptorPipeline {
    /// Creates a pipeline instantiating implementations through `loader`.
    #[must_use]
    pub fn new(loader: Arc<PluginLoader<InterceptorCapability>>) -> Self {
        Self {
            loader,
            instances: RwLock::new(HashMap::new()),
        }
    }

    /// Feeds `message` through every active, applicable interceptor in
    /// ascending order and returns the final message.
    ///
    /// # Errors
    ///
    /// Returns the first loading, construction or transform failure; the
    /// remaining interceptors are not run.
    pub async fn apply(
        &self,
        interceptors: &[InterceptorDescriptor],
        message: Message,
        environment_id: Option<&str>,
        system_id: Option<&str>,
    ) -> InterceptorResult<Message> {
        let mut ordered: Vec<&InterceptorDescriptor> = interceptors.iter().collect();
        ordered.sort_by_key(|descriptor| descriptor.order());

        let mut working = message;
        for descriptor in ordered {
            if !descriptor.is_active() || !descriptor.is_applicable(environment_id, system_id) {
                debug!(interceptor = descriptor.name(), "interceptor skipped");
                continue;
            }
            let instance = self.instance(descriptor)?;
            working = instance.apply(working).await.inspect_err(|err| {
                error!(interceptor = descriptor.name(), error = %err, "interceptor failed");
            })?;
        }
        Ok(working)
    }

    /// Drops the cached instance of one interceptor.
    ///
    /// # Errors
    ///
    /// Returns [`InterceptorError::Cache`] when the cache is unavailable.
    pub fn evict(&self, id: ObjectId) -> InterceptorResult<()> {
        self.write_cache()?.remove(&id);
        Ok(())
    }

    /// Drops every cached instance.
    ///
    /// # Errors
    ///
    /// Returns [`InterceptorError::Cache`] when the cache is unavailable.
    pub fn clear_cache(&self) -> InterceptorResult<()> {
        self.write_cache()?.clear();
        Ok(())
    }

    fn instance(
        &self,
        descriptor: &InterceptorDescriptor,
    ) -> InterceptorResult<Arc<dyn Interceptor>> {
        let cached = self
            .instances
            .read()
            .map_err(|err| InterceptorError::Cache(err.to_string()))?
            .get(&descriptor.id())
            .cloned();
        if let Some(instance) = cached {
            return Ok(instance);
        }

        let created = self.loader.instantiate(descriptor.type_name(), descriptor)?;
        self.write_cache()?.insert(descriptor.id(), Arc::clone(&created));
        Ok(created)
    }

    fn write_cache(
        &self,
    ) -> InterceptorResult<std::sync::RwLockWriteGuard<'_, HashMap<ObjectId, Arc<dyn Interceptor>>>>
    {
        self.instances
            .write()
            .map_err(|err| InterceptorError::Cache(err.to_string()))
    }
}
