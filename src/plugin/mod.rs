//! Plugin discovery and instantiation for interceptors and transports.
//!
//! Implementations are never scanned for reflectively. Each one is entered
//! into a [`PluginTable`] under the plugin unit that ships it and the type
//! name descriptors refer to it by. A [`PluginCatalog`] scan of a plugin
//! directory yields the units that are deployed; the [`PluginLoader`] checks
//! those units against the table under the capability's
//! [`DiscoveryPolicy`] and then instantiates implementations by type name.
//!
//! Loading foreign code from the scanned artifacts stays outside this module.

mod catalog;
mod domain;
mod loader;
mod table;

pub use catalog::{ACCEPTED_EXTENSIONS, PluginCatalog, PluginUnit};
pub use domain::{Capability, DiscoveryPolicy, PluginError, PluginFactory, PluginResult};
pub use loader::PluginLoader;
pub use table::{PluginRegistration, PluginTable};
