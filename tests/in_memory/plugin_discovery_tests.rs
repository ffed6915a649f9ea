//! Scanning plugin directories and loading what they deploy.

use crate::in_memory::helpers::interceptor_table;
use camino::{Utf8Path, Utf8PathBuf};
use eyre::{OptionExt, ensure};
use mockingbird::interceptor::InterceptorCapability;
use mockingbird::plugin::{PluginCatalog, PluginError, PluginFactory, PluginLoader, PluginTable};
use mockingbird::transport::adapters::{InMemoryTransportExporter, LoopbackTransport};
use mockingbird::transport::domain::{Mep, TransportDescriptor, TransportState};
use mockingbird::transport::ports::{Transport, TransportCapability};
use mockingbird::transport::services::TransportRegistry;
use rstest::{fixture, rstest};
use std::fs;
use std::sync::Arc;
use tempfile::TempDir;

struct PluginRoot {
    _temp: TempDir,
    path: Utf8PathBuf,
}

impl PluginRoot {
    fn deploy(&self, relative: &str) -> eyre::Result<()> {
        let target = self.path.join(relative);
        if let Some(parent) = target.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(target, relative.as_bytes())?;
        Ok(())
    }

    fn lib(&self) -> Utf8PathBuf {
        self.path.join("lib")
    }
}

#[fixture]
fn plugin_root() -> PluginRoot {
    let temp = tempfile::tempdir().expect("temp dir");
    let path = Utf8PathBuf::from_path_buf(temp.path().to_path_buf()).expect("utf-8 temp path");
    PluginRoot { _temp: temp, path }
}

fn transport_loader() -> eyre::Result<PluginLoader<TransportCapability>> {
    let factory: PluginFactory<TransportCapability> =
        Arc::new(|descriptor: &TransportDescriptor| {
            Ok(Arc::new(LoopbackTransport::new(descriptor.clone())) as Arc<dyn Transport>)
        });
    let mut table = PluginTable::new();
    table.register("rest-transport", "rest", Arc::clone(&factory))?;
    table.register("rest-transport", "rest-secure", factory)?;
    Ok(PluginLoader::new(table))
}

fn descriptor(type_name: &str) -> eyre::Result<TransportDescriptor> {
    Ok(TransportDescriptor::new(
        type_name,
        type_name.to_uppercase(),
        Mep::OutboundRequestSync,
    )?)
}

#[rstest]
fn deployed_interceptor_unit_loads(plugin_root: PluginRoot) -> eyre::Result<()> {
    plugin_root.deploy("uppercase/uppercase-1.0.jar")?;
    plugin_root.deploy("uppercase/deps/runtime.zip")?;
    plugin_root.deploy("lib/common.so")?;
    plugin_root.deploy("notes.txt")?;

    let lib = plugin_root.lib();
    let units = PluginCatalog::scan(&plugin_root.path, Some(&lib))?;
    let loader = PluginLoader::new(interceptor_table());
    let recorded = loader.load(&units)?;

    ensure!(units.len() == 1, "expected one unit, found {}", units.len());
    let unit = units.first().ok_or_eyre("uppercase unit")?;
    ensure!(unit.key() == "uppercase");
    ensure!(unit.artifacts().len() == 2);
    ensure!(unit.lib_dir() == Some(lib.as_path()));
    ensure!(recorded == ["uppercase"]);
    Ok(())
}

#[rstest]
fn unit_without_implementation_fails_the_pass(plugin_root: PluginRoot) -> eyre::Result<()> {
    plugin_root.deploy("uppercase/uppercase-1.0.jar")?;
    plugin_root.deploy("ghost-2.0.jar")?;

    let units = PluginCatalog::scan(&plugin_root.path, None)?;
    let loader: PluginLoader<InterceptorCapability> = PluginLoader::new(interceptor_table());
    let result = loader.load(&units);

    ensure!(
        matches!(result, Err(PluginError::NoImplementation { ref unit, .. }) if unit == "ghost"),
        "expected ghost to be rejected, got {result:?}"
    );
    ensure!(!loader.is_loaded("uppercase")?, "failed pass must not record types");
    Ok(())
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn scanned_transport_unit_registers_every_type(plugin_root: PluginRoot) -> eyre::Result<()> {
    plugin_root.deploy("rest-transport-2.1.0.so")?;
    plugin_root.deploy("rest-transport-2.2.0.jar")?;
    plugin_root.deploy("empty-bundle/readme.zip")?;

    let units = PluginCatalog::scan(&plugin_root.path, None)?;
    let loader = transport_loader()?;
    loader.load(&units)?;
    let registry = TransportRegistry::new(Arc::new(InMemoryTransportExporter::new()));

    let registered = registry
        .register_from_plugins(
            &loader,
            &[descriptor("rest")?, descriptor("rest-secure")?, descriptor("ftp")?],
        )
        .await;

    ensure!(registered == ["rest", "rest-secure"], "registered {registered:?}");
    ensure!(registry.get_state("rest")? == TransportState::Registered);
    ensure!(registry.get_state("ftp")? == TransportState::NotReady);
    Ok(())
}

#[rstest]
fn lib_dir_outside_root_is_not_excluded(plugin_root: PluginRoot) -> eyre::Result<()> {
    plugin_root.deploy("lib/common.so")?;

    let elsewhere = Utf8Path::new("/opt/mockingbird/lib");
    let units = PluginCatalog::scan(&plugin_root.path, Some(elsewhere))?;

    ensure!(units.iter().any(|unit| unit.key() == "lib"));
    Ok(())
}
