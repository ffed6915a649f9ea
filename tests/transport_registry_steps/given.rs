//! Given steps for transport registry BDD scenarios.

use super::world::{RegistryWorld, sync_transport};
use eyre::WrapErr;
use rstest_bdd_macros::given;

#[given(r#"a synchronous transport of type "{type_name}""#)]
fn a_synchronous_transport(
    world: &mut RegistryWorld,
    type_name: String,
) -> Result<(), eyre::Report> {
    world.pending.push(sync_transport(&type_name)?);
    Ok(())
}

#[given(r#"the exporter rejects "{type_name}""#)]
fn exporter_rejects(world: &mut RegistryWorld, type_name: String) -> Result<(), eyre::Report> {
    world
        .exporter
        .fail_for(type_name)
        .wrap_err("configure failing exporter")?;
    Ok(())
}

#[given("the transports have been registered")]
fn transports_have_been_registered(world: &mut RegistryWorld) {
    world.register_pending();
}
