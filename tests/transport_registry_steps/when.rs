//! When steps for transport registry BDD scenarios.

use super::world::{RegistryWorld, run_async};
use rstest_bdd_macros::when;

#[when("the transports are registered")]
fn transports_are_registered(world: &mut RegistryWorld) {
    world.register_pending();
}

#[when(r#"the transport "{type_name}" is unregistered"#)]
fn transport_is_unregistered(world: &mut RegistryWorld, type_name: String) {
    world.last_unregister = Some(run_async(world.registry.unregister(&type_name)));
}
