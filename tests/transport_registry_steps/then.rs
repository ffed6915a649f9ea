//! Then steps for transport registry BDD scenarios.

use super::world::RegistryWorld;
use mockingbird::transport::domain::TransportState;
use mockingbird::transport::ports::TransportError;
use rstest_bdd_macros::then;

#[then(r#"the transport "{type_name}" is in state "{state}""#)]
fn transport_in_state(
    world: &mut RegistryWorld,
    type_name: String,
    state: String,
) -> Result<(), eyre::Report> {
    let expected = TransportState::try_from(state.as_str())?;
    let actual = world.registry.get_state(&type_name)?;
    if actual != expected {
        return Err(eyre::eyre!(
            "expected '{type_name}' to be {expected}, found {actual}"
        ));
    }
    Ok(())
}

#[then(r#"the transport "{type_name}" can be found"#)]
fn transport_can_be_found(
    world: &mut RegistryWorld,
    type_name: String,
) -> Result<(), eyre::Report> {
    let transport = world.registry.find(&type_name)?;
    eyre::ensure!(
        transport.descriptor().type_name() == type_name,
        "found the wrong transport"
    );
    Ok(())
}

#[then("{count:usize} transport is registered")]
fn transports_registered(world: &mut RegistryWorld, count: usize) -> Result<(), eyre::Report> {
    if world.registered.len() != count {
        return Err(eyre::eyre!(
            "expected {count} registered transports, found {:?}",
            world.registered
        ));
    }
    Ok(())
}

#[then(r#"finding "{type_name}" fails as not deployed"#)]
fn finding_fails(world: &mut RegistryWorld, type_name: String) -> Result<(), eyre::Report> {
    let unregistered = world
        .last_unregister
        .take()
        .ok_or_else(|| eyre::eyre!("missing unregister result in scenario world"))?;
    unregistered?;
    match world.registry.find(&type_name) {
        Err(TransportError::NotDeployed(name)) if name == type_name => Ok(()),
        Err(other) => Err(eyre::eyre!("unexpected error: {other}")),
        Ok(_) => Err(eyre::eyre!("expected '{type_name}' to be gone")),
    }
}

#[then("the unregistration is rejected")]
fn unregistration_rejected(world: &mut RegistryWorld) -> Result<(), eyre::Report> {
    match world.last_unregister.take() {
        Some(Err(TransportError::Remote { .. })) => Ok(()),
        Some(Err(other)) => Err(eyre::eyre!("unexpected error: {other}")),
        Some(Ok(())) => Err(eyre::eyre!("expected the unexport to fail")),
        None => Err(eyre::eyre!("missing unregister result in scenario world")),
    }
}
