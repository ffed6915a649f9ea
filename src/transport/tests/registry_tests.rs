//! Transport registry lifecycle tests.

use super::{RecordingSink, descriptor};
use crate::message::Message;
use crate::plugin::{PluginLoader, PluginTable};
use crate::transport::adapters::{InMemoryTransportExporter, LoopbackTransport};
use crate::transport::domain::{Mep, TransportDescriptor, TransportState};
use crate::transport::ports::{Transport, TransportCapability, TransportError};
use crate::transport::services::TransportRegistry;
use rstest::{fixture, rstest};
use std::sync::Arc;

struct Harness {
    exporter: Arc<InMemoryTransportExporter>,
    registry: TransportRegistry<InMemoryTransportExporter>,
}

#[fixture]
fn harness() -> Harness {
    let exporter = Arc::new(InMemoryTransportExporter::new());
    let registry = TransportRegistry::new(Arc::clone(&exporter));
    Harness { exporter, registry }
}

fn loopback(type_name: &str) -> Arc<dyn Transport> {
    Arc::new(LoopbackTransport::new(descriptor(
        type_name,
        Mep::OutboundRequestSync,
    )))
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn register_exports_and_marks_registered(harness: Harness) {
    harness
        .registry
        .register(loopback("rest"))
        .await
        .expect("registration succeeds");

    assert_eq!(
        harness.registry.get_state("rest").expect("state"),
        TransportState::Registered
    );
    assert_eq!(
        harness.exporter.exported().expect("exported"),
        vec!["rest".to_owned()]
    );
    assert_eq!(
        harness
            .registry
            .registered_types()
            .expect("types")
            .get("rest")
            .map(String::as_str),
        Some("REST")
    );
    let found = harness.registry.find("rest").expect("transport is found");
    assert_eq!(found.descriptor().type_name(), "rest");
}

#[rstest]
fn unknown_type_reports_not_ready(harness: Harness) {
    assert_eq!(
        harness.registry.get_state("missing").expect("state"),
        TransportState::NotReady
    );
    assert!(harness.registry.get_states().expect("states").is_empty());
    assert!(matches!(
        harness.registry.find("missing"),
        Err(TransportError::NotDeployed(name)) if name == "missing"
    ));
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn failed_export_leaves_type_not_ready(harness: Harness) {
    harness.exporter.fail_for("soap").expect("script failure");

    let result = harness.registry.register(loopback("soap")).await;

    assert!(matches!(result, Err(TransportError::Remote { .. })));
    assert_eq!(
        harness.registry.get_state("soap").expect("state"),
        TransportState::NotReady
    );
    assert!(harness.registry.find("soap").is_err());
    assert!(harness.registry.registered_types().expect("types").is_empty());
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn register_all_skips_failures(harness: Harness) {
    harness.exporter.fail_for("jms").expect("script failure");

    let registered = harness
        .registry
        .register_all(vec![loopback("rest"), loopback("jms"), loopback("kafka")])
        .await;

    assert_eq!(registered, vec!["rest".to_owned(), "kafka".to_owned()]);
    let states = harness.registry.get_states().expect("states");
    assert_eq!(states.get("jms"), Some(&TransportState::NotReady));
    assert_eq!(states.get("kafka"), Some(&TransportState::Registered));
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn unregister_removes_mapping_and_undeploys(harness: Harness) {
    harness
        .registry
        .register(loopback("rest"))
        .await
        .expect("registration succeeds");

    harness
        .registry
        .unregister("rest")
        .await
        .expect("unregistration succeeds");

    assert_eq!(
        harness.registry.get_state("rest").expect("state"),
        TransportState::Undeployed
    );
    assert!(harness.registry.find("rest").is_err());
    assert!(harness.exporter.exported().expect("exported").is_empty());

    harness
        .registry
        .register(loopback("rest"))
        .await
        .expect("undeployed types can be registered again");
    assert_eq!(
        harness.registry.get_state("rest").expect("state"),
        TransportState::Registered
    );
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn failed_unexport_keeps_the_transport_registered(harness: Harness) {
    harness
        .registry
        .register(loopback("rest"))
        .await
        .expect("registration succeeds");
    harness.exporter.fail_for("rest").expect("script failure");

    let result = harness.registry.unregister("rest").await;

    assert!(matches!(result, Err(TransportError::Remote { .. })));
    assert_eq!(
        harness.registry.get_state("rest").expect("state"),
        TransportState::Registered
    );
    assert!(harness.registry.find("rest").is_ok());
    assert!(harness.registry.registered_types().expect("types").contains_key("rest"));
    assert_eq!(
        harness.exporter.exported().expect("exported"),
        vec!["rest".to_owned()]
    );
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn unregister_unknown_type_is_not_deployed(harness: Harness) {
    let result = harness.registry.unregister("ghost").await;
    assert!(matches!(result, Err(TransportError::NotDeployed(_))));
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn produce_event_requires_a_sink(harness: Harness) {
    let result = harness
        .registry
        .produce_event("rest", "session-1", Message::new("late"))
        .await;
    assert!(matches!(result, Err(TransportError::NoEventSink)));
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn produce_event_relays_to_the_installed_sink(harness: Harness) {
    let sink = Arc::new(RecordingSink::default());
    harness
        .registry
        .set_event_sink(Arc::clone(&sink) as _)
        .expect("sink installed");

    harness
        .registry
        .produce_event("rest", "session-1", Message::new("reply"))
        .await
        .expect("event relayed");

    assert_eq!(
        sink.events(),
        vec![(
            "rest".to_owned(),
            "session-1".to_owned(),
            Message::new("reply")
        )]
    );
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn plugins_are_instantiated_before_registration(harness: Harness) {
    let mut table = PluginTable::<TransportCapability>::new();
    table
        .register(
            "transports",
            "rest",
            Arc::new(|descriptor: &TransportDescriptor| {
                Ok(Arc::new(LoopbackTransport::new(descriptor.clone())) as Arc<dyn Transport>)
            }),
        )
        .expect("registration");
    let loader = PluginLoader::new(table);
    loader.load_registered().expect("load");

    let registered = harness
        .registry
        .register_from_plugins(
            &loader,
            &[
                descriptor("rest", Mep::OutboundRequestSync),
                descriptor("ftp", Mep::OutboundRequestAsync),
            ],
        )
        .await;

    assert_eq!(registered, vec!["rest".to_owned()]);
    assert_eq!(
        harness.registry.get_state("ftp").expect("state"),
        TransportState::NotReady
    );
}
