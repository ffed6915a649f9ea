//! Shared fixtures for in-memory engine integration tests.

use async_trait::async_trait;
use mockable::DefaultClock;
use mockingbird::condition::ConditionEvaluator;
use mockingbird::config::{ExtractionConfig, SequenceConfig, SessionConfig};
use mockingbird::context::TemplateEngine;
use mockingbird::execution::{
    ChainRunner, PollingPolicy, RunnerServices, SessionEventSink,
};
use mockingbird::extraction::MessageParameterExtractor;
use mockingbird::interceptor::{
    Interceptor, InterceptorCapability, InterceptorDescriptor, InterceptorPipeline,
    InterceptorResult,
};
use mockingbird::message::Message;
use mockingbird::persistence::{InMemoryProjectSettings, ObjectManagers};
use mockingbird::plugin::{PluginFactory, PluginLoader, PluginTable};
use mockingbird::sequence::adapters::memory::InMemorySequenceSource;
use mockingbird::sequence::domain::IdPrefix;
use mockingbird::sequence::services::{IdGenerator, PrefixGenerator};
use mockingbird::session::SessionHandler;
use mockingbird::transport::adapters::{InMemoryTransportExporter, LoopbackTransport};
use mockingbird::transport::domain::{Mep, PropertyDescriptor, TransportDescriptor};
use mockingbird::transport::ports::Transport;
use mockingbird::transport::services::TransportRegistry;
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinHandle;

/// Runner type used by the integration tests.
pub type TestRunner = ChainRunner<InMemoryTransportExporter, InMemorySequenceSource, DefaultClock>;

/// Reply of the synchronous `rest` transport.
pub const REST_REPLY: &str = r#"{"order":{"id":"42","status":"OK"}}"#;

/// Reply of the asynchronous `jms` transport.
pub const JMS_REPLY: &str = "<ack><id>7</id></ack>";

/// Interceptor upper-casing message bodies.
pub struct Uppercase;

#[async_trait]
impl Interceptor for Uppercase {
    async fn apply(&self, mut message: Message) -> InterceptorResult<Message> {
        let body = message.body().to_uppercase();
        message.set_body(body);
        Ok(message)
    }
}

/// Returns a factory table holding the `uppercase` interceptor in unit
/// `uppercase`.
///
/// # Panics
///
/// Panics if the registration is rejected.
#[must_use]
pub fn interceptor_table() -> PluginTable<InterceptorCapability> {
    let uppercase: PluginFactory<InterceptorCapability> =
        Arc::new(|_: &InterceptorDescriptor| Ok(Arc::new(Uppercase) as Arc<dyn Interceptor>));
    let mut table = PluginTable::new();
    table
        .register("uppercase", "uppercase", uppercase)
        .expect("register uppercase interceptor");
    table
}

/// Fully wired engine over in-memory adapters.
pub struct Engine {
    /// Transport registry with `rest`, `soap`, `jms` and `silent` deployed.
    pub registry: Arc<TransportRegistry<InMemoryTransportExporter>>,
    /// Session correlation.
    pub sessions: Arc<SessionHandler>,
    /// Background eviction of expired sessions.
    pub sweeper: JoinHandle<()>,
    /// Chain lookup.
    pub managers: Arc<ObjectManagers>,
    /// The synchronous loopback transport.
    pub rest: Arc<LoopbackTransport>,
    /// Runner under test.
    pub runner: TestRunner,
}

fn descriptor(type_name: &str, mep: Mep) -> TransportDescriptor {
    TransportDescriptor::new(type_name, type_name.to_uppercase(), mep).expect("valid descriptor")
}

/// Builds a wired engine with a short session wait timeout.
///
/// # Panics
///
/// Panics if any component fails to initialize.
pub async fn build_engine() -> Engine {
    let sessions = Arc::new(SessionHandler::new(SessionConfig {
        wait_timeout_ms: 300,
        ..SessionConfig::default()
    }));
    let sweeper = sessions.spawn_eviction();
    let registry = Arc::new(TransportRegistry::new(Arc::new(
        InMemoryTransportExporter::new(),
    )));
    registry
        .set_event_sink(Arc::new(SessionEventSink::new(Arc::clone(&sessions))))
        .expect("install sink");

    let rest = Arc::new(
        LoopbackTransport::new(descriptor("rest", Mep::OutboundRequestSync))
            .with_reply(Message::new(REST_REPLY)),
    );
    let soap = LoopbackTransport::new(
        descriptor("soap", Mep::OutboundRequestSync)
            .with_property(PropertyDescriptor::new("endpoint", "Endpoint").mandatory()),
    );
    let jms = LoopbackTransport::new(descriptor("jms", Mep::OutboundRequestAsync))
        .with_reply(Message::new(JMS_REPLY));
    jms.connect(Arc::clone(&registry) as _).expect("connect jms");
    let silent = LoopbackTransport::new(descriptor("silent", Mep::OutboundRequestAsync));

    let transports: Vec<Arc<dyn Transport>> = vec![
        Arc::clone(&rest) as _,
        Arc::new(soap),
        Arc::new(jms),
        Arc::new(silent),
    ];
    let registered = registry.register_all(transports).await;
    assert_eq!(registered.len(), 4, "all transports register");

    let templates = Arc::new(TemplateEngine::new());
    let loader = PluginLoader::new(interceptor_table());
    loader.load_registered().expect("load interceptors");
    let managers = Arc::new(ObjectManagers::new());

    let services = RunnerServices {
        registry: Arc::clone(&registry),
        sessions: Arc::clone(&sessions),
        interceptors: Arc::new(InterceptorPipeline::new(Arc::new(loader))),
        extractor: Arc::new(MessageParameterExtractor::new(
            ExtractionConfig::default(),
            Arc::clone(&templates),
        )),
        conditions: Arc::new(ConditionEvaluator::new(
            Arc::new(InMemoryProjectSettings::new()),
            Arc::clone(&templates),
        )),
        templates,
        ids: Arc::new(IdGenerator::new(
            Arc::new(InMemorySequenceSource::new()),
            &SequenceConfig { id_batch_size: 10 },
        )),
        session_prefix: PrefixGenerator::new(IdPrefix::new("SES").expect("valid prefix")),
        managers: Arc::clone(&managers),
    };
    let runner = ChainRunner::new(services, Arc::new(DefaultClock)).with_polling(PollingPolicy {
        interval: Duration::from_millis(10),
        max_interval: Duration::from_millis(50),
        multiplier: 2.0,
    });

    Engine {
        registry,
        sessions,
        sweeper,
        managers,
        rest,
        runner,
    }
}
