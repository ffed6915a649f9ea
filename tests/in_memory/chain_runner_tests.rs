//! End-to-end call-chain execution over loopback transports.

use super::helpers::{Engine, build_engine};
use mockingbird::condition::{ConditionKind, ConditionParameter};
use mockingbird::context::InstanceContext;
use mockingbird::execution::ExecutionError;
use mockingbird::extraction::{ParsingKind, ParsingRule};
use mockingbird::interceptor::InterceptorDescriptor;
use mockingbird::persistence::{InMemoryObjectManager, ObjectId, ObjectManager};
use mockingbird::step::domain::{CallChain, Situation, Step, StepStatus};
use std::sync::Arc;

fn id(value: u64) -> ObjectId {
    ObjectId::new(value)
}

fn order_lookup() -> Situation {
    Situation::new(id(100), "order lookup", "rest")
        .with_template(r#"{"customer":"{{ customer }}"}"#)
        .with_header("X-Customer", "{{ customer }}")
        .with_parsing_rule(
            ParsingRule::new("order_id", ParsingKind::JsonPath, "$.order.id").autosave(true),
        )
        .with_validation(
            ConditionParameter::new("order_id", ConditionKind::Equals).with_value("42"),
        )
}

fn confirmation() -> Situation {
    Situation::new(id(101), "confirm", "rest").with_template("confirm {{ order_id }}")
}

fn run_context() -> InstanceContext {
    InstanceContext::new().with_value("customer", "acme")
}

#[tokio::test(flavor = "multi_thread")]
async fn sync_steps_pass_and_carry_saved_parameters() {
    let engine: Engine = build_engine().await;
    let chain = CallChain::new(id(1), "checkout")
        .with_step(Step::situation(id(10), "lookup", Some(order_lookup())))
        .with_step(
            Step::situation(id(11), "confirm", Some(confirmation()))
                .with_condition(ConditionParameter::new("order_id", ConditionKind::Exists)),
        );

    let executed = engine
        .runner
        .run(&chain, &run_context())
        .await
        .expect("chain runs");

    let statuses: Vec<StepStatus> = executed.iter().map(|step| step.status()).collect();
    assert_eq!(statuses, vec![StepStatus::Passed, StepStatus::Passed]);
    let lookup = executed.first().expect("lookup step");
    assert_eq!(lookup.context().get_string("order_id").as_deref(), Some("42"));
    assert_eq!(
        lookup
            .outgoing()
            .and_then(|message| message.header("X-Customer"))
            .and_then(|value| value.first()),
        Some("acme")
    );
    let confirm = executed.get(1).expect("confirm step");
    assert_eq!(
        confirm.outgoing().map(|message| message.body()),
        Some("confirm 42")
    );
    assert_eq!(engine.rest.sent().expect("sent").len(), 2);
}

#[tokio::test(flavor = "multi_thread")]
async fn outbound_messages_pass_through_interceptors() {
    let engine = build_engine().await;
    let situation = confirmation()
        .with_interceptor(InterceptorDescriptor::new(id(500), "upper", "uppercase", 0))
        .with_interceptor(
            InterceptorDescriptor::new(id(501), "inactive", "missing-type", 1).with_active(false),
        );
    let chain = CallChain::new(id(1), "chain")
        .with_step(Step::situation(id(10), "confirm", Some(situation)));

    let executed = engine
        .runner
        .run(&chain, &InstanceContext::new().with_value("order_id", "abc"))
        .await
        .expect("chain runs");

    let step = executed.first().expect("one step");
    assert_eq!(step.status(), StepStatus::Passed);
    assert_eq!(step.outgoing().map(|message| message.body()), Some("CONFIRM ABC"));
}

#[tokio::test(flavor = "multi_thread")]
async fn async_replies_are_correlated_through_sessions() {
    let engine = build_engine().await;
    let situation = Situation::new(id(200), "dispatch", "jms")
        .with_template("<dispatch/>")
        .with_parsing_rule(
            ParsingRule::new("ack_id", ParsingKind::Xpath, "/ack/id/text()").autosave(true),
        );
    let chain = CallChain::new(id(2), "dispatch")
        .with_step(Step::situation(id(20), "send", Some(situation)));

    let executed = engine
        .runner
        .run(&chain, &InstanceContext::new())
        .await
        .expect("chain runs");

    let step = executed.first().expect("one step");
    assert_eq!(step.status(), StepStatus::Passed);
    assert_eq!(step.context().get_string("ack_id").as_deref(), Some("7"));
    assert!(engine.sessions.is_empty().expect("sessions"));
    assert!(engine.sessions.locks().is_empty().expect("signals"));
}

#[tokio::test(flavor = "multi_thread")]
async fn missing_async_reply_times_out_and_halts_the_chain() {
    let engine = build_engine().await;
    let chain = CallChain::new(id(3), "quiet")
        .with_step(Step::situation(
            id(30),
            "unanswered",
            Some(Situation::new(id(300), "quiet", "silent")),
        ))
        .with_step(Step::situation(id(31), "never", Some(confirmation())));

    let executed = engine
        .runner
        .run(&chain, &InstanceContext::new())
        .await
        .expect("chain runs");

    assert_eq!(executed.len(), 1);
    let step = executed.first().expect("one step");
    assert_eq!(step.status(), StepStatus::FailedByTimeout);
    assert!(engine.rest.sent().expect("sent").is_empty());
}

#[tokio::test(flavor = "multi_thread")]
async fn failed_validation_is_retried_up_to_the_limit() {
    let engine = build_engine().await;
    let situation = Situation::new(id(100), "strict", "rest")
        .with_template("{}")
        .with_parsing_rule(
            ParsingRule::new("status", ParsingKind::JsonPath, "$.order.status").autosave(true),
        )
        .with_validation(
            ConditionParameter::new("status", ConditionKind::Equals).with_value("REJECTED"),
        );
    let chain = CallChain::new(id(4), "retry").with_step(
        Step::situation(id(40), "strict", Some(situation)).with_max_attempts(3),
    );

    let executed = engine
        .runner
        .run(&chain, &InstanceContext::new())
        .await
        .expect("chain runs");

    let step = executed.first().expect("one step");
    assert_eq!(step.status(), StepStatus::Failed);
    assert_eq!(step.attempt(), 3);
    assert_eq!(engine.rest.sent().expect("sent").len(), 3);
}

#[tokio::test(flavor = "multi_thread")]
async fn unmet_step_conditions_stop_only_that_step() {
    let engine = build_engine().await;
    let chain = CallChain::new(id(5), "gated")
        .with_step(
            Step::situation(id(50), "gated", Some(confirmation()))
                .with_condition(ConditionParameter::new("flag", ConditionKind::Exists)),
        )
        .with_step(Step::situation(id(51), "open", Some(confirmation())));

    let executed = engine
        .runner
        .run(&chain, &InstanceContext::new())
        .await
        .expect("chain runs");

    let statuses: Vec<StepStatus> = executed.iter().map(|step| step.status()).collect();
    assert_eq!(statuses, vec![StepStatus::Stopped, StepStatus::Passed]);
    assert_eq!(engine.rest.sent().expect("sent").len(), 1);
}

#[tokio::test(flavor = "multi_thread")]
async fn undeployed_transports_and_missing_properties_fail_the_step() {
    let engine = build_engine().await;
    engine.registry.unregister("rest").await.expect("undeploy rest");

    let undeployed = CallChain::new(id(6), "gone")
        .with_step(Step::situation(id(60), "gone", Some(confirmation())));
    let misconfigured = CallChain::new(id(7), "soap").with_step(Step::situation(
        id(70),
        "soap",
        Some(Situation::new(id(700), "soap", "soap")),
    ));

    for chain in [undeployed, misconfigured] {
        let executed = engine
            .runner
            .run(&chain, &InstanceContext::new())
            .await
            .expect("chain runs");
        let step = executed.first().expect("one step");
        assert_eq!(step.status(), StepStatus::Failed, "{}", chain.name());
        assert!(step.error().is_some());
    }
}

#[tokio::test(flavor = "multi_thread")]
async fn chains_are_run_by_identifier() {
    let engine = build_engine().await;
    let manager: Arc<dyn ObjectManager<CallChain>> = Arc::new(InMemoryObjectManager::new());
    engine.managers.register(Arc::clone(&manager)).expect("register manager");
    let chain = CallChain::new(id(8), "stored")
        .with_step(Step::situation(id(80), "confirm", Some(confirmation())));
    manager.store(&chain).await.expect("store chain");

    let executed = engine
        .runner
        .run_by_id(id(8), &InstanceContext::new())
        .await
        .expect("stored chain runs");
    assert_eq!(executed.len(), 1);

    let missing = engine.runner.run_by_id(id(9), &InstanceContext::new()).await;
    assert!(matches!(missing, Err(ExecutionError::ChainNotFound(chain_id)) if chain_id == id(9)));
}
