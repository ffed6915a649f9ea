//! Situation and call-chain iteration tests.

use super::situation_step;
use crate::context::{InstanceContext, ProjectId, ProjectUuid};
use crate::persistence::{ObjectId, Storable};
use crate::step::domain::{CallChain, Step, StepStatus};
use crate::step::services::{CallChainStepIterator, SituationStepIterator};
use rstest::{fixture, rstest};
use uuid::Uuid;

#[fixture]
fn run_context() -> InstanceContext {
    InstanceContext::new()
        .with_project(ProjectId::new(7), ProjectUuid::from_uuid(Uuid::nil()))
        .with_value("customer", "acme")
}

fn names(instances: impl Iterator<Item = crate::step::domain::StepInstance>) -> Vec<String> {
    instances.map(|instance| instance.name().to_owned()).collect()
}

#[rstest]
fn call_chain_skips_gaps_disabled_and_unresolved_steps(run_context: InstanceContext) {
    let chain = CallChain::new(ObjectId::new(1), "checkout")
        .with_gap()
        .with_step(situation_step(10, "disabled").disabled())
        .with_step(situation_step(11, "valid1"))
        .with_step(Step::situation(ObjectId::new(12), "nullSituation", None))
        .with_step(situation_step(13, "valid2"));

    let yielded = names(CallChainStepIterator::new(&chain, &run_context));

    assert_eq!(yielded, vec!["valid1".to_owned(), "valid2".to_owned()]);
}

#[rstest]
fn embedded_chains_expand_in_place(run_context: InstanceContext) {
    let inner = CallChain::new(ObjectId::new(2), "inner")
        .with_step(situation_step(21, "inner-a"))
        .with_gap()
        .with_step(situation_step(22, "inner-b"));
    let outer = CallChain::new(ObjectId::new(1), "outer")
        .with_step(situation_step(11, "first"))
        .with_step(Step::embedded(ObjectId::new(12), "embed", Some(inner)))
        .with_step(Step::embedded(ObjectId::new(13), "dangling", None))
        .with_step(situation_step(14, "last"));

    let instances: Vec<_> = CallChainStepIterator::new(&outer, &run_context).collect();

    let yielded: Vec<&str> = instances.iter().map(|instance| instance.name()).collect();
    assert_eq!(yielded, vec!["first", "inner-a", "inner-b", "last"]);
    let parents: Vec<Option<u64>> = instances
        .iter()
        .map(|instance| instance.parent_id().map(ObjectId::value))
        .collect();
    assert_eq!(parents, vec![Some(1), Some(2), Some(2), Some(1)]);
    assert_eq!(
        outer.references(),
        vec![
            ObjectId::new(1011),
            ObjectId::new(2),
            ObjectId::new(1014)
        ]
    );
}

#[rstest]
fn re_entrant_chains_are_skipped(run_context: InstanceContext) {
    let copy_of_outer = CallChain::new(ObjectId::new(1), "outer")
        .with_step(situation_step(31, "never"));
    let outer = CallChain::new(ObjectId::new(1), "outer")
        .with_step(situation_step(11, "only"))
        .with_step(Step::embedded(ObjectId::new(12), "self", Some(copy_of_outer)));

    let yielded = names(CallChainStepIterator::new(&outer, &run_context));

    assert_eq!(yielded, vec!["only".to_owned()]);
}

#[rstest]
fn instances_copy_the_parent_context(run_context: InstanceContext) {
    let chain = CallChain::new(ObjectId::new(1), "chain").with_step(situation_step(11, "one"));

    let instance = CallChainStepIterator::new(&chain, &run_context)
        .next()
        .expect("one runnable step");

    assert_eq!(instance.step_id(), ObjectId::new(11));
    assert_eq!(instance.status(), StepStatus::NotStarted);
    let context = instance.context();
    assert_eq!(context.get_string("customer").as_deref(), Some("acme"));
    assert_eq!(context.project_id(), Some(ProjectId::new(7)));
    assert_eq!(context.project_uuid(), run_context.project_uuid());
    assert_eq!(
        context.sub_context().map(|sub| sub.parent_id()),
        Some(run_context.id())
    );
    assert_ne!(context.id(), run_context.id());
}

#[rstest]
fn has_next_does_not_consume(run_context: InstanceContext) {
    let chain = CallChain::new(ObjectId::new(1), "chain")
        .with_gap()
        .with_step(situation_step(11, "one"));
    let mut steps = CallChainStepIterator::new(&chain, &run_context);

    assert!(steps.has_next());
    assert!(steps.has_next());
    assert_eq!(steps.next().map(|instance| instance.step_id()), Some(ObjectId::new(11)));
    assert!(!steps.has_next());
    assert!(steps.next().is_none());
}

#[rstest]
fn situation_iterator_keeps_embedded_chains_whole(run_context: InstanceContext) {
    let inner = CallChain::new(ObjectId::new(2), "inner").with_step(situation_step(21, "inner-a"));
    let steps = vec![
        None,
        Some(situation_step(11, "first")),
        Some(Step::embedded(ObjectId::new(12), "embed", Some(inner))),
        Some(situation_step(13, "off").disabled()),
    ];

    let mut iterator = SituationStepIterator::new(ObjectId::new(5), &steps, &run_context);
    assert!(iterator.has_next());
    let yielded = names(iterator);

    assert_eq!(yielded, vec!["first".to_owned(), "embed".to_owned()]);
}
