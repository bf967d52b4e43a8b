// tests/registry_tests.rs

mod common;

use carpluto_flow::{Flow, FlowData, FlowOutcome, FlowRegistry, StepDef};
use common::*;
use serial_test::serial;

#[derive(Debug, Default)]
struct UnregisteredContext;

fn single_step(name: &str, label: &'static str) -> Flow<ReservationContext, TestError> {
  let mut flow = Flow::new(name, vec![StepDef::required("only")]);
  flow.on("only", mark(label)).unwrap();
  flow
}

#[tokio::test]
#[serial]
async fn registry_dispatches_by_context_type() {
  setup_tracing();
  let registry: FlowRegistry<TestError> = FlowRegistry::new();
  assert!(registry.is_empty());

  registry.register(single_step("reservation", "ran"));
  assert!(registry.contains::<ReservationContext>());
  assert!(!registry.contains::<UnregisteredContext>());
  assert_eq!(registry.len(), 1);

  let data = FlowData::new(ReservationContext::default());
  let outcome = registry.run(data.clone()).await.unwrap();
  assert_eq!(outcome, FlowOutcome::Completed);
  assert_eq!(data.with(|c| c.trail.clone()), vec!["ran"]);
}

#[tokio::test]
#[serial]
async fn running_an_unregistered_context_fails() {
  setup_tracing();
  let registry: FlowRegistry<TestError> = FlowRegistry::default();

  let err = registry.run(FlowData::new(UnregisteredContext)).await.unwrap_err();
  match err {
    TestError::Engine(message) => {
      assert!(message.contains("NotRegistered"), "unexpected: {message}");
      assert!(message.contains("UnregisteredContext"), "unexpected: {message}");
    }
    other => panic!("expected engine error, got {other:?}"),
  }
}

#[tokio::test]
#[serial]
async fn registering_again_replaces_the_flow() {
  setup_tracing();
  let registry: FlowRegistry<TestError> = FlowRegistry::new();
  registry.register(single_step("first", "first"));
  registry.register(single_step("second", "second"));
  assert_eq!(registry.len(), 1);

  let data = FlowData::new(ReservationContext::default());
  registry.run(data.clone()).await.unwrap();
  assert_eq!(data.with(|c| c.trail.clone()), vec!["second"]);
}

#[tokio::test]
#[serial]
async fn registry_is_shareable_across_tasks() {
  setup_tracing();
  let registry = std::sync::Arc::new(FlowRegistry::<TestError>::new());
  registry.register(single_step("reservation", "ran"));

  let mut handles = Vec::new();
  for _ in 0..4 {
    let registry = registry.clone();
    handles.push(tokio::spawn(async move {
      let data = FlowData::new(ReservationContext::default());
      registry.run(data.clone()).await.map(|_| data.with(|c| c.trail.len()))
    }));
  }
  for handle in handles {
    assert_eq!(handle.await.unwrap().unwrap(), 1);
  }
}
