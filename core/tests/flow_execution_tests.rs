// tests/flow_execution_tests.rs

mod common;

use carpluto_flow::{Flow, FlowData, FlowError, FlowOutcome, StepControl, StepDef};
use common::*;
use serial_test::serial;

fn three_step_flow() -> Flow<ReservationContext, TestError> {
  Flow::new(
    "reservation",
    vec![
      StepDef::required("validate"),
      StepDef::required("reserve"),
      StepDef::required("notify"),
    ],
  )
}

fn trail(data: &FlowData<ReservationContext>) -> Vec<String> {
  data.with(|ctx| ctx.trail.clone())
}

#[tokio::test]
#[serial]
async fn steps_run_in_declaration_order() {
  setup_tracing();
  let mut flow = three_step_flow();
  flow.on("notify", mark("notify")).unwrap();
  flow.on("validate", mark("validate")).unwrap();
  flow.on("reserve", mark("reserve")).unwrap();

  let data = FlowData::new(ReservationContext::default());
  let outcome = flow.run(data.clone()).await.unwrap();

  assert_eq!(outcome, FlowOutcome::Completed);
  assert!(outcome.is_completed());
  assert_eq!(trail(&data), vec!["validate", "reserve", "notify"]);
}

#[tokio::test]
#[serial]
async fn phases_run_before_on_after() {
  setup_tracing();
  let mut flow = three_step_flow();
  flow.on("validate", mark("validate:on")).unwrap();
  flow.after("validate", mark("validate:after")).unwrap();
  flow.before("validate", mark("validate:before")).unwrap();
  flow.before("validate", mark("validate:before2")).unwrap();
  flow.on("reserve", mark("reserve")).unwrap();
  flow.on("notify", mark("notify")).unwrap();

  let data = FlowData::new(ReservationContext::default());
  flow.run(data.clone()).await.unwrap();

  assert_eq!(
    trail(&data),
    vec!["validate:before", "validate:before2", "validate:on", "validate:after", "reserve", "notify"]
  );
}

#[tokio::test]
#[serial]
async fn stop_halts_remaining_handlers_and_steps() {
  setup_tracing();
  let mut flow = three_step_flow();
  flow.on("validate", mark("validate")).unwrap();
  flow.on("reserve", mark("reserve")).unwrap();
  flow.after("reserve", mark("reserve:after")).unwrap();
  flow.on("notify", mark("notify")).unwrap();

  let data = FlowData::new(ReservationContext {
    stop_at: Some("reserve".to_string()),
    ..Default::default()
  });
  let outcome = flow.run(data.clone()).await.unwrap();

  assert_eq!(outcome, FlowOutcome::Stopped);
  assert_eq!(trail(&data), vec!["validate", "reserve"]);
}

#[tokio::test]
#[serial]
async fn handler_error_propagates_and_stops_the_run() {
  setup_tracing();
  let mut flow = three_step_flow();
  flow.on("validate", mark("validate")).unwrap();
  flow.on("reserve", fail("reserve", "slot taken")).unwrap();
  flow.on("notify", mark("notify")).unwrap();

  let data = FlowData::new(ReservationContext::default());
  let err = flow.run(data.clone()).await.unwrap_err();

  assert_eq!(err, TestError::Handler("slot taken".to_string()));
  assert_eq!(trail(&data), vec!["validate", "reserve"]);
}

#[tokio::test]
#[serial]
async fn required_step_without_handler_fails() {
  setup_tracing();
  let mut flow = three_step_flow();
  flow.on("validate", mark("validate")).unwrap();
  flow.on("notify", mark("notify")).unwrap();

  let data = FlowData::new(ReservationContext::default());
  let err = flow.run(data.clone()).await.unwrap_err();

  match err {
    TestError::Engine(message) => {
      assert!(message.contains("HandlerMissing"), "unexpected: {message}");
      assert!(message.contains("reserve"), "unexpected: {message}");
    }
    other => panic!("expected engine error, got {other:?}"),
  }
  assert_eq!(trail(&data), vec!["validate"]);
}

#[tokio::test]
#[serial]
async fn optional_step_without_handler_is_skipped() {
  setup_tracing();
  let mut flow: Flow<ReservationContext, TestError> = Flow::new(
    "reservation",
    vec![StepDef::required("reserve"), StepDef::optional("send_receipt")],
  );
  flow.on("reserve", mark("reserve")).unwrap();

  let data = FlowData::new(ReservationContext::default());
  let outcome = flow.run(data.clone()).await.unwrap();

  assert_eq!(outcome, FlowOutcome::Completed);
  assert_eq!(trail(&data), vec!["reserve"]);
}

#[tokio::test]
#[serial]
async fn skip_conditions_are_evaluated_against_context() {
  setup_tracing();
  let mut flow: Flow<ReservationContext, TestError> = Flow::new(
    "reservation",
    vec![
      StepDef::required("validate"),
      StepDef::required("charge").skip_when(|data: &FlowData<ReservationContext>| data.with(|c| c.amount_kobo == 0)),
      StepDef::required("notify"),
    ],
  );
  flow.on("validate", mark("validate")).unwrap();
  flow.on("charge", mark("charge")).unwrap();
  flow.on("notify", mark("notify")).unwrap();
  flow
    .skip_if("notify", |data: &FlowData<ReservationContext>| data.with(|c| c.amount_kobo > 1_000_000))
    .unwrap();

  let free = FlowData::new(ReservationContext::default());
  flow.run(free.clone()).await.unwrap();
  assert_eq!(trail(&free), vec!["validate", "notify"]);

  let large = FlowData::new(ReservationContext {
    amount_kobo: 5_000_000,
    ..Default::default()
  });
  flow.run(large.clone()).await.unwrap();
  assert_eq!(trail(&large), vec!["validate", "charge"]);
}

#[tokio::test]
#[serial]
async fn insert_after_places_step_in_sequence() {
  setup_tracing();
  let mut flow = three_step_flow();
  flow.insert_after("reserve", StepDef::required("audit")).unwrap();
  assert_eq!(flow.step_names(), vec!["validate", "reserve", "audit", "notify"]);

  flow.on("validate", mark("validate")).unwrap();
  flow.on("reserve", mark("reserve")).unwrap();
  flow.on("audit", mark("audit")).unwrap();
  flow.on("notify", mark("notify")).unwrap();

  let data = FlowData::new(ReservationContext::default());
  flow.run(data.clone()).await.unwrap();
  assert_eq!(trail(&data), vec!["validate", "reserve", "audit", "notify"]);
}

#[test]
fn registering_on_unknown_step_is_rejected() {
  let mut flow = three_step_flow();

  let err = flow.on("refund", mark("refund")).err().unwrap();
  assert!(matches!(
    err,
    FlowError::StepNotFound { ref flow_name, ref step_name } if flow_name == "reservation" && step_name == "refund"
  ));

  assert!(flow.skip_if("refund", |_| true).is_err());
  assert!(flow.insert_after("refund", StepDef::optional("x")).is_err());
}

#[tokio::test]
#[serial]
async fn async_handlers_can_await_between_context_updates() {
  setup_tracing();
  let mut flow: Flow<ReservationContext, TestError> = Flow::new("pricing", vec![StepDef::required("quote")]);
  flow
    .on("quote", |data: FlowData<ReservationContext>| async move {
      let base = data.with(|c| c.amount_kobo);
      tokio::task::yield_now().await;
      data.update(|c| c.amount_kobo = base + 7_500);
      Ok::<_, TestError>(StepControl::Continue)
    })
    .unwrap();

  let data = FlowData::new(ReservationContext {
    amount_kobo: 2_500,
    ..Default::default()
  });
  flow.run(data.clone()).await.unwrap();
  assert_eq!(data.with(|c| c.amount_kobo), 10_000);
}
