// tests/pipeline_execution_tests.rs
mod common;

use common::setup_tracing;
use orderflow::{ContextData, Pipeline, PipelineControl, PipelineError, PipelineResult, SkipCondition};
use serial_test::serial;
use std::sync::Arc;

#[derive(Debug, Default)]
struct Trace {
  steps: Vec<String>,
  stop_at: Option<&'static str>,
}

#[derive(Debug, thiserror::Error, PartialEq)]
enum EngineError {
  #[error("engine: {0}")]
  Engine(#[from] PipelineError),
  #[error("handler failed: {0}")]
  Handler(String),
}

fn record(step: &'static str) -> impl Fn(ContextData<Trace>) -> std::future::Ready<Result<PipelineControl, EngineError>> {
  move |ctx: ContextData<Trace>| {
    let mut guard = ctx.write();
    guard.steps.push(step.to_string());
    let control = if guard.stop_at == Some(step) {
      PipelineControl::Stop
    } else {
      PipelineControl::Continue
    };
    std::future::ready(Ok(control))
  }
}

fn pipeline(steps: &[(&str, bool, Option<SkipCondition<Trace>>)]) -> Pipeline<Trace, EngineError> {
  Pipeline::new("test_pipeline", steps)
}

#[tokio::test]
#[serial]
async fn steps_run_in_declaration_order() {
  setup_tracing();
  let mut p = pipeline(&[("a", false, None), ("b", false, None), ("c", false, None)]);
  p.on_root("c", record("c"));
  p.on_root("a", record("a"));
  p.on_root("b", record("b"));
  p.on_root("b", record("b2"));

  let ctx = ContextData::new(Trace::default());
  let result = p.run(ctx.clone()).await;

  assert_eq!(result, Ok(PipelineResult::Completed));
  assert_eq!(ctx.read().steps, vec!["a", "b", "b2", "c"]);
  assert_eq!(p.step_names().collect::<Vec<_>>(), vec!["a", "b", "c"]);
}

#[tokio::test]
#[serial]
async fn stop_ends_the_run_without_error() {
  setup_tracing();
  let mut p = pipeline(&[("a", false, None), ("b", false, None), ("c", false, None)]);
  p.on_root("a", record("a"));
  p.on_root("b", record("b"));
  p.on_root("c", record("c"));

  let ctx = ContextData::new(Trace {
    stop_at: Some("b"),
    ..Default::default()
  });
  let result = p.run(ctx.clone()).await;

  assert_eq!(result, Ok(PipelineResult::Stopped));
  assert_eq!(ctx.read().steps, vec!["a", "b"]);
}

#[tokio::test]
#[serial]
async fn handler_error_is_returned_unchanged() {
  setup_tracing();
  let mut p = pipeline(&[("good", false, None), ("bad", false, None), ("never", false, None)]);
  p.on_root("good", record("good"));
  p.on_root("bad", |ctx: ContextData<Trace>| async move {
    ctx.write().steps.push("bad".to_string());
    Err::<PipelineControl, _>(EngineError::Handler("boom".to_string()))
  });
  p.on_root("never", record("never"));

  let ctx = ContextData::new(Trace::default());
  let result = p.run(ctx.clone()).await;

  assert_eq!(result, Err(EngineError::Handler("boom".to_string())));
  assert_eq!(ctx.read().steps, vec!["good", "bad"]);
}

#[tokio::test]
#[serial]
async fn skip_condition_is_evaluated_right_before_the_step() {
  setup_tracing();
  let after_first: SkipCondition<Trace> = Arc::new(|ctx: ContextData<Trace>| !ctx.read().steps.is_empty());
  let mut p = pipeline(&[("first", false, None), ("skipped", false, Some(after_first)), ("last", false, None)]);
  p.on_root("first", record("first"));
  p.on_root("skipped", record("skipped"));
  p.on_root("last", record("last"));

  let ctx = ContextData::new(Trace::default());
  assert_eq!(p.run(ctx.clone()).await, Ok(PipelineResult::Completed));
  assert_eq!(ctx.read().steps, vec!["first", "last"]);

  p.set_skip_condition("skipped", None);
  let ctx = ContextData::new(Trace::default());
  p.run(ctx.clone()).await.expect("run completes");
  assert_eq!(ctx.read().steps, vec!["first", "skipped", "last"]);
}

#[tokio::test]
#[serial]
async fn required_step_without_handler_fails() {
  setup_tracing();
  let mut p = pipeline(&[("wired", false, None), ("unwired", false, None)]);
  p.on_root("wired", record("wired"));

  let ctx = ContextData::new(Trace::default());
  let result = p.run(ctx.clone()).await;

  assert_eq!(
    result,
    Err(EngineError::Engine(PipelineError::HandlerMissing {
      pipeline: "test_pipeline",
      step_name: "unwired".to_string(),
    }))
  );
  assert_eq!(ctx.read().steps, vec!["wired"]);
}

#[tokio::test]
#[serial]
async fn optional_step_without_handler_is_skipped() {
  setup_tracing();
  let mut p = pipeline(&[("maybe", true, None), ("then", false, None)]);
  p.on_root("then", record("then"));

  let ctx = ContextData::new(Trace::default());
  assert_eq!(p.run(ctx.clone()).await, Ok(PipelineResult::Completed));
  assert_eq!(ctx.read().steps, vec!["then"]);
}

#[tokio::test]
#[serial]
async fn context_is_released_after_the_run() {
  setup_tracing();
  let mut p = pipeline(&[("a", false, None)]);
  p.on_root("a", |ctx: ContextData<Trace>| async move {
    tokio::task::yield_now().await;
    ctx.write().steps.push("a".to_string());
    Ok::<_, EngineError>(PipelineControl::Continue)
  });

  let ctx = ContextData::new(Trace::default());
  p.run(ctx.clone()).await.expect("run completes");
  let trace = ctx.into_inner().expect("no handler kept a clone");
  assert_eq!(trace.steps, vec!["a"]);
}

#[test]
#[should_panic(expected = "step 'missing' is not defined")]
fn registering_on_unknown_step_panics() {
  let mut p = pipeline(&[("a", false, None)]);
  p.on_root("missing", record("missing"));
}
