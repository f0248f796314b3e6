// orderflow/src/core/control.rs

//! Flow-control signals returned by step handlers, and the outcome of a run.

/// Signal from a handler telling the pipeline whether to keep going.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PipelineControl {
  /// Run the remaining handlers and steps.
  Continue,
  /// Halt immediately. Nothing after this handler runs.
  ///
  /// Used when a step finds there is nothing left to do (e.g. an order with
  /// no lines needs no catalog lookup), not for failures.
  Stop,
}

/// Outcome of a full pipeline execution.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PipelineResult {
  /// Every non-skipped step ran.
  Completed,
  /// A handler returned `PipelineControl::Stop`.
  Stopped,
}
