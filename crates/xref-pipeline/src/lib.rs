//! Fail-fast pipeline that runs the per-tree indexing helpers.
//!
//! # Architecture
//!
//! - **step**: `StepKind` / `Step` — the typed, ordered helper invocations
//! - **runner**: `CommandRunner` trait with the real process-spawning implementation
//! - **pipeline**: The driver that echoes, runs, and stops at the first failure
//! - **orchestrate**: Loads the tree config, builds the step context, runs the pipeline

pub mod orchestrate;
pub mod pipeline;
pub mod runner;
pub mod step;

pub use orchestrate::{build_context, run_index};
pub use pipeline::{Pipeline, PipelineError, RunReport};
pub use runner::{CommandLine, CommandRunner, ProcessRunner, StepStatus};
pub use step::{Step, StepContext, StepKind};
