//! Fail-fast driver over the ordered step list.
//!
//! Each enabled step is echoed, then run to completion. The first step that
//! cannot be started or does not succeed ends the run; later steps are never
//! touched.

use crate::runner::{CommandRunner, StepStatus};
use crate::step::{Step, StepContext, StepKind};
use std::io::Write;
use std::path::PathBuf;
use xref_core::config::PipelineOptions;
use xref_core::tree::ConfigError;

/// The ordered steps of an indexing run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Pipeline {
    steps: Vec<Step>,
}

/// Which steps ran and which were skipped as disabled.
#[derive(Debug, Default, PartialEq, Eq)]
pub struct RunReport {
    pub executed: Vec<StepKind>,
    pub skipped: Vec<StepKind>,
}

impl Pipeline {
    /// find-objdir-files → objdir-mkdirs (only if enabled) → crossref.
    pub fn standard(options: &PipelineOptions) -> Self {
        let mkdirs = if options.steps.objdir_mkdirs {
            Step::enabled(StepKind::ObjdirMkdirs)
        } else {
            Step::disabled(StepKind::ObjdirMkdirs)
        };
        Self::new(vec![
            Step::enabled(StepKind::FindObjdirFiles),
            mkdirs,
            Step::enabled(StepKind::Crossref),
        ])
    }

    pub fn new(steps: Vec<Step>) -> Self {
        Self { steps }
    }

    pub fn steps(&self) -> &[Step] {
        &self.steps
    }

    /// Run every enabled step in order, echoing each command to `echo`
    /// before it starts.
    pub fn run(
        &self,
        ctx: &StepContext,
        runner: &mut dyn CommandRunner,
        echo: &mut dyn Write,
    ) -> Result<RunReport, PipelineError> {
        let mut report = RunReport::default();

        for step in &self.steps {
            let name = step.kind.name();
            if !step.enabled {
                tracing::warn!(step = name, "step disabled, skipped");
                report.skipped.push(step.kind);
                continue;
            }

            let command = step.kind.command(ctx);
            // Echo failures must not mask the step itself.
            let _ = writeln!(echo, "+ {command}");
            let _ = echo.flush();

            tracing::info!(step = name, "running");
            let status = runner
                .run(&command, &ctx.env)
                .map_err(|source| PipelineError::Spawn {
                    step: name,
                    program: command.program.clone(),
                    source,
                })?;

            if !status.success() {
                tracing::warn!(step = name, %status, "step failed");
                return Err(PipelineError::StepFailed { step: name, status });
            }
            tracing::info!(step = name, "done");
            report.executed.push(step.kind);
        }

        Ok(report)
    }
}

/// Errors that end an indexing run.
#[derive(Debug, thiserror::Error)]
pub enum PipelineError {
    #[error("cannot resolve config repo path {}: {source}", .path.display())]
    ConfigRepo {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error("step {step} could not start {}: {source}", .program.display())]
    Spawn {
        step: &'static str,
        program: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("step {step} failed with {status}")]
    StepFailed {
        step: &'static str,
        status: StepStatus,
    },
}

impl PipelineError {
    /// Process exit code for this failure. A failed step propagates its own
    /// code; anything that fails before a step starts exits with 1.
    pub fn exit_code(&self) -> u8 {
        match self {
            Self::ConfigRepo { .. } | Self::Config(_) => 1,
            Self::Spawn { source, .. } => match source.kind() {
                std::io::ErrorKind::NotFound => 127,
                std::io::ErrorKind::PermissionDenied => 126,
                _ => 1,
            },
            Self::StepFailed { status, .. } => status.exit_code(),
        }
    }
}
