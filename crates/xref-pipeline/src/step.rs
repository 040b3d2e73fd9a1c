//! The helper invocations that make up an indexing run.

use crate::runner::CommandLine;
use xref_core::args::IndexArgs;
use xref_core::env::StepEnv;
use xref_core::home::Home;

/// Everything a step needs, built once per run and shared by reference.
#[derive(Debug, Clone)]
pub struct StepContext {
    pub home: Home,
    pub args: IndexArgs,
    pub env: StepEnv,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StepKind {
    /// Record the generated files found in the tree's object directory.
    FindObjdirFiles,
    /// Create the object-directory skeleton. Disabled unless configured.
    ObjdirMkdirs,
    /// Build the cross-reference data for the tree.
    Crossref,
}

impl StepKind {
    pub const ALL: [StepKind; 3] = [Self::FindObjdirFiles, Self::ObjdirMkdirs, Self::Crossref];

    pub fn name(self) -> &'static str {
        match self {
            Self::FindObjdirFiles => "find-objdir-files",
            Self::ObjdirMkdirs => "objdir-mkdirs",
            Self::Crossref => "crossref",
        }
    }

    /// Helper file under `<home>/scripts`.
    pub fn script(self) -> &'static str {
        match self {
            Self::FindObjdirFiles => "find-objdir-files.py",
            Self::ObjdirMkdirs => "objdir-mkdirs.sh",
            Self::Crossref => "crossref.sh",
        }
    }

    /// The exact command this step runs.
    pub fn command(self, ctx: &StepContext) -> CommandLine {
        let cmd = CommandLine::new(ctx.home.script(self.script()));
        match self {
            Self::FindObjdirFiles | Self::ObjdirMkdirs => cmd,
            Self::Crossref => cmd.arg(ctx.args.config_file()).arg(&ctx.args.tree_name),
        }
    }
}

/// One pipeline entry. Disabled entries stay in the list so the full
/// sequence is visible, but are never run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Step {
    pub kind: StepKind,
    pub enabled: bool,
}

impl Step {
    pub fn enabled(kind: StepKind) -> Self {
        Self {
            kind,
            enabled: true,
        }
    }

    pub fn disabled(kind: StepKind) -> Self {
        Self {
            kind,
            enabled: false,
        }
    }
}
