//! One indexing run for one tree, from positional values to finished helpers.

use crate::pipeline::{Pipeline, PipelineError, RunReport};
use crate::runner::CommandRunner;
use crate::step::StepContext;
use std::io::Write;
use xref_core::args::IndexArgs;
use xref_core::config::PipelineOptions;
use xref_core::env::StepEnv;
use xref_core::home::Home;
use xref_core::tree::{ConfigError, TreeConfig};

/// Load the tree config, build the child environment, print the start
/// marker, then run the standard pipeline.
///
/// A config that fails to load ends the run before any helper starts.
pub fn run_index(
    args: &IndexArgs,
    home: &Home,
    options: &PipelineOptions,
    runner: &mut dyn CommandRunner,
    echo: &mut dyn Write,
) -> Result<RunReport, PipelineError> {
    let ctx = build_context(args, home)?;

    let _ = writeln!(echo, "{}", chrono::Local::now().to_rfc2822());

    Pipeline::standard(options).run(&ctx, runner, echo)
}

/// Everything a step needs for `args`, with the config file already read.
pub fn build_context(args: &IndexArgs, home: &Home) -> Result<StepContext, PipelineError> {
    let config_repo = args
        .config_repo_absolute()
        .map_err(|source| PipelineError::ConfigRepo {
            path: args.config_repo_path.clone(),
            source,
        })?;

    let base = StepEnv::base(home, args, &config_repo);
    tracing::info!(
        config = %args.config_file.display(),
        tree = %args.tree_name.to_string_lossy(),
        "loading tree config"
    );
    let tree_name = args
        .tree_name
        .to_str()
        .ok_or_else(|| ConfigError::TreeNameEncoding {
            tree: args.tree_name.to_string_lossy().into_owned(),
        })?;
    let tree = TreeConfig::load(args.config_file(), tree_name, &base.expansion_vars())?;
    let env = base.with_tree(&tree, home);

    Ok(StepContext {
        home: home.clone(),
        args: args.clone(),
        env,
    })
}
