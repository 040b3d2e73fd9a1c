//! CLI binary for building the cross-reference index of one tree.

use anyhow::{Context, Result};
use clap::Parser;
use std::ffi::OsString;
use std::path::PathBuf;
use std::process::ExitCode;
use xref_core::args::IndexArgs;
use xref_core::config::PipelineOptions;
use xref_core::home::Home;
use xref_pipeline::{PipelineError, ProcessRunner};

const USAGE: &str = "usage: mkindex <config-repo-path> <config-file> <tree-name>";

/// Exactly three positionals. Help and version flags are disabled; the
/// argument count itself is checked in [`parse_cli`].
#[derive(Parser)]
#[command(
    name = "mkindex",
    about = "Build the cross-reference index for one tree",
    disable_help_flag = true,
    disable_version_flag = true
)]
struct Cli {
    /// Checkout of the repository holding per-tree configuration
    #[arg(value_name = "config-repo-path")]
    config_repo_path: PathBuf,

    /// JSON config file describing the trees
    #[arg(value_name = "config-file")]
    config_file: PathBuf,

    /// Tree to index
    #[arg(value_name = "tree-name")]
    tree_name: OsString,
}

/// Parse the raw command line. Anything but three operands is a usage
/// error, counted the way a shell counts `$#`: `--` is an operand like any
/// other. A leading `--` is inserted so clap takes every operand literally.
fn parse_cli<I>(raw: I) -> Option<Cli>
where
    I: IntoIterator<Item = OsString>,
{
    let mut raw = raw.into_iter();
    let program = raw.next()?;
    let operands: Vec<OsString> = raw.collect();
    if operands.len() != 3 {
        return None;
    }
    let escaped = [program, OsString::from("--")].into_iter().chain(operands);
    Cli::try_parse_from(escaped).ok()
}

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .init();

    let Some(cli) = parse_cli(std::env::args_os()) else {
        eprintln!("{USAGE}");
        return ExitCode::from(1);
    };

    match cmd_index(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {e:#}");
            ExitCode::from(exit_code(&e))
        }
    }
}

fn cmd_index(cli: Cli) -> Result<()> {
    let home = Home::resolve().context("failed to resolve mkindex home")?;
    let options = PipelineOptions::load(home.root())?;
    let args = IndexArgs::new(cli.config_repo_path, cli.config_file, cli.tree_name);

    let report = xref_pipeline::run_index(
        &args,
        &home,
        &options,
        &mut ProcessRunner,
        &mut std::io::stderr(),
    )?;

    tracing::info!(
        tree = %args.tree_name.to_string_lossy(),
        executed = report.executed.len(),
        skipped = report.skipped.len(),
        "index built"
    );
    Ok(())
}

/// A failed step propagates its own status; every other failure exits 1.
fn exit_code(err: &anyhow::Error) -> u8 {
    err.downcast_ref::<PipelineError>()
        .map_or(1, PipelineError::exit_code)
}
