//! Running helper commands as child processes.

use std::ffi::{OsStr, OsString};
use std::fmt;
use std::path::PathBuf;
use std::process::{Command, ExitStatus};
use xref_core::env::StepEnv;

/// A program and its arguments, ready to run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandLine {
    pub program: PathBuf,
    pub args: Vec<OsString>,
}

impl CommandLine {
    pub fn new(program: impl Into<PathBuf>) -> Self {
        Self {
            program: program.into(),
            args: Vec::new(),
        }
    }

    #[must_use]
    pub fn arg(mut self, arg: impl AsRef<OsStr>) -> Self {
        self.args.push(arg.as_ref().to_os_string());
        self
    }
}

/// Renders the command the way a shell trace would, quoting where needed.
impl fmt::Display for CommandLine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&shell_quote(self.program.as_os_str()))?;
        for arg in &self.args {
            write!(f, " {}", shell_quote(arg))?;
        }
        Ok(())
    }
}

fn shell_quote(word: &OsStr) -> String {
    let word = word.to_string_lossy();
    let plain = |c: char| c.is_ascii_alphanumeric() || "_-./:=@%+,".contains(c);
    if !word.is_empty() && word.chars().all(plain) {
        return word.into_owned();
    }
    format!("'{}'", word.replace('\'', r"'\''"))
}

/// How a finished step ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StepStatus {
    Exited(i32),
    /// Terminated by a signal before it could exit (unix only).
    Signaled(i32),
}

impl StepStatus {
    pub fn success(self) -> bool {
        self == Self::Exited(0)
    }

    pub fn from_exit_status(status: ExitStatus) -> Self {
        if let Some(code) = status.code() {
            return Self::Exited(code);
        }
        #[cfg(unix)]
        {
            use std::os::unix::process::ExitStatusExt;
            if let Some(signal) = status.signal() {
                return Self::Signaled(signal);
            }
        }
        Self::Exited(1)
    }

    /// Non-zero code to propagate when this status fails a step, mirroring
    /// what a shell reports. Values outside 1..=255 collapse to 1.
    pub fn exit_code(self) -> u8 {
        let code = match self {
            Self::Exited(code) => code,
            Self::Signaled(signal) => 128 + signal,
        };
        match u8::try_from(code) {
            Ok(0) | Err(_) => 1,
            Ok(code) => code,
        }
    }
}

impl fmt::Display for StepStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Exited(code) => write!(f, "exit status {code}"),
            Self::Signaled(signal) => write!(f, "signal {signal}"),
        }
    }
}

/// Runs one command to completion.
pub trait CommandRunner {
    /// Run `command` with `env` applied on top of the inherited environment.
    /// Returns an error only when the process could not be started.
    fn run(&mut self, command: &CommandLine, env: &StepEnv) -> std::io::Result<StepStatus>;
}

/// Spawns real child processes with inherited stdin/stdout/stderr.
#[derive(Debug, Default)]
pub struct ProcessRunner;

impl CommandRunner for ProcessRunner {
    fn run(&mut self, command: &CommandLine, env: &StepEnv) -> std::io::Result<StepStatus> {
        let status = Command::new(&command.program)
            .args(&command.args)
            .envs(env.iter())
            .status()?;
        Ok(StepStatus::from_exit_status(status))
    }
}
