//! Command runner for external process execution.
//!
//! Every collaborator tool is driven through [`CommandRunner`], a blocking
//! run-to-completion interface. [`SystemRunner`] spawns real processes;
//! tests substitute a scripted runner.

use std::env;
use std::ffi::OsString;
use std::io;
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};

/// A command line to execute.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandSpec {
    pub program: String,
    pub args: Vec<OsString>,
    /// Working directory (inherits the caller's when unset).
    pub cwd: Option<PathBuf>,
}

impl CommandSpec {
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
            args: Vec::new(),
            cwd: None,
        }
    }

    pub fn arg(mut self, arg: impl Into<OsString>) -> Self {
        self.args.push(arg.into());
        self
    }

    pub fn args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<OsString>,
    {
        self.args.extend(args.into_iter().map(Into::into));
        self
    }

    pub fn current_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.cwd = Some(dir.into());
        self
    }

    /// Arguments as lossy strings.
    pub fn arg_strings(&self) -> Vec<String> {
        self.args
            .iter()
            .map(|a| a.to_string_lossy().to_string())
            .collect()
    }

    /// Shell-like rendering for logs; arguments with spaces are quoted.
    pub fn display(&self) -> String {
        let mut parts = vec![self.program.clone()];
        for arg in self.arg_strings() {
            if arg.contains(' ') || arg.is_empty() {
                parts.push(format!("\"{}\"", arg));
            } else {
                parts.push(arg);
            }
        }
        parts.join(" ")
    }
}

/// Captured result of a finished process.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CommandOutput {
    /// Exit code; `None` when terminated by a signal.
    pub exit_code: Option<i32>,
    pub stdout: String,
    pub stderr: String,
}

impl CommandOutput {
    pub fn success(&self) -> bool {
        self.exit_code == Some(0)
    }

    /// Exit code for error reporting (-1 when killed by a signal).
    pub fn code(&self) -> i32 {
        self.exit_code.unwrap_or(-1)
    }
}

/// Runs external commands to completion.
pub trait CommandRunner: Send + Sync {
    /// Run a command, blocking until it exits, capturing both streams.
    ///
    /// `Err` means the process could not be started at all.
    fn run(&self, spec: &CommandSpec) -> io::Result<CommandOutput>;

    /// Resolve a program name to an executable path.
    fn locate(&self, program: &str) -> Option<PathBuf>;
}

/// Runner backed by `std::process::Command`.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemRunner;

impl SystemRunner {
    pub fn new() -> Self {
        Self
    }
}

impl CommandRunner for SystemRunner {
    fn run(&self, spec: &CommandSpec) -> io::Result<CommandOutput> {
        let mut cmd = Command::new(&spec.program);
        cmd.args(&spec.args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped());

        if let Some(ref cwd) = spec.cwd {
            cmd.current_dir(cwd);
        }

        tracing::debug!("Running: {}", spec.display());

        let output = cmd.output()?;

        Ok(CommandOutput {
            exit_code: output.status.code(),
            stdout: String::from_utf8_lossy(&output.stdout).to_string(),
            stderr: String::from_utf8_lossy(&output.stderr).to_string(),
        })
    }

    fn locate(&self, program: &str) -> Option<PathBuf> {
        find_in_path(program)
    }
}

/// Search `PATH` for an executable.
///
/// Names containing a path separator are checked directly.
pub fn find_in_path(tool: &str) -> Option<PathBuf> {
    let direct = Path::new(tool);
    if direct.components().count() > 1 {
        return direct.is_file().then(|| direct.to_path_buf());
    }

    let path_var = env::var_os("PATH")?;
    for dir in env::split_paths(&path_var) {
        let full = dir.join(tool);
        if full.is_file() {
            return Some(full);
        }
        #[cfg(windows)]
        {
            let exe = dir.join(format!("{tool}.exe"));
            if exe.is_file() {
                return Some(exe);
            }
        }
    }
    None
}
