//! Subprocess execution with captured output

use crate::{Error, Result};
use std::path::Path;
use std::process::Stdio;
use tokio::process::Command;

/// Output captured from a finished subprocess
#[derive(Debug, Clone)]
pub struct CommandOutput {
    /// Exit code, `None` when terminated by a signal
    pub exit_code: Option<i32>,
    /// Whether the process exited successfully
    pub success: bool,
    /// Captured stdout, lossily decoded for diagnostics
    pub stdout: String,
    /// Captured stdout exactly as the child wrote it
    pub raw_stdout: Vec<u8>,
    /// Captured stderr
    pub stderr: String,
}

impl CommandOutput {
    /// Stdout and stderr joined for diagnostics
    #[must_use]
    pub fn combined(&self) -> String {
        match (self.stdout.trim().is_empty(), self.stderr.trim().is_empty()) {
            (true, true) => String::new(),
            (false, true) => self.stdout.clone(),
            (true, false) => self.stderr.clone(),
            (false, false) => format!("{}\n{}", self.stdout, self.stderr),
        }
    }
}

/// Render a program and its arguments for logs and errors
#[must_use]
pub fn render_command(program: &str, args: &[String]) -> String {
    std::iter::once(program)
        .chain(args.iter().map(String::as_str))
        .collect::<Vec<_>>()
        .join(" ")
}

/// Run `program` in `cwd` and capture its output.
///
/// A non-zero exit is reported through [`CommandOutput::success`], not as an
/// error. The child is killed if the returned future is dropped before it
/// completes.
pub async fn run_command(program: &str, args: &[String], cwd: &Path) -> Result<CommandOutput> {
    let rendered = render_command(program, args);
    tracing::debug!(command = %rendered, cwd = %cwd.display(), "Spawning process");

    let output = Command::new(program)
        .args(args)
        .current_dir(cwd)
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .kill_on_drop(true)
        .output()
        .await
        .map_err(|e| Error::io(e, cwd, format!("spawn {program}")))?;

    let result = CommandOutput {
        exit_code: output.status.code(),
        success: output.status.success(),
        stdout: String::from_utf8_lossy(&output.stdout).to_string(),
        raw_stdout: output.stdout,
        stderr: String::from_utf8_lossy(&output.stderr).to_string(),
    };

    if !result.success {
        tracing::warn!(command = %rendered, exit = ?result.exit_code, "Process failed");
    }
    Ok(result)
}

/// Run `program` and fail with [`Error::CommandFailed`] on a non-zero exit
pub async fn run_checked(program: &str, args: &[String], cwd: &Path) -> Result<CommandOutput> {
    let output = run_command(program, args, cwd).await?;
    if output.success {
        Ok(output)
    } else {
        Err(Error::CommandFailed {
            command: render_command(program, args),
            exit_code: output.exit_code,
            stdout: output.stdout,
            stderr: output.stderr,
        })
    }
}
