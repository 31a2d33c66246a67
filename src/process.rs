//! Child process execution wrapper.
//!
//! [`execute`] runs an argv-style command line — the first element is the
//! program, the rest are its arguments — with stdin, stdout, and stderr all
//! piped, and returns the captured text output together with the exit
//! status. No shell is involved; arguments are passed to the program
//! verbatim.

use std::ffi::OsStr;
use std::process::{Command, Stdio};

/// Errors from spawning a child process.
#[derive(Debug, thiserror::Error)]
pub enum ProcessError {
    /// The argument list was empty — there is no program to run.
    #[error("no program given")]
    Empty,

    /// The process could not be spawned or its output could not be read
    /// (e.g. the program was not found).
    #[error("failed to run child process: {0}")]
    Io(#[from] std::io::Error),
}

/// Captured output of a finished child process.
///
/// If the process produced no output (or no error output), the
/// corresponding field is an empty string.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProcessOutput {
    /// Everything the process wrote to stdout, decoded as text.
    pub stdout: String,
    /// Everything the process wrote to stderr, decoded as text.
    pub stderr: String,
    /// The process exit code; `-1` when the process was terminated by a
    /// signal and no code exists.
    pub status: i32,
}

/// Runs the given argv and waits for it to finish.
///
/// The child's stdin is an immediately-closed pipe, so programs that read
/// stdin see end-of-file rather than inheriting the script's terminal.
pub fn execute<S: AsRef<OsStr>>(argv: &[S]) -> Result<ProcessOutput, ProcessError> {
    let (program, args) = argv.split_first().ok_or(ProcessError::Empty)?;

    let output = Command::new(program)
        .args(args)
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .output()?;

    Ok(ProcessOutput {
        stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
        stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
        status: output.status.code().unwrap_or(-1),
    })
}
