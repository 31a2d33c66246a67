//! PowerShell script invocation across platforms.
//!
//! Builds the interpreter command line for a script and runs it through
//! [`process::execute`]. `-Command` is used rather than `-File` because
//! `-File` does not work properly with begin/process/end blocks, and
//! `; exit $LASTEXITCODE` is appended so a script-specific exit code
//! survives the interpreter.
//!
//! On Windows the classic `powershell.exe` is used and an
//! `-ExecutionPolicy` argument is passed; elsewhere the cross-platform
//! `pwsh` is expected on the PATH and the policy flag is omitted (it only
//! has meaning on Windows).

use crate::process::{self, ProcessError, ProcessOutput};

/// Default interpreter path on Windows.
pub const WINDOWS_POWERSHELL: &str =
    r"C:\WINDOWS\system32\WindowsPowerShell\v1.0\powershell.exe";

/// Default interpreter on non-Windows platforms (PowerShell Core).
pub const PWSH: &str = "pwsh";

/// Default execution policy passed on Windows.
pub const DEFAULT_EXECUTION_POLICY: &str = "RemoteSigned";

/// Interpreter selection and policy for a script invocation.
#[derive(Debug, Clone)]
pub struct PowerShellOptions {
    /// Path to (or name of) the PowerShell interpreter.
    pub interpreter: String,
    /// Execution policy, applied on Windows only.
    pub execution_policy: String,
}

impl Default for PowerShellOptions {
    fn default() -> Self {
        let interpreter = if cfg!(windows) {
            WINDOWS_POWERSHELL
        } else {
            PWSH
        };
        PowerShellOptions {
            interpreter: interpreter.to_string(),
            execution_policy: DEFAULT_EXECUTION_POLICY.to_string(),
        }
    }
}

/// Executes a PowerShell script with the default interpreter and policy.
///
/// `inputs` are positional parameters appended after the script path, in
/// order. Trailing newlines are stripped from the captured output, and a
/// non-empty stderr forces a failure exit status even when the interpreter
/// reported success.
pub fn execute_script(
    script_path: &str,
    inputs: &[&str],
) -> Result<ProcessOutput, ProcessError> {
    execute_script_with(script_path, inputs, &PowerShellOptions::default())
}

/// Like [`execute_script`], with explicit interpreter and policy options.
pub fn execute_script_with(
    script_path: &str,
    inputs: &[&str],
    options: &PowerShellOptions,
) -> Result<ProcessOutput, ProcessError> {
    tracing::debug!("Executing {script_path}");

    let argv = build_argv(script_path, inputs, options);
    let mut result = process::execute(&argv)?;

    result.stdout = trim_trailing_newlines(&result.stdout);
    result.stderr = trim_trailing_newlines(&result.stderr);
    if !result.stderr.is_empty() {
        result.status = 1;
    }
    Ok(result)
}

/// Assembles the interpreter argv for a script invocation.
fn build_argv(script_path: &str, inputs: &[&str], options: &PowerShellOptions) -> Vec<String> {
    let mut argv = vec![
        options.interpreter.clone(),
        "-NoLogo".to_string(),
        "-NoProfile".to_string(),
        "-NonInteractive".to_string(),
    ];
    if cfg!(windows) {
        argv.push("-ExecutionPolicy".to_string());
        argv.push(options.execution_policy.clone());
    }

    // -Command, not -File: -File doesn't work properly with begin,
    // process, end blocks.
    argv.push("-Command".to_string());
    argv.push(script_path.to_string());

    for input in inputs {
        argv.push(quote_input(input));
    }

    // Preserve a possible script specific exit code.
    argv.push("; exit $LASTEXITCODE".to_string());
    argv
}

/// Surrounds an input with quotes if it contains spaces, escaping embedded
/// quotes with a backtick (PowerShell's escape character).
fn quote_input(input: &str) -> String {
    if input.contains(' ') {
        format!("\"{}\"", input.replace('"', "`\""))
    } else {
        input.to_string()
    }
}

fn trim_trailing_newlines(text: &str) -> String {
    text.trim_end_matches(['\n', '\r']).to_string()
}
