//! External process execution shared by the git and gh adapters.

use std::ffi::{OsStr, OsString};
use std::path::Path;
use std::process::Command;

use crate::error::AdapterError;

/// Run `program` with `args`, optionally inside `cwd`, and return its stdout.
///
/// Interactive credential prompts are disabled so a missing credential fails
/// the call instead of blocking a worker. A non-zero exit becomes
/// [`AdapterError::Command`] carrying the trimmed stderr.
pub(crate) fn run<I, S>(program: &str, args: I, cwd: Option<&Path>) -> Result<String, AdapterError>
where
    I: IntoIterator<Item = S>,
    S: AsRef<OsStr>,
{
    let args: Vec<OsString> = args.into_iter().map(|a| a.as_ref().to_owned()).collect();
    let rendered = render(program, &args);
    tracing::debug!("running: {rendered}");

    let mut cmd = Command::new(program);
    cmd.args(&args)
        .env("GIT_TERMINAL_PROMPT", "0")
        .env("GH_PROMPT_DISABLED", "1");
    if let Some(dir) = cwd {
        cmd.current_dir(dir);
    }

    let output = cmd.output().map_err(|source| AdapterError::Spawn {
        program: program.to_owned(),
        source,
    })?;

    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr).trim().to_owned();
        let stderr = if stderr.is_empty() {
            String::from_utf8_lossy(&output.stdout).trim().to_owned()
        } else {
            stderr
        };
        let status = match output.status.code() {
            Some(code) => format!("status {code}"),
            None => "a signal".to_owned(),
        };
        return Err(AdapterError::Command {
            command: rendered,
            status,
            stderr,
        });
    }

    Ok(String::from_utf8_lossy(&output.stdout).into_owned())
}

fn render(program: &str, args: &[OsString]) -> String {
    let mut out = program.to_owned();
    for arg in args {
        out.push(' ');
        out.push_str(&arg.to_string_lossy());
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_program_is_a_spawn_error() {
        let err = run("agentspack-definitely-not-installed", ["--version"], None).unwrap_err();
        assert!(matches!(err, AdapterError::Spawn { .. }), "got: {err}");
    }

    #[test]
    fn render_joins_program_and_args() {
        let args = vec![OsString::from("clone"), OsString::from("--depth=1")];
        assert_eq!(render("git", &args), "git clone --depth=1");
    }

    #[test]
    #[cfg(unix)]
    fn non_zero_exit_is_a_command_error() {
        let err = run("sh", ["-c", "echo boom >&2; exit 3"], None).unwrap_err();
        match err {
            AdapterError::Command { status, stderr, .. } => {
                assert_eq!(status, "status 3");
                assert_eq!(stderr, "boom");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    #[cfg(unix)]
    fn stdout_is_returned_on_success() {
        let out = run("sh", ["-c", "echo hello"], None).unwrap();
        assert_eq!(out.trim(), "hello");
    }
}
