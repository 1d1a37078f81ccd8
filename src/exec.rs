//! Child process spawning behind a mockable seam.
use std::io;
use std::path::PathBuf;
use std::process::{Command, Output, Stdio};

/// Result of a command execution.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExecResult {
    /// Captured standard output (lossy UTF-8).
    pub stdout: String,
    /// Captured standard error (lossy UTF-8).
    pub stderr: String,
    /// Whether the process exited with status 0.
    pub success: bool,
    /// Exit code; `None` when terminated by a signal.
    pub code: Option<i32>,
}

impl From<Output> for ExecResult {
    fn from(output: Output) -> Self {
        Self {
            stdout: String::from_utf8_lossy(&output.stdout).to_string(),
            stderr: String::from_utf8_lossy(&output.stderr).to_string(),
            success: output.status.success(),
            code: output.status.code(),
        }
    }
}

/// A fully resolved command line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandSpec {
    /// Resolved executable path.
    pub program: PathBuf,
    /// Arguments.
    pub args: Vec<String>,
    /// Variables added to the inherited environment.
    pub env: Vec<(String, String)>,
}

/// Process spawning, injectable for testing.
#[cfg_attr(test, mockall::automock)]
pub trait CommandRunner: Send + Sync {
    /// Locate `program`: an absolute path is checked as-is, a bare name is
    /// looked up on `PATH`.
    ///
    /// # Errors
    ///
    /// Returns [`io::ErrorKind::NotFound`] when no executable matches.
    fn resolve(&self, program: &str) -> io::Result<PathBuf>;

    /// Spawn `spec`, wait for it and capture its output. A non-zero exit is
    /// reported through [`ExecResult::success`], not as an error.
    ///
    /// # Errors
    ///
    /// Returns an error only when the process cannot be started.
    fn run(&self, spec: &CommandSpec) -> io::Result<ExecResult>;
}

/// Production [`CommandRunner`] backed by [`std::process::Command`].
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemRunner;

impl CommandRunner for SystemRunner {
    fn resolve(&self, program: &str) -> io::Result<PathBuf> {
        which::which(program)
            .map_err(|e| io::Error::new(io::ErrorKind::NotFound, format!("{program}: {e}")))
    }

    fn run(&self, spec: &CommandSpec) -> io::Result<ExecResult> {
        let output = Command::new(&spec.program)
            .args(&spec.args)
            .envs(spec.env.iter().map(|(k, v)| (k.as_str(), v.as_str())))
            .stdin(Stdio::null())
            .output()?;
        Ok(ExecResult::from(output))
    }
}

#[cfg(test)]
#[allow(clippy::expect_used, clippy::unwrap_used)]
mod tests {
    use super::*;

    fn spec(program: &str, args: &[&str]) -> CommandSpec {
        CommandSpec {
            program: SystemRunner.resolve(program).unwrap(),
            args: args.iter().map(ToString::to_string).collect(),
            env: Vec::new(),
        }
    }

    #[test]
    fn run_echo() {
        let result = SystemRunner.run(&spec("echo", &["hello"])).unwrap();
        assert!(result.success, "echo command should succeed");
        assert_eq!(result.stdout.trim(), "hello");
        assert_eq!(result.code, Some(0));
    }

    #[test]
    fn run_failure_is_not_an_error() {
        let result = SystemRunner.run(&spec("false", &[])).unwrap();
        assert!(!result.success, "non-zero exit should set success=false");
        assert_eq!(result.code, Some(1));
    }

    #[test]
    fn run_passes_extra_environment() {
        let mut cmd = spec("sh", &["-c", "printf %s \"$USYSCONF_TEST_VAR\""]);
        cmd.env.push(("USYSCONF_TEST_VAR".to_string(), "42".to_string()));
        let result = SystemRunner.run(&cmd).unwrap();
        assert_eq!(result.stdout, "42");
    }

    #[test]
    fn run_captures_stderr() {
        let result = SystemRunner
            .run(&spec("sh", &["-c", "echo oops >&2; exit 3"]))
            .unwrap();
        assert_eq!(result.stderr.trim(), "oops");
        assert_eq!(result.code, Some(3));
    }

    #[test]
    fn run_missing_program_is_an_error() {
        let cmd = CommandSpec {
            program: PathBuf::from("/nonexistent/usysconf-test-binary"),
            args: Vec::new(),
            env: Vec::new(),
        };
        assert!(SystemRunner.run(&cmd).is_err());
    }

    #[test]
    fn resolve_finds_known_program() {
        assert!(SystemRunner.resolve("sh").unwrap().is_absolute());
    }

    #[test]
    fn resolve_missing_program() {
        let err = SystemRunner
            .resolve("this-program-does-not-exist-12345")
            .unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::NotFound);
    }
}
