//! Blocking execution of external tools.
//!
//! Every collaborator (decompiler, recompiler, aligner, signer) goes through
//! [`Cmd`]. Output is captured rather than streamed, so the terminal only
//! shows pipeline progress; stderr is folded into the error on failure.

use anyhow::{bail, Context, Result};
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};

/// Builder for configuring command execution.
pub struct Cmd {
    program: String,
    args: Vec<String>,
    current_dir: Option<PathBuf>,
    /// Custom error message prefix.
    error_prefix: Option<String>,
    /// Arguments carry secrets and must not be logged.
    sensitive: bool,
}

impl Cmd {
    /// Create a new command builder.
    pub fn new(program: impl AsRef<str>) -> Self {
        Self {
            program: program.as_ref().to_string(),
            args: Vec::new(),
            current_dir: None,
            error_prefix: None,
            sensitive: false,
        }
    }

    /// Create a command for a resolved executable path.
    pub fn tool(path: &Path) -> Self {
        Self::new(path.to_string_lossy())
    }

    /// Add a single argument.
    pub fn arg(mut self, arg: impl AsRef<str>) -> Self {
        self.args.push(arg.as_ref().to_string());
        self
    }

    /// Add multiple arguments.
    pub fn args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        for arg in args {
            self.args.push(arg.as_ref().to_string());
        }
        self
    }

    /// Add a path as an argument.
    pub fn arg_path(mut self, path: &Path) -> Self {
        self.args.push(path.to_string_lossy().into_owned());
        self
    }

    /// Set the working directory.
    pub fn dir(mut self, dir: &Path) -> Self {
        self.current_dir = Some(dir.to_path_buf());
        self
    }

    /// Set a custom error message prefix.
    pub fn error_msg(mut self, msg: impl AsRef<str>) -> Self {
        self.error_prefix = Some(msg.as_ref().to_string());
        self
    }

    /// Keep the arguments out of debug logs.
    pub fn sensitive(mut self) -> Self {
        self.sensitive = true;
        self
    }

    /// Run the command to completion with captured output.
    ///
    /// Tool stdout only goes to the debug log.
    pub fn run(self) -> Result<()> {
        let mut cmd = Command::new(&self.program);
        cmd.args(&self.args);
        cmd.stdin(Stdio::null());

        if let Some(ref dir) = self.current_dir {
            cmd.current_dir(dir);
        }

        if self.sensitive {
            log::debug!("exec: {} <{} args>", self.program, self.args.len());
        } else {
            log::debug!("exec: {} {}", self.program, self.args.join(" "));
        }

        let output = cmd
            .output()
            .with_context(|| format!("Failed to execute '{}'. Is it installed?", self.program))?;

        let stdout = String::from_utf8_lossy(&output.stdout);
        if !stdout.trim().is_empty() {
            log::debug!("{}: {}", self.program, stdout.trim());
        }

        if !output.status.success() {
            let prefix = self
                .error_prefix
                .unwrap_or_else(|| format!("'{}' failed", self.program));
            let code = output.status.code().unwrap_or(-1);

            let stderr = String::from_utf8_lossy(&output.stderr);
            let stderr = stderr.trim();
            if stderr.is_empty() {
                bail!("{} (exit code {})", prefix, code);
            } else {
                bail!("{} (exit code {}):\n{}", prefix, code, stderr);
            }
        }

        Ok(())
    }
}

/// Look up a program on PATH.
pub fn which(program: &str) -> Option<PathBuf> {
    which::which(program).ok()
}
