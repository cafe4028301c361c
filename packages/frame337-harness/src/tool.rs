use crate::error::{HarnessError, Result};
use serde::Serialize;
use std::ffi::OsString;
use std::path::{Path, PathBuf};
use std::process::Stdio;
use std::time::{Duration, Instant};
use tokio::process::Command;

/// Shell used when the binary has to be run through a wrapper
pub const SHELL_COMMAND: &str = "sh";

/// Which framer binary a path refers to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ToolKind {
    /// Trusted reference framer (Dolby E, AC-3, E-AC-3)
    Reference,
    /// Trusted AC-4 reference framer (no PCM input support)
    ReferenceAc4,
    /// Device under test
    Candidate,
}

impl ToolKind {
    pub fn env_var(self) -> &'static str {
        match self {
            Self::Reference => "FRAME337_REF_BIN",
            Self::ReferenceAc4 => "FRAME337_REF_AC4_BIN",
            Self::Candidate => "FRAME337_DUT_BIN",
        }
    }

    /// Default location relative to the corpus root
    pub fn default_path(self) -> PathBuf {
        let os = os_dir_name();
        match self {
            Self::Reference => PathBuf::from("ref_bin").join(os).join("smpte.exe"),
            Self::ReferenceAc4 => PathBuf::from("ref_bin")
                .join(os)
                .join("smpte_app_lin64_ac4"),
            Self::Candidate => PathBuf::from("..")
                .join("Release")
                .join(os)
                .join("frame337"),
        }
    }
}

/// Platform directory name as `uname` spells it
pub fn os_dir_name() -> &'static str {
    match std::env::consts::OS {
        "linux" => "Linux",
        "macos" => "Darwin",
        "windows" => "Windows",
        "freebsd" => "FreeBSD",
        other => other,
    }
}

/// Explicit path if given, otherwise the kind's default under `root`
pub fn resolve_binary(explicit: Option<&Path>, kind: ToolKind, root: &Path) -> PathBuf {
    match explicit {
        Some(path) => path.to_path_buf(),
        None => root.join(kind.default_path()),
    }
}

/// Captured result of one framer run
#[derive(Debug, Clone)]
pub struct ToolOutput {
    pub exit_code: Option<i32>,
    pub success: bool,
    pub stdout: String,
    pub stderr: String,
    pub elapsed: Duration,
}

/// Handle on a framer executable
///
/// Every invocation has the shape `<binary> <args...> -i<input> -o<output>`.
#[derive(Debug, Clone)]
pub struct FramerTool {
    binary_path: PathBuf,
    shell_wrapper: bool,
    timeout: Option<Duration>,
}

impl FramerTool {
    pub fn new<P: AsRef<Path>>(binary_path: P) -> Result<Self> {
        let binary_path = binary_path.as_ref().to_path_buf();

        if !binary_path.exists() {
            return Err(HarnessError::BinaryNotFound(
                binary_path.display().to_string(),
            ));
        }

        Ok(Self {
            binary_path,
            shell_wrapper: false,
            timeout: None,
        })
    }

    /// Run the binary as `sh <binary> ...` (scripts without an exec bit)
    pub fn with_shell_wrapper(mut self, enabled: bool) -> Self {
        self.shell_wrapper = enabled;
        self
    }

    pub fn with_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn binary_path(&self) -> &Path {
        &self.binary_path
    }

    pub fn timeout(&self) -> Option<Duration> {
        self.timeout
    }

    fn argv(&self, args: &[String], input: &Path, output: &Path) -> Vec<OsString> {
        let mut argv: Vec<OsString> = args.iter().map(OsString::from).collect();
        let mut input_flag = OsString::from("-i");
        input_flag.push(input);
        let mut output_flag = OsString::from("-o");
        output_flag.push(output);
        argv.push(input_flag);
        argv.push(output_flag);
        argv
    }

    /// Human readable command line, for logs and dry runs
    pub fn command_line(&self, args: &[String], input: &Path, output: &Path) -> String {
        let mut parts = Vec::new();
        if self.shell_wrapper {
            parts.push(SHELL_COMMAND.to_string());
        }
        parts.push(self.binary_path.display().to_string());
        parts.extend(
            self.argv(args, input, output)
                .iter()
                .map(|a| a.to_string_lossy().into_owned()),
        );
        parts.join(" ")
    }

    /// Run the framer and capture its result regardless of exit status
    pub async fn invoke(&self, args: &[String], input: &Path, output: &Path) -> Result<ToolOutput> {
        let command_line = self.command_line(args, input, output);

        let mut command = if self.shell_wrapper {
            let mut cmd = Command::new(SHELL_COMMAND);
            cmd.arg(&self.binary_path);
            cmd
        } else {
            Command::new(&self.binary_path)
        };
        command
            .args(self.argv(args, input, output))
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true);

        log::info!("Executing: {}", command_line);

        let start_time = Instant::now();
        let child = command
            .spawn()
            .map_err(|e| HarnessError::ExecutionFailed(format!("{}: {}", command_line, e)))?;

        let output = match self.timeout {
            Some(limit) => match tokio::time::timeout(limit, child.wait_with_output()).await {
                Ok(result) => result,
                Err(_) => {
                    log::error!("Timed out after {:.1}s: {}", limit.as_secs_f64(), command_line);
                    return Err(HarnessError::Timeout {
                        command: command_line,
                        seconds: limit.as_secs_f64(),
                    });
                }
            },
            None => child.wait_with_output().await,
        }
        .map_err(|e| HarnessError::ExecutionFailed(format!("{}: {}", command_line, e)))?;

        let elapsed = start_time.elapsed();
        let stdout = String::from_utf8_lossy(&output.stdout).into_owned();
        let stderr = String::from_utf8_lossy(&output.stderr).into_owned();

        log::debug!(
            "Exited with {} in {:.2}s",
            output.status,
            elapsed.as_secs_f64()
        );
        if !stdout.trim().is_empty() {
            log::debug!("stdout: {}", stdout.trim_end());
        }
        if !stderr.trim().is_empty() {
            log::debug!("stderr: {}", stderr.trim_end());
        }

        Ok(ToolOutput {
            exit_code: output.status.code(),
            success: output.status.success(),
            stdout,
            stderr,
            elapsed,
        })
    }

    /// Like [`invoke`](Self::invoke), but a non-zero exit is an error
    pub async fn invoke_checked(
        &self,
        args: &[String],
        input: &Path,
        output: &Path,
    ) -> Result<ToolOutput> {
        let result = self.invoke(args, input, output).await?;
        if !result.success {
            let status = result
                .exit_code
                .map(|c| c.to_string())
                .unwrap_or_else(|| "signal".to_string());
            log::error!("Framer failed with status {}", status);
            return Err(HarnessError::ToolInvocation {
                command: self.command_line(args, input, output),
                status,
                stderr: result.stderr.trim().to_string(),
            });
        }
        Ok(result)
    }
}
