use crate::error::Result;
use crate::layout::CorpusLayout;
use crate::tool::{resolve_binary, FramerTool, ToolKind};
use serde::Serialize;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// What the asset pipeline does when one file fails to convert
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FailurePolicy {
    /// Stop at the first failed file
    #[default]
    Abort,
    /// Record the failure and keep converting
    Continue,
}

/// Harness settings shared by every run mode
#[derive(Debug, Clone, Serialize)]
pub struct HarnessConfig {
    /// Corpus root holding `sources/`, `reference_output/`, `dut_output/`
    pub root: PathBuf,
    /// Per-invocation limit; `None` waits indefinitely
    pub timeout: Option<Duration>,
    /// Run framer binaries through `sh`
    pub shell_wrapper: bool,
    pub failure_policy: FailurePolicy,
}

impl HarnessConfig {
    pub fn new<P: AsRef<Path>>(root: P) -> Self {
        Self {
            root: root.as_ref().to_path_buf(),
            timeout: None,
            shell_wrapper: false,
            failure_policy: FailurePolicy::Abort,
        }
    }

    pub fn with_timeout_secs(mut self, seconds: Option<u64>) -> Self {
        self.timeout = seconds.filter(|&s| s > 0).map(Duration::from_secs);
        self
    }

    pub fn with_shell_wrapper(mut self, enabled: bool) -> Self {
        self.shell_wrapper = enabled;
        self
    }

    pub fn with_failure_policy(mut self, policy: FailurePolicy) -> Self {
        self.failure_policy = policy;
        self
    }

    pub fn layout(&self) -> CorpusLayout {
        CorpusLayout::new(&self.root)
    }

    pub fn binary_path(&self, explicit: Option<&Path>, kind: ToolKind) -> PathBuf {
        resolve_binary(explicit, kind, &self.root)
    }

    /// Open a framer binary with this configuration's invocation options
    pub fn tool(&self, explicit: Option<&Path>, kind: ToolKind) -> Result<FramerTool> {
        let tool = FramerTool::new(self.binary_path(explicit, kind))?
            .with_shell_wrapper(self.shell_wrapper)
            .with_timeout(self.timeout);
        Ok(tool)
    }
}
