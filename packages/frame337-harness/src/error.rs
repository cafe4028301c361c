use thiserror::Error;

#[derive(Error, Debug)]
pub enum HarnessError {
    #[error("Framer binary not found at: {0}")]
    BinaryNotFound(String),

    #[error("Input file not found: {0}")]
    FileNotFound(String),

    #[error("Framer execution failed: {0}")]
    ExecutionFailed(String),

    #[error("Framer invocation `{command}` failed with status {status}: {stderr}")]
    ToolInvocation {
        command: String,
        status: String,
        stderr: String,
    },

    #[error("Framer invocation `{command}` timed out after {seconds:.1}s")]
    Timeout { command: String, seconds: f64 },

    #[error("Manifest error ({path}): {source}")]
    ManifestIo {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Asset derivation failed: {0}")]
    DerivationFailed(String),

    #[error("Invalid glob pattern: {0}")]
    Glob(#[from] glob::PatternError),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Invalid parameter: {0}")]
    InvalidParameter(String),
}

pub type Result<T> = std::result::Result<T, HarnessError>;
