pub mod compare;
pub mod config;
pub mod error;
pub mod generator;
pub mod layout;
pub mod manifest;
pub mod negative;
pub mod pipeline;
pub mod report;
pub mod runner;
pub mod tool;
pub mod types;

pub use config::{FailurePolicy, HarnessConfig};
pub use error::{HarnessError, Result};
pub use layout::CorpusLayout;
pub use report::RunReport;
pub use tool::{FramerTool, ToolKind};
pub use types::*;
