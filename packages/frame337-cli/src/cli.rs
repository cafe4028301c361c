use clap::{Args, Parser, Subcommand};
use frame337_harness::{FailurePolicy, HarnessConfig};
use std::path::PathBuf;

#[derive(Parser)]
#[command(
    name = "frame337-harness",
    version,
    about = "Conformance-test harness for the frame337 SMPTE 337 framer",
    long_about = "Derive test assets, record golden outputs from a reference framer, and replay\n\
                  the recorded cases against a candidate framer (Dolby E, AC-3, E-AC-3, AC-4).\n\
                  Run `sources`, then `references`, then `test`."
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    /// Increase verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,
}

#[derive(Subcommand)]
pub enum Command {
    /// Derive elementary and WAV assets from seed PCM with the reference framer
    Sources(SourcesArgs),
    /// Produce golden outputs and write the test case manifest
    References(ReferencesArgs),
    /// Replay the manifest against the candidate framer and report
    Test(TestArgs),
    /// Show resolved binaries, corpus layout and settings
    Info(InfoArgs),
}

/// Settings shared by every subcommand
#[derive(Args, Clone)]
pub struct CommonArgs {
    /// Corpus root containing sources/, reference_output/ and dut_output/
    #[arg(long, env = "FRAME337_ROOT", default_value = ".")]
    pub root: PathBuf,

    /// Per-invocation timeout in seconds (0 or unset: wait indefinitely)
    #[arg(long, env = "FRAME337_TIMEOUT_SECS")]
    pub timeout_secs: Option<u64>,

    /// Run framer binaries through `sh`
    #[arg(long, default_value_t = false)]
    pub shell_wrapper: bool,
}

impl CommonArgs {
    pub fn config(&self) -> HarnessConfig {
        HarnessConfig::new(&self.root)
            .with_timeout_secs(self.timeout_secs)
            .with_shell_wrapper(self.shell_wrapper)
    }
}

#[derive(Args)]
pub struct SourcesArgs {
    #[command(flatten)]
    pub common: CommonArgs,

    /// Path to the reference framer
    #[arg(long, env = "FRAME337_REF_BIN")]
    pub reference_bin: Option<PathBuf>,

    /// Keep converting after a file fails, then report every failure
    #[arg(long, default_value_t = false)]
    pub continue_on_error: bool,

    /// Suppress progress messages on stderr
    #[arg(long, default_value_t = false)]
    pub quiet: bool,
}

impl SourcesArgs {
    pub fn failure_policy(&self) -> FailurePolicy {
        if self.continue_on_error {
            FailurePolicy::Continue
        } else {
            FailurePolicy::Abort
        }
    }
}

#[derive(Args)]
pub struct ReferencesArgs {
    #[command(flatten)]
    pub common: CommonArgs,

    /// Path to the reference framer
    #[arg(long, env = "FRAME337_REF_BIN")]
    pub reference_bin: Option<PathBuf>,

    /// Path to the AC-4 reference framer
    #[arg(long, env = "FRAME337_REF_AC4_BIN")]
    pub reference_ac4_bin: Option<PathBuf>,

    /// Manifest to write (default: <root>/run_test_cases.txt)
    #[arg(long)]
    pub manifest: Option<PathBuf>,

    /// Print the manifest that would be written without running anything
    #[arg(long, default_value_t = false)]
    pub dry_run: bool,

    /// Suppress progress messages on stderr
    #[arg(long, default_value_t = false)]
    pub quiet: bool,
}

#[derive(Args)]
pub struct TestArgs {
    #[command(flatten)]
    pub common: CommonArgs,

    /// Path to the candidate framer
    #[arg(long, env = "FRAME337_DUT_BIN")]
    pub candidate_bin: Option<PathBuf>,

    /// Manifest to replay (default: <root>/run_test_cases.txt)
    #[arg(long)]
    pub manifest: Option<PathBuf>,

    /// Skip the malformed-input rejection cases
    #[arg(long, default_value_t = false)]
    pub skip_negative: bool,

    /// Emit the report as JSON
    #[arg(long, default_value_t = false)]
    pub json: bool,

    /// Compact JSON output (no indentation)
    #[arg(long, default_value_t = false)]
    pub compact: bool,

    /// Report file (default: stdout)
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Only print the final report
    #[arg(long, default_value_t = false)]
    pub quiet: bool,
}

#[derive(Args)]
pub struct InfoArgs {
    #[command(flatten)]
    pub common: CommonArgs,

    /// Path to the reference framer
    #[arg(long, env = "FRAME337_REF_BIN")]
    pub reference_bin: Option<PathBuf>,

    /// Path to the AC-4 reference framer
    #[arg(long, env = "FRAME337_REF_AC4_BIN")]
    pub reference_ac4_bin: Option<PathBuf>,

    /// Path to the candidate framer
    #[arg(long, env = "FRAME337_DUT_BIN")]
    pub candidate_bin: Option<PathBuf>,

    /// Output as JSON
    #[arg(long, default_value_t = false)]
    pub json: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_test_subcommand() {
        let cli = Cli::try_parse_from([
            "frame337-harness",
            "test",
            "--root",
            "/corpus",
            "--candidate-bin",
            "/opt/frame337",
            "--timeout-secs",
            "30",
            "--json",
        ])
        .unwrap();
        match cli.command {
            Command::Test(args) => {
                assert_eq!(args.common.root, PathBuf::from("/corpus"));
                assert_eq!(args.candidate_bin, Some(PathBuf::from("/opt/frame337")));
                assert!(args.json);
                assert!(!args.skip_negative);
                let config = args.common.config();
                assert_eq!(config.timeout, Some(std::time::Duration::from_secs(30)));
            }
            _ => panic!("expected test subcommand"),
        }
    }

    #[test]
    fn test_sources_failure_policy() {
        let cli = Cli::try_parse_from(["frame337-harness", "sources", "--continue-on-error"])
            .unwrap();
        match cli.command {
            Command::Sources(args) => assert_eq!(args.failure_policy(), FailurePolicy::Continue),
            _ => panic!("expected sources subcommand"),
        }
    }

    #[test]
    fn test_verbose_is_global() {
        let cli = Cli::try_parse_from(["frame337-harness", "references", "--dry-run", "-vv"])
            .unwrap();
        assert_eq!(cli.verbose, 2);
    }

    #[test]
    fn test_unknown_mode_is_rejected() {
        assert!(Cli::try_parse_from(["frame337-harness", "generate"]).is_err());
    }
}
