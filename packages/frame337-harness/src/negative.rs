//! Negative cases: the candidate must reject malformed elementary streams.

use crate::error::{HarnessError, Result};
use crate::layout::{self, CorpusLayout};
use crate::report::RunReport;
use crate::tool::FramerTool;
use crate::types::{CaseKind, CaseOutcome, CaseResult, FailureKind, SequenceCounter};
use std::path::{Path, PathBuf};

/// Error cases run in wrap direction, so the would-be output is a WAV
pub const ERROR_CASE_OUTPUT_EXT: &str = ".wav";

/// Every file in `sources/error_es`, sorted
pub fn error_corpus(layout: &CorpusLayout) -> Result<Vec<PathBuf>> {
    layout::list_files(&layout.error_es_dir(), "*.*")
}

/// Pass iff the exit status is non-zero and no output (or an empty one) exists
pub fn classify_rejection(exit_success: bool, output_len: Option<u64>) -> CaseOutcome {
    let no_output = matches!(output_len, None | Some(0));
    if !exit_success && no_output {
        CaseOutcome::Pass
    } else {
        CaseOutcome::Fail
    }
}

fn output_len(path: &Path) -> Option<u64> {
    std::fs::metadata(path)
        .ok()
        .filter(|m| m.is_file())
        .map(|m| m.len())
}

pub async fn run_error_case(
    candidate: &FramerTool,
    layout: &CorpusLayout,
    sequence_id: u32,
    input: &Path,
) -> CaseResult {
    let output = layout
        .dut_output_dir()
        .join(layout::case_file_name(sequence_id, input, ERROR_CASE_OUTPUT_EXT));
    let shown_input = layout.relative(input);
    let shown_output = layout.relative(&output);

    let failure = match candidate.invoke(&[], input, &output).await {
        Ok(out) => {
            let len = output_len(&output);
            match classify_rejection(out.success, len) {
                CaseOutcome::Pass => None,
                CaseOutcome::Fail if out.success => Some((
                    FailureKind::NegativeCaseViolation,
                    "candidate accepted invalid input".to_string(),
                )),
                CaseOutcome::Fail => Some((
                    FailureKind::NegativeCaseViolation,
                    format!(
                        "candidate rejected input but left {} bytes of output",
                        len.unwrap_or(0)
                    ),
                )),
            }
        }
        Err(e @ HarnessError::Timeout { .. }) => {
            Some((FailureKind::CandidateTimeout, e.to_string()))
        }
        Err(e) => Some((FailureKind::CandidateCrash, e.to_string())),
    };

    match failure {
        Some((failure, detail)) => {
            log::warn!(
                "Error case {} -> {} Failed: {}",
                shown_input.display(),
                shown_output.display(),
                detail
            );
            CaseResult::fail(
                sequence_id,
                CaseKind::Negative,
                shown_input,
                shown_output,
                failure,
                detail,
            )
        }
        None => {
            log::info!(
                "Error case {} -> {} Passed",
                shown_input.display(),
                shown_output.display()
            );
            CaseResult::pass(sequence_id, CaseKind::Negative, shown_input, shown_output)
        }
    }
}

/// Run every error-corpus input, continuing the run's sequence numbering
pub async fn validate_rejections<F>(
    inputs: &[PathBuf],
    candidate: &FramerTool,
    layout: &CorpusLayout,
    ids: &mut SequenceCounter,
    report: &mut RunReport,
    mut on_case: F,
) where
    F: FnMut(&CaseResult),
{
    for input in inputs {
        let result = run_error_case(candidate, layout, ids.next_id(), input).await;
        on_case(&result);
        report.record(result);
    }
}
