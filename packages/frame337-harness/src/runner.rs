use crate::compare::files_identical;
use crate::error::{HarnessError, Result};
use crate::layout::{self, CorpusLayout};
use crate::manifest::ManifestEntry;
use crate::report::RunReport;
use crate::tool::FramerTool;
use crate::types::{CaseKind, CaseResult, FailureKind, SequenceCounter, TestCase};

/// Clear and recreate `dut_output/`
pub fn reset_dut_output(layout: &CorpusLayout) -> Result<()> {
    layout::reset_dir(&layout.dut_output_dir())
}

/// Run one recorded case against the candidate and compare with its golden
pub async fn run_case(candidate: &FramerTool, layout: &CorpusLayout, case: &TestCase) -> CaseResult {
    let golden = layout.resolve(&case.expected_output_path);
    let file_name = layout::case_file_name(
        case.sequence_id,
        &case.input_path,
        &layout::dotted_extension(&case.expected_output_path),
    );
    let output = layout.dut_output_dir().join(file_name);
    let input = layout.resolve(&case.input_path);
    let shown_output = layout.relative(&output);

    let fail = |failure: FailureKind, detail: String| {
        log::warn!(
            "{} -> {} Failed: {}",
            case.input_path.display(),
            shown_output.display(),
            detail
        );
        CaseResult::fail(
            case.sequence_id,
            CaseKind::Replay,
            case.input_path.clone(),
            shown_output.clone(),
            failure,
            detail,
        )
    };

    match candidate.invoke(&case.arguments, &input, &output).await {
        Ok(out) if !out.success => {
            return fail(
                FailureKind::CandidateCrash,
                format!(
                    "candidate exited with status {}: {}",
                    out.exit_code
                        .map(|c| c.to_string())
                        .unwrap_or_else(|| "signal".to_string()),
                    out.stderr.trim()
                ),
            );
        }
        Ok(_) => {}
        Err(e @ HarnessError::Timeout { .. }) => {
            return fail(FailureKind::CandidateTimeout, e.to_string());
        }
        Err(e) => return fail(FailureKind::CandidateCrash, e.to_string()),
    }

    match files_identical(&golden, &output) {
        Ok(true) => {
            log::info!(
                "{} -> {} Passed",
                case.input_path.display(),
                shown_output.display()
            );
            CaseResult::pass(
                case.sequence_id,
                CaseKind::Replay,
                case.input_path.clone(),
                shown_output.clone(),
            )
        }
        Ok(false) => fail(
            FailureKind::OutputMismatch,
            format!("output differs from {}", case.expected_output_path.display()),
        ),
        Err(e) => fail(FailureKind::OutputMismatch, e.to_string()),
    }
}

/// Replay manifest entries in order. Corrupt lines are reported and skipped.
///
/// `on_case` sees every result as soon as its case finishes.
pub async fn replay_manifest<F>(
    entries: &[ManifestEntry],
    candidate: &FramerTool,
    layout: &CorpusLayout,
    ids: &mut SequenceCounter,
    report: &mut RunReport,
    mut on_case: F,
) where
    F: FnMut(&CaseResult),
{
    for entry in entries {
        match entry {
            ManifestEntry::Corrupt(corrupt) => {
                log::error!(
                    "Test cases file is truncated at line {}: '{}'",
                    corrupt.line_number,
                    corrupt.content
                );
                report.record_corrupt(corrupt.clone());
            }
            ManifestEntry::Record(record) => {
                let case = record.clone().into_test_case(ids.next_id());
                let result = run_case(candidate, layout, &case).await;
                on_case(&result);
                report.record(result);
            }
        }
    }
}
