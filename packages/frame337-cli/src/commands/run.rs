use crate::cli::TestArgs;
use crate::exit_codes;
use crate::output;
use frame337_harness::types::{CaseKind, CaseResult};
use frame337_harness::{manifest, negative, runner};
use frame337_harness::{RunReport, SequenceCounter, ToolKind};

fn case_line(case: &CaseResult) -> String {
    let prefix = match case.kind {
        CaseKind::Replay => "",
        CaseKind::Negative => "Error case ",
    };
    let verdict = if case.passed() { "Passed" } else { "Failed" };
    format!(
        "{}{} -> {} {}",
        prefix,
        case.input_path.display(),
        case.output_path.display(),
        verdict
    )
}

pub async fn execute(args: TestArgs) -> i32 {
    let config = args.common.config();
    let layout = config.layout();
    let manifest_path = args
        .manifest
        .clone()
        .unwrap_or_else(|| layout.manifest_path());

    let candidate = match config.tool(args.candidate_bin.as_deref(), ToolKind::Candidate) {
        Ok(t) => t,
        Err(e) => {
            eprintln!("Error: {}", e);
            return exit_codes::for_error(&e);
        }
    };

    let entries = match manifest::read_manifest(&manifest_path) {
        Ok(e) => e,
        Err(e) => {
            eprintln!("Error: {}", e);
            return exit_codes::INPUT_ERROR;
        }
    };

    let error_inputs = if args.skip_negative {
        Vec::new()
    } else {
        match negative::error_corpus(&layout) {
            Ok(files) => files,
            Err(e) => {
                eprintln!("Error: {}", e);
                return exit_codes::for_error(&e);
            }
        }
    };

    if !args.quiet {
        eprintln!("Running Tests");
        eprintln!("  Candidate: {}", candidate.binary_path().display());
        eprintln!("  Manifest: {}", manifest_path.display());
    }

    if let Err(e) = runner::reset_dut_output(&layout) {
        eprintln!("Error: Failed to reset candidate output: {}", e);
        return exit_codes::EXECUTION_ERROR;
    }

    // JSON on stdout must stay parseable, so the live lines are dropped there
    let stream_cases = !args.quiet && !(args.json && args.output.is_none());
    let mut print_case = |case: &CaseResult| {
        if stream_cases {
            println!("{}", case_line(case));
        }
        if let Some(detail) = &case.detail {
            log::debug!("tid{:03}: {}", case.sequence_id, detail);
        }
    };

    let mut ids = SequenceCounter::new();
    let mut report = RunReport::new();
    runner::replay_manifest(&entries, &candidate, &layout, &mut ids, &mut report, &mut print_case)
        .await;
    negative::validate_rejections(
        &error_inputs,
        &candidate,
        &layout,
        &mut ids,
        &mut report,
        &mut print_case,
    )
    .await;

    let rendered = if args.json {
        let json = if args.compact {
            serde_json::to_string(&report)
        } else {
            serde_json::to_string_pretty(&report)
        };
        match json {
            Ok(json) => json,
            Err(e) => {
                eprintln!("Error: JSON serialization failed: {}", e);
                return exit_codes::EXECUTION_ERROR;
            }
        }
    } else {
        report.render_text()
    };

    if let Err(e) = output::write_output(&rendered, args.output.as_deref()) {
        eprintln!("Error: {}", e);
        return exit_codes::EXECUTION_ERROR;
    }

    if report.failed > 0 {
        exit_codes::TESTS_FAILED
    } else if !report.corrupt_records.is_empty() {
        exit_codes::PARTIAL_FAILURE
    } else {
        exit_codes::SUCCESS
    }
}
