use crate::cli::SourcesArgs;
use crate::exit_codes;
use frame337_harness::pipeline;
use frame337_harness::ToolKind;
use std::time::Instant;

pub async fn execute(args: SourcesArgs) -> i32 {
    let config = args
        .common
        .config()
        .with_failure_policy(args.failure_policy());
    let layout = config.layout();

    if !layout.sources_dir().is_dir() {
        eprintln!(
            "Error: Sources directory not found: {}",
            layout.sources_dir().display()
        );
        return exit_codes::INPUT_ERROR;
    }

    let tool = match config.tool(args.reference_bin.as_deref(), ToolKind::Reference) {
        Ok(t) => t,
        Err(e) => {
            eprintln!("Error: {}", e);
            return exit_codes::for_error(&e);
        }
    };

    if !args.quiet {
        eprintln!("Generating source files");
        eprintln!("  Reference: {}", tool.binary_path().display());
    }

    if let Err(e) = pipeline::reset_derived_dirs(&layout) {
        eprintln!("Error: Failed to reset derived directories: {}", e);
        return exit_codes::EXECUTION_ERROR;
    }

    let start_time = Instant::now();
    let summary = match pipeline::derive_all(&tool, &layout, config.failure_policy).await {
        Ok(s) => s,
        Err(e) => {
            eprintln!("Error: {}", e);
            return exit_codes::for_error(&e);
        }
    };

    for created in &summary.created {
        println!("Created {}", layout.relative(created).display());
    }
    // failures are logged by the pipeline

    if !args.quiet {
        eprintln!(
            "Sources complete: {} created, {} failed, {:.1}s",
            summary.created.len(),
            summary.failed.len(),
            start_time.elapsed().as_secs_f64()
        );
    }

    if summary.is_clean() {
        exit_codes::SUCCESS
    } else if !summary.created.is_empty() {
        exit_codes::PARTIAL_FAILURE
    } else {
        exit_codes::EXECUTION_ERROR
    }
}
