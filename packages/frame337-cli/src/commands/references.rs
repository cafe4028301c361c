use crate::cli::ReferencesArgs;
use crate::exit_codes;
use frame337_harness::generator::{self, PlannedCase, ReferenceTool, ReferenceTools};
use frame337_harness::manifest::{self, ManifestWriter};
use frame337_harness::{HarnessConfig, Result, ToolKind};

fn needs(plan: &[PlannedCase], which: ReferenceTool) -> bool {
    plan.iter().any(|p| p.invoke && p.tool == which)
}

/// Open only the reference binaries the plan actually invokes
fn resolve_tools(
    config: &HarnessConfig,
    args: &ReferencesArgs,
    plan: &[PlannedCase],
) -> Result<ReferenceTools> {
    let mut tools = ReferenceTools::default();
    if needs(plan, ReferenceTool::General) {
        tools.general = Some(config.tool(args.reference_bin.as_deref(), ToolKind::Reference)?);
    }
    if needs(plan, ReferenceTool::Ac4) {
        tools.ac4 = Some(config.tool(args.reference_ac4_bin.as_deref(), ToolKind::ReferenceAc4)?);
    }
    Ok(tools)
}

pub async fn execute(args: ReferencesArgs) -> i32 {
    let config = args.common.config();
    let layout = config.layout();
    let manifest_path = args
        .manifest
        .clone()
        .unwrap_or_else(|| layout.manifest_path());

    let plan = match generator::plan_battery(&layout) {
        Ok(p) => p,
        Err(e) => {
            eprintln!("Error: {}", e);
            return exit_codes::for_error(&e);
        }
    };

    if plan.is_empty() {
        eprintln!(
            "Error: No source assets found under {}",
            layout.sources_dir().display()
        );
        return exit_codes::INPUT_ERROR;
    }

    // Dry-run mode: print the manifest that would be written and exit
    if args.dry_run {
        for planned in &plan {
            log::info!(
                "[{}] {:?} reference{}",
                planned.scenario,
                planned.tool,
                if planned.invoke { "" } else { " (golden reused)" }
            );
            println!("{}", manifest::format_record(&planned.test_case));
        }
        if !args.quiet {
            eprintln!("Planned {} case(s)", plan.len());
        }
        return exit_codes::SUCCESS;
    }

    let tools = match resolve_tools(&config, &args, &plan) {
        Ok(t) => t,
        Err(e) => {
            eprintln!("Error: {}", e);
            return exit_codes::for_error(&e);
        }
    };

    if !args.quiet {
        eprintln!("Generating References");
    }

    if let Err(e) = generator::reset_reference_output(&layout) {
        eprintln!("Error: Failed to reset reference output: {}", e);
        return exit_codes::EXECUTION_ERROR;
    }

    let mut writer = match ManifestWriter::create(&manifest_path) {
        Ok(w) => w,
        Err(e) => {
            eprintln!("Error: {}", e);
            return exit_codes::for_error(&e);
        }
    };

    match generator::execute_plan(&plan, &tools, &layout, &mut writer).await {
        Ok(written) => {
            if !args.quiet {
                eprintln!(
                    "Wrote {} test case(s) to {}",
                    written,
                    manifest_path.display()
                );
            }
            exit_codes::SUCCESS
        }
        Err(e) => {
            eprintln!("Reference generation failed: {}", e);
            exit_codes::for_error(&e)
        }
    }
}
