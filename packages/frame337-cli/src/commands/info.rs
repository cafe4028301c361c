use crate::cli::InfoArgs;
use crate::exit_codes;
use crate::output;
use frame337_harness::tool::os_dir_name;
use frame337_harness::ToolKind;
use serde::Serialize;
use std::path::Path;

#[derive(Serialize)]
struct BinaryInfo {
    kind: ToolKind,
    env_var: &'static str,
    path: String,
    found: bool,
}

#[derive(Serialize)]
struct InfoOutput {
    cli_version: String,
    platform: String,
    arch: String,
    os_dir: &'static str,
    root: String,
    manifest_path: String,
    manifest_exists: bool,
    timeout_secs: Option<f64>,
    shell_wrapper: bool,
    binaries: Vec<BinaryInfo>,
}

pub fn execute(args: InfoArgs) -> i32 {
    let config = args.common.config();
    let layout = config.layout();

    let requested: [(ToolKind, Option<&Path>); 3] = [
        (ToolKind::Reference, args.reference_bin.as_deref()),
        (ToolKind::ReferenceAc4, args.reference_ac4_bin.as_deref()),
        (ToolKind::Candidate, args.candidate_bin.as_deref()),
    ];
    let binaries = requested
        .iter()
        .map(|(kind, explicit)| {
            let path = config.binary_path(*explicit, *kind);
            BinaryInfo {
                kind: *kind,
                env_var: kind.env_var(),
                found: path.exists(),
                path: path.display().to_string(),
            }
        })
        .collect();

    let manifest_path = layout.manifest_path();
    let info = InfoOutput {
        cli_version: env!("CARGO_PKG_VERSION").to_string(),
        platform: std::env::consts::OS.to_string(),
        arch: std::env::consts::ARCH.to_string(),
        os_dir: os_dir_name(),
        root: layout.root().display().to_string(),
        manifest_exists: manifest_path.is_file(),
        manifest_path: manifest_path.display().to_string(),
        timeout_secs: config.timeout.map(|t| t.as_secs_f64()),
        shell_wrapper: config.shell_wrapper,
        binaries,
    };

    if args.json {
        let written = serde_json::to_string_pretty(&info)
            .map_err(|e| format!("JSON serialization failed: {}", e))
            .and_then(|json| output::write_output(&json, None));
        if let Err(e) = written {
            eprintln!("Error: {}", e);
            return exit_codes::EXECUTION_ERROR;
        }
    } else {
        println!("frame337-harness v{}", info.cli_version);
        println!("Platform: {} ({}), binary dir {}", info.platform, info.arch, info.os_dir);
        println!();
        println!("Corpus root: {}", info.root);
        println!(
            "Manifest: {}{}",
            info.manifest_path,
            if info.manifest_exists { "" } else { " (missing)" }
        );
        match info.timeout_secs {
            Some(secs) => println!("Timeout: {}s", secs),
            None => println!("Timeout: none"),
        }
        println!();
        for binary in &info.binaries {
            println!(
                "{:?} binary: {} [{}] (${})",
                binary.kind,
                binary.path,
                if binary.found { "found" } else { "not found" },
                binary.env_var
            );
        }
    }

    exit_codes::SUCCESS
}
