//! Asset derivation: expands seed PCM into elementary streams and WAV
//! carriers by running the reference framer twice per family.

use crate::config::FailurePolicy;
use crate::error::{HarnessError, Result};
use crate::layout::{self, CorpusLayout};
use crate::tool::FramerTool;
use crate::types::{AssetRole, BitDepth, FormatFamily, SourceKind, ToolArgs};
use serde::Serialize;
use std::path::{Path, PathBuf};

/// Families derived from seed PCM, with the seed's word size
pub const DERIVED_FAMILIES: [(FormatFamily, BitDepth); 3] = [
    (FormatFamily::DolbyE, BitDepth::B24),
    (FormatFamily::Ac3, BitDepth::B16),
    (FormatFamily::Eac3, BitDepth::B16),
];

/// One batch conversion: every `*<input_ext>` in `input_dir` into `output_dir`
#[derive(Debug, Clone, Serialize)]
pub struct DerivationStep {
    pub family: FormatFamily,
    pub role: AssetRole,
    pub input_dir: PathBuf,
    pub input_ext: String,
    pub output_dir: PathBuf,
    pub output_ext: String,
    pub args: ToolArgs,
}

#[derive(Debug, Clone, Serialize)]
pub struct DerivationFailure {
    pub input: PathBuf,
    pub output: PathBuf,
    pub reason: String,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct DerivationSummary {
    pub created: Vec<PathBuf>,
    pub failed: Vec<DerivationFailure>,
}

impl DerivationSummary {
    pub fn is_clean(&self) -> bool {
        self.failed.is_empty()
    }
}

/// Clear and recreate the derived `es` and `wav` directories
pub fn reset_derived_dirs(layout: &CorpusLayout) -> Result<()> {
    for (family, _) in DERIVED_FAMILIES {
        layout::reset_dir(&layout.source_dir(family, SourceKind::Es))?;
        layout::reset_dir(&layout.source_dir(family, SourceKind::Wav))?;
    }
    Ok(())
}

/// PCM -> elementary for every family first, then elementary -> WAV
pub fn derivation_plan(layout: &CorpusLayout) -> Vec<DerivationStep> {
    let to_elementary = DERIVED_FAMILIES.iter().map(|&(family, depth)| DerivationStep {
        family,
        role: AssetRole::DerivedElementary,
        input_dir: layout.source_dir(family, SourceKind::Pcm),
        input_ext: ".pcm".to_string(),
        output_dir: layout.source_dir(family, SourceKind::Es),
        output_ext: family.es_extension().to_string(),
        args: ToolArgs::deformat().with_bit_depth(depth),
    });
    let to_wav = DERIVED_FAMILIES.iter().map(|&(family, _)| DerivationStep {
        family,
        role: AssetRole::DerivedWav,
        input_dir: layout.source_dir(family, SourceKind::Es),
        input_ext: family.es_extension().to_string(),
        output_dir: layout.source_dir(family, SourceKind::Wav),
        output_ext: ".wav".to_string(),
        args: ToolArgs::format(),
    });
    to_elementary.chain(to_wav).collect()
}

fn output_is_populated(path: &Path) -> bool {
    std::fs::metadata(path)
        .map(|m| m.is_file() && m.len() > 0)
        .unwrap_or(false)
}

/// Run one derivation step, appending to `summary`
pub async fn derive(
    tool: &FramerTool,
    step: &DerivationStep,
    policy: FailurePolicy,
    summary: &mut DerivationSummary,
) -> Result<()> {
    let inputs = layout::list_files(&step.input_dir, &format!("*{}", step.input_ext))?;
    if inputs.is_empty() {
        log::warn!(
            "No {} files in {}",
            step.input_ext,
            step.input_dir.display()
        );
        return Ok(());
    }
    std::fs::create_dir_all(&step.output_dir)?;

    let args = step.args.to_args();
    for input in inputs {
        let output = step
            .output_dir
            .join(format!("{}{}", layout::file_stem(&input), step.output_ext));

        let reason = match tool.invoke(&args, &input, &output).await {
            Ok(out) if !out.success => Some(format!(
                "framer exited with status {}",
                out.exit_code
                    .map(|c| c.to_string())
                    .unwrap_or_else(|| "signal".to_string())
            )),
            Ok(_) if !output_is_populated(&output) => {
                Some("no output or empty output file".to_string())
            }
            Ok(_) => None,
            Err(e) => Some(e.to_string()),
        };

        match reason {
            None => {
                log::info!("Created {}", output.display());
                summary.created.push(output);
            }
            Some(reason) => {
                log::error!("Creation of {} failed: {}", output.display(), reason);
                let message = format!("{} -> {}: {}", input.display(), output.display(), reason);
                summary.failed.push(DerivationFailure {
                    input,
                    output,
                    reason,
                });
                if policy == FailurePolicy::Abort {
                    return Err(HarnessError::DerivationFailed(message));
                }
            }
        }
    }
    Ok(())
}

/// Run the whole plan. Does not reset directories.
pub async fn derive_all(
    tool: &FramerTool,
    layout: &CorpusLayout,
    policy: FailurePolicy,
) -> Result<DerivationSummary> {
    let mut summary = DerivationSummary::default();
    for step in derivation_plan(layout) {
        log::info!(
            "Deriving {} {:?} assets from {}",
            step.family,
            step.role,
            step.input_dir.display()
        );
        derive(tool, &step, policy, &mut summary).await?;
    }
    Ok(summary)
}
