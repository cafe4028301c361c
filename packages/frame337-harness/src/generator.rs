//! Golden-output generation and manifest recording.
//!
//! Planning ([`plan_battery`]) only reads the corpus; execution
//! ([`execute_plan`]) runs the reference framers and appends to the manifest.

use crate::error::{HarnessError, Result};
use crate::layout::{self, CorpusLayout};
use crate::manifest::ManifestWriter;
use crate::tool::FramerTool;
use crate::types::{BitDepth, FormatFamily, SequenceCounter, SourceKind, TestCase, ToolArgs};
use serde::Serialize;
use std::path::Path;

/// One battery entry: every asset of `family`/`source` framed with `args`
#[derive(Debug, Clone, Copy)]
pub struct Scenario {
    pub label: &'static str,
    pub family: FormatFamily,
    pub source: SourceKind,
    pub args: ToolArgs,
    pub output_ext: &'static str,
}

impl Scenario {
    const fn new(
        label: &'static str,
        family: FormatFamily,
        source: SourceKind,
        args: ToolArgs,
        output_ext: &'static str,
    ) -> Self {
        Self {
            label,
            family,
            source,
            args,
            output_ext,
        }
    }

    pub fn input_ext(&self) -> &'static str {
        match self.source {
            SourceKind::Es => self.family.es_extension(),
            SourceKind::Wav => ".wav",
            SourceKind::Pcm | SourceKind::Pcm32 => ".pcm",
        }
    }
}

pub const BATTERY: &[Scenario] = &[
    Scenario::new(
        "Basic Dolby E formatting",
        FormatFamily::DolbyE,
        SourceKind::Es,
        ToolArgs::format(),
        ".wav",
    ),
    Scenario::new(
        "Basic Dolby E deformatting",
        FormatFamily::DolbyE,
        SourceKind::Wav,
        ToolArgs::deformat(),
        ".dde",
    ),
    Scenario::new(
        "Basic AC-3 formatting",
        FormatFamily::Ac3,
        SourceKind::Es,
        ToolArgs::format(),
        ".wav",
    ),
    Scenario::new(
        "Basic AC-3 deformatting",
        FormatFamily::Ac3,
        SourceKind::Wav,
        ToolArgs::deformat(),
        ".ac3",
    ),
    Scenario::new(
        "Basic E-AC-3 formatting",
        FormatFamily::Eac3,
        SourceKind::Es,
        ToolArgs::format(),
        ".wav",
    ),
    Scenario::new(
        "Basic E-AC-3 deformatting",
        FormatFamily::Eac3,
        SourceKind::Wav,
        ToolArgs::deformat(),
        ".ec3",
    ),
    Scenario::new(
        "AC-3 alternate packing",
        FormatFamily::Ac3,
        SourceKind::Es,
        ToolArgs::format().with_alternate_packing(),
        ".wav",
    ),
    Scenario::new(
        "Dolby E deformatting from 24-bit PCM",
        FormatFamily::DolbyE,
        SourceKind::Pcm,
        ToolArgs::deformat().with_bit_depth(BitDepth::B24),
        ".dde",
    ),
    Scenario::new(
        "Dolby E deformatting from 32-bit PCM",
        FormatFamily::DolbyE,
        SourceKind::Pcm32,
        ToolArgs::deformat().with_bit_depth(BitDepth::B32),
        ".dde",
    ),
    Scenario::new(
        "AC-3 deformatting from 16-bit PCM",
        FormatFamily::Ac3,
        SourceKind::Pcm,
        ToolArgs::deformat().with_bit_depth(BitDepth::B16),
        ".ac3",
    ),
    Scenario::new(
        "E-AC-3 deformatting from 16-bit PCM",
        FormatFamily::Eac3,
        SourceKind::Pcm,
        ToolArgs::deformat().with_bit_depth(BitDepth::B16),
        ".ec3",
    ),
    Scenario::new(
        "Basic AC-4 formatting",
        FormatFamily::Ac4,
        SourceKind::Es,
        ToolArgs::format(),
        ".wav",
    ),
    Scenario::new(
        "Basic AC-4 deformatting",
        FormatFamily::Ac4,
        SourceKind::Wav,
        ToolArgs::deformat(),
        ".ac4",
    ),
];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ReferenceTool {
    General,
    Ac4,
}

/// The AC-4 reference binary handles anything with AC-4 on either side
pub fn select_reference(input: &Path, output_ext: &str) -> ReferenceTool {
    let ac4 = FormatFamily::Ac4.es_extension();
    if output_ext == ac4 || layout::dotted_extension(input) == ac4 {
        ReferenceTool::Ac4
    } else {
        ReferenceTool::General
    }
}

/// AC-4 deformat from WAV also gets a record driven by the PCM sibling,
/// because the AC-4 reference tool cannot read PCM itself.
pub fn needs_pcm_companion(input: &Path, output_ext: &str) -> bool {
    output_ext == FormatFamily::Ac4.es_extension() && layout::dotted_extension(input) == ".wav"
}

#[derive(Debug, Clone, Serialize)]
pub struct PlannedCase {
    pub scenario: &'static str,
    pub test_case: TestCase,
    pub tool: ReferenceTool,
    /// False for records that reuse another record's golden output
    pub invoke: bool,
}

/// Walk the battery in order and compute every manifest record
pub fn plan_battery(layout: &CorpusLayout) -> Result<Vec<PlannedCase>> {
    let mut ids = SequenceCounter::new();
    let mut plan = Vec::new();

    for scenario in BATTERY {
        let dir = layout.source_dir(scenario.family, scenario.source);
        let inputs = layout::list_files(&dir, &format!("*{}", scenario.input_ext()))?;
        log::debug!("{}: {} input(s) in {}", scenario.label, inputs.len(), dir.display());

        for input in inputs {
            let id = ids.next_id();
            let golden = layout
                .reference_output_dir()
                .join(layout::case_file_name(id, &input, scenario.output_ext));
            let arguments = scenario.args.to_args();

            plan.push(PlannedCase {
                scenario: scenario.label,
                test_case: TestCase {
                    sequence_id: id,
                    input_path: layout.relative(&input),
                    expected_output_path: layout.relative(&golden),
                    arguments: arguments.clone(),
                },
                tool: select_reference(&input, scenario.output_ext),
                invoke: true,
            });

            if needs_pcm_companion(&input, scenario.output_ext) {
                let pcm = layout
                    .source_dir(FormatFamily::Ac4, SourceKind::Pcm)
                    .join(format!("{}.pcm", layout::file_stem(&input)));
                if !pcm.exists() {
                    log::warn!("PCM companion {} does not exist", pcm.display());
                }
                let mut companion_args = arguments;
                companion_args.push(BitDepth::B16.flag());

                plan.push(PlannedCase {
                    scenario: scenario.label,
                    test_case: TestCase {
                        sequence_id: ids.next_id(),
                        input_path: layout.relative(&pcm),
                        expected_output_path: layout.relative(&golden),
                        arguments: companion_args,
                    },
                    tool: ReferenceTool::General,
                    invoke: false,
                });
            }
        }
    }
    Ok(plan)
}

/// Reference binaries; either may be absent if the corpus does not need it
#[derive(Debug, Clone, Default)]
pub struct ReferenceTools {
    pub general: Option<FramerTool>,
    pub ac4: Option<FramerTool>,
}

impl ReferenceTools {
    pub fn get(&self, which: ReferenceTool) -> Result<&FramerTool> {
        let tool = match which {
            ReferenceTool::General => self.general.as_ref(),
            ReferenceTool::Ac4 => self.ac4.as_ref(),
        };
        tool.ok_or_else(|| {
            HarnessError::BinaryNotFound(format!("{:?} reference framer is not configured", which))
        })
    }
}

/// Clear and recreate `reference_output/`
pub fn reset_reference_output(layout: &CorpusLayout) -> Result<()> {
    layout::reset_dir(&layout.reference_output_dir())
}

/// Produce goldens and append records. Any reference failure is fatal.
pub async fn execute_plan(
    plan: &[PlannedCase],
    tools: &ReferenceTools,
    layout: &CorpusLayout,
    writer: &mut ManifestWriter,
) -> Result<usize> {
    let mut current_scenario = "";
    for planned in plan {
        if planned.scenario != current_scenario {
            current_scenario = planned.scenario;
            log::info!("{}", current_scenario);
        }

        let case = &planned.test_case;
        if planned.invoke {
            let tool = tools.get(planned.tool)?;
            let golden = layout.resolve(&case.expected_output_path);
            tool.invoke_checked(&case.arguments, &layout.resolve(&case.input_path), &golden)
                .await?;
            if !golden.exists() {
                log::warn!("Reference framer produced no {}", golden.display());
            }
        }
        writer.append(case)?;
    }
    Ok(writer.records_written())
}

/// Reset `reference_output/`, then plan, execute and record the full battery
pub async fn generate_references(
    layout: &CorpusLayout,
    tools: &ReferenceTools,
    manifest_path: &Path,
) -> Result<Vec<PlannedCase>> {
    reset_reference_output(layout)?;
    let plan = plan_battery(layout)?;
    let mut writer = ManifestWriter::create(manifest_path)?;
    execute_plan(&plan, tools, layout, &mut writer).await?;
    Ok(plan)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use std::path::PathBuf;

    fn touch(layout: &CorpusLayout, family: FormatFamily, kind: SourceKind, name: &str) {
        let dir = layout.source_dir(family, kind);
        fs::create_dir_all(&dir).unwrap();
        fs::write(dir.join(name), b"asset").unwrap();
    }

    #[test]
    fn test_battery_covers_required_scenarios() {
        assert_eq!(BATTERY.len(), 13);
        let pcm_depths: Vec<_> = BATTERY
            .iter()
            .filter(|s| matches!(s.source, SourceKind::Pcm | SourceKind::Pcm32))
            .map(|s| (s.family, s.args.bit_depth))
            .collect();
        assert_eq!(
            pcm_depths,
            vec![
                (FormatFamily::DolbyE, Some(BitDepth::B24)),
                (FormatFamily::DolbyE, Some(BitDepth::B32)),
                (FormatFamily::Ac3, Some(BitDepth::B16)),
                (FormatFamily::Eac3, Some(BitDepth::B16)),
            ]
        );
        assert!(BATTERY
            .iter()
            .any(|s| s.family == FormatFamily::Ac3 && s.args.alternate_packing));
    }

    #[test]
    fn test_select_reference() {
        assert_eq!(
            select_reference(Path::new("sources/ac4_es/x.ac4"), ".wav"),
            ReferenceTool::Ac4
        );
        assert_eq!(
            select_reference(Path::new("sources/ac4_wav/x.wav"), ".ac4"),
            ReferenceTool::Ac4
        );
        assert_eq!(
            select_reference(Path::new("sources/dd_es/x.ac3"), ".wav"),
            ReferenceTool::General
        );
    }

    #[test]
    fn test_plan_numbering_and_golden_names() {
        let tmp = tempfile::tempdir().unwrap();
        let layout = CorpusLayout::new(tmp.path());
        touch(&layout, FormatFamily::DolbyE, SourceKind::Es, "a.dde");
        touch(&layout, FormatFamily::DolbyE, SourceKind::Wav, "a.wav");
        touch(&layout, FormatFamily::Eac3, SourceKind::Wav, "c.wav");
        touch(&layout, FormatFamily::DolbyE, SourceKind::Pcm, "sample1.pcm");

        let plan = plan_battery(&layout).unwrap();
        let ids: Vec<u32> = plan.iter().map(|p| p.test_case.sequence_id).collect();
        assert_eq!(ids, vec![1, 2, 3, 4]);

        let last = &plan[3].test_case;
        assert_eq!(last.input_path, PathBuf::from("sources/dde_pcm/sample1.pcm"));
        assert_eq!(
            last.expected_output_path,
            PathBuf::from("reference_output/tid004_sample1.dde")
        );
        assert_eq!(last.arguments, vec!["-d", "-b24"]);
    }

    #[test]
    fn test_alternate_packing_reuses_ac3_elementary_streams() {
        let tmp = tempfile::tempdir().unwrap();
        let layout = CorpusLayout::new(tmp.path());
        touch(&layout, FormatFamily::Ac3, SourceKind::Es, "x.ac3");

        let plan = plan_battery(&layout).unwrap();
        assert_eq!(plan.len(), 2);
        assert!(plan[0].test_case.arguments.is_empty());
        assert_eq!(plan[1].test_case.arguments, vec!["-a"]);
        assert_eq!(
            plan[1].test_case.expected_output_path,
            PathBuf::from("reference_output/tid002_x.wav")
        );
    }

    #[test]
    fn test_ac4_companion_shares_golden() {
        let tmp = tempfile::tempdir().unwrap();
        let layout = CorpusLayout::new(tmp.path());
        touch(&layout, FormatFamily::Ac4, SourceKind::Es, "s.ac4");
        touch(&layout, FormatFamily::Ac4, SourceKind::Wav, "s.wav");
        touch(&layout, FormatFamily::Ac4, SourceKind::Pcm, "s.pcm");

        let plan = plan_battery(&layout).unwrap();
        assert_eq!(plan.len(), 3);

        let format = &plan[0];
        assert_eq!(format.tool, ReferenceTool::Ac4);
        assert!(format.invoke);

        let wav = &plan[1];
        let pcm = &plan[2];
        assert_eq!(wav.tool, ReferenceTool::Ac4);
        assert!(!pcm.invoke);
        assert_eq!(
            wav.test_case.expected_output_path,
            pcm.test_case.expected_output_path
        );
        assert_eq!(pcm.test_case.input_path, PathBuf::from("sources/ac4_pcm/s.pcm"));
        assert_eq!(pcm.test_case.arguments, vec!["-d", "-b16"]);
        assert_eq!(wav.test_case.sequence_id, 2);
        assert_eq!(pcm.test_case.sequence_id, 3);
    }

    #[test]
    fn test_missing_reference_tool_is_reported() {
        let tools = ReferenceTools::default();
        assert!(matches!(
            tools.get(ReferenceTool::Ac4),
            Err(HarnessError::BinaryNotFound(_))
        ));
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_reference_failure_is_fatal() {
        let tmp = tempfile::tempdir().unwrap();
        let layout = CorpusLayout::new(tmp.path());
        touch(&layout, FormatFamily::Ac3, SourceKind::Es, "x.ac3");
        let script = tmp.path().join("ref.sh");
        fs::write(&script, "exit 2\n").unwrap();
        let tools = ReferenceTools {
            general: Some(FramerTool::new(&script).unwrap().with_shell_wrapper(true)),
            ac4: None,
        };

        let manifest = tmp.path().join("run_test_cases.txt");
        let err = generate_references(&layout, &tools, &manifest)
            .await
            .unwrap_err();
        assert!(matches!(err, HarnessError::ToolInvocation { .. }));
        assert_eq!(fs::read_to_string(&manifest).unwrap(), "");
    }
}
