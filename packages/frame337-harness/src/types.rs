use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;

/// Compressed audio format families handled by the framer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FormatFamily {
    DolbyE,
    Ac3,
    Eac3,
    Ac4,
}

impl FormatFamily {
    /// Prefix of the family's corpus directories (`sources/<prefix>_<kind>`)
    pub fn dir_prefix(self) -> &'static str {
        match self {
            Self::DolbyE => "dde",
            Self::Ac3 => "dd",
            Self::Eac3 => "ddplus",
            Self::Ac4 => "ac4",
        }
    }

    /// Extension of the family's elementary streams, including the dot
    pub fn es_extension(self) -> &'static str {
        match self {
            Self::DolbyE => ".dde",
            Self::Ac3 => ".ac3",
            Self::Eac3 => ".ec3",
            Self::Ac4 => ".ac4",
        }
    }

    pub fn display_name(self) -> &'static str {
        match self {
            Self::DolbyE => "Dolby E",
            Self::Ac3 => "AC-3",
            Self::Eac3 => "E-AC-3",
            Self::Ac4 => "AC-4",
        }
    }
}

impl fmt::Display for FormatFamily {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.display_name())
    }
}

/// Corpus sub-directory kind for a family
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SourceKind {
    Wav,
    Es,
    Pcm,
    /// 32-bit PCM seeds (Dolby E only)
    Pcm32,
}

impl SourceKind {
    pub fn dir_suffix(self) -> &'static str {
        match self {
            Self::Wav => "wav",
            Self::Es => "es",
            Self::Pcm => "pcm",
            Self::Pcm32 => "pcm32",
        }
    }
}

/// Where an asset comes from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AssetRole {
    DerivedElementary,
    DerivedWav,
}

/// PCM word size passed to the framer in deformat direction
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum BitDepth {
    B16,
    B24,
    B32,
}

impl BitDepth {
    pub fn bits(self) -> u8 {
        match self {
            Self::B16 => 16,
            Self::B24 => 24,
            Self::B32 => 32,
        }
    }

    pub fn flag(self) -> String {
        format!("-b{}", self.bits())
    }
}

/// Typed framer flags. Renders in the order `-d`, `-a`, `-bNN`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ToolArgs {
    pub deformat: bool,
    pub alternate_packing: bool,
    pub bit_depth: Option<BitDepth>,
}

impl ToolArgs {
    /// Wrap direction (elementary stream -> PCM carrier)
    pub const fn format() -> Self {
        Self {
            deformat: false,
            alternate_packing: false,
            bit_depth: None,
        }
    }

    /// Unwrap direction (PCM carrier -> elementary stream)
    pub const fn deformat() -> Self {
        Self {
            deformat: true,
            alternate_packing: false,
            bit_depth: None,
        }
    }

    pub const fn with_alternate_packing(mut self) -> Self {
        self.alternate_packing = true;
        self
    }

    pub const fn with_bit_depth(mut self, depth: BitDepth) -> Self {
        self.bit_depth = Some(depth);
        self
    }

    pub fn to_args(&self) -> Vec<String> {
        let mut args = Vec::new();
        if self.deformat {
            args.push("-d".to_string());
        }
        if self.alternate_packing {
            args.push("-a".to_string());
        }
        if let Some(depth) = self.bit_depth {
            args.push(depth.flag());
        }
        args
    }
}

/// One recorded conformance case
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TestCase {
    pub sequence_id: u32,
    pub input_path: PathBuf,
    pub expected_output_path: PathBuf,
    /// Framer flags replayed verbatim by the candidate run
    pub arguments: Vec<String>,
}

impl TestCase {
    pub fn argument_string(&self) -> String {
        self.arguments.join(" ")
    }
}

/// Hands out strictly increasing sequence ids starting at 1
#[derive(Debug, Clone)]
pub struct SequenceCounter {
    next: u32,
}

impl SequenceCounter {
    pub fn new() -> Self {
        Self { next: 1 }
    }

    pub fn next_id(&mut self) -> u32 {
        let id = self.next;
        self.next += 1;
        id
    }
}

impl Default for SequenceCounter {
    fn default() -> Self {
        Self::new()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CaseKind {
    /// Manifest record replayed against the candidate
    Replay,
    /// Malformed input the candidate must reject
    Negative,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CaseOutcome {
    Pass,
    Fail,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FailureKind {
    OutputMismatch,
    CandidateCrash,
    CandidateTimeout,
    NegativeCaseViolation,
}

/// Outcome of one executed case
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CaseResult {
    pub sequence_id: u32,
    pub kind: CaseKind,
    pub input_path: PathBuf,
    pub output_path: PathBuf,
    pub outcome: CaseOutcome,
    pub failure: Option<FailureKind>,
    pub detail: Option<String>,
}

impl CaseResult {
    pub fn pass(sequence_id: u32, kind: CaseKind, input_path: PathBuf, output_path: PathBuf) -> Self {
        Self {
            sequence_id,
            kind,
            input_path,
            output_path,
            outcome: CaseOutcome::Pass,
            failure: None,
            detail: None,
        }
    }

    pub fn fail(
        sequence_id: u32,
        kind: CaseKind,
        input_path: PathBuf,
        output_path: PathBuf,
        failure: FailureKind,
        detail: impl Into<String>,
    ) -> Self {
        Self {
            sequence_id,
            kind,
            input_path,
            output_path,
            outcome: CaseOutcome::Fail,
            failure: Some(failure),
            detail: Some(detail.into()),
        }
    }

    pub fn passed(&self) -> bool {
        self.outcome == CaseOutcome::Pass
    }
}
