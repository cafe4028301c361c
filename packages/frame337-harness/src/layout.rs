//! Fixed directory layout of a conformance corpus.
//!
//! ```text
//! <root>/
//!   run_test_cases.txt
//!   sources/<family>_{wav,es,pcm,pcm32}/
//!   sources/error_es/
//!   reference_output/
//!   dut_output/
//! ```

use crate::error::{HarnessError, Result};
use crate::types::{FormatFamily, SourceKind};
use serde::Serialize;
use std::path::{Path, PathBuf};

pub const SOURCES_DIR: &str = "sources";
pub const ERROR_ES_DIR: &str = "error_es";
pub const REFERENCE_OUTPUT_DIR: &str = "reference_output";
pub const DUT_OUTPUT_DIR: &str = "dut_output";
pub const MANIFEST_FILE_NAME: &str = "run_test_cases.txt";

#[derive(Debug, Clone, Serialize)]
pub struct CorpusLayout {
    root: PathBuf,
}

impl CorpusLayout {
    pub fn new<P: AsRef<Path>>(root: P) -> Self {
        Self {
            root: root.as_ref().to_path_buf(),
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn sources_dir(&self) -> PathBuf {
        self.root.join(SOURCES_DIR)
    }

    pub fn source_dir(&self, family: FormatFamily, kind: SourceKind) -> PathBuf {
        self.sources_dir()
            .join(format!("{}_{}", family.dir_prefix(), kind.dir_suffix()))
    }

    pub fn error_es_dir(&self) -> PathBuf {
        self.sources_dir().join(ERROR_ES_DIR)
    }

    pub fn reference_output_dir(&self) -> PathBuf {
        self.root.join(REFERENCE_OUTPUT_DIR)
    }

    pub fn dut_output_dir(&self) -> PathBuf {
        self.root.join(DUT_OUTPUT_DIR)
    }

    pub fn manifest_path(&self) -> PathBuf {
        self.root.join(MANIFEST_FILE_NAME)
    }

    /// Path as recorded in the manifest: relative to the root when possible
    pub fn relative(&self, path: &Path) -> PathBuf {
        path.strip_prefix(&self.root)
            .map(Path::to_path_buf)
            .unwrap_or_else(|_| path.to_path_buf())
    }

    /// Resolve a manifest path against the root; absolute paths pass through
    pub fn resolve(&self, path: &Path) -> PathBuf {
        if path.is_absolute() {
            path.to_path_buf()
        } else {
            self.root.join(path)
        }
    }
}

/// `tid<NNN>_<stem><ext>` where `ext` includes its leading dot (or is empty)
pub fn case_file_name(sequence_id: u32, input: &Path, ext: &str) -> String {
    format!("tid{:03}_{}{}", sequence_id, file_stem(input), ext)
}

pub fn file_stem(path: &Path) -> String {
    path.file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default()
}

/// Extension of `path` with a leading dot, or an empty string
pub fn dotted_extension(path: &Path) -> String {
    path.extension()
        .map(|e| format!(".{}", e.to_string_lossy()))
        .unwrap_or_default()
}

/// Remove `dir` recursively if present, then recreate it empty
pub fn reset_dir(dir: &Path) -> Result<()> {
    if dir.exists() {
        std::fs::remove_dir_all(dir)?;
    }
    std::fs::create_dir_all(dir)?;
    log::info!("Reset directory {}", dir.display());
    Ok(())
}

/// Files in `dir` matching `pattern` (e.g. `*.pcm`), sorted
pub fn list_files(dir: &Path, pattern: &str) -> Result<Vec<PathBuf>> {
    let dir_str = dir.to_str().ok_or_else(|| {
        HarnessError::InvalidParameter(format!("Non UTF-8 directory: {}", dir.display()))
    })?;
    let full = format!("{}/{}", glob::Pattern::escape(dir_str), pattern);

    let mut files = Vec::new();
    for entry in glob::glob(&full)? {
        match entry {
            Ok(path) => {
                if path.is_file() {
                    files.push(path);
                }
            }
            Err(e) => log::warn!("glob error: {}", e),
        }
    }
    files.sort();
    Ok(files)
}
