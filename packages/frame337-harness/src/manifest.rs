//! Line-oriented manifest of recorded cases.
//!
//! Each line is `<input_path> <expected_output_path> [arg ...]`, fields
//! separated by whitespace. Paths containing whitespace are not supported.

use crate::error::{HarnessError, Result};
use crate::types::TestCase;
use serde::Serialize;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

/// A well-formed manifest line
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ManifestRecord {
    pub input_path: PathBuf,
    pub expected_output_path: PathBuf,
    pub arguments: Vec<String>,
}

impl ManifestRecord {
    pub fn into_test_case(self, sequence_id: u32) -> TestCase {
        TestCase {
            sequence_id,
            input_path: self.input_path,
            expected_output_path: self.expected_output_path,
            arguments: self.arguments,
        }
    }
}

/// A line with fewer than two fields
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CorruptRecord {
    /// 1-based
    pub line_number: usize,
    pub content: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ManifestEntry {
    Record(ManifestRecord),
    Corrupt(CorruptRecord),
}

pub fn parse_line(line_number: usize, line: &str) -> ManifestEntry {
    let fields: Vec<&str> = line.split_whitespace().collect();
    if fields.len() < 2 {
        return ManifestEntry::Corrupt(CorruptRecord {
            line_number,
            content: line.to_string(),
        });
    }
    ManifestEntry::Record(ManifestRecord {
        input_path: PathBuf::from(fields[0]),
        expected_output_path: PathBuf::from(fields[1]),
        arguments: fields[2..].iter().map(|s| s.to_string()).collect(),
    })
}

pub fn parse_manifest(content: &str) -> Vec<ManifestEntry> {
    content
        .lines()
        .enumerate()
        .map(|(i, line)| parse_line(i + 1, line))
        .collect()
}

pub fn read_manifest(path: &Path) -> Result<Vec<ManifestEntry>> {
    let content = std::fs::read_to_string(path).map_err(|source| HarnessError::ManifestIo {
        path: path.display().to_string(),
        source,
    })?;
    Ok(parse_manifest(&content))
}

pub fn format_record(case: &TestCase) -> String {
    let mut line = format!(
        "{} {}",
        case.input_path.display(),
        case.expected_output_path.display()
    );
    if !case.arguments.is_empty() {
        line.push(' ');
        line.push_str(&case.argument_string());
    }
    line
}

/// Append-only manifest writer; every record is flushed as it is written
pub struct ManifestWriter {
    path: PathBuf,
    writer: BufWriter<File>,
    records: usize,
}

impl ManifestWriter {
    /// Create (or truncate) the manifest file
    pub fn create<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref().to_path_buf();
        let file = File::create(&path).map_err(|source| HarnessError::ManifestIo {
            path: path.display().to_string(),
            source,
        })?;
        Ok(Self {
            path,
            writer: BufWriter::new(file),
            records: 0,
        })
    }

    pub fn append(&mut self, case: &TestCase) -> Result<()> {
        let line = format_record(case);
        writeln!(self.writer, "{}", line)
            .and_then(|_| self.writer.flush())
            .map_err(|source| HarnessError::ManifestIo {
                path: self.path.display().to_string(),
                source,
            })?;
        self.records += 1;
        log::debug!("Manifest += {}", line);
        Ok(())
    }

    pub fn records_written(&self) -> usize {
        self.records
    }
}
