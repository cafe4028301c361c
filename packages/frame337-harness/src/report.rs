use crate::manifest::CorruptRecord;
use crate::types::{CaseKind, CaseResult};
use serde::Serialize;
use uuid::Uuid;

/// Accumulated outcome of one test run
#[derive(Debug, Clone, Serialize)]
pub struct RunReport {
    pub id: String,
    pub created_at: String,
    pub total: usize,
    pub passed: usize,
    pub failed: usize,
    pub corrupt_records: Vec<CorruptRecord>,
    pub cases: Vec<CaseResult>,
}

impl RunReport {
    pub fn new() -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            created_at: chrono::Utc::now().to_rfc3339(),
            total: 0,
            passed: 0,
            failed: 0,
            corrupt_records: Vec::new(),
            cases: Vec::new(),
        }
    }

    pub fn record(&mut self, result: CaseResult) {
        self.total += 1;
        if result.passed() {
            self.passed += 1;
        } else {
            self.failed += 1;
        }
        self.cases.push(result);
    }

    pub fn record_corrupt(&mut self, corrupt: CorruptRecord) {
        self.corrupt_records.push(corrupt);
    }

    pub fn all_passed(&self) -> bool {
        self.failed == 0
    }

    pub fn failures(&self) -> impl Iterator<Item = &CaseResult> {
        self.cases.iter().filter(|c| !c.passed())
    }

    pub fn count_kind(&self, kind: CaseKind) -> usize {
        self.cases.iter().filter(|c| c.kind == kind).count()
    }

    pub fn render_text(&self) -> String {
        let mut text = format!(
            "Number of tests completed: {}\n\
             Number of tests passed: {}\n\
             Number of tests failed: {}\n",
            self.total, self.passed, self.failed
        );
        if !self.corrupt_records.is_empty() {
            text.push_str(&format!(
                "Number of corrupt manifest lines: {}\n",
                self.corrupt_records.len()
            ));
        }
        text
    }
}

impl Default for RunReport {
    fn default() -> Self {
        Self::new()
    }
}
