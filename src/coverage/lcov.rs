//! LCOV format parser

use anyhow::Result;

use super::{CoverageData, CoverageSummary, FileCoverage, Metric};

#[derive(Default)]
struct RecordCounts {
    lines_found: u64,
    lines_hit: u64,
    functions_found: u64,
    functions_hit: u64,
    branches_found: u64,
    branches_hit: u64,
}

impl RecordCounts {
    fn summary(&self) -> CoverageSummary {
        let lines = Metric::new(self.lines_hit, self.lines_found);
        CoverageSummary {
            lines,
            // LCOV has no statement records
            statements: lines,
            functions: Metric::new(self.functions_hit, self.functions_found),
            branches: Metric::new(self.branches_hit, self.branches_found),
        }
    }
}

fn count(value: &str) -> Option<u64> {
    value.trim().parse::<u64>().ok()
}

/// Parse LCOV content from a string
pub fn parse_lcov_string(content: &str) -> Result<CoverageData> {
    let mut files: Vec<FileCoverage> = Vec::new();
    let mut current_file: Option<String> = None;
    let mut counts = RecordCounts::default();

    for line in content.lines() {
        let line = line.trim();

        if let Some(path) = line.strip_prefix("SF:") {
            current_file = Some(path.to_string());
            counts = RecordCounts::default();
        } else if let Some(n) = line.strip_prefix("LF:").and_then(count) {
            counts.lines_found = n;
        } else if let Some(n) = line.strip_prefix("LH:").and_then(count) {
            counts.lines_hit = n;
        } else if let Some(n) = line.strip_prefix("FNF:").and_then(count) {
            counts.functions_found = n;
        } else if let Some(n) = line.strip_prefix("FNH:").and_then(count) {
            counts.functions_hit = n;
        } else if let Some(n) = line.strip_prefix("BRF:").and_then(count) {
            counts.branches_found = n;
        } else if let Some(n) = line.strip_prefix("BRH:").and_then(count) {
            counts.branches_hit = n;
        } else if line == "end_of_record" {
            if let Some(path) = current_file.take() {
                files.push(FileCoverage {
                    path,
                    summary: counts.summary(),
                });
            }
        }
    }

    Ok(CoverageData::from_files(files))
}
