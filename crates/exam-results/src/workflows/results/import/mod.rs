mod parser;

use std::collections::HashMap;
use std::io::Read;
use std::path::Path;

use tracing::info;

use super::aggregate::{CandidateResults, SubjectResult};
use crate::workflows::entries::ResultStatus;

#[derive(Debug)]
pub enum ResultsImportError {
    Io(std::io::Error),
    Csv(csv::Error),
    InvalidStatus { line: u64, value: String },
}

impl std::fmt::Display for ResultsImportError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ResultsImportError::Io(err) => write!(f, "failed to read results export: {}", err),
            ResultsImportError::Csv(err) => write!(f, "invalid results CSV data: {}", err),
            ResultsImportError::InvalidStatus { line, value } => write!(
                f,
                "line {}: unknown result status '{}' (expected Pending, Pending Review, Validated, or Conflict)",
                line, value
            ),
        }
    }
}

impl std::error::Error for ResultsImportError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ResultsImportError::Io(err) => Some(err),
            ResultsImportError::Csv(err) => Some(err),
            ResultsImportError::InvalidStatus { .. } => None,
        }
    }
}

impl From<std::io::Error> for ResultsImportError {
    fn from(err: std::io::Error) -> Self {
        Self::Io(err)
    }
}

impl From<csv::Error> for ResultsImportError {
    fn from(err: csv::Error) -> Self {
        Self::Csv(err)
    }
}

/// Reads exam-board result exports into candidate-centric records.
pub struct ResultsImporter;

impl ResultsImporter {
    pub fn from_path<P: AsRef<Path>>(path: P) -> Result<Vec<CandidateResults>, ResultsImportError> {
        let file = std::fs::File::open(path)?;
        Self::from_reader(file)
    }

    /// Rows are grouped by student id in first-seen order.
    pub fn from_reader<R: Read>(reader: R) -> Result<Vec<CandidateResults>, ResultsImportError> {
        let mut records: Vec<CandidateResults> = Vec::new();
        let mut positions: HashMap<String, usize> = HashMap::new();
        let mut row_count = 0usize;

        for row in parser::parse_rows(reader)? {
            row_count += 1;
            let status = match row.status.as_deref() {
                None => ResultStatus::Pending,
                Some(raw) => {
                    ResultStatus::from_label(raw).ok_or_else(|| ResultsImportError::InvalidStatus {
                        line: row.line,
                        value: raw.to_string(),
                    })?
                }
            };

            let result = SubjectResult {
                subject: row.subject,
                code: row.code,
                grade: row.grade,
                points: row.points,
                status,
                organization: row.board,
            };

            match positions.get(&row.student_id).copied() {
                Some(position) => records[position].results.push(result),
                None => {
                    positions.insert(row.student_id.clone(), records.len());
                    records.push(CandidateResults {
                        student_key: row.student_id,
                        name: row.name,
                        year_group: row.year_group,
                        reg_group: None,
                        results: vec![result],
                        status: ResultStatus::Validated,
                    });
                }
            }
        }

        for record in &mut records {
            record.refresh_status();
        }

        info!(
            rows = row_count,
            candidates = records.len(),
            "imported external results"
        );
        Ok(records)
    }
}
