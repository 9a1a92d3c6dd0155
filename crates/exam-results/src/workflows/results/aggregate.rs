use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use super::grade::GradeTier;
use super::rollup::StatusRollup;
use crate::workflows::catalog::ReferenceData;
use crate::workflows::entries::{Entry, ResultStatus};

/// One subject line on a candidate's results record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubjectResult {
    pub subject: String,
    pub code: String,
    pub grade: String,
    pub points: u32,
    pub status: ResultStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub organization: Option<String>,
}

impl SubjectResult {
    pub fn tier(&self) -> GradeTier {
        GradeTier::classify(&self.grade)
    }
}

/// Candidate-centric view merging every result that names the candidate.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CandidateResults {
    pub student_key: String,
    pub name: String,
    pub year_group: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reg_group: Option<String>,
    pub results: Vec<SubjectResult>,
    pub status: ResultStatus,
}

impl CandidateResults {
    pub fn refresh_status(&mut self) {
        self.status = StatusRollup::over(self.results.iter().map(|result| result.status));
    }

    pub fn total_points(&self) -> u32 {
        self.results.iter().map(|result| result.points).sum()
    }
}

/// Build one record per roster candidate that appears in at least one entry.
/// Records follow roster order; each record's results follow entry order.
pub fn aggregate_by_candidate(entries: &[Entry], reference: &ReferenceData) -> Vec<CandidateResults> {
    let mut records = Vec::new();

    for candidate in &reference.roster {
        let results: Vec<SubjectResult> = entries
            .iter()
            .filter_map(|entry| {
                let result = entry.result(candidate.id)?;
                let syllabus = reference.syllabus(&entry.syllabus_code);
                Some(SubjectResult {
                    subject: syllabus
                        .map(|syllabus| syllabus.title.clone())
                        .unwrap_or_else(|| entry.syllabus_code.clone()),
                    code: entry.option_code.clone(),
                    grade: result.grade.clone(),
                    points: result.points,
                    status: result.status,
                    organization: syllabus.map(|syllabus| syllabus.organization.clone()),
                })
            })
            .collect();

        if results.is_empty() {
            continue;
        }

        let mut record = CandidateResults {
            student_key: candidate.student_key(),
            name: candidate.name.clone(),
            year_group: candidate.year_group.clone(),
            reg_group: Some(candidate.reg_group.clone()),
            results,
            status: ResultStatus::Validated,
        };
        record.refresh_status();
        records.push(record);
    }

    records
}

/// Append a second result channel onto the first, keyed by student identifier.
pub fn merge_channels(
    primary: Vec<CandidateResults>,
    secondary: Vec<CandidateResults>,
) -> Vec<CandidateResults> {
    if secondary.is_empty() {
        return primary;
    }

    let mut merged = primary;
    let mut index: HashMap<String, usize> = merged
        .iter()
        .enumerate()
        .map(|(position, record)| (record.student_key.clone(), position))
        .collect();

    for record in secondary {
        let existing = index.get(&record.student_key).copied();
        match existing {
            Some(position) => {
                let target = &mut merged[position];
                target.results.extend(record.results);
                if target.reg_group.is_none() {
                    target.reg_group = record.reg_group;
                }
                target.refresh_status();
            }
            None => {
                index.insert(record.student_key.clone(), merged.len());
                let mut record = record;
                record.refresh_status();
                merged.push(record);
            }
        }
    }

    merged
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(key: &str, statuses: &[ResultStatus]) -> CandidateResults {
        let results: Vec<SubjectResult> = statuses
            .iter()
            .enumerate()
            .map(|(index, status)| SubjectResult {
                subject: format!("Subject {index}"),
                code: format!("S{index}"),
                grade: "7".to_string(),
                points: 7,
                status: *status,
                organization: None,
            })
            .collect();
        let mut record = CandidateResults {
            student_key: key.to_string(),
            name: format!("Student {key}"),
            year_group: "Year 13".to_string(),
            reg_group: None,
            results,
            status: ResultStatus::Validated,
        };
        record.refresh_status();
        record
    }

    #[test]
    fn merging_empty_secondary_is_identity() {
        let primary = vec![
            record("12345", &[ResultStatus::Validated]),
            record("12346", &[ResultStatus::PendingReview]),
        ];
        assert_eq!(merge_channels(primary.clone(), Vec::new()), primary);
    }

    #[test]
    fn merge_appends_results_for_shared_keys() {
        let primary = vec![record("12345", &[ResultStatus::Validated])];
        let secondary = vec![
            record("12345", &[ResultStatus::Conflict, ResultStatus::Validated]),
            record("99999", &[ResultStatus::Validated]),
        ];

        let merged = merge_channels(primary, secondary);
        assert_eq!(merged.len(), 2);
        assert_eq!(merged[0].results.len(), 3);
        assert_eq!(merged[0].status, ResultStatus::Conflict);
        assert_eq!(merged[1].student_key, "99999");
    }

    #[test]
    fn total_points_sums_results() {
        let record = record("1", &[ResultStatus::Validated, ResultStatus::Validated]);
        assert_eq!(record.total_points(), 14);
    }
}
