use serde::{Deserialize, Serialize};

use super::aggregate::CandidateResults;
use crate::workflows::entries::ResultStatus;

/// Browse filters for the candidate results list.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct ResultsQuery {
    #[serde(default)]
    pub search: Option<String>,
    #[serde(default, deserialize_with = "deserialize_status_filter")]
    pub status: Option<ResultStatus>,
    #[serde(default)]
    pub subject: Option<String>,
}

impl ResultsQuery {
    pub fn matches(&self, record: &CandidateResults) -> bool {
        let matches_search = match self.search.as_deref().map(str::trim) {
            None | Some("") => true,
            Some(term) => {
                record.name.to_lowercase().contains(&term.to_lowercase())
                    || record.student_key.contains(term)
            }
        };
        let matches_status = self.status.map_or(true, |status| record.status == status);
        let matches_subject = match self.subject.as_deref().map(str::trim) {
            None | Some("") => true,
            Some(subject) => record
                .results
                .iter()
                .any(|result| result.subject.eq_ignore_ascii_case(subject)),
        };

        matches_search && matches_status && matches_subject
    }

    pub fn apply<'a>(&self, records: &'a [CandidateResults]) -> Vec<&'a CandidateResults> {
        records.iter().filter(|record| self.matches(record)).collect()
    }
}

/// "all" (or an empty value) means no status filter.
fn deserialize_status_filter<'de, D>(deserializer: D) -> Result<Option<ResultStatus>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let raw = Option::<String>::deserialize(deserializer)?;
    match raw.as_deref().map(str::trim) {
        None | Some("") => Ok(None),
        Some(value) if value.eq_ignore_ascii_case("all") => Ok(None),
        Some(value) => ResultStatus::from_label(value)
            .map(Some)
            .ok_or_else(|| serde::de::Error::custom(format!("unknown result status '{value}'"))),
    }
}

/// Headline counts for the results import overview.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct ResultsOverview {
    pub candidates: usize,
    pub results: usize,
    pub validated: usize,
    pub pending_review: usize,
    pub conflicts: usize,
    pub pending: usize,
}

impl ResultsOverview {
    pub fn from_records(records: &[CandidateResults]) -> Self {
        let mut overview = Self {
            candidates: records.len(),
            ..Self::default()
        };

        for result in records.iter().flat_map(|record| record.results.iter()) {
            overview.results += 1;
            match result.status {
                ResultStatus::Validated => overview.validated += 1,
                ResultStatus::PendingReview => overview.pending_review += 1,
                ResultStatus::Conflict => overview.conflicts += 1,
                ResultStatus::Pending => overview.pending += 1,
            }
        }

        overview
    }

    /// Share of results already validated, in percent.
    pub fn validated_pct(&self) -> f32 {
        if self.results == 0 {
            return 0.0;
        }
        self.validated as f32 / self.results as f32 * 100.0
    }
}

/// Records whose rolled-up status still needs an administrator's attention.
pub fn validation_queue(records: &[CandidateResults]) -> Vec<&CandidateResults> {
    records
        .iter()
        .filter(|record| record.status != ResultStatus::Validated)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::workflows::results::SubjectResult;

    fn subject(name: &str, status: ResultStatus) -> SubjectResult {
        SubjectResult {
            subject: name.to_string(),
            code: name.to_uppercase(),
            grade: "A".to_string(),
            points: 50,
            status,
            organization: None,
        }
    }

    fn records() -> Vec<CandidateResults> {
        vec![
            CandidateResults {
                student_key: "12345".to_string(),
                name: "Alice Johnson".to_string(),
                year_group: "Year 13".to_string(),
                reg_group: None,
                results: vec![
                    subject("Mathematics", ResultStatus::Validated),
                    subject("Physics", ResultStatus::Validated),
                ],
                status: ResultStatus::Validated,
            },
            CandidateResults {
                student_key: "12347".to_string(),
                name: "Charlie Davis".to_string(),
                year_group: "Year 13".to_string(),
                reg_group: None,
                results: vec![
                    subject("Biology", ResultStatus::Conflict),
                    subject("Chemistry", ResultStatus::Pending),
                ],
                status: ResultStatus::Conflict,
            },
        ]
    }

    #[test]
    fn search_matches_name_or_student_key() {
        let records = records();
        let by_name = ResultsQuery {
            search: Some("alice".to_string()),
            ..ResultsQuery::default()
        };
        assert_eq!(by_name.apply(&records).len(), 1);

        let by_key = ResultsQuery {
            search: Some("1234".to_string()),
            ..ResultsQuery::default()
        };
        assert_eq!(by_key.apply(&records).len(), 2);
    }

    #[test]
    fn status_and_subject_filters_combine() {
        let records = records();
        let query = ResultsQuery {
            status: Some(ResultStatus::Conflict),
            subject: Some("biology".to_string()),
            ..ResultsQuery::default()
        };
        let matched = query.apply(&records);
        assert_eq!(matched.len(), 1);
        assert_eq!(matched[0].name, "Charlie Davis");
    }

    #[test]
    fn status_filter_parses_compact_labels() {
        let query: ResultsQuery =
            serde_json::from_str(r#"{"status":"pendingreview"}"#).expect("valid query");
        assert_eq!(query.status, Some(ResultStatus::PendingReview));

        let all: ResultsQuery = serde_json::from_str(r#"{"status":"all"}"#).expect("valid query");
        assert_eq!(all.status, None);

        assert!(serde_json::from_str::<ResultsQuery>(r#"{"status":"released"}"#).is_err());
    }

    #[test]
    fn overview_counts_each_status() {
        let overview = ResultsOverview::from_records(&records());
        assert_eq!(overview.candidates, 2);
        assert_eq!(overview.results, 4);
        assert_eq!(overview.validated, 2);
        assert_eq!(overview.conflicts, 1);
        assert_eq!(overview.pending, 1);
        assert!((overview.validated_pct() - 50.0).abs() < f32::EPSILON);
    }

    #[test]
    fn validation_queue_skips_validated_records() {
        let records = records();
        let queue = validation_queue(&records);
        assert_eq!(queue.len(), 1);
        assert_eq!(queue[0].student_key, "12347");
    }
}
