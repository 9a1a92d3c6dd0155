use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::workflows::catalog::{Candidate, CandidateId};

/// How an administrator picks the candidates for an entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "mode", content = "value", rename_all = "snake_case")]
pub enum CandidateSelection {
    Specific(BTreeSet<CandidateId>),
    #[serde(rename = "year")]
    ByYearGroup(String),
    #[serde(rename = "reg_group")]
    ByRegGroup(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum SelectionError {
    #[error("please select a {field}")]
    MissingField { field: &'static str },
    #[error("please select at least one candidate")]
    EmptySelection,
    #[error("no candidates found for the selected criteria")]
    NoMatchingCandidates,
}

impl CandidateSelection {
    pub fn specific(ids: impl IntoIterator<Item = u32>) -> Self {
        Self::Specific(ids.into_iter().map(CandidateId).collect())
    }

    pub fn mode_label(&self) -> &'static str {
        match self {
            Self::Specific(_) => "specific",
            Self::ByYearGroup(_) => "year",
            Self::ByRegGroup(_) => "reg_group",
        }
    }

    /// Reject selections the administrator has not finished filling in.
    pub fn validate(&self) -> Result<(), SelectionError> {
        match self {
            Self::Specific(ids) if ids.is_empty() => Err(SelectionError::EmptySelection),
            Self::ByYearGroup(year) if year.trim().is_empty() => Err(SelectionError::MissingField {
                field: "year group",
            }),
            Self::ByRegGroup(group) if group.trim().is_empty() => {
                Err(SelectionError::MissingField { field: "reg group" })
            }
            _ => Ok(()),
        }
    }

    /// Candidates on the roster matching the selection. Ids unknown to the roster are dropped.
    pub fn resolve(&self, roster: &[Candidate]) -> BTreeSet<CandidateId> {
        let resolved: BTreeSet<CandidateId> = match self {
            Self::Specific(ids) => roster
                .iter()
                .map(|candidate| candidate.id)
                .filter(|id| ids.contains(id))
                .collect(),
            Self::ByYearGroup(year) => roster
                .iter()
                .filter(|candidate| candidate.year_group == *year)
                .map(|candidate| candidate.id)
                .collect(),
            Self::ByRegGroup(group) => roster
                .iter()
                .filter(|candidate| candidate.reg_group == *group)
                .map(|candidate| candidate.id)
                .collect(),
        };

        debug!(
            mode = self.mode_label(),
            matched = resolved.len(),
            "resolved candidate selection"
        );
        resolved
    }

    pub fn resolve_non_empty(
        &self,
        roster: &[Candidate],
    ) -> Result<BTreeSet<CandidateId>, SelectionError> {
        self.validate()?;
        let resolved = self.resolve(roster);
        if resolved.is_empty() {
            return Err(SelectionError::NoMatchingCandidates);
        }
        Ok(resolved)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn candidate(id: u32, year: &str, reg: &str) -> Candidate {
        Candidate {
            id: CandidateId(id),
            name: format!("Pupil {id}"),
            year_group: year.to_string(),
            reg_group: reg.to_string(),
            student_id: None,
            subjects: Vec::new(),
        }
    }

    fn roster() -> Vec<Candidate> {
        vec![
            candidate(1, "11", "11A"),
            candidate(2, "11", "11A"),
            candidate(3, "11", "11B"),
            candidate(5, "12", "12A"),
            candidate(8, "10", "10A"),
        ]
    }

    fn ids(values: &[u32]) -> BTreeSet<CandidateId> {
        values.iter().copied().map(CandidateId).collect()
    }

    #[test]
    fn group_modes_use_exact_label_equality() {
        let roster = roster();
        assert_eq!(
            CandidateSelection::ByYearGroup("11".to_string()).resolve(&roster),
            ids(&[1, 2, 3])
        );
        assert_eq!(
            CandidateSelection::ByRegGroup("11B".to_string()).resolve(&roster),
            ids(&[3])
        );
        assert!(CandidateSelection::ByRegGroup("11b".to_string())
            .resolve(&roster)
            .is_empty());
        assert!(CandidateSelection::ByYearGroup("1".to_string())
            .resolve(&roster)
            .is_empty());
    }

    #[test]
    fn specific_mode_drops_stale_ids() {
        let roster = roster();
        let selection = CandidateSelection::specific([8, 2, 42]);
        assert_eq!(selection.resolve(&roster), ids(&[2, 8]));
    }

    #[test]
    fn incomplete_selections_fail_validation() {
        assert_eq!(
            CandidateSelection::Specific(BTreeSet::new()).validate(),
            Err(SelectionError::EmptySelection)
        );
        assert_eq!(
            CandidateSelection::ByYearGroup("  ".to_string()).validate(),
            Err(SelectionError::MissingField {
                field: "year group"
            })
        );
        assert_eq!(
            CandidateSelection::ByRegGroup(String::new()).validate(),
            Err(SelectionError::MissingField { field: "reg group" })
        );
    }

    #[test]
    fn resolve_non_empty_rejects_unmatched_criteria() {
        let roster = roster();
        assert_eq!(
            CandidateSelection::ByYearGroup("13".to_string()).resolve_non_empty(&roster),
            Err(SelectionError::NoMatchingCandidates)
        );
        assert_eq!(
            CandidateSelection::specific([99]).resolve_non_empty(&roster),
            Err(SelectionError::NoMatchingCandidates)
        );
        assert_eq!(
            CandidateSelection::ByRegGroup("12A".to_string()).resolve_non_empty(&roster),
            Ok(ids(&[5]))
        );
    }

    #[test]
    fn selection_deserializes_from_tagged_json() {
        let year: CandidateSelection =
            serde_json::from_str(r#"{"mode":"year","value":"11"}"#).expect("year mode");
        assert_eq!(year, CandidateSelection::ByYearGroup("11".to_string()));

        let specific: CandidateSelection =
            serde_json::from_str(r#"{"mode":"specific","value":[4,2]}"#).expect("specific mode");
        assert_eq!(specific, CandidateSelection::specific([2, 4]));

        let reg: CandidateSelection =
            serde_json::from_str(r#"{"mode":"reg_group","value":"10A"}"#).expect("reg mode");
        assert_eq!(reg.mode_label(), "reg_group");
    }
}
