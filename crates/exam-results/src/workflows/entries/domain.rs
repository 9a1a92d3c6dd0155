use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

use serde::{Deserialize, Serialize};

use super::selection::SelectionError;
use crate::workflows::catalog::{CandidateId, OptionId, Syllabus, SyllabusOption};

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EntryId(pub u32);

impl fmt::Display for EntryId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PlaceholderId(pub u32);

impl fmt::Display for PlaceholderId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Per-result workflow status shared with reporting consumers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ResultStatus {
    Pending,
    #[serde(rename = "Pending Review")]
    PendingReview,
    Validated,
    Conflict,
}

impl ResultStatus {
    pub const fn label(self) -> &'static str {
        match self {
            Self::Pending => "Pending",
            Self::PendingReview => "Pending Review",
            Self::Validated => "Validated",
            Self::Conflict => "Conflict",
        }
    }

    /// Accepts labels case-insensitively, with or without the space ("pendingreview").
    pub fn from_label(raw: &str) -> Option<Self> {
        let compact: String = raw
            .chars()
            .filter(|c| !c.is_whitespace() && *c != '_' && *c != '-')
            .collect::<String>()
            .to_ascii_lowercase();

        match compact.as_str() {
            "pending" => Some(Self::Pending),
            "pendingreview" => Some(Self::PendingReview),
            "validated" => Some(Self::Validated),
            "conflict" => Some(Self::Conflict),
            _ => None,
        }
    }

    /// Roll-up priority. Ungraded results carry no severity.
    pub const fn severity(self) -> Option<u8> {
        match self {
            Self::Pending => None,
            Self::Validated => Some(0),
            Self::PendingReview => Some(1),
            Self::Conflict => Some(2),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CandidateResult {
    pub grade: String,
    pub points: u32,
    pub status: ResultStatus,
}

impl CandidateResult {
    pub fn pending() -> Self {
        Self {
            grade: String::new(),
            points: 0,
            status: ResultStatus::Pending,
        }
    }

    pub fn is_graded(&self) -> bool {
        !self.grade.trim().is_empty()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum EntryStatus {
    Active,
}

impl EntryStatus {
    pub const fn label(self) -> &'static str {
        match self {
            Self::Active => "Active",
        }
    }
}

/// Validated entry content awaiting an identifier from the repository.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewEntry {
    syllabus_code: String,
    option_code: String,
    option_title: String,
    candidate_ids: Vec<CandidateId>,
}

impl NewEntry {
    pub fn new(
        syllabus: &Syllabus,
        option: &SyllabusOption,
        candidates: BTreeSet<CandidateId>,
    ) -> Result<Self, SelectionError> {
        if candidates.is_empty() {
            return Err(SelectionError::NoMatchingCandidates);
        }

        Ok(Self {
            syllabus_code: syllabus.code.clone(),
            option_code: option.code.clone(),
            option_title: option.title.clone(),
            candidate_ids: candidates.into_iter().collect(),
        })
    }

    pub fn option_code(&self) -> &str {
        &self.option_code
    }

    pub fn candidate_count(&self) -> usize {
        self.candidate_ids.len()
    }

    pub fn into_entry(self, id: EntryId) -> Entry {
        let results = self
            .candidate_ids
            .iter()
            .map(|candidate| (*candidate, CandidateResult::pending()))
            .collect();

        Entry {
            id,
            syllabus_code: self.syllabus_code,
            option_code: self.option_code,
            option_title: self.option_title,
            candidate_ids: self.candidate_ids,
            status: EntryStatus::Active,
            results,
        }
    }
}

/// Assignment of candidates to one syllabus option, carrying one result per candidate.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Entry {
    pub id: EntryId,
    pub syllabus_code: String,
    pub option_code: String,
    pub option_title: String,
    candidate_ids: Vec<CandidateId>,
    pub status: EntryStatus,
    results: BTreeMap<CandidateId, CandidateResult>,
}

impl Entry {
    pub fn candidate_ids(&self) -> &[CandidateId] {
        &self.candidate_ids
    }

    pub fn candidate_count(&self) -> usize {
        self.candidate_ids.len()
    }

    pub fn includes(&self, candidate: CandidateId) -> bool {
        self.results.contains_key(&candidate)
    }

    pub fn result(&self, candidate: CandidateId) -> Option<&CandidateResult> {
        self.results.get(&candidate)
    }

    pub fn results(&self) -> &BTreeMap<CandidateId, CandidateResult> {
        &self.results
    }

    /// Replace a candidate's result. Candidates outside the entry are rejected.
    pub fn record_result(
        &mut self,
        candidate: CandidateId,
        result: CandidateResult,
    ) -> Result<(), CandidateResult> {
        match self.results.get_mut(&candidate) {
            Some(slot) => {
                *slot = result;
                Ok(())
            }
            None => Err(result),
        }
    }
}

/// Deferred entry for a syllabus whose papers still need candidates assigned.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlaceholderEntry {
    pub id: PlaceholderId,
    pub syllabus_code: String,
    pub options: Vec<SyllabusOption>,
    pub used_options: BTreeSet<OptionId>,
}

impl PlaceholderEntry {
    pub fn for_syllabus(id: PlaceholderId, syllabus: &Syllabus) -> Self {
        Self {
            id,
            syllabus_code: syllabus.code.clone(),
            options: syllabus.options.clone(),
            used_options: BTreeSet::new(),
        }
    }

    pub fn option(&self, id: OptionId) -> Option<&SyllabusOption> {
        self.options.iter().find(|option| option.id == id)
    }

    pub fn is_used(&self, id: OptionId) -> bool {
        self.used_options.contains(&id)
    }

    pub fn remaining_options(&self) -> Vec<&SyllabusOption> {
        self.options
            .iter()
            .filter(|option| !self.used_options.contains(&option.id))
            .collect()
    }

    pub fn is_exhausted(&self) -> bool {
        self.options
            .iter()
            .all(|option| self.used_options.contains(&option.id))
    }

    pub fn mark_used(&mut self, ids: impl IntoIterator<Item = OptionId>) {
        self.used_options.extend(ids);
    }
}
