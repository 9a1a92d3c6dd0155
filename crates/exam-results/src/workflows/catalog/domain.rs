use chrono::{NaiveDate, NaiveTime};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Roster identifier for a pupil sitting examinations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CandidateId(pub u32);

impl fmt::Display for CandidateId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct OptionId(pub u32);

impl fmt::Display for OptionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SyllabusId(pub u32);

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SeriesId(pub u32);

/// Immutable roster record for the duration of a session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Candidate {
    pub id: CandidateId,
    pub name: String,
    pub year_group: String,
    pub reg_group: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub student_id: Option<String>,
    #[serde(default)]
    pub subjects: Vec<String>,
}

impl Candidate {
    /// Identifier shared with external result feeds. Falls back to the roster id.
    pub fn student_key(&self) -> String {
        match &self.student_id {
            Some(student_id) if !student_id.trim().is_empty() => student_id.trim().to_string(),
            _ => self.id.to_string(),
        }
    }
}

/// An examinable paper belonging to exactly one syllabus.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SyllabusOption {
    pub id: OptionId,
    pub code: String,
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub exam_date: Option<NaiveDate>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub exam_time: Option<NaiveTime>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Syllabus {
    pub id: SyllabusId,
    pub code: String,
    pub title: String,
    pub organization: String,
    pub level: String,
    pub options: Vec<SyllabusOption>,
}

impl Syllabus {
    pub fn option(&self, code: &str) -> Option<&SyllabusOption> {
        self.options.iter().find(|option| option.code == code)
    }

    pub fn option_by_id(&self, id: OptionId) -> Option<&SyllabusOption> {
        self.options.iter().find(|option| option.id == id)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SeriesKind {
    External,
    Internal,
}

impl SeriesKind {
    pub const fn label(self) -> &'static str {
        match self {
            Self::External => "External",
            Self::Internal => "Internal",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SeriesStatus {
    Active,
    Draft,
    Planning,
}

impl SeriesStatus {
    pub const fn label(self) -> &'static str {
        match self {
            Self::Active => "Active",
            Self::Draft => "Draft",
            Self::Planning => "Planning",
        }
    }
}

/// A named examination period (e.g. "May 2024") grouping syllabuses.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Series {
    pub id: SeriesId,
    pub name: String,
    pub kind: SeriesKind,
    pub status: SeriesStatus,
    pub organization: String,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub syllabuses: Vec<Syllabus>,
}

impl Series {
    pub fn syllabus(&self, code: &str) -> Option<&Syllabus> {
        self.syllabuses.iter().find(|syllabus| syllabus.code == code)
    }

    pub fn option_count(&self) -> usize {
        self.syllabuses
            .iter()
            .map(|syllabus| syllabus.options.len())
            .sum()
    }
}

/// Read-only roster and syllabus catalog consumed by the entry engine.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReferenceData {
    pub roster: Vec<Candidate>,
    pub syllabuses: Vec<Syllabus>,
}

impl ReferenceData {
    pub fn new(roster: Vec<Candidate>, syllabuses: Vec<Syllabus>) -> Self {
        Self { roster, syllabuses }
    }

    /// Reference data scoped to the syllabuses of a single series.
    pub fn for_series(roster: Vec<Candidate>, series: &Series) -> Self {
        Self::new(roster, series.syllabuses.clone())
    }

    pub fn syllabus(&self, code: &str) -> Option<&Syllabus> {
        self.syllabuses.iter().find(|syllabus| syllabus.code == code)
    }

    pub fn candidate(&self, id: CandidateId) -> Option<&Candidate> {
        self.roster.iter().find(|candidate| candidate.id == id)
    }

    pub fn year_groups(&self) -> Vec<&str> {
        distinct(self.roster.iter().map(|candidate| candidate.year_group.as_str()))
    }

    pub fn reg_groups(&self) -> Vec<&str> {
        distinct(self.roster.iter().map(|candidate| candidate.reg_group.as_str()))
    }
}

fn distinct<'a>(labels: impl Iterator<Item = &'a str>) -> Vec<&'a str> {
    let mut seen: Vec<&str> = labels.collect();
    seen.sort_unstable();
    seen.dedup();
    seen
}
