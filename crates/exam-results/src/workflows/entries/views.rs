use serde::{Deserialize, Serialize};

use super::domain::{Entry, EntryId, EntryStatus, PlaceholderEntry, PlaceholderId, ResultStatus};
use crate::workflows::catalog::{CandidateId, SyllabusOption};
use crate::workflows::results::GradeTier;

/// Search box and syllabus dropdown of the entries screen.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct EntryFilter {
    #[serde(default)]
    pub search: Option<String>,
    #[serde(default)]
    pub syllabus: Option<String>,
}

impl EntryFilter {
    fn search_term(&self) -> Option<String> {
        self.search
            .as_deref()
            .map(str::trim)
            .filter(|term| !term.is_empty())
            .map(str::to_lowercase)
    }

    fn syllabus_filter(&self) -> Option<&str> {
        self.syllabus
            .as_deref()
            .map(str::trim)
            .filter(|code| !code.is_empty() && !code.eq_ignore_ascii_case("all"))
    }

    pub fn matches_entry(&self, entry: &Entry) -> bool {
        if let Some(code) = self.syllabus_filter() {
            if entry.syllabus_code != code {
                return false;
            }
        }
        match self.search_term() {
            None => true,
            Some(term) => [&entry.syllabus_code, &entry.option_code, &entry.option_title]
                .iter()
                .any(|field| field.to_lowercase().contains(&term)),
        }
    }

    pub fn matches_placeholder(&self, placeholder: &PlaceholderEntry) -> bool {
        if let Some(code) = self.syllabus_filter() {
            if placeholder.syllabus_code != code {
                return false;
            }
        }
        match self.search_term() {
            None => true,
            Some(term) => placeholder.syllabus_code.to_lowercase().contains(&term),
        }
    }
}

/// One row of the entries list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum EntryListing {
    Entry {
        id: EntryId,
        syllabus_code: String,
        option_code: String,
        option_title: String,
        status: EntryStatus,
        candidate_count: usize,
    },
    Placeholder {
        id: PlaceholderId,
        syllabus_code: String,
        remaining_options: Vec<SyllabusOption>,
    },
}

impl EntryListing {
    pub fn from_entry(entry: &Entry) -> Self {
        Self::Entry {
            id: entry.id,
            syllabus_code: entry.syllabus_code.clone(),
            option_code: entry.option_code.clone(),
            option_title: entry.option_title.clone(),
            status: entry.status,
            candidate_count: entry.candidate_count(),
        }
    }

    pub fn from_placeholder(placeholder: &PlaceholderEntry) -> Self {
        Self::Placeholder {
            id: placeholder.id,
            syllabus_code: placeholder.syllabus_code.clone(),
            remaining_options: placeholder
                .remaining_options()
                .into_iter()
                .cloned()
                .collect(),
        }
    }

    pub fn syllabus_code(&self) -> &str {
        match self {
            Self::Entry { syllabus_code, .. } | Self::Placeholder { syllabus_code, .. } => {
                syllabus_code
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EntryCandidateView {
    pub candidate_id: CandidateId,
    pub name: String,
    pub year_group: Option<String>,
    pub reg_group: Option<String>,
    pub grade: String,
    pub points: u32,
    pub status: ResultStatus,
    /// Absent until a grade is recorded.
    pub tier: Option<GradeTier>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EntryDetails {
    pub id: EntryId,
    pub syllabus_code: String,
    pub syllabus_title: Option<String>,
    pub level: Option<String>,
    pub option_code: String,
    pub option_title: String,
    pub status: EntryStatus,
    pub candidates: Vec<EntryCandidateView>,
}
