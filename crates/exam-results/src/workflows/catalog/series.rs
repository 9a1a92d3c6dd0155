use chrono::{NaiveDate, NaiveTime};
use serde::{Deserialize, Serialize};
use tracing::info;

use super::domain::{
    CandidateId, OptionId, Series, SeriesId, SeriesKind, SeriesStatus, Syllabus, SyllabusId,
    SyllabusOption,
};

/// Input for registering a new examination season.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewSeason {
    pub name: String,
    #[serde(default = "default_kind")]
    pub kind: SeriesKind,
    #[serde(default = "default_status")]
    pub status: SeriesStatus,
    #[serde(default)]
    pub organization: String,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
}

fn default_kind() -> SeriesKind {
    SeriesKind::External
}

fn default_status() -> SeriesStatus {
    SeriesStatus::Draft
}

/// Syllabus content before identifiers are allocated by the catalog.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SyllabusDraft {
    pub code: String,
    pub title: String,
    pub organization: String,
    pub level: String,
    pub options: Vec<OptionDraft>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OptionDraft {
    pub code: String,
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub exam_date: Option<NaiveDate>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub exam_time: Option<NaiveTime>,
}

impl OptionDraft {
    pub fn new(code: impl Into<String>, title: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            title: title.into(),
            exam_date: None,
            exam_time: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CatalogError {
    #[error("please fill in the {field}")]
    MissingField { field: &'static str },
    #[error("season end date {end} is before start date {start}")]
    InvalidDateRange { start: NaiveDate, end: NaiveDate },
    #[error("series {0:?} not found")]
    SeriesNotFound(SeriesId),
    #[error("syllabus {0} not found")]
    SyllabusNotFound(String),
    #[error("syllabus {code} already exists in {series}")]
    DuplicateSyllabus { code: String, series: String },
    #[error("option code {0} is listed more than once")]
    DuplicateOption(String),
    #[error("candidate {0} appears more than once in the roster")]
    DuplicateCandidate(CandidateId),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct CatalogStats {
    pub series: usize,
    pub syllabuses: usize,
    pub options: usize,
}

/// Owned store of examination series and the syllabuses attached to them.
#[derive(Debug, Clone)]
pub struct SeriesCatalog {
    series: Vec<Series>,
    next_series_id: u32,
    next_syllabus_id: u32,
    next_option_id: u32,
}

impl Default for SeriesCatalog {
    fn default() -> Self {
        Self::new(Vec::new())
    }
}

impl SeriesCatalog {
    pub fn new(series: Vec<Series>) -> Self {
        let next_series_id = series.iter().map(|item| item.id.0).max().unwrap_or(0) + 1;
        let next_syllabus_id = series
            .iter()
            .flat_map(|item| item.syllabuses.iter())
            .map(|syllabus| syllabus.id.0)
            .max()
            .unwrap_or(0)
            + 1;
        let next_option_id = series
            .iter()
            .flat_map(|item| item.syllabuses.iter())
            .flat_map(|syllabus| syllabus.options.iter())
            .map(|option| option.id.0)
            .max()
            .unwrap_or(0)
            + 1;

        Self {
            series,
            next_series_id,
            next_syllabus_id,
            next_option_id,
        }
    }

    pub fn series(&self) -> &[Series] {
        &self.series
    }

    pub fn get(&self, id: SeriesId) -> Option<&Series> {
        self.series.iter().find(|item| item.id == id)
    }

    pub fn find_by_name(&self, name: &str) -> Option<&Series> {
        self.series
            .iter()
            .find(|item| item.name.eq_ignore_ascii_case(name.trim()))
    }

    pub fn create_season(&mut self, season: NewSeason) -> Result<&Series, CatalogError> {
        let name = season.name.trim();
        if name.is_empty() {
            return Err(CatalogError::MissingField {
                field: "season name",
            });
        }
        if season.end_date < season.start_date {
            return Err(CatalogError::InvalidDateRange {
                start: season.start_date,
                end: season.end_date,
            });
        }

        let id = SeriesId(self.next_series_id);
        self.next_series_id += 1;
        let organization = if season.organization.trim().is_empty() {
            season.kind.label().to_string()
        } else {
            season.organization.trim().to_string()
        };

        info!(series = name, "season created");
        self.series.push(Series {
            id,
            name: name.to_string(),
            kind: season.kind,
            status: season.status,
            organization,
            start_date: season.start_date,
            end_date: season.end_date,
            syllabuses: Vec::new(),
        });

        let index = self.series.len() - 1;
        Ok(&self.series[index])
    }

    /// Allocate identifiers for a draft and attach it to the series.
    pub fn add_syllabus(
        &mut self,
        series_id: SeriesId,
        draft: SyllabusDraft,
    ) -> Result<&Syllabus, CatalogError> {
        validate_draft(&draft)?;

        let position = self
            .series
            .iter()
            .position(|item| item.id == series_id)
            .ok_or(CatalogError::SeriesNotFound(series_id))?;

        if self.series[position].syllabus(draft.code.trim()).is_some() {
            return Err(CatalogError::DuplicateSyllabus {
                code: draft.code.trim().to_string(),
                series: self.series[position].name.clone(),
            });
        }

        let syllabus_id = SyllabusId(self.next_syllabus_id);
        self.next_syllabus_id += 1;

        let mut options = Vec::with_capacity(draft.options.len());
        for option in draft.options {
            options.push(SyllabusOption {
                id: OptionId(self.next_option_id),
                code: option.code.trim().to_string(),
                title: option.title.trim().to_string(),
                exam_date: option.exam_date,
                exam_time: option.exam_time,
            });
            self.next_option_id += 1;
        }

        let series = &mut self.series[position];
        info!(
            series = %series.name,
            syllabus = draft.code.trim(),
            options = options.len(),
            "syllabus added"
        );
        series.syllabuses.push(Syllabus {
            id: syllabus_id,
            code: draft.code.trim().to_string(),
            title: draft.title.trim().to_string(),
            organization: draft.organization.trim().to_string(),
            level: draft.level.trim().to_string(),
            options,
        });

        let index = series.syllabuses.len() - 1;
        Ok(&series.syllabuses[index])
    }

    /// Prefill a draft from an existing syllabus so it can be edited and saved under a new code.
    pub fn copy_syllabus(&self, code: &str) -> Result<SyllabusDraft, CatalogError> {
        let source = self
            .series
            .iter()
            .flat_map(|item| item.syllabuses.iter())
            .find(|syllabus| syllabus.code == code)
            .ok_or_else(|| CatalogError::SyllabusNotFound(code.to_string()))?;

        Ok(SyllabusDraft {
            code: format!("{}-COPY", source.code),
            title: format!("{} (Copy)", source.title),
            organization: source.organization.clone(),
            level: source.level.clone(),
            options: source
                .options
                .iter()
                .map(|option| OptionDraft {
                    code: option.code.clone(),
                    title: option.title.clone(),
                    exam_date: option.exam_date,
                    exam_time: option.exam_time,
                })
                .collect(),
        })
    }

    /// Series whose name, or any syllabus title or code, contains the search term.
    pub fn filter(&self, search: &str, kind: Option<SeriesKind>) -> Vec<&Series> {
        let needle = search.trim().to_lowercase();
        self.series
            .iter()
            .filter(|item| {
                let matches_search = needle.is_empty()
                    || item.name.to_lowercase().contains(&needle)
                    || item.syllabuses.iter().any(|syllabus| {
                        syllabus.title.to_lowercase().contains(&needle)
                            || syllabus.code.to_lowercase().contains(&needle)
                    });
                let matches_kind = kind.map_or(true, |kind| item.kind == kind);
                matches_search && matches_kind
            })
            .collect()
    }

    pub fn stats(&self) -> CatalogStats {
        CatalogStats {
            series: self.series.len(),
            syllabuses: self.series.iter().map(|item| item.syllabuses.len()).sum(),
            options: self.series.iter().map(Series::option_count).sum(),
        }
    }
}

pub(crate) fn validate_draft(draft: &SyllabusDraft) -> Result<(), CatalogError> {
    if draft.code.trim().is_empty() {
        return Err(CatalogError::MissingField {
            field: "syllabus code",
        });
    }
    if draft.title.trim().is_empty() {
        return Err(CatalogError::MissingField {
            field: "syllabus title",
        });
    }
    if draft.options.is_empty() {
        return Err(CatalogError::MissingField { field: "options" });
    }

    let mut codes: Vec<&str> = Vec::with_capacity(draft.options.len());
    for option in &draft.options {
        let code = option.code.trim();
        if code.is_empty() || option.title.trim().is_empty() {
            return Err(CatalogError::MissingField {
                field: "option code and title",
            });
        }
        if codes.contains(&code) {
            return Err(CatalogError::DuplicateOption(code.to_string()));
        }
        codes.push(code);
    }

    Ok(())
}
