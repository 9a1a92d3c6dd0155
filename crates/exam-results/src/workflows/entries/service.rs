use std::collections::BTreeMap;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use super::domain::{
    CandidateResult, Entry, EntryId, NewEntry, PlaceholderEntry, PlaceholderId, ResultStatus,
};
use super::repository::{EntryRepository, RepositoryError};
use super::selection::{CandidateSelection, SelectionError};
use super::views::{EntryCandidateView, EntryDetails, EntryFilter, EntryListing};
use crate::workflows::catalog::{CandidateId, OptionId, ReferenceData, ReferenceSource};
use crate::workflows::results::{aggregate_by_candidate, CandidateResults, GradeTier};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreateEntryRequest {
    pub syllabus_code: String,
    pub option_code: String,
    pub selection: CandidateSelection,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreatePlaceholderRequest {
    pub syllabus_code: String,
}

/// Candidate selections keyed by the placeholder option they configure.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResolvePlaceholderRequest {
    #[serde(default)]
    pub selections: BTreeMap<OptionId, CandidateSelection>,
}

impl ResolvePlaceholderRequest {
    pub fn with(mut self, option: OptionId, selection: CandidateSelection) -> Self {
        self.selections.insert(option, selection);
        self
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PlaceholderOutcome {
    pub created: Vec<Entry>,
    /// `None` once every option of the placeholder has been used.
    pub remaining: Option<PlaceholderEntry>,
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum OptionFailureReason {
    #[error(transparent)]
    Selection(#[from] SelectionError),
    #[error("option has already been turned into an entry")]
    AlreadyUsed,
    #[error("option is not part of this placeholder")]
    NotInPlaceholder,
}

/// Why one option of a placeholder batch could not be resolved.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("option {option_id}: {reason}")]
pub struct OptionFailure {
    pub option_id: OptionId,
    pub option_code: Option<String>,
    pub reason: OptionFailureReason,
}

/// Error raised by the entry service.
#[derive(Debug, thiserror::Error)]
pub enum EntryError {
    #[error(transparent)]
    Selection(#[from] SelectionError),
    #[error("please select a {field}")]
    MissingField { field: &'static str },
    #[error("unknown syllabus '{0}'")]
    UnknownSyllabus(String),
    #[error("option '{option}' does not belong to syllabus '{syllabus}'")]
    UnknownOption { syllabus: String, option: String },
    #[error("entry {0} not found")]
    EntryNotFound(EntryId),
    #[error("placeholder {0} not found")]
    PlaceholderNotFound(PlaceholderId),
    #[error("candidate {candidate} is not entered for entry {entry}")]
    CandidateNotInEntry { entry: EntryId, candidate: CandidateId },
    #[error("candidate {candidate} has no grade to validate on entry {entry}")]
    UngradedResult { entry: EntryId, candidate: CandidateId },
    #[error("select candidates for at least one option")]
    NothingToResolve,
    #[error("{} placeholder option(s) could not be resolved", .0.len())]
    PlaceholderOptions(Vec<OptionFailure>),
    #[error(transparent)]
    Repository(#[from] RepositoryError),
}

impl EntryError {
    /// Input the administrator can correct and resubmit.
    pub fn is_validation(&self) -> bool {
        matches!(
            self,
            Self::Selection(_)
                | Self::MissingField { .. }
                | Self::UnknownSyllabus(_)
                | Self::UnknownOption { .. }
                | Self::CandidateNotInEntry { .. }
                | Self::UngradedResult { .. }
                | Self::NothingToResolve
                | Self::PlaceholderOptions(_)
        )
    }

    pub fn is_not_found(&self) -> bool {
        matches!(
            self,
            Self::EntryNotFound(_)
                | Self::PlaceholderNotFound(_)
                | Self::Repository(RepositoryError::NotFound)
        )
    }
}

/// Entry engine: turns candidate selections into entries. Reference data is read fresh from
/// its source on every call.
pub struct EntryService<R> {
    reference: Arc<dyn ReferenceSource>,
    repository: Arc<R>,
}

impl<R> EntryService<R>
where
    R: EntryRepository + 'static,
{
    pub fn new<S>(reference: Arc<S>, repository: Arc<R>) -> Self
    where
        S: ReferenceSource + 'static,
    {
        Self {
            reference,
            repository,
        }
    }

    pub fn reference(&self) -> ReferenceData {
        self.reference.reference_data()
    }

    pub fn create_entry(&self, request: CreateEntryRequest) -> Result<Entry, EntryError> {
        let syllabus_code = request.syllabus_code.trim();
        if syllabus_code.is_empty() {
            return Err(EntryError::MissingField { field: "syllabus" });
        }
        let option_code = request.option_code.trim();
        if option_code.is_empty() {
            return Err(EntryError::MissingField { field: "option" });
        }

        let reference = self.reference();
        let syllabus = reference
            .syllabus(syllabus_code)
            .ok_or_else(|| EntryError::UnknownSyllabus(syllabus_code.to_string()))?;
        let option = syllabus
            .option(option_code)
            .ok_or_else(|| EntryError::UnknownOption {
                syllabus: syllabus_code.to_string(),
                option: option_code.to_string(),
            })?;

        let candidates = request.selection.resolve_non_empty(&reference.roster)?;
        let draft = NewEntry::new(syllabus, option, candidates)?;
        let entry = self.repository.insert_entry(draft)?;

        info!(
            entry_id = %entry.id,
            syllabus = %entry.syllabus_code,
            option = %entry.option_code,
            candidates = entry.candidate_count(),
            "created entry"
        );
        Ok(entry)
    }

    pub fn create_placeholder(&self, syllabus_code: &str) -> Result<PlaceholderEntry, EntryError> {
        let syllabus_code = syllabus_code.trim();
        if syllabus_code.is_empty() {
            return Err(EntryError::MissingField { field: "syllabus" });
        }
        let reference = self.reference();
        let syllabus = reference
            .syllabus(syllabus_code)
            .ok_or_else(|| EntryError::UnknownSyllabus(syllabus_code.to_string()))?;

        let placeholder = self.repository.insert_placeholder(syllabus)?;
        info!(
            placeholder_id = %placeholder.id,
            syllabus = %placeholder.syllabus_code,
            options = placeholder.options.len(),
            "created placeholder"
        );
        Ok(placeholder)
    }

    /// Turn configured placeholder options into entries. Every option must resolve or
    /// nothing is created.
    pub fn resolve_placeholder(
        &self,
        id: PlaceholderId,
        request: ResolvePlaceholderRequest,
    ) -> Result<PlaceholderOutcome, EntryError> {
        if request.selections.is_empty() {
            return Err(EntryError::NothingToResolve);
        }

        let placeholder = self
            .repository
            .fetch_placeholder(id)?
            .ok_or(EntryError::PlaceholderNotFound(id))?;
        let reference = self.reference();
        let syllabus = reference
            .syllabus(&placeholder.syllabus_code)
            .ok_or_else(|| EntryError::UnknownSyllabus(placeholder.syllabus_code.clone()))?;

        let mut failures = Vec::new();
        let mut drafts = Vec::new();

        for (option_id, selection) in &request.selections {
            let Some(position) = placeholder
                .options
                .iter()
                .position(|option| option.id == *option_id)
            else {
                failures.push(OptionFailure {
                    option_id: *option_id,
                    option_code: None,
                    reason: OptionFailureReason::NotInPlaceholder,
                });
                continue;
            };
            let option = &placeholder.options[position];

            if placeholder.is_used(*option_id) {
                failures.push(OptionFailure {
                    option_id: *option_id,
                    option_code: Some(option.code.clone()),
                    reason: OptionFailureReason::AlreadyUsed,
                });
                continue;
            }

            let resolved = selection
                .resolve_non_empty(&reference.roster)
                .and_then(|candidates| NewEntry::new(syllabus, option, candidates));
            match resolved {
                Ok(draft) => drafts.push((position, draft)),
                Err(error) => failures.push(OptionFailure {
                    option_id: *option_id,
                    option_code: Some(option.code.clone()),
                    reason: error.into(),
                }),
            }
        }

        if !failures.is_empty() {
            warn!(
                placeholder_id = %id,
                failed = failures.len(),
                configured = request.selections.len(),
                "rejected placeholder resolution"
            );
            return Err(EntryError::PlaceholderOptions(failures));
        }

        drafts.sort_by_key(|(position, _)| *position);
        let configured: Vec<OptionId> = request.selections.keys().copied().collect();

        let (created, stored) = self.repository.commit_resolution(
            id,
            &configured,
            drafts.into_iter().map(|(_, draft)| draft).collect(),
        )?;
        let remaining = (!stored.is_exhausted()).then_some(stored);

        info!(
            placeholder_id = %id,
            created = created.len(),
            exhausted = remaining.is_none(),
            "resolved placeholder"
        );
        Ok(PlaceholderOutcome { created, remaining })
    }

    pub fn record_result(
        &self,
        entry_id: EntryId,
        candidate: CandidateId,
        result: CandidateResult,
    ) -> Result<Entry, EntryError> {
        if result.status == ResultStatus::Validated && !result.is_graded() {
            return Err(EntryError::UngradedResult {
                entry: entry_id,
                candidate,
            });
        }

        let mut entry = self.fetch_entry(entry_id)?;
        entry
            .record_result(candidate, result)
            .map_err(|_| EntryError::CandidateNotInEntry {
                entry: entry_id,
                candidate,
            })?;
        self.repository.update_entry(entry.clone())?;
        Ok(entry)
    }

    pub fn validate_result(
        &self,
        entry_id: EntryId,
        candidate: CandidateId,
    ) -> Result<Entry, EntryError> {
        let mut entry = self.fetch_entry(entry_id)?;
        let current = entry
            .result(candidate)
            .cloned()
            .ok_or(EntryError::CandidateNotInEntry {
                entry: entry_id,
                candidate,
            })?;
        if !current.is_graded() {
            return Err(EntryError::UngradedResult {
                entry: entry_id,
                candidate,
            });
        }

        let validated = CandidateResult {
            status: ResultStatus::Validated,
            ..current
        };
        entry
            .record_result(candidate, validated)
            .map_err(|_| EntryError::CandidateNotInEntry {
                entry: entry_id,
                candidate,
            })?;
        self.repository.update_entry(entry.clone())?;

        info!(entry_id = %entry_id, candidate = %candidate, "validated result");
        Ok(entry)
    }

    pub fn entries(&self) -> Result<Vec<Entry>, EntryError> {
        Ok(self.repository.entries()?)
    }

    pub fn placeholders(&self) -> Result<Vec<PlaceholderEntry>, EntryError> {
        Ok(self.repository.placeholders()?)
    }

    /// Entries first, then open placeholders, both in creation order.
    pub fn list(&self, filter: &EntryFilter) -> Result<Vec<EntryListing>, EntryError> {
        let entries = self.repository.entries()?;
        let placeholders = self.repository.placeholders()?;

        let listings = entries
            .iter()
            .filter(|entry| filter.matches_entry(entry))
            .map(EntryListing::from_entry)
            .chain(
                placeholders
                    .iter()
                    .filter(|placeholder| filter.matches_placeholder(placeholder))
                    .map(EntryListing::from_placeholder),
            )
            .collect();
        Ok(listings)
    }

    pub fn entry_details(&self, id: EntryId) -> Result<EntryDetails, EntryError> {
        let entry = self.fetch_entry(id)?;
        let reference = self.reference();
        let syllabus = reference.syllabus(&entry.syllabus_code);

        let candidates = entry
            .results()
            .iter()
            .map(|(candidate_id, result)| {
                let candidate = reference.candidate(*candidate_id);
                EntryCandidateView {
                    candidate_id: *candidate_id,
                    name: candidate
                        .map(|candidate| candidate.name.clone())
                        .unwrap_or_else(|| format!("Candidate {candidate_id}")),
                    year_group: candidate.map(|candidate| candidate.year_group.clone()),
                    reg_group: candidate.map(|candidate| candidate.reg_group.clone()),
                    grade: result.grade.clone(),
                    points: result.points,
                    status: result.status,
                    tier: result
                        .is_graded()
                        .then(|| GradeTier::classify(&result.grade)),
                }
            })
            .collect();

        Ok(EntryDetails {
            id: entry.id,
            syllabus_code: entry.syllabus_code.clone(),
            syllabus_title: syllabus.map(|syllabus| syllabus.title.clone()),
            level: syllabus.map(|syllabus| syllabus.level.clone()),
            option_code: entry.option_code.clone(),
            option_title: entry.option_title.clone(),
            status: entry.status,
            candidates,
        })
    }

    /// Candidate-centric results over every stored entry.
    pub fn candidate_results(&self) -> Result<Vec<CandidateResults>, EntryError> {
        let entries = self.repository.entries()?;
        Ok(aggregate_by_candidate(&entries, &self.reference()))
    }

    fn fetch_entry(&self, id: EntryId) -> Result<Entry, EntryError> {
        self.repository
            .fetch_entry(id)?
            .ok_or(EntryError::EntryNotFound(id))
    }
}
