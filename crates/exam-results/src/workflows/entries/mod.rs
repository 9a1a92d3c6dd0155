//! Entry engine: candidate selection, entry creation, and placeholder resolution.

pub mod domain;
pub mod repository;
pub mod router;
pub mod selection;
pub mod service;
pub mod views;

#[cfg(test)]
mod tests;

pub use domain::{
    CandidateResult, Entry, EntryId, EntryStatus, NewEntry, PlaceholderEntry, PlaceholderId,
    ResultStatus,
};
pub use repository::{EntryRepository, InMemoryEntryRepository, RepositoryError};
pub use router::entry_router;
pub use selection::{CandidateSelection, SelectionError};
pub use service::{
    CreateEntryRequest, CreatePlaceholderRequest, EntryError, EntryService, OptionFailure,
    OptionFailureReason, PlaceholderOutcome, ResolvePlaceholderRequest,
};
pub use views::{EntryCandidateView, EntryDetails, EntryFilter, EntryListing};
