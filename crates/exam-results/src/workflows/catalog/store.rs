use std::collections::BTreeSet;
use std::sync::{Arc, RwLock};

use tracing::info;

use super::domain::{Candidate, ReferenceData};
use super::series::{CatalogError, SeriesCatalog};

/// Read side the entry engine resolves syllabuses and candidates against.
pub trait ReferenceSource: Send + Sync {
    fn reference_data(&self) -> ReferenceData;
}

/// A fixed set of reference data.
impl ReferenceSource for ReferenceData {
    fn reference_data(&self) -> ReferenceData {
        self.clone()
    }
}

#[derive(Debug, Default)]
struct StoreState {
    roster: Vec<Candidate>,
    catalog: SeriesCatalog,
}

/// Owner of the roster and the series catalog. Clones share the same state, so syllabuses
/// added through the catalog are enterable straight away.
#[derive(Debug, Clone, Default)]
pub struct ReferenceStore {
    state: Arc<RwLock<StoreState>>,
}

impl ReferenceStore {
    pub fn new(roster: Vec<Candidate>, catalog: SeriesCatalog) -> Result<Self, CatalogError> {
        validate_roster(&roster)?;
        Ok(Self {
            state: Arc::new(RwLock::new(StoreState { roster, catalog })),
        })
    }

    pub fn roster(&self) -> Vec<Candidate> {
        let state = self.state.read().expect("reference store lock poisoned");
        state.roster.clone()
    }

    /// Swap in a new roster. Existing entries keep the candidate ids they were created with.
    pub fn replace_roster(&self, roster: Vec<Candidate>) -> Result<usize, CatalogError> {
        validate_roster(&roster)?;
        let count = roster.len();
        let mut state = self.state.write().expect("reference store lock poisoned");
        state.roster = roster;
        info!(candidates = count, "replaced candidate roster");
        Ok(count)
    }

    pub fn read<T>(&self, read: impl FnOnce(&SeriesCatalog) -> T) -> T {
        let state = self.state.read().expect("reference store lock poisoned");
        read(&state.catalog)
    }

    pub fn write<T>(&self, write: impl FnOnce(&mut SeriesCatalog) -> T) -> T {
        let mut state = self.state.write().expect("reference store lock poisoned");
        write(&mut state.catalog)
    }
}

impl ReferenceSource for ReferenceStore {
    fn reference_data(&self) -> ReferenceData {
        let state = self.state.read().expect("reference store lock poisoned");
        let syllabuses = state
            .catalog
            .series()
            .iter()
            .flat_map(|series| series.syllabuses.iter().cloned())
            .collect();
        ReferenceData::new(state.roster.clone(), syllabuses)
    }
}

fn validate_roster(roster: &[Candidate]) -> Result<(), CatalogError> {
    let mut seen = BTreeSet::new();
    for candidate in roster {
        if candidate.name.trim().is_empty() {
            return Err(CatalogError::MissingField {
                field: "candidate name",
            });
        }
        if !seen.insert(candidate.id) {
            return Err(CatalogError::DuplicateCandidate(candidate.id));
        }
    }
    Ok(())
}
