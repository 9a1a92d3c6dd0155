use std::sync::Arc;

use axum::response::Response;
use chrono::{NaiveDate, NaiveTime};
use serde_json::Value;

use crate::workflows::catalog::{
    Candidate, CandidateId, OptionId, ReferenceData, Syllabus, SyllabusId, SyllabusOption,
};
use crate::workflows::entries::domain::{Entry, EntryId, NewEntry, PlaceholderEntry, PlaceholderId};
use crate::workflows::entries::repository::{
    EntryRepository, InMemoryEntryRepository, RepositoryError,
};
use crate::workflows::entries::{entry_router, EntryService};

fn pupil(id: u32, name: &str, year: &str, reg_group: &str) -> Candidate {
    Candidate {
        id: CandidateId(id),
        name: name.to_string(),
        year_group: year.to_string(),
        reg_group: reg_group.to_string(),
        student_id: None,
        subjects: Vec::new(),
    }
}

fn paper(id: u32, code: &str, title: &str, date: (i32, u32, u32), hour: u32) -> SyllabusOption {
    SyllabusOption {
        id: OptionId(id),
        code: code.to_string(),
        title: title.to_string(),
        exam_date: NaiveDate::from_ymd_opt(date.0, date.1, date.2),
        exam_time: NaiveTime::from_hms_opt(hour, 0, 0),
    }
}

pub(super) fn roster() -> Vec<Candidate> {
    vec![
        pupil(1, "John Smith", "11", "11A"),
        pupil(2, "Emma Johnson", "11", "11A"),
        pupil(3, "James Williams", "11", "11B"),
        pupil(4, "Sophie Brown", "11", "11B"),
        pupil(5, "Oliver Davis", "12", "12A"),
        pupil(6, "Isabella Wilson", "12", "12A"),
        pupil(7, "Lucas Martinez", "12", "12B"),
        pupil(8, "Mia Anderson", "10", "10A"),
    ]
}

pub(super) fn maths() -> Syllabus {
    Syllabus {
        id: SyllabusId(1),
        code: "8300".to_string(),
        title: "GCSE Mathematics".to_string(),
        organization: "AQA".to_string(),
        level: "GCSE".to_string(),
        options: vec![
            paper(1, "8300/1H", "Paper 1 Higher", (2024, 11, 15), 9),
            paper(2, "8300/2H", "Paper 2 Higher", (2024, 11, 18), 13),
            paper(3, "8300/3H", "Paper 3 Higher", (2024, 11, 20), 9),
        ],
    }
}

pub(super) fn english() -> Syllabus {
    Syllabus {
        id: SyllabusId(2),
        code: "8700".to_string(),
        title: "GCSE English Language".to_string(),
        organization: "AQA".to_string(),
        level: "GCSE".to_string(),
        options: vec![
            paper(4, "8700/1", "Paper 1", (2024, 11, 22), 9),
            paper(5, "8700/2", "Paper 2", (2024, 11, 25), 13),
        ],
    }
}

pub(super) fn reference_data() -> Arc<ReferenceData> {
    Arc::new(ReferenceData::new(roster(), vec![maths(), english()]))
}

pub(super) fn build_service() -> (
    EntryService<InMemoryEntryRepository>,
    Arc<InMemoryEntryRepository>,
) {
    let repository = Arc::new(InMemoryEntryRepository::new());
    let service = EntryService::new(reference_data(), repository.clone());
    (service, repository)
}

pub(super) fn entry_router_with_service(
    service: EntryService<InMemoryEntryRepository>,
) -> axum::Router {
    entry_router(Arc::new(service))
}

pub(super) struct UnavailableRepository;

impl EntryRepository for UnavailableRepository {
    fn entries(&self) -> Result<Vec<Entry>, RepositoryError> {
        Err(RepositoryError::Unavailable("database offline".to_string()))
    }

    fn fetch_entry(&self, _id: EntryId) -> Result<Option<Entry>, RepositoryError> {
        Err(RepositoryError::Unavailable("database offline".to_string()))
    }

    fn insert_entry(&self, _entry: NewEntry) -> Result<Entry, RepositoryError> {
        Err(RepositoryError::Unavailable("database offline".to_string()))
    }

    fn update_entry(&self, _entry: Entry) -> Result<(), RepositoryError> {
        Err(RepositoryError::Unavailable("database offline".to_string()))
    }

    fn placeholders(&self) -> Result<Vec<PlaceholderEntry>, RepositoryError> {
        Err(RepositoryError::Unavailable("database offline".to_string()))
    }

    fn fetch_placeholder(
        &self,
        _id: PlaceholderId,
    ) -> Result<Option<PlaceholderEntry>, RepositoryError> {
        Err(RepositoryError::Unavailable("database offline".to_string()))
    }

    fn insert_placeholder(&self, _syllabus: &Syllabus) -> Result<PlaceholderEntry, RepositoryError> {
        Err(RepositoryError::Unavailable("database offline".to_string()))
    }

    fn commit_resolution(
        &self,
        _placeholder: PlaceholderId,
        _options: &[OptionId],
        _entries: Vec<NewEntry>,
    ) -> Result<(Vec<Entry>, PlaceholderEntry), RepositoryError> {
        Err(RepositoryError::Unavailable("database offline".to_string()))
    }
}

pub(super) async fn read_json_body(response: Response) -> Value {
    let body = axum::body::to_bytes(response.into_body(), 64 * 1024)
        .await
        .expect("read body");
    serde_json::from_slice(&body).expect("json payload")
}
