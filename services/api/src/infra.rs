use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use exam_results::config::ResultsConfig;
use exam_results::error::AppError;
use exam_results::workflows::catalog::{
    Candidate, CandidateId, NewSeason, OptionDraft, ReferenceStore, SeriesCatalog, SeriesKind,
    SeriesStatus, SyllabusDraft,
};
use exam_results::workflows::embargo::{BoardEmbargo, EmbargoControls, EmbargoRegister};
use exam_results::workflows::entries::{
    CandidateResult, CandidateSelection, CreateEntryRequest, EntryService,
    InMemoryEntryRepository, ResultStatus,
};
use exam_results::workflows::results::{merge_channels, CandidateResults};
use metrics_exporter_prometheus::PrometheusHandle;
use serde::Deserialize;
use std::sync::atomic::AtomicBool;
use std::sync::{Arc, Mutex};
use tracing::info;

#[derive(Clone)]
pub(crate) struct AppState {
    pub(crate) readiness: Arc<AtomicBool>,
    pub(crate) metrics: Arc<PrometheusHandle>,
}

/// Everything the exams office works against during one server session.
#[derive(Clone)]
pub(crate) struct ExamsOffice {
    pub(crate) entries: Arc<EntryService<InMemoryEntryRepository>>,
    /// Roster and series catalog, shared with the entry service.
    pub(crate) reference: ReferenceStore,
    pub(crate) embargo: Arc<Mutex<EmbargoRegister>>,
    /// Last externally imported batch, merged behind the internal channel on read.
    pub(crate) imported: Arc<Mutex<Vec<CandidateResults>>>,
}

impl ExamsOffice {
    /// Seeded or empty office depending on configuration.
    pub(crate) fn from_config(config: &ResultsConfig) -> Result<Self, AppError> {
        let controls = EmbargoControls {
            pre_release_notice_hours: config.embargo_notice_hours,
            ..EmbargoControls::default()
        };

        if !config.seed_demo_data {
            let reference = ReferenceStore::default();
            let entries = EntryService::new(
                Arc::new(reference.clone()),
                Arc::new(InMemoryEntryRepository::new()),
            );
            return Ok(Self {
                entries: Arc::new(entries),
                reference,
                embargo: Arc::new(Mutex::new(EmbargoRegister::new(controls))),
                imported: Arc::default(),
            });
        }

        Self::demo(controls)
    }

    /// Internal results with the imported channel appended.
    pub(crate) fn merged_results(&self) -> Result<Vec<CandidateResults>, AppError> {
        let internal = self.entries.candidate_results()?;
        let imported = self.imported.lock().expect("import mutex poisoned").clone();
        Ok(merge_channels(internal, imported))
    }

    pub(crate) fn demo(controls: EmbargoControls) -> Result<Self, AppError> {
        let reference = ReferenceStore::new(demo_roster(), demo_catalog()?)?;
        let entries = EntryService::new(
            Arc::new(reference.clone()),
            Arc::new(InMemoryEntryRepository::new()),
        );
        seed_entries(&entries)?;

        let mut embargo = EmbargoRegister::new(controls);
        for (organization, release) in [
            ("AQA", on(2024, 8, 22)),
            ("Edexcel", on(2024, 8, 15)),
            ("OCR", on(2024, 8, 15)),
            ("WJEC", on(2024, 8, 12)),
        ] {
            embargo.add_board(BoardEmbargo::new(
                organization,
                at(on(2024, 8, 1), 0),
                at(release, 9),
            ))?;
        }

        info!(
            series = reference.read(|catalog| catalog.series().len()),
            boards = embargo.boards().len(),
            "seeded demo exams office"
        );
        Ok(Self {
            entries: Arc::new(entries),
            reference,
            embargo: Arc::new(Mutex::new(embargo)),
            imported: Arc::default(),
        })
    }
}

fn on(year: i32, month: u32, day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(year, month, day).unwrap_or_default()
}

fn at(date: NaiveDate, hour: u32) -> NaiveDateTime {
    date.and_time(NaiveTime::from_hms_opt(hour, 0, 0).unwrap_or_default())
}

fn pupil(id: u32, name: &str, year: &str, reg_group: &str, subjects: &[&str]) -> Candidate {
    Candidate {
        id: CandidateId(id),
        name: name.to_string(),
        year_group: year.to_string(),
        reg_group: reg_group.to_string(),
        student_id: Some(format!("{}", 12340 + id)),
        subjects: subjects.iter().map(|subject| subject.to_string()).collect(),
    }
}

pub(crate) fn demo_roster() -> Vec<Candidate> {
    vec![
        pupil(1, "John Smith", "11", "11A", &["Mathematics", "English"]),
        pupil(2, "Emma Johnson", "11", "11A", &["Mathematics", "Science"]),
        pupil(3, "James Williams", "11", "11B", &["English", "History"]),
        pupil(4, "Sophie Brown", "11", "11B", &["Mathematics", "English", "Science"]),
        pupil(5, "Oliver Davis", "12", "12A", &["Mathematics", "Physics"]),
        pupil(6, "Isabella Wilson", "12", "12A", &["English", "Chemistry"]),
        pupil(7, "Lucas Martinez", "12", "12B", &["Mathematics", "Biology"]),
        pupil(8, "Mia Anderson", "10", "10A", &["Mathematics", "English"]),
    ]
}

fn paper(code: &str, title: &str, date: NaiveDate, hour: u32) -> OptionDraft {
    OptionDraft {
        exam_date: Some(date),
        exam_time: NaiveTime::from_hms_opt(hour, 0, 0),
        ..OptionDraft::new(code, title)
    }
}

pub(crate) fn demo_catalog() -> Result<SeriesCatalog, AppError> {
    let mut catalog = SeriesCatalog::default();

    let may = catalog
        .create_season(NewSeason {
            name: "May 2024".to_string(),
            kind: SeriesKind::External,
            status: SeriesStatus::Active,
            organization: "AQA".to_string(),
            start_date: on(2024, 5, 1),
            end_date: on(2024, 6, 30),
        })?
        .id;
    catalog.create_season(NewSeason {
        name: "November 2024 Resits".to_string(),
        kind: SeriesKind::External,
        status: SeriesStatus::Planning,
        organization: "AQA".to_string(),
        start_date: on(2024, 11, 1),
        end_date: on(2024, 11, 30),
    })?;
    catalog.create_season(NewSeason {
        name: "Mock Exams December 2024".to_string(),
        kind: SeriesKind::Internal,
        status: SeriesStatus::Draft,
        organization: String::new(),
        start_date: on(2024, 12, 2),
        end_date: on(2024, 12, 13),
    })?;

    catalog.add_syllabus(
        may,
        SyllabusDraft {
            code: "8300".to_string(),
            title: "GCSE Mathematics".to_string(),
            organization: "AQA".to_string(),
            level: "GCSE".to_string(),
            options: vec![
                paper("8300/1H", "Paper 1 Higher", on(2024, 11, 15), 9),
                paper("8300/2H", "Paper 2 Higher", on(2024, 11, 18), 13),
                paper("8300/3H", "Paper 3 Higher", on(2024, 11, 20), 9),
            ],
        },
    )?;
    catalog.add_syllabus(
        may,
        SyllabusDraft {
            code: "8700".to_string(),
            title: "GCSE English Language".to_string(),
            organization: "AQA".to_string(),
            level: "GCSE".to_string(),
            options: vec![
                paper("8700/1", "Paper 1", on(2024, 11, 22), 9),
                paper("8700/2", "Paper 2", on(2024, 11, 25), 13),
            ],
        },
    )?;

    Ok(catalog)
}

fn seed_entries(service: &EntryService<InMemoryEntryRepository>) -> Result<(), AppError> {
    let seeded = [
        (
            "8300",
            "8300/1H",
            vec![
                (1, "7", ResultStatus::Validated),
                (2, "8", ResultStatus::Validated),
                (3, "6", ResultStatus::PendingReview),
                (4, "9", ResultStatus::Validated),
            ],
        ),
        (
            "8700",
            "8700/1",
            vec![
                (2, "6", ResultStatus::Validated),
                (3, "7", ResultStatus::Validated),
                (4, "8", ResultStatus::PendingReview),
            ],
        ),
    ];

    for (syllabus, option, results) in seeded {
        let entry = service.create_entry(CreateEntryRequest {
            syllabus_code: syllabus.to_string(),
            option_code: option.to_string(),
            selection: CandidateSelection::specific(results.iter().map(|(id, _, _)| *id)),
        })?;
        for (candidate, grade, status) in results {
            service.record_result(
                entry.id,
                CandidateId(candidate),
                CandidateResult {
                    grade: grade.to_string(),
                    points: grade.parse().unwrap_or(0),
                    status,
                },
            )?;
        }
    }

    service.create_placeholder("8300")?;
    Ok(())
}

pub(crate) fn parse_date(raw: &str) -> Result<NaiveDate, String> {
    NaiveDate::parse_from_str(raw.trim(), "%Y-%m-%d")
        .map_err(|err| format!("failed to parse '{raw}' as YYYY-MM-DD ({err})"))
}

/// Accepts `YYYY-MM-DDTHH:MM[:SS]` or a bare date (midnight).
pub(crate) fn parse_datetime(raw: &str) -> Result<NaiveDateTime, String> {
    let trimmed = raw.trim();
    for format in ["%Y-%m-%dT%H:%M:%S", "%Y-%m-%dT%H:%M", "%Y-%m-%d %H:%M"] {
        if let Ok(value) = NaiveDateTime::parse_from_str(trimmed, format) {
            return Ok(value);
        }
    }
    parse_date(trimmed)
        .map(|date| date.and_time(NaiveTime::MIN))
        .map_err(|_| format!("failed to parse '{raw}' as YYYY-MM-DDTHH:MM"))
}

pub(crate) fn deserialize_optional_datetime<'de, D>(
    deserializer: D,
) -> Result<Option<NaiveDateTime>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let opt = Option::<String>::deserialize(deserializer)?;
    opt.filter(|value| !value.trim().is_empty())
        .map(|value| parse_datetime(&value).map_err(serde::de::Error::custom))
        .transpose()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn demo_office_seeds_entries_and_placeholder() {
        let office = ExamsOffice::demo(EmbargoControls::default()).expect("demo seeds");

        let entries = office.entries.entries().expect("entries");
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0].candidate_count(), 4);
        assert_eq!(office.entries.placeholders().expect("placeholders").len(), 1);

        assert_eq!(office.reference.read(|catalog| catalog.stats().options), 5);
        assert_eq!(office.reference.roster().len(), 8);
    }

    #[test]
    fn unseeded_office_starts_empty() {
        let office = ExamsOffice::from_config(&ResultsConfig {
            seed_demo_data: false,
            embargo_notice_hours: 48,
        })
        .expect("office builds");

        assert!(office.entries.entries().expect("entries").is_empty());
        assert!(office.reference.roster().is_empty());
        let embargo = office.embargo.lock().expect("embargo mutex poisoned");
        assert_eq!(embargo.controls().pre_release_notice_hours, 48);
    }

    #[test]
    fn parse_datetime_accepts_dates_and_timestamps() {
        assert_eq!(
            parse_datetime("2024-08-15T09:30").expect("timestamp"),
            at(on(2024, 8, 15), 9) + chrono::Duration::minutes(30)
        );
        assert_eq!(parse_datetime("2024-08-15").expect("date"), at(on(2024, 8, 15), 0));
        assert!(parse_datetime("15/08/2024").is_err());
    }
}
