use std::sync::Arc;

use chrono::NaiveDate;
use exam_results::workflows::catalog::{
    accept_upload, BasedataFormat, Candidate, CandidateId, CatalogError, NewSeason, OptionDraft,
    ReferenceData, ReferenceStore, SeriesCatalog, SeriesKind, SeriesStatus, SyllabusDetails, SyllabusWizard,
    UploadError, WizardError, WizardStep,
};
use exam_results::workflows::entries::{
    CandidateSelection, CreateEntryRequest, EntryError, EntryService, InMemoryEntryRepository,
};

fn date(month: u32, day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(2024, month, day).expect("valid date")
}

fn season(name: &str) -> NewSeason {
    NewSeason {
        name: name.to_string(),
        kind: SeriesKind::External,
        status: SeriesStatus::Active,
        organization: "AQA".to_string(),
        start_date: date(5, 1),
        end_date: date(6, 30),
    }
}

#[test]
fn season_requires_ordered_dates() {
    let mut catalog = SeriesCatalog::default();
    let mut backwards = season("Summer 2024");
    backwards.end_date = date(4, 1);

    assert!(matches!(
        catalog.create_season(backwards),
        Err(CatalogError::InvalidDateRange { .. })
    ));
    assert!(catalog.series().is_empty());
}

#[test]
fn wizard_built_syllabus_feeds_the_entry_engine() {
    let mut catalog = SeriesCatalog::default();
    let series_id = catalog.create_season(season("May 2024")).expect("season").id;

    let mut wizard = SyllabusWizard::new();
    assert_eq!(
        wizard.next(),
        Err(WizardError::MissingField { field: "season" })
    );
    wizard.select_season(series_id);
    assert_eq!(wizard.next(), Ok(WizardStep::SyllabusDetails));
    wizard.set_details(SyllabusDetails {
        code: "8461".to_string(),
        title: "GCSE Biology".to_string(),
        organization: "AQA".to_string(),
        level: "GCSE".to_string(),
    });
    assert_eq!(wizard.next(), Ok(WizardStep::AddOptions));
    wizard
        .add_option(OptionDraft::new("8461/1H", "Paper 1 Higher"))
        .expect("option accepted");
    assert_eq!(wizard.next(), Ok(WizardStep::Review));
    let syllabus = wizard.finish(&mut catalog).expect("syllabus saved");
    assert_eq!(wizard.step(), WizardStep::SelectSeason);

    let series = catalog.get(series_id).expect("series present");
    assert_eq!(series.option_count(), 1);

    let roster = vec![Candidate {
        id: CandidateId(1),
        name: "John Smith".to_string(),
        year_group: "11".to_string(),
        reg_group: "11A".to_string(),
        student_id: None,
        subjects: vec!["Biology".to_string()],
    }];
    let reference = Arc::new(ReferenceData::for_series(roster, series));
    let service = EntryService::new(reference, Arc::new(InMemoryEntryRepository::new()));

    let entry = service
        .create_entry(CreateEntryRequest {
            syllabus_code: syllabus.code.clone(),
            option_code: "8461/1H".to_string(),
            selection: CandidateSelection::ByRegGroup("11A".to_string()),
        })
        .expect("entry created");
    assert_eq!(entry.candidate_count(), 1);
}

#[test]
fn store_backed_service_sees_catalog_and_roster_changes() {
    let store = ReferenceStore::default();
    let service = EntryService::new(
        Arc::new(store.clone()),
        Arc::new(InMemoryEntryRepository::new()),
    );
    let request = CreateEntryRequest {
        syllabus_code: "8461".to_string(),
        option_code: "8461/1H".to_string(),
        selection: CandidateSelection::ByYearGroup("11".to_string()),
    };
    assert!(matches!(
        service.create_entry(request.clone()),
        Err(EntryError::UnknownSyllabus(_))
    ));

    let mut wizard = SyllabusWizard::new();
    store
        .write(|catalog| {
            let series_id = catalog.create_season(season("May 2024"))?.id;
            wizard.select_season(series_id);
            Ok::<_, CatalogError>(())
        })
        .expect("season created");
    wizard.next().expect("details step");
    wizard.set_details(SyllabusDetails {
        code: "8461".to_string(),
        title: "GCSE Biology".to_string(),
        organization: "AQA".to_string(),
        level: "GCSE".to_string(),
    });
    wizard.next().expect("options step");
    wizard
        .add_option(OptionDraft::new("8461/1H", "Paper 1 Higher"))
        .expect("option accepted");
    wizard.next().expect("review step");
    store
        .write(|catalog| wizard.finish(catalog).map(|_| ()))
        .expect("syllabus saved");

    store
        .replace_roster(vec![Candidate {
            id: CandidateId(1),
            name: "John Smith".to_string(),
            year_group: "11".to_string(),
            reg_group: "11A".to_string(),
            student_id: None,
            subjects: Vec::new(),
        }])
        .expect("roster loaded");

    let entry = service.create_entry(request).expect("entry created");
    assert_eq!(entry.candidate_count(), 1);
}

#[test]
fn copied_syllabus_needs_its_own_code() {
    let mut catalog = SeriesCatalog::default();
    let series_id = catalog.create_season(season("May 2024")).expect("season").id;
    let mut wizard = SyllabusWizard::new();
    wizard.select_season(series_id);
    wizard.next().expect("details step");
    wizard.set_details(SyllabusDetails {
        code: "8300".to_string(),
        title: "GCSE Mathematics".to_string(),
        organization: "AQA".to_string(),
        level: "GCSE".to_string(),
    });
    wizard.next().expect("options step");
    wizard
        .add_option(OptionDraft::new("8300/1H", "Paper 1 Higher"))
        .expect("option");
    wizard.next().expect("review step");
    wizard.finish(&mut catalog).expect("saved");

    let copy = catalog.copy_syllabus("8300").expect("copy");
    assert_eq!(copy.code, "8300-COPY");
    assert_eq!(copy.title, "GCSE Mathematics (Copy)");
    let added = catalog.add_syllabus(series_id, copy).expect("copy saved");
    assert_eq!(added.options.len(), 1);
    assert_eq!(catalog.stats().syllabuses, 2);
}

#[test]
fn basedata_upload_is_judged_by_extension() {
    let receipt = accept_upload("students_2024.XLSX").expect("accepted");
    assert_eq!(receipt.format, BasedataFormat::Xlsx);

    assert_eq!(
        accept_upload("timetable.pdf"),
        Err(UploadError::UnsupportedFileType {
            file_name: "timetable.pdf".to_string()
        })
    );
    assert_eq!(accept_upload("   "), Err(UploadError::MissingFile));
}
