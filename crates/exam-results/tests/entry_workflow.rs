use std::collections::BTreeSet;
use std::sync::Arc;

use exam_results::workflows::catalog::{
    Candidate, CandidateId, OptionId, ReferenceData, Syllabus, SyllabusId, SyllabusOption,
};
use exam_results::workflows::entries::{
    CandidateResult, CandidateSelection, CreateEntryRequest, EntryError, EntryRepository,
    EntryService, InMemoryEntryRepository, ResolvePlaceholderRequest, SelectionError,
};

fn candidate(id: u32, year: &str, reg: &str) -> Candidate {
    Candidate {
        id: CandidateId(id),
        name: format!("Pupil {id}"),
        year_group: year.to_string(),
        reg_group: reg.to_string(),
        student_id: None,
        subjects: Vec::new(),
    }
}

fn option(id: u32, code: &str) -> SyllabusOption {
    SyllabusOption {
        id: OptionId(id),
        code: code.to_string(),
        title: format!("Paper {id}"),
        exam_date: None,
        exam_time: None,
    }
}

fn maths() -> Syllabus {
    Syllabus {
        id: SyllabusId(1),
        code: "8300".to_string(),
        title: "GCSE Mathematics".to_string(),
        organization: "AQA".to_string(),
        level: "GCSE".to_string(),
        options: vec![
            option(1, "8300/1H"),
            option(2, "8300/2H"),
            option(3, "8300/3H"),
        ],
    }
}

fn mixed_roster() -> Vec<Candidate> {
    vec![
        candidate(1, "11", "11A"),
        candidate(2, "11", "11B"),
        candidate(3, "12", "12A"),
        candidate(4, "11", "11A"),
        candidate(5, "10", "10A"),
    ]
}

fn service(roster: Vec<Candidate>) -> (
    EntryService<InMemoryEntryRepository>,
    Arc<InMemoryEntryRepository>,
) {
    let repository = Arc::new(InMemoryEntryRepository::new());
    let reference = Arc::new(ReferenceData::new(roster, vec![maths()]));
    (EntryService::new(reference, repository.clone()), repository)
}

#[test]
fn resolver_returns_exactly_the_matching_roster_subset() {
    let roster = mixed_roster();
    let roster_ids: BTreeSet<CandidateId> = roster.iter().map(|c| c.id).collect();

    let selections = [
        CandidateSelection::specific([1, 3, 99]),
        CandidateSelection::specific(Vec::<u32>::new()),
        CandidateSelection::ByYearGroup("11".to_string()),
        CandidateSelection::ByYearGroup("13".to_string()),
        CandidateSelection::ByRegGroup("11A".to_string()),
        CandidateSelection::ByRegGroup("11a".to_string()),
    ];

    for selection in &selections {
        let resolved = selection.resolve(&roster);
        assert!(resolved.is_subset(&roster_ids), "{selection:?} escaped the roster");

        let expected: Option<BTreeSet<CandidateId>> = match selection {
            CandidateSelection::ByYearGroup(year) => Some(
                roster
                    .iter()
                    .filter(|c| c.year_group == *year)
                    .map(|c| c.id)
                    .collect(),
            ),
            CandidateSelection::ByRegGroup(group) => Some(
                roster
                    .iter()
                    .filter(|c| c.reg_group == *group)
                    .map(|c| c.id)
                    .collect(),
            ),
            CandidateSelection::Specific(_) => None,
        };
        if let Some(expected) = expected {
            assert_eq!(resolved, expected);
        }
    }

    assert_eq!(
        CandidateSelection::specific([1, 3, 99]).resolve(&roster),
        [CandidateId(1), CandidateId(3)].into_iter().collect()
    );
}

#[test]
fn every_mode_rejects_selections_that_match_nobody() {
    let (service, repository) = service(mixed_roster());

    for selection in [
        CandidateSelection::specific(Vec::<u32>::new()),
        CandidateSelection::ByYearGroup("13".to_string()),
        CandidateSelection::ByRegGroup("9Z".to_string()),
    ] {
        let result = service.create_entry(CreateEntryRequest {
            syllabus_code: "8300".to_string(),
            option_code: "8300/1H".to_string(),
            selection,
        });
        assert!(matches!(
            result,
            Err(EntryError::Selection(
                SelectionError::EmptySelection | SelectionError::NoMatchingCandidates
            ))
        ));
    }

    assert!(repository.entries().expect("entries").is_empty());
}

#[test]
fn partial_resolution_leaves_the_unconfigured_option() {
    let (service, repository) = service(mixed_roster());
    let placeholder = service.create_placeholder("8300").expect("placeholder");

    let outcome = service
        .resolve_placeholder(
            placeholder.id,
            ResolvePlaceholderRequest::default()
                .with(OptionId(1), CandidateSelection::ByYearGroup("11".to_string()))
                .with(OptionId(2), CandidateSelection::specific([3])),
        )
        .expect("resolves");

    assert_eq!(outcome.created.len(), 2);
    let remaining = outcome.remaining.expect("placeholder kept");
    let codes: Vec<&str> = remaining
        .remaining_options()
        .iter()
        .map(|option| option.code.as_str())
        .collect();
    assert_eq!(codes, vec!["8300/3H"]);

    let stored = repository.placeholders().expect("placeholders");
    assert_eq!(stored.len(), 1);
    assert_eq!(stored[0], remaining);
}

#[test]
fn resolving_all_options_at_once_removes_the_placeholder() {
    let (service, repository) = service(mixed_roster());
    let placeholder = service.create_placeholder("8300").expect("placeholder");

    let outcome = service
        .resolve_placeholder(
            placeholder.id,
            ResolvePlaceholderRequest::default()
                .with(OptionId(1), CandidateSelection::specific([1]))
                .with(OptionId(2), CandidateSelection::specific([2]))
                .with(OptionId(3), CandidateSelection::ByRegGroup("11A".to_string())),
        )
        .expect("resolves");

    assert_eq!(outcome.created.len(), 3);
    assert!(outcome.remaining.is_none());
    assert!(repository.placeholders().expect("placeholders").is_empty());
    assert_eq!(repository.entries().expect("entries").len(), 3);
}

#[test]
fn invalid_option_leaves_placeholder_and_entries_untouched() {
    let (service, repository) = service(mixed_roster());
    let placeholder = service.create_placeholder("8300").expect("placeholder");

    let result = service.resolve_placeholder(
        placeholder.id,
        ResolvePlaceholderRequest::default()
            .with(OptionId(1), CandidateSelection::specific([1]))
            .with(OptionId(2), CandidateSelection::ByYearGroup(String::new())),
    );

    assert!(matches!(result, Err(EntryError::PlaceholderOptions(ref failures)) if failures.len() == 1));
    assert!(repository.entries().expect("entries").is_empty());
    let stored = repository
        .fetch_placeholder(placeholder.id)
        .expect("fetch")
        .expect("still present");
    assert_eq!(stored.remaining_options().len(), 3);
}

#[test]
fn year_group_entry_for_two_pupils() {
    let roster = vec![candidate(1, "11", "11A"), candidate(2, "11", "11B")];
    let (service, repository) = service(roster);

    let entry = service
        .create_entry(CreateEntryRequest {
            syllabus_code: "8300".to_string(),
            option_code: "8300/1H".to_string(),
            selection: CandidateSelection::ByYearGroup("11".to_string()),
        })
        .expect("entry created");

    assert_eq!(entry.candidate_ids(), &[CandidateId(1), CandidateId(2)]);
    for id in entry.candidate_ids() {
        assert_eq!(entry.result(*id), Some(&CandidateResult::pending()));
    }
    assert_eq!(entry.result(CandidateId(1)).map(|r| r.points), Some(0));

    let stored = repository.entries().expect("entries");
    assert_eq!(stored, vec![entry]);
}
