use crate::infra::{parse_datetime, ExamsOffice};
use chrono::{Local, NaiveDateTime};
use clap::Args;
use exam_results::error::AppError;
use exam_results::workflows::catalog::accept_upload;
use exam_results::workflows::embargo::{student_statement, EmbargoControls, Visibility};
use exam_results::workflows::entries::{
    CandidateSelection, EntryError, EntryFilter, EntryListing, ResolvePlaceholderRequest,
    ResultStatus,
};
use exam_results::workflows::results::{
    validation_queue, CandidateResults, ResultsImporter, ResultsOverview, ResultsQuery,
};
use std::path::PathBuf;

#[derive(Args, Debug, Default)]
pub(crate) struct DemoArgs {
    /// Moment used for embargo checks (YYYY-MM-DDTHH:MM). Defaults to now.
    #[arg(long, value_parser = parse_datetime)]
    pub(crate) at: Option<NaiveDateTime>,
    /// Student whose portal statement is printed at the end.
    #[arg(long, default_value = "12344")]
    pub(crate) student: String,
}

#[derive(Args, Debug, Default)]
pub(crate) struct ResultsReportArgs {
    /// External results CSV merged behind the internal entries
    #[arg(long)]
    pub(crate) import_csv: Option<PathBuf>,
    /// Only show candidates whose rolled-up status matches
    #[arg(long, value_parser = parse_status)]
    pub(crate) status: Option<ResultStatus>,
    /// Match against candidate name or student id
    #[arg(long)]
    pub(crate) search: Option<String>,
    /// Only show candidates with a result in this subject
    #[arg(long)]
    pub(crate) subject: Option<String>,
}

#[derive(Args, Debug, Default)]
pub(crate) struct BasedataCheckArgs {
    /// File names to check
    #[arg(required = true)]
    pub(crate) files: Vec<String>,
}

fn parse_status(raw: &str) -> Result<ResultStatus, String> {
    ResultStatus::from_label(raw).ok_or_else(|| {
        format!("unknown status '{raw}' (expected Pending, Pending Review, Validated, or Conflict)")
    })
}

pub(crate) fn run_results_report(args: ResultsReportArgs) -> Result<(), AppError> {
    let ResultsReportArgs {
        import_csv,
        status,
        search,
        subject,
    } = args;

    let office = ExamsOffice::demo(EmbargoControls::default())?;
    if let Some(path) = import_csv {
        let imported = ResultsImporter::from_path(&path)?;
        println!(
            "Imported {} students from {}",
            imported.len(),
            path.display()
        );
        *office.imported.lock().expect("import mutex poisoned") = imported;
    }

    let records = office.merged_results()?;
    render_overview(&records);

    let query = ResultsQuery {
        search,
        status,
        subject,
    };
    let matching = query.apply(&records);
    println!("\nCandidates ({} of {})", matching.len(), records.len());
    for record in matching {
        render_candidate(record);
    }

    Ok(())
}

pub(crate) fn run_basedata_check(args: BasedataCheckArgs) -> Result<(), AppError> {
    let mut rejected = 0;
    for file in &args.files {
        match accept_upload(file) {
            Ok(receipt) => {
                let content_type = mime_guess::from_path(&receipt.file_name).first_or_octet_stream();
                println!(
                    "- {}: {} ({})",
                    receipt.file_name,
                    receipt.format.label(),
                    content_type.essence_str()
                );
            }
            Err(err) => {
                rejected += 1;
                println!("- {}: rejected, {}", file, err);
            }
        }
    }
    println!("{} accepted, {} rejected", args.files.len() - rejected, rejected);
    Ok(())
}

pub(crate) fn run_demo(args: DemoArgs) -> Result<(), AppError> {
    let DemoArgs { at, student } = args;
    let now = at.unwrap_or_else(|| Local::now().naive_local());

    println!("Exams office demo");
    let office = ExamsOffice::demo(EmbargoControls::default())?;

    office.reference.read(|catalog| {
        let stats = catalog.stats();
        println!(
            "\nCatalog: {} series | {} syllabuses | {} options",
            stats.series, stats.syllabuses, stats.options
        );
        for series in catalog.series() {
            println!(
                "- {} ({} / {}) {} to {}, {} syllabuses",
                series.name,
                series.kind.label(),
                series.status.label(),
                series.start_date,
                series.end_date,
                series.syllabuses.len()
            );
        }
    });

    println!("\nEntries");
    render_listing(&office.entries.list(&EntryFilter::default())?);

    let placeholders = office.entries.placeholders()?;
    if let Some(placeholder) = placeholders.first() {
        let remaining = placeholder.remaining_options();
        if let Some(option) = remaining.first() {
            println!(
                "\nResolving placeholder {} option {} for year 11",
                placeholder.id, option.code
            );
            let request = ResolvePlaceholderRequest::default()
                .with(option.id, CandidateSelection::ByYearGroup("11".to_string()));

            let outcome = office
                .entries
                .resolve_placeholder(placeholder.id, request.clone())?;
            for entry in &outcome.created {
                println!(
                    "- created entry {} {} with {} candidates",
                    entry.id,
                    entry.option_code,
                    entry.candidate_count()
                );
            }
            match &outcome.remaining {
                Some(rest) => println!("- {} options still open", rest.remaining_options().len()),
                None => println!("- placeholder fully resolved"),
            }

            match office.entries.resolve_placeholder(placeholder.id, request) {
                Err(EntryError::PlaceholderOptions(failures)) => {
                    println!("Resubmitting the same option is rejected:");
                    for failure in failures {
                        println!("  - {}", failure);
                    }
                }
                Err(err) => println!("Resubmission failed: {}", err),
                Ok(_) => println!("Resubmission unexpectedly succeeded"),
            }
        }
    }

    let records = office.merged_results()?;
    println!();
    render_overview(&records);
    let queue = validation_queue(&records);
    println!("Validation queue ({})", queue.len());
    for record in queue {
        render_candidate(record);
    }

    println!("\nEmbargo at {}", now.format("%Y-%m-%d %H:%M"));
    let register = office.embargo.lock().expect("embargo mutex poisoned");
    for board in register.boards() {
        let notice = if register.notice_due(&board.organization, now) {
            " | release notice due"
        } else {
            ""
        };
        println!(
            "- {}: {} until {}{}",
            board.organization,
            board.state_at(now).label(),
            board.release_at.format("%Y-%m-%d %H:%M"),
            notice
        );
    }

    match records.iter().find(|record| record.student_key == student) {
        Some(record) => {
            let statement = student_statement(record, &register, now);
            println!(
                "\nStatement for {} ({} results, {} embargoed)",
                statement.name,
                statement.lines.len(),
                statement.embargoed_count()
            );
            for line in &statement.lines {
                match line.visibility {
                    Visibility::Released => println!(
                        "  - {} {}: {}",
                        line.code,
                        line.subject,
                        line.grade.as_deref().unwrap_or("-")
                    ),
                    Visibility::Embargoed { release_at } => println!(
                        "  - {} {}: embargoed until {}",
                        line.code,
                        line.subject,
                        release_at.format("%Y-%m-%d %H:%M")
                    ),
                }
            }
        }
        None => println!("\nNo results recorded for student {}", student),
    }

    Ok(())
}

fn render_listing(listing: &[EntryListing]) {
    for row in listing {
        match row {
            EntryListing::Entry {
                id,
                option_code,
                option_title,
                status,
                candidate_count,
                ..
            } => println!(
                "- entry {} {} {} [{}] {} candidates",
                id,
                option_code,
                option_title,
                status.label(),
                candidate_count
            ),
            EntryListing::Placeholder {
                id,
                syllabus_code,
                remaining_options,
            } => {
                let codes: Vec<&str> = remaining_options
                    .iter()
                    .map(|option| option.code.as_str())
                    .collect();
                println!(
                    "- placeholder {} {} open options: {}",
                    id,
                    syllabus_code,
                    codes.join(", ")
                );
            }
        }
    }
}

fn render_overview(records: &[CandidateResults]) {
    let overview = ResultsOverview::from_records(records);
    println!(
        "Results: {} candidates | {} results | {:.0}% validated",
        overview.candidates,
        overview.results,
        overview.validated_pct()
    );
    println!(
        "- {} pending review | {} conflicts | {} pending",
        overview.pending_review, overview.conflicts, overview.pending
    );
}

fn render_candidate(record: &CandidateResults) {
    println!(
        "- {} {} (year {}) {} | {} points",
        record.student_key,
        record.name,
        record.year_group,
        record.status.label(),
        record.total_points()
    );
    for result in &record.results {
        println!(
            "    {} {}: {} [{}]",
            result.code,
            result.subject,
            if result.grade.is_empty() { "-" } else { result.grade.as_str() },
            result.status.label()
        );
    }
}
