//! Reference data: the candidate roster, syllabuses and their papers, and examination series.

pub mod basedata;
pub mod domain;
pub mod series;
pub mod store;
pub mod wizard;

pub use basedata::{accept_upload, BasedataFormat, UploadError, UploadReceipt};
pub use domain::{
    Candidate, CandidateId, OptionId, ReferenceData, Series, SeriesId, SeriesKind, SeriesStatus,
    Syllabus, SyllabusId, SyllabusOption,
};
pub use series::{CatalogError, CatalogStats, NewSeason, OptionDraft, SeriesCatalog, SyllabusDraft};
pub use store::{ReferenceSource, ReferenceStore};
pub use wizard::{SyllabusDetails, SyllabusWizard, WizardError, WizardStep};
