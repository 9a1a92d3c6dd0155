//! Candidate-centric results: aggregation across entries, external imports, grade tiers.

pub mod aggregate;
pub mod grade;
pub mod import;
pub mod query;
pub mod rollup;

pub use aggregate::{aggregate_by_candidate, merge_channels, CandidateResults, SubjectResult};
pub use grade::GradeTier;
pub use import::{ResultsImportError, ResultsImporter};
pub use query::{validation_queue, ResultsOverview, ResultsQuery};
pub use rollup::StatusRollup;
