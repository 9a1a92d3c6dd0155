//! Exams office engine: candidate entries, placeholder resolution, and results aggregation.

pub mod config;
pub mod error;
pub mod telemetry;
pub mod workflows;
