//! Results embargo per awarding organisation and the student-facing statement.

pub mod domain;
pub mod portal;

pub use domain::{BoardEmbargo, EmbargoControls, EmbargoError, EmbargoRegister, EmbargoState};
pub use portal::{student_statement, StatementLine, StudentStatement, Visibility};
