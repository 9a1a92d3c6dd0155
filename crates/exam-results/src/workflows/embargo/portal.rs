use chrono::NaiveDateTime;
use serde::Serialize;

use super::domain::EmbargoRegister;
use crate::workflows::entries::ResultStatus;
use crate::workflows::results::{CandidateResults, GradeTier};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum Visibility {
    Released,
    Embargoed { release_at: NaiveDateTime },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StatementLine {
    pub subject: String,
    pub code: String,
    pub organization: Option<String>,
    pub grade: Option<String>,
    pub points: Option<u32>,
    pub tier: Option<GradeTier>,
    pub status: ResultStatus,
    pub visibility: Visibility,
}

/// What a student sees on the results portal at a given moment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StudentStatement {
    pub student_key: String,
    pub name: String,
    pub year_group: String,
    pub lines: Vec<StatementLine>,
    pub released_points: u32,
}

impl StudentStatement {
    pub fn embargoed_count(&self) -> usize {
        self.lines
            .iter()
            .filter(|line| matches!(line.visibility, Visibility::Embargoed { .. }))
            .count()
    }
}

pub fn student_statement(
    record: &CandidateResults,
    register: &EmbargoRegister,
    now: NaiveDateTime,
) -> StudentStatement {
    let lines: Vec<StatementLine> = record
        .results
        .iter()
        .map(|result| {
            let embargo = result
                .organization
                .as_deref()
                .filter(|organization| register.is_embargoed(organization, now))
                .and_then(|organization| register.board(organization));

            match embargo {
                Some(board) => StatementLine {
                    subject: result.subject.clone(),
                    code: result.code.clone(),
                    organization: result.organization.clone(),
                    grade: None,
                    points: None,
                    tier: None,
                    status: result.status,
                    visibility: Visibility::Embargoed {
                        release_at: board.release_at,
                    },
                },
                None => StatementLine {
                    subject: result.subject.clone(),
                    code: result.code.clone(),
                    organization: result.organization.clone(),
                    grade: Some(result.grade.clone()),
                    points: Some(result.points),
                    tier: Some(result.tier()),
                    status: result.status,
                    visibility: Visibility::Released,
                },
            }
        })
        .collect();

    let released_points = lines.iter().filter_map(|line| line.points).sum();

    StudentStatement {
        student_key: record.student_key.clone(),
        name: record.name.clone(),
        year_group: record.year_group.clone(),
        lines,
        released_points,
    }
}
