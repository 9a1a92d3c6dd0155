use chrono::{Duration, NaiveDateTime};
use serde::{Deserialize, Serialize};
use tracing::info;

/// School-wide switches applied on top of each board's release window.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct EmbargoControls {
    pub master_active: bool,
    pub auto_release: bool,
    pub pre_release_notice_hours: u32,
}

impl Default for EmbargoControls {
    fn default() -> Self {
        Self {
            master_active: true,
            auto_release: true,
            pre_release_notice_hours: 24,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EmbargoState {
    Pending,
    Active,
    Released,
}

impl EmbargoState {
    pub const fn label(self) -> &'static str {
        match self {
            Self::Pending => "Pending",
            Self::Active => "Active",
            Self::Released => "Released",
        }
    }
}

/// Release window for one awarding organisation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BoardEmbargo {
    pub organization: String,
    pub starts_at: NaiveDateTime,
    pub release_at: NaiveDateTime,
    /// Set when staff release results by hand while auto-release is off.
    #[serde(default)]
    pub released_manually: bool,
}

impl BoardEmbargo {
    pub fn new(
        organization: impl Into<String>,
        starts_at: NaiveDateTime,
        release_at: NaiveDateTime,
    ) -> Self {
        Self {
            organization: organization.into(),
            starts_at,
            release_at,
            released_manually: false,
        }
    }

    pub fn state_at(&self, now: NaiveDateTime) -> EmbargoState {
        if now < self.starts_at {
            EmbargoState::Pending
        } else if now < self.release_at {
            EmbargoState::Active
        } else {
            EmbargoState::Released
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum EmbargoError {
    #[error("please enter the awarding organisation")]
    MissingOrganization,
    #[error("release time {release_at} must be after embargo start {starts_at}")]
    InvalidWindow {
        starts_at: NaiveDateTime,
        release_at: NaiveDateTime,
    },
    #[error("an embargo for '{0}' already exists")]
    DuplicateBoard(String),
    #[error("no embargo registered for '{0}'")]
    UnknownBoard(String),
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EmbargoRegister {
    controls: EmbargoControls,
    boards: Vec<BoardEmbargo>,
}

impl EmbargoRegister {
    pub fn new(controls: EmbargoControls) -> Self {
        Self {
            controls,
            boards: Vec::new(),
        }
    }

    pub fn controls(&self) -> EmbargoControls {
        self.controls
    }

    pub fn set_controls(&mut self, controls: EmbargoControls) {
        self.controls = controls;
    }

    pub fn boards(&self) -> &[BoardEmbargo] {
        &self.boards
    }

    /// Organisation names compare case-insensitively.
    pub fn board(&self, organization: &str) -> Option<&BoardEmbargo> {
        let organization = organization.trim();
        self.boards
            .iter()
            .find(|board| board.organization.eq_ignore_ascii_case(organization))
    }

    pub fn add_board(&mut self, board: BoardEmbargo) -> Result<&BoardEmbargo, EmbargoError> {
        let organization = board.organization.trim().to_string();
        if organization.is_empty() {
            return Err(EmbargoError::MissingOrganization);
        }
        if board.release_at <= board.starts_at {
            return Err(EmbargoError::InvalidWindow {
                starts_at: board.starts_at,
                release_at: board.release_at,
            });
        }
        if self.board(&organization).is_some() {
            return Err(EmbargoError::DuplicateBoard(organization));
        }

        info!(
            organization = %organization,
            release_at = %board.release_at,
            "registered board embargo"
        );
        self.boards.push(BoardEmbargo {
            organization,
            ..board
        });
        let index = self.boards.len() - 1;
        Ok(&self.boards[index])
    }

    /// Manual release for boards whose window has passed while auto-release is off.
    pub fn release(&mut self, organization: &str) -> Result<(), EmbargoError> {
        let organization = organization.trim();
        let board = self
            .boards
            .iter_mut()
            .find(|board| board.organization.eq_ignore_ascii_case(organization))
            .ok_or_else(|| EmbargoError::UnknownBoard(organization.to_string()))?;
        board.released_manually = true;
        info!(organization = %board.organization, "released board embargo manually");
        Ok(())
    }

    pub fn is_embargoed(&self, organization: &str, now: NaiveDateTime) -> bool {
        if !self.controls.master_active {
            return false;
        }
        let Some(board) = self.board(organization) else {
            return false;
        };

        match board.state_at(now) {
            EmbargoState::Pending => false,
            EmbargoState::Active => !board.released_manually,
            EmbargoState::Released => !self.controls.auto_release && !board.released_manually,
        }
    }

    /// True inside the notice window before a board's release time.
    pub fn notice_due(&self, organization: &str, now: NaiveDateTime) -> bool {
        let Some(board) = self.board(organization) else {
            return false;
        };
        let window = Duration::hours(i64::from(self.controls.pre_release_notice_hours));
        if now >= board.release_at {
            return false;
        }
        // A window reaching past the calendar's start covers everything before release.
        board
            .release_at
            .checked_sub_signed(window)
            .map_or(true, |opens_at| now >= opens_at)
    }

    pub fn active_boards(&self, now: NaiveDateTime) -> Vec<&BoardEmbargo> {
        self.boards
            .iter()
            .filter(|board| self.is_embargoed(&board.organization, now))
            .collect()
    }
}
