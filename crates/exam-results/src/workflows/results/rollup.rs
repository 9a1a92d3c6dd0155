use crate::workflows::entries::ResultStatus;

/// Candidate-level status: Conflict outranks Pending Review, which outranks Validated.
/// Once downgraded the aggregate never moves back up; ungraded results are ignored.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StatusRollup {
    current: ResultStatus,
}

impl Default for StatusRollup {
    fn default() -> Self {
        Self {
            current: ResultStatus::Validated,
        }
    }
}

impl StatusRollup {
    pub fn observe(&mut self, status: ResultStatus) {
        let (Some(incoming), Some(current)) = (status.severity(), self.current.severity()) else {
            return;
        };
        if incoming > current {
            self.current = status;
        }
    }

    pub fn status(self) -> ResultStatus {
        self.current
    }

    pub fn over(statuses: impl IntoIterator<Item = ResultStatus>) -> ResultStatus {
        let mut rollup = Self::default();
        for status in statuses {
            rollup.observe(status);
        }
        rollup.status()
    }
}
