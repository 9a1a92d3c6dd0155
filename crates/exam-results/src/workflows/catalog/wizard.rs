//! Step-by-step syllabus setup: pick a season, describe the syllabus, add its papers, review.

use serde::Serialize;

use super::domain::{SeriesId, Syllabus};
use super::series::{CatalogError, OptionDraft, SeriesCatalog, SyllabusDraft};

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum WizardStep {
    SelectSeason,
    SyllabusDetails,
    AddOptions,
    Review,
}

impl WizardStep {
    pub const fn number(self) -> u8 {
        match self {
            Self::SelectSeason => 1,
            Self::SyllabusDetails => 2,
            Self::AddOptions => 3,
            Self::Review => 4,
        }
    }

    pub const fn label(self) -> &'static str {
        match self {
            Self::SelectSeason => "Select Season",
            Self::SyllabusDetails => "Syllabus Details",
            Self::AddOptions => "Add Options",
            Self::Review => "Review",
        }
    }

    const fn following(self) -> Option<Self> {
        match self {
            Self::SelectSeason => Some(Self::SyllabusDetails),
            Self::SyllabusDetails => Some(Self::AddOptions),
            Self::AddOptions => Some(Self::Review),
            Self::Review => None,
        }
    }

    const fn preceding(self) -> Option<Self> {
        match self {
            Self::SelectSeason => None,
            Self::SyllabusDetails => Some(Self::SelectSeason),
            Self::AddOptions => Some(Self::SyllabusDetails),
            Self::Review => Some(Self::AddOptions),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum WizardError {
    #[error("please fill in the {field}")]
    MissingField { field: &'static str },
    #[error("wizard is already at the review step")]
    AlreadyAtReview,
    #[error("syllabus can only be saved from the review step (currently at {current:?})")]
    NotReady { current: WizardStep },
    #[error("option index {0} is out of range")]
    NoSuchOption(usize),
    #[error(transparent)]
    Catalog(#[from] CatalogError),
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SyllabusDetails {
    pub code: String,
    pub title: String,
    pub organization: String,
    pub level: String,
}

/// Guarded state machine for adding a syllabus to a series.
#[derive(Debug, Clone)]
pub struct SyllabusWizard {
    step: WizardStep,
    series: Option<SeriesId>,
    details: SyllabusDetails,
    options: Vec<OptionDraft>,
}

impl Default for SyllabusWizard {
    fn default() -> Self {
        Self::new()
    }
}

impl SyllabusWizard {
    pub fn new() -> Self {
        Self {
            step: WizardStep::SelectSeason,
            series: None,
            details: SyllabusDetails {
                level: "GCSE".to_string(),
                ..SyllabusDetails::default()
            },
            options: Vec::new(),
        }
    }

    pub fn step(&self) -> WizardStep {
        self.step
    }

    pub fn options(&self) -> &[OptionDraft] {
        &self.options
    }

    pub fn select_season(&mut self, series: SeriesId) {
        self.series = Some(series);
    }

    pub fn set_details(&mut self, details: SyllabusDetails) {
        self.details = details;
    }

    pub fn add_option(&mut self, option: OptionDraft) -> Result<(), WizardError> {
        if option.code.trim().is_empty() || option.title.trim().is_empty() {
            return Err(WizardError::MissingField {
                field: "option code and title",
            });
        }
        self.options.push(option);
        Ok(())
    }

    pub fn remove_option(&mut self, index: usize) -> Result<OptionDraft, WizardError> {
        if index >= self.options.len() {
            return Err(WizardError::NoSuchOption(index));
        }
        Ok(self.options.remove(index))
    }

    /// Advance one step if the current step's inputs are complete.
    pub fn next(&mut self) -> Result<WizardStep, WizardError> {
        self.check_step()?;
        let next = self.step.following().ok_or(WizardError::AlreadyAtReview)?;
        self.step = next;
        Ok(next)
    }

    pub fn back(&mut self) -> WizardStep {
        if let Some(previous) = self.step.preceding() {
            self.step = previous;
        }
        self.step
    }

    /// Save the syllabus into the catalog and reset the wizard.
    pub fn finish(&mut self, catalog: &mut SeriesCatalog) -> Result<Syllabus, WizardError> {
        if self.step != WizardStep::Review {
            return Err(WizardError::NotReady { current: self.step });
        }
        let series = self.series.ok_or(WizardError::MissingField { field: "season" })?;

        let draft = SyllabusDraft {
            code: self.details.code.clone(),
            title: self.details.title.clone(),
            organization: self.details.organization.clone(),
            level: self.details.level.clone(),
            options: self.options.clone(),
        };
        let syllabus = catalog.add_syllabus(series, draft)?.clone();
        *self = Self::new();
        Ok(syllabus)
    }

    fn check_step(&self) -> Result<(), WizardError> {
        match self.step {
            WizardStep::SelectSeason if self.series.is_none() => {
                Err(WizardError::MissingField { field: "season" })
            }
            WizardStep::SyllabusDetails
                if self.details.code.trim().is_empty()
                    || self.details.title.trim().is_empty()
                    || self.details.organization.trim().is_empty() =>
            {
                Err(WizardError::MissingField {
                    field: "syllabus fields",
                })
            }
            WizardStep::AddOptions if self.options.is_empty() => {
                Err(WizardError::MissingField { field: "options" })
            }
            _ => Ok(()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::workflows::catalog::series::NewSeason;
    use crate::workflows::catalog::{SeriesKind, SeriesStatus};
    use chrono::NaiveDate;

    fn catalog_with_season() -> (SeriesCatalog, SeriesId) {
        let mut catalog = SeriesCatalog::default();
        let id = catalog
            .create_season(NewSeason {
                name: "May 2024".to_string(),
                kind: SeriesKind::External,
                status: SeriesStatus::Active,
                organization: "AQA".to_string(),
                start_date: NaiveDate::from_ymd_opt(2024, 5, 1).expect("valid"),
                end_date: NaiveDate::from_ymd_opt(2024, 7, 31).expect("valid"),
            })
            .expect("season created")
            .id;
        (catalog, id)
    }

    fn details() -> SyllabusDetails {
        SyllabusDetails {
            code: "8464".to_string(),
            title: "GCSE Combined Science: Trilogy".to_string(),
            organization: "AQA".to_string(),
            level: "GCSE".to_string(),
        }
    }

    #[test]
    fn every_step_is_guarded() {
        let mut wizard = SyllabusWizard::new();
        assert_eq!(
            wizard.next(),
            Err(WizardError::MissingField { field: "season" })
        );

        wizard.select_season(SeriesId(1));
        assert_eq!(wizard.next(), Ok(WizardStep::SyllabusDetails));
        assert!(matches!(
            wizard.next(),
            Err(WizardError::MissingField { .. })
        ));

        wizard.set_details(details());
        assert_eq!(wizard.next(), Ok(WizardStep::AddOptions));
        assert_eq!(
            wizard.next(),
            Err(WizardError::MissingField { field: "options" })
        );

        wizard
            .add_option(OptionDraft::new("8464/B/1H", "Biology Paper 1 Higher"))
            .expect("option added");
        assert_eq!(wizard.next(), Ok(WizardStep::Review));
        assert_eq!(wizard.next(), Err(WizardError::AlreadyAtReview));
    }

    #[test]
    fn back_never_passes_first_step() {
        let mut wizard = SyllabusWizard::new();
        assert_eq!(wizard.back(), WizardStep::SelectSeason);
        wizard.select_season(SeriesId(1));
        wizard.next().expect("advance");
        assert_eq!(wizard.back(), WizardStep::SelectSeason);
    }

    #[test]
    fn add_option_requires_code_and_title() {
        let mut wizard = SyllabusWizard::new();
        assert!(wizard.add_option(OptionDraft::new("8464/C/1F", " ")).is_err());
        assert!(wizard.options().is_empty());
        assert_eq!(wizard.remove_option(0), Err(WizardError::NoSuchOption(0)));
    }

    #[test]
    fn finish_saves_syllabus_and_resets() {
        let (mut catalog, series_id) = catalog_with_season();
        let mut wizard = SyllabusWizard::new();

        assert!(matches!(
            wizard.finish(&mut catalog),
            Err(WizardError::NotReady { .. })
        ));

        wizard.select_season(series_id);
        wizard.next().expect("season step");
        wizard.set_details(details());
        wizard.next().expect("details step");
        wizard
            .add_option(OptionDraft::new("8464/B/1F", "Biology Paper 1 Foundation"))
            .expect("added");
        wizard
            .add_option(OptionDraft::new("8464/B/1H", "Biology Paper 1 Higher"))
            .expect("added");
        wizard.next().expect("options step");

        let syllabus = wizard.finish(&mut catalog).expect("saved");
        assert_eq!(syllabus.options.len(), 2);
        assert_eq!(wizard.step(), WizardStep::SelectSeason);
        assert!(wizard.options().is_empty());

        let series = catalog.get(series_id).expect("series present");
        assert!(series.syllabus("8464").is_some());
    }
}
