//! Issue-report draft: the consumer of a committed [`ResolvedLocation`].
//!
//! Mirrors the three-step report wizard (details → location → photos). The
//! draft never holds a partial location: [`IssueDraft::set_location`] takes a
//! full [`ResolvedLocation`] and nothing else writes that field.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

use crate::location::ResolvedLocation;

/// Categories offered by the report form.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum IssueCategory {
    Potholes,
    Streetlights,
    Waste,
    Water,
    Drainage,
    Traffic,
    PublicTransport,
    Parks,
    Noise,
    Other,
}

impl IssueCategory {
    pub const ALL: [IssueCategory; 10] = [
        IssueCategory::Potholes,
        IssueCategory::Streetlights,
        IssueCategory::Waste,
        IssueCategory::Water,
        IssueCategory::Drainage,
        IssueCategory::Traffic,
        IssueCategory::PublicTransport,
        IssueCategory::Parks,
        IssueCategory::Noise,
        IssueCategory::Other,
    ];

    /// Stable machine slug, also the serde wire form.
    pub fn slug(self) -> &'static str {
        match self {
            IssueCategory::Potholes => "potholes",
            IssueCategory::Streetlights => "streetlights",
            IssueCategory::Waste => "waste",
            IssueCategory::Water => "water",
            IssueCategory::Drainage => "drainage",
            IssueCategory::Traffic => "traffic",
            IssueCategory::PublicTransport => "public-transport",
            IssueCategory::Parks => "parks",
            IssueCategory::Noise => "noise",
            IssueCategory::Other => "other",
        }
    }

    /// Display label shown to the reporter.
    pub fn label(self) -> &'static str {
        match self {
            IssueCategory::Potholes => "Potholes & Road Damage",
            IssueCategory::Streetlights => "Street Lighting Issues",
            IssueCategory::Waste => "Waste Management",
            IssueCategory::Water => "Water Supply Issues",
            IssueCategory::Drainage => "Drainage Problems",
            IssueCategory::Traffic => "Traffic Signals",
            IssueCategory::PublicTransport => "Public Transportation",
            IssueCategory::Parks => "Parks & Recreation",
            IssueCategory::Noise => "Noise Pollution",
            IssueCategory::Other => "Other Issues",
        }
    }
}

impl std::str::FromStr for IssueCategory {
    type Err = DraftError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        IssueCategory::ALL
            .into_iter()
            .find(|c| c.slug() == s)
            .ok_or_else(|| DraftError::UnknownCategory(s.to_owned()))
    }
}

/// Reporter-assigned urgency.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Priority {
    Low,
    #[default]
    Medium,
    High,
}

/// Metadata for one attached photo. Bytes themselves are uploaded elsewhere;
/// the draft tracks only what the form needs to list and validate.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PhotoAttachment {
    pub file_name: String,
    pub content_type: String,
    pub byte_len: u64,
    pub captured_at: DateTime<Utc>,
}

impl PhotoAttachment {
    /// A camera capture named `issue-photo-<millis>.jpg`, matching the
    /// capture flow's file naming.
    pub fn captured_jpeg(captured_at: DateTime<Utc>, byte_len: u64) -> Self {
        Self {
            file_name: format!("issue-photo-{}.jpg", captured_at.timestamp_millis()),
            content_type: "image/jpeg".to_owned(),
            byte_len,
            captured_at,
        }
    }
}

/// A report being authored. `location` is written only via
/// [`IssueDraft::set_location`] with a committed resolver output.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IssueDraft {
    pub id: Uuid,
    pub title: String,
    pub category: Option<IssueCategory>,
    pub description: String,
    pub priority: Priority,
    pub photos: Vec<PhotoAttachment>,
    pub location: Option<ResolvedLocation>,
    pub created_at: DateTime<Utc>,
}

impl IssueDraft {
    pub fn new() -> Self {
        Self {
            id: Uuid::new_v4(),
            title: String::new(),
            category: None,
            description: String::new(),
            priority: Priority::default(),
            photos: Vec::new(),
            location: None,
            created_at: Utc::now(),
        }
    }

    /// Commits a resolved location into the draft. Re-confirming replaces the
    /// previous value wholesale.
    pub fn set_location(&mut self, location: ResolvedLocation) {
        self.location = Some(location);
    }

    /// Step-one gate: title, category, and description are all required.
    ///
    /// # Errors
    ///
    /// Returns the first missing field as a [`DraftError`].
    pub fn validate_details(&self) -> Result<(), DraftError> {
        if self.title.trim().is_empty() {
            return Err(DraftError::MissingTitle);
        }
        if self.category.is_none() {
            return Err(DraftError::MissingCategory);
        }
        if self.description.trim().is_empty() {
            return Err(DraftError::MissingDescription);
        }
        Ok(())
    }

    /// Step-two gate: a confirmed location must be present.
    ///
    /// # Errors
    ///
    /// Returns [`DraftError::MissingLocation`] when nothing has been
    /// committed yet.
    pub fn validate_location(&self) -> Result<(), DraftError> {
        match &self.location {
            Some(_) => Ok(()),
            None => Err(DraftError::MissingLocation),
        }
    }

    /// Full submit gate. Photos are optional.
    ///
    /// # Errors
    ///
    /// Returns the first failing step's [`DraftError`].
    pub fn validate(&self) -> Result<(), DraftError> {
        self.validate_details()?;
        self.validate_location()
    }
}

impl Default for IssueDraft {
    fn default() -> Self {
        Self::new()
    }
}

/// Wizard steps in order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReportStep {
    Details,
    Location,
    Photos,
}

impl ReportStep {
    pub fn next(self) -> Option<ReportStep> {
        match self {
            ReportStep::Details => Some(ReportStep::Location),
            ReportStep::Location => Some(ReportStep::Photos),
            ReportStep::Photos => None,
        }
    }

    pub fn previous(self) -> Option<ReportStep> {
        match self {
            ReportStep::Details => None,
            ReportStep::Location => Some(ReportStep::Details),
            ReportStep::Photos => Some(ReportStep::Location),
        }
    }

    /// Whether the wizard may advance past this step for the given draft.
    /// The photos step has no requirement of its own.
    pub fn can_advance(self, draft: &IssueDraft) -> bool {
        match self {
            ReportStep::Details => draft.validate_details().is_ok(),
            ReportStep::Location => draft.validate_location().is_ok(),
            ReportStep::Photos => true,
        }
    }
}

#[derive(Debug, Error)]
pub enum DraftError {
    #[error("issue title is required")]
    MissingTitle,

    #[error("issue category is required")]
    MissingCategory,

    #[error("issue description is required")]
    MissingDescription,

    #[error("issue location has not been confirmed")]
    MissingLocation,

    #[error("unknown issue category: {0}")]
    UnknownCategory(String),
}
