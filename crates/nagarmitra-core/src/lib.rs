pub mod app_config;
pub mod config;
pub mod location;
pub mod report;

pub use app_config::AppConfig;
pub use config::{load_app_config, load_app_config_from_env, PLACEHOLDER_API_KEY};
pub use location::{
    parse_manual_coordinates, Coordinates, LocationCandidate, ProviderAvailability,
    ResolvedLocation, SuggestionEntry,
};
pub use report::{
    DraftError, IssueCategory, IssueDraft, PhotoAttachment, Priority, ReportStep,
};

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid value for env var {var}: {reason}")]
    InvalidEnvVar { var: String, reason: String },
}
