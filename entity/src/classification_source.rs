use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Where a call's internal/external classification came from.
#[derive(
    Debug, Clone, Eq, PartialEq, EnumIter, Deserialize, Default, Serialize, DeriveActiveEnum, ToSchema,
)]
#[sea_orm(
    rs_type = "String",
    db_type = "Enum",
    enum_name = "classification_source"
)]
pub enum ClassificationSource {
    /// Participant emails taken from a matched calendar event
    #[sea_orm(string_value = "calendar")]
    Calendar,
    /// Participants parsed out of the transcript text itself
    #[sea_orm(string_value = "transcript")]
    Transcript,
    /// No participant evidence available
    #[sea_orm(string_value = "unknown")]
    #[default]
    Unknown,
}

impl std::fmt::Display for ClassificationSource {
    fn fmt(&self, fmt: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ClassificationSource::Calendar => write!(fmt, "calendar"),
            ClassificationSource::Transcript => write!(fmt, "transcript"),
            ClassificationSource::Unknown => write!(fmt, "unknown"),
        }
    }
}
