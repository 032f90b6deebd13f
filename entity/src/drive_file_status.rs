use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Import status of a synced Drive file.
///
/// State machine: Pending -> Imported | Error; Imported -> Skipped when a
/// later call import detects the file belongs to an already-imported meeting.
#[derive(
    Debug, Clone, Eq, PartialEq, EnumIter, Deserialize, Default, Serialize, DeriveActiveEnum, ToSchema,
)]
#[sea_orm(rs_type = "String", db_type = "Enum", enum_name = "drive_file_status")]
pub enum DriveFileStatus {
    /// File discovered but content not yet downloaded
    #[sea_orm(string_value = "pending")]
    #[default]
    Pending,
    /// Text content downloaded and stored
    #[sea_orm(string_value = "imported")]
    Imported,
    /// Content download or extraction failed
    #[sea_orm(string_value = "error")]
    Error,
    /// Deliberately not converted to a call (e.g. duplicate meeting)
    #[sea_orm(string_value = "skipped")]
    Skipped,
}

impl std::fmt::Display for DriveFileStatus {
    fn fmt(&self, fmt: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DriveFileStatus::Pending => write!(fmt, "pending"),
            DriveFileStatus::Imported => write!(fmt, "imported"),
            DriveFileStatus::Error => write!(fmt, "error"),
            DriveFileStatus::Skipped => write!(fmt, "skipped"),
        }
    }
}
