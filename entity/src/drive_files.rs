//! SeaORM Entity for drive_files table.
//!
//! One row per remote file id; holds the extracted text so the transcript
//! matcher's time-window strategy can run without re-downloading.

use crate::drive_file_status::DriveFileStatus;
use crate::Id;
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq, Serialize, Deserialize, ToSchema)]
#[schema(as = entity::drive_files::Model)]
#[sea_orm(schema_name = "call_intelligence", table_name = "drive_files")]
pub struct Model {
    #[serde(skip_deserializing)]
    #[sea_orm(primary_key)]
    pub id: Id,

    #[schema(value_type = Uuid)]
    pub user_id: Id,

    /// File id as issued by the remote store
    #[sea_orm(unique)]
    pub remote_file_id: String,

    pub name: String,

    pub mime_type: String,

    #[schema(value_type = String, format = DateTime)]
    pub modified_time: DateTimeWithTimeZone,

    /// Extracted plain text, present once status reaches Imported
    #[sea_orm(column_type = "Text", nullable)]
    pub raw_text: Option<String>,

    pub status: DriveFileStatus,

    pub error_message: Option<String>,

    #[schema(value_type = Option<String>, format = DateTime)]
    pub imported_at: Option<DateTimeWithTimeZone>,

    #[serde(skip_deserializing)]
    #[schema(value_type = String, format = DateTime)]
    pub created_at: DateTimeWithTimeZone,

    #[serde(skip_deserializing)]
    #[schema(value_type = String, format = DateTime)]
    pub updated_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::users::Entity",
        from = "Column::UserId",
        to = "super::users::Column::Id",
        on_update = "NoAction",
        on_delete = "Cascade"
    )]
    Users,

    #[sea_orm(has_many = "super::calls::Entity")]
    Calls,
}

impl Related<super::users::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Users.def()
    }
}

impl Related<super::calls::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Calls.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
