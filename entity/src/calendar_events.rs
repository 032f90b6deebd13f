//! SeaORM Entity for calendar_events table.
//!
//! One row per (user, remote event id). The same physical meeting seen via
//! two users' calendars produces two rows; the later-synced one is marked
//! `is_duplicate` and points at the primary row so only one Call is ever
//! imported for it.

use crate::Id;
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq, Serialize, Deserialize, ToSchema)]
#[schema(as = entity::calendar_events::Model)]
#[sea_orm(schema_name = "call_intelligence", table_name = "calendar_events")]
pub struct Model {
    #[serde(skip_deserializing)]
    #[sea_orm(primary_key)]
    pub id: Id,

    #[schema(value_type = Uuid)]
    pub user_id: Id,

    /// Event id as issued by the remote calendar provider
    pub remote_event_id: String,

    pub summary: Option<String>,

    #[schema(value_type = String, format = DateTime)]
    pub start_time: DateTimeWithTimeZone,

    #[schema(value_type = String, format = DateTime)]
    pub end_time: DateTimeWithTimeZone,

    pub organizer: Option<String>,

    #[schema(value_type = Vec<String>)]
    pub attendees: Json,

    pub hangout_link: Option<String>,

    /// Cross-user deduplication key extracted from the conferencing link
    pub meet_code: Option<String>,

    // External classification snapshot
    /// None = unknown (no attendee evidence or attendees omitted)
    pub is_external: Option<bool>,

    #[schema(value_type = Vec<String>)]
    pub external_domains: Json,

    // Transcript matching
    pub has_transcript: bool,
    pub transcript_file_id: Option<String>,

    // Import status
    pub imported: bool,
    #[schema(value_type = Option<Uuid>)]
    pub imported_call_id: Option<Id>,

    // Cross-user duplicate markers
    pub is_duplicate: bool,
    #[schema(value_type = Option<Uuid>)]
    pub primary_event_id: Option<Id>,
    #[schema(value_type = Option<Uuid>)]
    pub primary_user_id: Option<Id>,

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
