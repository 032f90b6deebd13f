//! SeaORM Entity for users table.
//!
//! Identity anchor for per-user calendar/Drive scoping. Session handling
//! lives outside this service.

use crate::Id;
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq, Serialize, Deserialize, ToSchema)]
#[schema(as = entity::users::Model)]
#[sea_orm(schema_name = "call_intelligence", table_name = "users")]
pub struct Model {
    #[serde(skip_deserializing)]
    #[sea_orm(primary_key)]
    pub id: Id,

    #[sea_orm(unique)]
    pub email: String,

    pub display_name: Option<String>,

    #[serde(skip_deserializing)]
    #[schema(value_type = String, format = DateTime)]
    pub created_at: DateTimeWithTimeZone,

    #[serde(skip_deserializing)]
    #[schema(value_type = String, format = DateTime)]
    pub updated_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::calendar_events::Entity")]
    CalendarEvents,

    #[sea_orm(has_many = "super::drive_files::Entity")]
    DriveFiles,

    #[sea_orm(has_one = "super::google_integrations::Entity")]
    GoogleIntegrations,
}

impl Related<super::calendar_events::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::CalendarEvents.def()
    }
}

impl Related<super::drive_files::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::DriveFiles.def()
    }
}

impl Related<super::google_integrations::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::GoogleIntegrations.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
