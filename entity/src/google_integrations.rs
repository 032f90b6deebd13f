//! SeaORM Entity for google_integrations table.
//!
//! Per-user Google connection. Token columns are opaque to this service;
//! the OAuth exchange that fills them happens outside.

use crate::Id;
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq, Serialize, Deserialize, ToSchema)]
#[schema(as = entity::google_integrations::Model)]
#[sea_orm(schema_name = "call_intelligence", table_name = "google_integrations")]
pub struct Model {
    #[serde(skip_deserializing)]
    #[sea_orm(primary_key)]
    pub id: Id,

    #[sea_orm(unique)]
    #[schema(value_type = Uuid)]
    pub user_id: Id,

    pub google_email: Option<String>,
    pub google_name: Option<String>,

    #[serde(skip_serializing)]
    pub refresh_token: Option<String>,

    #[serde(skip_serializing)]
    pub access_token: Option<String>,

    #[schema(value_type = Option<String>, format = DateTime)]
    pub token_expiry: Option<DateTimeWithTimeZone>,

    pub auto_sync_enabled: bool,

    #[schema(value_type = Option<String>, format = DateTime)]
    pub last_synced_at: Option<DateTimeWithTimeZone>,

    /// "success", "partial" or "failed"
    pub last_sync_status: Option<String>,

    pub last_sync_error: Option<String>,

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
}

impl Related<super::users::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Users.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
