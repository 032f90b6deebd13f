//! SeaORM Entity for prompts table.
//!
//! Analysis prompt configurations. At most one row is active at a time;
//! callers fetch the active row and pass it into the analysis pipeline as
//! an explicit `AnalysisConfig` rather than the pipeline reading it ad hoc.

use crate::Id;
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq, Serialize, Deserialize, ToSchema)]
#[schema(as = entity::prompts::Model)]
#[sea_orm(schema_name = "call_intelligence", table_name = "prompts")]
pub struct Model {
    #[serde(skip_deserializing)]
    #[sea_orm(primary_key)]
    pub id: Id,

    pub name: String,

    /// Instructions prepended to the transcript for the analysis call
    #[sea_orm(column_type = "Text")]
    pub analysis_prompt: String,

    /// Rubric text for the 1-10 rating
    #[sea_orm(column_type = "Text", nullable)]
    pub rating_prompt: Option<String>,

    pub is_active: bool,

    #[serde(skip_deserializing)]
    #[schema(value_type = String, format = DateTime)]
    pub created_at: DateTimeWithTimeZone,

    #[serde(skip_deserializing)]
    #[schema(value_type = String, format = DateTime)]
    pub updated_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
