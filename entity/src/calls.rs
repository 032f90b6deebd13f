//! SeaORM Entity for calls table.
//!
//! One row per analyzed meeting. Category references exist in three
//! independent roles: the working assignment (`category_id`), the
//! classifier's prediction (`predicted_category_id`) and the confirmed
//! final category (`category_final_id`). Prediction and final are allowed
//! to diverge; that divergence is the whole point of the review flow.

use crate::classification_source::ClassificationSource;
use crate::sentiment::Sentiment;
use crate::Id;
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize, ToSchema)]
#[schema(as = entity::calls::Model)]
#[sea_orm(schema_name = "call_intelligence", table_name = "calls")]
pub struct Model {
    #[serde(skip_deserializing)]
    #[sea_orm(primary_key)]
    pub id: Id,

    /// Display title, usually the client or meeting name
    pub title: String,

    #[schema(value_type = String, format = DateTime)]
    pub call_date: DateTimeWithTimeZone,

    pub organizer: String,

    /// Participant names or emails
    #[schema(value_type = Vec<String>)]
    pub participants: Json,

    #[sea_orm(column_type = "Text")]
    pub transcript: String,

    /// Bounded-length digest generated by the classifier's summarize stage
    #[sea_orm(column_type = "Text", nullable)]
    pub transcript_summary: Option<String>,

    // AI analysis fields
    #[sea_orm(column_type = "Text", nullable)]
    pub ai_summary: Option<String>,

    /// Rating in [1, 10]
    pub ai_rating: Option<f64>,

    pub ai_sentiment: Option<Sentiment>,

    #[schema(value_type = Vec<String>)]
    pub ai_strengths: Option<Json>,

    #[schema(value_type = Vec<String>)]
    pub ai_areas_for_improvement: Option<Json>,

    // Classification prediction fields
    #[schema(value_type = Option<Uuid>)]
    pub predicted_category_id: Option<Id>,

    /// Adjudication confidence in [0, 1]
    pub confidence_score: Option<f64>,

    #[sea_orm(column_type = "Text", nullable)]
    pub category_reasoning: Option<String>,

    /// Top heuristic candidates with scores, for user reference
    #[schema(value_type = Object)]
    pub top_candidates: Option<Json>,

    /// Auto-assigned but flagged for human confirmation
    pub needs_review: bool,

    // Assignment fields
    #[schema(value_type = Option<Uuid>)]
    pub category_id: Option<Id>,
    #[schema(value_type = Option<Uuid>)]
    pub category_final_id: Option<Id>,

    pub was_overridden: bool,

    #[schema(value_type = Option<String>, format = DateTime)]
    pub overridden_at: Option<DateTimeWithTimeZone>,

    #[schema(value_type = Option<Uuid>)]
    pub overridden_by: Option<Id>,

    // External classification fields
    /// None = unknown (no participant evidence), distinct from false
    pub is_external: Option<bool>,

    #[schema(value_type = Vec<String>)]
    pub external_domains: Option<Json>,

    pub classification_source: ClassificationSource,

    // Deduplication fields
    /// Conferencing-link identifier; unique together with call_date
    pub meet_code: Option<String>,

    pub is_duplicate: bool,

    // Provenance
    #[schema(value_type = Option<Uuid>)]
    pub drive_file_id: Option<Id>,
    #[schema(value_type = Option<Uuid>)]
    pub calendar_event_id: Option<Id>,

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
        belongs_to = "super::categories::Entity",
        from = "Column::CategoryId",
        to = "super::categories::Column::Id",
        on_update = "NoAction",
        on_delete = "SetNull"
    )]
    Category,

    #[sea_orm(
        belongs_to = "super::categories::Entity",
        from = "Column::PredictedCategoryId",
        to = "super::categories::Column::Id",
        on_update = "NoAction",
        on_delete = "SetNull"
    )]
    PredictedCategory,

    #[sea_orm(
        belongs_to = "super::categories::Entity",
        from = "Column::CategoryFinalId",
        to = "super::categories::Column::Id",
        on_update = "NoAction",
        on_delete = "SetNull"
    )]
    CategoryFinal,

    #[sea_orm(
        belongs_to = "super::drive_files::Entity",
        from = "Column::DriveFileId",
        to = "super::drive_files::Column::Id",
        on_update = "NoAction",
        on_delete = "SetNull"
    )]
    DriveFiles,

    #[sea_orm(
        belongs_to = "super::calendar_events::Entity",
        from = "Column::CalendarEventId",
        to = "super::calendar_events::Column::Id",
        on_update = "NoAction",
        on_delete = "SetNull"
    )]
    CalendarEvents,
}

impl Related<super::drive_files::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::DriveFiles.def()
    }
}

impl Related<super::calendar_events::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::CalendarEvents.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
