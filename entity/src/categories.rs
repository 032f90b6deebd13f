//! SeaORM Entity for categories table.
//!
//! The automated classifier only ever selects from rows with
//! `is_fixed = true`; non-fixed rows are legacy/freeform categories kept
//! for display of historical data.

use crate::Id;
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq, Serialize, Deserialize, ToSchema)]
#[schema(as = entity::categories::Model)]
#[sea_orm(schema_name = "call_intelligence", table_name = "categories")]
pub struct Model {
    #[serde(skip_deserializing)]
    #[sea_orm(primary_key)]
    pub id: Id,

    #[sea_orm(unique)]
    pub name: String,

    /// Playbook text: intent, timeframe and signals. Used both for display
    /// and for framing the LLM adjudication prompt.
    #[sea_orm(column_type = "Text", nullable)]
    pub description: Option<String>,

    /// Display color (hex)
    pub color: Option<String>,

    /// Member of the closed catalog the classifier may choose from
    pub is_fixed: bool,

    #[serde(skip_deserializing)]
    #[schema(value_type = String, format = DateTime)]
    pub created_at: DateTimeWithTimeZone,

    #[serde(skip_deserializing)]
    #[schema(value_type = String, format = DateTime)]
    pub updated_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    // Calls reference categories in three independent roles; relations are
    // defined from the calls side.
}

impl ActiveModelBehavior for ActiveModel {}
