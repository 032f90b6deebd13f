use chrono::Utc;
use log::info;
use sea_orm::{sea_query::OnConflict, DatabaseConnection, EntityTrait, Set, Value};
use std::collections::HashMap;

pub use entity::{
    calendar_events, calls, categories, classification_source, drive_file_status, drive_files,
    google_integrations, prompts, sentiment, users, Id,
};

pub mod calendar_event;
pub mod call;
pub mod category;
pub mod drive_file;
pub mod error;
pub mod google_integration;
pub mod prompt;
pub mod query;
pub mod user;

pub(crate) fn uuid_parse_str(uuid_str: &str) -> Result<Id, error::Error> {
    Id::parse_str(uuid_str).map_err(|_| error::Error {
        source: None,
        error_kind: error::EntityApiErrorKind::InvalidQueryTerm,
    })
}

/// `QueryFilterMap` is a data structure that serves as a bridge for translating filter parameters
/// between different layers of the application. It is essentially a wrapper around a `HashMap`
/// where the keys are filter parameter names (as `String`) and the values are optional `Value` types
/// from `sea_orm`.
///
/// This structure is particularly useful in scenarios where you need to pass filter parameters
/// from a web request down to the database query layer in a type-safe and organized manner.
///
/// # Example
///
/// ```
/// use sea_orm::Value;
/// use entity_api::QueryFilterMap;
///
/// let mut query_filter_map = QueryFilterMap::new();
/// query_filter_map.insert("category_id".to_string(), Some(Value::String(Some(Box::new("a_category_id".to_string())))));
/// let filter_value = query_filter_map.get("category_id");
/// ```
pub struct QueryFilterMap {
    map: HashMap<String, Option<Value>>,
}

impl QueryFilterMap {
    pub fn new() -> Self {
        Self {
            map: HashMap::new(),
        }
    }

    pub fn get(&self, key: &str) -> Option<Value> {
        // HashMap.get returns an Option and so we need to "flatten" this to a single Option
        self.map
            .get(key)
            .and_then(|inner_option| inner_option.clone())
    }

    pub fn insert(&mut self, key: String, value: Option<Value>) {
        self.map.insert(key, value);
    }
}

impl Default for QueryFilterMap {
    fn default() -> Self {
        Self::new()
    }
}

/// `IntoQueryFilterMap` is a trait that provides a method for converting a struct into a `QueryFilterMap`.
/// This is particularly useful for translating data between different layers of the application,
/// such as from web request parameters to database query filters.
pub trait IntoQueryFilterMap {
    fn into_query_filter_map(self) -> QueryFilterMap;
}

/// The closed catalog of fixed categories the automated classifier may
/// select from. Name, one-line discriminator, display color.
const FIXED_CATEGORY_SEED: &[(&str, &str, &str)] = &[
    (
        "Intro (Diagnostic) Call",
        "Early-stage context and fit assessment; success metric is clarity of \
         context and next steps, not outputs or decisions.",
        "#60A5FA",
    ),
    (
        "Problem & Requirements Discovery",
        "Structured working session extracting and clarifying what needs to be \
         built and why; the outcome is knowledge, not a decision.",
        "#34D399",
    ),
    (
        "Ballpark Proposal",
        "Indicative solution direction with rough scope and cost ranges; \
         answers \"roughly what would this look like and cost?\".",
        "#FBBF24",
    ),
    (
        "Post Solution Discovery Proposal",
        "Refined, discovery-backed proposal translating validated findings \
         into concrete scope, timeline and near-final investment.",
        "#F59E0B",
    ),
    (
        "Decision & Commercial Alignment Call",
        "Finalizing commercial terms: payment, invoicing, procurement, legal, \
         approval; immediate commitment.",
        "#8B5CF6",
    ),
    (
        "Delivery Health & Feedback Loop",
        "Recurring relationship and delivery-quality check-in; retrospectives \
         and collaboration feedback.",
        "#10B981",
    ),
    (
        "Roadmap Planning Session (Quarterly, bi-annual, or annual)",
        "Strategic prioritization and sequencing over a medium to long-term \
         horizon.",
        "#3B82F6",
    ),
    (
        "Escalation & Recovery Session",
        "Resolving serious conflict or relationship risk; immediate crisis \
         resolution.",
        "#EF4444",
    ),
    (
        "Other",
        "Catch-all for calls that genuinely fit no other category. Last \
         choice only.",
        "#6B7280",
    ),
];

/// Seeds the fixed category catalog and a default analysis prompt.
/// Idempotent: existing categories are updated in place by name.
pub async fn seed_database(db: &DatabaseConnection) {
    let now = Utc::now();

    info!("Seeding fixed category catalog...");
    for (name, description, color) in FIXED_CATEGORY_SEED {
        let active_model = categories::ActiveModel {
            name: Set((*name).to_string()),
            description: Set(Some((*description).to_string())),
            color: Set(Some((*color).to_string())),
            is_fixed: Set(true),
            created_at: Set(now.into()),
            updated_at: Set(now.into()),
            ..Default::default()
        };

        categories::Entity::insert(active_model)
            .on_conflict(
                OnConflict::column(categories::Column::Name)
                    .update_columns([
                        categories::Column::Description,
                        categories::Column::Color,
                        categories::Column::IsFixed,
                        categories::Column::UpdatedAt,
                    ])
                    .to_owned(),
            )
            .exec(db)
            .await
            .expect("Failed to seed fixed categories");
    }

    info!("Seeding default analysis prompt...");
    let default_prompt = prompts::ActiveModel {
        name: Set("Default call analysis".to_string()),
        analysis_prompt: Set(
            "Analyze this call transcript. Summarize what was discussed, how the \
             conversation went, and what the concrete outcomes were."
                .to_string(),
        ),
        rating_prompt: Set(Some(
            "Rate the call 1-10 on clarity of purpose, quality of communication, \
             and concreteness of next steps."
                .to_string(),
        )),
        is_active: Set(true),
        created_at: Set(now.into()),
        updated_at: Set(now.into()),
        ..Default::default()
    };

    prompts::Entity::insert(default_prompt)
        .exec(db)
        .await
        .expect("Failed to seed default prompt");
}

#[cfg(test)]
// We need to gate seaORM's mock feature behind conditional compilation because
// the feature removes the Clone trait implementation from seaORM's DatabaseConnection.
// see https://github.com/SeaQL/sea-orm/issues/830
#[cfg(feature = "mock")]
mod tests {
    use super::*;

    #[tokio::test]
    async fn uuid_parse_str_parses_valid_uuid() {
        let uuid_str = "a98c3295-0933-44cb-89db-7db0f7250fb1";
        let uuid = uuid_parse_str(uuid_str).unwrap();
        assert_eq!(uuid.to_string(), uuid_str);
    }

    #[tokio::test]
    async fn uuid_parse_str_returns_error_for_invalid_uuid() {
        let result = uuid_parse_str("invalid");
        assert!(result.is_err());
    }

    #[test]
    fn fixed_category_seed_has_nine_entries_including_other() {
        assert_eq!(FIXED_CATEGORY_SEED.len(), 9);
        assert!(FIXED_CATEGORY_SEED.iter().any(|(name, _, _)| *name == "Other"));
    }
}
