//! Call operations exposed to the web layer.

use crate::error::{DomainErrorKind, Error, InternalErrorKind};
use entity::{calls, Id};
use entity_api::{query, IntoQueryFilterMap};
use log::*;
use sea_orm::DatabaseConnection;

pub use entity_api::call::ClassificationUpdate;

/// The categorization lifecycle of a call, read off its stored fields.
///
/// The three category columns overlap on disk; this view makes the
/// "prediction vs confirmed" distinction explicit so callers branch on a
/// state instead of probing nullable ids.
#[derive(Debug, Clone, PartialEq)]
pub enum CategorizationState {
    /// No category assigned; the prediction (if any) is a suggestion only
    Unassigned { predicted: Option<Id> },
    /// Auto-assigned by the confidence policy
    Assigned { category: Id, needs_review: bool },
    /// A human picked the category; supersedes any prediction
    Overridden { category: Id, overridden_by: Option<Id> },
}

pub fn categorization(call: &calls::Model) -> CategorizationState {
    if call.was_overridden {
        if let Some(category) = call.category_final_id {
            return CategorizationState::Overridden {
                category,
                overridden_by: call.overridden_by,
            };
        }
    }
    match call.category_final_id {
        Some(category) => CategorizationState::Assigned {
            category,
            needs_review: call.needs_review,
        },
        None => CategorizationState::Unassigned {
            predicted: call.predicted_category_id,
        },
    }
}

pub async fn find_by(
    db: &DatabaseConnection,
    params: impl IntoQueryFilterMap,
) -> Result<Vec<calls::Model>, Error> {
    Ok(
        query::find_by::<calls::Entity, calls::Column>(db, params.into_query_filter_map())
            .await?,
    )
}

pub async fn find_by_id(db: &DatabaseConnection, id: Id) -> Result<calls::Model, Error> {
    Ok(entity_api::call::find_by_id(db, id).await?)
}

pub async fn delete_by_id(db: &DatabaseConnection, id: Id) -> Result<(), Error> {
    Ok(entity_api::call::delete_by_id(db, id).await?)
}

/// Applies a human category override to a call.
///
/// The chosen category must exist and belong to the fixed catalog; a human
/// pointing a call at a free-form category would bypass the taxonomy the
/// classifier is trained against. Sets both assignment fields, records the
/// override metadata, and clears the review flag. Idempotent for a given
/// category.
pub async fn override_category(
    db: &DatabaseConnection,
    call_id: Id,
    category_id: Id,
    overridden_by: Id,
) -> Result<calls::Model, Error> {
    let category = entity_api::category::find_by_id(db, category_id).await?;

    if !category.is_fixed {
        warn!(
            "Refusing override to non-fixed category '{}' for call {call_id}",
            category.name
        );
        return Err(Error {
            source: None,
            error_kind: DomainErrorKind::Internal(InternalErrorKind::Other(
                "Override target must be a fixed category".to_string(),
            )),
        });
    }

    info!(
        "Overriding call {call_id} to category '{}' by {overridden_by}",
        category.name
    );

    Ok(entity_api::call::apply_override(db, call_id, category_id, overridden_by).await?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use entity::classification_source::ClassificationSource;

    fn call_model() -> calls::Model {
        let now = chrono::Utc::now();
        calls::Model {
            id: Id::new_v4(),
            title: "Weekly check-in".to_string(),
            call_date: now.into(),
            organizer: "alice@internal.example".to_string(),
            participants: serde_json::json!(["Alice", "Bob"]),
            transcript: "Alice: hello".to_string(),
            transcript_summary: None,
            ai_summary: None,
            ai_rating: None,
            ai_sentiment: None,
            ai_strengths: None,
            ai_areas_for_improvement: None,
            predicted_category_id: None,
            confidence_score: None,
            category_reasoning: None,
            top_candidates: None,
            needs_review: false,
            category_id: None,
            category_final_id: None,
            was_overridden: false,
            overridden_at: None,
            overridden_by: None,
            is_external: Some(true),
            external_domains: None,
            classification_source: ClassificationSource::Calendar,
            meet_code: None,
            is_duplicate: false,
            drive_file_id: None,
            calendar_event_id: None,
            created_at: now.into(),
            updated_at: now.into(),
        }
    }

    #[test]
    fn low_confidence_call_is_unassigned_with_suggestion() {
        let mut call = call_model();
        let predicted = Id::new_v4();
        call.predicted_category_id = Some(predicted);
        call.needs_review = true;

        assert_eq!(
            categorization(&call),
            CategorizationState::Unassigned {
                predicted: Some(predicted)
            }
        );
    }

    #[test]
    fn assigned_call_carries_its_review_flag() {
        let mut call = call_model();
        let category = Id::new_v4();
        call.predicted_category_id = Some(category);
        call.category_id = Some(category);
        call.category_final_id = Some(category);
        call.needs_review = true;

        assert_eq!(
            categorization(&call),
            CategorizationState::Assigned {
                category,
                needs_review: true
            }
        );
    }

    #[test]
    fn override_wins_over_the_prediction() {
        let mut call = call_model();
        let predicted = Id::new_v4();
        let chosen = Id::new_v4();
        let actor = Id::new_v4();
        call.predicted_category_id = Some(predicted);
        call.category_id = Some(chosen);
        call.category_final_id = Some(chosen);
        call.was_overridden = true;
        call.overridden_by = Some(actor);

        assert_eq!(
            categorization(&call),
            CategorizationState::Overridden {
                category: chosen,
                overridden_by: Some(actor)
            }
        );
    }
}
