//! CRUD operations for calls table.

use super::error::{EntityApiErrorKind, Error};
use entity::calls::{ActiveModel, Column, Entity, Model};
use entity::Id;
use log::*;
use sea_orm::{
    entity::prelude::*,
    ActiveValue::{Set, Unchanged},
    DatabaseConnection, QueryOrder, TryIntoModel,
};

/// Classification result fields written back to a call after the pipeline
/// runs. Prediction fields are always written; assignment fields are
/// withheld when the call carries a human override.
#[derive(Debug, Clone)]
pub struct ClassificationUpdate {
    pub transcript_summary: Option<String>,
    pub predicted_category_id: Id,
    pub confidence_score: f64,
    pub category_reasoning: String,
    pub top_candidates: serde_json::Value,
    pub needs_review: bool,
    pub category_id: Option<Id>,
    pub category_final_id: Option<Id>,
}

/// Creates a new call record.
///
/// The calls table carries a unique index over (meet_code, call_date); a
/// concurrent import of the same meeting surfaces here as
/// `RecordAlreadyExists` rather than a second row.
pub async fn create(db: &DatabaseConnection, model: Model) -> Result<Model, Error> {
    debug!("Creating new call: {}", model.title);

    let now = chrono::Utc::now();

    let active_model = ActiveModel {
        title: Set(model.title),
        call_date: Set(model.call_date),
        organizer: Set(model.organizer),
        participants: Set(model.participants),
        transcript: Set(model.transcript),
        transcript_summary: Set(model.transcript_summary),
        ai_summary: Set(model.ai_summary),
        ai_rating: Set(model.ai_rating),
        ai_sentiment: Set(model.ai_sentiment),
        ai_strengths: Set(model.ai_strengths),
        ai_areas_for_improvement: Set(model.ai_areas_for_improvement),
        predicted_category_id: Set(model.predicted_category_id),
        confidence_score: Set(model.confidence_score),
        category_reasoning: Set(model.category_reasoning),
        top_candidates: Set(model.top_candidates),
        needs_review: Set(model.needs_review),
        category_id: Set(model.category_id),
        category_final_id: Set(model.category_final_id),
        was_overridden: Set(false),
        overridden_at: Set(None),
        overridden_by: Set(None),
        is_external: Set(model.is_external),
        external_domains: Set(model.external_domains),
        classification_source: Set(model.classification_source),
        meet_code: Set(model.meet_code),
        is_duplicate: Set(model.is_duplicate),
        drive_file_id: Set(model.drive_file_id),
        calendar_event_id: Set(model.calendar_event_id),
        created_at: Set(now.into()),
        updated_at: Set(now.into()),
        ..Default::default()
    };

    Ok(active_model.save(db).await?.try_into_model()?)
}

pub async fn find_by_id(db: &DatabaseConnection, id: Id) -> Result<Model, Error> {
    Entity::find_by_id(id).one(db).await?.ok_or_else(|| Error {
        source: None,
        error_kind: EntityApiErrorKind::RecordNotFound,
    })
}

/// Calls eligible for (re)classification: a non-empty transcript is the
/// pipeline's only hard input requirement.
pub async fn find_with_transcript(db: &DatabaseConnection) -> Result<Vec<Model>, Error> {
    Ok(Entity::find()
        .filter(Column::Transcript.ne(""))
        .order_by_desc(Column::CreatedAt)
        .all(db)
        .await?)
}

/// Dedup probe: is there already a call for this meet code on this date?
pub async fn find_by_meet_code_and_date(
    db: &DatabaseConnection,
    meet_code: &str,
    call_date: DateTimeWithTimeZone,
) -> Result<Option<Model>, Error> {
    Ok(Entity::find()
        .filter(Column::MeetCode.eq(meet_code))
        .filter(Column::CallDate.eq(call_date))
        .one(db)
        .await?)
}

/// Writes classifier output back to a call.
///
/// Prediction fields are always refreshed. When the call was manually
/// overridden, the assignment fields (category_id, category_final_id,
/// needs_review) and override metadata are left untouched: a human decision
/// survives bulk recategorization.
pub async fn update_classification(
    db: &DatabaseConnection,
    id: Id,
    update: ClassificationUpdate,
) -> Result<Model, Error> {
    let existing = find_by_id(db, id).await?;

    let mut active_model = ActiveModel {
        id: Unchanged(existing.id),
        transcript_summary: Set(update.transcript_summary),
        predicted_category_id: Set(Some(update.predicted_category_id)),
        confidence_score: Set(Some(update.confidence_score)),
        category_reasoning: Set(Some(update.category_reasoning)),
        top_candidates: Set(Some(update.top_candidates)),
        updated_at: Set(chrono::Utc::now().into()),
        ..Default::default()
    };

    if existing.was_overridden {
        debug!("Call {id} was overridden; refreshing prediction fields only");
    } else {
        active_model.needs_review = Set(update.needs_review);
        active_model.category_id = Set(update.category_id);
        active_model.category_final_id = Set(update.category_final_id);
    }

    Ok(active_model.update(db).await?.try_into_model()?)
}

/// Applies a human category override. Idempotent with respect to the chosen
/// category: overriding twice with the same id converges on the same state.
pub async fn apply_override(
    db: &DatabaseConnection,
    id: Id,
    category_id: Id,
    overridden_by: Id,
) -> Result<Model, Error> {
    let existing = find_by_id(db, id).await?;

    debug!("Overriding category for call {id} to {category_id}");

    let active_model = ActiveModel {
        id: Unchanged(existing.id),
        category_id: Set(Some(category_id)),
        category_final_id: Set(Some(category_id)),
        was_overridden: Set(true),
        overridden_at: Set(Some(chrono::Utc::now().into())),
        overridden_by: Set(Some(overridden_by)),
        // A human decision supersedes and silences the review flag.
        needs_review: Set(false),
        updated_at: Set(chrono::Utc::now().into()),
        ..Default::default()
    };

    Ok(active_model.update(db).await?.try_into_model()?)
}

pub async fn delete_by_id(db: &DatabaseConnection, id: Id) -> Result<(), Error> {
    let _existing = find_by_id(db, id).await?;
    Entity::delete_by_id(id).exec(db).await?;
    Ok(())
}

#[cfg(test)]
// We need to gate seaORM's mock feature behind conditional compilation because
// the feature removes the Clone trait implementation from seaORM's DatabaseConnection.
// see https://github.com/SeaQL/sea-orm/issues/830
#[cfg(feature = "mock")]
mod tests {
    use super::*;
    use entity::classification_source::ClassificationSource;
    use sea_orm::{DatabaseBackend, MockDatabase};
    use serde_json::json;

    fn test_model() -> Model {
        let now = chrono::Utc::now();
        Model {
            id: Id::new_v4(),
            title: "Q3 Budget Proposal Review".to_string(),
            call_date: now.into(),
            organizer: "alice@internal.example".to_string(),
            participants: json!(["alice@internal.example", "bob@client.example"]),
            transcript: "ballpark estimate, rough numbers".to_string(),
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
            external_domains: Some(json!(["client.example"])),
            classification_source: ClassificationSource::Calendar,
            meet_code: Some("abc-defg-hij".to_string()),
            is_duplicate: false,
            drive_file_id: None,
            calendar_event_id: None,
            created_at: now.into(),
            updated_at: now.into(),
        }
    }

    #[tokio::test]
    async fn create_returns_a_new_call_model() -> Result<(), Error> {
        let model = test_model();

        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results(vec![vec![model.clone()]])
            .into_connection();

        let call = create(&db, model.clone()).await?;

        assert_eq!(call.title, model.title);
        assert_eq!(call.meet_code, model.meet_code);

        Ok(())
    }

    #[tokio::test]
    async fn find_by_meet_code_and_date_returns_none_when_absent() -> Result<(), Error> {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results::<Model, Vec<Model>, _>(vec![vec![]])
            .into_connection();

        let result =
            find_by_meet_code_and_date(&db, "abc-defg-hij", chrono::Utc::now().into()).await?;
        assert!(result.is_none());

        Ok(())
    }

    #[tokio::test]
    async fn update_classification_assigns_when_not_overridden() -> Result<(), Error> {
        let model = test_model();
        let category_id = Id::new_v4();

        let mut updated = model.clone();
        updated.predicted_category_id = Some(category_id);
        updated.category_id = Some(category_id);
        updated.category_final_id = Some(category_id);

        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results(vec![vec![model.clone()], vec![updated.clone()]])
            .into_connection();

        let result = update_classification(
            &db,
            model.id,
            ClassificationUpdate {
                transcript_summary: Some("digest".to_string()),
                predicted_category_id: category_id,
                confidence_score: 0.82,
                category_reasoning: "clear proposal signals".to_string(),
                top_candidates: json!([{"category": "Ballpark Proposal", "score": 6}]),
                needs_review: false,
                category_id: Some(category_id),
                category_final_id: Some(category_id),
            },
        )
        .await?;

        assert_eq!(result.category_id, Some(category_id));
        assert_eq!(result.category_final_id, Some(category_id));

        Ok(())
    }

    #[tokio::test]
    async fn apply_override_sets_both_categories_and_clears_review() -> Result<(), Error> {
        let mut model = test_model();
        model.needs_review = true;
        let category_id = Id::new_v4();
        let actor = Id::new_v4();

        let mut overridden = model.clone();
        overridden.category_id = Some(category_id);
        overridden.category_final_id = Some(category_id);
        overridden.was_overridden = true;
        overridden.needs_review = false;

        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results(vec![vec![model.clone()], vec![overridden.clone()]])
            .into_connection();

        let result = apply_override(&db, model.id, category_id, actor).await?;

        assert!(result.was_overridden);
        assert!(!result.needs_review);
        assert_eq!(result.category_id, result.category_final_id);

        Ok(())
    }
}
