//! CRUD operations for calendar_events table.

use super::error::{EntityApiErrorKind, Error};
use entity::calendar_events::{ActiveModel, Column, Entity, Model};
use entity::Id;
use log::*;
use sea_orm::{
    entity::prelude::*,
    ActiveValue::{Set, Unchanged},
    DatabaseConnection, QueryOrder, TryIntoModel,
};

/// Creates or refreshes the row for (user_id, remote_event_id).
///
/// Calendar syncs re-walk the same window on every run, so the common case is
/// an update. Local state (import status, duplicate markers, transcript match)
/// is preserved across refreshes; only the remote-sourced fields move.
pub async fn upsert(db: &DatabaseConnection, model: Model) -> Result<Model, Error> {
    let now = chrono::Utc::now();

    let existing = Entity::find()
        .filter(Column::UserId.eq(model.user_id))
        .filter(Column::RemoteEventId.eq(model.remote_event_id.clone()))
        .one(db)
        .await?;

    match existing {
        Some(existing) => {
            debug!("Refreshing calendar event: {}", existing.remote_event_id);

            let active_model = ActiveModel {
                id: Unchanged(existing.id),
                summary: Set(model.summary),
                start_time: Set(model.start_time),
                end_time: Set(model.end_time),
                organizer: Set(model.organizer),
                attendees: Set(model.attendees),
                hangout_link: Set(model.hangout_link),
                meet_code: Set(model.meet_code),
                is_external: Set(model.is_external),
                external_domains: Set(model.external_domains),
                updated_at: Set(now.into()),
                ..Default::default()
            };

            Ok(active_model.update(db).await?.try_into_model()?)
        }
        None => {
            debug!("Creating calendar event: {}", model.remote_event_id);

            let active_model = ActiveModel {
                user_id: Set(model.user_id),
                remote_event_id: Set(model.remote_event_id),
                summary: Set(model.summary),
                start_time: Set(model.start_time),
                end_time: Set(model.end_time),
                organizer: Set(model.organizer),
                attendees: Set(model.attendees),
                hangout_link: Set(model.hangout_link),
                meet_code: Set(model.meet_code),
                is_external: Set(model.is_external),
                external_domains: Set(model.external_domains),
                has_transcript: Set(false),
                transcript_file_id: Set(None),
                imported: Set(false),
                imported_call_id: Set(None),
                is_duplicate: Set(false),
                primary_event_id: Set(None),
                primary_user_id: Set(None),
                created_at: Set(now.into()),
                updated_at: Set(now.into()),
                ..Default::default()
            };

            Ok(active_model.save(db).await?.try_into_model()?)
        }
    }
}

pub async fn find_by_id(db: &DatabaseConnection, id: Id) -> Result<Model, Error> {
    Entity::find_by_id(id).one(db).await?.ok_or_else(|| Error {
        source: None,
        error_kind: EntityApiErrorKind::RecordNotFound,
    })
}

pub async fn find_by_user_and_remote_event_id(
    db: &DatabaseConnection,
    user_id: Id,
    remote_event_id: &str,
) -> Result<Option<Model>, Error> {
    Ok(Entity::find()
        .filter(Column::UserId.eq(user_id))
        .filter(Column::RemoteEventId.eq(remote_event_id))
        .one(db)
        .await?)
}

pub async fn find_by_ids(db: &DatabaseConnection, ids: Vec<Id>) -> Result<Vec<Model>, Error> {
    Ok(Entity::find()
        .filter(Column::Id.is_in(ids))
        .all(db)
        .await?)
}

pub async fn find_by_user_id(db: &DatabaseConnection, user_id: Id) -> Result<Vec<Model>, Error> {
    Ok(Entity::find()
        .filter(Column::UserId.eq(user_id))
        .order_by_desc(Column::StartTime)
        .all(db)
        .await?)
}

/// Events already synced by other users that share a meet code. Used to mark
/// cross-user duplicates so a meeting seen via two calendars imports once.
pub async fn find_others_by_meet_code(
    db: &DatabaseConnection,
    meet_code: &str,
    excluding_user_id: Id,
) -> Result<Vec<Model>, Error> {
    Ok(Entity::find()
        .filter(Column::MeetCode.eq(meet_code))
        .filter(Column::UserId.ne(excluding_user_id))
        .order_by_asc(Column::CreatedAt)
        .all(db)
        .await?)
}

pub async fn mark_duplicate(
    db: &DatabaseConnection,
    id: Id,
    primary_event_id: Id,
    primary_user_id: Id,
) -> Result<Model, Error> {
    let existing = find_by_id(db, id).await?;

    let active_model = ActiveModel {
        id: Unchanged(existing.id),
        is_duplicate: Set(true),
        primary_event_id: Set(Some(primary_event_id)),
        primary_user_id: Set(Some(primary_user_id)),
        updated_at: Set(chrono::Utc::now().into()),
        ..Default::default()
    };

    Ok(active_model.update(db).await?.try_into_model()?)
}

/// Records the transcript-matcher verdict for an event.
pub async fn update_transcript_match(
    db: &DatabaseConnection,
    id: Id,
    has_transcript: bool,
    transcript_file_id: Option<String>,
) -> Result<Model, Error> {
    let existing = find_by_id(db, id).await?;

    let active_model = ActiveModel {
        id: Unchanged(existing.id),
        has_transcript: Set(has_transcript),
        transcript_file_id: Set(transcript_file_id),
        updated_at: Set(chrono::Utc::now().into()),
        ..Default::default()
    };

    Ok(active_model.update(db).await?.try_into_model()?)
}

pub async fn mark_imported(
    db: &DatabaseConnection,
    id: Id,
    imported_call_id: Id,
) -> Result<Model, Error> {
    let existing = find_by_id(db, id).await?;

    debug!(
        "Marking calendar event {} imported as call {}",
        existing.remote_event_id, imported_call_id
    );

    let active_model = ActiveModel {
        id: Unchanged(existing.id),
        imported: Set(true),
        imported_call_id: Set(Some(imported_call_id)),
        updated_at: Set(chrono::Utc::now().into()),
        ..Default::default()
    };

    Ok(active_model.update(db).await?.try_into_model()?)
}

#[cfg(test)]
// We need to gate seaORM's mock feature behind conditional compilation because
// the feature removes the Clone trait implementation from seaORM's DatabaseConnection.
// see https://github.com/SeaQL/sea-orm/issues/830
#[cfg(feature = "mock")]
mod tests {
    use super::*;
    use sea_orm::{DatabaseBackend, MockDatabase};
    use serde_json::json;

    fn test_model() -> Model {
        let now = chrono::Utc::now();
        Model {
            id: Id::new_v4(),
            user_id: Id::new_v4(),
            remote_event_id: "evt_123".to_string(),
            summary: Some("Weekly delivery check-in".to_string()),
            start_time: now.into(),
            end_time: (now + chrono::Duration::hours(1)).into(),
            organizer: Some("alice@internal.example".to_string()),
            attendees: json!(["alice@internal.example", "bob@client.example"]),
            hangout_link: Some("https://meet.google.com/abc-defg-hij".to_string()),
            meet_code: Some("abc-defg-hij".to_string()),
            is_external: Some(true),
            external_domains: json!(["client.example"]),
            has_transcript: false,
            transcript_file_id: None,
            imported: false,
            imported_call_id: None,
            is_duplicate: false,
            primary_event_id: None,
            primary_user_id: None,
            created_at: now.into(),
            updated_at: now.into(),
        }
    }

    #[tokio::test]
    async fn upsert_creates_when_no_existing_row() -> Result<(), Error> {
        let model = test_model();

        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results::<Model, Vec<Model>, _>(vec![vec![], vec![model.clone()]])
            .into_connection();

        let event = upsert(&db, model.clone()).await?;

        assert_eq!(event.remote_event_id, model.remote_event_id);
        assert!(!event.imported);

        Ok(())
    }

    #[tokio::test]
    async fn mark_imported_sets_call_link() -> Result<(), Error> {
        let model = test_model();
        let call_id = Id::new_v4();

        let mut imported = model.clone();
        imported.imported = true;
        imported.imported_call_id = Some(call_id);

        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results(vec![vec![model.clone()], vec![imported.clone()]])
            .into_connection();

        let event = mark_imported(&db, model.id, call_id).await?;

        assert!(event.imported);
        assert_eq!(event.imported_call_id, Some(call_id));

        Ok(())
    }

    #[tokio::test]
    async fn find_by_id_returns_record_not_found_when_absent() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results::<Model, Vec<Model>, _>(vec![vec![]])
            .into_connection();

        let result = find_by_id(&db, Id::new_v4()).await;
        assert_eq!(
            result.unwrap_err().error_kind,
            EntityApiErrorKind::RecordNotFound
        );
    }
}
