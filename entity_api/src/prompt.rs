//! CRUD operations for prompts table.

use super::error::{EntityApiErrorKind, Error};
use entity::prompts::{ActiveModel, Column, Entity, Model};
use entity::Id;
use log::*;
use sea_orm::{
    entity::prelude::*,
    ActiveValue::{Set, Unchanged},
    DatabaseConnection, QueryOrder, TryIntoModel,
};

pub async fn create(db: &DatabaseConnection, model: Model) -> Result<Model, Error> {
    debug!("Creating new prompt: {}", model.name);

    let now = chrono::Utc::now();

    let active_model = ActiveModel {
        name: Set(model.name),
        analysis_prompt: Set(model.analysis_prompt),
        rating_prompt: Set(model.rating_prompt),
        // New prompts start inactive; activation is an explicit step so the
        // single-active invariant has one enforcement point.
        is_active: Set(false),
        created_at: Set(now.into()),
        updated_at: Set(now.into()),
        ..Default::default()
    };

    Ok(active_model.save(db).await?.try_into_model()?)
}

pub async fn update(db: &DatabaseConnection, id: Id, model: Model) -> Result<Model, Error> {
    let existing = find_by_id(db, id).await?;

    debug!("Updating prompt: {id}");

    let active_model = ActiveModel {
        id: Unchanged(existing.id),
        name: Set(model.name),
        analysis_prompt: Set(model.analysis_prompt),
        rating_prompt: Set(model.rating_prompt),
        is_active: Unchanged(existing.is_active),
        created_at: Unchanged(existing.created_at),
        updated_at: Set(chrono::Utc::now().into()),
    };

    Ok(active_model.update(db).await?.try_into_model()?)
}

pub async fn find_by_id(db: &DatabaseConnection, id: Id) -> Result<Model, Error> {
    Entity::find_by_id(id).one(db).await?.ok_or_else(|| Error {
        source: None,
        error_kind: EntityApiErrorKind::RecordNotFound,
    })
}

pub async fn find_all(db: &DatabaseConnection) -> Result<Vec<Model>, Error> {
    Ok(Entity::find()
        .order_by_desc(Column::UpdatedAt)
        .all(db)
        .await?)
}

/// The prompt the analysis pipeline should use right now, if any.
pub async fn find_active(db: &DatabaseConnection) -> Result<Option<Model>, Error> {
    Ok(Entity::find()
        .filter(Column::IsActive.eq(true))
        .one(db)
        .await?)
}

/// Makes the given prompt the single active one, deactivating the rest.
pub async fn activate(db: &DatabaseConnection, id: Id) -> Result<Model, Error> {
    let existing = find_by_id(db, id).await?;

    info!("Activating prompt: {}", existing.name);

    Entity::update_many()
        .col_expr(Column::IsActive, Expr::value(false))
        .filter(Column::Id.ne(id))
        .exec(db)
        .await?;

    let active_model = ActiveModel {
        id: Unchanged(existing.id),
        is_active: Set(true),
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
    use sea_orm::{DatabaseBackend, MockDatabase, MockExecResult};

    fn test_model(is_active: bool) -> Model {
        let now = chrono::Utc::now();
        Model {
            id: Id::new_v4(),
            name: "Default call analysis".to_string(),
            analysis_prompt: "Summarize what was discussed and decided.".to_string(),
            rating_prompt: Some("Rate the call 1-10.".to_string()),
            is_active,
            created_at: now.into(),
            updated_at: now.into(),
        }
    }

    #[tokio::test]
    async fn create_returns_an_inactive_prompt() -> Result<(), Error> {
        let model = test_model(false);

        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results(vec![vec![model.clone()]])
            .into_connection();

        let prompt = create(&db, model.clone()).await?;

        assert_eq!(prompt.name, model.name);
        assert!(!prompt.is_active);

        Ok(())
    }

    #[tokio::test]
    async fn activate_deactivates_siblings_then_flips_target() -> Result<(), Error> {
        let model = test_model(false);

        let mut activated = model.clone();
        activated.is_active = true;

        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results(vec![vec![model.clone()], vec![activated.clone()]])
            .append_exec_results(vec![MockExecResult {
                last_insert_id: 0,
                rows_affected: 2,
            }])
            .into_connection();

        let prompt = activate(&db, model.id).await?;

        assert!(prompt.is_active);

        Ok(())
    }

    #[tokio::test]
    async fn find_active_returns_none_when_no_prompt_is_active() -> Result<(), Error> {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results::<Model, Vec<Model>, _>(vec![vec![]])
            .into_connection();

        assert!(find_active(&db).await?.is_none());

        Ok(())
    }
}
