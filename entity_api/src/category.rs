//! CRUD operations for categories table.

use super::error::{EntityApiErrorKind, Error};
use entity::categories::{ActiveModel, Column, Entity, Model};
use entity::Id;
use log::*;
use sea_orm::{
    entity::prelude::*,
    ActiveValue::{Set, Unchanged},
    DatabaseConnection, QueryOrder, TryIntoModel,
};

/// Creates a new (non-fixed) category. Fixed catalog rows come from seeding,
/// never from this path.
pub async fn create(db: &DatabaseConnection, model: Model) -> Result<Model, Error> {
    debug!("Creating new category: {}", model.name);

    let now = chrono::Utc::now();

    let active_model = ActiveModel {
        name: Set(model.name),
        description: Set(model.description),
        color: Set(model.color),
        is_fixed: Set(false),
        created_at: Set(now.into()),
        updated_at: Set(now.into()),
        ..Default::default()
    };

    Ok(active_model.save(db).await?.try_into_model()?)
}

pub async fn update(db: &DatabaseConnection, id: Id, model: Model) -> Result<Model, Error> {
    let result = Entity::find_by_id(id).one(db).await?;

    match result {
        Some(existing) => {
            debug!("Updating category: {id}");

            let active_model = ActiveModel {
                id: Unchanged(existing.id),
                name: Set(model.name),
                description: Set(model.description),
                color: Set(model.color),
                // is_fixed is immutable through the API; the catalog
                // membership is a seed-time decision.
                is_fixed: Unchanged(existing.is_fixed),
                created_at: Unchanged(existing.created_at),
                updated_at: Set(chrono::Utc::now().into()),
            };

            Ok(active_model.update(db).await?.try_into_model()?)
        }
        None => Err(Error {
            source: None,
            error_kind: EntityApiErrorKind::RecordNotFound,
        }),
    }
}

pub async fn find_by_id(db: &DatabaseConnection, id: Id) -> Result<Model, Error> {
    Entity::find_by_id(id).one(db).await?.ok_or_else(|| Error {
        source: None,
        error_kind: EntityApiErrorKind::RecordNotFound,
    })
}

/// Finds a member of the fixed catalog by name. The classifier's output must
/// always resolve through this lookup.
pub async fn find_fixed_by_name(
    db: &DatabaseConnection,
    name: &str,
) -> Result<Option<Model>, Error> {
    Ok(Entity::find()
        .filter(Column::Name.eq(name))
        .filter(Column::IsFixed.eq(true))
        .one(db)
        .await?)
}

pub async fn find_all(db: &DatabaseConnection) -> Result<Vec<Model>, Error> {
    Ok(Entity::find().order_by_asc(Column::Name).all(db).await?)
}

/// Deletes a category. Fixed catalog members cannot be deleted.
pub async fn delete_by_id(db: &DatabaseConnection, id: Id) -> Result<(), Error> {
    let existing = find_by_id(db, id).await?;

    if existing.is_fixed {
        warn!("Refusing to delete fixed category: {}", existing.name);
        return Err(Error {
            source: None,
            error_kind: EntityApiErrorKind::ValidationError,
        });
    }

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
    use sea_orm::{DatabaseBackend, MockDatabase, MockExecResult};

    fn test_model(is_fixed: bool) -> Model {
        let now = chrono::Utc::now();
        Model {
            id: Id::new_v4(),
            name: "Ballpark Proposal".to_string(),
            description: Some("Indicative scope and cost ranges".to_string()),
            color: Some("#FBBF24".to_string()),
            is_fixed,
            created_at: now.into(),
            updated_at: now.into(),
        }
    }

    #[tokio::test]
    async fn create_returns_a_new_category_model() -> Result<(), Error> {
        let model = test_model(false);

        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results(vec![vec![model.clone()]])
            .into_connection();

        let category = create(&db, model.clone()).await?;

        assert_eq!(category.name, model.name);
        assert!(!category.is_fixed);

        Ok(())
    }

    #[tokio::test]
    async fn find_fixed_by_name_ignores_non_fixed_rows() -> Result<(), Error> {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results::<Model, Vec<Model>, _>(vec![vec![]])
            .into_connection();

        let result = find_fixed_by_name(&db, "Legacy Freeform").await?;
        assert!(result.is_none());

        Ok(())
    }

    #[tokio::test]
    async fn delete_by_id_refuses_fixed_categories() {
        let model = test_model(true);

        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results(vec![vec![model.clone()]])
            .into_connection();

        let result = delete_by_id(&db, model.id).await;
        assert_eq!(
            result.unwrap_err().error_kind,
            EntityApiErrorKind::ValidationError
        );
    }

    #[tokio::test]
    async fn delete_by_id_removes_non_fixed_category() -> Result<(), Error> {
        let model = test_model(false);

        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results(vec![vec![model.clone()]])
            .append_exec_results(vec![MockExecResult {
                last_insert_id: 0,
                rows_affected: 1,
            }])
            .into_connection();

        delete_by_id(&db, model.id).await?;

        Ok(())
    }
}
