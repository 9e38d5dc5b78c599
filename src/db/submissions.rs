//! Database operations for build submissions.

use sea_orm::*;
use uuid::Uuid;

use crate::entity::submission;
use crate::error::{AppError, AppResult};
use crate::models::Category;

/// Insert a new submission and fetch it back.
pub async fn insert(
    db: &DatabaseConnection,
    model: submission::ActiveModel,
) -> AppResult<submission::Model> {
    let id = match &model.id {
        ActiveValue::Set(id) => *id,
        _ => return Err(AppError::Database("Submission id must be set".to_string())),
    };

    submission::Entity::insert(model).exec(db).await?;

    submission::Entity::find_by_id(id)
        .one(db)
        .await?
        .ok_or_else(|| AppError::Database("Failed to fetch newly inserted submission".to_string()))
}

/// Find a submission by id within a category. Soft-deleted rows are still
/// returned here; visibility rules apply to list queries only.
pub async fn find_by_id(
    db: &DatabaseConnection,
    category: Category,
    id: Uuid,
) -> AppResult<Option<submission::Model>> {
    let result = submission::Entity::find_by_id(id)
        .filter(submission::Column::Category.eq(category.as_str()))
        .one(db)
        .await?;

    Ok(result)
}

/// List submissions in a category matching the composed visibility filter,
/// most recently updated first. When `favorite_ids` is given the result is
/// additionally restricted to those ids.
pub async fn list(
    db: &DatabaseConnection,
    category: Category,
    filter: Condition,
    favorite_ids: Option<Vec<Uuid>>,
) -> AppResult<Vec<submission::Model>> {
    let mut select = submission::Entity::find()
        .filter(submission::Column::Category.eq(category.as_str()))
        .filter(filter);

    if let Some(ids) = favorite_ids {
        if ids.is_empty() {
            return Ok(Vec::new());
        }
        select = select.filter(submission::Column::Id.is_in(ids));
    }

    let rows = select
        .order_by_desc(submission::Column::UpdatedAt)
        .all(db)
        .await?;

    Ok(rows)
}

/// Persist changes staged on an active model.
pub async fn update(
    db: &DatabaseConnection,
    model: submission::ActiveModel,
) -> AppResult<submission::Model> {
    let updated = model.update(db).await?;
    Ok(updated)
}

/// Permanently remove a submission.
pub async fn delete_by_id(db: &DatabaseConnection, id: Uuid) -> AppResult<()> {
    submission::Entity::delete_by_id(id).exec(db).await?;
    Ok(())
}
