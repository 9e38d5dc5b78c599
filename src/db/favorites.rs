//! Database operations for per-user favorites.

use chrono::Utc;
use sea_orm::*;
use uuid::Uuid;

use crate::entity::favorite;
use crate::error::AppResult;
use crate::models::Category;

/// Find a user's favorite row for a submission, if present.
pub async fn find(
    db: &DatabaseConnection,
    user_id: Uuid,
    submission_id: Uuid,
    category: Category,
) -> AppResult<Option<favorite::Model>> {
    let result = favorite::Entity::find()
        .filter(favorite::Column::UserId.eq(user_id))
        .filter(favorite::Column::SubmissionId.eq(submission_id))
        .filter(favorite::Column::Category.eq(category.as_str()))
        .one(db)
        .await?;

    Ok(result)
}

/// Add a favorite. No existence check against the submission: a favorite may
/// reference a build that was since deleted.
pub async fn insert(
    db: &DatabaseConnection,
    user_id: Uuid,
    submission_id: Uuid,
    category: Category,
) -> AppResult<()> {
    let model = favorite::ActiveModel {
        id: Set(Uuid::new_v4()),
        user_id: Set(user_id),
        submission_id: Set(submission_id),
        category: Set(category.as_str().to_string()),
        created_at: Set(Utc::now()),
    };

    favorite::Entity::insert(model).exec(db).await?;
    Ok(())
}

/// Remove a favorite row.
pub async fn delete(db: &DatabaseConnection, id: Uuid) -> AppResult<()> {
    favorite::Entity::delete_by_id(id).exec(db).await?;
    Ok(())
}

/// All submission ids the user has favorited within a category.
pub async fn submission_ids_for_user(
    db: &DatabaseConnection,
    user_id: Uuid,
    category: Category,
) -> AppResult<Vec<Uuid>> {
    let rows = favorite::Entity::find()
        .filter(favorite::Column::UserId.eq(user_id))
        .filter(favorite::Column::Category.eq(category.as_str()))
        .all(db)
        .await?;

    Ok(rows.into_iter().map(|m| m.submission_id).collect())
}
