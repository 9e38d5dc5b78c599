//! Per-user favorite toggling.

use sea_orm::DatabaseConnection;
use uuid::Uuid;

use crate::db;
use crate::error::AppResult;
use crate::models::Category;

/// Toggle a favorite for `(user, build, category)`. Returns the new state:
/// `true` when the build is now favorited.
///
/// Find-then-write without a transaction; the unique index on
/// `(user_id, submission_id, category)` backstops concurrent inserts.
pub async fn toggle(
    db: &DatabaseConnection,
    user_id: Uuid,
    submission_id: Uuid,
    category: Category,
) -> AppResult<bool> {
    match db::favorites::find(db, user_id, submission_id, category).await? {
        Some(existing) => {
            db::favorites::delete(db, existing.id).await?;
            Ok(false)
        }
        None => {
            db::favorites::insert(db, user_id, submission_id, category).await?;
            Ok(true)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use sea_orm::{DatabaseBackend, MockDatabase, MockExecResult};

    use crate::entity::favorite;

    #[tokio::test]
    async fn test_toggle_pair_returns_to_original_state() {
        let user_id = Uuid::new_v4();
        let submission_id = Uuid::new_v4();
        let row = favorite::Model {
            id: Uuid::new_v4(),
            user_id,
            submission_id,
            category: Category::Community.as_str().to_string(),
            created_at: Utc::now(),
        };

        let db = MockDatabase::new(DatabaseBackend::Postgres)
            // first toggle: lookup misses, insert returns the new row;
            // second toggle: lookup hits
            .append_query_results([
                Vec::<favorite::Model>::new(),
                vec![row.clone()],
                vec![row.clone()],
            ])
            // second toggle: the hit row is deleted
            .append_exec_results([MockExecResult {
                last_insert_id: 0,
                rows_affected: 1,
            }])
            .into_connection();

        let first = toggle(&db, user_id, submission_id, Category::Community)
            .await
            .unwrap();
        assert!(first);

        let second = toggle(&db, user_id, submission_id, Category::Community)
            .await
            .unwrap();
        assert!(!second);
    }

    #[tokio::test]
    async fn test_toggle_removes_existing_favorite() {
        let user_id = Uuid::new_v4();
        let submission_id = Uuid::new_v4();
        let row = favorite::Model {
            id: Uuid::new_v4(),
            user_id,
            submission_id,
            category: Category::Core.as_str().to_string(),
            created_at: Utc::now(),
        };

        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([vec![row]])
            .append_exec_results([MockExecResult {
                last_insert_id: 0,
                rows_affected: 1,
            }])
            .into_connection();

        let favorited = toggle(&db, user_id, submission_id, Category::Core)
            .await
            .unwrap();
        assert!(!favorited);
    }
}
