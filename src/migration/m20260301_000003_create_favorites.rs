//! Migration: Create favorites table.
//!
//! Deliberately no foreign key to submissions: a favorite may outlive the
//! build it points at. The unique index backstops the find-then-insert
//! toggle against concurrent requests.

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .get_connection()
            .execute_unprepared(
                r#"
                CREATE TABLE favorites (
                    id UUID PRIMARY KEY,
                    user_id UUID NOT NULL REFERENCES users(id) ON DELETE CASCADE,
                    submission_id UUID NOT NULL,
                    category VARCHAR(20) NOT NULL
                        CHECK (category IN ('core', 'community')),
                    created_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
                );

                CREATE UNIQUE INDEX idx_favorites_user_submission
                    ON favorites(user_id, submission_id, category);
                "#,
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .get_connection()
            .execute_unprepared("DROP TABLE IF EXISTS favorites CASCADE;")
            .await?;

        Ok(())
    }
}
