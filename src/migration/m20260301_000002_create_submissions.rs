//! Migration: Create submissions table.
//!
//! One table for both showcase categories; `category` is the sharding key.
//! Review, restore, and soft-delete metadata live as flat columns so list
//! responses need no joins.

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
                CREATE TABLE submissions (
                    id UUID PRIMARY KEY,
                    category VARCHAR(20) NOT NULL
                        CHECK (category IN ('core', 'community')),
                    title VARCHAR(255) NOT NULL,
                    description TEXT NOT NULL,
                    repo_url VARCHAR(500) NOT NULL,
                    live_url VARCHAR(500) NOT NULL,
                    tech_stack JSONB NOT NULL DEFAULT '[]',
                    contributor_id BIGINT NOT NULL,
                    contributor_name VARCHAR(255) NOT NULL,
                    contributor_avatar_url VARCHAR(500) NOT NULL,
                    contributor_github_url VARCHAR(500) NOT NULL,
                    contributor_role VARCHAR(20) NOT NULL,
                    status VARCHAR(20) NOT NULL DEFAULT 'pending'
                        CHECK (status IN ('pending', 'approved', 'rejected')),
                    submitted_at TIMESTAMPTZ NOT NULL,

                    updated_by VARCHAR(255),
                    updated_by_role VARCHAR(20),

                    reviewed_by VARCHAR(255),
                    reviewed_by_role VARCHAR(20),
                    reviewed_at TIMESTAMPTZ,
                    rejection_reason TEXT,
                    suggestion TEXT,

                    restored_by VARCHAR(255),
                    restored_by_role VARCHAR(20),
                    restored_at TIMESTAMPTZ,
                    restored_reason TEXT,

                    is_deleted BOOLEAN NOT NULL DEFAULT FALSE,
                    deleted_by VARCHAR(255),
                    deleted_by_role VARCHAR(20),
                    deleted_at TIMESTAMPTZ,

                    created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
                    updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
                );

                -- List queries always scope by category
                CREATE INDEX idx_submissions_category_status
                    ON submissions(category, status)
                    WHERE is_deleted = FALSE;

                -- Contributor's own builds (pending/rejected visibility)
                CREATE INDEX idx_submissions_contributor
                    ON submissions(category, contributor_id);

                -- Default sort order
                CREATE INDEX idx_submissions_updated_at
                    ON submissions(category, updated_at DESC);
                "#,
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .get_connection()
            .execute_unprepared("DROP TABLE IF EXISTS submissions CASCADE;")
            .await?;

        Ok(())
    }
}
