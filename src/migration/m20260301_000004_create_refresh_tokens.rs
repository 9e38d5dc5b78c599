//! Migration: Create refresh_tokens table.
//!
//! Stores SHA-256 hashes of opaque refresh tokens, never the raw values.

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
                CREATE TABLE refresh_tokens (
                    id UUID PRIMARY KEY,
                    user_id UUID NOT NULL REFERENCES users(id) ON DELETE CASCADE,
                    token_hash CHAR(64) NOT NULL,
                    expires_at TIMESTAMPTZ NOT NULL,
                    revoked_at TIMESTAMPTZ,
                    created_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
                );

                -- Lookup path: active token by hash
                CREATE UNIQUE INDEX idx_refresh_tokens_hash
                    ON refresh_tokens(token_hash);

                CREATE INDEX idx_refresh_tokens_user
                    ON refresh_tokens(user_id)
                    WHERE revoked_at IS NULL;
                "#,
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .get_connection()
            .execute_unprepared("DROP TABLE IF EXISTS refresh_tokens CASCADE;")
            .await?;

        Ok(())
    }
}
