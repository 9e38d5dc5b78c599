//! Submission entity: a contributor build awaiting or past review.

use sea_orm::entity::prelude::*;

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "submissions")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    /// Sharding key: "core" or "community"
    pub category: String,
    pub title: String,
    pub description: String,
    pub repo_url: String,
    pub live_url: String,
    /// JSONB array of normalized tags
    pub tech_stack: Json,
    pub contributor_id: i64,
    pub contributor_name: String,
    pub contributor_avatar_url: String,
    pub contributor_github_url: String,
    pub contributor_role: String,
    pub status: String,
    pub submitted_at: DateTimeUtc,
    pub updated_by: Option<String>,
    pub updated_by_role: Option<String>,
    pub reviewed_by: Option<String>,
    pub reviewed_by_role: Option<String>,
    pub reviewed_at: Option<DateTimeUtc>,
    pub rejection_reason: Option<String>,
    pub suggestion: Option<String>,
    pub restored_by: Option<String>,
    pub restored_by_role: Option<String>,
    pub restored_at: Option<DateTimeUtc>,
    pub restored_reason: Option<String>,
    pub is_deleted: bool,
    pub deleted_by: Option<String>,
    pub deleted_by_role: Option<String>,
    pub deleted_at: Option<DateTimeUtc>,
    pub created_at: DateTimeUtc,
    pub updated_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
