//! Domain models for build submissions and the review workflow.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::models::user::UserRole;

/// Maximum number of tech-stack tags per submission.
pub const MAX_TECH_STACK: usize = 8;

/// Submission category. A sharding key: both categories share the same
/// schema but live in separate showcases with different URL rules.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum Category {
    Core,
    Community,
}

impl Category {
    /// Resolve the category from the `type` query parameter.
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "core" => Some(Self::Core),
            "community" => Some(Self::Community),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Core => "core",
            Self::Community => "community",
        }
    }
}

impl std::fmt::Display for Category {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Review lifecycle status of a submission.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum SubmissionStatus {
    Pending,
    Approved,
    Rejected,
}

impl SubmissionStatus {
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "pending" => Some(Self::Pending),
            "approved" => Some(Self::Approved),
            "rejected" => Some(Self::Rejected),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Approved => "approved",
            Self::Rejected => "rejected",
        }
    }
}

impl std::fmt::Display for SubmissionStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Request body for submitting a new build.
#[derive(Debug, Clone, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct NewSubmission {
    pub title: Option<String>,
    pub description: Option<String>,
    pub repo_url: Option<String>,
    pub live_url: Option<String>,
    pub contributor_id: Option<i64>,
    pub contributor_name: Option<String>,
    pub contributor_avatar_url: Option<String>,
    pub contributor_github_url: Option<String>,
    pub contributor_role: Option<UserRole>,
    #[serde(default)]
    pub tech_stack: Vec<String>,
}

/// Request body for editing an existing build. Absent fields keep their
/// stored values; any accepted edit sends the build back to review.
#[derive(Debug, Clone, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdateSubmission {
    pub title: Option<String>,
    pub description: Option<String>,
    pub repo_url: Option<String>,
    pub live_url: Option<String>,
    pub contributor_id: Option<i64>,
    pub contributor_name: Option<String>,
    pub contributor_avatar_url: Option<String>,
    pub contributor_github_url: Option<String>,
    pub contributor_role: Option<UserRole>,
    pub tech_stack: Option<Vec<String>>,
    pub updated_by: Option<String>,
    pub updated_by_role: Option<UserRole>,
}

/// Request body for an admin review verdict.
#[derive(Debug, Clone, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ReviewRequest {
    pub status: String,
    pub rejection_reason: Option<String>,
    pub suggestion: Option<String>,
}

/// Request body for restoring a soft-deleted build.
#[derive(Debug, Clone, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct RestoreRequest {
    pub status: Option<String>,
    pub restored_reason: Option<String>,
}

/// Request body identifying the actor for a delete.
#[derive(Debug, Clone, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct DeleteRequest {
    pub contributor_id: Option<i64>,
    pub contributor_name: Option<String>,
    pub user_role: Option<UserRole>,
}

/// Query parameters for the build list endpoint.
#[derive(Debug, Clone, Default, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ListQuery {
    /// Category key ("core" or "community")
    #[serde(rename = "type")]
    pub category: Option<String>,
    pub title: Option<String>,
    pub tech_stack: Option<String>,
    pub contributor_name: Option<String>,
    pub contributor_id: Option<i64>,
    pub approved: Option<bool>,
    pub pending: Option<bool>,
    pub rejected: Option<bool>,
    /// Restrict to the caller's favorited builds
    pub favorite: Option<bool>,
    /// Admin only: include soft-deleted builds
    pub include_deleted: Option<bool>,
}

impl ListQuery {
    /// Status-inclusion set from the boolean query params, if any was given.
    pub fn statuses(&self) -> Option<Vec<SubmissionStatus>> {
        let mut set = Vec::new();
        if self.approved == Some(true) {
            set.push(SubmissionStatus::Approved);
        }
        if self.pending == Some(true) {
            set.push(SubmissionStatus::Pending);
        }
        if self.rejected == Some(true) {
            set.push(SubmissionStatus::Rejected);
        }
        (!set.is_empty()).then_some(set)
    }
}

/// Full submission payload returned by the API.
#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SubmissionResponse {
    pub id: Uuid,
    pub category: Category,
    pub title: String,
    pub description: String,
    pub repo_url: String,
    pub live_url: String,
    pub tech_stack: Vec<String>,
    pub contributor_id: i64,
    pub contributor_name: String,
    pub contributor_avatar_url: String,
    pub contributor_github_url: String,
    pub contributor_role: String,
    pub status: SubmissionStatus,
    pub submitted_at: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub updated_by: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub updated_by_role: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reviewed_by: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reviewed_by_role: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reviewed_at: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rejection_reason: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub suggestion: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub restored_by: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub restored_by_role: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub restored_at: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub restored_reason: Option<String>,
    pub is_deleted: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub deleted_by: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub deleted_by_role: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub deleted_at: Option<DateTime<Utc>>,
    pub updated_at: DateTime<Utc>,
}

impl From<crate::entity::submission::Model> for SubmissionResponse {
    fn from(m: crate::entity::submission::Model) -> Self {
        let tech_stack = serde_json::from_value(m.tech_stack).unwrap_or_default();
        Self {
            id: m.id,
            category: Category::parse(&m.category).unwrap_or(Category::Community),
            title: m.title,
            description: m.description,
            repo_url: m.repo_url,
            live_url: m.live_url,
            tech_stack,
            contributor_id: m.contributor_id,
            contributor_name: m.contributor_name,
            contributor_avatar_url: m.contributor_avatar_url,
            contributor_github_url: m.contributor_github_url,
            contributor_role: m.contributor_role,
            status: SubmissionStatus::parse(&m.status).unwrap_or(SubmissionStatus::Pending),
            submitted_at: m.submitted_at,
            updated_by: m.updated_by,
            updated_by_role: m.updated_by_role,
            reviewed_by: m.reviewed_by,
            reviewed_by_role: m.reviewed_by_role,
            reviewed_at: m.reviewed_at,
            rejection_reason: m.rejection_reason,
            suggestion: m.suggestion,
            restored_by: m.restored_by,
            restored_by_role: m.restored_by_role,
            restored_at: m.restored_at,
            restored_reason: m.restored_reason,
            is_deleted: m.is_deleted,
            deleted_by: m.deleted_by,
            deleted_by_role: m.deleted_by_role,
            deleted_at: m.deleted_at,
            updated_at: m.updated_at,
        }
    }
}

/// Success envelope wrapping a single build.
#[derive(Debug, Serialize, ToSchema)]
pub struct SubmissionEnvelope {
    pub message: String,
    pub build: SubmissionResponse,
}

/// Success envelope with no payload.
#[derive(Debug, Serialize, ToSchema)]
pub struct MessageResponse {
    pub message: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_category_parse() {
        assert_eq!(Category::parse("core"), Some(Category::Core));
        assert_eq!(Category::parse("community"), Some(Category::Community));
        assert_eq!(Category::parse("crafted"), None);
        assert_eq!(Category::parse(""), None);
    }

    #[test]
    fn test_status_roundtrip() {
        for s in ["pending", "approved", "rejected"] {
            assert_eq!(SubmissionStatus::parse(s).unwrap().as_str(), s);
        }
        assert_eq!(SubmissionStatus::parse("deleted"), None);
    }

    #[test]
    fn test_list_query_status_set() {
        let q = ListQuery {
            approved: Some(true),
            rejected: Some(true),
            ..Default::default()
        };
        assert_eq!(
            q.statuses(),
            Some(vec![
                SubmissionStatus::Approved,
                SubmissionStatus::Rejected
            ])
        );

        let q = ListQuery::default();
        assert_eq!(q.statuses(), None);
    }
}
