//! Submission lifecycle: submit, edit, review, restore, delete.
//!
//! State machine: `pending -> {approved, rejected}`; any contributor edit
//! sends the build back to `pending`; owner deletion of approved content is
//! a soft delete that an admin can restore back to `approved`; admin
//! deletion (and owner deletion of unapproved content) is permanent.

use chrono::Utc;
use sea_orm::{DatabaseConnection, Set};
use uuid::Uuid;

use crate::db;
use crate::entity::submission;
use crate::error::{AppError, AppResult};
use crate::models::{
    Category, DeleteRequest, NewSubmission, RestoreRequest, ReviewRequest, SubmissionStatus,
    UpdateSubmission, UserRole, MAX_TECH_STACK,
};

/// Actor performing a review/restore, taken from the verified admin session.
#[derive(Debug, Clone)]
pub struct Actor {
    pub name: String,
    pub role: UserRole,
}

/// Outcome of a delete request.
#[derive(Debug, PartialEq, Eq)]
pub enum DeleteOutcome {
    /// Row removed permanently by an admin
    AdminPurged,
    /// Row removed permanently by its owner (never approved)
    OwnerPurged,
    /// Row flagged deleted, restorable by an admin
    SoftDeleted,
}

impl DeleteOutcome {
    pub fn message(&self) -> &'static str {
        match self {
            DeleteOutcome::AdminPurged => "Build permanently deleted by admin",
            DeleteOutcome::OwnerPurged | DeleteOutcome::SoftDeleted => {
                "Build deleted successfully"
            }
        }
    }
}

// ============================================================================
// Normalization and validation
// ============================================================================

/// Normalize tech-stack tags: trim, lowercase, drop blanks, dedupe keeping
/// first occurrence.
pub fn normalize_tech_stack(tags: &[String]) -> Vec<String> {
    let mut seen = Vec::new();
    for tag in tags {
        let normalized = tag.trim().to_lowercase();
        if !normalized.is_empty() && !seen.contains(&normalized) {
            seen.push(normalized);
        }
    }
    seen
}

fn is_blank(value: &Option<String>) -> bool {
    value.as_deref().map_or(true, |s| s.trim().is_empty())
}

/// Check the repo/live URL format for a category. Core builds live on the
/// site itself and use relative paths; community builds point elsewhere.
pub fn valid_url_for_category(category: Category, url: &str) -> bool {
    match category {
        Category::Core => url
            .strip_prefix('/')
            .and_then(|rest| rest.chars().next())
            .is_some_and(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-'),
        Category::Community => {
            let rest = url
                .strip_prefix("https://")
                .or_else(|| url.strip_prefix("http://"));
            rest.is_some_and(|r| !r.is_empty())
        }
    }
}

/// Validate a new submission: every content and contributor field is
/// required, URLs must match the category format, and the normalized
/// tech stack must stay within the cap. Collects all failures.
fn validate_new(category: Category, data: &NewSubmission) -> Result<Vec<String>, AppError> {
    let mut errors = Vec::new();

    for (value, field) in [
        (&data.title, "title"),
        (&data.description, "description"),
        (&data.repo_url, "repoUrl"),
        (&data.live_url, "liveUrl"),
        (&data.contributor_name, "contributorName"),
        (&data.contributor_avatar_url, "contributorAvatarUrl"),
        (&data.contributor_github_url, "contributorGithubUrl"),
    ] {
        if is_blank(value) {
            errors.push(format!("{} is required", field));
        }
    }
    if data.contributor_id.is_none() {
        errors.push("contributorId is required".to_string());
    }
    if data.contributor_role.is_none() {
        errors.push("contributorRole is required".to_string());
    }

    if let Some(ref url) = data.repo_url {
        if !url.trim().is_empty() && !valid_url_for_category(category, url) {
            errors.push(format!("Invalid repoUrl format for {} build", category));
        }
    }
    if let Some(ref url) = data.live_url {
        if !url.trim().is_empty() && !valid_url_for_category(category, url) {
            errors.push(format!("Invalid liveUrl format for {} build", category));
        }
    }

    let stack = normalize_tech_stack(&data.tech_stack);
    if stack.len() > MAX_TECH_STACK {
        errors.push(format!(
            "Tech stack must be unique and not exceed {} items",
            MAX_TECH_STACK
        ));
    }

    if errors.is_empty() {
        Ok(stack)
    } else {
        Err(AppError::Validation(errors))
    }
}

/// Validate a review request. Returns the target status plus the trimmed
/// rejection reason / suggestion that apply to it.
pub fn check_review(
    req: &ReviewRequest,
) -> AppResult<(SubmissionStatus, Option<String>, Option<String>)> {
    let status = SubmissionStatus::parse(&req.status)
        .ok_or_else(|| AppError::InvalidInput("Invalid status value".to_string()))?;

    let rejection_reason = match status {
        SubmissionStatus::Rejected => match req.rejection_reason.as_deref().map(str::trim) {
            Some(r) if !r.is_empty() => Some(r.to_string()),
            _ => {
                return Err(AppError::InvalidInput(
                    "Rejection reason is required when status is rejected".to_string(),
                ));
            }
        },
        _ => None,
    };

    let suggestion = match status {
        SubmissionStatus::Pending => match req.suggestion.as_deref().map(str::trim) {
            Some(s) if !s.is_empty() => Some(s.to_string()),
            _ => {
                return Err(AppError::InvalidInput(
                    "Suggestion message is required when status is pending".to_string(),
                ));
            }
        },
        _ => None,
    };

    Ok((status, rejection_reason, suggestion))
}

/// Validate a restore request. Restore only ever lands in `approved`.
pub fn check_restore(req: &RestoreRequest) -> AppResult<String> {
    if req.status.as_deref() != Some(SubmissionStatus::Approved.as_str()) {
        return Err(AppError::InvalidInput(
            "Only 'approved' status is allowed for restore".to_string(),
        ));
    }

    match req.restored_reason.as_deref().map(str::trim) {
        Some(r) if !r.is_empty() => Ok(r.to_string()),
        _ => Err(AppError::InvalidInput(
            "Restored reason is required".to_string(),
        )),
    }
}

// ============================================================================
// Operations
// ============================================================================

/// Submit a new build. Enters the lifecycle as `pending`.
pub async fn submit(
    db: &DatabaseConnection,
    category: Category,
    data: NewSubmission,
) -> AppResult<submission::Model> {
    let stack = validate_new(category, &data)?;
    let now = Utc::now();

    let model = submission::ActiveModel {
        id: Set(Uuid::now_v7()),
        category: Set(category.as_str().to_string()),
        title: Set(data.title.unwrap_or_default()),
        description: Set(data.description.unwrap_or_default()),
        repo_url: Set(data.repo_url.unwrap_or_default()),
        live_url: Set(data.live_url.unwrap_or_default()),
        tech_stack: Set(serde_json::json!(stack)),
        contributor_id: Set(data.contributor_id.unwrap_or_default()),
        contributor_name: Set(data.contributor_name.unwrap_or_default()),
        contributor_avatar_url: Set(data.contributor_avatar_url.unwrap_or_default()),
        contributor_github_url: Set(data.contributor_github_url.unwrap_or_default()),
        contributor_role: Set(data
            .contributor_role
            .unwrap_or_default()
            .as_str()
            .to_string()),
        status: Set(SubmissionStatus::Pending.as_str().to_string()),
        submitted_at: Set(now),
        updated_by: Set(None),
        updated_by_role: Set(None),
        reviewed_by: Set(None),
        reviewed_by_role: Set(None),
        reviewed_at: Set(None),
        rejection_reason: Set(None),
        suggestion: Set(None),
        restored_by: Set(None),
        restored_by_role: Set(None),
        restored_at: Set(None),
        restored_reason: Set(None),
        is_deleted: Set(false),
        deleted_by: Set(None),
        deleted_by_role: Set(None),
        deleted_at: Set(None),
        created_at: Set(now),
        updated_at: Set(now),
    };

    db::submissions::insert(db, model).await
}

/// Edit a build. Only the owning contributor may edit; absent fields keep
/// their stored values. Every accepted edit resets the build to `pending`
/// and clears prior review/restore annotations.
pub async fn edit(
    db: &DatabaseConnection,
    category: Category,
    id: Uuid,
    data: UpdateSubmission,
) -> AppResult<submission::Model> {
    let existing = db::submissions::find_by_id(db, category, id)
        .await?
        .ok_or_else(|| AppError::NotFound("Build".to_string()))?;

    if data.contributor_id != Some(existing.contributor_id) {
        return Err(AppError::Forbidden(
            "Unauthorized to update this build".to_string(),
        ));
    }

    let repo_url = data.repo_url.clone().unwrap_or(existing.repo_url.clone());
    let live_url = data.live_url.clone().unwrap_or(existing.live_url.clone());

    let mut errors = Vec::new();
    if !valid_url_for_category(category, &repo_url) {
        errors.push(format!("Invalid repoUrl format for {} build", category));
    }
    if !valid_url_for_category(category, &live_url) {
        errors.push(format!("Invalid liveUrl format for {} build", category));
    }

    let stack = data
        .tech_stack
        .as_deref()
        .map(normalize_tech_stack)
        .filter(|s| !s.is_empty());
    if let Some(ref s) = stack {
        if s.len() > MAX_TECH_STACK {
            errors.push(format!(
                "Tech stack must be unique and not exceed {} items",
                MAX_TECH_STACK
            ));
        }
    }
    if !errors.is_empty() {
        return Err(AppError::Validation(errors));
    }

    let mut active: submission::ActiveModel = existing.into();
    if let Some(title) = data.title {
        active.title = Set(title);
    }
    if let Some(description) = data.description {
        active.description = Set(description);
    }
    active.repo_url = Set(repo_url);
    active.live_url = Set(live_url);
    if let Some(name) = data.contributor_name {
        active.contributor_name = Set(name);
    }
    if let Some(avatar) = data.contributor_avatar_url {
        active.contributor_avatar_url = Set(avatar);
    }
    if let Some(url) = data.contributor_github_url {
        active.contributor_github_url = Set(url);
    }
    if let Some(role) = data.contributor_role {
        active.contributor_role = Set(role.as_str().to_string());
    }
    if let Some(stack) = stack {
        active.tech_stack = Set(serde_json::json!(stack));
    }

    active.updated_by = Set(Some(
        data.updated_by.unwrap_or_else(|| "Unknown".to_string()),
    ));
    active.updated_by_role = Set(Some(
        data.updated_by_role.unwrap_or_default().as_str().to_string(),
    ));
    active.updated_at = Set(Utc::now());

    // Back to review; stale annotations go with it
    active.status = Set(SubmissionStatus::Pending.as_str().to_string());
    active.rejection_reason = Set(None);
    active.suggestion = Set(None);
    active.restored_by = Set(None);
    active.restored_by_role = Set(None);
    active.restored_at = Set(None);
    active.restored_reason = Set(None);

    db::submissions::update(db, active).await
}

/// Apply an admin review verdict: approve, reject (with reason), or send
/// back to pending (with a suggestion).
pub async fn review(
    db: &DatabaseConnection,
    category: Category,
    id: Uuid,
    actor: &Actor,
    req: &ReviewRequest,
) -> AppResult<submission::Model> {
    if !actor.role.is_admin() {
        return Err(AppError::Forbidden(
            "Only admins can review builds".to_string(),
        ));
    }

    let (status, rejection_reason, suggestion) = check_review(req)?;

    let existing = db::submissions::find_by_id(db, category, id)
        .await?
        .ok_or_else(|| AppError::NotFound("Build".to_string()))?;

    let now = Utc::now();
    let mut active: submission::ActiveModel = existing.into();
    active.status = Set(status.as_str().to_string());
    active.reviewed_by = Set(Some(actor.name.clone()));
    active.reviewed_by_role = Set(Some(actor.role.as_str().to_string()));
    active.reviewed_at = Set(Some(now));
    // The reason matching the verdict is stored, the other is cleared
    active.rejection_reason = Set(rejection_reason);
    active.suggestion = Set(suggestion);
    active.updated_at = Set(now);

    db::submissions::update(db, active).await
}

/// Restore a soft-deleted build back to `approved` (admin only).
pub async fn restore(
    db: &DatabaseConnection,
    category: Category,
    id: Uuid,
    actor: &Actor,
    req: &RestoreRequest,
) -> AppResult<submission::Model> {
    if !actor.role.is_admin() {
        return Err(AppError::Forbidden(
            "Only admins can restore builds".to_string(),
        ));
    }

    let reason = check_restore(req)?;

    let existing = db::submissions::find_by_id(db, category, id)
        .await?
        .ok_or_else(|| AppError::NotFound("Build".to_string()))?;

    let now = Utc::now();
    let mut active: submission::ActiveModel = existing.into();
    active.status = Set(SubmissionStatus::Approved.as_str().to_string());
    active.is_deleted = Set(false);
    active.restored_by = Set(Some(actor.name.clone()));
    active.restored_by_role = Set(Some(actor.role.as_str().to_string()));
    active.restored_at = Set(Some(now));
    active.restored_reason = Set(Some(reason));
    active.rejection_reason = Set(None);
    active.suggestion = Set(None);
    active.updated_at = Set(now);

    db::submissions::update(db, active).await
}

/// Decide what a delete request may do, given who owns the row and its
/// status. Admins always purge; the owner soft-deletes approved content
/// and purges anything not yet approved.
pub fn check_delete(
    owner_id: i64,
    status: &str,
    req: &DeleteRequest,
) -> AppResult<DeleteOutcome> {
    let is_owner = req.contributor_id == Some(owner_id);
    let is_admin = req.user_role.is_some_and(|r| r.is_admin());

    if !is_owner && !is_admin {
        return Err(AppError::Forbidden(
            "Unauthorized to delete this build".to_string(),
        ));
    }

    if is_admin {
        Ok(DeleteOutcome::AdminPurged)
    } else if status != SubmissionStatus::Approved.as_str() {
        // Nothing worth restoring before approval
        Ok(DeleteOutcome::OwnerPurged)
    } else {
        Ok(DeleteOutcome::SoftDeleted)
    }
}

/// Delete a build. Admins delete permanently; the owning contributor soft-
/// deletes approved content (restorable) and hard-deletes anything not yet
/// approved.
pub async fn remove(
    db: &DatabaseConnection,
    category: Category,
    id: Uuid,
    req: &DeleteRequest,
) -> AppResult<DeleteOutcome> {
    let existing = db::submissions::find_by_id(db, category, id)
        .await?
        .ok_or_else(|| AppError::NotFound("Build".to_string()))?;

    let outcome = check_delete(existing.contributor_id, &existing.status, req)?;

    match outcome {
        DeleteOutcome::AdminPurged | DeleteOutcome::OwnerPurged => {
            db::submissions::delete_by_id(db, id).await?;
        }
        DeleteOutcome::SoftDeleted => {
            let now = Utc::now();
            let mut active: submission::ActiveModel = existing.into();
            active.is_deleted = Set(true);
            active.deleted_by = Set(req.contributor_name.clone());
            active.deleted_by_role = Set(Some(
                req.user_role.unwrap_or_default().as_str().to_string(),
            ));
            active.deleted_at = Set(Some(now));
            active.updated_at = Set(now);

            db::submissions::update(db, active).await?;
        }
    }

    Ok(outcome)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_tech_stack_dedupes_case_insensitively() {
        let tags = vec![
            "React".to_string(),
            "react".to_string(),
            "Vue".to_string(),
        ];
        assert_eq!(normalize_tech_stack(&tags), vec!["react", "vue"]);
    }

    #[test]
    fn test_normalize_tech_stack_trims_and_drops_blanks() {
        let tags = vec![
            "  Rust ".to_string(),
            "".to_string(),
            "   ".to_string(),
            "rust".to_string(),
        ];
        assert_eq!(normalize_tech_stack(&tags), vec!["rust"]);
    }

    #[test]
    fn test_core_urls_are_site_relative() {
        assert!(valid_url_for_category(Category::Core, "/chat-app"));
        assert!(valid_url_for_category(Category::Core, "/my_build"));
        assert!(!valid_url_for_category(Category::Core, "https://example.com"));
        assert!(!valid_url_for_category(Category::Core, "/"));
        assert!(!valid_url_for_category(Category::Core, "chat-app"));
    }

    #[test]
    fn test_community_urls_are_absolute_http() {
        assert!(valid_url_for_category(
            Category::Community,
            "https://github.com/a/b"
        ));
        assert!(valid_url_for_category(Category::Community, "http://x.dev"));
        assert!(!valid_url_for_category(Category::Community, "/chat-app"));
        assert!(!valid_url_for_category(Category::Community, "https://"));
    }

    #[test]
    fn test_validate_new_collects_all_missing_fields() {
        let data = NewSubmission {
            title: Some("Chat".to_string()),
            description: None,
            repo_url: None,
            live_url: Some("  ".to_string()),
            contributor_id: None,
            contributor_name: Some("aysha".to_string()),
            contributor_avatar_url: Some("https://a.png".to_string()),
            contributor_github_url: Some("https://github.com/aysha".to_string()),
            contributor_role: Some(UserRole::Contributor),
            tech_stack: vec![],
        };

        let err = validate_new(Category::Community, &data).unwrap_err();
        match err {
            AppError::Validation(messages) => {
                assert!(messages.contains(&"description is required".to_string()));
                assert!(messages.contains(&"repoUrl is required".to_string()));
                assert!(messages.contains(&"liveUrl is required".to_string()));
                assert!(messages.contains(&"contributorId is required".to_string()));
            }
            other => panic!("expected Validation, got {:?}", other),
        }
    }

    #[test]
    fn test_validate_new_rejects_oversized_stack() {
        let tags: Vec<String> = (0..9).map(|i| format!("tag{}", i)).collect();
        let data = NewSubmission {
            title: Some("t".to_string()),
            description: Some("d".to_string()),
            repo_url: Some("https://github.com/a/b".to_string()),
            live_url: Some("https://b.dev".to_string()),
            contributor_id: Some(1),
            contributor_name: Some("n".to_string()),
            contributor_avatar_url: Some("a".to_string()),
            contributor_github_url: Some("g".to_string()),
            contributor_role: Some(UserRole::Contributor),
            tech_stack: tags,
        };

        assert!(validate_new(Category::Community, &data).is_err());
    }

    #[test]
    fn test_check_review_rejected_requires_reason() {
        let req = ReviewRequest {
            status: "rejected".to_string(),
            rejection_reason: Some("   ".to_string()),
            suggestion: None,
        };
        assert!(matches!(
            check_review(&req),
            Err(AppError::InvalidInput(_))
        ));

        let req = ReviewRequest {
            status: "rejected".to_string(),
            rejection_reason: Some("too short".to_string()),
            suggestion: Some("stale suggestion".to_string()),
        };
        let (status, reason, suggestion) = check_review(&req).unwrap();
        assert_eq!(status, SubmissionStatus::Rejected);
        assert_eq!(reason.as_deref(), Some("too short"));
        // a rejection clears any prior suggestion
        assert_eq!(suggestion, None);
    }

    #[test]
    fn test_check_review_pending_requires_suggestion() {
        let req = ReviewRequest {
            status: "pending".to_string(),
            rejection_reason: None,
            suggestion: None,
        };
        assert!(matches!(
            check_review(&req),
            Err(AppError::InvalidInput(_))
        ));

        let req = ReviewRequest {
            status: "pending".to_string(),
            rejection_reason: None,
            suggestion: Some("add screenshots".to_string()),
        };
        let (status, reason, suggestion) = check_review(&req).unwrap();
        assert_eq!(status, SubmissionStatus::Pending);
        assert_eq!(reason, None);
        assert_eq!(suggestion.as_deref(), Some("add screenshots"));
    }

    #[test]
    fn test_check_review_approved_clears_both_annotations() {
        let req = ReviewRequest {
            status: "approved".to_string(),
            rejection_reason: Some("old".to_string()),
            suggestion: Some("old".to_string()),
        };
        let (status, reason, suggestion) = check_review(&req).unwrap();
        assert_eq!(status, SubmissionStatus::Approved);
        assert_eq!(reason, None);
        assert_eq!(suggestion, None);
    }

    #[test]
    fn test_check_review_invalid_status() {
        let req = ReviewRequest {
            status: "deleted".to_string(),
            rejection_reason: None,
            suggestion: None,
        };
        assert!(check_review(&req).is_err());
    }

    fn delete_request(contributor_id: Option<i64>, role: Option<UserRole>) -> DeleteRequest {
        DeleteRequest {
            contributor_id,
            contributor_name: Some("aysha".to_string()),
            user_role: role,
        }
    }

    #[test]
    fn test_admin_delete_is_always_permanent() {
        // Admin purges regardless of status or ownership
        let req = delete_request(Some(999), Some(UserRole::Admin));
        for status in ["pending", "approved", "rejected"] {
            assert_eq!(
                check_delete(4242, status, &req).unwrap(),
                DeleteOutcome::AdminPurged
            );
        }
    }

    #[test]
    fn test_owner_delete_of_approved_is_soft() {
        let req = delete_request(Some(4242), Some(UserRole::Contributor));
        assert_eq!(
            check_delete(4242, "approved", &req).unwrap(),
            DeleteOutcome::SoftDeleted
        );
    }

    #[test]
    fn test_owner_delete_of_unapproved_is_permanent() {
        let req = delete_request(Some(4242), Some(UserRole::Contributor));
        assert_eq!(
            check_delete(4242, "pending", &req).unwrap(),
            DeleteOutcome::OwnerPurged
        );
        assert_eq!(
            check_delete(4242, "rejected", &req).unwrap(),
            DeleteOutcome::OwnerPurged
        );
    }

    #[test]
    fn test_non_owner_non_admin_cannot_delete() {
        let req = delete_request(Some(7), Some(UserRole::Contributor));
        let err = check_delete(4242, "approved", &req).unwrap_err();
        assert!(matches!(err, AppError::Forbidden(_)));
        assert_eq!(err.to_string(), "Unauthorized to delete this build");

        // No identity at all is rejected too
        let req = delete_request(None, None);
        assert!(check_delete(4242, "pending", &req).is_err());
    }

    #[test]
    fn test_delete_messages_match_outcome() {
        assert_eq!(
            DeleteOutcome::AdminPurged.message(),
            "Build permanently deleted by admin"
        );
        assert_eq!(
            DeleteOutcome::SoftDeleted.message(),
            "Build deleted successfully"
        );
        assert_eq!(
            DeleteOutcome::OwnerPurged.message(),
            "Build deleted successfully"
        );
    }

    #[test]
    fn test_check_restore_requires_approved_and_reason() {
        let req = RestoreRequest {
            status: Some("pending".to_string()),
            restored_reason: Some("reason".to_string()),
        };
        assert!(check_restore(&req).is_err());

        let req = RestoreRequest {
            status: Some("approved".to_string()),
            restored_reason: Some("".to_string()),
        };
        assert!(check_restore(&req).is_err());

        let req = RestoreRequest {
            status: Some("approved".to_string()),
            restored_reason: Some(" deleted by mistake ".to_string()),
        };
        assert_eq!(check_restore(&req).unwrap(), "deleted by mistake");
    }
}
