//! Validation rules of the submission lifecycle.

use buildboard::error::AppError;
use buildboard::models::{
    Category, DeleteRequest, RestoreRequest, ReviewRequest, SubmissionStatus, UserRole,
};
use buildboard::services::lifecycle::{
    DeleteOutcome, check_delete, check_restore, check_review, normalize_tech_stack,
    valid_url_for_category,
};

#[test]
fn tech_stack_is_trimmed_lowercased_and_deduped() {
    let tags = vec![
        " React ".to_string(),
        "react".to_string(),
        "REACT".to_string(),
        "Vue".to_string(),
        "".to_string(),
    ];
    assert_eq!(normalize_tech_stack(&tags), vec!["react", "vue"]);
}

#[test]
fn core_builds_use_site_relative_paths() {
    assert!(valid_url_for_category(Category::Core, "/weather-widget"));
    assert!(!valid_url_for_category(Category::Core, "https://other.site/x"));
    assert!(!valid_url_for_category(Category::Core, "weather-widget"));
}

#[test]
fn community_builds_use_absolute_urls() {
    assert!(valid_url_for_category(
        Category::Community,
        "https://github.com/kim/weather"
    ));
    assert!(!valid_url_for_category(Category::Community, "/weather"));
}

#[test]
fn rejection_without_reason_is_rejected() {
    let req = ReviewRequest {
        status: "rejected".to_string(),
        rejection_reason: None,
        suggestion: None,
    };
    let err = check_review(&req).unwrap_err();
    assert!(matches!(err, AppError::InvalidInput(_)));
    assert_eq!(
        err.to_string(),
        "Rejection reason is required when status is rejected"
    );
}

#[test]
fn pending_verdict_requires_suggestion() {
    let req = ReviewRequest {
        status: "pending".to_string(),
        rejection_reason: None,
        suggestion: Some("  ".to_string()),
    };
    let err = check_review(&req).unwrap_err();
    assert_eq!(
        err.to_string(),
        "Suggestion message is required when status is pending"
    );
}

#[test]
fn verdict_stores_matching_annotation_only() {
    let req = ReviewRequest {
        status: "rejected".to_string(),
        rejection_reason: Some(" missing readme ".to_string()),
        suggestion: Some("stale".to_string()),
    };
    let (status, reason, suggestion) = check_review(&req).unwrap();
    assert_eq!(status, SubmissionStatus::Rejected);
    assert_eq!(reason.as_deref(), Some("missing readme"));
    assert_eq!(suggestion, None);
}

#[test]
fn unknown_verdict_is_invalid() {
    let req = ReviewRequest {
        status: "archived".to_string(),
        rejection_reason: None,
        suggestion: None,
    };
    let err = check_review(&req).unwrap_err();
    assert_eq!(err.to_string(), "Invalid status value");
}

#[test]
fn restore_only_lands_in_approved() {
    let req = RestoreRequest {
        status: Some("rejected".to_string()),
        restored_reason: Some("oops".to_string()),
    };
    let err = check_restore(&req).unwrap_err();
    assert_eq!(
        err.to_string(),
        "Only 'approved' status is allowed for restore"
    );

    let req = RestoreRequest {
        status: None,
        restored_reason: Some("oops".to_string()),
    };
    assert!(check_restore(&req).is_err());
}

#[test]
fn admin_delete_is_permanent_while_owner_delete_of_approved_recovers() {
    let owner = DeleteRequest {
        contributor_id: Some(4242),
        contributor_name: Some("kim".to_string()),
        user_role: Some(UserRole::Contributor),
    };
    let admin = DeleteRequest {
        contributor_id: None,
        contributor_name: Some("mod".to_string()),
        user_role: Some(UserRole::Admin),
    };

    // Admin deletion never leaves a restorable row
    assert_eq!(
        check_delete(4242, "approved", &admin).unwrap(),
        DeleteOutcome::AdminPurged
    );

    // The owner keeps a restorable copy only once the build was approved
    assert_eq!(
        check_delete(4242, "approved", &owner).unwrap(),
        DeleteOutcome::SoftDeleted
    );
    assert_eq!(
        check_delete(4242, "pending", &owner).unwrap(),
        DeleteOutcome::OwnerPurged
    );

    // Anyone else is turned away
    let stranger = DeleteRequest {
        contributor_id: Some(7),
        contributor_name: None,
        user_role: Some(UserRole::Contributor),
    };
    let err = check_delete(4242, "approved", &stranger).unwrap_err();
    assert!(matches!(err, AppError::Forbidden(_)));
}

#[test]
fn restore_requires_reason() {
    let req = RestoreRequest {
        status: Some("approved".to_string()),
        restored_reason: None,
    };
    let err = check_restore(&req).unwrap_err();
    assert_eq!(err.to_string(), "Restored reason is required");
}
