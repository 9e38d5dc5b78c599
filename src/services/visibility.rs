//! Role-aware query composition for build listings.
//!
//! Produces a SeaORM `Condition` from the caller's role and the optional
//! free-text filters. Pure: no database access happens here.
//!
//! Visibility rules:
//! - admin: every status; soft-deleted rows only when explicitly requested
//! - contributor: approved builds plus their own pending/rejected ones
//! - guest: approved builds only

use sea_orm::Condition;
use sea_orm::prelude::Expr;
use sea_orm::ColumnTrait;

use crate::entity::submission;
use crate::models::SubmissionStatus;

/// Who is asking. Derived from the verified session, never from the request
/// body or query string.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Viewer {
    Admin,
    Contributor { github_id: i64 },
    Guest,
}

/// Optional list filters, all ANDed with the role clause.
#[derive(Debug, Clone, Default)]
pub struct ListFilters {
    /// Case-insensitive title substring
    pub title: Option<String>,
    /// Case-insensitive tech-stack tag substring
    pub tech_stack: Option<String>,
    /// Case-insensitive contributor name substring
    pub contributor_name: Option<String>,
    /// Exact contributor id
    pub contributor_id: Option<i64>,
    /// Status-inclusion set
    pub statuses: Option<Vec<SubmissionStatus>>,
    /// Include soft-deleted rows (admin only)
    pub include_deleted: bool,
}

/// Compose the visibility filter for a listing request.
pub fn compose(viewer: Viewer, filters: &ListFilters) -> Condition {
    use sea_orm::sea_query::extension::postgres::PgExpr;

    let mut cond = Condition::all();

    match viewer {
        Viewer::Admin => {
            if !filters.include_deleted {
                cond = cond.add(submission::Column::IsDeleted.eq(false));
            }
        }
        Viewer::Contributor { github_id } => {
            cond = cond.add(submission::Column::IsDeleted.eq(false));
            cond = cond.add(
                Condition::any()
                    .add(submission::Column::Status.eq(SubmissionStatus::Approved.as_str()))
                    .add(
                        Condition::all()
                            .add(submission::Column::Status.is_in([
                                SubmissionStatus::Pending.as_str(),
                                SubmissionStatus::Rejected.as_str(),
                            ]))
                            .add(submission::Column::ContributorId.eq(github_id)),
                    ),
            );
        }
        Viewer::Guest => {
            cond = cond.add(submission::Column::IsDeleted.eq(false));
            cond = cond.add(submission::Column::Status.eq(SubmissionStatus::Approved.as_str()));
        }
    }

    // Status-inclusion set intersects the role clause, so it can only narrow
    // what a non-admin is already allowed to see.
    if let Some(ref statuses) = filters.statuses {
        cond = cond.add(
            submission::Column::Status.is_in(statuses.iter().map(|s| s.as_str())),
        );
    }

    if let Some(ref title) = filters.title {
        cond = cond.add(Expr::col(submission::Column::Title).ilike(format!("%{}%", title)));
    }

    // tech_stack is a JSONB array; match the substring against its text form
    if let Some(ref tag) = filters.tech_stack {
        cond = cond.add(Expr::cust_with_values(
            "tech_stack::text ILIKE $1",
            [format!("%{}%", tag)],
        ));
    }

    if let Some(ref name) = filters.contributor_name {
        cond = cond.add(
            Expr::col(submission::Column::ContributorName).ilike(format!("%{}%", name)),
        );
    }

    if let Some(contributor_id) = filters.contributor_id {
        cond = cond.add(submission::Column::ContributorId.eq(contributor_id));
    }

    cond
}

#[cfg(test)]
mod tests {
    use super::*;
    use sea_orm::{DatabaseBackend, EntityTrait, QueryFilter, QueryTrait};

    fn to_sql(cond: Condition) -> String {
        submission::Entity::find()
            .filter(cond)
            .build(DatabaseBackend::Postgres)
            .to_string()
    }

    #[test]
    fn test_guest_sees_only_approved_non_deleted() {
        let sql = to_sql(compose(Viewer::Guest, &ListFilters::default()));
        assert!(sql.contains(r#""is_deleted" = FALSE"#));
        assert!(sql.contains(r#""status" = 'approved'"#));
        assert!(!sql.contains("pending"));
        assert!(!sql.contains("rejected"));
    }

    #[test]
    fn test_contributor_sees_approved_or_own_private() {
        let sql = to_sql(compose(
            Viewer::Contributor { github_id: 4242 },
            &ListFilters::default(),
        ));
        assert!(sql.contains(r#""is_deleted" = FALSE"#));
        assert!(sql.contains(r#""status" = 'approved' OR"#));
        assert!(sql.contains(r#""status" IN ('pending', 'rejected')"#));
        assert!(sql.contains(r#""contributor_id" = 4242"#));
    }

    #[test]
    fn test_admin_sees_all_statuses_excluding_deleted_by_default() {
        let sql = to_sql(compose(Viewer::Admin, &ListFilters::default()));
        assert!(sql.contains(r#""is_deleted" = FALSE"#));
        assert!(!sql.contains("status"));
    }

    #[test]
    fn test_admin_include_deleted_drops_soft_delete_clause() {
        let filters = ListFilters {
            include_deleted: true,
            ..Default::default()
        };
        let sql = to_sql(compose(Viewer::Admin, &filters));
        assert!(!sql.contains("is_deleted"));
    }

    #[test]
    fn test_free_text_filters_are_anded_ilike() {
        let filters = ListFilters {
            title: Some("chat".to_string()),
            tech_stack: Some("React".to_string()),
            contributor_name: Some("aysha".to_string()),
            ..Default::default()
        };
        let sql = to_sql(compose(Viewer::Guest, &filters));
        assert!(sql.contains(r#""title" ILIKE '%chat%'"#));
        assert!(sql.contains("tech_stack::text ILIKE"));
        assert!(sql.contains(r#""contributor_name" ILIKE '%aysha%'"#));
        // role clause still present
        assert!(sql.contains(r#""status" = 'approved'"#));
    }

    #[test]
    fn test_status_set_intersects_role_clause_for_contributor() {
        let filters = ListFilters {
            statuses: Some(vec![SubmissionStatus::Pending]),
            ..Default::default()
        };
        let sql = to_sql(compose(Viewer::Contributor { github_id: 7 }, &filters));
        // The status-inclusion set narrows, never widens: both clauses remain.
        assert!(sql.contains(r#""status" = 'approved' OR"#));
        assert!(sql.contains(r#""status" IN ('pending')"#));
    }

    #[test]
    fn test_contributor_id_filter_is_plain_equality() {
        let filters = ListFilters {
            contributor_id: Some(99),
            ..Default::default()
        };
        let sql = to_sql(compose(Viewer::Guest, &filters));
        assert!(sql.contains(r#""contributor_id" = 99"#));
        assert!(sql.contains(r#""status" = 'approved'"#));
    }
}
