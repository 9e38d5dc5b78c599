//! Build showcase endpoints: listing, submission, review workflow, and
//! favorites.
//!
//! Every endpoint takes a `type` query parameter selecting the showcase
//! category ("core" or "community"); an unknown value is rejected before
//! anything else happens.

use actix_web::{HttpResponse, delete, get, post, put, web};
use uuid::Uuid;

use crate::auth::{MaybeSession, SessionAuth};
use crate::db::{self, DbPool};
use crate::error::{AppError, AppResult};
use crate::models::{
    Category, DeleteRequest, ListQuery, MessageResponse, NewSubmission, RestoreRequest,
    ReviewRequest, SubmissionEnvelope, SubmissionResponse, ToggleFavoriteResponse,
    UpdateSubmission,
};
use crate::services::{favorites, lifecycle, visibility};

/// Category selector, shared by every endpoint in this module.
#[derive(Debug, serde::Deserialize, utoipa::IntoParams)]
pub struct TypeQuery {
    /// Showcase category: "core" or "community"
    #[serde(rename = "type")]
    pub build_type: Option<String>,
}

fn parse_category(raw: Option<&str>) -> AppResult<Category> {
    raw.and_then(Category::parse)
        .ok_or_else(|| AppError::InvalidInput("Invalid build type".to_string()))
}

/// Configure build routes.
pub fn configure_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(list_builds)
        .service(add_build)
        .service(update_build)
        .service(delete_build)
        .service(review_build)
        .service(restore_build)
        .service(toggle_favorite);
}

/// List builds visible to the caller.
///
/// Visibility depends on the session: admins see everything, contributors
/// see approved builds plus their own, anonymous callers see approved only.
///
/// GET /api/v1/builds/get?type=...
#[utoipa::path(
    get,
    path = "/api/v1/builds/get",
    tag = "Builds",
    params(
        ("type" = String, Query, description = "Showcase category (core or community)"),
        ("title" = Option<String>, Query, description = "Title substring filter"),
        ("techStack" = Option<String>, Query, description = "Tech-stack tag filter"),
        ("contributorName" = Option<String>, Query, description = "Contributor name filter"),
        ("contributorId" = Option<i64>, Query, description = "Exact contributor id filter"),
        ("approved" = Option<bool>, Query, description = "Include approved builds"),
        ("pending" = Option<bool>, Query, description = "Include pending builds"),
        ("rejected" = Option<bool>, Query, description = "Include rejected builds"),
        ("favorite" = Option<bool>, Query, description = "Only the caller's favorites"),
        ("includeDeleted" = Option<bool>, Query, description = "Admin only: include soft-deleted builds"),
    ),
    responses(
        (status = 200, description = "Builds visible to the caller", body = Vec<SubmissionResponse>),
        (status = 400, description = "Invalid build type", body = crate::error::ErrorResponse)
    )
)]
#[get("/builds/get")]
pub async fn list_builds(
    query: web::Query<ListQuery>,
    session: MaybeSession,
    pool: web::Data<DbPool>,
) -> AppResult<HttpResponse> {
    let category = parse_category(query.category.as_deref())?;
    let viewer = session.viewer();

    let filters = visibility::ListFilters {
        title: query.title.clone(),
        tech_stack: query.tech_stack.clone(),
        contributor_name: query.contributor_name.clone(),
        contributor_id: query.contributor_id,
        statuses: query.statuses(),
        include_deleted: viewer == visibility::Viewer::Admin
            && query.include_deleted == Some(true),
    };
    let cond = visibility::compose(viewer, &filters);

    // The favorites narrowing needs a logged-in caller
    let favorite_ids = if query.favorite == Some(true) {
        let user = session.0.as_ref().ok_or_else(|| {
            AppError::Unauthorized("Authentication required".to_string())
        })?;
        let user_id = Uuid::parse_str(&user.user_id)?;
        Some(db::favorites::submission_ids_for_user(pool.connection(), user_id, category).await?)
    } else {
        None
    };

    let rows = db::submissions::list(pool.connection(), category, cond, favorite_ids).await?;
    let builds: Vec<SubmissionResponse> = rows.into_iter().map(Into::into).collect();

    Ok(HttpResponse::Ok().json(builds))
}

/// Submit a new build for review.
///
/// POST /api/v1/builds/add?type=...
#[utoipa::path(
    post,
    path = "/api/v1/builds/add",
    tag = "Builds",
    params(("type" = String, Query, description = "Showcase category (core or community)")),
    request_body = NewSubmission,
    responses(
        (status = 201, description = "Build submitted", body = SubmissionEnvelope),
        (status = 400, description = "Validation failed", body = crate::error::ErrorResponse)
    )
)]
#[post("/builds/add")]
pub async fn add_build(
    query: web::Query<TypeQuery>,
    body: web::Json<NewSubmission>,
    pool: web::Data<DbPool>,
) -> AppResult<HttpResponse> {
    let category = parse_category(query.build_type.as_deref())?;

    let model = lifecycle::submit(pool.connection(), category, body.into_inner()).await?;

    Ok(HttpResponse::Created().json(SubmissionEnvelope {
        message: "Build submitted successfully".to_string(),
        build: model.into(),
    }))
}

/// Update a build. Owner only; the build returns to pending review.
///
/// PUT /api/v1/builds/update/{id}?type=...
#[utoipa::path(
    put,
    path = "/api/v1/builds/update/{id}",
    tag = "Builds",
    params(
        ("id" = Uuid, Path, description = "Build id"),
        ("type" = String, Query, description = "Showcase category (core or community)")
    ),
    request_body = UpdateSubmission,
    responses(
        (status = 200, description = "Build updated", body = SubmissionEnvelope),
        (status = 403, description = "Not the owner", body = crate::error::ErrorResponse),
        (status = 404, description = "Build not found", body = crate::error::ErrorResponse)
    )
)]
#[put("/builds/update/{id}")]
pub async fn update_build(
    path: web::Path<Uuid>,
    query: web::Query<TypeQuery>,
    body: web::Json<UpdateSubmission>,
    pool: web::Data<DbPool>,
) -> AppResult<HttpResponse> {
    let category = parse_category(query.build_type.as_deref())?;
    let id = path.into_inner();

    let model = lifecycle::edit(pool.connection(), category, id, body.into_inner()).await?;

    Ok(HttpResponse::Ok().json(SubmissionEnvelope {
        message: "Build updated successfully".to_string(),
        build: model.into(),
    }))
}

/// Delete a build. Admins delete permanently; owners soft-delete approved
/// builds and hard-delete unapproved ones.
///
/// DELETE /api/v1/builds/delete/{id}?type=...
#[utoipa::path(
    delete,
    path = "/api/v1/builds/delete/{id}",
    tag = "Builds",
    params(
        ("id" = Uuid, Path, description = "Build id"),
        ("type" = String, Query, description = "Showcase category (core or community)")
    ),
    request_body = DeleteRequest,
    responses(
        (status = 200, description = "Build deleted", body = MessageResponse),
        (status = 403, description = "Not the owner or an admin", body = crate::error::ErrorResponse),
        (status = 404, description = "Build not found", body = crate::error::ErrorResponse)
    )
)]
#[delete("/builds/delete/{id}")]
pub async fn delete_build(
    path: web::Path<Uuid>,
    query: web::Query<TypeQuery>,
    body: web::Json<DeleteRequest>,
    pool: web::Data<DbPool>,
) -> AppResult<HttpResponse> {
    let category = parse_category(query.build_type.as_deref())?;
    let id = path.into_inner();

    let outcome = lifecycle::remove(pool.connection(), category, id, &body).await?;

    Ok(HttpResponse::Ok().json(MessageResponse {
        message: outcome.message().to_string(),
    }))
}

/// Review a build: approve, reject (with reason), or send back to pending
/// (with a suggestion). Admin session required.
///
/// PUT /api/v1/builds/review/{id}?type=...
#[utoipa::path(
    put,
    path = "/api/v1/builds/review/{id}",
    tag = "Builds",
    params(
        ("id" = Uuid, Path, description = "Build id"),
        ("type" = String, Query, description = "Showcase category (core or community)")
    ),
    request_body = ReviewRequest,
    responses(
        (status = 200, description = "Build reviewed", body = SubmissionEnvelope),
        (status = 400, description = "Invalid verdict", body = crate::error::ErrorResponse),
        (status = 401, description = "Not logged in", body = crate::error::ErrorResponse),
        (status = 403, description = "Not an admin", body = crate::error::ErrorResponse),
        (status = 404, description = "Build not found", body = crate::error::ErrorResponse)
    )
)]
#[put("/builds/review/{id}")]
pub async fn review_build(
    path: web::Path<Uuid>,
    query: web::Query<TypeQuery>,
    body: web::Json<ReviewRequest>,
    auth: SessionAuth,
    pool: web::Data<DbPool>,
) -> AppResult<HttpResponse> {
    let category = parse_category(query.build_type.as_deref())?;
    let id = path.into_inner();

    let actor = lifecycle::Actor {
        name: auth.user.username.clone(),
        role: auth.user.role,
    };
    let model = lifecycle::review(pool.connection(), category, id, &actor, &body).await?;

    Ok(HttpResponse::Ok().json(SubmissionEnvelope {
        message: "Build reviewed successfully".to_string(),
        build: model.into(),
    }))
}

/// Restore a soft-deleted build back to approved. Admin session required.
///
/// PUT /api/v1/builds/restore/{id}?type=...
#[utoipa::path(
    put,
    path = "/api/v1/builds/restore/{id}",
    tag = "Builds",
    params(
        ("id" = Uuid, Path, description = "Build id"),
        ("type" = String, Query, description = "Showcase category (core or community)")
    ),
    request_body = RestoreRequest,
    responses(
        (status = 200, description = "Build restored", body = SubmissionEnvelope),
        (status = 400, description = "Invalid restore request", body = crate::error::ErrorResponse),
        (status = 401, description = "Not logged in", body = crate::error::ErrorResponse),
        (status = 403, description = "Not an admin", body = crate::error::ErrorResponse),
        (status = 404, description = "Build not found", body = crate::error::ErrorResponse)
    )
)]
#[put("/builds/restore/{id}")]
pub async fn restore_build(
    path: web::Path<Uuid>,
    query: web::Query<TypeQuery>,
    body: web::Json<RestoreRequest>,
    auth: SessionAuth,
    pool: web::Data<DbPool>,
) -> AppResult<HttpResponse> {
    let category = parse_category(query.build_type.as_deref())?;
    let id = path.into_inner();

    let actor = lifecycle::Actor {
        name: auth.user.username.clone(),
        role: auth.user.role,
    };
    let model = lifecycle::restore(pool.connection(), category, id, &actor, &body).await?;

    Ok(HttpResponse::Ok().json(SubmissionEnvelope {
        message: "Build restored successfully".to_string(),
        build: model.into(),
    }))
}

/// Toggle a favorite on a build for the logged-in user.
///
/// POST /api/v1/builds/favorites/{build_id}?type=...
#[utoipa::path(
    post,
    path = "/api/v1/builds/favorites/{build_id}",
    tag = "Builds",
    params(
        ("build_id" = Uuid, Path, description = "Build id"),
        ("type" = String, Query, description = "Showcase category (core or community)")
    ),
    responses(
        (status = 200, description = "Favorite toggled", body = ToggleFavoriteResponse),
        (status = 401, description = "Not logged in", body = crate::error::ErrorResponse)
    )
)]
#[post("/builds/favorites/{build_id}")]
pub async fn toggle_favorite(
    path: web::Path<Uuid>,
    query: web::Query<TypeQuery>,
    auth: SessionAuth,
    pool: web::Data<DbPool>,
) -> AppResult<HttpResponse> {
    let category = parse_category(query.build_type.as_deref())?;
    let build_id = path.into_inner();
    let user_id = Uuid::parse_str(&auth.user.user_id)?;

    let is_favorited = favorites::toggle(pool.connection(), user_id, build_id, category).await?;

    let message = if is_favorited {
        "Build added to favorites"
    } else {
        "Build removed from favorites"
    };

    Ok(HttpResponse::Ok().json(ToggleFavoriteResponse {
        message: message.to_string(),
        is_favorited,
    }))
}
