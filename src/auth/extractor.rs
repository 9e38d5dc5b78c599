//! Actix-web extractors for session-cookie authentication.
//!
//! Two flavors:
//! - [`SessionAuth`] rejects the request with 401 when no valid session
//!   cookie is present. Use it on endpoints that require login.
//! - [`MaybeSession`] never fails; listing endpoints use it to degrade to
//!   guest visibility for anonymous callers.

use actix_web::dev::Payload;
use actix_web::http::StatusCode;
use actix_web::{FromRequest, HttpRequest, HttpResponse, ResponseError, web};
use std::future::{Ready, ready};

use crate::config::Config;
use crate::error::ErrorResponse;
use crate::models::UserRole;
use crate::services::github_oauth::{self, ACCESS_COOKIE};
use crate::services::visibility::Viewer;

/// Identity taken from a verified session JWT.
#[derive(Debug, Clone)]
pub struct AuthenticatedUser {
    /// Internal user id (UUID string)
    pub user_id: String,
    /// GitHub numeric id, matches `contributor_id` on submissions
    pub github_id: i64,
    pub username: String,
    pub role: UserRole,
}

impl AuthenticatedUser {
    pub fn viewer(&self) -> Viewer {
        match self.role {
            UserRole::Admin => Viewer::Admin,
            UserRole::Contributor => Viewer::Contributor {
                github_id: self.github_id,
            },
        }
    }
}

/// Authentication error for extractors.
#[derive(Debug)]
pub struct AuthError {
    message: String,
}

impl std::fmt::Display for AuthError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl ResponseError for AuthError {
    fn error_response(&self) -> HttpResponse {
        HttpResponse::build(StatusCode::UNAUTHORIZED).json(ErrorResponse {
            error: "UNAUTHORIZED".to_string(),
            error_message: self.message.clone(),
        })
    }
}

fn user_from_request(req: &HttpRequest) -> Result<AuthenticatedUser, AuthError> {
    let config = req
        .app_data::<web::Data<Config>>()
        .ok_or_else(|| AuthError {
            message: "Internal configuration error".to_string(),
        })?;

    let token = req
        .cookie(ACCESS_COOKIE)
        .map(|c| c.value().to_string())
        .ok_or_else(|| AuthError {
            message: "Authentication required".to_string(),
        })?;

    let claims =
        github_oauth::verify_session_token(&token, &config.github_oauth.session_secret).map_err(
            |_| AuthError {
                message: "Invalid or expired session".to_string(),
            },
        )?;

    Ok(AuthenticatedUser {
        user_id: claims.user_id,
        github_id: claims.github_id,
        username: claims.username,
        role: claims.role,
    })
}

/// Extractor that requires a valid session cookie.
pub struct SessionAuth {
    pub user: AuthenticatedUser,
}

impl FromRequest for SessionAuth {
    type Error = AuthError;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _payload: &mut Payload) -> Self::Future {
        ready(user_from_request(req).map(|user| SessionAuth { user }))
    }
}

/// Extractor that yields the session user when present, `None` otherwise.
/// A malformed or expired token counts as anonymous rather than an error.
pub struct MaybeSession(pub Option<AuthenticatedUser>);

impl MaybeSession {
    /// Role-aware viewer for query composition; anonymous callers are guests.
    pub fn viewer(&self) -> Viewer {
        self.0.as_ref().map_or(Viewer::Guest, |u| u.viewer())
    }
}

impl FromRequest for MaybeSession {
    type Error = AuthError;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _payload: &mut Payload) -> Self::Future {
        ready(Ok(MaybeSession(user_from_request(req).ok())))
    }
}
