//! OpenAPI documentation configuration.

use utoipa::OpenApi;

use crate::{api, error, models};

/// OpenAPI documentation.
#[derive(OpenApi)]
#[openapi(
    info(
        title = "Buildboard Server",
        version = "0.3.0",
        description = "Backend for the community build showcase: contributors submit builds via GitHub login, admins review them, visitors browse the approved gallery"
    ),
    servers(
        (url = "/", description = "Local server")
    ),
    paths(
        // Health endpoints
        api::health::health,
        api::health::ready,
        // Build endpoints
        api::builds::list_builds,
        api::builds::add_build,
        api::builds::update_build,
        api::builds::delete_build,
        api::builds::review_build,
        api::builds::restore_build,
        api::builds::toggle_favorite,
    ),
    components(
        schemas(
            // Common
            error::ErrorResponse,
            // Health
            api::health::HealthResponse,
            api::health::ReadyResponse,
            // Builds
            models::Category,
            models::SubmissionStatus,
            models::NewSubmission,
            models::UpdateSubmission,
            models::ReviewRequest,
            models::RestoreRequest,
            models::DeleteRequest,
            models::SubmissionResponse,
            models::SubmissionEnvelope,
            models::MessageResponse,
            models::ToggleFavoriteResponse,
            // Auth
            models::UserRole,
            models::UserResponse,
        )
    ),
    tags(
        (name = "Health", description = "Health check endpoints"),
        (name = "Builds", description = "Build submission, review, and favorites"),
        (name = "Auth", description = "GitHub OAuth login and session management")
    ),
    modifiers(&SecurityAddon)
)]
pub struct ApiDoc;

/// Add session cookie security scheme.
struct SecurityAddon;

impl utoipa::Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "session_cookie",
                utoipa::openapi::security::SecurityScheme::ApiKey(
                    utoipa::openapi::security::ApiKey::Cookie(
                        utoipa::openapi::security::ApiKeyValue::new("bb_session"),
                    ),
                ),
            );
        }
    }
}
