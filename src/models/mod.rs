//! Domain models for Buildboard.

pub mod favorite;
pub mod submission;
pub mod user;

// Re-export commonly used types
pub use favorite::ToggleFavoriteResponse;
pub use submission::{
    Category, DeleteRequest, ListQuery, MessageResponse, NewSubmission, RestoreRequest,
    ReviewRequest, SubmissionEnvelope, SubmissionResponse, SubmissionStatus, UpdateSubmission,
    MAX_TECH_STACK,
};
pub use user::{GitHubUserInfo, SessionClaims, User, UserResponse, UserRole};
