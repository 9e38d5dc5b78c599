//! Business logic services.

pub mod favorites;
pub mod github_oauth;
pub mod lifecycle;
pub mod visibility;

pub use github_oauth::configure_routes as configure_auth_routes;
