//! API endpoint modules.

pub mod builds;
pub mod health;
pub mod openapi;

pub use builds::configure_routes as configure_build_routes;
pub use health::configure_health_routes;
pub use openapi::ApiDoc;
