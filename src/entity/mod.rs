//! SeaORM entity definitions for PostgreSQL database.

pub mod favorite;
pub mod refresh_token;
pub mod submission;
pub mod user;
