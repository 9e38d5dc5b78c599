//! Buildboard server library.
//!
//! Backend for the community build showcase: GitHub-authenticated
//! contributors submit builds, admins review them, and visitors browse
//! the approved gallery.

pub mod api;
pub mod auth;
pub mod config;
pub mod db;
pub mod entity;
pub mod error;
pub mod middleware;
pub mod migration;
pub mod models;
pub mod services;
