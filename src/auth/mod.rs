//! Session authentication for the HTTP API.

mod extractor;

pub use extractor::{AuthenticatedUser, MaybeSession, SessionAuth};
