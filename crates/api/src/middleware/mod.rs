//! Request extractors shared by handlers.
//!
//! - [`auth::AuthUser`] -- the authenticated staff member behind a Bearer token.

pub mod auth;
