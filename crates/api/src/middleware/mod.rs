//! Authentication extractors.
//!
//! - [`auth::AuthUser`] -- requires a valid session token.
//! - [`auth::ReadAccess`] -- accepts a session token or an API key.

pub mod auth;
