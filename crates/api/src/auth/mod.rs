//! Authentication primitives.
//!
//! - [`password`] -- Argon2id password hashing and verification.
//! - [`jwt`] -- session-token issuance and validation.
//! - [`access`] -- resolves a request's credentials into an [`access::AccessContext`].

pub mod access;
pub mod jwt;
pub mod password;
