//! Domain model structs and DTOs.
//!
//! Each submodule contains the `FromRow` entity structs matching database
//! rows plus the `Deserialize` inputs accepted from the HTTP layer.

pub mod api_key;
pub mod prompt;
pub mod user;
