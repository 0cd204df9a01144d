//! Repository layer.
//!
//! Each repository is a zero-sized struct providing async methods that accept
//! `&PgPool` as the first argument. Multi-statement writes open their own
//! transaction so a failure part-way leaves nothing behind.

pub mod api_key_repo;
pub mod prompt_repo;
pub mod user_repo;

pub use api_key_repo::ApiKeyRepo;
pub use prompt_repo::PromptRepo;
pub use user_repo::UserRepo;
