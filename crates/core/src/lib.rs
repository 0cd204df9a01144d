//! Domain building blocks shared by the repository and HTTP layers.
//!
//! Nothing in here touches the database or the network, so everything is
//! unit-testable in isolation.

pub mod api_keys;
pub mod error;
pub mod hashing;
pub mod prompts;
pub mod types;
pub mod users;
