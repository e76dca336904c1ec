//! Domain model structs and DTOs.
//!
//! Each submodule contains a `FromRow` + `Serialize` entity struct
//! matching the database row and the `Deserialize` DTOs used to create
//! rows.

pub mod client;
pub mod project;
