//! Repository layer.
//!
//! Each repository is a zero-sized struct providing async methods that
//! accept `&DbPool` as the first argument. Store failures surface as
//! `sqlx::Error` and are never retried or swallowed here.

pub mod client_repo;
pub mod project_repo;

pub use client_repo::ClientRepo;
pub use project_repo::ProjectRepo;
