//! Project entity model and DTOs.

use handover_core::types::{DbId, Timestamp};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// A row from the `projects` table: one import generation of recipients.
///
/// Created exactly once per successful import and never updated. The
/// previous project (and its clients) is deleted before a new one is
/// created.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Project {
    pub id: DbId,
    /// Label supplied at import time, typically the source file name.
    pub name: String,
    pub created_at: Timestamp,
}

/// DTO for creating a new project.
#[derive(Debug, Clone, Deserialize)]
pub struct CreateProject {
    pub name: String,
}
