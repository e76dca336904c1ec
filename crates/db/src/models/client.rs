//! Client entity model and DTOs.

use handover_core::types::{DbId, Timestamp};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// A row from the `clients` table: one pre-registered recipient.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Client {
    pub id: DbId,
    /// Normalized scannable code, unique within the active generation.
    pub code: String,
    pub first_name: String,
    pub last_name: String,
    pub delivered: bool,
    /// Set when `delivered` transitions false → true; null otherwise.
    pub delivered_at: Option<Timestamp>,
    pub delivery_note: Option<String>,
    pub project_id: DbId,
}

impl Client {
    /// Display name, first name then last name.
    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
    }
}

/// DTO for inserting a client during import. Delivery state always
/// starts out pending.
#[derive(Debug, Clone, Deserialize)]
pub struct NewClient {
    pub code: String,
    pub first_name: String,
    pub last_name: String,
    pub project_id: DbId,
}
