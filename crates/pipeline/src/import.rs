//! Batched CSV ingestion.
//!
//! Each import replaces the previous recipient generation wholesale:
//! delete everything, create a fresh project, stream the source row by
//! row, and insert clients in fixed-size batches. The source is never
//! materialized in memory, so arbitrarily large recipient lists stay
//! cheap.

use std::io::Read;

use handover_core::types::DbId;
use handover_db::models::client::NewClient;
use handover_db::models::project::CreateProject;
use handover_db::repositories::{ClientRepo, ProjectRepo};
use handover_db::DbPool;
use serde::Serialize;
use thiserror::Error;

/// Sentinel for a row with no first-name value.
pub const NO_FIRST_NAME: &str = "NO NAME";

/// Sentinel for a row with no last-name value.
pub const NO_LAST_NAME: &str = "NO LAST NAME";

/// Rows accumulated before each batched insert.
pub const DEFAULT_BATCH_SIZE: usize = 100;

/// Column labels and batching for the CSV source.
///
/// Labels are configuration, not contract; they default to the upstream
/// list format (`UNID`, `NOME`, `COGNOME`).
#[derive(Debug, Clone)]
pub struct ImportConfig {
    /// Header label of the required identifier column.
    pub id_column: String,
    /// Header label of the optional first-name column.
    pub first_name_column: String,
    /// Header label of the optional last-name column.
    pub last_name_column: String,
    /// Rows per batched insert.
    pub batch_size: usize,
}

impl Default for ImportConfig {
    fn default() -> Self {
        Self {
            id_column: "UNID".to_string(),
            first_name_column: "NOME".to_string(),
            last_name_column: "COGNOME".to_string(),
            batch_size: DEFAULT_BATCH_SIZE,
        }
    }
}

/// Outcome of a completed import.
#[derive(Debug, Clone, Serialize)]
pub struct ImportReport {
    pub project_id: DbId,
    /// Rows that produced a client.
    pub imported: usize,
    /// Rows skipped for a blank identifier.
    pub skipped: usize,
}

/// Import failure taxonomy.
///
/// The previous generation is already deleted by the time any of these
/// occur, so the store is left with zero or a partial new generation.
/// Nothing is rolled back; the operator re-runs the import to recover.
#[derive(Debug, Error)]
pub enum ImportError {
    /// The header row is missing the required identifier column.
    #[error("malformed source: {0}")]
    MalformedSource(String),
    /// The source stream failed or a record could not be parsed.
    #[error("csv read failed: {0}")]
    Csv(#[from] csv::Error),
    /// The store rejected a write.
    #[error("store unavailable: {0}")]
    Store(#[from] sqlx::Error),
}

/// Stream `source` into a fresh generation of clients owned by a new
/// project named `label`.
///
/// Rows whose identifier field is blank are skipped and counted; missing
/// name values fall back to the sentinel defaults.
pub async fn import_as_new_generation<R: Read>(
    pool: &DbPool,
    source: R,
    label: &str,
    config: &ImportConfig,
) -> Result<ImportReport, ImportError> {
    handover_db::reset_generation(pool).await?;

    let project = ProjectRepo::create(
        pool,
        &CreateProject {
            name: label.to_string(),
        },
    )
    .await?;

    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(source);

    let headers = reader.headers()?.clone();
    let id_idx = find_column(&headers, &config.id_column).ok_or_else(|| {
        ImportError::MalformedSource(format!(
            "missing required column '{}'",
            config.id_column
        ))
    })?;
    let first_idx = find_column(&headers, &config.first_name_column);
    let last_idx = find_column(&headers, &config.last_name_column);

    let mut batch: Vec<NewClient> = Vec::with_capacity(config.batch_size);
    let mut imported = 0usize;
    let mut skipped = 0usize;

    for record in reader.records() {
        let record = record?;
        let code = record.get(id_idx).map(str::trim).unwrap_or("");
        if code.is_empty() {
            skipped += 1;
            continue;
        }

        batch.push(NewClient {
            code: code.to_string(),
            first_name: field_or(&record, first_idx, NO_FIRST_NAME),
            last_name: field_or(&record, last_idx, NO_LAST_NAME),
            project_id: project.id,
        });

        if batch.len() >= config.batch_size {
            ClientRepo::insert_batch(pool, &batch).await?;
            imported += batch.len();
            batch.clear();
        }
    }

    if !batch.is_empty() {
        ClientRepo::insert_batch(pool, &batch).await?;
        imported += batch.len();
    }

    tracing::info!(project_id = project.id, imported, skipped, "import completed");

    Ok(ImportReport {
        project_id: project.id,
        imported,
        skipped,
    })
}

fn find_column(headers: &csv::StringRecord, label: &str) -> Option<usize> {
    headers.iter().position(|header| header == label)
}

/// Value at `idx`, or `sentinel` when the column is absent or the value
/// is blank.
fn field_or(record: &csv::StringRecord, idx: Option<usize>, sentinel: &str) -> String {
    idx.and_then(|i| record.get(i))
        .map(str::trim)
        .filter(|value| !value.is_empty())
        .map(str::to_string)
        .unwrap_or_else(|| sentinel.to_string())
}
