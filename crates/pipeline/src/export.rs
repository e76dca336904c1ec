//! Serializes the current client list back to delimiter-separated text.

use handover_db::repositories::ClientRepo;
use handover_db::DbPool;
use thiserror::Error;

/// Fixed output header, fields in stable order.
pub const EXPORT_HEADER: [&str; 6] = [
    "code",
    "first_name",
    "last_name",
    "delivered",
    "delivered_at",
    "delivery_note",
];

#[derive(Debug, Error)]
pub enum ExportError {
    /// The store holds no clients. Reported, not fatal: the caller
    /// decides how to surface it.
    #[error("nothing to export")]
    NothingToExport,
    /// The store rejected the read.
    #[error("store unavailable: {0}")]
    Store(#[from] sqlx::Error),
    /// Serialization failed.
    #[error("csv write failed: {0}")]
    Csv(#[from] csv::Error),
    /// The output buffer could not be flushed.
    #[error("write failed: {0}")]
    Io(#[from] std::io::Error),
}

/// Export every client as CSV text (UTF-8, RFC 3339 timestamps, one row
/// per client in snapshot order).
pub async fn export_all(pool: &DbPool) -> Result<String, ExportError> {
    let clients = ClientRepo::list_all(pool).await?;
    if clients.is_empty() {
        return Err(ExportError::NothingToExport);
    }

    let mut writer = csv::Writer::from_writer(Vec::new());
    writer.write_record(EXPORT_HEADER)?;
    for client in &clients {
        let delivered_at = client
            .delivered_at
            .map(|at| at.to_rfc3339())
            .unwrap_or_default();
        writer.write_record([
            client.code.as_str(),
            client.first_name.as_str(),
            client.last_name.as_str(),
            if client.delivered { "true" } else { "false" },
            delivered_at.as_str(),
            client.delivery_note.as_deref().unwrap_or(""),
        ])?;
    }

    let bytes = writer
        .into_inner()
        .map_err(|err| ExportError::Io(err.into_error()))?;

    tracing::debug!(rows = clients.len(), "export completed");
    Ok(String::from_utf8_lossy(&bytes).into_owned())
}
