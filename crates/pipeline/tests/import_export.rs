//! Integration tests for the import and export pipelines.
//!
//! Exercises the full path against an in-memory store:
//! - Generation replacement (delete-then-insert) semantics
//! - Blank-identifier skipping and sentinel name defaults
//! - Header validation and the accepted partial-failure state
//! - Batch flushing on large sources
//! - Export round-trip and the nothing-to-export condition

use assert_matches::assert_matches;
use chrono::{TimeZone, Utc};
use handover_db::repositories::{ClientRepo, ProjectRepo};
use handover_db::{create_pool, init_schema, DbPool};
use handover_pipeline::export::{export_all, ExportError};
use handover_pipeline::import::{
    import_as_new_generation, ImportConfig, ImportError, NO_FIRST_NAME, NO_LAST_NAME,
};

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

async fn memory_pool() -> DbPool {
    let pool = create_pool("sqlite::memory:")
        .await
        .expect("open in-memory store");
    init_schema(&pool).await.expect("create schema");
    pool
}

async fn import(pool: &DbPool, csv: &str, label: &str) -> Result<handover_pipeline::ImportReport, ImportError> {
    import_as_new_generation(pool, csv.as_bytes(), label, &ImportConfig::default()).await
}

// ---------------------------------------------------------------------------
// Import
// ---------------------------------------------------------------------------

#[tokio::test]
async fn import_skips_rows_with_blank_identifier() {
    let pool = memory_pool().await;
    let source = "UNID,NOME,COGNOME\n\
                  UNID001,Ana,Silva\n\
                  ,Maria,Santos\n\
                  UNID003,Rui,Costa\n";

    let report = import(&pool, source, "turno-3.csv").await.unwrap();
    assert_eq!(report.imported, 2);
    assert_eq!(report.skipped, 1);

    let clients = ClientRepo::list_all(&pool).await.unwrap();
    let codes: Vec<&str> = clients.iter().map(|c| c.code.as_str()).collect();
    assert_eq!(codes, ["UNID001", "UNID003"]);

    let project = ProjectRepo::find_by_id(&pool, report.project_id)
        .await
        .unwrap()
        .expect("project should exist");
    assert_eq!(project.name, "turno-3.csv");
    assert!(clients.iter().all(|c| c.project_id == project.id));
}

#[tokio::test]
async fn imported_clients_start_pending() {
    let pool = memory_pool().await;
    import(&pool, "UNID,NOME,COGNOME\nUNID001,Ana,Silva\n", "a.csv")
        .await
        .unwrap();

    let client = ClientRepo::find_by_code(&pool, "UNID001")
        .await
        .unwrap()
        .unwrap();
    assert!(!client.delivered);
    assert!(client.delivered_at.is_none());
    assert!(client.delivery_note.is_none());
}

#[tokio::test]
async fn missing_name_fields_fall_back_to_sentinels() {
    let pool = memory_pool().await;
    let source = "UNID,NOME,COGNOME\n\
                  UNID010,,\n\
                  UNID011,Rui\n";

    import(&pool, source, "a.csv").await.unwrap();

    let blank_names = ClientRepo::find_by_code(&pool, "UNID010")
        .await
        .unwrap()
        .unwrap();
    assert_eq!(blank_names.first_name, NO_FIRST_NAME);
    assert_eq!(blank_names.last_name, NO_LAST_NAME);

    // Short row: the last-name column is simply absent.
    let short_row = ClientRepo::find_by_code(&pool, "UNID011")
        .await
        .unwrap()
        .unwrap();
    assert_eq!(short_row.first_name, "Rui");
    assert_eq!(short_row.last_name, NO_LAST_NAME);
}

#[tokio::test]
async fn identifier_field_is_trimmed() {
    let pool = memory_pool().await;
    import(&pool, "UNID,NOME,COGNOME\n  UNID001  ,Ana,Silva\n", "a.csv")
        .await
        .unwrap();

    assert!(ClientRepo::find_by_code(&pool, "UNID001")
        .await
        .unwrap()
        .is_some());
}

#[tokio::test]
async fn reimport_replaces_previous_generation() {
    let pool = memory_pool().await;
    import(
        &pool,
        "UNID,NOME,COGNOME\nUNID001,Ana,Silva\nUNID002,Rui,Costa\n",
        "first.csv",
    )
    .await
    .unwrap();

    let report = import(&pool, "UNID,NOME,COGNOME\nUNID100,Marta,Nunes\n", "second.csv")
        .await
        .unwrap();

    let projects = ProjectRepo::list(&pool).await.unwrap();
    assert_eq!(projects.len(), 1);
    assert_eq!(projects[0].name, "second.csv");
    assert_eq!(projects[0].id, report.project_id);

    let clients = ClientRepo::list_all(&pool).await.unwrap();
    assert_eq!(clients.len(), 1);
    assert_eq!(clients[0].code, "UNID100");
    assert_eq!(clients[0].project_id, report.project_id);
}

#[tokio::test]
async fn missing_identifier_column_is_malformed_source() {
    let pool = memory_pool().await;
    import(
        &pool,
        "UNID,NOME,COGNOME\nUNID001,Ana,Silva\n",
        "first.csv",
    )
    .await
    .unwrap();

    let result = import(&pool, "ID,NAME\n1,Ana\n", "broken.csv").await;
    assert_matches!(result, Err(ImportError::MalformedSource(_)));

    // The previous generation is already gone: the store is left with the
    // fresh (empty) generation, not rolled back.
    assert!(ClientRepo::list_all(&pool).await.unwrap().is_empty());
    let projects = ProjectRepo::list(&pool).await.unwrap();
    assert_eq!(projects.len(), 1);
    assert_eq!(projects[0].name, "broken.csv");
}

#[tokio::test]
async fn custom_column_labels() {
    let pool = memory_pool().await;
    let config = ImportConfig {
        id_column: "badge".to_string(),
        first_name_column: "first".to_string(),
        last_name_column: "last".to_string(),
        ..ImportConfig::default()
    };

    let report = import_as_new_generation(
        &pool,
        "badge,first,last\nUNID001,Ana,Silva\n".as_bytes(),
        "custom.csv",
        &config,
    )
    .await
    .unwrap();
    assert_eq!(report.imported, 1);
}

#[tokio::test]
async fn large_source_flushes_in_batches() {
    let pool = memory_pool().await;
    let mut source = String::from("UNID,NOME,COGNOME\n");
    for i in 0..125 {
        source.push_str(&format!("UNID{i:05},First{i},Last{i}\n"));
    }
    let config = ImportConfig {
        batch_size: 50,
        ..ImportConfig::default()
    };

    let report = import_as_new_generation(&pool, source.as_bytes(), "big.csv", &config)
        .await
        .unwrap();
    assert_eq!(report.imported, 125);
    assert_eq!(ClientRepo::list_all(&pool).await.unwrap().len(), 125);
}

// ---------------------------------------------------------------------------
// Export
// ---------------------------------------------------------------------------

#[tokio::test]
async fn export_empty_store_reports_nothing_to_export() {
    let pool = memory_pool().await;
    assert_matches!(export_all(&pool).await, Err(ExportError::NothingToExport));
}

#[tokio::test]
async fn export_round_trips_codes_and_delivered_flags() {
    let pool = memory_pool().await;
    import(
        &pool,
        "UNID,NOME,COGNOME\nUNID001,Ana,Silva\nUNID003,Rui,Costa\n",
        "a.csv",
    )
    .await
    .unwrap();

    let ana = ClientRepo::find_by_code(&pool, "UNID001")
        .await
        .unwrap()
        .unwrap();
    let confirmed_at = Utc.timestamp_opt(100, 0).unwrap();
    ClientRepo::mark_delivered(&pool, ana.id, Some("left at door"), confirmed_at)
        .await
        .unwrap()
        .expect("should confirm");

    let output = export_all(&pool).await.unwrap();
    let lines: Vec<&str> = output.lines().collect();
    assert_eq!(
        lines[0],
        "code,first_name,last_name,delivered,delivered_at,delivery_note"
    );
    assert_eq!(lines.len(), 3);
    assert_eq!(
        lines[1],
        format!("UNID001,Ana,Silva,true,{},left at door", confirmed_at.to_rfc3339())
    );
    assert_eq!(lines[2], "UNID003,Rui,Costa,false,,");
}
