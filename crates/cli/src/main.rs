//! Operator command-line surface for the handover delivery tracker.
//!
//! The binary owns the store lifecycle (open at start, close at exit)
//! and drives the pipelines:
//!
//! - `import <file> [label]` — replace the recipient generation from a
//!   CSV file; the label defaults to the file name.
//! - `export [path]`         — write the client list as CSV to a file,
//!   or stdout when no path is given.
//! - `list [query]`          — print the snapshot, optionally narrowed.
//! - `deliver <code> [note]` — manually resolve one code.
//! - `scan`                  — live loop: read decoded codes from stdin
//!   (USB scanners present as keyboards) through the scan mailbox.

use std::env;
use std::fs::File;
use std::io::BufRead;
use std::path::Path;
use std::sync::Arc;

use anyhow::{bail, Context, Result};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use handover_db::repositories::ClientRepo;
use handover_db::{create_pool, init_schema, DbPool};
use handover_events::bus::EventBus;
use handover_events::scan::{scan_channel, ScanEvent, DEFAULT_SCAN_CAPACITY};
use handover_pipeline::export::{export_all, ExportError};
use handover_pipeline::import::{import_as_new_generation, ImportConfig};
use handover_pipeline::resolver::{DeliveryResolver, Outcome};
use handover_pipeline::search::filter_clients;

const DEFAULT_DATABASE_URL: &str = "sqlite://handover.db";

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let database_url =
        env::var("DATABASE_URL").unwrap_or_else(|_| DEFAULT_DATABASE_URL.to_string());
    let pool = create_pool(&database_url)
        .await
        .with_context(|| format!("opening store at {database_url}"))?;
    init_schema(&pool).await.context("initializing schema")?;

    let mut args = env::args().skip(1);
    let command = args.next().unwrap_or_else(|| "help".to_string());
    let rest: Vec<String> = args.collect();

    let result = match command.as_str() {
        "import" => cmd_import(&pool, &rest).await,
        "export" => cmd_export(&pool, &rest).await,
        "list" => cmd_list(&pool, &rest).await,
        "deliver" => cmd_deliver(&pool, &rest).await,
        "scan" => cmd_scan(&pool).await,
        "help" | "--help" | "-h" => {
            print_usage();
            Ok(())
        }
        other => {
            print_usage();
            Err(anyhow::anyhow!("unknown command '{other}'"))
        }
    };

    pool.close().await;
    result
}

fn print_usage() {
    eprintln!("usage: handover <command>");
    eprintln!();
    eprintln!("  import <file> [label]    replace the recipient list from a CSV file");
    eprintln!("  export [path]            write the client list as CSV (stdout if no path)");
    eprintln!("  list [query]             print the client list, optionally filtered");
    eprintln!("  deliver <code> [note]    manually confirm one delivery");
    eprintln!("  scan                     resolve codes read line-by-line from stdin");
}

async fn cmd_import(pool: &DbPool, args: &[String]) -> Result<()> {
    let Some(path) = args.first() else {
        bail!("import requires a file path");
    };
    let label = args.get(1).cloned().unwrap_or_else(|| {
        Path::new(path)
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_else(|| path.clone())
    });

    let file = File::open(path).with_context(|| format!("opening {path}"))?;
    let report = import_as_new_generation(pool, file, &label, &ImportConfig::default())
        .await
        .context("import failed")?;

    println!(
        "imported {} clients into project '{}' ({} rows skipped)",
        report.imported, label, report.skipped
    );
    Ok(())
}

async fn cmd_export(pool: &DbPool, args: &[String]) -> Result<()> {
    match export_all(pool).await {
        Ok(csv) => {
            if let Some(path) = args.first() {
                std::fs::write(path, &csv).with_context(|| format!("writing {path}"))?;
                println!("exported to {path}");
            } else {
                print!("{csv}");
            }
            Ok(())
        }
        // Reported, not fatal.
        Err(ExportError::NothingToExport) => {
            println!("nothing to export");
            Ok(())
        }
        Err(err) => Err(err.into()),
    }
}

async fn cmd_list(pool: &DbPool, args: &[String]) -> Result<()> {
    let query = args.first().map(String::as_str).unwrap_or("");
    let snapshot = ClientRepo::list_all(pool).await?;
    let clients = filter_clients(&snapshot, query);

    for client in &clients {
        let status = match client.delivered_at {
            Some(at) => format!("delivered {}", at.format("%Y-%m-%d %H:%M")),
            None => "pending".to_string(),
        };
        println!("{}  {}  [{}]", client.code, client.full_name(), status);
    }
    println!("{} of {} clients", clients.len(), snapshot.len());
    Ok(())
}

async fn cmd_deliver(pool: &DbPool, args: &[String]) -> Result<()> {
    let Some(code) = args.first() else {
        bail!("deliver requires a code");
    };
    let note = if args.len() > 1 {
        Some(args[1..].join(" "))
    } else {
        None
    };

    let bus = Arc::new(EventBus::default());
    let resolver = DeliveryResolver::new(pool.clone(), bus);
    report_outcome(resolver.resolve(code, note.as_deref()).await?);
    Ok(())
}

async fn cmd_scan(pool: &DbPool) -> Result<()> {
    let bus = Arc::new(EventBus::default());
    let resolver = DeliveryResolver::new(pool.clone(), bus);
    let (tx, rx) = scan_channel(DEFAULT_SCAN_CAPACITY);

    // Stdin is the detection collaborator: one decoded payload per line.
    // Dropping the sender on EOF ends the resolver loop.
    let reader = std::thread::spawn(move || {
        for line in std::io::stdin().lock().lines() {
            let Ok(line) = line else { break };
            if !tx.offer(ScanEvent::new(vec![line])) {
                tracing::warn!("mailbox full, detection dropped");
            }
        }
    });

    println!("scan codes (one per line, Ctrl-D to finish):");
    resolver.run(rx).await.context("scan loop failed")?;
    let _ = reader.join();
    Ok(())
}

fn report_outcome(outcome: Outcome) {
    match outcome {
        Outcome::Confirmed(client) => {
            println!("delivered: {} ({})", client.full_name(), client.code);
        }
        Outcome::Rejected(reason) => {
            println!("rejected: {reason}");
        }
        Outcome::Dropped => {
            println!("busy: another resolution is in flight");
        }
    }
}
