//! Maintenance CLI for a configured gallery deployment.
//!
//! Exercises the service surface directly: upload, list, search, delete,
//! and account purge. Owner identity is passed explicitly; in production it
//! comes from the auth layer in front of the service.

use anyhow::{Context, Result};
use bytes::Bytes;
use clap::{Parser, Subcommand};
use galerie_core::models::{OwnerScope, SearchOutcome};
use galerie_core::Config;
use galerie_services::{Gallery, UploadItem};
use std::path::{Path, PathBuf};
use uuid::Uuid;

#[derive(Parser, Debug)]
#[command(name = "galerie")]
#[command(about = "Owner-scoped image gallery with semantic caption search")]
struct Args {
    /// Owner identity (UUID) all operations are scoped to
    #[arg(long, value_name = "UUID", global = true)]
    owner: Option<Uuid>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Upload one or more images (≤50 per invocation)
    Upload {
        /// Image files (jpeg, png, or webp)
        #[arg(required = true)]
        files: Vec<PathBuf>,
    },
    /// List the owner's gallery
    List {
        /// Output format: json or table
        #[arg(long, default_value = "table")]
        format: String,
    },
    /// Search the owner's gallery by caption
    Search {
        /// Caption text to search with
        caption: String,
    },
    /// Delete one record by id
    Delete {
        /// Record id
        #[arg(long, value_name = "UUID")]
        id: Uuid,
    },
    /// Delete every record and blob of the owner
    Purge,
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let args = Args::parse();
    let owner = OwnerScope(args.owner.context("--owner <UUID> is required")?);

    let config = Config::from_env()?;
    let gallery = Gallery::connect(config)
        .await
        .map_err(|e| anyhow::anyhow!(e.detailed_message()))?;

    let result = run(&gallery, owner, args.command).await;

    gallery.shutdown().await;
    result
}

async fn run(gallery: &Gallery, owner: OwnerScope, command: Command) -> Result<()> {
    match command {
        Command::Upload { files } => {
            let mut items = Vec::with_capacity(files.len());
            for file in &files {
                let data = tokio::fs::read(file)
                    .await
                    .with_context(|| format!("Failed to read {}", file.display()))?;
                items.push(UploadItem::new(Bytes::from(data), content_type_of(file)?));
            }

            let summary = gallery
                .upload_batch(owner, items)
                .await
                .map_err(|e| anyhow::anyhow!(e.client_message()))?;

            println!(
                "Uploaded {} of {} images",
                summary.uploaded_count(),
                summary.uploaded_count() + summary.failed_count()
            );
            for uploaded in &summary.uploaded {
                println!("  {}  {}", uploaded.id, uploaded.locator);
            }
            for failure in &summary.failed {
                eprintln!("  item {} failed: {}", failure.index, failure.error);
            }
        }
        Command::List { format } => {
            let listing = gallery
                .list(owner)
                .await
                .map_err(|e| anyhow::anyhow!(e.client_message()))?;

            if format == "json" {
                println!("{}", serde_json::to_string_pretty(&listing)?);
            } else {
                println!("{} image(s)", listing.count);
                for entry in &listing.items {
                    println!("  {}  {}", entry.id, entry.locator);
                }
            }
        }
        Command::Search { caption } => {
            let outcome = gallery
                .search(owner, &caption)
                .await
                .map_err(|e| anyhow::anyhow!(e.client_message()))?;

            match outcome {
                SearchOutcome::NoCandidates => println!("No images found for this owner."),
                SearchOutcome::Ranked(hits) => {
                    for hit in hits {
                        println!("  {:.4}  {}  {}", hit.similarity, hit.id, hit.locator);
                    }
                }
            }
        }
        Command::Delete { id } => {
            gallery
                .delete(owner, id)
                .await
                .map_err(|e| anyhow::anyhow!(e.client_message()))?;
            println!("Image deleted successfully");
        }
        Command::Purge => {
            let report = gallery
                .purge_owner(owner)
                .await
                .map_err(|e| anyhow::anyhow!(e.client_message()))?;
            println!(
                "Purged {} record(s); {} blob(s) deleted, {} blob cleanup failure(s)",
                report.records_deleted, report.blobs_deleted, report.blob_failures
            );
        }
    }

    Ok(())
}

fn content_type_of(path: &Path) -> Result<&'static str> {
    match path
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_lowercase())
        .as_deref()
    {
        Some("jpg") | Some("jpeg") => Ok("image/jpeg"),
        Some("png") => Ok("image/png"),
        Some("webp") => Ok("image/webp"),
        other => Err(anyhow::anyhow!(
            "Unsupported file extension {:?}; only jpeg, png, and webp are accepted",
            other
        )),
    }
}
