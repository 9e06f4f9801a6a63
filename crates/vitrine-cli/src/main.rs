//! Vitrine CLI: manage a product's image gallery from the command line.
//!
//! Configuration comes from `VITRINE_*` environment variables (a `.env` file is
//! honored). Results are printed as JSON on stdout; logs go to stderr.

use anyhow::Context;
use clap::{Parser, Subcommand};
use serde::Serialize;
use std::path::PathBuf;
use std::sync::Arc;

use vitrine_api_client::ApiClient;
use vitrine_cli::{init_tracing, read_source_file, report};
use vitrine_core::models::OwnerId;
use vitrine_core::{Config, ErrorMetadata};
use vitrine_gallery::{ImageManager, ManagerSettings, UploadScheduler};

#[derive(Parser)]
#[command(name = "vitrine", about = "Product image gallery CLI")]
struct Cli {
    /// Product whose gallery is managed
    #[arg(long, short)]
    product: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List the stored images in gallery order
    List,
    /// Upload images and append them to the gallery
    Upload {
        /// Image files (jpg, jpeg, png, webp)
        #[arg(required = true)]
        files: Vec<PathBuf>,
    },
    /// Move the image at one position to another and save the new order
    Reorder {
        /// Current zero-based position
        from: usize,
        /// New zero-based position
        to: usize,
    },
    /// Remove an image and its stored files
    Remove {
        /// Image record id
        record_id: String,
    },
}

fn print_json(value: &impl Serialize) -> anyhow::Result<()> {
    let out = serde_json::to_string_pretty(value).context("Serialize output")?;
    println!("{}", out);
    Ok(())
}

async fn build_manager(config: &Config, product: String) -> anyhow::Result<ImageManager> {
    let client = ApiClient::from_config(config).context("Failed to create API client")?;
    let store = vitrine_api_client::create_store(config, &client)
        .await
        .context("Failed to create storage backend")?;
    let scheduler = Arc::new(UploadScheduler::new(config.max_concurrent_uploads));

    Ok(ImageManager::new(
        OwnerId::new(product),
        Arc::new(client),
        store,
        scheduler,
        ManagerSettings::from_config(config),
    ))
}

/// Attach the suggested action to a pipeline error before it reaches the user.
fn explain(err: vitrine_core::PipelineError) -> anyhow::Error {
    match err.suggested_action() {
        Some(action) => anyhow::anyhow!("{} ({}). {}", err, err.error_code(), action),
        None => anyhow::anyhow!("{} ({})", err, err.error_code()),
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_tracing();

    let config = Config::from_env().context("Failed to load configuration")?;
    config.validate().context("Invalid configuration")?;

    let cli = Cli::parse();
    let manager = build_manager(&config, cli.product).await?;
    manager.load_from_gateway().await.map_err(explain)?;

    match cli.command {
        Commands::List => {
            print_json(&manager.processed_images().await)?;
        }
        Commands::Upload { files } => {
            let mut selected = Vec::with_capacity(files.len());
            for path in &files {
                selected.push(read_source_file(path).await?);
            }

            let added = manager.add_files(selected).await;
            for rejected in &added.rejected {
                tracing::warn!(file = %rejected.file_name, reason = %rejected.reason, "Skipped file");
            }

            let summary = manager.upload_all().await;
            tracing::info!(
                succeeded = summary.succeeded,
                failed = summary.failed,
                "Upload finished"
            );

            let uploaded: Vec<_> = manager
                .snapshot()
                .await
                .into_iter()
                .filter(|entry| added.added.contains(&entry.id))
                .collect();
            print_json(&report(&uploaded))?;

            if summary.failed > 0 {
                anyhow::bail!("{} of {} uploads failed", summary.failed, summary.attempted);
            }
        }
        Commands::Reorder { from, to } => {
            manager.reorder(from, to).await.map_err(explain)?;
            let saved = manager.save_orders().await.map_err(explain)?;
            tracing::info!(saved, "Gallery order saved");
            print_json(&manager.processed_images().await)?;
        }
        Commands::Remove { record_id } => {
            let entry = manager
                .snapshot()
                .await
                .into_iter()
                .find(|entry| entry.remote_id.as_ref().map(|id| id.as_str()) == Some(record_id.as_str()))
                .with_context(|| format!("No image {} in this gallery", record_id))?;

            manager.remove_entry(entry.id).await.map_err(explain)?;
            print_json(&serde_json::json!({ "success": true, "removed": record_id }))?;
        }
    }

    Ok(())
}
