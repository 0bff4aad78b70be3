//! Gallery command handlers.

use anyhow::Result;
use clap::Subcommand;

use retort_core::ApiClient;
use retort_core::api::gallery;

use crate::output::{self, OutputFormat, print_success, print_table_header, print_table_row};

/// Gallery subcommands.
#[derive(Subcommand)]
pub enum GalleryCommands {
    /// List published task templates
    List,

    /// Import a template into the workspace
    Import {
        /// Gallery entry ID
        id: String,
    },

    /// Export a workspace entry to the gallery
    Export {
        /// Entry ID
        id: String,
    },
}

/// Handle gallery subcommands.
pub async fn handle_gallery_command(
    client: &ApiClient,
    cmd: GalleryCommands,
    format: OutputFormat,
) -> Result<()> {
    match cmd {
        GalleryCommands::List => list_entries(client, format).await,
        GalleryCommands::Import { id } => import_entry(client, &id, format).await,
        GalleryCommands::Export { id } => export_entry(client, &id, format).await,
    }
}

async fn list_entries(client: &ApiClient, format: OutputFormat) -> Result<()> {
    let entries = gallery::list(client).await?;

    if format == OutputFormat::Json {
        return output::print_json(&entries);
    }

    if entries.is_empty() {
        println!("The gallery is empty.");
        return Ok(());
    }

    print_table_header(&[("ID", 24), ("NAME", 28), ("AUTHOR", 16), ("VERSION", 8)]);

    for entry in entries {
        print_table_row(&[
            (&entry.id, 24),
            (entry.name.as_deref().unwrap_or("-"), 28),
            (entry.author.as_deref().unwrap_or("-"), 16),
            (entry.version.as_deref().unwrap_or("-"), 8),
        ]);
    }

    Ok(())
}

async fn import_entry(client: &ApiClient, id: &str, format: OutputFormat) -> Result<()> {
    let result = gallery::import(client, id).await?;

    if format == OutputFormat::Json {
        return output::print_json(&result);
    }

    print_success(&format!("Imported gallery entry {}.", id));
    Ok(())
}

async fn export_entry(client: &ApiClient, id: &str, format: OutputFormat) -> Result<()> {
    let result = gallery::export(client, id).await?;

    if format == OutputFormat::Json {
        return output::print_json(&result);
    }

    print_success(&format!("Exported entry {} to the gallery.", id));
    Ok(())
}
