//! Compute provider command handlers.

use anyhow::Result;
use clap::Subcommand;

use retort_core::ApiClient;
use retort_core::api::providers;

use crate::output::{self, OutputFormat, print_table_header, print_table_row};

/// Provider subcommands.
#[derive(Subcommand)]
pub enum ProviderCommands {
    /// List registered compute providers
    List,
}

/// Handle provider subcommands.
pub async fn handle_provider_command(
    client: &ApiClient,
    cmd: ProviderCommands,
    format: OutputFormat,
) -> Result<()> {
    match cmd {
        ProviderCommands::List => list_providers(client, format).await,
    }
}

async fn list_providers(client: &ApiClient, format: OutputFormat) -> Result<()> {
    let providers = providers::list(client).await?;

    if format == OutputFormat::Json {
        return output::print_json(&providers);
    }

    if providers.is_empty() {
        println!("No compute providers registered.");
        println!("Remote tasks need at least one provider.");
        return Ok(());
    }

    print_table_header(&[("ID", 24), ("NAME", 24), ("TYPE", 12), ("STATUS", 10)]);

    for provider in &providers {
        print_table_row(&[
            (&provider.id, 24),
            (provider.display_name(), 24),
            (provider.provider_type.as_deref().unwrap_or("-"), 12),
            (provider.status.as_deref().unwrap_or("-"), 10),
        ]);
    }

    Ok(())
}
