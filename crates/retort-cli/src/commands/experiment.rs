//! Experiment command handlers.

use anyhow::Result;
use clap::Subcommand;

use retort_core::ApiClient;
use retort_core::api::experiments;

use crate::output::{self, OutputFormat, format_timestamp, print_table_header, print_table_row};

/// Experiment subcommands.
#[derive(Subcommand)]
pub enum ExperimentCommands {
    /// List all experiments
    List,
}

/// Handle experiment subcommands.
pub async fn handle_experiment_command(
    client: &ApiClient,
    cmd: ExperimentCommands,
    format: OutputFormat,
) -> Result<()> {
    match cmd {
        ExperimentCommands::List => list_experiments(client, format).await,
    }
}

async fn list_experiments(client: &ApiClient, format: OutputFormat) -> Result<()> {
    let experiments = experiments::list(client).await?;

    if format == OutputFormat::Json {
        return output::print_json(&experiments);
    }

    if experiments.is_empty() {
        println!("No experiments found.");
        return Ok(());
    }

    print_table_header(&[("ID", 24), ("NAME", 32), ("CREATED", 19)]);

    for experiment in experiments {
        print_table_row(&[
            (&experiment.id, 24),
            (experiment.name.as_deref().unwrap_or("-"), 32),
            (&format_timestamp(experiment.created_at), 19),
        ]);
    }

    Ok(())
}
