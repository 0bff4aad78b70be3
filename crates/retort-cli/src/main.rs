use std::process::ExitCode;

use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use retort_core::{ApiClient, CredentialStore, RetortError};

mod commands;
mod config;
mod output;

use commands::{
    config::ConfigCommands, experiment::ExperimentCommands, gallery::GalleryCommands,
    job::JobCommands, provider::ProviderCommands, task::TaskCommands,
};
use output::OutputFormat;

#[derive(Parser)]
#[command(name = "retort")]
#[command(about = "CLI for the Retort ML lab", long_about = None)]
#[command(version = retort_core::VERSION)]
struct Cli {
    /// Output format
    #[arg(long, global = true, value_enum, default_value = "pretty")]
    format: OutputFormat,

    /// Deployment target: local or cloud
    #[arg(long, env = "RETORT_TARGET", global = true)]
    target: Option<String>,

    /// Server URL (overrides the configured target URL)
    #[arg(long, env = "RETORT_API_URL", global = true)]
    server: Option<String>,

    /// API key (overrides stored credentials)
    #[arg(long, env = "RETORT_API_KEY", global = true, hide_env_values = true)]
    api_key: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Log in and store credentials
    Login {
        /// Email address for password login
        #[arg(long)]
        email: Option<String>,
    },

    /// Remove stored credentials
    Logout,

    /// Show the authenticated user
    Whoami,

    /// Task management
    #[command(subcommand)]
    Task(TaskCommands),

    /// Job management
    #[command(subcommand)]
    Job(JobCommands),

    /// Experiment management
    #[command(subcommand)]
    Experiment(ExperimentCommands),

    /// Compute provider management
    #[command(subcommand)]
    Provider(ProviderCommands),

    /// Task template gallery
    #[command(subcommand)]
    Gallery(GalleryCommands),

    /// Manage CLI configuration
    #[command(subcommand)]
    Config(ConfigCommands),
}

#[tokio::main]
async fn main() -> ExitCode {
    // Load .env file if present (doesn't override existing env vars)
    let _ = dotenvy::dotenv();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "warn".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();

    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            output::print_error(&err.to_string());
            if let Some(detail) = err.downcast_ref::<RetortError>().and_then(|e| e.detail()) {
                eprintln!("  {}", detail);
            }
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli) -> Result<()> {
    let format = cli.format;

    // Config commands only touch local files, handle separately
    if let Commands::Config(cmd) = cli.command {
        return commands::config::handle_config_command(cmd, format);
    }

    let resolved = config::resolve(cli.target.as_deref(), cli.server.as_deref())?;

    let store = CredentialStore::new(&resolved.config_dir, resolved.target);
    let client = ApiClient::new(resolved.base_url.clone(), store)?
        .with_token_override(cli.api_key.clone());

    match cli.command {
        Commands::Login { email } => {
            commands::auth::login(
                &client,
                &resolved,
                email.as_deref(),
                cli.api_key.as_deref(),
                format,
            )
            .await
        }
        Commands::Logout => commands::auth::logout(&client, format),
        Commands::Whoami => commands::auth::whoami(&client, format).await,
        Commands::Task(cmd) => commands::task::handle_task_command(&client, cmd, format).await,
        Commands::Job(cmd) => commands::job::handle_job_command(&client, cmd, format).await,
        Commands::Experiment(cmd) => {
            commands::experiment::handle_experiment_command(&client, cmd, format).await
        }
        Commands::Provider(cmd) => {
            commands::provider::handle_provider_command(&client, cmd, format).await
        }
        Commands::Gallery(cmd) => {
            commands::gallery::handle_gallery_command(&client, cmd, format).await
        }
        Commands::Config(_) => unreachable!(), // Handled above
    }
}
