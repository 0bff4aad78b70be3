//! Job command handlers.

use std::io::Write;
use std::path::PathBuf;

use anyhow::{Context, Result, anyhow};
use clap::Subcommand;
use futures_util::StreamExt;
use indicatif::{ProgressBar, ProgressStyle};
use tokio::io::AsyncWriteExt;

use retort_core::ApiClient;
use retort_core::api::jobs;
use retort_core::models::{Job, JobArtifact};

use crate::output::{
    self, OutputFormat, format_size, format_timestamp, print_key_value, print_success,
    print_table_header, print_table_row,
};

/// Job subcommands.
#[derive(Subcommand)]
pub enum JobCommands {
    /// List jobs across all experiments
    List {
        /// Limit to one experiment
        #[arg(long)]
        experiment: Option<String>,
    },

    /// Show job details
    Show {
        /// Job ID
        id: String,
    },

    /// Print job logs
    Logs {
        /// Job ID
        id: String,

        /// Stream new output as it arrives
        #[arg(long, short = 'f')]
        follow: bool,
    },

    /// List job artifacts
    Artifacts {
        /// Job ID
        id: String,
    },

    /// Download a job artifact
    Download {
        /// Job ID
        id: String,

        /// Artifact ID
        artifact: String,

        /// Output file or directory (defaults to the artifact name)
        #[arg(long)]
        output: Option<PathBuf>,
    },

    /// Stop a running job
    Stop {
        /// Job ID
        id: String,
    },

    /// Delete a job
    Remove {
        /// Job ID
        id: String,
    },
}

/// Handle job subcommands.
pub async fn handle_job_command(
    client: &ApiClient,
    cmd: JobCommands,
    format: OutputFormat,
) -> Result<()> {
    match cmd {
        JobCommands::List { experiment } => list_jobs(client, experiment.as_deref(), format).await,
        JobCommands::Show { id } => show_job(client, &id, format).await,
        JobCommands::Logs { id, follow } => {
            if follow {
                follow_logs(client, &id).await
            } else {
                print_logs(client, &id).await
            }
        }
        JobCommands::Artifacts { id } => list_artifacts(client, &id, format).await,
        JobCommands::Download {
            id,
            artifact,
            output,
        } => download_artifact(client, &id, &artifact, output).await,
        JobCommands::Stop { id } => stop_job(client, &id).await,
        JobCommands::Remove { id } => remove_job(client, &id).await,
    }
}

async fn list_jobs(
    client: &ApiClient,
    experiment: Option<&str>,
    format: OutputFormat,
) -> Result<()> {
    let jobs = match experiment {
        Some(experiment_id) => jobs::list(client, experiment_id).await?,
        None => jobs::list_all(client).await?,
    };

    if format == OutputFormat::Json {
        return output::print_json(&jobs);
    }

    if jobs.is_empty() {
        println!("No jobs found.");
        return Ok(());
    }

    print_table_header(&[
        ("ID", 24),
        ("EXPERIMENT", 16),
        ("STATUS", 10),
        ("PROGRESS", 8),
        ("CREATED", 19),
    ]);

    for job in jobs {
        print_table_row(&[
            (&job.id, 24),
            (job.experiment_id.as_deref().unwrap_or("-"), 16),
            (job.status.as_deref().unwrap_or("-"), 10),
            (&format_progress(job.progress), 8),
            (&format_timestamp(job.created_at), 19),
        ]);
    }

    Ok(())
}

fn format_progress(progress: Option<f64>) -> String {
    match progress {
        Some(value) => format!("{:.0}%", value),
        None => "-".to_string(),
    }
}

async fn show_job(client: &ApiClient, id: &str, format: OutputFormat) -> Result<()> {
    let job = jobs::get(client, id).await?;

    if format == OutputFormat::Json {
        return output::print_json(&job);
    }

    print_job(&job);
    Ok(())
}

async fn print_logs(client: &ApiClient, id: &str) -> Result<()> {
    let logs = jobs::logs(client, id).await?;
    print!("{}", logs);
    if !logs.ends_with('\n') {
        println!();
    }
    Ok(())
}

/// Streams job output to stdout until the server closes the connection.
async fn follow_logs(client: &ApiClient, id: &str) -> Result<()> {
    let response = jobs::stream(client, id).await?;
    let mut body = response.bytes_stream();

    let mut stdout = std::io::stdout();
    while let Some(chunk) = body.next().await {
        let chunk = chunk.context("Log stream interrupted")?;
        stdout.write_all(&chunk)?;
        stdout.flush()?;
    }

    Ok(())
}

async fn list_artifacts(client: &ApiClient, id: &str, format: OutputFormat) -> Result<()> {
    let artifacts = jobs::artifacts(client, id).await?;

    if format == OutputFormat::Json {
        return output::print_json(&artifacts);
    }

    if artifacts.is_empty() {
        println!("No artifacts found for job {}.", id);
        return Ok(());
    }

    print_table_header(&[("ID", 24), ("NAME", 30), ("SIZE", 10), ("CREATED", 19)]);

    for artifact in artifacts {
        let size = artifact
            .size_bytes
            .map(format_size)
            .unwrap_or_else(|| "-".to_string());
        print_table_row(&[
            (&artifact.id, 24),
            (artifact.display_name(), 30),
            (&size, 10),
            (&format_timestamp(artifact.created_at), 19),
        ]);
    }

    Ok(())
}

async fn download_artifact(
    client: &ApiClient,
    job_id: &str,
    artifact_id: &str,
    output: Option<PathBuf>,
) -> Result<()> {
    // Metadata first, for the default filename and the expected size
    let artifacts = jobs::artifacts(client, job_id).await?;
    let artifact = artifacts
        .iter()
        .find(|a| a.id == artifact_id)
        .ok_or_else(|| anyhow!("Artifact {} not found in job {}", artifact_id, job_id))?;

    let output_path = resolve_output_path(output, artifact);

    let response = jobs::download_artifact(client, job_id, artifact_id).await?;
    let total = response
        .content_length()
        .or_else(|| artifact.size_bytes.and_then(|size| u64::try_from(size).ok()));

    let bar = progress_bar(total, artifact.display_name());

    let mut file = tokio::fs::File::create(&output_path)
        .await
        .with_context(|| format!("Failed to create {}", output_path.display()))?;

    let mut body = response.bytes_stream();
    while let Some(chunk) = body.next().await {
        let chunk = chunk.context("Download interrupted")?;
        file.write_all(&chunk)
            .await
            .with_context(|| format!("Failed to write {}", output_path.display()))?;
        bar.inc(chunk.len() as u64);
    }
    file.flush().await?;
    bar.finish_and_clear();

    print_success(&format!(
        "Downloaded {} to {}",
        artifact.display_name(),
        output_path.display()
    ));
    Ok(())
}

fn resolve_output_path(output: Option<PathBuf>, artifact: &JobArtifact) -> PathBuf {
    match output {
        Some(path) if path.is_dir() => path.join(artifact.display_name()),
        Some(path) => path,
        None => PathBuf::from(artifact.display_name()),
    }
}

fn progress_bar(total: Option<u64>, name: &str) -> ProgressBar {
    match total {
        Some(total) => {
            let bar = ProgressBar::new(total);
            bar.set_style(
                ProgressStyle::default_bar()
                    .template("{msg} {bar:40.cyan/blue} {bytes}/{total_bytes} ({bytes_per_sec})")
                    .unwrap(),
            );
            bar.set_message(name.to_string());
            bar
        }
        None => {
            let bar = ProgressBar::new_spinner();
            bar.set_message(format!("Downloading {}...", name));
            bar
        }
    }
}

async fn stop_job(client: &ApiClient, id: &str) -> Result<()> {
    jobs::stop(client, id).await?;
    print_success(&format!("Stop requested for job {}.", id));
    Ok(())
}

async fn remove_job(client: &ApiClient, id: &str) -> Result<()> {
    jobs::delete(client, id).await?;
    println!("Job {} removed.", id);
    Ok(())
}

fn print_job(job: &Job) {
    print_key_value("ID", &job.id);
    print_key_value("Status", job.status.as_deref().unwrap_or("-"));
    print_key_value("Type", job.job_type.as_deref().unwrap_or("-"));
    if let Some(experiment_id) = job.experiment_id.as_deref() {
        print_key_value("Experiment", experiment_id);
    }
    if let Some(task_id) = job.task_id.as_deref() {
        print_key_value("Task", task_id);
    }
    if let Some(progress) = job.progress {
        print_key_value("Progress", &format_progress(Some(progress)));
    }
    print_key_value("Created", &format_timestamp(job.created_at));
    print_key_value("Updated", &format_timestamp(job.updated_at));

    if let Some(data) = &job.job_data {
        println!();
        println!("Job data:");
        match serde_json::to_string_pretty(data) {
            Ok(rendered) => println!("{}", rendered),
            Err(_) => println!("{}", data),
        }
    }
}
