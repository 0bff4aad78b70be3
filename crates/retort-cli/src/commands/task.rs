//! Task command handlers.

use anyhow::{Result, anyhow, bail};
use clap::Subcommand;

use retort_core::ApiClient;
use retort_core::api::tasks;
use retort_core::models::{CreateTaskRequest, Task};

use crate::output::{
    self, OutputFormat, format_timestamp, print_key_value, print_success, print_table_header,
    print_table_row,
};

/// Task subcommands.
#[derive(Subcommand)]
pub enum TaskCommands {
    /// List all tasks
    List,

    /// Create a new task
    Add {
        /// Task name
        #[arg(long)]
        name: String,

        /// Task type (e.g. LOCAL or REMOTE)
        #[arg(long = "type")]
        task_type: Option<String>,

        /// Experiment to attach the task to
        #[arg(long)]
        experiment: Option<String>,

        /// Plugin implementing the task
        #[arg(long)]
        plugin: Option<String>,

        /// Task configuration as a JSON object
        #[arg(long)]
        config: Option<String>,
    },

    /// Show task details
    Show {
        /// Task ID
        id: String,
    },

    /// Delete a task
    Remove {
        /// Task ID
        id: String,
    },

    /// Queue a task for execution
    Queue {
        /// Task ID
        id: String,

        /// Compute provider for remote tasks (defaults to the task config,
        /// then the first registered provider)
        #[arg(long)]
        provider: Option<String>,

        /// Override a task parameter (key=value, repeatable)
        #[arg(long = "param", value_parser = parse_key_val)]
        params: Vec<(String, String)>,
    },
}

/// Handle task subcommands.
pub async fn handle_task_command(
    client: &ApiClient,
    cmd: TaskCommands,
    format: OutputFormat,
) -> Result<()> {
    match cmd {
        TaskCommands::List => list_tasks(client, format).await,
        TaskCommands::Add {
            name,
            task_type,
            experiment,
            plugin,
            config,
        } => add_task(client, name, task_type, experiment, plugin, config, format).await,
        TaskCommands::Show { id } => show_task(client, &id, format).await,
        TaskCommands::Remove { id } => remove_task(client, &id).await,
        TaskCommands::Queue {
            id,
            provider,
            params,
        } => queue_task(client, &id, provider.as_deref(), &params, format).await,
    }
}

/// Parses a `key=value` parameter override.
fn parse_key_val(raw: &str) -> Result<(String, String), String> {
    match raw.split_once('=') {
        Some((key, value)) if !key.is_empty() => Ok((key.to_string(), value.to_string())),
        _ => Err(format!("expected key=value, got '{}'", raw)),
    }
}

async fn list_tasks(client: &ApiClient, format: OutputFormat) -> Result<()> {
    let tasks = tasks::list(client).await?;

    if format == OutputFormat::Json {
        return output::print_json(&tasks);
    }

    if tasks.is_empty() {
        println!("No tasks found.");
        return Ok(());
    }

    print_table_header(&[
        ("ID", 24),
        ("NAME", 24),
        ("TYPE", 8),
        ("STATUS", 10),
        ("CREATED", 19),
    ]);

    for task in tasks {
        print_table_row(&[
            (&task.id, 24),
            (task.name.as_deref().unwrap_or("-"), 24),
            (task.task_type.as_deref().unwrap_or("-"), 8),
            (task.status.as_deref().unwrap_or("-"), 10),
            (&format_timestamp(task.created_at), 19),
        ]);
    }

    Ok(())
}

async fn add_task(
    client: &ApiClient,
    name: String,
    task_type: Option<String>,
    experiment: Option<String>,
    plugin: Option<String>,
    config: Option<String>,
    format: OutputFormat,
) -> Result<()> {
    let config = config
        .map(|raw| {
            serde_json::from_str::<serde_json::Value>(&raw)
                .map_err(|e| anyhow!("--config is not valid JSON: {}", e))
        })
        .transpose()?;

    if let Some(config) = &config {
        if !config.is_object() {
            bail!("--config must be a JSON object.");
        }
    }

    let request = CreateTaskRequest {
        name,
        task_type,
        experiment_id: experiment,
        plugin,
        config,
    };

    let task = tasks::create(client, &request).await?;

    if format == OutputFormat::Json {
        return output::print_json(&task);
    }

    print_success("Task created.");
    println!();
    print_task(&task);
    Ok(())
}

async fn show_task(client: &ApiClient, id: &str, format: OutputFormat) -> Result<()> {
    let task = tasks::get(client, id).await?;

    if format == OutputFormat::Json {
        return output::print_json(&task);
    }

    print_task(&task);
    Ok(())
}

async fn remove_task(client: &ApiClient, id: &str) -> Result<()> {
    tasks::delete(client, id).await?;
    println!("Task {} removed.", id);
    Ok(())
}

async fn queue_task(
    client: &ApiClient,
    id: &str,
    provider: Option<&str>,
    params: &[(String, String)],
    format: OutputFormat,
) -> Result<()> {
    let outcome = tasks::queue(client, id, provider, params).await?;

    if format == OutputFormat::Json {
        return output::print_json(&outcome);
    }

    match outcome.job_id.as_deref() {
        Some(job_id) => {
            print_success(&format!("Task {} queued as job {}.", id, job_id));
            println!("Follow it with 'retort job logs {} --follow'.", job_id);
        }
        None => {
            print_success(&format!("Task {} queued.", id));
            if let Some(message) = outcome.message.as_deref() {
                println!("{}", message);
            }
        }
    }

    Ok(())
}

fn print_task(task: &Task) {
    print_key_value("ID", &task.id);
    print_key_value("Name", task.name.as_deref().unwrap_or("-"));
    print_key_value("Type", task.task_type.as_deref().unwrap_or("-"));
    print_key_value("Status", task.status.as_deref().unwrap_or("-"));
    if let Some(experiment_id) = task.experiment_id.as_deref() {
        print_key_value("Experiment", experiment_id);
    }
    if let Some(plugin) = task.plugin.as_deref() {
        print_key_value("Plugin", plugin);
    }
    print_key_value("Created", &format_timestamp(task.created_at));
    print_key_value("Updated", &format_timestamp(task.updated_at));

    if let Some(config) = &task.config {
        println!();
        println!("Config:");
        match serde_json::to_string_pretty(config) {
            Ok(rendered) => println!("{}", rendered),
            Err(_) => println!("{}", config),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_key_val() {
        assert_eq!(
            parse_key_val("epochs=10").unwrap(),
            ("epochs".to_string(), "10".to_string())
        );
        assert_eq!(
            parse_key_val("note=fast=run").unwrap(),
            ("note".to_string(), "fast=run".to_string())
        );
        assert!(parse_key_val("no-equals").is_err());
        assert!(parse_key_val("=value").is_err());
    }
}
