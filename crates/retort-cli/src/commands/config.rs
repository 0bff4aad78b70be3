//! Configuration command handlers.
//!
//! These only touch local files and the bundled endpoint map; no server
//! connection is made.

use anyhow::{Result, bail};
use clap::Subcommand;

use retort_core::endpoints::EndpointResolver;
use retort_core::settings::{Settings, keys};
use retort_core::{CredentialStore, Target, paths};

use crate::config::validate_server_url;
use crate::output::{
    self, OutputFormat, mask_token, print_key_value, print_success, print_table_header,
    print_table_row, print_warning,
};

/// Configuration subcommands.
#[derive(Subcommand)]
pub enum ConfigCommands {
    /// Show current configuration
    Show {
        /// Print the stored token instead of a masked version
        #[arg(long)]
        show_token: bool,
    },

    /// Set a configuration value
    Set {
        /// Setting key (target, server.local, server.cloud, team_id, user_email)
        key: String,

        /// Value to store
        value: String,
    },

    /// Remove a configuration value
    Unset {
        /// Setting key
        key: String,
    },

    /// Show the configuration directory path
    Path,

    /// List the API routes the CLI knows about
    Endpoints,
}

/// Handle config subcommands.
pub fn handle_config_command(cmd: ConfigCommands, format: OutputFormat) -> Result<()> {
    match cmd {
        ConfigCommands::Show { show_token } => show_config(show_token, format),
        ConfigCommands::Set { key, value } => set_value(&key, &value),
        ConfigCommands::Unset { key } => unset_value(&key),
        ConfigCommands::Path => show_path(),
        ConfigCommands::Endpoints => list_endpoints(format),
    }
}

fn config_dir() -> Result<std::path::PathBuf> {
    Ok(paths::config_dir()?)
}

fn show_config(show_token: bool, format: OutputFormat) -> Result<()> {
    let dir = config_dir()?;
    let settings = Settings::load(&dir);

    let target = match settings.get(keys::TARGET) {
        Some(raw) => raw.parse::<Target>().unwrap_or_else(|_| {
            print_warning(&format!(
                "Stored target '{}' is not recognized, using {}.",
                raw,
                Target::default()
            ));
            Target::default()
        }),
        None => Target::default(),
    };

    let store = CredentialStore::new(&dir, target);
    let credentials = store.load();

    let token_display = match credentials.access_token.as_deref() {
        Some(token) if show_token => token.to_string(),
        Some(token) => mask_token(token),
        None => "not set".to_string(),
    };

    if format == OutputFormat::Json {
        return output::print_json(&serde_json::json!({
            "config_dir": dir,
            "target": target.as_str(),
            "server": {
                "local": server_for(&settings, Target::Local),
                "cloud": server_for(&settings, Target::Cloud),
            },
            "token": token_display,
            "team_id": credentials.team_id,
            "team_name": credentials.team_name,
            "user_email": credentials.user_email,
        }));
    }

    print_key_value("Config dir", &dir.display().to_string());
    print_key_value("Target", target.as_str());
    print_key_value("Local server", &server_for(&settings, Target::Local));
    print_key_value("Cloud server", &server_for(&settings, Target::Cloud));
    print_key_value("Token", &token_display);
    if let Some(team) = credentials
        .team_name
        .as_deref()
        .or(credentials.team_id.as_deref())
    {
        print_key_value("Team", team);
    }
    if let Some(email) = credentials.user_email.as_deref() {
        print_key_value("Email", email);
    }

    Ok(())
}

/// Server URL for a target, from settings or the built-in default.
fn server_for(settings: &Settings, target: Target) -> String {
    match settings.get(target.server_setting_key()) {
        Some(url) => url.to_string(),
        None => format!("{} (default)", target.default_base_url()),
    }
}

fn set_value(key: &str, value: &str) -> Result<()> {
    let stored = match key {
        keys::TARGET => value.parse::<Target>()?.as_str().to_string(),
        keys::SERVER_LOCAL | keys::SERVER_CLOUD => validate_server_url(value)?,
        keys::TEAM_ID | keys::USER_EMAIL => value.to_string(),
        _ => bail!(
            "Unknown setting '{}'. Known settings: {}, {}, {}, {}, {}.",
            key,
            keys::TARGET,
            keys::SERVER_LOCAL,
            keys::SERVER_CLOUD,
            keys::TEAM_ID,
            keys::USER_EMAIL
        ),
    };

    let dir = config_dir()?;
    let mut settings = Settings::load(&dir);
    settings.set(key, stored.clone());
    settings.save(&dir)?;

    print_success(&format!("Set {} = {}", key, stored));
    Ok(())
}

fn unset_value(key: &str) -> Result<()> {
    let dir = config_dir()?;
    let mut settings = Settings::load(&dir);

    match settings.remove(key) {
        Some(_) => {
            settings.save(&dir)?;
            print_success(&format!("Removed {}.", key));
        }
        None => println!("{} was not set.", key),
    }

    Ok(())
}

fn show_path() -> Result<()> {
    println!("{}", config_dir()?.display());
    Ok(())
}

fn list_endpoints(format: OutputFormat) -> Result<()> {
    let resolver = EndpointResolver::bundled()?;
    let routes = resolver.routes();

    if format == OutputFormat::Json {
        let entries: Vec<serde_json::Value> = routes
            .iter()
            .map(|route| {
                serde_json::json!({
                    "key": route.key,
                    "method": route.method.to_string(),
                    "path": route.path,
                    "overridden": route.overridden,
                })
            })
            .collect();
        return output::print_json(&entries);
    }

    print_table_header(&[("KEY", 28), ("METHOD", 8), ("PATH", 44), ("SOURCE", 8)]);

    for route in routes {
        let source = if route.overridden { "override" } else { "map" };
        print_table_row(&[
            (&route.key, 28),
            (&route.method.to_string(), 8),
            (&route.path, 44),
            (source, 8),
        ]);
    }

    Ok(())
}
