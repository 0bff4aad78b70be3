//! Login, logout, and whoami handlers.

use anyhow::{Result, bail};
use console::Term;

use retort_core::api;
use retort_core::models::UserInfo;
use retort_core::{ApiClient, CredentialStore, Credentials};

use crate::config::ResolvedConfig;
use crate::output::{self, OutputFormat, print_key_value, print_success};

/// Logs in and stores the resulting credentials.
///
/// With an API key the key is verified against the server and stored.
/// With an email address the password is prompted for and exchanged for a
/// token via the login endpoint.
pub async fn login(
    client: &ApiClient,
    resolved: &ResolvedConfig,
    email: Option<&str>,
    api_key: Option<&str>,
    format: OutputFormat,
) -> Result<()> {
    let update = match (api_key, email) {
        (Some(key), _) => verify_api_key(client, key).await?,
        (None, Some(email)) => password_login(client, email).await?,
        (None, None) => {
            bail!("Provide --email for password login or --api-key to store an existing key.")
        }
    };

    let store = CredentialStore::new(&resolved.config_dir, resolved.target);
    store.save(&update)?;

    if format == OutputFormat::Json {
        return output::print_json(&serde_json::json!({
            "target": resolved.target.as_str(),
            "credentials": store.path(),
        }));
    }

    print_success(&format!("Logged in to {} target.", resolved.target));
    if let Some(team) = update.team_name.as_deref().or(update.team_id.as_deref()) {
        print_key_value("Team", team);
    }
    Ok(())
}

/// Checks an existing API key against the server and builds the
/// credential update from the reported identity.
async fn verify_api_key(client: &ApiClient, key: &str) -> Result<Credentials> {
    let check = client.clone().with_token_override(Some(key.to_string()));
    let user = api::auth::whoami(&check).await?;

    Ok(Credentials {
        access_token: Some(key.to_string()),
        team_id: user.team_id,
        team_name: user.team_name,
        user_email: user.email,
    })
}

/// Exchanges email and password for a token.
async fn password_login(client: &ApiClient, email: &str) -> Result<Credentials> {
    let term = Term::stderr();
    term.write_str(&format!("Password for {}: ", email))?;
    let password = term.read_secure_line()?;

    let response = api::auth::login(client, email, &password).await?;
    let Some(token) = response.access_token else {
        bail!("Server accepted the login but returned no token.");
    };

    Ok(Credentials {
        access_token: Some(token),
        team_id: response.team_id,
        team_name: response.team_name,
        user_email: response.user_email.or_else(|| Some(email.to_string())),
    })
}

/// Removes stored credentials for the active target.
pub fn logout(client: &ApiClient, format: OutputFormat) -> Result<()> {
    let store = client.credentials();
    store.clear()?;

    if format == OutputFormat::Json {
        return output::print_json(&serde_json::json!({
            "target": store.target().as_str(),
            "logged_out": true,
        }));
    }

    print_success(&format!("Logged out of {} target.", store.target()));
    Ok(())
}

/// Shows the authenticated user.
pub async fn whoami(client: &ApiClient, format: OutputFormat) -> Result<()> {
    let user = api::auth::whoami(client).await?;

    if format == OutputFormat::Json {
        return output::print_json(&user);
    }

    print_user(&user);
    Ok(())
}

fn print_user(user: &UserInfo) {
    print_key_value("ID", user.id.as_deref().unwrap_or("-"));
    print_key_value("Email", user.email.as_deref().unwrap_or("-"));
    if let Some(name) = &user.name {
        print_key_value("Name", name);
    }
    if let Some(team) = user.team_name.as_deref().or(user.team_id.as_deref()) {
        print_key_value("Team", team);
    }
}
