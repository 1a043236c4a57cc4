//! Portail CLI - terminal client for the employee portal notifier.
//!
//! Signs in against the portal backend and streams synthesized
//! notifications to the terminal as they are detected.

mod cli;
mod error;

use std::collections::HashSet;
use std::time::Duration;

use chrono::DateTime;
use clap::Parser;
use portail_core::{
    DeltaNotifier, Notification, NotifierOptions, PortalApiClient, PortalAuthClient, PortalConfig,
    Session,
};
use tracing::info;

use crate::cli::{Cli, Commands};
use crate::error::CliError;

#[tokio::main]
async fn main() {
    if let Err(error) = run().await {
        eprintln!("Error: {error}");
        std::process::exit(1);
    }
}

async fn run() -> Result<(), CliError> {
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("portail=info".parse().unwrap()),
        )
        .init();

    let cli = Cli::parse();
    let config = resolve_config(cli.api_url)?;

    match cli.command {
        Commands::Login {
            adresse1,
            password,
            show_token,
        } => run_login(&config, &adresse1, &password, show_token).await?,
        Commands::Watch {
            adresse1,
            password,
            employee_id,
            token,
            interval,
            json,
        } => {
            let session =
                resolve_watch_session(&config, employee_id, token, adresse1, password).await?;
            run_watch(&config, session, interval, json).await?;
        }
    }

    Ok(())
}

async fn run_login(
    config: &PortalConfig,
    adresse1: &str,
    password: &str,
    show_token: bool,
) -> Result<(), CliError> {
    let auth = PortalAuthClient::new(config)?;
    let auth_session = auth.sign_in(adresse1, password).await?;

    let employee = &auth_session.employee;
    match employee.display_name() {
        Some(name) => println!("Signed in as {name} ({})", employee.id),
        None => println!("Signed in as {}", employee.id),
    }
    if show_token {
        println!("Token: {}", auth_session.token);
    }
    Ok(())
}

async fn resolve_watch_session(
    config: &PortalConfig,
    employee_id: Option<String>,
    token: Option<String>,
    adresse1: Option<String>,
    password: Option<String>,
) -> Result<Session, CliError> {
    if let Some(employee_id) = employee_id {
        let session = Session::new(employee_id);
        return Ok(match token {
            Some(token) => session.with_token(token),
            None => session,
        });
    }

    let (Some(adresse1), Some(password)) = (adresse1, password) else {
        return Err(CliError::MissingSessionSource);
    };
    let auth = PortalAuthClient::new(config)?;
    let session = auth.sign_in(&adresse1, &password).await?.session();
    info!(employee_id = %session.employee_id, "signed in");
    Ok(session)
}

async fn run_watch(
    config: &PortalConfig,
    session: Session,
    interval_secs: u64,
    as_json: bool,
) -> Result<(), CliError> {
    info!(employee_id = %session.employee_id, "watching for notifications");

    let api = PortalApiClient::new(config)?;
    let options = NotifierOptions {
        poll_interval: Duration::from_secs(interval_secs),
        ..NotifierOptions::default()
    };
    let notifier = DeltaNotifier::new(api, options);
    let mut feed_rx = notifier.subscribe();
    notifier.start(session).await;

    let mut printed: HashSet<String> = HashSet::new();
    loop {
        tokio::select! {
            interrupted = tokio::signal::ctrl_c() => {
                interrupted?;
                break;
            }
            changed = feed_rx.changed() => {
                if changed.is_err() {
                    break;
                }
                let feed = feed_rx.borrow_and_update().clone();
                // Oldest first, so the terminal reads chronologically.
                for notification in feed.notifications.iter().rev() {
                    if printed.insert(notification.id.clone()) {
                        println!("{}", render_notification(notification, as_json)?);
                    }
                }
            }
        }
    }

    notifier.stop().await;
    println!("Stopped watching.");
    Ok(())
}

fn render_notification(notification: &Notification, as_json: bool) -> Result<String, CliError> {
    if as_json {
        Ok(serde_json::to_string(notification)?)
    } else {
        Ok(format_notification_line(notification))
    }
}

fn format_notification_line(notification: &Notification) -> String {
    let instant = DateTime::from_timestamp_millis(notification.timestamp).map_or_else(
        || notification.timestamp.to_string(),
        |instant| instant.format("%Y-%m-%d %H:%M:%S").to_string(),
    );
    format!(
        "{instant}  [{}] {}: {}",
        notification.kind, notification.title, notification.body
    )
}

fn resolve_config(cli_api_url: Option<String>) -> Result<PortalConfig, CliError> {
    let api_url = cli_api_url
        .or_else(|| std::env::var("PORTAIL_API_URL").ok())
        .ok_or(CliError::ApiUrlNotConfigured)?;
    Ok(PortalConfig::new(api_url)?)
}
