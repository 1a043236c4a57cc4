use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(name = "portail")]
#[command(about = "Terminal client for the employee portal notifier")]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Portal API base URL (falls back to PORTAIL_API_URL)
    #[arg(long, global = true, value_name = "URL")]
    pub api_url: Option<String>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Sign in and print the authenticated employee
    Login {
        /// Employee address identifier
        #[arg(long, value_name = "ADRESSE")]
        adresse1: String,
        /// Account password
        #[arg(long, value_name = "PASSWORD")]
        password: String,
        /// Also print the bearer token, for scripted `watch --token` use
        #[arg(long)]
        show_token: bool,
    },
    /// Stream synthesized notifications until Ctrl-C
    Watch {
        /// Employee address identifier (sign-in mode)
        #[arg(long, value_name = "ADRESSE", requires = "password")]
        adresse1: Option<String>,
        /// Account password (sign-in mode)
        #[arg(long, value_name = "PASSWORD", requires = "adresse1")]
        password: Option<String>,
        /// Employee id for a direct session, skipping sign-in
        #[arg(
            long,
            value_name = "ID",
            conflicts_with_all = ["adresse1", "password"]
        )]
        employee_id: Option<String>,
        /// Bearer token for token-scoped endpoints (with --employee-id)
        #[arg(long, value_name = "TOKEN", requires = "employee_id")]
        token: Option<String>,
        /// Delay between two poll cycles, in seconds
        #[arg(long, default_value = "20")]
        interval: u64,
        /// Print notifications as JSON lines
        #[arg(long)]
        json: bool,
    },
}
