mod commands;

use std::sync::Arc;

use clap::{Parser, Subcommand};
use tracing::{debug, error};

use studio_infrastructure::{FileStore, SessionClient};
use studio_shared::config::AppConfig;

use commands::{CreateOrderArgs, RegisterArgs, UpdateProfileArgs};

#[derive(Parser)]
#[command(name = "studio")]
#[command(about = "Command-line client for the design studio backend")]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Backend origin, overrides `api.base_url`
    #[arg(long, env = "STUDIO_BASE_URL")]
    base_url: Option<String>,

    /// Session file, overrides `storage.path`
    #[arg(long, env = "STUDIO_SESSION_FILE")]
    session_file: Option<String>,
}

#[derive(Subcommand)]
enum Commands {
    /// Log in and store the token pair
    Login {
        /// Username or email
        identifier: String,
        #[arg(long, env = "STUDIO_PASSWORD", hide_env_values = true)]
        password: String,
    },
    /// Create an account, then log in with it
    Register(RegisterArgs),
    /// Forget the stored session
    Logout,
    /// Show the stored session without contacting the backend
    Status,
    /// Show the current user's profile
    Profile,
    /// Update the current user's profile
    UpdateProfile(UpdateProfileArgs),
    /// List the current user's orders
    Orders,
    /// Show one order
    Order { id: i64 },
    /// Submit a new order
    CreateOrder(CreateOrderArgs),
    /// List the available tariffs
    Tariffs,
    /// Show one tariff
    Tariff { id: i64 },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let mut config = AppConfig::load()?;
    if let Some(base_url) = cli.base_url {
        config.api.base_url = base_url;
    }
    if let Some(path) = cli.session_file {
        config.storage.path = path;
    }

    studio_shared::telemetry::init_telemetry(&config.log);
    debug!("Using backend {}", config.api.base_url);

    let store = Arc::new(FileStore::new(&config.storage.path));
    let client = SessionClient::new(&config.api, store)?;
    let mut events = client.subscribe();

    let result = commands::run(&client, cli.command).await;

    if commands::session_expired(&mut events) {
        eprintln!("Your session has expired. Run `studio login` to sign in again.");
    }
    if let Err(e) = &result {
        error!("Command failed: {}", e);
    }
    result
}
