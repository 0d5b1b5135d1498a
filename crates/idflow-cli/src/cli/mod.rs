//! CLI entry and dispatch.

use anyhow::{Context, Result};
use clap::Parser;
use idflow_core::{config, logging};
use idflow_types::LoginProvider;

mod callback_listener;
mod commands;

#[derive(Parser)]
#[command(name = "idflow")]
#[command(version)]
#[command(about = "Log in through an identity provider and sign transactions")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(clap::Subcommand)]
enum Commands {
    /// Log in with an identity provider
    Login {
        /// Provider to log in with (facebook, google, oreid, email)
        #[arg(short, long, value_name = "PROVIDER")]
        provider: LoginProvider,

        /// Wait for the redirect on the callback address and finish the login
        #[arg(long)]
        listen: bool,
    },

    /// Finish a login from the address the identity service redirected to
    Callback {
        /// Full redirect address, including its query string
        #[arg(value_name = "URL")]
        url: String,
    },

    /// Show the current session and profile
    Status,

    /// Log out (clear the cached session)
    Logout,

    /// Sign the sample transaction with the selected chain account
    Sign {
        /// Chain network to pick the account from (default: from config)
        #[arg(short, long)]
        network: Option<String>,
    },

    /// Manage configuration
    Config {
        #[command(subcommand)]
        command: ConfigCommands,
    },
}

#[derive(clap::Subcommand)]
enum ConfigCommands {
    /// Show the path to the config file
    Path,
    /// Initialize a default config file (if not present)
    Init,
}

pub fn run() -> Result<()> {
    let cli = Cli::parse();

    logging::init_tracing()?;

    let rt = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .context("create tokio runtime")?;

    rt.block_on(async move { dispatch(cli).await })
}

async fn dispatch(cli: Cli) -> Result<()> {
    // Config commands must work even when the file is broken.
    if let Commands::Config { command } = &cli.command {
        return match command {
            ConfigCommands::Path => {
                commands::config::path();
                Ok(())
            }
            ConfigCommands::Init => commands::config::init(),
        };
    }

    let config = config::Config::load().context("load config")?;

    match cli.command {
        Commands::Login { provider, listen } => {
            commands::auth::login(&config, provider, listen).await
        }
        Commands::Callback { url } => commands::auth::callback(&config, &url).await,
        Commands::Status => commands::status::run(&config).await,
        Commands::Logout => commands::auth::logout(&config).await,
        Commands::Sign { network } => commands::sign::run(&config, network.as_deref()).await,
        Commands::Config { .. } => Ok(()),
    }
}
