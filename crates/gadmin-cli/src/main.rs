mod commands;
mod config;
mod session;

use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::process::ExitCode;

use crate::config::ConsoleConfig;
use crate::session::Session;

#[derive(Parser)]
#[command(name = "gadmin")]
#[command(about = "Admin console session: sign-in, permission cache and visibility checks")]
#[command(version)]
struct Cli {
    /// Path to the gadmin config directory (default: ~/.gadmin)
    #[arg(long, global = true)]
    config_dir: Option<PathBuf>,

    /// Bearer token to use when none is stored (or set GADMIN_TOKEN).
    #[arg(long, global = true, env = "GADMIN_TOKEN")]
    token: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Write a default configuration
    Init,

    /// Store a token and load its permissions from the backend
    Login {
        /// Token issued by the backend's login endpoint
        token: String,
    },

    /// Sign out and forget cached permissions
    Logout,

    /// Show the account encoded in the current token
    Whoami,

    /// Drop cached permissions and load them again
    Refresh,

    /// Check whether a request would be allowed (exit code 1 when denied)
    Check {
        /// HTTP method, e.g. GET
        method: String,
        /// Request path, e.g. /admin/api/users/12
        path: String,
    },

    /// List sidebar menus and whether they are visible
    Menus,

    /// List the buttons of a page and whether they are visible
    Buttons {
        /// Page path, e.g. /admin/users
        page: String,
    },

    /// Show current configuration
    Config,
}

fn main() -> anyhow::Result<ExitCode> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("gadmin=info".parse()?),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    let base_dir = match cli.config_dir {
        Some(ref dir) => dir.clone(),
        None => ConsoleConfig::default_base_dir()?,
    };

    match cli.command {
        Commands::Init => return commands::init::run(&base_dir).map(|()| ExitCode::SUCCESS),
        Commands::Config => return commands::config::run(&base_dir).map(|()| ExitCode::SUCCESS),
        _ => {}
    }

    let rt = tokio::runtime::Runtime::new()?;
    let session = Session::open(&base_dir, cli.token.clone())?;

    match cli.command {
        Commands::Login { ref token } => rt.block_on(commands::login::run(&session, token))?,
        Commands::Logout => rt.block_on(commands::logout::run(&session))?,
        Commands::Whoami => commands::whoami::run(&session)?,
        Commands::Refresh => rt.block_on(commands::refresh::run(&session))?,
        Commands::Check {
            ref method,
            ref path,
        } => {
            if !rt.block_on(commands::check::run(&session, method, path))? {
                return Ok(ExitCode::FAILURE);
            }
        }
        Commands::Menus => rt.block_on(commands::menus::run(&session))?,
        Commands::Buttons { ref page } => rt.block_on(commands::buttons::run(&session, page))?,
        Commands::Init | Commands::Config => {}
    }

    Ok(ExitCode::SUCCESS)
}
