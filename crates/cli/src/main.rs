//! showcase - DevOps pipeline showcase
//!
//! Without a subcommand the interactive terminal UI starts. The other
//! subcommands scaffold a `.showcase/` directory or inspect and play the
//! catalog without taking over the terminal.

mod commands;

use clap::{Parser, Subcommand};
use color_eyre::eyre::{eyre, WrapErr};
use color_eyre::Result;
use std::fs::File;
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(
    name = "showcase",
    version,
    about = "Simulated DevOps pipelines with code walkthroughs"
)]
struct Cli {
    /// Project directory holding `.showcase/` (defaults to the current directory)
    #[arg(long, global = true)]
    root: Option<PathBuf>,

    /// Write logs to this file instead of stderr
    #[arg(long, global = true)]
    log_file: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Write the default catalog into `.showcase/`
    Init {
        /// Overwrite an existing `.showcase/` directory
        #[arg(long)]
        force: bool,

        /// Only write the CI/CD process
        #[arg(long)]
        minimal: bool,
    },
    /// List processes and their stages
    List {
        /// Print the catalog as JSON
        #[arg(long)]
        json: bool,
    },
    /// Print the code sample of a stage
    Show { process: String, stage: String },
    /// Play a run of a process without the terminal UI
    Run {
        process: String,

        /// Speed-up factor applied to every delay
        #[arg(long, default_value_t = 1.0)]
        speed: f64,
    },
}

/// Install the global tracing subscriber.
///
/// `RUST_LOG` overrides the default `info` filter. The interactive UI owns
/// the terminal, so without a log file its logs are discarded.
fn init_tracing(log_file: Option<&Path>, interactive: bool) -> Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    match log_file {
        Some(path) => {
            let file = File::create(path)
                .wrap_err_with(|| format!("Failed to create log file {}", path.display()))?;
            tracing_subscriber::fmt()
                .with_env_filter(filter)
                .with_writer(Mutex::new(file))
                .with_ansi(false)
                .try_init()
                .map_err(|e| eyre!(e))?;
        }
        None if interactive => {}
        None => {
            tracing_subscriber::fmt()
                .with_env_filter(filter)
                .with_writer(std::io::stderr)
                .try_init()
                .map_err(|e| eyre!(e))?;
        }
    }
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    color_eyre::install()?;
    let cli = Cli::parse();

    init_tracing(cli.log_file.as_deref(), cli.command.is_none())?;

    let root = match cli.root {
        Some(root) => root,
        None => std::env::current_dir().wrap_err("Failed to read the current directory")?,
    };

    match cli.command {
        // When `showcase` is called without any subcommand, launch the TUI
        None => {
            let config = commands::load(&root).await?;
            ps_tui::run_app(config).await.map_err(|e| eyre!(e))
        }
        Some(Commands::Init { force, minimal }) => commands::init(&root, force, minimal).await,
        Some(Commands::List { json }) => commands::list(&root, json).await,
        Some(Commands::Show { process, stage }) => commands::show(&root, &process, &stage).await,
        Some(Commands::Run { process, speed }) => commands::run(&root, &process, speed).await,
    }
}
