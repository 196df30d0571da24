//! genvlab CLI
//!
//! Command-line interface for binding notebook kernels to genv
//! environments.

mod commands;
mod console;

use anyhow::Context;
use clap::{Parser, Subcommand};
use genvlab_client::{Directory, HttpDirectory};
use genvlab_core::ClientConfig;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{debug, Level};
use tracing_subscriber::FmtSubscriber;

/// genvlab - GPU environments for notebook kernels
#[derive(Parser, Debug)]
#[command(name = "genvlab")]
#[command(version, about, long_about = None)]
struct Cli {
    /// Configuration file (defaults to <config dir>/genvlab/config.toml when present)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Notebook server URL
    #[arg(long, global = true)]
    url: Option<String>,

    /// Notebook server token
    #[arg(long, global = true)]
    token: Option<String>,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Show device usage
    Devices,

    /// Show active environments
    Envs,

    /// Show the environment a kernel is bound to
    Find {
        /// Kernel ID
        kernel_id: String,
    },

    /// Bind a kernel to an environment
    Activate {
        /// Kernel ID
        kernel_id: String,

        /// Environment ID
        eid: String,
    },

    /// Choose and configure the environment of a kernel
    Configure {
        /// Kernel ID (omit to simulate a notebook without a kernel)
        #[arg(long)]
        kernel_id: Option<String>,

        /// Kernel spec name (e.g., python3-genv)
        #[arg(long)]
        spec_name: Option<String>,
    },

    /// Print the configuration script of an environment
    Script {
        /// Environment ID
        eid: String,
    },

    /// Print the launch environment of a kernel
    LaunchEnv {
        /// Kernel ID
        kernel_id: String,
    },

    /// Install genv wrapper kernel specs
    Install {
        /// Jupyter data directory to search (repeatable)
        #[arg(long = "data-dir")]
        data_dirs: Vec<PathBuf>,
    },
}

fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir()
        .map(|dir| dir.join("genvlab").join("config.toml"))
        .filter(|path| path.is_file())
}

fn load_config(cli: &Cli) -> anyhow::Result<ClientConfig> {
    let mut config = match cli.config.clone().or_else(default_config_path) {
        Some(path) => ClientConfig::from_file(&path)
            .with_context(|| format!("Failed to load {}", path.display()))?,
        None => ClientConfig::default(),
    };
    apply_overrides(&mut config, cli);
    Ok(config)
}

/// Command-line flags take precedence over the file
fn apply_overrides(config: &mut ClientConfig, cli: &Cli) {
    if let Some(url) = &cli.url {
        config.server.base_url = url.clone();
    }
    if let Some(token) = &cli.token {
        config.server.token = Some(token.clone());
    }
    if cli.verbose {
        config.logging.level = "debug".to_string();
    }
}

fn parse_level(level: &str) -> Level {
    match level.to_lowercase().as_str() {
        "trace" => Level::TRACE,
        "debug" => Level::DEBUG,
        "info" => Level::INFO,
        "warn" => Level::WARN,
        "error" => Level::ERROR,
        _ => Level::WARN,
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let config = load_config(&cli)?;

    // Initialize logging
    let subscriber = FmtSubscriber::builder()
        .with_max_level(parse_level(&config.logging.level))
        .with_target(false)
        .finish();
    let _ = tracing::subscriber::set_global_default(subscriber);

    debug!(base_url = %config.server.base_url, namespace = %config.server.namespace, "Loaded configuration");

    let directory: Arc<dyn Directory> = Arc::new(HttpDirectory::new(&config.server)?);

    match cli.command {
        Commands::Devices => {
            commands::devices(directory.as_ref()).await?;
        }
        Commands::Envs => {
            commands::envs(directory.as_ref()).await?;
        }
        Commands::Find { kernel_id } => {
            commands::find(directory.as_ref(), kernel_id).await?;
        }
        Commands::Activate { kernel_id, eid } => {
            commands::activate(directory.as_ref(), kernel_id, eid).await?;
        }
        Commands::Configure {
            kernel_id,
            spec_name,
        } => {
            commands::configure(directory, &config, kernel_id, spec_name).await?;
        }
        Commands::Script { eid } => {
            commands::script(eid)?;
        }
        Commands::LaunchEnv { kernel_id } => {
            commands::launch_env(directory, kernel_id).await?;
        }
        Commands::Install { data_dirs } => {
            commands::install(&config, data_dirs)?;
        }
    }

    Ok(())
}
