//! Glint launcher
//!
//! # Commands
//!
//! - `glint init` - Create the system directory layout
//! - `glint boot` - Run the home shell from `sys/apps`
//! - `glint list` - List installed titles
//! - `glint info <title>` - Show a container's metadata and resources
//! - `glint install <file>` - Copy a container into the titles directory
//! - `glint mounts <title>` - Mount a container's resources and list them
//! - `glint run <title>` - Run a title headless
//!
//! `<title>` is either a path to a `.glt` file or the id of an installed title.

mod boot;
mod info;
mod init;
mod install;
mod list;
mod mounts;
mod run;

use std::path::{Path, PathBuf};

use anyhow::{Result, bail};
use clap::{Parser, Subcommand};
use glint_core::{SystemConfig, config, title_path};

/// Glint - native title launcher
#[derive(Parser)]
#[command(name = "glint")]
#[command(about = "Launcher for Glint console titles")]
#[command(version)]
struct Cli {
    /// Config file (defaults to the platform config directory)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// System root directory, overriding the config
    #[arg(long, global = true)]
    root: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Create the system directory layout
    Init(init::InitArgs),

    /// Run the home shell
    Boot,

    /// List installed titles
    List,

    /// Show a container's metadata and resources
    Info(info::InfoArgs),

    /// Copy a container into the titles directory
    Install(install::InstallArgs),

    /// Mount a container's resources and list them
    Mounts(mounts::MountsArgs),

    /// Run a title headless
    Run(run::RunArgs),
}

fn main() -> Result<()> {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    for (name, ptr) in glint_core::ffi::exported_symbols() {
        tracing::debug!("Exporting {} at {:p}", name, ptr);
    }

    let cli = Cli::parse();
    let mut config = match &cli.config {
        Some(path) => config::load_from(path),
        None => config::load(),
    };
    if let Some(root) = cli.root {
        config.system.root = root;
    }

    match cli.command {
        Commands::Init(args) => init::execute(args, &config),
        Commands::Boot => boot::execute(&config),
        Commands::List => list::execute(&config),
        Commands::Info(args) => info::execute(args, &config),
        Commands::Install(args) => install::execute(args, &config),
        Commands::Mounts(args) => mounts::execute(args, &config),
        Commands::Run(args) => run::execute(args, &config),
    }
}

/// Resolve a title argument to a container path.
///
/// Accepts a path to an existing file or the id of an installed title.
pub(crate) fn resolve_title(arg: &str, system: &SystemConfig) -> Result<PathBuf> {
    let path = Path::new(arg);
    if path.is_file() {
        return Ok(path.to_path_buf());
    }

    let installed = title_path(&system.titles_dir(), arg);
    if installed.is_file() {
        return Ok(installed);
    }

    bail!(
        "No title file '{}' and no installed title with that id in {}",
        arg,
        system.titles_dir().display()
    )
}
