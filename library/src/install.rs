//! Install command - copy a container into the titles directory

use std::path::PathBuf;

use anyhow::Result;
use clap::Args;
use glint_core::{Config, library::install_title};

/// Arguments for the install command
#[derive(Args)]
pub struct InstallArgs {
    /// Container file to install (.glt)
    pub file: PathBuf,
}

/// Execute the install command
pub fn execute(args: InstallArgs, config: &Config) -> Result<()> {
    let dest = install_title(&args.file, &config.system.titles_dir())?;
    println!("Installed {}", dest.display());
    Ok(())
}
