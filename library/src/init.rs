//! Init command - create the system directory layout

use anyhow::Result;
use clap::Args;
use glint_core::{Config, config, init_system_dirs};

/// Arguments for the init command
#[derive(Args)]
pub struct InitArgs {
    /// Also write a default config.toml if none exists
    #[arg(long)]
    pub write_config: bool,
}

/// Execute the init command
pub fn execute(args: InitArgs, config: &Config) -> Result<()> {
    let root = &config.system.root;
    init_system_dirs(root)?;
    println!("System directories ready under {}", root.display());

    if args.write_config {
        match config::config_dir() {
            Some(dir) if !dir.join("config.toml").exists() => {
                config::save(config)?;
                println!("  Wrote {}", dir.join("config.toml").display());
            }
            Some(dir) => println!("  Keeping existing {}", dir.join("config.toml").display()),
            None => println!("  No config directory available"),
        }
    }

    Ok(())
}
