//! Mounts command - mount a container's resources and list virtual paths

use anyhow::{Context, Result, bail};
use clap::Args;
use glint_core::{Config, MountTable, MountToken};
use glt_common::Container;

/// Arguments for the mounts command
#[derive(Args)]
pub struct MountsArgs {
    /// Title file or installed title id
    pub title: String,

    /// Mount token to use
    #[arg(long, default_value = "A:/")]
    pub mount: String,
}

/// Execute the mounts command
pub fn execute(args: MountsArgs, config: &Config) -> Result<()> {
    let path = crate::resolve_title(&args.title, &config.system)?;
    let container = Container::load(&path);
    if !container.is_valid() {
        bail!("{} is not a valid title", path.display());
    }

    let token: MountToken = args.mount.parse()?;
    let table = MountTable::new();
    let count = table
        .mount(&container, token.as_str())
        .with_context(|| format!("Failed to mount {}", path.display()))?;

    println!("Mounted {} resources at {}", count, token);
    for pack_path in table.paths(token) {
        let virtual_path = format!("{}{}", token, pack_path);
        let size = table.resolve(&virtual_path).map_or(0, |data| data.len());
        println!("  {:<44} {:>10} bytes", virtual_path, size);
    }
    Ok(())
}
