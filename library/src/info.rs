//! Info command - show a container's metadata and resources

use anyhow::{Context, Result};
use clap::Args;
use glint_core::Config;
use glt_common::{Container, ResourcePack};

/// Arguments for the info command
#[derive(Args)]
pub struct InfoArgs {
    /// Title file or installed title id
    pub title: String,
}

/// Execute the info command
pub fn execute(args: InfoArgs, config: &Config) -> Result<()> {
    let path = crate::resolve_title(&args.title, &config.system)?;
    let container =
        Container::read(&path).with_context(|| format!("Failed to read {}", path.display()))?;
    let metadata = container.metadata();
    let header = container.header();

    println!("=== {} ===", path.display());
    println!("  Id:          {}", metadata.id);
    println!("  Name:        {}", metadata.name);
    println!("  Description: {}", metadata.description);
    if !metadata.tags.is_empty() {
        println!("  Tags:        {}", metadata.tags.join(", "));
    }
    println!("  Code:        {} bytes", header.code_size);
    println!("  Resources:   {} bytes", header.resource_size);
    if !container.is_complete() {
        println!(
            "  Warning: file is {} bytes, header declares {}",
            container.as_bytes().len(),
            container.declared_len()
        );
    }

    if container.resource().is_empty() {
        println!("  No resource pack");
        return Ok(());
    }
    match ResourcePack::parse(container.resource()) {
        Ok(pack) => {
            println!("  Resource pack: {} entries", pack.len());
            for entry in pack.iter() {
                println!("    {:<40} {:>10} bytes", entry.path, entry.data.len());
            }
        }
        Err(e) => println!("  Resource pack is invalid: {}", e),
    }
    Ok(())
}
