//! List command - show installed titles

use anyhow::Result;
use glint_core::{Config, scan_titles};

/// Execute the list command
pub fn execute(config: &Config) -> Result<()> {
    let dir = config.system.titles_dir();
    let titles = scan_titles(&dir);

    if titles.is_empty() {
        println!("No titles installed in {}", dir.display());
        return Ok(());
    }

    println!("Installed titles ({}):", titles.len());
    for title in &titles {
        let tags = if title.metadata.tags.is_empty() {
            String::new()
        } else {
            format!(" [{}]", title.metadata.tags.join(", "))
        };
        println!("  {:<16} {}{}", title.metadata.id, title.metadata.name, tags);
    }
    Ok(())
}
