//! Boot command - run the home shell

use anyhow::{Result, bail};
use glint_core::{
    BootOutcome, Config, HeadlessContext, MountTable, boot_home_screen, default_loader,
    init_system_dirs,
};

/// Execute the boot command
pub fn execute(config: &Config) -> Result<()> {
    let system = &config.system;
    init_system_dirs(&system.root)?;

    let loader = default_loader();
    let graphics = HeadlessContext::new();
    let outcome = boot_home_screen(system, loader.as_ref(), &graphics, MountTable::global())?;
    MountTable::global().clear();

    match outcome {
        BootOutcome::Ran { frames } => {
            println!("Home shell exited after {} frames", frames);
            Ok(())
        }
        BootOutcome::MissingHome => bail!(
            "Home shell {}.glt not found in {}",
            system.home_title,
            system.apps_dir().display()
        ),
        BootOutcome::InvalidHome => bail!("Home shell {} is not a valid title", system.home_title),
    }
}
