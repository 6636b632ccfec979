//! Run command - launch a title headless
//!
//! Plays the home shell's part without any UI: hands the (null) graphics
//! context to the title, resumes it a limited number of times when it pauses
//! to home, then stops it.

use std::sync::Arc;
use std::time::Duration;

use anyhow::{Result, bail};
use clap::Args;
use glint_core::{
    Config, GraphicsContext, HeadlessContext, HostEvent, HostSession, MountTable, TitleSupervisor, default_loader,
};
use glt_common::Container;

const FRAME_TIME: Duration = Duration::from_millis(16);

/// Arguments for the run command
#[derive(Args)]
pub struct RunArgs {
    /// Title file or installed title id
    pub title: String,

    /// Mount token for the title's resources
    #[arg(long, default_value = "A:/")]
    pub mount: String,

    /// Resume the title this many times when it pauses to home
    #[arg(long, default_value_t = 0)]
    pub resume_after_pause: u32,

    /// Stop the title after this many host frames
    #[arg(long)]
    pub frames: Option<u64>,
}

/// Execute the run command
pub fn execute(args: RunArgs, config: &Config) -> Result<()> {
    let path = crate::resolve_title(&args.title, &config.system)?;
    let container = Container::load(&path);
    if !container.is_valid() {
        bail!("{} is not a valid title", path.display());
    }

    if let Err(e) = MountTable::global().mount(&container, &args.mount) {
        tracing::warn!("Title resources unavailable: {}", e);
    }

    let graphics = Arc::new(HeadlessContext::new());
    graphics.make_current();
    let supervisor =
        TitleSupervisor::new(default_loader(), graphics, config.supervisor.clone());
    let mut session = HostSession::new(supervisor);

    let metadata = container.metadata();
    println!("Running {} ({})", metadata.name, metadata.id);
    session.launch(&container)?;

    let mut resumes = 0;
    let mut host_frames: u64 = 0;
    let mut limit_hit = false;
    loop {
        match session.update() {
            HostEvent::Returned => {
                if resumes < args.resume_after_pause {
                    resumes += 1;
                    println!("  Title paused to home; resuming ({}/{})", resumes, args.resume_after_pause);
                    session.resume();
                } else {
                    println!("  Title paused to home; stopping");
                    session.stop();
                }
            }
            HostEvent::Exited { id } => {
                println!("  Title {} exited", id);
                break;
            }
            HostEvent::Idle => break,
            HostEvent::Starting | HostEvent::Active | HostEvent::Paused => {}
        }

        // A title presenting anything but 1 asks the host to shut down
        if session.present(|| 1) != 1 && session.is_title_active() {
            tracing::info!("Title stopped presenting");
            session.stop();
        }

        host_frames += 1;
        if !limit_hit && frame_limit_reached(host_frames, args.frames) {
            limit_hit = true;
            println!("  Frame limit reached; stopping");
            session.stop();
        }
        std::thread::sleep(FRAME_TIME);
    }

    MountTable::global().clear();
    println!("Done after {} host frames", host_frames);
    Ok(())
}

/// Whether `frames` completed host frames reach the `--frames` limit
fn frame_limit_reached(frames: u64, limit: Option<u64>) -> bool {
    limit.is_some_and(|max| frames >= max)
}
