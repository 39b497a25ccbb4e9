use std::path::PathBuf;

use anyhow::Context;
use clap::Parser;
use tracing::info;
use wf_overview::common::config::Config;
use wf_overview::common::log::init_logging;
use wf_overview::headless::Headless;
use wf_overview::model::{Layer, OutputId, Rect};
use wf_overview::sys::WindowManager;

/// Drives an overview session against the in-memory compositor.
#[derive(Parser, Debug)]
#[command(name = "overview-sim", version)]
struct Cli {
    /// Config file. Defaults to the user config directory.
    #[arg(long)]
    config: Option<PathBuf>,

    /// Number of windows to open.
    #[arg(long, default_value_t = 3)]
    windows: usize,

    /// Index of the window to focus before activating.
    #[arg(long)]
    focus: Option<usize>,

    /// Frames to paint while overview is up.
    #[arg(long, default_value_t = 2)]
    frames: usize,

    /// Log filter used when RUST_LOG is unset.
    #[arg(long, default_value = "wf_overview=debug,overview_sim=info")]
    log: String,
}

const OUTPUT: OutputId = OutputId::new(1);
const SCREEN: Rect = Rect::new(0, 0, 1920, 1080);

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_logging(&cli.log);

    let config = match cli.config.clone().or_else(Config::default_path) {
        Some(path) => Config::read(&path).with_context(|| "loading configuration")?,
        None => Config::default(),
    };
    let activator = config.settings.activate.clone();

    let mut host = Headless::new();
    host.add_output(OUTPUT, SCREEN, config.settings);

    let width = SCREEN.width / cli.windows.max(1) as i32;
    let windows: Vec<_> = (0..cli.windows)
        .map(|i| {
            let frame = Rect::new(i as i32 * width, 0, width, SCREEN.height / 2);
            host.windows.open(OUTPUT, Layer::Workspace, &format!("window-{i}"), frame)
        })
        .collect();
    if let Some(&focused) = cli.focus.and_then(|i| windows.get(i)) {
        host.windows.focus_view(focused);
    }

    info!(binding = %activator, "pressing activation binding");
    host.press(OUTPUT, activator.modifiers(), activator.key());
    info!(mirrors = host.windows.mirrors(OUTPUT).len(), "overview up");

    for frame in 0..cli.frames {
        let phases = host.paint_frame(OUTPUT);
        info!(frame, ?phases, "painted");
    }

    host.end_switch(OUTPUT);
    let hidden = windows.iter().filter(|&&id| !host.windows.is_visible(id)).count();
    let stack = host.output(OUTPUT).context("output disappeared")?;
    info!(
        mirrors = host.windows.mirrors(OUTPUT).len(),
        hidden,
        wall_renders = stack.wall.renders().len(),
        frames = stack.render.frames(),
        damaged = stack.render.damage_log().len(),
        toggles = stack.switcher.toggles(),
        "overview ended"
    );
    Ok(())
}
