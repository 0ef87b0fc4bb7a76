use std::time::Instant;

use anyhow::Context;
use clap::Parser;

use frame_viewer::cli::Cli;
use frame_viewer::logging::{init_logging, LoggingConfig};
use frame_viewer::source::TestPattern;
use frame_viewer::{Display, DisplayError};

const FPS_UPDATE_INTERVAL: f32 = 1.0;

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_logging(LoggingConfig {
        env_filter: cli.log.clone(),
        ..Default::default()
    });

    let config = cli.display_config()?;
    let format = cli.format.pixel_format();
    let mut source = TestPattern::new(cli.source_size(), format, cli.pitch_padding)
        .with_context(|| format!("cannot generate {} frames in {format}", cli.source_size()))?;

    let mut display = Display::new(config).context("failed to start display")?;
    log::info!("Frame Viewer - close the window or press Escape to quit");

    let mut shown: u64 = 0;
    let mut window_frames: u32 = 0;
    let mut window_start = Instant::now();

    while display.process_events() {
        let frame = source.next_frame();
        match display.update(&frame) {
            Ok(()) => {}
            Err(DisplayError::Frame(err)) => log::warn!("dropped frame: {err}"),
            Err(err) => return Err(err).context("display failed"),
        }

        shown += 1;
        window_frames += 1;
        let elapsed = window_start.elapsed().as_secs_f32();
        if elapsed >= FPS_UPDATE_INTERVAL {
            log::info!("FPS: {:.1}", window_frames as f32 / elapsed);
            window_frames = 0;
            window_start = Instant::now();
        }

        if cli.frames.is_some_and(|limit| shown >= limit) {
            break;
        }
    }

    display.destroy();
    log::info!("shown {shown} frames");
    Ok(())
}
