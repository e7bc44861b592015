#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Command-line adapter that runs the digital rain in a window or headless.

mod config;
mod report;
mod session;

use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use digital_rain_rendering::{standard_glyph_atlas, Color, Presentation, RenderingBackend};
use digital_rain_rendering_macroquad::MacroquadBackend;
use env_logger::Env;

use crate::{config::CliArgs, session::RainSession};

/// Entry point for the digital rain command-line interface.
fn main() -> Result<()> {
    env_logger::Builder::from_env(Env::default().default_filter_or("info")).init();

    let args = CliArgs::parse();
    let settings = args.resolve_settings()?;
    let size = args.size()?;
    let generator = args.generator();
    let seed = generator.register();
    let source = Arc::new(standard_glyph_atlas().context("failed to build glyph atlas")?);

    log::info!("seed {seed:#06x}, {settings:?}");
    let mut session = RainSession::new(settings, source, generator);

    if let Some(ticks) = args.headless {
        let report = report::run_headless(session, size, ticks, seed)?;
        let json = serde_json::to_string_pretty(&report).context("failed to encode report")?;
        println!("{json}");
        return Ok(());
    }

    let mut backend = MacroquadBackend::new()
        .with_tick_interval(settings.tick_interval())
        .with_show_fps(args.show_fps)
        .with_esc_only(args.esc_only)
        .with_fullscreen(args.fullscreen);
    if let Some(vsync) = args.vsync {
        backend = backend.with_vsync(vsync);
    }

    let presentation = Presentation::new("Digital Rain", Color::from_rgb_u8(0, 0, 0), size);
    backend.run(presentation, move |request, frame| session.handle(request, frame))
}
