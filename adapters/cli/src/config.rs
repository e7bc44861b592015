use std::{
    fs,
    path::{Path, PathBuf},
};

use anyhow::{bail, Context, Result};
use clap::Parser;
use digital_rain_core::RainSettings;
use digital_rain_system_sequence::SequenceGenerator;
use glam::UVec2;

/// Falling glyph screensaver.
#[derive(Debug, Parser)]
#[command(name = "digital-rain", version, about)]
pub(crate) struct CliArgs {
    /// TOML file holding rain settings; flags override its values.
    #[arg(long, value_name = "PATH")]
    pub(crate) config: Option<PathBuf>,

    /// Number of distinct glyphs to draw from.
    #[arg(long)]
    glyphs: Option<u16>,

    /// Run density; higher values give longer glyph runs.
    #[arg(long)]
    density: Option<u32>,

    /// Animation speed.
    #[arg(long)]
    speed: Option<u32>,

    /// Fixed hue, also the starting hue when randomising.
    #[arg(long)]
    hue: Option<u8>,

    /// Animate the hue every tick.
    #[arg(long)]
    random_hue: bool,

    /// Jump between random hues instead of stepping smoothly.
    #[arg(long)]
    abrupt_hue: bool,

    /// Seed for the sequence generator; the clock is used when omitted.
    #[arg(long)]
    seed: Option<u16>,

    /// Window or headless frame width in pixels.
    #[arg(long, default_value_t = 1024)]
    width: u32,

    /// Window or headless frame height in pixels.
    #[arg(long, default_value_t = 768)]
    height: u32,

    /// Open a fullscreen window.
    #[arg(long)]
    pub(crate) fullscreen: bool,

    /// Only the Escape key closes the window.
    #[arg(long)]
    pub(crate) esc_only: bool,

    /// Log frame and tick rates once per second.
    #[arg(long)]
    pub(crate) show_fps: bool,

    /// Synchronise presentation with the display refresh rate.
    #[arg(long, value_name = "BOOL")]
    pub(crate) vsync: Option<bool>,

    /// Run the given number of ticks without a window and print a JSON report.
    #[arg(long, value_name = "TICKS")]
    pub(crate) headless: Option<u64>,
}

impl CliArgs {
    /// Loads the configured file, applies flag overrides and validates the result.
    pub(crate) fn resolve_settings(&self) -> Result<RainSettings> {
        let mut settings = match &self.config {
            Some(path) => load_settings(path)?,
            None => RainSettings::default(),
        };

        if let Some(glyphs) = self.glyphs {
            settings.glyph_count = glyphs;
        }
        if let Some(density) = self.density {
            settings.density = density;
        }
        if let Some(speed) = self.speed {
            settings.speed = speed;
        }
        if let Some(hue) = self.hue {
            settings.hue = hue;
        }
        if self.random_hue {
            settings.randomize_hue = true;
        }
        if self.abrupt_hue {
            settings.smooth_hue_transition = false;
        }

        settings.validate().context("invalid rain settings")?;
        Ok(settings)
    }

    /// Surface size requested on the command line.
    pub(crate) fn size(&self) -> Result<UVec2> {
        if self.width == 0 || self.height == 0 {
            bail!(
                "surface size must be at least 1x1 pixels (received {}x{})",
                self.width,
                self.height
            );
        }
        Ok(UVec2::new(self.width, self.height))
    }

    pub(crate) fn generator(&self) -> SequenceGenerator {
        self.seed
            .map_or_else(SequenceGenerator::from_clock, SequenceGenerator::from_seed)
    }
}

/// Reads rain settings from a TOML file; missing keys take their defaults.
pub(crate) fn load_settings(path: &Path) -> Result<RainSettings> {
    let text = fs::read_to_string(path)
        .with_context(|| format!("failed to read config {}", path.display()))?;
    toml::from_str(&text).with_context(|| format!("failed to parse config {}", path.display()))
}
