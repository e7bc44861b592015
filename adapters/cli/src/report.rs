use anyhow::{Context, Result};
use digital_rain_core::RainSettings;
use digital_rain_rendering::{FrameBuffer, FrameRequest};
use glam::UVec2;
use serde::Serialize;
use sha2::{Digest, Sha256};

use crate::session::RainSession;

/// Outcome of a windowless run, printed as JSON.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub(crate) struct HeadlessReport {
    width: u32,
    height: u32,
    seed: u16,
    ticks: u64,
    settings: RainSettings,
    cells_redrawn: u64,
    final_hue: u8,
    framebuffer_sha256: String,
}

/// Runs `ticks` ticks against an in-memory frame and summarises the result.
pub(crate) fn run_headless(
    mut session: RainSession,
    size: UVec2,
    ticks: u64,
    seed: u16,
) -> Result<HeadlessReport> {
    let mut frame = FrameBuffer::new(size).context("failed to allocate headless frame")?;
    session.handle(FrameRequest::Resize { size }, &mut frame)?;
    for _ in 0..ticks {
        session.handle(FrameRequest::Tick, &mut frame)?;
    }

    let report = HeadlessReport {
        width: size.x,
        height: size.y,
        seed,
        ticks: session.ticks(),
        settings: *session.settings(),
        cells_redrawn: session.cells_redrawn(),
        final_hue: session.hue(),
        framebuffer_sha256: fingerprint(&frame),
    };
    session.finish();
    Ok(report)
}

/// SHA-256 of the frame's pixels in little-endian byte order, as lowercase hex.
pub(crate) fn fingerprint(frame: &FrameBuffer) -> String {
    let mut hasher = Sha256::new();
    for pixel in frame.pixels() {
        hasher.update(pixel.to_le_bytes());
    }
    format!("{:x}", hasher.finalize())
}

#[cfg(test)]
mod tests {
    use super::*;
    use digital_rain_rendering::standard_glyph_atlas;
    use digital_rain_system_sequence::SequenceGenerator;
    use std::sync::Arc;

    fn run(seed: u16, settings: RainSettings) -> HeadlessReport {
        let source = Arc::new(standard_glyph_atlas().expect("built-in atlas"));
        let session = RainSession::new(settings, source, SequenceGenerator::from_seed(seed));
        run_headless(session, UVec2::new(120, 90), 150, seed).expect("headless run")
    }

    #[test]
    fn black_frame_has_a_stable_fingerprint() {
        let frame = FrameBuffer::new(UVec2::new(1, 1)).expect("frame");
        assert_eq!(
            fingerprint(&frame),
            "df3f619804a92fdb4057192dc43dd748ea778adc52bc498ce80524c014b81119"
        );
    }

    #[test]
    fn same_seed_reports_identically() {
        let settings = RainSettings {
            randomize_hue: true,
            ..RainSettings::default()
        };
        let first = run(99, settings);
        assert_eq!(first, run(99, settings));
        assert_eq!(first.ticks, 150);
        assert_eq!(first.framebuffer_sha256.len(), 64);
    }

    #[test]
    fn different_seeds_diverge() {
        let settings = RainSettings::default();
        assert_ne!(
            run(1, settings).framebuffer_sha256,
            run(2, settings).framebuffer_sha256
        );
    }

    #[test]
    fn report_serialises_settings_inline() {
        let report = run(5, RainSettings::default());
        let json = serde_json::to_value(&report).expect("report serialises");
        assert_eq!(json["seed"], 5);
        assert_eq!(json["settings"]["density"], report.settings.density);
        assert_eq!(json["final_hue"], report.final_hue);
    }
}
