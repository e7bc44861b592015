use std::sync::Arc;

use anyhow::{Context, Result};
use digital_rain_core::{GlyphAtlasSource, RainSettings};
use digital_rain_rendering::{FrameBuffer, FrameRequest};
use digital_rain_system_sequence::SequenceGenerator;
use digital_rain_world::{query, Matrix, MatrixError};
use glam::UVec2;

/// Drives one matrix per surface size in response to backend requests.
#[derive(Debug)]
pub(crate) struct RainSession {
    settings: RainSettings,
    source: Arc<GlyphAtlasSource>,
    generator: SequenceGenerator,
    matrix: Option<Matrix>,
    ticks: u64,
    cells_redrawn: u64,
}

impl RainSession {
    pub(crate) fn new(
        settings: RainSettings,
        source: Arc<GlyphAtlasSource>,
        generator: SequenceGenerator,
    ) -> Self {
        Self {
            settings,
            source,
            generator,
            matrix: None,
            ticks: 0,
            cells_redrawn: 0,
        }
    }

    /// Handles a single backend request against the frame it presents.
    pub(crate) fn handle(&mut self, request: FrameRequest, frame: &mut FrameBuffer) -> Result<()> {
        match request {
            FrameRequest::Resize { size } => self.rebuild(size, frame),
            FrameRequest::Redraw => self.redraw(frame),
            FrameRequest::Tick => self.tick(frame),
        }
    }

    /// Ticks completed across every matrix this session created.
    pub(crate) const fn ticks(&self) -> u64 {
        self.ticks
    }

    /// Cells copied to the frame by ticks.
    pub(crate) const fn cells_redrawn(&self) -> u64 {
        self.cells_redrawn
    }

    /// Hue of the live matrix, or the configured hue before one exists.
    pub(crate) fn hue(&self) -> u8 {
        self.matrix
            .as_ref()
            .map_or(self.settings.hue, query::hue)
    }

    pub(crate) const fn settings(&self) -> &RainSettings {
        &self.settings
    }

    /// Releases the live matrix.
    pub(crate) fn finish(mut self) {
        if let Some(matrix) = self.matrix.take() {
            matrix.destroy();
        }
    }

    fn rebuild(&mut self, size: UVec2, frame: &mut FrameBuffer) -> Result<()> {
        if let Some(matrix) = self.matrix.take() {
            matrix.destroy();
        }
        frame.clear(0);

        let matrix = Matrix::create(
            size.x,
            size.y,
            self.settings,
            Arc::clone(&self.source),
            &mut self.generator,
        )
        .with_context(|| format!("failed to create matrix for {}x{} surface", size.x, size.y))?;
        self.matrix = Some(matrix);
        self.redraw(frame)
    }

    fn redraw(&mut self, frame: &mut FrameBuffer) -> Result<()> {
        let Some(matrix) = self.matrix.as_mut() else {
            return Ok(());
        };

        match matrix.force_full_redraw(frame) {
            Ok(cells) => {
                log::debug!("repainted {cells} cells");
                Ok(())
            }
            Err(MatrixError::SurfaceUnavailable) => {
                log::warn!("surface unavailable; skipping full redraw");
                Ok(())
            }
            Err(error) => Err(error).context("full redraw failed"),
        }
    }

    fn tick(&mut self, frame: &mut FrameBuffer) -> Result<()> {
        let Some(matrix) = self.matrix.as_mut() else {
            return Ok(());
        };

        match matrix.tick(&mut self.generator, frame) {
            Ok(report) => {
                self.ticks = self.ticks.saturating_add(1);
                self.cells_redrawn = self.cells_redrawn.saturating_add(report.cells_redrawn as u64);
                Ok(())
            }
            Err(MatrixError::SurfaceUnavailable) => {
                log::warn!("surface unavailable; skipping tick");
                Ok(())
            }
            Err(error) => Err(error).context("tick failed"),
        }
    }
}
