#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Authoritative rain state: the grid of columns, the hue and the recoloured atlas.
//!
//! A [`Matrix`] is created once per surface size. The host drives it by
//! calling [`Matrix::tick`] at the interval derived from the settings and
//! [`Matrix::force_full_redraw`] whenever the surface lost its contents.
//! Every random decision is drawn from the host's [`SequenceGenerator`], so
//! equal seeds replay identical frames.

mod column;
mod hue;

use std::{collections::TryReserveError, sync::Arc};

use digital_rain_core::{
    AtlasError, GlyphAtlasSource, RainSettings, SettingsError, Surface, TrueColorImage,
    GLYPH_HEIGHT, GLYPH_WIDTH,
};
use digital_rain_system_palette::{hue_turns, recolor_atlas};
use digital_rain_system_sequence::SequenceGenerator;
use thiserror::Error;

use crate::column::Column;
pub use crate::column::ColumnView;

/// Errors surfaced while creating or driving a [`Matrix`].
#[derive(Debug, Error, PartialEq, Eq)]
pub enum MatrixError {
    /// The supplied settings fall outside their supported ranges.
    #[error("invalid rain settings: {0}")]
    InvalidSettings(#[from] SettingsError),
    /// The settings ask for more glyphs than the atlas provides.
    #[error("{glyph_count} glyphs requested but the atlas holds {available}")]
    GlyphCountExceedsAtlas {
        /// Requested glyph count.
        glyph_count: u16,
        /// Glyph columns present in the atlas.
        available: u32,
    },
    /// The surface has no pixels to rain on.
    #[error("surface of {width}x{height} pixels cannot hold any glyph")]
    EmptySurface {
        /// Requested width in pixels.
        width: u32,
        /// Requested height in pixels.
        height: u32,
    },
    /// Memory for the grid could not be reserved.
    #[error("failed to reserve {cells} grid entries")]
    Allocation {
        /// Number of entries that were requested.
        cells: usize,
        /// Allocator failure.
        #[source]
        source: TryReserveError,
    },
    /// The host surface cannot currently accept blits.
    #[error("surface is unavailable")]
    SurfaceUnavailable,
    /// The recoloured atlas could not be assembled.
    #[error("failed to recolour the glyph atlas: {0}")]
    Atlas(#[from] AtlasError),
}

/// Outcome of a single [`Matrix::tick`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct TickReport {
    /// Zero-based index of the tick that produced the report.
    pub tick_index: u64,
    /// Cells copied to the surface during the tick.
    pub cells_redrawn: usize,
    /// Hue of the atlas the next tick will draw with.
    pub hue: u8,
}

/// Grid of glyph columns covering a surface.
#[derive(Debug)]
pub struct Matrix {
    width: u32,
    height: u32,
    rows: usize,
    columns: Vec<Column>,
    source: Arc<GlyphAtlasSource>,
    atlas: Arc<TrueColorImage>,
    hue: u8,
    settings: RainSettings,
    tick_index: u64,
}

impl Matrix {
    /// Builds a matrix covering a `width` x `height` pixel surface.
    ///
    /// The grid holds `width / GLYPH_WIDTH + 1` columns of
    /// `height / GLYPH_HEIGHT + 1` rows so partially visible glyphs fill the
    /// right and bottom edges. Three values are drawn from `generator` per
    /// column, left to right.
    pub fn create(
        width: u32,
        height: u32,
        settings: RainSettings,
        source: Arc<GlyphAtlasSource>,
        generator: &mut SequenceGenerator,
    ) -> Result<Self, MatrixError> {
        validate_against_atlas(&settings, &source)?;
        if width == 0 || height == 0 {
            return Err(MatrixError::EmptySurface { width, height });
        }

        let column_count = (width / GLYPH_WIDTH) as usize + 1;
        let rows = (height / GLYPH_HEIGHT) as usize + 1;

        let mut columns = Vec::new();
        columns
            .try_reserve_exact(column_count)
            .map_err(|source| MatrixError::Allocation {
                cells: column_count,
                source,
            })?;
        for _ in 0..column_count {
            columns.push(Column::new(rows, generator)?);
        }

        let atlas = Arc::new(render_atlas(&source, settings.hue)?);

        log::debug!(
            "created {column_count}x{rows} matrix for {width}x{height} surface at hue {}",
            settings.hue
        );

        Ok(Self {
            width,
            height,
            rows,
            columns,
            source,
            atlas,
            hue: settings.hue,
            settings,
            tick_index: 0,
        })
    }

    /// Advances every column by one tick and draws what changed.
    ///
    /// Columns run their sparkle, scroll and redraw passes left to right
    /// against the atlas of the previous tick; the hue then advances and the
    /// atlas is rebuilt when it changed.
    pub fn tick<S: Surface + ?Sized>(
        &mut self,
        generator: &mut SequenceGenerator,
        surface: &mut S,
    ) -> Result<TickReport, MatrixError> {
        if !surface.is_available() {
            return Err(MatrixError::SurfaceUnavailable);
        }

        let glyph_count = self.settings.glyph_count;
        let run_scale = self.settings.run_scale();
        let mut cells_redrawn = 0;
        for (index, column) in self.columns.iter_mut().enumerate() {
            column.sparkle(generator, glyph_count);
            column.scroll(generator, glyph_count, run_scale);
            cells_redrawn += column.redraw(&self.atlas, surface, column_x(index));
        }

        let hue = hue::next_hue(self.hue, &self.settings, generator);
        if hue != self.hue {
            self.atlas = Arc::new(render_atlas(&self.source, hue)?);
            self.hue = hue;
        }

        let report = TickReport {
            tick_index: self.tick_index,
            cells_redrawn,
            hue,
        };
        self.tick_index = self.tick_index.saturating_add(1);

        log::trace!(
            "tick {} redrew {cells_redrawn} cells at hue {hue}",
            report.tick_index
        );
        Ok(report)
    }

    /// Redraws every visible cell without advancing the simulation.
    ///
    /// Returns the number of cells copied to the surface.
    pub fn force_full_redraw<S: Surface + ?Sized>(
        &mut self,
        surface: &mut S,
    ) -> Result<usize, MatrixError> {
        if !surface.is_available() {
            return Err(MatrixError::SurfaceUnavailable);
        }

        let mut redrawn = 0;
        for (index, column) in self.columns.iter_mut().enumerate() {
            column.mark_all_dirty();
            redrawn += column.redraw(&self.atlas, surface, column_x(index));
        }
        Ok(redrawn)
    }

    /// Replaces the active settings; they take effect on the next tick.
    ///
    /// A changed fixed hue is picked up by the next tick's hue step.
    pub fn apply_settings(&mut self, settings: RainSettings) -> Result<(), MatrixError> {
        validate_against_atlas(&settings, &self.source)?;
        self.settings = settings;
        Ok(())
    }

    /// Releases the atlas and every column.
    pub fn destroy(self) {
        log::debug!(
            "destroying {}x{} matrix after {} ticks",
            self.columns.len(),
            self.rows,
            self.tick_index
        );
    }
}

fn validate_against_atlas(
    settings: &RainSettings,
    source: &GlyphAtlasSource,
) -> Result<(), MatrixError> {
    settings.validate()?;
    let available = source.glyph_columns();
    if u32::from(settings.glyph_count) > available {
        return Err(MatrixError::GlyphCountExceedsAtlas {
            glyph_count: settings.glyph_count,
            available,
        });
    }
    Ok(())
}

fn render_atlas(source: &GlyphAtlasSource, hue: u8) -> Result<TrueColorImage, AtlasError> {
    recolor_atlas(source.image(), source.palette(), hue_turns(hue))
}

fn column_x(index: usize) -> u32 {
    index as u32 * GLYPH_WIDTH
}

/// Query functions that provide read-only access to the matrix.
pub mod query {
    use digital_rain_core::{RainSettings, TrueColorImage};

    use super::{ColumnView, Matrix};

    /// Surface size in pixels the matrix was created for.
    #[must_use]
    pub fn dimensions(matrix: &Matrix) -> (u32, u32) {
        (matrix.width, matrix.height)
    }

    /// Number of columns and visible rows in the grid.
    #[must_use]
    pub fn grid_size(matrix: &Matrix) -> (usize, usize) {
        (matrix.columns.len(), matrix.rows)
    }

    /// Read-only view of column `x`, if it exists.
    #[must_use]
    pub fn column(matrix: &Matrix, x: usize) -> Option<ColumnView<'_>> {
        matrix.columns.get(x).map(ColumnView::new)
    }

    /// Visible cells awaiting redraw across the whole grid.
    #[must_use]
    pub fn dirty_cell_count(matrix: &Matrix) -> usize {
        matrix.columns.iter().map(|column| column.dirty_count()).sum()
    }

    /// Hue of the current atlas.
    #[must_use]
    pub fn hue(matrix: &Matrix) -> u8 {
        matrix.hue
    }

    /// Recoloured atlas the next redraw samples from.
    #[must_use]
    pub fn atlas(matrix: &Matrix) -> &TrueColorImage {
        &matrix.atlas
    }

    /// Settings the next tick runs with.
    #[must_use]
    pub fn settings(matrix: &Matrix) -> &RainSettings {
        &matrix.settings
    }

    /// Number of ticks completed so far.
    #[must_use]
    pub fn tick_index(matrix: &Matrix) -> u64 {
        matrix.tick_index
    }
}

#[cfg(test)]
mod tests {
    use digital_rain_core::{IndexedImage, Palette, Rgb, ATLAS_ROWS};

    use super::*;

    fn source(glyphs: u32) -> Arc<GlyphAtlasSource> {
        let width = glyphs * GLYPH_WIDTH;
        let height = ATLAS_ROWS * GLYPH_HEIGHT;
        let indices = (0..height)
            .flat_map(|y| (0..width).map(move |_| (y / GLYPH_HEIGHT) as u8))
            .collect();
        let image = IndexedImage::new(width, height, indices).expect("consistent image");
        let palette = Palette::new(
            (0..ATLAS_ROWS)
                .map(|row| Rgb::from_rgb(0, (row * 40) as u8, 0))
                .collect(),
        )
        .expect("valid palette");
        Arc::new(GlyphAtlasSource::new(image, palette).expect("valid atlas"))
    }

    #[test]
    fn create_rejects_invalid_settings() {
        let settings = RainSettings {
            speed: 0,
            ..RainSettings::default()
        };
        let error = Matrix::create(
            100,
            100,
            settings,
            source(26),
            &mut SequenceGenerator::from_seed(1),
        )
        .expect_err("speed zero");
        assert_eq!(
            error,
            MatrixError::InvalidSettings(SettingsError::Speed { value: 0 })
        );
    }

    #[test]
    fn create_rejects_glyphs_missing_from_atlas() {
        let error = Matrix::create(
            100,
            100,
            RainSettings::default(),
            source(10),
            &mut SequenceGenerator::from_seed(1),
        )
        .expect_err("atlas too narrow");
        assert_eq!(
            error,
            MatrixError::GlyphCountExceedsAtlas {
                glyph_count: 26,
                available: 10
            }
        );
    }

    #[test]
    fn create_rejects_empty_surface() {
        let error = Matrix::create(
            0,
            100,
            RainSettings::default(),
            source(26),
            &mut SequenceGenerator::from_seed(1),
        )
        .expect_err("zero width");
        assert_eq!(
            error,
            MatrixError::EmptySurface {
                width: 0,
                height: 100
            }
        );
    }

    #[test]
    fn create_draws_three_values_per_column() {
        let mut generator = SequenceGenerator::from_seed(0x2222);
        let mut expected = generator.clone();

        let matrix = Matrix::create(
            28,
            14,
            RainSettings::default(),
            source(26),
            &mut generator,
        )
        .expect("matrix");

        for _ in 0..query::grid_size(&matrix).0 * 3 {
            let _ = expected.next_value();
        }
        assert_eq!(generator, expected);
    }

    #[test]
    fn apply_settings_validates_before_storing() {
        let mut matrix = Matrix::create(
            28,
            28,
            RainSettings::default(),
            source(26),
            &mut SequenceGenerator::from_seed(1),
        )
        .expect("matrix");

        let rejected = RainSettings {
            density: 1,
            ..RainSettings::default()
        };
        assert!(matrix.apply_settings(rejected).is_err());
        assert_eq!(query::settings(&matrix), &RainSettings::default());

        let accepted = RainSettings {
            hue: 200,
            ..RainSettings::default()
        };
        matrix.apply_settings(accepted).expect("valid settings");
        assert_eq!(query::settings(&matrix).hue, 200);
        assert_eq!(query::hue(&matrix), RainSettings::default().hue);
    }
}
