//! Per-column state machine: start delay, glyph runs, sparkle and blip.

use digital_rain_core::{
    glyph_sprite_rect, Cell, PixelPoint, RunPhase, Surface, TrueColorImage, BLIP_FOOTPRINT,
    BLIP_LIMIT_SPREAD, COLUMN_OVERRUN, DENSITY_MAX, DENSITY_MIN, GLYPH_HEIGHT, INITIAL_RUN_MIN,
    INITIAL_RUN_RANGE, MAX_INTENSITY, SPARKLE_ATTEMPTS, SPARKLE_SKIP_RANGE, START_DELAY_RANGE,
};
use digital_rain_system_sequence::SequenceGenerator;

use crate::MatrixError;

/// Intensity written for fresh glyphs and required for sparkle and highlight.
const TOP_INTENSITY: u8 = MAX_INTENSITY - 1;

/// One vertical strip of glyph cells.
///
/// The buffer holds `rows + COLUMN_OVERRUN` cells. Only the first `rows` are
/// ever rendered or reported; the remainder absorbs the scan's one-past-the-end
/// read and the blip footprint reaching below the last row.
#[derive(Clone, Debug)]
pub(crate) struct Column {
    cells: Vec<Cell>,
    rows: usize,
    run_phase: RunPhase,
    run_countdown: u32,
    start_countdown: u32,
    started: bool,
    blip_pos: usize,
    blip_limit: usize,
}

impl Column {
    /// Allocates a blank column and draws its start delay, phase and first run length.
    pub(crate) fn new(rows: usize, generator: &mut SequenceGenerator) -> Result<Self, MatrixError> {
        let len = rows + COLUMN_OVERRUN;
        let mut cells = Vec::new();
        cells
            .try_reserve_exact(len)
            .map_err(|source| MatrixError::Allocation { cells: len, source })?;
        cells.resize(len, Cell::BLANK);

        let start_countdown = generator.below(START_DELAY_RANGE);
        let run_phase = if generator.below(2) == 1 {
            RunPhase::Glyph
        } else {
            RunPhase::Blank
        };
        let run_countdown = generator.below(INITIAL_RUN_RANGE) + INITIAL_RUN_MIN;

        Ok(Self {
            cells,
            rows,
            run_phase,
            run_countdown,
            start_countdown,
            started: false,
            blip_pos: 0,
            blip_limit: 0,
        })
    }

    /// Swaps the symbol of up to `SPARKLE_ATTEMPTS` top-intensity cells.
    pub(crate) fn sparkle(&mut self, generator: &mut SequenceGenerator, glyph_count: u16) {
        let mut y = 0;
        for _ in 0..SPARKLE_ATTEMPTS {
            while y < self.rows && self.cells[y].intensity() < TOP_INTENSITY {
                y += 1;
            }
            if y >= self.rows {
                break;
            }

            let symbol = random_symbol(generator, glyph_count);
            self.cells[y] = self.cells[y].with_symbol(symbol);
            y += generator.below(SPARKLE_SKIP_RANGE) as usize;
        }
    }

    /// Advances the column by one tick.
    ///
    /// `run_scale` is the inverted density returned by
    /// [`RainSettings::run_scale`](digital_rain_core::RainSettings::run_scale).
    pub(crate) fn scroll(
        &mut self,
        generator: &mut SequenceGenerator,
        glyph_count: u16,
        run_scale: u32,
    ) {
        if !self.started {
            self.start_countdown = self.start_countdown.saturating_sub(1);
            if self.start_countdown == 0 {
                self.started = true;
            }
            return;
        }

        self.scan_runs(generator, glyph_count);
        self.expire_run(generator, run_scale);
        self.advance_blip(generator);
    }

    /// Copies every dirty visible cell to the surface and returns how many were drawn.
    pub(crate) fn redraw<S: Surface + ?Sized>(
        &mut self,
        atlas: &TrueColorImage,
        surface: &mut S,
        column_x: u32,
    ) -> usize {
        let mut redrawn = 0;
        for y in 0..self.rows {
            let cell = self.cells[y];
            if !cell.is_dirty() {
                continue;
            }

            let sprite_row = if cell.intensity() >= TOP_INTENSITY && self.is_blip_row(y) {
                MAX_INTENSITY
            } else {
                cell.intensity()
            };
            surface.blit(
                atlas,
                glyph_sprite_rect(cell.symbol(), sprite_row),
                PixelPoint::new(column_x, y as u32 * GLYPH_HEIGHT),
            );
            self.cells[y].clear_dirty();
            redrawn += 1;
        }
        redrawn
    }

    /// Flags every visible cell for redraw.
    pub(crate) fn mark_all_dirty(&mut self) {
        self.cells[..self.rows]
            .iter_mut()
            .for_each(Cell::mark_dirty);
    }

    /// Number of visible cells awaiting redraw.
    pub(crate) fn dirty_count(&self) -> usize {
        self.visible().iter().filter(|cell| cell.is_dirty()).count()
    }

    fn visible(&self) -> &[Cell] {
        &self.cells[..self.rows]
    }

    fn scan_runs(&mut self, generator: &mut SequenceGenerator, glyph_count: u16) {
        let mut last = self.run_phase.seed_intensity();
        let mut y = 0;
        while y < self.rows {
            let intensity = self.cells[y].intensity();
            if intensity < last && intensity == 0 {
                // leading edge: the run grows downwards
                self.cells[y] = Cell::glyph(TOP_INTENSITY, random_symbol(generator, glyph_count));
                y += 1;
            } else if intensity > last {
                // trailing edge: the head of the run fades
                self.cells[y] = self.cells[y].darkened();
                if intensity == TOP_INTENSITY {
                    y += 1;
                }
            }

            last = self.cells[y].intensity();
            y += 1;
        }
    }

    fn expire_run(&mut self, generator: &mut SequenceGenerator, run_scale: u32) {
        self.run_countdown = self.run_countdown.saturating_sub(1);
        if self.run_countdown > 0 {
            return;
        }

        self.run_phase = self.run_phase.flipped();
        self.run_countdown = match self.run_phase {
            RunPhase::Glyph => generator.below(3 * run_scale / 2) + DENSITY_MIN,
            RunPhase::Blank => generator.below(DENSITY_MAX + 1 - run_scale) + 2 * DENSITY_MIN,
        };
    }

    fn advance_blip(&mut self, generator: &mut SequenceGenerator) {
        self.mark_blip_dirty();

        self.blip_pos += 2;
        if self.blip_pos >= self.blip_limit {
            self.blip_limit = self.rows + generator.below(BLIP_LIMIT_SPREAD) as usize;
            self.blip_pos = 0;
        }

        self.mark_blip_dirty();
    }

    fn mark_blip_dirty(&mut self) {
        if self.blip_pos >= self.rows {
            return;
        }
        for offset in BLIP_FOOTPRINT {
            self.cells[self.blip_pos + offset].mark_dirty();
        }
    }

    fn is_blip_row(&self, y: usize) -> bool {
        BLIP_FOOTPRINT
            .iter()
            .any(|offset| self.blip_pos + offset == y)
    }
}

fn random_symbol(generator: &mut SequenceGenerator, glyph_count: u16) -> u16 {
    generator.below(u32::from(glyph_count)) as u16
}

/// Read-only view of a single column.
#[derive(Clone, Copy, Debug)]
pub struct ColumnView<'a> {
    column: &'a Column,
}

impl<'a> ColumnView<'a> {
    pub(crate) fn new(column: &'a Column) -> Self {
        Self { column }
    }

    /// Number of visible rows.
    #[must_use]
    pub fn rows(&self) -> usize {
        self.column.rows
    }

    /// Visible cells from top to bottom; the overrun is excluded.
    #[must_use]
    pub fn cells(&self) -> &'a [Cell] {
        self.column.visible()
    }

    /// Phase the column is currently in.
    #[must_use]
    pub fn run_phase(&self) -> RunPhase {
        self.column.run_phase
    }

    /// Ticks left before the phase flips.
    #[must_use]
    pub fn run_countdown(&self) -> u32 {
        self.column.run_countdown
    }

    /// Ticks left before the column starts animating.
    #[must_use]
    pub fn start_countdown(&self) -> u32 {
        self.column.start_countdown
    }

    /// Reports whether the start delay elapsed.
    #[must_use]
    pub fn is_started(&self) -> bool {
        self.column.started
    }

    /// Row of the blip head.
    #[must_use]
    pub fn blip_pos(&self) -> usize {
        self.column.blip_pos
    }

    /// Row at which the blip restarts from the top.
    #[must_use]
    pub fn blip_limit(&self) -> usize {
        self.column.blip_limit
    }
}
