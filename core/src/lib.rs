#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Core contracts shared across the digital rain engine.
//!
//! This crate defines the vocabulary that connects the host adapters, the
//! authoritative matrix, and the pure systems. Hosts supply [`RainSettings`]
//! and a [`GlyphAtlasSource`], the matrix advances [`Cell`] state one tick at a
//! time, and every pixel that reaches the screen is copied through the
//! [`Surface`] blit contract from a recoloured [`TrueColorImage`].

mod image;
mod settings;

pub use image::{AtlasError, GlyphAtlasSource, IndexedImage, Palette, Rgb, TrueColorImage};
pub use settings::{RainSettings, SettingsError};

/// Number of stored intensity levels a cell may take (`0..MAX_INTENSITY`).
pub const MAX_INTENSITY: u8 = 5;

/// Number of sprite rows in the glyph atlas: every stored intensity plus the
/// blip highlight row at index [`MAX_INTENSITY`].
pub const ATLAS_ROWS: u32 = MAX_INTENSITY as u32 + 1;

/// Width of a single glyph cell in pixels.
pub const GLYPH_WIDTH: u32 = 14;

/// Height of a single glyph cell in pixels.
pub const GLYPH_HEIGHT: u32 = 14;

/// Dead cells appended to every column buffer.
///
/// The run scan may read one cell past the last row and the blip footprint
/// reaches nine cells past its position. The overrun is never rendered.
pub const COLUMN_OVERRUN: usize = 16;

/// Lowest accepted density setting.
pub const DENSITY_MIN: u32 = 5;
/// Highest accepted density setting.
pub const DENSITY_MAX: u32 = 50;
/// Density used when the host does not configure one.
pub const DENSITY_DEFAULT: u32 = 30;

/// Smallest number of distinct glyphs the rain may draw from.
pub const GLYPH_COUNT_MIN: u16 = 1;
/// Largest number of distinct glyphs the rain may draw from.
pub const GLYPH_COUNT_MAX: u16 = 26;
/// Glyph count used when the host does not configure one.
pub const GLYPH_COUNT_DEFAULT: u16 = 26;

/// Slowest accepted speed setting.
pub const SPEED_MIN: u32 = 1;
/// Fastest accepted speed setting.
pub const SPEED_MAX: u32 = 10;
/// Speed used when the host does not configure one.
pub const SPEED_DEFAULT: u32 = 6;

/// Lowest hue on the 0-255 configuration scale.
pub const HUE_MIN: u8 = 1;
/// Highest hue on the 0-255 configuration scale.
pub const HUE_MAX: u8 = 255;
/// Hue used when the host does not configure one (green).
pub const HUE_DEFAULT: u8 = 85;

/// Number of glyph replacements attempted by the sparkle pass each tick.
pub const SPARKLE_ATTEMPTS: usize = 15;
/// The sparkle cursor jumps `random % SPARKLE_SKIP_RANGE` cells after a hit.
pub const SPARKLE_SKIP_RANGE: u32 = 10;

/// A blip restarts after travelling `rows + random % BLIP_LIMIT_SPREAD` cells.
pub const BLIP_LIMIT_SPREAD: u32 = 50;
/// Row offsets, relative to the blip position, covered by the blip highlight.
pub const BLIP_FOOTPRINT: [usize; 4] = [0, 1, 8, 9];

/// Columns wait `random % START_DELAY_RANGE` ticks before animating.
pub const START_DELAY_RANGE: u32 = 100;
/// Spread of the first run length drawn for every column.
pub const INITIAL_RUN_RANGE: u32 = 20;
/// Minimum first run length drawn for every column.
pub const INITIAL_RUN_MIN: u32 = 3;

/// Packed state of a single glyph cell within a column.
///
/// A cell with intensity zero is blank regardless of its symbol. Every
/// mutating constructor returns a dirty cell; only a redraw clears the flag.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct Cell {
    dirty: bool,
    intensity: u8,
    symbol: u16,
}

impl Cell {
    /// Clean blank cell using symbol zero.
    pub const BLANK: Cell = Cell {
        dirty: false,
        intensity: 0,
        symbol: 0,
    };

    /// Creates a dirty cell showing `symbol` at the provided intensity.
    ///
    /// # Panics
    ///
    /// Panics when `intensity` is not below [`MAX_INTENSITY`].
    #[must_use]
    pub fn glyph(intensity: u8, symbol: u16) -> Self {
        assert!(
            intensity < MAX_INTENSITY,
            "cell intensity {intensity} exceeds the supported range"
        );
        Self {
            dirty: true,
            intensity,
            symbol,
        }
    }

    /// Intensity level of the cell.
    #[must_use]
    pub const fn intensity(&self) -> u8 {
        self.intensity
    }

    /// Index of the glyph shown by the cell.
    #[must_use]
    pub const fn symbol(&self) -> u16 {
        self.symbol
    }

    /// Reports whether the cell must be copied to the surface on the next redraw.
    #[must_use]
    pub const fn is_dirty(&self) -> bool {
        self.dirty
    }

    /// Reports whether the cell is dark.
    #[must_use]
    pub const fn is_blank(&self) -> bool {
        self.intensity == 0
    }

    /// Returns the cell one intensity level darker, keeping its symbol.
    ///
    /// Blank cells are returned unchanged.
    #[must_use]
    pub const fn darkened(self) -> Self {
        if self.intensity == 0 {
            return self;
        }

        Self {
            dirty: true,
            intensity: self.intensity - 1,
            symbol: self.symbol,
        }
    }

    /// Returns the cell showing a different symbol at the same intensity.
    #[must_use]
    pub const fn with_symbol(self, symbol: u16) -> Self {
        Self {
            dirty: true,
            intensity: self.intensity,
            symbol,
        }
    }

    /// Flags the cell for redraw without changing what it shows.
    pub fn mark_dirty(&mut self) {
        self.dirty = true;
    }

    /// Clears the redraw flag once the cell reached the surface.
    pub fn clear_dirty(&mut self) {
        self.dirty = false;
    }
}

/// Phase a column alternates between while it animates.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum RunPhase {
    /// Gap phase; the run scan is seeded as if a full-intensity cell sat above the column.
    Blank,
    /// Run phase; the run scan is seeded as if a dark cell sat above the column.
    Glyph,
}

impl RunPhase {
    /// Returns the opposite phase.
    #[must_use]
    pub const fn flipped(self) -> Self {
        match self {
            Self::Blank => Self::Glyph,
            Self::Glyph => Self::Blank,
        }
    }

    /// Intensity of the implicit cell above the column used to seed the run scan.
    #[must_use]
    pub const fn seed_intensity(self) -> u8 {
        match self {
            Self::Glyph => 0,
            Self::Blank => MAX_INTENSITY,
        }
    }
}

/// Location of a pixel on a surface or image.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct PixelPoint {
    x: u32,
    y: u32,
}

impl PixelPoint {
    /// Creates a new pixel location.
    #[must_use]
    pub const fn new(x: u32, y: u32) -> Self {
        Self { x, y }
    }

    /// Horizontal pixel offset.
    #[must_use]
    pub const fn x(&self) -> u32 {
        self.x
    }

    /// Vertical pixel offset.
    #[must_use]
    pub const fn y(&self) -> u32 {
        self.y
    }
}

/// Axis-aligned rectangle measured in pixels.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct PixelRect {
    origin: PixelPoint,
    width: u32,
    height: u32,
}

impl PixelRect {
    /// Creates a rectangle anchored at `origin`.
    #[must_use]
    pub const fn new(origin: PixelPoint, width: u32, height: u32) -> Self {
        Self {
            origin,
            width,
            height,
        }
    }

    /// Upper-left pixel of the rectangle.
    #[must_use]
    pub const fn origin(&self) -> PixelPoint {
        self.origin
    }

    /// Width in pixels.
    #[must_use]
    pub const fn width(&self) -> u32 {
        self.width
    }

    /// Height in pixels.
    #[must_use]
    pub const fn height(&self) -> u32 {
        self.height
    }
}

/// Atlas rectangle holding `symbol` drawn at sprite `row`.
///
/// Rows `0..MAX_INTENSITY` hold the stored intensities and row
/// [`MAX_INTENSITY`] holds the blip highlight.
#[must_use]
pub const fn glyph_sprite_rect(symbol: u16, row: u8) -> PixelRect {
    PixelRect::new(
        PixelPoint::new(symbol as u32 * GLYPH_WIDTH, row as u32 * GLYPH_HEIGHT),
        GLYPH_WIDTH,
        GLYPH_HEIGHT,
    )
}

/// Drawable supplied by the host that receives glyph blits.
///
/// The matrix never creates or destroys surfaces; it only copies rectangles
/// from the recoloured atlas into them.
pub trait Surface {
    /// Reports whether the surface can currently accept blits.
    fn is_available(&self) -> bool {
        true
    }

    /// Copies `source_rect` of `source` so its upper-left corner lands on
    /// `destination`. Pixels falling outside the surface are discarded.
    fn blit(&mut self, source: &TrueColorImage, source_rect: PixelRect, destination: PixelPoint);
}
