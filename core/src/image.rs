//! Pixel containers exchanged between the host, the colour pipeline and the matrix.

use thiserror::Error;

use crate::{ATLAS_ROWS, GLYPH_HEIGHT, GLYPH_WIDTH};

/// Maximum number of entries an indexed palette may hold.
const PALETTE_CAPACITY: usize = 256;

/// Opaque colour expressed as byte RGB components.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct Rgb {
    red: u8,
    green: u8,
    blue: u8,
}

impl Rgb {
    /// Black.
    pub const BLACK: Rgb = Rgb::from_rgb(0, 0, 0);

    /// Creates a new colour from byte RGB components.
    #[must_use]
    pub const fn from_rgb(red: u8, green: u8, blue: u8) -> Self {
        Self { red, green, blue }
    }

    /// Red component of the color.
    #[must_use]
    pub const fn red(&self) -> u8 {
        self.red
    }

    /// Green component of the color.
    #[must_use]
    pub const fn green(&self) -> u8 {
        self.green
    }

    /// Blue component of the color.
    #[must_use]
    pub const fn blue(&self) -> u8 {
        self.blue
    }

    /// Packs the colour into a 32-bit `0x00RRGGBB` pixel.
    #[must_use]
    pub const fn to_pixel(self) -> u32 {
        (self.red as u32) << 16 | (self.green as u32) << 8 | self.blue as u32
    }

    /// Unpacks a 32-bit `0x00RRGGBB` pixel, ignoring the top byte.
    #[must_use]
    pub const fn from_pixel(pixel: u32) -> Self {
        Self {
            red: (pixel >> 16) as u8,
            green: (pixel >> 8) as u8,
            blue: pixel as u8,
        }
    }
}

/// Errors raised while assembling images or the glyph atlas.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum AtlasError {
    /// The pixel buffer does not match the declared dimensions.
    #[error("image of {width}x{height} requires {expected} pixels but {actual} were supplied")]
    PixelCountMismatch {
        /// Declared width in pixels.
        width: u32,
        /// Declared height in pixels.
        height: u32,
        /// Number of pixels implied by the dimensions.
        expected: usize,
        /// Number of pixels actually supplied.
        actual: usize,
    },
    /// The palette must hold between one and 256 entries.
    #[error("palette holds {entries} entries; expected 1..=256")]
    PaletteSize {
        /// Number of supplied entries.
        entries: usize,
    },
    /// The atlas width is not a positive multiple of the glyph width.
    #[error("atlas width {width} is not a positive multiple of {glyph_width}", glyph_width = GLYPH_WIDTH)]
    Width {
        /// Width of the supplied atlas.
        width: u32,
    },
    /// The atlas does not hold exactly one sprite row per intensity plus the highlight row.
    #[error("atlas height {height} must equal {expected}")]
    Height {
        /// Height of the supplied atlas.
        height: u32,
        /// Height required by the sprite layout.
        expected: u32,
    },
    /// A pixel references a palette entry that does not exist.
    #[error("pixel index {index} has no palette entry (palette holds {entries})")]
    IndexOutOfPalette {
        /// Offending palette index.
        index: u8,
        /// Number of entries in the palette.
        entries: usize,
    },
}

/// Bitmap whose pixels are indices into a [`Palette`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct IndexedImage {
    width: u32,
    height: u32,
    indices: Vec<u8>,
}

impl IndexedImage {
    /// Creates an indexed image from row-major palette indices.
    pub fn new(width: u32, height: u32, indices: Vec<u8>) -> Result<Self, AtlasError> {
        let expected = pixel_count(width, height);
        if indices.len() != expected {
            return Err(AtlasError::PixelCountMismatch {
                width,
                height,
                expected,
                actual: indices.len(),
            });
        }

        Ok(Self {
            width,
            height,
            indices,
        })
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

    /// Row-major palette indices.
    #[must_use]
    pub fn indices(&self) -> &[u8] {
        &self.indices
    }
}

/// Colour table referenced by an [`IndexedImage`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Palette {
    entries: Vec<Rgb>,
}

impl Palette {
    /// Creates a palette holding between one and 256 colours.
    pub fn new(entries: Vec<Rgb>) -> Result<Self, AtlasError> {
        if entries.is_empty() || entries.len() > PALETTE_CAPACITY {
            return Err(AtlasError::PaletteSize {
                entries: entries.len(),
            });
        }
        Ok(Self { entries })
    }

    /// Colours in index order.
    #[must_use]
    pub fn entries(&self) -> &[Rgb] {
        &self.entries
    }

    /// Number of colours in the palette.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Palettes are never empty; provided for API symmetry with slices.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// 32-bit colour image holding `0x00RRGGBB` pixels in row-major order.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TrueColorImage {
    width: u32,
    height: u32,
    pixels: Vec<u32>,
}

impl TrueColorImage {
    /// Creates an image from row-major pixels.
    pub fn new(width: u32, height: u32, pixels: Vec<u32>) -> Result<Self, AtlasError> {
        let expected = pixel_count(width, height);
        if pixels.len() != expected {
            return Err(AtlasError::PixelCountMismatch {
                width,
                height,
                expected,
                actual: pixels.len(),
            });
        }

        Ok(Self {
            width,
            height,
            pixels,
        })
    }

    /// Creates an image where every pixel holds `pixel`.
    #[must_use]
    pub fn filled(width: u32, height: u32, pixel: u32) -> Self {
        Self {
            width,
            height,
            pixels: vec![pixel; pixel_count(width, height)],
        }
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

    /// Row-major pixels.
    #[must_use]
    pub fn pixels(&self) -> &[u32] {
        &self.pixels
    }

    /// Pixel at the provided location, if it lies inside the image.
    #[must_use]
    pub fn pixel(&self, x: u32, y: u32) -> Option<u32> {
        if x >= self.width || y >= self.height {
            return None;
        }
        self.pixels.get(y as usize * self.width as usize + x as usize).copied()
    }

    /// Row `y` of the image as a pixel slice.
    ///
    /// # Panics
    ///
    /// Panics when `y` lies outside the image.
    #[must_use]
    pub fn row(&self, y: u32) -> &[u32] {
        let width = self.width as usize;
        let start = y as usize * width;
        &self.pixels[start..start + width]
    }
}

/// Indexed glyph atlas asset supplied once, read-only, by the host.
///
/// The atlas holds one glyph per `GLYPH_WIDTH` column and one sprite row per
/// intensity level followed by the blip highlight row.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct GlyphAtlasSource {
    image: IndexedImage,
    palette: Palette,
}

impl GlyphAtlasSource {
    /// Validates the sprite layout and palette coverage of an atlas.
    pub fn new(image: IndexedImage, palette: Palette) -> Result<Self, AtlasError> {
        if image.width() == 0 || image.width() % GLYPH_WIDTH != 0 {
            return Err(AtlasError::Width {
                width: image.width(),
            });
        }

        let expected = ATLAS_ROWS * GLYPH_HEIGHT;
        if image.height() != expected {
            return Err(AtlasError::Height {
                height: image.height(),
                expected,
            });
        }

        if let Some(index) = image
            .indices()
            .iter()
            .copied()
            .find(|index| usize::from(*index) >= palette.len())
        {
            return Err(AtlasError::IndexOutOfPalette {
                index,
                entries: palette.len(),
            });
        }

        Ok(Self { image, palette })
    }

    /// Indexed sprite sheet.
    #[must_use]
    pub fn image(&self) -> &IndexedImage {
        &self.image
    }

    /// Colour table of the sprite sheet.
    #[must_use]
    pub fn palette(&self) -> &Palette {
        &self.palette
    }

    /// Number of distinct glyphs laid out horizontally in the atlas.
    #[must_use]
    pub fn glyph_columns(&self) -> u32 {
        self.image.width() / GLYPH_WIDTH
    }
}

fn pixel_count(width: u32, height: u32) -> usize {
    width as usize * height as usize
}
