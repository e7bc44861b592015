use digital_rain_core::{
    AtlasError, GlyphAtlasSource, IndexedImage, Palette, Rgb, ATLAS_ROWS, GLYPH_HEIGHT,
    GLYPH_WIDTH,
};

/// Number of glyphs in the built-in atlas.
pub const STANDARD_GLYPH_COUNT: u16 = 26;

const FONT_COLUMNS: u32 = 5;
const FONT_ROWS: u32 = 7;
const FONT_SCALE: u32 = 2;
const FONT_MARGIN: u32 = (GLYPH_WIDTH - FONT_COLUMNS * FONT_SCALE) / 2;

/// Row bitmaps of a 5x7 capital alphabet; bit 4 is the left edge before mirroring.
const FONT: [[u8; FONT_ROWS as usize]; STANDARD_GLYPH_COUNT as usize] = [
    [0x0E, 0x11, 0x11, 0x1F, 0x11, 0x11, 0x11],
    [0x1E, 0x11, 0x11, 0x1E, 0x11, 0x11, 0x1E],
    [0x0E, 0x11, 0x10, 0x10, 0x10, 0x11, 0x0E],
    [0x1E, 0x11, 0x11, 0x11, 0x11, 0x11, 0x1E],
    [0x1F, 0x10, 0x10, 0x1E, 0x10, 0x10, 0x1F],
    [0x1F, 0x10, 0x10, 0x1E, 0x10, 0x10, 0x10],
    [0x0E, 0x11, 0x10, 0x17, 0x11, 0x11, 0x0F],
    [0x11, 0x11, 0x11, 0x1F, 0x11, 0x11, 0x11],
    [0x0E, 0x04, 0x04, 0x04, 0x04, 0x04, 0x0E],
    [0x07, 0x02, 0x02, 0x02, 0x02, 0x12, 0x0C],
    [0x11, 0x12, 0x14, 0x18, 0x14, 0x12, 0x11],
    [0x10, 0x10, 0x10, 0x10, 0x10, 0x10, 0x1F],
    [0x11, 0x1B, 0x15, 0x15, 0x11, 0x11, 0x11],
    [0x11, 0x11, 0x19, 0x15, 0x13, 0x11, 0x11],
    [0x0E, 0x11, 0x11, 0x11, 0x11, 0x11, 0x0E],
    [0x1E, 0x11, 0x11, 0x1E, 0x10, 0x10, 0x10],
    [0x0E, 0x11, 0x11, 0x11, 0x15, 0x12, 0x0D],
    [0x1E, 0x11, 0x11, 0x1E, 0x14, 0x12, 0x11],
    [0x0F, 0x10, 0x10, 0x0E, 0x01, 0x01, 0x1E],
    [0x1F, 0x04, 0x04, 0x04, 0x04, 0x04, 0x04],
    [0x11, 0x11, 0x11, 0x11, 0x11, 0x11, 0x0E],
    [0x11, 0x11, 0x11, 0x11, 0x11, 0x0A, 0x04],
    [0x11, 0x11, 0x11, 0x15, 0x15, 0x15, 0x0A],
    [0x11, 0x11, 0x0A, 0x04, 0x0A, 0x11, 0x11],
    [0x11, 0x11, 0x11, 0x0A, 0x04, 0x04, 0x04],
    [0x1F, 0x01, 0x02, 0x04, 0x08, 0x10, 0x1F],
];

/// Palette entry per sprite row; row zero is dark and the last row is the blip highlight.
const SHADES: [Rgb; ATLAS_ROWS as usize] = [
    Rgb::BLACK,
    Rgb::from_rgb(0, 72, 0),
    Rgb::from_rgb(0, 120, 10),
    Rgb::from_rgb(10, 176, 30),
    Rgb::from_rgb(40, 232, 60),
    Rgb::from_rgb(200, 255, 200),
];

/// Builds the built-in glyph atlas: mirrored capitals drawn once per intensity row.
///
/// Row `r` paints each glyph with palette entry `r`, so the dark row zero is
/// entirely black and the highlight row uses the palest shade.
pub fn standard_glyph_atlas() -> Result<GlyphAtlasSource, AtlasError> {
    let width = u32::from(STANDARD_GLYPH_COUNT) * GLYPH_WIDTH;
    let height = ATLAS_ROWS * GLYPH_HEIGHT;
    let mut indices = vec![0u8; width as usize * height as usize];

    for (glyph, bitmap) in FONT.iter().enumerate() {
        let glyph_x = glyph as u32 * GLYPH_WIDTH;
        for shade in 1..ATLAS_ROWS {
            let glyph_y = shade * GLYPH_HEIGHT;
            for (font_y, &bits) in bitmap.iter().enumerate() {
                for font_x in 0..FONT_COLUMNS {
                    // mirrored: the least significant bit is drawn leftmost
                    if (bits >> font_x) & 1 == 0 {
                        continue;
                    }
                    for dy in 0..FONT_SCALE {
                        for dx in 0..FONT_SCALE {
                            let x = glyph_x + FONT_MARGIN + font_x * FONT_SCALE + dx;
                            let y = glyph_y + font_y as u32 * FONT_SCALE + dy;
                            indices[y as usize * width as usize + x as usize] = shade as u8;
                        }
                    }
                }
            }
        }
    }

    let image = IndexedImage::new(width, height, indices)?;
    let palette = Palette::new(SHADES.to_vec())?;
    GlyphAtlasSource::new(image, palette)
}
