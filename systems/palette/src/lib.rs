#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Colour pipeline that tints the indexed glyph atlas to a single hue.
//!
//! Every palette entry is converted to HSL, its hue replaced, and converted
//! back. Saturation and lightness survive the trip so the relative shading
//! of the atlas rows is preserved for any hue.

use digital_rain_core::{AtlasError, IndexedImage, Palette, Rgb, TrueColorImage};

/// Colour expressed as hue, saturation and lightness, each within `0.0..=1.0`.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Hsl {
    /// Hue in turns; `0.0` and `1.0` both denote red.
    pub hue: f64,
    /// Saturation.
    pub saturation: f64,
    /// Lightness.
    pub lightness: f64,
}

impl Hsl {
    /// Creates a colour from its components.
    #[must_use]
    pub const fn new(hue: f64, saturation: f64, lightness: f64) -> Self {
        Self {
            hue,
            saturation,
            lightness,
        }
    }
}

/// Converts a 0-255 configuration hue into turns, wrapping 255 onto 0.
#[must_use]
pub fn hue_turns(hue: u8) -> f64 {
    f64::from(hue % u8::MAX) / f64::from(u8::MAX)
}

/// Converts a byte RGB colour into HSL.
///
/// Achromatic colours report a hue and saturation of zero.
#[must_use]
pub fn rgb_to_hsl(colour: Rgb) -> Hsl {
    let red = channel_to_unit(colour.red());
    let green = channel_to_unit(colour.green());
    let blue = channel_to_unit(colour.blue());

    let max = red.max(green).max(blue);
    let min = red.min(green).min(blue);
    let lightness = (max + min) / 2.0;
    let delta = max - min;

    if delta == 0.0 {
        return Hsl::new(0.0, 0.0, lightness);
    }

    let saturation = if lightness <= 0.5 {
        delta / (max + min)
    } else {
        delta / (2.0 - max - min)
    };

    let sector = if red == max {
        (green - blue) / delta
    } else if green == max {
        2.0 + (blue - red) / delta
    } else {
        4.0 + (red - green) / delta
    };

    let mut hue = sector / 6.0;
    if hue < 0.0 {
        hue += 1.0;
    }

    Hsl::new(hue, saturation, lightness)
}

/// Converts an HSL colour into byte RGB, rounding each channel to the nearest byte.
#[must_use]
pub fn hsl_to_rgb(colour: Hsl) -> Rgb {
    let Hsl {
        hue,
        saturation,
        lightness,
    } = colour;

    if saturation == 0.0 {
        let grey = unit_to_channel(lightness);
        return Rgb::from_rgb(grey, grey, grey);
    }

    let upper = if lightness <= 0.5 {
        lightness * (1.0 + saturation)
    } else {
        lightness + saturation - lightness * saturation
    };
    let lower = 2.0 * lightness - upper;

    Rgb::from_rgb(
        unit_to_channel(hue_component(lower, upper, hue + 1.0 / 3.0)),
        unit_to_channel(hue_component(lower, upper, hue)),
        unit_to_channel(hue_component(lower, upper, hue - 1.0 / 3.0)),
    )
}

/// Produces a true-colour copy of `image` with every palette entry moved to `hue`.
///
/// The palette is converted once; pixels are then resolved by table lookup.
/// Indices without a palette entry resolve to black.
pub fn recolor_atlas(
    image: &IndexedImage,
    palette: &Palette,
    hue: f64,
) -> Result<TrueColorImage, AtlasError> {
    let table: Vec<u32> = palette
        .entries()
        .iter()
        .map(|entry| recolor(*entry, hue).to_pixel())
        .collect();

    let pixels: Vec<u32> = image
        .indices()
        .iter()
        .map(|index| {
            table
                .get(usize::from(*index))
                .copied()
                .unwrap_or(Rgb::BLACK.to_pixel())
        })
        .collect();

    TrueColorImage::new(image.width(), image.height(), pixels)
}

/// Replaces the hue of `colour`, keeping its saturation and lightness.
#[must_use]
pub fn recolor(colour: Rgb, hue: f64) -> Rgb {
    let Hsl {
        saturation,
        lightness,
        ..
    } = rgb_to_hsl(colour);
    hsl_to_rgb(Hsl::new(hue, saturation, lightness))
}

fn hue_component(lower: f64, upper: f64, mut hue: f64) -> f64 {
    if hue < 0.0 {
        hue += 1.0;
    }
    if hue > 1.0 {
        hue -= 1.0;
    }

    if 6.0 * hue < 1.0 {
        lower + (upper - lower) * hue * 6.0
    } else if 2.0 * hue < 1.0 {
        upper
    } else if 3.0 * hue < 2.0 {
        lower + (upper - lower) * (2.0 / 3.0 - hue) * 6.0
    } else {
        lower
    }
}

fn channel_to_unit(channel: u8) -> f64 {
    f64::from(channel) / 255.0
}

fn unit_to_channel(value: f64) -> u8 {
    (value * 255.0).round().clamp(0.0, 255.0) as u8
}
