//! Host-supplied configuration consumed by the matrix.

use std::{ops::RangeInclusive, time::Duration};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::{
    DENSITY_DEFAULT, DENSITY_MAX, DENSITY_MIN, GLYPH_COUNT_DEFAULT, GLYPH_COUNT_MAX,
    GLYPH_COUNT_MIN, HUE_DEFAULT, HUE_MAX, HUE_MIN, SPEED_DEFAULT, SPEED_MAX, SPEED_MIN,
};

const TICK_INTERVAL_STEP_MS: u64 = 10;

/// Configuration values read by the matrix at creation time and between ticks.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct RainSettings {
    /// Number of distinct glyphs the rain draws from.
    pub glyph_count: u16,
    /// Relative length of glyph runs versus blank gaps; higher is denser.
    pub density: u32,
    /// Animation speed; the host converts it into a tick interval.
    pub speed: u32,
    /// Fixed hue on the 0-255 scale, also the starting hue when randomising.
    pub hue: u8,
    /// Animates the hue every tick instead of holding `hue`.
    pub randomize_hue: bool,
    /// When randomising, steps the hue by one each tick instead of jumping.
    pub smooth_hue_transition: bool,
}

impl Default for RainSettings {
    fn default() -> Self {
        Self {
            glyph_count: GLYPH_COUNT_DEFAULT,
            density: DENSITY_DEFAULT,
            speed: SPEED_DEFAULT,
            hue: HUE_DEFAULT,
            randomize_hue: false,
            smooth_hue_transition: true,
        }
    }
}

impl RainSettings {
    /// Checks every value against its supported range.
    pub fn validate(&self) -> Result<(), SettingsError> {
        check(
            self.glyph_count,
            GLYPH_COUNT_MIN..=GLYPH_COUNT_MAX,
            |value| SettingsError::GlyphCount { value },
        )?;
        check(self.density, DENSITY_MIN..=DENSITY_MAX, |value| {
            SettingsError::Density { value }
        })?;
        check(self.speed, SPEED_MIN..=SPEED_MAX, |value| SettingsError::Speed {
            value,
        })?;
        check(self.hue, HUE_MIN..=HUE_MAX, |value| SettingsError::Hue { value })
    }

    /// Interval between ticks the host should schedule for the configured speed.
    ///
    /// Speed 10 ticks every 10 ms, speed 1 every 100 ms.
    #[must_use]
    pub fn tick_interval(&self) -> Duration {
        let speed = self.speed.clamp(SPEED_MIN, SPEED_MAX);
        let steps = u64::from(SPEED_MAX - speed + SPEED_MIN);
        Duration::from_millis(steps * TICK_INTERVAL_STEP_MS)
    }

    /// Inverted density used to scale run lengths: `DENSITY_MAX - density + DENSITY_MIN`.
    #[must_use]
    pub fn run_scale(&self) -> u32 {
        let density = self.density.clamp(DENSITY_MIN, DENSITY_MAX);
        DENSITY_MAX - density + DENSITY_MIN
    }
}

fn check<T, F>(value: T, range: RangeInclusive<T>, error: F) -> Result<(), SettingsError>
where
    T: PartialOrd + Copy,
    F: FnOnce(T) -> SettingsError,
{
    if range.contains(&value) {
        Ok(())
    } else {
        Err(error(value))
    }
}

/// Reasons a [`RainSettings`] value may be rejected.
#[derive(Clone, Copy, Debug, Error, PartialEq, Eq)]
pub enum SettingsError {
    /// The glyph count lies outside the supported range.
    #[error("glyph count {value} must lie within {min}..={max}", min = GLYPH_COUNT_MIN, max = GLYPH_COUNT_MAX)]
    GlyphCount {
        /// Rejected glyph count.
        value: u16,
    },
    /// The density lies outside the supported range.
    #[error("density {value} must lie within {min}..={max}", min = DENSITY_MIN, max = DENSITY_MAX)]
    Density {
        /// Rejected density.
        value: u32,
    },
    /// The speed lies outside the supported range.
    #[error("speed {value} must lie within {min}..={max}", min = SPEED_MIN, max = SPEED_MAX)]
    Speed {
        /// Rejected speed.
        value: u32,
    },
    /// The hue lies outside the supported range.
    #[error("hue {value} must lie within {min}..={max}", min = HUE_MIN, max = HUE_MAX)]
    Hue {
        /// Rejected hue.
        value: u8,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_valid() {
        assert_eq!(RainSettings::default().validate(), Ok(()));
    }

    #[test]
    fn validation_reports_first_offending_field() {
        let settings = RainSettings {
            density: DENSITY_MAX + 1,
            ..RainSettings::default()
        };
        assert_eq!(
            settings.validate(),
            Err(SettingsError::Density {
                value: DENSITY_MAX + 1
            })
        );

        let settings = RainSettings {
            hue: 0,
            ..RainSettings::default()
        };
        assert_eq!(settings.validate(), Err(SettingsError::Hue { value: 0 }));

        let settings = RainSettings {
            glyph_count: GLYPH_COUNT_MAX + 1,
            ..RainSettings::default()
        };
        assert!(matches!(
            settings.validate(),
            Err(SettingsError::GlyphCount { .. })
        ));
    }

    #[test]
    fn tick_interval_shrinks_with_speed() {
        let slow = RainSettings {
            speed: SPEED_MIN,
            ..RainSettings::default()
        };
        let fast = RainSettings {
            speed: SPEED_MAX,
            ..RainSettings::default()
        };
        assert_eq!(slow.tick_interval(), Duration::from_millis(100));
        assert_eq!(fast.tick_interval(), Duration::from_millis(10));
        assert_eq!(
            RainSettings::default().tick_interval(),
            Duration::from_millis(50)
        );
    }

    #[test]
    fn run_scale_inverts_density() {
        let sparse = RainSettings {
            density: DENSITY_MIN,
            ..RainSettings::default()
        };
        let dense = RainSettings {
            density: DENSITY_MAX,
            ..RainSettings::default()
        };
        assert_eq!(sparse.run_scale(), DENSITY_MAX);
        assert_eq!(dense.run_scale(), DENSITY_MIN);
    }

    #[test]
    fn partial_toml_falls_back_to_defaults() {
        let settings: RainSettings = toml::from_str(
            r#"
                density = 42
                randomize_hue = true
            "#,
        )
        .expect("partial settings parse");

        assert_eq!(settings.density, 42);
        assert!(settings.randomize_hue);
        assert_eq!(settings.glyph_count, GLYPH_COUNT_DEFAULT);
        assert_eq!(settings.hue, HUE_DEFAULT);
    }

    #[test]
    fn unknown_toml_keys_are_rejected() {
        let parsed: Result<RainSettings, _> = toml::from_str("sparkle = 3");
        assert!(parsed.is_err());
    }
}
