//! Per-tick hue stepping.

use digital_rain_core::{RainSettings, HUE_MAX, HUE_MIN};
use digital_rain_system_sequence::SequenceGenerator;

/// Returns the hue to use for the next atlas.
///
/// A fixed hue always follows the settings. A smooth random hue walks the
/// scale by one and wraps; an abrupt one jumps on roughly half the ticks.
pub(crate) fn next_hue(
    current: u8,
    settings: &RainSettings,
    generator: &mut SequenceGenerator,
) -> u8 {
    if !settings.randomize_hue {
        return settings.hue;
    }

    if settings.smooth_hue_transition {
        return if current >= HUE_MAX {
            HUE_MIN
        } else {
            current + 1
        };
    }

    if generator.below(2) == 1 {
        let spread = u32::from(HUE_MAX - HUE_MIN) + 1;
        HUE_MIN + generator.below(spread) as u8
    } else {
        current
    }
}
