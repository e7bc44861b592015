use glam::Vec2;

/// Cursor travel along either axis, in pixels, that counts as deliberate movement.
pub const MOUSE_TRAVEL_THRESHOLD: f32 = 8.0;

/// Input observed during a single frame.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct InputSample {
    /// Escape went down this frame.
    pub escape_pressed: bool,
    /// Any key went down this frame.
    pub key_pressed: bool,
    /// A left, right or middle mouse button went down this frame.
    pub mouse_pressed: bool,
    /// Cursor position in window coordinates.
    pub cursor: Vec2,
}

/// Decides when screensaver input should close the window.
///
/// Escape always exits. Unless restricted to Escape, any other key, a mouse
/// button, or moving the cursor at least [`MOUSE_TRAVEL_THRESHOLD`] pixels
/// between two samples exits as well. The first sample only anchors the cursor.
#[derive(Clone, Debug, PartialEq)]
pub struct ExitTracker {
    esc_only: bool,
    anchor: Option<Vec2>,
}

impl ExitTracker {
    /// Creates a tracker; `esc_only` ignores everything except Escape.
    #[must_use]
    pub const fn new(esc_only: bool) -> Self {
        Self {
            esc_only,
            anchor: None,
        }
    }

    /// Feeds one frame of input and reports whether the host should exit.
    pub fn should_exit(&mut self, sample: InputSample) -> bool {
        if sample.escape_pressed {
            return true;
        }
        if self.esc_only {
            return false;
        }
        if sample.key_pressed || sample.mouse_pressed {
            return true;
        }

        match self.anchor.replace(sample.cursor) {
            None => false,
            Some(anchor) => {
                let travel = (sample.cursor - anchor).abs();
                travel.x >= MOUSE_TRAVEL_THRESHOLD || travel.y >= MOUSE_TRAVEL_THRESHOLD
            }
        }
    }
}
