#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Shared rendering contracts for digital rain adapters.

mod atlas;
mod framebuffer;

use anyhow::Result as AnyResult;
use glam::UVec2;
use std::{error::Error, fmt};

pub use atlas::{standard_glyph_atlas, STANDARD_GLYPH_COUNT};
pub use framebuffer::FrameBuffer;

/// RGBA color used when presenting frames.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Color {
    /// Red channel intensity in the range 0.0..=1.0.
    pub red: f32,
    /// Green channel intensity in the range 0.0..=1.0.
    pub green: f32,
    /// Blue channel intensity in the range 0.0..=1.0.
    pub blue: f32,
    /// Alpha channel intensity in the range 0.0..=1.0.
    pub alpha: f32,
}

impl Color {
    /// Creates a new color from floating point channels.
    #[must_use]
    pub const fn new(red: f32, green: f32, blue: f32, alpha: f32) -> Self {
        Self {
            red,
            green,
            blue,
            alpha,
        }
    }

    /// Creates an opaque color from byte RGB values.
    #[must_use]
    pub fn from_rgb_u8(red: u8, green: u8, blue: u8) -> Self {
        Self {
            red: f32::from(red) / 255.0,
            green: f32::from(green) / 255.0,
            blue: f32::from(blue) / 255.0,
            alpha: 1.0,
        }
    }
}

/// Presentation descriptor consumed by rendering backends.
#[derive(Clone, Debug, PartialEq)]
pub struct Presentation {
    /// Title used by the created window.
    pub window_title: String,
    /// Solid color used to clear each frame behind the rain.
    pub clear_color: Color,
    /// Initial surface size in pixels.
    pub size: UVec2,
}

impl Presentation {
    /// Constructs a new presentation descriptor.
    #[must_use]
    pub fn new<T>(window_title: T, clear_color: Color, size: UVec2) -> Self
    where
        T: Into<String>,
    {
        Self {
            window_title: window_title.into(),
            clear_color,
            size,
        }
    }
}

/// Work a backend asks the frame callback to perform.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FrameRequest {
    /// The tick interval elapsed; advance the rain by one step.
    Tick,
    /// The surface lost its contents; repaint everything without advancing.
    Redraw,
    /// The surface changed size; the frame buffer already has the new size.
    Resize {
        /// New surface size in pixels.
        size: UVec2,
    },
}

/// Rendering backend capable of presenting digital rain.
pub trait RenderingBackend {
    /// Runs the rendering backend until it is requested to exit.
    ///
    /// The provided `on_frame` closure receives every request the backend
    /// schedules together with the frame buffer it presents. Returning an
    /// error stops the backend and propagates the error.
    fn run<F>(self, presentation: Presentation, on_frame: F) -> AnyResult<()>
    where
        F: FnMut(FrameRequest, &mut FrameBuffer) -> AnyResult<()> + 'static;
}

/// Errors that can occur when constructing rendering resources.
#[derive(Debug, PartialEq, Eq)]
pub enum RenderingError {
    /// Frame buffers need at least one pixel along each axis.
    EmptyFrame {
        /// Requested size that failed validation.
        size: UVec2,
    },
}

impl fmt::Display for RenderingError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::EmptyFrame { size } => {
                write!(
                    f,
                    "frame buffer must be at least 1x1 pixels (received {}x{})",
                    size.x, size.y
                )
            }
        }
    }
}

impl Error for RenderingError {}
