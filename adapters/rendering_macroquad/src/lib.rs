#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Macroquad-backed window host for the digital rain.
//!
//! Macroquad's optional audio stack depends on native ALSA development
//! libraries, which are unavailable in the containerised CI environment.
//! To keep `cargo test` usable everywhere we depend on macroquad without its
//! default `audio` feature.
//!
//! The backend owns a [`FrameBuffer`] sized to the window, turns elapsed frame
//! time into [`FrameRequest::Tick`]s at the configured interval, and uploads
//! the buffer to a nearest-filtered texture once per frame.

mod input;

pub use self::input::{ExitTracker, InputSample, MOUSE_TRAVEL_THRESHOLD};

use anyhow::{Context, Result};
use digital_rain_core::Surface;
use digital_rain_rendering::{Color, FrameBuffer, FrameRequest, Presentation, RenderingBackend};
use glam::{UVec2, Vec2};
use macroquad::{
    color::WHITE,
    input::{get_last_key_pressed, is_key_pressed, is_mouse_button_pressed, mouse_position, KeyCode, MouseButton},
    math::Vec2 as MacroquadVec2,
    texture::{draw_texture_ex, DrawTextureParams, FilterMode, Image, Texture2D},
};
use std::{collections::VecDeque, sync::mpsc, time::Duration};

/// Largest number of ticks delivered in a single frame; older backlog is dropped.
pub const MAX_CATCH_UP_TICKS: u32 = 4;

const DEFAULT_TICK_INTERVAL: Duration = Duration::from_millis(50);

/// Converts elapsed frame time into a number of due ticks.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct TickScheduler {
    interval: Duration,
    accumulated: Duration,
}

impl TickScheduler {
    /// Creates a scheduler that fires once per `interval`.
    ///
    /// Intervals shorter than a millisecond are raised to one millisecond.
    #[must_use]
    pub fn new(interval: Duration) -> Self {
        Self {
            interval: interval.max(Duration::from_millis(1)),
            accumulated: Duration::ZERO,
        }
    }

    /// Interval between ticks.
    #[must_use]
    pub const fn interval(&self) -> Duration {
        self.interval
    }

    /// Accumulates `elapsed` and returns how many ticks are due, at most
    /// [`MAX_CATCH_UP_TICKS`].
    pub fn advance(&mut self, elapsed: Duration) -> u32 {
        self.accumulated += elapsed;

        let mut due = 0;
        while self.accumulated >= self.interval && due < MAX_CATCH_UP_TICKS {
            self.accumulated -= self.interval;
            due += 1;
        }

        if self.accumulated >= self.interval {
            self.accumulated = Duration::ZERO;
        }
        due
    }
}

/// Rendering backend implemented on top of macroquad.
#[derive(Debug)]
pub struct MacroquadBackend {
    swap_interval: Option<i32>,
    show_fps: bool,
    tick_interval: Duration,
    esc_only: bool,
    fullscreen: bool,
}

impl Default for MacroquadBackend {
    fn default() -> Self {
        Self {
            swap_interval: None,
            show_fps: false,
            tick_interval: DEFAULT_TICK_INTERVAL,
            esc_only: false,
            fullscreen: false,
        }
    }
}

impl MacroquadBackend {
    /// Returns a backend that requests the platform's default swap interval.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Configures the backend to request a specific swap interval from the platform.
    #[must_use]
    pub fn with_swap_interval(mut self, swap_interval: Option<i32>) -> Self {
        self.swap_interval = swap_interval;
        self
    }

    /// Configures the backend to either synchronise presentation with the display refresh rate
    /// or render as fast as possible.
    #[must_use]
    pub fn with_vsync(self, enabled: bool) -> Self {
        let swap_interval = if enabled { Some(1) } else { Some(0) };
        self.with_swap_interval(swap_interval)
    }

    /// Configures whether the backend logs frame and tick rates once per second.
    #[must_use]
    pub fn with_show_fps(mut self, show: bool) -> Self {
        self.show_fps = show;
        self
    }

    /// Sets the interval between [`FrameRequest::Tick`]s.
    #[must_use]
    pub fn with_tick_interval(mut self, interval: Duration) -> Self {
        self.tick_interval = interval;
        self
    }

    /// Restricts exiting to the Escape key.
    #[must_use]
    pub fn with_esc_only(mut self, esc_only: bool) -> Self {
        self.esc_only = esc_only;
        self
    }

    /// Requests a fullscreen window instead of the presentation size.
    #[must_use]
    pub fn with_fullscreen(mut self, fullscreen: bool) -> Self {
        self.fullscreen = fullscreen;
        self
    }
}

#[derive(Debug, Default)]
struct FpsCounter {
    elapsed: Duration,
    frames: u32,
    ticks: u32,
    frame_times: VecDeque<Duration>,
    window_duration: Duration,
}

#[derive(Clone, Copy, Debug)]
struct FpsMetrics {
    per_second: f32,
    trailing_ten_seconds: f32,
    ticks_per_second: f32,
}

impl FpsCounter {
    /// Records a presented frame and the ticks it ran, reporting averages once
    /// one second has elapsed.
    fn record_frame(&mut self, frame: Duration, ticks: u32) -> Option<FpsMetrics> {
        self.elapsed += frame;
        self.frames = self.frames.saturating_add(1);
        self.ticks = self.ticks.saturating_add(ticks);

        self.frame_times.push_back(frame);
        self.window_duration += frame;

        let trailing_window = Duration::from_secs(10);
        while self.window_duration > trailing_window {
            if let Some(removed) = self.frame_times.pop_front() {
                self.window_duration = self.window_duration.saturating_sub(removed);
            } else {
                break;
            }
        }

        if self.elapsed < Duration::from_secs(1) {
            return None;
        }

        let seconds = self.elapsed.as_secs_f32();
        let per_second = self.frames as f32 / seconds;
        let ticks_per_second = self.ticks as f32 / seconds;
        let window_seconds = self.window_duration.as_secs_f32();
        let trailing_ten_seconds = if window_seconds <= f32::EPSILON {
            per_second
        } else {
            self.frame_times.len() as f32 / window_seconds
        };

        self.elapsed = Duration::ZERO;
        self.frames = 0;
        self.ticks = 0;
        Some(FpsMetrics {
            per_second,
            trailing_ten_seconds,
            ticks_per_second,
        })
    }
}

/// GPU copy of the frame buffer.
struct FrameTexture {
    texture: Texture2D,
    image: Image,
}

impl FrameTexture {
    fn new(frame: &FrameBuffer) -> Result<Self> {
        let size = frame.dimensions();
        let width = u16::try_from(size.x).context("frame width exceeds texture limits")?;
        let height = u16::try_from(size.y).context("frame height exceeds texture limits")?;

        let mut bytes = Vec::new();
        frame.write_rgba8(&mut bytes);
        let texture = Texture2D::from_rgba8(width, height, &bytes);
        texture.set_filter(FilterMode::Nearest);

        Ok(Self {
            texture,
            image: Image {
                bytes,
                width,
                height,
            },
        })
    }

    fn upload(&mut self, frame: &FrameBuffer) {
        frame.write_rgba8(&mut self.image.bytes);
        self.texture.update(&self.image);
    }

    fn draw(&self) {
        let size = MacroquadVec2::new(f32::from(self.image.width), f32::from(self.image.height));
        draw_texture_ex(
            self.texture,
            0.0,
            0.0,
            WHITE,
            DrawTextureParams {
                dest_size: Some(size),
                ..DrawTextureParams::default()
            },
        );
    }

    fn delete(self) {
        self.texture.delete();
    }
}

impl RenderingBackend for MacroquadBackend {
    fn run<F>(self, presentation: Presentation, on_frame: F) -> Result<()>
    where
        F: FnMut(FrameRequest, &mut FrameBuffer) -> Result<()> + 'static,
    {
        let Self {
            swap_interval,
            show_fps,
            tick_interval,
            esc_only,
            fullscreen,
        } = self;

        let Presentation {
            window_title,
            clear_color,
            size,
        } = presentation;

        let mut config = macroquad::window::Conf {
            window_title,
            window_width: i32::try_from(size.x).context("window width out of range")?,
            window_height: i32::try_from(size.y).context("window height out of range")?,
            fullscreen,
            ..macroquad::window::Conf::default()
        };
        if let Some(swap_interval) = swap_interval {
            config.platform.swap_interval = Some(swap_interval);
        }

        let (outcome_sender, outcome_receiver) = mpsc::channel::<Result<()>>();
        let settings = LoopSettings {
            fallback_size: size,
            clear_color,
            tick_interval,
            esc_only,
            show_fps,
        };

        macroquad::Window::from_config(config, async move {
            let mut on_frame = on_frame;
            let outcome = render_loop(settings, &mut on_frame).await;
            if let Err(error) = &outcome {
                log::error!("render loop stopped: {error:#}");
            }
            let _ = outcome_sender.send(outcome);
        });

        outcome_receiver.recv().unwrap_or_else(|_| Ok(()))
    }
}

struct LoopSettings {
    fallback_size: UVec2,
    clear_color: Color,
    tick_interval: Duration,
    esc_only: bool,
    show_fps: bool,
}

async fn render_loop<F>(settings: LoopSettings, on_frame: &mut F) -> Result<()>
where
    F: FnMut(FrameRequest, &mut FrameBuffer) -> Result<()>,
{
    let initial = screen_size().unwrap_or(settings.fallback_size);
    let mut frame = FrameBuffer::new(initial).context("failed to allocate frame buffer")?;
    on_frame(FrameRequest::Resize { size: initial }, &mut frame)?;
    let mut texture = FrameTexture::new(&frame)?;

    let background = to_macroquad_color(settings.clear_color);
    let mut scheduler = TickScheduler::new(settings.tick_interval);
    let mut exit = ExitTracker::new(settings.esc_only);
    let mut fps_counter = FpsCounter::default();

    log::info!(
        "presenting {}x{} rain, tick interval {:?}",
        initial.x,
        initial.y,
        scheduler.interval()
    );

    loop {
        if exit.should_exit(poll_input()) {
            log::debug!("exit requested by input");
            break;
        }

        match screen_size() {
            None => {
                if frame.is_available() {
                    log::debug!("window hidden; pausing blits");
                    frame.set_available(false);
                }
            }
            Some(size) => {
                if size != frame.dimensions() {
                    frame
                        .resize(size)
                        .context("failed to resize frame buffer")?;
                    on_frame(FrameRequest::Resize { size }, &mut frame)?;
                    std::mem::replace(&mut texture, FrameTexture::new(&frame)?).delete();
                }
                if !frame.is_available() {
                    frame.set_available(true);
                    on_frame(FrameRequest::Redraw, &mut frame)?;
                }
            }
        }

        let frame_dt = Duration::from_secs_f32(macroquad::time::get_frame_time().max(0.0));
        let ticks = scheduler.advance(frame_dt);
        for _ in 0..ticks {
            on_frame(FrameRequest::Tick, &mut frame)?;
        }

        macroquad::window::clear_background(background);
        texture.upload(&frame);
        texture.draw();

        if let Some(metrics) = fps_counter.record_frame(frame_dt, ticks) {
            if settings.show_fps {
                log::info!(
                    "FPS: {:.2} (10s avg: {:.2}) | ticks/s: {:.2}",
                    metrics.per_second,
                    metrics.trailing_ten_seconds,
                    metrics.ticks_per_second,
                );
            }
        }

        macroquad::window::next_frame().await;
    }

    texture.delete();
    Ok(())
}

fn poll_input() -> InputSample {
    let (x, y) = mouse_position();
    InputSample {
        escape_pressed: is_key_pressed(KeyCode::Escape),
        key_pressed: get_last_key_pressed().is_some(),
        mouse_pressed: [MouseButton::Left, MouseButton::Right, MouseButton::Middle]
            .into_iter()
            .any(is_mouse_button_pressed),
        cursor: Vec2::new(x, y),
    }
}

fn screen_size() -> Option<UVec2> {
    let width = macroquad::window::screen_width().floor();
    let height = macroquad::window::screen_height().floor();
    if width < 1.0 || height < 1.0 {
        return None;
    }
    Some(UVec2::new(width as u32, height as u32))
}

fn to_macroquad_color(color: Color) -> macroquad::color::Color {
    macroquad::color::Color::new(color.red, color.green, color.blue, color.alpha)
}
